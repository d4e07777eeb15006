//! External session orchestration.

pub mod controller;

pub use controller::ExternalSessionController;
