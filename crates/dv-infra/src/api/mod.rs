pub mod succession_client;

pub use succession_client::{SuccessionApiClient, SuccessionCase};
