//! Message log behind the rate-limited write endpoint.

pub mod store;

pub use store::{Message, MessageStore, Page};
