//! Network layer - API calls against the expenses server
//!
//! The Network actor receives commands from the App actor and sends back
//! one response per call, in completion order.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::ApiClient;
