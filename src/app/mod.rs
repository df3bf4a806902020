//! App layer - central state management and command processing
//!
//! The App actor owns all client-side state. It receives UI events and
//! network responses one at a time, updates the store, and emits network
//! commands plus a fresh render state after each message.

pub mod actor;
pub mod commands;
pub mod state;

pub use actor::AppActor;
pub use state::{AppOptions, AppState};
