//! Messages exchanged between the actors
//!
//! - `UiEvent`: key presses mapped to intents, UI → App
//! - `NetworkCommand` / `NetworkResponse`: API calls and their outcomes, App ⇄ Network
//! - `RenderState`: snapshot of everything a frame needs, App → UI

pub mod network;
pub mod render;
pub mod ui_events;

pub use network::{NetworkCommand, NetworkResponse};
pub use render::RenderState;
pub use ui_events::{Focus, InputMode, UiEvent};
