//! # Spendly TUI
//!
//! A terminal client for a personal expense tracking service.
//!
//! ## Features
//! - Sign up, sign in and sign out
//! - Paginated expense list with date-range search
//! - Create, edit and delete expenses with wallet balance checks
//! - Spending summary and charts (average by category, scatter, bar, pie)
//! - Profile with a persisted currency preference
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod routes;
pub mod storage;
pub mod store;
pub mod summary;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use error::{ApiError, ValidationError};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{Category, Expense, ExpensePage, User};
pub use network::{ApiClient, NetworkActor};
pub use routes::Route;
