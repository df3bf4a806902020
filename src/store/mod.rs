//! Client-side store slices
//!
//! Each slice mirrors what the server returned for one concern and exposes
//! the transitions the App layer drives. Slices do no I/O: operations that
//! need the network hand back a request description instead.

pub mod auth;
pub mod categories;
pub mod draft;
pub mod expenses;

pub use auth::{AuthField, AuthForm, AuthMode, AuthRequest};
pub use categories::CategoryState;
pub use draft::{ExpenseDraft, ExpenseField, ExpenseForm, SubmitRequest};
pub use expenses::{EmptyState, ExpenseListState, FetchMode, FetchTicket};
