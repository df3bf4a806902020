//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the expenses API
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default number of expenses requested per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory under the home directory holding local state and logs
pub const DATA_DIR_NAME: &str = ".spendly";

/// Log file written inside the data directory
pub const LOG_FILE_NAME: &str = "spendly.log";

/// Storage key of the preferred currency symbol
pub const CURRENCY_KEY: &str = "currency";

/// Storage key of the expense list scroll offset
pub const SCROLL_POSITION_KEY: &str = "scrollPosition";

/// Currency symbols offered on the profile page
pub const CURRENCIES: &[&str] = &["$", "€", "£", "¥", "₹", "₦"];

/// Shown when the user has no expenses at all
pub const NO_EXPENSES_MESSAGE: &str = "You have not recorded any expenses yet. Press 'n' to add one.";

/// Shown when a date-range search matched nothing
pub const NO_MATCHES_MESSAGE: &str = "No expenses match this date range. Press 'b' to go back.";

/// Validation message for an amount above the wallet balance
pub const INSUFFICIENT_BALANCE_MESSAGE: &str = "Insufficient Cash Balance";

/// Application name
pub const APP_NAME: &str = "Spendly";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
