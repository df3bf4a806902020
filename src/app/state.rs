//! App state - pure data structure with no I/O logic beyond local storage

use std::collections::HashMap;

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::constants::CURRENCIES;
use crate::messages::{Focus, InputMode, RenderState};
use crate::models::{Expense, Session, User};
use crate::routes::Route;
use crate::storage::Storage;
use crate::store::{AuthForm, AuthMode, CategoryState, ExpenseForm, ExpenseListState, FetchTicket};
use crate::summary::ChartPeriod;

/// Startup options the App layer needs from the configuration
#[derive(Clone, Debug, Default)]
pub struct AppOptions {
    pub page_size: usize,
    /// Overrides the balance reported by the profile
    pub wallet_balance: Option<f64>,
    pub start_route: Option<Route>,
}

impl From<&Config> for AppOptions {
    fn from(config: &Config) -> Self {
        let start_route = config.route.as_deref().and_then(|path| {
            let route = Route::from_path(path);
            if route.is_none() {
                tracing::warn!(path, "Unknown start route, ignoring");
            }
            route
        });
        AppOptions {
            page_size: config.page_size,
            wallet_balance: config.wallet_balance,
            start_route,
        }
    }
}

/// Main application state
pub struct AppState {
    pub route: Route,
    pub options: AppOptions,

    // UI state
    pub focus: Focus,
    pub input_mode: InputMode,
    pub cursor_position: usize,

    // Session
    pub session: Option<Session>,
    pub profile: Option<User>,
    pub currency: String,

    // Auth forms
    pub signup: AuthForm,
    pub signin: AuthForm,

    // Expense list
    pub expenses: ExpenseListState,
    pub selected_expense: usize,
    pub search_from: String,
    pub search_to: String,
    pub search_error: Option<String>,
    pub confirm_delete: Option<Expense>,

    // Expense forms
    pub new_expense: ExpenseForm,
    pub edit_expense: Option<ExpenseForm>,
    pub categories: CategoryState,
    pub show_new_category: bool,

    pub chart_period: ChartPeriod,

    // Status line and popups
    pub status: Option<String>,
    pub show_help: bool,

    // Request bookkeeping
    pub next_request_id: u64,
    pub pending_fetches: HashMap<u64, FetchTicket>,

    // Storage (persisted data)
    pub storage: Storage,
}

impl AppState {
    pub fn new(options: AppOptions, storage: Storage) -> Self {
        let today = today();
        let session = storage.session().cloned();
        let currency = storage
            .currency()
            .filter(|c| CURRENCIES.contains(c))
            .unwrap_or(CURRENCIES[0])
            .to_string();

        AppState {
            route: Route::Home,
            focus: Focus::None,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            profile: session.as_ref().map(|s| s.user.clone()),
            session,
            currency,
            signup: AuthForm::new(AuthMode::Signup),
            signin: AuthForm::new(AuthMode::Signin),
            expenses: ExpenseListState::new(options.page_size),
            selected_expense: 0,
            search_from: String::new(),
            search_to: String::new(),
            search_error: None,
            confirm_delete: None,
            new_expense: ExpenseForm::create(today),
            edit_expense: None,
            categories: CategoryState::default(),
            show_new_category: false,
            chart_period: ChartPeriod::containing(today),
            status: None,
            show_help: false,
            next_request_id: 1,
            pending_fetches: HashMap::new(),
            storage,
            options,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Balance an expense may not exceed: the command line override, else the profile
    pub fn wallet_balance(&self) -> Option<f64> {
        self.options
            .wallet_balance
            .or_else(|| self.profile.as_ref().and_then(|u| u.wallet_balance))
    }

    /// Form of the current route, if it shows one
    pub fn current_form(&self) -> Option<&ExpenseForm> {
        match self.route {
            Route::NewExpense => Some(&self.new_expense),
            Route::EditExpense => self.edit_expense.as_ref(),
            _ => None,
        }
    }

    pub fn current_form_mut(&mut self) -> Option<&mut ExpenseForm> {
        match self.route {
            Route::NewExpense => Some(&mut self.new_expense),
            Route::EditExpense => self.edit_expense.as_mut(),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&Expense> {
        self.expenses.expenses.get(self.selected_expense)
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            route: self.route,
            today: today(),
            focus: self.focus,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            session: self.session.as_ref().map(|s| s.user.clone()),
            profile: self.profile.clone(),
            wallet_balance: self.wallet_balance(),
            currency: self.currency.clone(),
            signup: self.signup.clone(),
            signin: self.signin.clone(),
            expenses: self.expenses.clone(),
            selected_expense: self.selected_expense,
            search_from: self.search_from.clone(),
            search_to: self.search_to.clone(),
            search_error: self.search_error.clone(),
            confirm_delete: self.confirm_delete.clone(),
            form: self.current_form().cloned(),
            categories: self.categories.clone(),
            show_new_category: self.show_new_category,
            chart_period: self.chart_period,
            status: self.status.clone(),
            show_help: self.show_help,
        }
    }
}

/// Local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
