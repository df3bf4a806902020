//! Render state - data structure sent from App layer to UI for rendering

use chrono::{Local, NaiveDate};

use crate::constants::{CURRENCIES, DEFAULT_PAGE_SIZE};
use crate::messages::ui_events::{Focus, InputMode};
use crate::models::{Expense, User};
use crate::routes::Route;
use crate::store::{AuthForm, AuthMode, CategoryState, ExpenseForm, ExpenseListState};
use crate::summary::ChartPeriod;

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub route: Route,
    pub today: NaiveDate,

    // UI state
    pub focus: Focus,
    pub input_mode: InputMode,
    pub cursor_position: usize,

    /// Signed-in user, if any
    pub session: Option<User>,
    pub profile: Option<User>,
    pub wallet_balance: Option<f64>,
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

    /// Form of the current create/edit route
    pub form: Option<ExpenseForm>,
    pub categories: CategoryState,
    pub show_new_category: bool,

    pub chart_period: ChartPeriod,

    // Status line and popups
    pub status: Option<String>,
    pub show_help: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        let today = Local::now().date_naive();
        RenderState {
            route: Route::Home,
            today,
            focus: Focus::None,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            session: None,
            profile: None,
            wallet_balance: None,
            currency: CURRENCIES[0].to_string(),
            signup: AuthForm::new(AuthMode::Signup),
            signin: AuthForm::new(AuthMode::Signin),
            expenses: ExpenseListState::new(DEFAULT_PAGE_SIZE),
            selected_expense: 0,
            search_from: String::new(),
            search_to: String::new(),
            search_error: None,
            confirm_delete: None,
            form: None,
            categories: CategoryState::default(),
            show_new_category: false,
            chart_period: ChartPeriod::containing(today),
            status: None,
            show_help: false,
        }
    }
}
