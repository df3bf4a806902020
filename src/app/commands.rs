//! Command handlers - business logic for processing UI events and responses
//!
//! Handlers mutate `AppState` and return the network commands to dispatch.
//! They never block and never talk to the network themselves.

use chrono::NaiveDate;

use crate::app::state::today;
use crate::app::AppState;
use crate::constants::CURRENCIES;
use crate::messages::{Focus, InputMode, NetworkCommand, NetworkResponse};
use crate::models::{DateRange, Session};
use crate::routes::Route;
use crate::store::draft::DATE_FORMAT;
use crate::store::{
    AuthField, AuthForm, AuthMode, AuthRequest, CategoryState, ExpenseField, ExpenseForm,
    FetchTicket, SubmitRequest,
};

const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please sign in again";

impl AppState {
    // ========================
    // Startup
    // ========================

    /// Initial route: the requested one, else the list when signed in, else home
    pub fn startup(&mut self) -> Vec<NetworkCommand> {
        let mut cmds = Vec::new();
        if let Some(session) = &self.session {
            tracing::info!(user = %session.user.username, "Restoring saved session");
            cmds.push(NetworkCommand::SetToken(Some(session.token.clone())));
            let id = self.next_id();
            cmds.push(NetworkCommand::FetchProfile { id });
        }

        let start = self.options.start_route.unwrap_or(if self.is_authenticated() {
            Route::Expenses
        } else {
            Route::Home
        });
        cmds.extend(self.navigate(start));
        cmds
    }

    // ========================
    // Navigation
    // ========================

    pub fn navigate(&mut self, target: Route) -> Vec<NetworkCommand> {
        let mut route = target.resolve(self.is_authenticated());
        if route == Route::EditExpense && self.edit_expense.is_none() {
            route = Route::Expenses;
        }
        if route != target {
            tracing::debug!(from = target.path(), to = route.path(), "Route redirected");
        }

        if self.route == Route::Expenses {
            self.persist_scroll();
        }

        self.route = route;
        self.status = None;
        self.input_mode = InputMode::Normal;
        self.show_new_category = false;
        self.confirm_delete = None;
        self.focus = self.focus_order().first().copied().unwrap_or_default();
        self.on_enter()
    }

    /// Effects of arriving on the current route
    fn on_enter(&mut self) -> Vec<NetworkCommand> {
        match self.route {
            Route::Expenses => {
                self.selected_expense = self.storage.scroll_offset();
                let handed_back = self.edit_expense.as_mut().and_then(|f| f.take_edited());
                if let Some(saved) = handed_back {
                    self.edit_expense = None;
                    if let Some(expense) = saved.resolve(&self.categories.categories) {
                        if self.expenses.apply_edited(expense) {
                            return Vec::new();
                        }
                    }
                    tracing::debug!(id = %saved.id, "Edited expense not in list, refetching");
                    if self.expenses.is_filtered() {
                        return Vec::new();
                    }
                } else if self.expenses.is_filtered() {
                    return Vec::new();
                }
                let ticket = self.expenses.fetch_first_page();
                vec![self.fetch_expenses(ticket)]
            }
            Route::NewExpense | Route::EditExpense => vec![self.fetch_categories()],
            Route::Profile => {
                let id = self.next_id();
                vec![NetworkCommand::FetchProfile { id }]
            }
            _ => Vec::new(),
        }
    }

    fn persist_scroll(&mut self) {
        if let Err(e) = self.storage.set_scroll_offset(self.selected_expense) {
            tracing::warn!(error = %e, "Failed to save scroll position");
        }
    }

    /// Focusable elements of the current route, in Tab order
    pub fn focus_order(&self) -> Vec<Focus> {
        if self.show_new_category {
            return vec![Focus::NewCategory];
        }
        match self.route {
            Route::Signup => self.signup.fields().iter().map(|f| Focus::Auth(*f)).collect(),
            Route::Signin => self.signin.fields().iter().map(|f| Focus::Auth(*f)).collect(),
            Route::Expenses => vec![Focus::List, Focus::SearchFrom, Focus::SearchTo],
            Route::NewExpense | Route::EditExpense => {
                ExpenseField::ALL.iter().map(|f| Focus::Expense(*f)).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.move_focus(1);
    }

    pub fn prev_field(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        let order = self.focus_order();
        if order.is_empty() {
            return;
        }
        let len = order.len() as isize;
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        self.focus = order[((current + step).rem_euclid(len)) as usize];

        // Keep typing when moving between text fields
        if self.input_mode == InputMode::Editing {
            if self.focus.is_text() {
                self.cursor_position = self.current_input().len();
            } else {
                self.input_mode = InputMode::Normal;
            }
        }
    }

    // ========================
    // Input editing
    // ========================

    pub fn current_input(&self) -> &str {
        match self.focus {
            Focus::Auth(field) => self.auth_form().map(|f| f.value(field)).unwrap_or(""),
            Focus::Expense(field) => self
                .current_form()
                .and_then(|f| f.draft.text(field))
                .unwrap_or(""),
            Focus::SearchFrom => &self.search_from,
            Focus::SearchTo => &self.search_to,
            Focus::NewCategory => &self.categories.new_title,
            Focus::None | Focus::List => "",
        }
    }

    /// Store a new value for the focused input. Auth fields revalidate as they change.
    fn set_current_input(&mut self, value: String) {
        match self.focus {
            Focus::Auth(field) => {
                if let Some(form) = self.auth_form_mut() {
                    form.on_change(field, value);
                }
            }
            Focus::Expense(field) => {
                if let Some(form) = self.current_form_mut() {
                    form.draft.on_value_change(field, value);
                }
            }
            Focus::SearchFrom => self.search_from = value,
            Focus::SearchTo => self.search_to = value,
            Focus::NewCategory => self.categories.new_title = value,
            Focus::None | Focus::List => {}
        }
    }

    fn auth_form(&self) -> Option<&AuthForm> {
        match self.route {
            Route::Signup => Some(&self.signup),
            Route::Signin => Some(&self.signin),
            _ => None,
        }
    }

    fn auth_form_mut(&mut self) -> Option<&mut AuthForm> {
        match self.route {
            Route::Signup => Some(&mut self.signup),
            Route::Signin => Some(&mut self.signin),
            _ => None,
        }
    }

    pub fn start_editing(&mut self) {
        if self.focus.is_text() {
            self.input_mode = InputMode::Editing;
            self.cursor_position = self.current_input().len();
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if !self.focus.is_text() {
            return;
        }
        let cursor_pos = self.cursor_position;
        let mut input = self.current_input().to_string();
        if cursor_pos <= input.len() {
            input.insert(cursor_pos, c);
            self.cursor_position = cursor_pos + c.len_utf8();
            self.set_current_input(input);
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 || !self.focus.is_text() {
            return;
        }
        let cursor_pos = self.cursor_position;
        let mut input = self.current_input().to_string();
        if cursor_pos > input.len() {
            return;
        }
        let prev_pos = input[..cursor_pos]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        input.remove(prev_pos);
        self.cursor_position = prev_pos;
        self.set_current_input(input);
    }

    // ========================
    // Submission
    // ========================

    /// Submit the form of the current route
    pub fn submit(&mut self) -> Vec<NetworkCommand> {
        self.input_mode = InputMode::Normal;
        match self.route {
            Route::Signup | Route::Signin => self.submit_auth(),
            Route::NewExpense | Route::EditExpense => self.submit_expense(),
            _ => Vec::new(),
        }
    }

    fn submit_auth(&mut self) -> Vec<NetworkCommand> {
        let Some(request) = self.auth_form_mut().and_then(|f| f.begin_submit()) else {
            return Vec::new();
        };
        let id = self.next_id();
        match request {
            AuthRequest::Signup(request) => vec![NetworkCommand::Signup { id, request }],
            AuthRequest::Signin(request) => vec![NetworkCommand::Signin { id, request }],
        }
    }

    fn submit_expense(&mut self) -> Vec<NetworkCommand> {
        let balance = self.wallet_balance();
        let Some(request) = self.current_form_mut().and_then(|f| f.submit(balance)) else {
            return Vec::new();
        };
        let id = self.next_id();
        match request {
            SubmitRequest::Create(payload) => vec![NetworkCommand::CreateExpense { id, payload }],
            SubmitRequest::Update { id: expense_id, payload } => {
                vec![NetworkCommand::UpdateExpense {
                    id,
                    expense_id,
                    payload,
                }]
            }
        }
    }

    // ========================
    // Session
    // ========================

    fn sign_in_with(&mut self, session: Session) -> Vec<NetworkCommand> {
        tracing::info!(user = %session.user.username, "Signed in");
        self.clear_cached_data();
        if let Err(e) = self.storage.set_session(Some(session.clone())) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        self.profile = Some(session.user.clone());
        let token = session.token.clone();
        self.session = Some(session);
        self.status = None;

        let id = self.next_id();
        let mut cmds = vec![
            NetworkCommand::SetToken(Some(token)),
            NetworkCommand::FetchProfile { id },
        ];
        cmds.extend(self.navigate(Route::Expenses));
        cmds
    }

    pub fn sign_out(&mut self) -> Vec<NetworkCommand> {
        if !self.is_authenticated() {
            return Vec::new();
        }
        let id = self.next_id();
        let mut cmds = vec![NetworkCommand::Signout { id }, NetworkCommand::SetToken(None)];
        self.drop_session();
        cmds.extend(self.navigate(Route::Signin));
        self.status = Some("Signed out".to_string());
        cmds
    }

    /// The server rejected our token: forget it and ask for a new sign in
    fn expire_session(&mut self) -> Vec<NetworkCommand> {
        tracing::warn!("Session rejected by server");
        let mut cmds = vec![NetworkCommand::SetToken(None)];
        self.drop_session();
        cmds.extend(self.navigate(Route::Signin));
        self.status = Some(SESSION_EXPIRED_MESSAGE.to_string());
        cmds
    }

    fn drop_session(&mut self) {
        self.session = None;
        self.profile = None;
        if let Err(e) = self.storage.set_session(None) {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        self.clear_cached_data();
    }

    fn clear_cached_data(&mut self) {
        self.expenses.clear();
        self.pending_fetches.clear();
        self.selected_expense = 0;
        self.search_from.clear();
        self.search_to.clear();
        self.search_error = None;
        self.confirm_delete = None;
        self.new_expense = ExpenseForm::create(today());
        self.edit_expense = None;
        self.categories = CategoryState::default();
        self.show_new_category = false;
    }

    // ========================
    // Expense list
    // ========================

    fn fetch_expenses(&mut self, ticket: FetchTicket) -> NetworkCommand {
        let id = self.next_id();
        let query = ticket.query.clone();
        self.pending_fetches.insert(id, ticket);
        NetworkCommand::FetchExpenses { id, query }
    }

    fn fetch_categories(&mut self) -> NetworkCommand {
        let id = self.next_id();
        self.categories.begin_fetch(id);
        NetworkCommand::FetchCategories { id }
    }

    pub fn select_next(&mut self) {
        if self.selected_expense + 1 < self.expenses.expenses.len() {
            self.selected_expense += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_expense = self.selected_expense.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.expenses.expenses.len();
        if self.selected_expense >= len {
            self.selected_expense = len.saturating_sub(1);
        }
    }

    pub fn show_more(&mut self) -> Vec<NetworkCommand> {
        match self.expenses.show_more() {
            Some(ticket) => vec![self.fetch_expenses(ticket)],
            None => Vec::new(),
        }
    }

    pub fn refresh(&mut self) -> Vec<NetworkCommand> {
        let ticket = match self.expenses.filter {
            Some(range) => match self.expenses.search(range) {
                Ok(ticket) => ticket,
                Err(_) => return Vec::new(),
            },
            None => self.expenses.fetch_first_page(),
        };
        self.selected_expense = 0;
        vec![self.fetch_expenses(ticket)]
    }

    pub fn start_search(&mut self) {
        self.focus = Focus::SearchFrom;
        self.start_editing();
    }

    /// Run a date-range search with the typed dates
    pub fn search_date_range(&mut self) -> Vec<NetworkCommand> {
        self.input_mode = InputMode::Normal;
        let range = match parse_range(&self.search_from, &self.search_to) {
            Ok(range) => range,
            Err(message) => {
                self.search_error = Some(message);
                return Vec::new();
            }
        };
        match self.expenses.search(range) {
            Ok(ticket) => {
                self.search_error = None;
                self.selected_expense = 0;
                self.focus = Focus::List;
                vec![self.fetch_expenses(ticket)]
            }
            Err(e) => {
                self.search_error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    /// Back to the unfiltered list
    pub fn clear_date_range(&mut self) -> Vec<NetworkCommand> {
        if !self.expenses.is_filtered() {
            return Vec::new();
        }
        self.search_from.clear();
        self.search_to.clear();
        self.search_error = None;
        self.selected_expense = 0;
        let ticket = self.expenses.reset_filter();
        vec![self.fetch_expenses(ticket)]
    }

    pub fn request_delete(&mut self) {
        if let Some(expense) = self.selected().cloned() {
            if expense.id.is_some() {
                self.confirm_delete = Some(expense);
            }
        }
    }

    pub fn confirm_delete(&mut self) -> Vec<NetworkCommand> {
        let Some(expense_id) = self.confirm_delete.as_ref().and_then(|e| e.id.clone()) else {
            return Vec::new();
        };
        if !self.expenses.begin_delete() {
            return Vec::new();
        }
        let id = self.next_id();
        vec![NetworkCommand::DeleteExpense { id, expense_id }]
    }

    pub fn cancel_delete(&mut self) {
        if !self.expenses.is_deleting {
            self.confirm_delete = None;
        }
    }

    /// Copy the selected expense into the edit form and open it
    pub fn edit_selected(&mut self) -> Vec<NetworkCommand> {
        let Some(expense) = self.selected().cloned() else {
            return Vec::new();
        };
        self.edit_expense = Some(ExpenseForm::edit(&expense, today()));
        self.navigate(Route::EditExpense)
    }

    // ========================
    // Expense form
    // ========================

    pub fn cycle_category(&mut self, forward: bool) {
        let current = self
            .current_form()
            .and_then(|f| f.draft.category.as_ref())
            .map(|c| c.title.clone());
        let Some(title) = self
            .categories
            .cycle_title(current.as_deref(), forward)
            .map(str::to_string)
        else {
            return;
        };
        let categories = self.categories.categories.clone();
        if let Some(form) = self.current_form_mut() {
            form.draft.select_category(&title, &categories);
        }
    }

    pub fn open_new_category(&mut self) {
        self.show_new_category = true;
        self.categories.error = None;
        self.focus = Focus::NewCategory;
        self.start_editing();
    }

    pub fn close_new_category(&mut self) {
        self.show_new_category = false;
        self.categories.new_title.clear();
        self.input_mode = InputMode::Normal;
        self.focus = Focus::Expense(ExpenseField::Category);
    }

    pub fn create_category(&mut self) -> Vec<NetworkCommand> {
        match self.categories.begin_create() {
            Ok(title) => {
                let id = self.next_id();
                vec![NetworkCommand::CreateCategory { id, title }]
            }
            Err(e) => {
                self.categories.error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    // ========================
    // Profile and charts
    // ========================

    pub fn cycle_currency(&mut self) {
        let index = CURRENCIES
            .iter()
            .position(|c| *c == self.currency)
            .map(|i| (i + 1) % CURRENCIES.len())
            .unwrap_or(0);
        self.currency = CURRENCIES[index].to_string();
        if let Err(e) = self.storage.set_currency(&self.currency) {
            tracing::warn!(error = %e, "Failed to save currency");
        }
    }

    pub fn chart_prev_period(&mut self) {
        self.chart_period = self.chart_period.prev();
    }

    pub fn chart_next_period(&mut self) {
        self.chart_period = self.chart_period.next();
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        if response.is_unauthorized() && self.is_authenticated() {
            return self.expire_session();
        }

        match response {
            NetworkResponse::Signup { result, .. } => {
                match self.signup.apply_response(result) {
                    Some(session) => self.sign_in_with(session),
                    None => Vec::new(),
                }
            }
            NetworkResponse::Signin { result, .. } => {
                match self.signin.apply_response(result) {
                    Some(session) => self.sign_in_with(session),
                    None => Vec::new(),
                }
            }
            NetworkResponse::Signout { result, .. } => {
                if let Err(e) = result {
                    tracing::debug!(error = %e, "Server sign out failed, ignoring");
                }
                Vec::new()
            }
            NetworkResponse::Profile { result, .. } => {
                match result {
                    Ok(user) => {
                        if let Some(session) = &mut self.session {
                            session.user = user.clone();
                            let session = session.clone();
                            if let Err(e) = self.storage.set_session(Some(session)) {
                                tracing::warn!(error = %e, "Failed to persist profile");
                            }
                        }
                        self.profile = Some(user);
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
                Vec::new()
            }
            NetworkResponse::Expenses { id, result } => {
                if let Some(ticket) = self.pending_fetches.remove(&id) {
                    self.expenses.apply_page(&ticket, result);
                    self.clamp_selection();
                }
                Vec::new()
            }
            NetworkResponse::ExpenseCreated { result, .. } => {
                if self.new_expense.apply_saved(result, today()) {
                    self.expenses.filter = None;
                    let cmds = self.navigate(Route::Expenses);
                    self.status = Some("Expense saved".to_string());
                    return cmds;
                }
                Vec::new()
            }
            NetworkResponse::ExpenseUpdated { result, .. } => {
                let saved = self
                    .edit_expense
                    .as_mut()
                    .map(|form| form.apply_saved(result, today()))
                    .unwrap_or(false);
                if saved {
                    let cmds = self.navigate(Route::Expenses);
                    self.status = Some("Expense updated".to_string());
                    return cmds;
                }
                Vec::new()
            }
            NetworkResponse::ExpenseDeleted {
                expense_id, result, ..
            } => {
                let failure = result.as_ref().err().map(|e| e.to_string());
                self.expenses.apply_delete(&expense_id, result);
                self.clamp_selection();
                // The store is updated before the dialog goes away
                self.confirm_delete = None;
                self.status = Some(failure.unwrap_or_else(|| "Expense deleted".to_string()));
                Vec::new()
            }
            NetworkResponse::Categories { id, result } => {
                self.categories.apply_fetched(id, result);
                Vec::new()
            }
            NetworkResponse::CategoryCreated { result, .. } => {
                if self.categories.apply_created(result) {
                    self.close_new_category();
                    return vec![self.fetch_categories()];
                }
                Vec::new()
            }
        }
    }
}

/// Parse the search inputs into a date range
fn parse_range(from: &str, to: &str) -> Result<DateRange, String> {
    let parse = |label: &str, value: &str| {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .map_err(|_| format!("Invalid {} date '{}', expected YYYY-MM-DD", label, value.trim()))
    };
    Ok(DateRange {
        from: parse("start", from)?,
        to: parse("end", to)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::AppOptions;
    use crate::constants::INSUFFICIENT_BALANCE_MESSAGE;
    use crate::error::ApiError;
    use crate::models::{
        AuthResponse, Category, Expense, ExpensePage, ExpenseQuery, SavedExpense, User,
    };
    use crate::storage::Storage;
    use crate::store::EmptyState;
    use tempfile::TempDir;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            wallet_balance: Some(100.0),
        }
    }

    fn app(dir: &TempDir, signed_in: bool) -> AppState {
        let mut storage = Storage::open(dir.path());
        if signed_in {
            storage
                .set_session(Some(Session {
                    token: "tok".to_string(),
                    user: user(),
                }))
                .unwrap();
        }
        let options = AppOptions {
            page_size: 2,
            ..Default::default()
        };
        AppState::new(options, storage)
    }

    fn expense(id: &str, amount: f64) -> Expense {
        Expense {
            id: Some(id.to_string()),
            title: format!("expense {}", id),
            amount,
            category: Category::new("c1", "Food"),
            notes: None,
            incurred_on: "2024-03-10T10:00:00Z".parse().unwrap(),
        }
    }

    fn page(ids: &[&str], cursor: Option<&str>) -> ExpensePage {
        ExpensePage {
            expenses: ids.iter().map(|id| expense(id, 10.0)).collect(),
            cursor: cursor.map(String::from),
            has_next_page: cursor.is_some(),
        }
    }

    /// Id and query of the single expense fetch among `cmds`
    fn fetch_of(cmds: &[NetworkCommand]) -> (u64, ExpenseQuery) {
        let fetches: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                NetworkCommand::FetchExpenses { id, query } => Some((*id, query.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(fetches.len(), 1, "expected one fetch in {:?}", cmds);
        fetches[0].clone()
    }

    fn has_mutation(cmds: &[NetworkCommand]) -> bool {
        cmds.iter().any(|c| {
            matches!(
                c,
                NetworkCommand::CreateExpense { .. } | NetworkCommand::UpdateExpense { .. }
            )
        })
    }

    fn loaded_list(dir: &TempDir, ids: &[&str], cursor: Option<&str>) -> AppState {
        let mut app = app(dir, true);
        let cmds = app.startup();
        let (id, _) = fetch_of(&cmds);
        app.handle_response(NetworkResponse::Expenses {
            id,
            result: Ok(page(ids, cursor)),
        });
        app
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            app.enter_char(c);
        }
    }

    #[test]
    fn test_startup_without_session_goes_home() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, false);
        assert!(app.startup().is_empty());
        assert_eq!(app.route, Route::Home);
    }

    #[test]
    fn test_startup_with_session_restores_token_and_fetches() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, true);
        let cmds = app.startup();
        assert!(matches!(&cmds[0], NetworkCommand::SetToken(Some(t)) if t == "tok"));
        assert_eq!(app.route, Route::Expenses);
        let (_, query) = fetch_of(&cmds);
        assert_eq!(query.limit, 2);
        assert!(query.cursor.is_none());
    }

    #[test]
    fn test_protected_routes_redirect_to_signin() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, false);
        for route in Route::ALL {
            app.navigate(route);
            if route.is_protected() {
                assert_eq!(app.route, Route::Signin, "{:?}", route);
            } else {
                assert_eq!(app.route, route);
            }
        }
    }

    #[test]
    fn test_edit_route_without_expense_falls_back_to_list() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, true);
        app.navigate(Route::EditExpense);
        assert_eq!(app.route, Route::Expenses);
    }

    #[test]
    fn test_signin_flow() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, false);
        app.navigate(Route::Signin);
        assert_eq!(app.focus, Focus::Auth(AuthField::Email));
        app.start_editing();
        type_text(&mut app, "ann@example.com");
        app.next_field();
        assert_eq!(app.focus, Focus::Auth(AuthField::Password));
        type_text(&mut app, "secret1");

        let cmds = app.submit();
        let id = match &cmds[..] {
            [NetworkCommand::Signin { id, request }] => {
                assert_eq!(request.email, "ann@example.com");
                *id
            }
            other => panic!("unexpected {:?}", other),
        };
        assert!(app.signin.is_loading);

        let cmds = app.handle_response(NetworkResponse::Signin {
            id,
            result: Ok(AuthResponse {
                success: true,
                message: None,
                token: Some("new".to_string()),
                user: Some(user()),
            }),
        });
        assert!(matches!(&cmds[0], NetworkCommand::SetToken(Some(t)) if t == "new"));
        assert_eq!(app.route, Route::Expenses);
        assert_eq!(app.storage.session().map(|s| s.token.as_str()), Some("new"));
        fetch_of(&cmds);
    }

    #[test]
    fn test_invalid_auth_form_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, false);
        app.navigate(Route::Signup);
        app.start_editing();
        type_text(&mut app, "an");
        assert!(app.signup.has_error(AuthField::Username));
        type_text(&mut app, "n");
        assert!(!app.signup.has_error(AuthField::Username));
        app.delete_char();
        assert_eq!(app.signup.username, "an");
        assert!(app.signup.has_error(AuthField::Username));
        assert!(app.submit().is_empty());
    }

    #[test]
    fn test_sign_out_clears_session_and_data() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a"], None);
        let cmds = app.sign_out();
        assert!(matches!(cmds[0], NetworkCommand::Signout { .. }));
        assert!(matches!(cmds[1], NetworkCommand::SetToken(None)));
        assert_eq!(app.route, Route::Signin);
        assert!(app.storage.session().is_none());
        assert!(app.expenses.expenses.is_empty());
    }

    #[test]
    fn test_unauthorized_response_expires_session() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, true);
        let cmds = app.startup();
        let (id, _) = fetch_of(&cmds);
        let cmds = app.handle_response(NetworkResponse::Expenses {
            id,
            result: Err(ApiError::Unauthorized),
        });
        assert!(matches!(cmds[0], NetworkCommand::SetToken(None)));
        assert_eq!(app.route, Route::Signin);
        assert_eq!(app.status.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
        assert!(!app.is_authenticated());
    }

    #[test]
    fn test_show_more_appends_with_cursor() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], Some("c1"));
        let cmds = app.show_more();
        let (id, query) = fetch_of(&cmds);
        assert_eq!(query.cursor.as_deref(), Some("c1"));
        app.handle_response(NetworkResponse::Expenses {
            id,
            result: Ok(page(&["c"], None)),
        });
        assert_eq!(app.expenses.expenses.len(), 3);
        assert!(app.show_more().is_empty());
    }

    #[test]
    fn test_search_then_back_restores_unfiltered_first_page() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], Some("c1"));
        app.search_from = "2024-03-01".to_string();
        app.search_to = "2024-03-31".to_string();
        let cmds = app.search_date_range();
        let (id, query) = fetch_of(&cmds);
        assert!(query.start_date.is_some());
        app.handle_response(NetworkResponse::Expenses {
            id,
            result: Ok(page(&[], None)),
        });
        assert!(app.expenses.is_filtered());
        assert_eq!(app.expenses.empty_state(), Some(EmptyState::NoMatches));

        let cmds = app.clear_date_range();
        let (id, query) = fetch_of(&cmds);
        assert!(query.start_date.is_none());
        assert!(query.cursor.is_none());
        assert!(!app.expenses.is_filtered());
        app.handle_response(NetworkResponse::Expenses {
            id,
            result: Ok(page(&["a", "b"], Some("c1"))),
        });
        assert_eq!(app.expenses.count, 2);
    }

    #[test]
    fn test_inverted_search_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a"], None);
        app.search_from = "2024-03-31".to_string();
        app.search_to = "2024-03-01".to_string();
        assert!(app.search_date_range().is_empty());
        assert!(app.search_error.is_some());
        assert!(!app.expenses.is_filtered());

        app.search_from = "March".to_string();
        assert!(app.search_date_range().is_empty());
    }

    #[test]
    fn test_stale_page_after_search_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], Some("c1"));
        let (more_id, _) = fetch_of(&app.show_more());

        app.search_from = "2024-03-01".to_string();
        app.search_to = "2024-03-31".to_string();
        let (search_id, _) = fetch_of(&app.search_date_range());
        app.handle_response(NetworkResponse::Expenses {
            id: search_id,
            result: Ok(page(&["m"], None)),
        });
        app.handle_response(NetworkResponse::Expenses {
            id: more_id,
            result: Ok(page(&["c"], None)),
        });
        let ids: Vec<_> = app.expenses.expenses.iter().filter_map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["m".to_string()]);
    }

    #[test]
    fn test_delete_removes_item_then_closes_dialog() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], None);
        app.select_next();
        app.request_delete();
        assert!(app.confirm_delete.is_some());

        let cmds = app.confirm_delete();
        let id = match &cmds[..] {
            [NetworkCommand::DeleteExpense { id, expense_id }] => {
                assert_eq!(expense_id, "b");
                *id
            }
            other => panic!("unexpected {:?}", other),
        };
        // Dialog stays while the delete runs
        app.cancel_delete();
        assert!(app.confirm_delete.is_some());

        app.handle_response(NetworkResponse::ExpenseDeleted {
            id,
            expense_id: "b".to_string(),
            result: Ok(()),
        });
        assert!(app.confirm_delete.is_none());
        assert_eq!(app.expenses.count, 1);
        assert!(app.expenses.expenses.iter().all(|e| e.id.as_deref() != Some("b")));
        assert_eq!(app.selected_expense, 0);
    }

    fn open_new_expense(dir: &TempDir) -> (AppState, u64) {
        let mut app = loaded_list(dir, &["a"], None);
        let cmds = app.navigate(Route::NewExpense);
        let id = match &cmds[..] {
            [NetworkCommand::FetchCategories { id }] => *id,
            other => panic!("unexpected {:?}", other),
        };
        app.handle_response(NetworkResponse::Categories {
            id,
            result: Ok(vec![Category::new("c1", "Food"), Category::new("c2", "Rent")]),
        });
        (app, id)
    }

    fn fill_form(app: &mut AppState, title: &str, amount: &str) {
        app.focus = Focus::Expense(ExpenseField::Title);
        app.start_editing();
        type_text(app, title);
        app.next_field();
        type_text(app, amount);
        app.stop_editing();
        app.next_field();
        app.cycle_category(true);
    }

    #[test]
    fn test_valid_create_coerces_amount_and_category() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        fill_form(&mut app, "Lunch", "12.5");

        let cmds = app.submit();
        let id = match &cmds[..] {
            [NetworkCommand::CreateExpense { id, payload }] => {
                assert_eq!(payload.amount, 12.5);
                assert_eq!(payload.category.id, "c1");
                *id
            }
            other => panic!("unexpected {:?}", other),
        };

        let cmds = app.handle_response(NetworkResponse::ExpenseCreated {
            id,
            result: Ok(SavedExpense {
                id: "new".to_string(),
                title: "Lunch".to_string(),
                amount: 12.5,
                category: "c1".to_string(),
                notes: None,
                incurred_on: chrono::Utc::now(),
            }),
        });
        assert_eq!(app.route, Route::Expenses);
        assert!(app.new_expense.draft.title.is_empty());
        fetch_of(&cmds);
    }

    #[test]
    fn test_non_positive_amount_never_submits() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        for amount in ["0", "-3"] {
            app.new_expense = ExpenseForm::create(today());
            fill_form(&mut app, "Lunch", amount);
            assert!(!has_mutation(&app.submit()));
            assert!(app.new_expense.validation_error.is_some());
        }
    }

    #[test]
    fn test_amount_above_wallet_balance_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        fill_form(&mut app, "TV", "150");
        assert!(!has_mutation(&app.submit()));
        let error = app.new_expense.validation_error.as_ref().unwrap();
        assert_eq!(error.to_string(), INSUFFICIENT_BALANCE_MESSAGE);
    }

    #[test]
    fn test_wallet_balance_override_wins() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        app.options.wallet_balance = Some(1000.0);
        fill_form(&mut app, "TV", "150");
        assert!(has_mutation(&app.submit()));
    }

    #[test]
    fn test_edit_handoff_replaces_in_place_without_refetch() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        app.navigate(Route::Expenses);
        // Answer the refetch triggered by returning to the list
        let id = *app.pending_fetches.keys().next().unwrap();
        app.handle_response(NetworkResponse::Expenses {
            id,
            result: Ok(page(&["a"], None)),
        });

        app.edit_selected();
        assert_eq!(app.route, Route::EditExpense);
        let form = app.edit_expense.as_mut().unwrap();
        form.draft.on_value_change(ExpenseField::Title, "Dinner");
        let cmds = app.submit();
        let id = match &cmds[..] {
            [NetworkCommand::UpdateExpense { id, expense_id, .. }] => {
                assert_eq!(expense_id, "a");
                *id
            }
            other => panic!("unexpected {:?}", other),
        };

        let cmds = app.handle_response(NetworkResponse::ExpenseUpdated {
            id,
            result: Ok(SavedExpense {
                id: "a".to_string(),
                title: "Dinner".to_string(),
                amount: 10.0,
                category: "c2".to_string(),
                notes: None,
                incurred_on: "2024-03-10T10:00:00Z".parse().unwrap(),
            }),
        });
        assert!(cmds.is_empty());
        assert_eq!(app.route, Route::Expenses);
        assert_eq!(app.expenses.expenses[0].title, "Dinner");
        assert_eq!(app.expenses.expenses[0].category.title, "Rent");
        assert!(app.edit_expense.is_none());
    }

    #[test]
    fn test_created_category_refreshes_list_and_keeps_draft() {
        let dir = TempDir::new().unwrap();
        let (mut app, _) = open_new_expense(&dir);
        app.open_new_category();
        type_text(&mut app, "Travel");
        let cmds = app.create_category();
        let id = match &cmds[..] {
            [NetworkCommand::CreateCategory { id, title }] => {
                assert_eq!(title, "Travel");
                *id
            }
            other => panic!("unexpected {:?}", other),
        };

        let cmds = app.handle_response(NetworkResponse::CategoryCreated {
            id,
            result: Ok(Category::new("c3", "Travel")),
        });
        assert!(matches!(cmds[..], [NetworkCommand::FetchCategories { .. }]));
        assert!(!app.show_new_category);
        assert!(app.new_expense.draft.category.is_none());
    }

    #[test]
    fn test_category_created_while_first_fetch_pending() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a"], None);
        let cmds = app.navigate(Route::NewExpense);
        let initial_fetch = match &cmds[..] {
            [NetworkCommand::FetchCategories { id }] => *id,
            other => panic!("unexpected {:?}", other),
        };

        app.open_new_category();
        type_text(&mut app, "Travel");
        let id = match &app.create_category()[..] {
            [NetworkCommand::CreateCategory { id, .. }] => *id,
            other => panic!("unexpected {:?}", other),
        };
        let cmds = app.handle_response(NetworkResponse::CategoryCreated {
            id,
            result: Ok(Category::new("c3", "Travel")),
        });
        let refresh = match &cmds[..] {
            [NetworkCommand::FetchCategories { id }] => *id,
            other => panic!("unexpected {:?}", other),
        };
        assert_ne!(refresh, initial_fetch);
        assert!(app.categories.categories.iter().any(|c| c.title == "Travel"));

        // The older answer predates the new category and must not replace it
        app.handle_response(NetworkResponse::Categories {
            id: initial_fetch,
            result: Ok(vec![Category::new("c1", "Food")]),
        });
        assert!(app.categories.categories.iter().any(|c| c.title == "Travel"));

        app.handle_response(NetworkResponse::Categories {
            id: refresh,
            result: Ok(vec![Category::new("c1", "Food"), Category::new("c3", "Travel")]),
        });
        assert_eq!(app.categories.categories.len(), 2);
        assert!(!app.categories.is_loading);
        assert!(app.new_expense.draft.category.is_none());

        app.cycle_category(false);
        assert_eq!(
            app.new_expense.draft.category.as_ref().map(|c| c.title.as_str()),
            Some("Travel")
        );
    }

    #[test]
    fn test_status_clears_on_navigation() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], None);
        app.request_delete();
        let id = match &app.confirm_delete()[..] {
            [NetworkCommand::DeleteExpense { id, .. }] => *id,
            other => panic!("unexpected {:?}", other),
        };
        app.handle_response(NetworkResponse::ExpenseDeleted {
            id,
            expense_id: "a".to_string(),
            result: Ok(()),
        });
        assert_eq!(app.status.as_deref(), Some("Expense deleted"));

        app.navigate(Route::Profile);
        assert!(app.status.is_none());
        app.navigate(Route::BarChart);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_status_survives_redirect_that_sets_it() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a"], None);
        app.sign_out();
        assert_eq!(app.route, Route::Signin);
        assert_eq!(app.status.as_deref(), Some("Signed out"));
    }

    #[test]
    fn test_reentering_list_keeps_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], None);
        app.select_next();
        app.navigate(Route::Expenses);
        assert_eq!(app.selected_expense, 1);
        assert_eq!(app.storage.scroll_offset(), 1);
    }

    #[test]
    fn test_scroll_position_persists_across_visits() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_list(&dir, &["a", "b"], None);
        app.select_next();
        app.navigate(Route::Profile);
        assert_eq!(app.storage.scroll_offset(), 1);
        app.navigate(Route::Expenses);
        assert_eq!(app.selected_expense, 1);
    }

    #[test]
    fn test_currency_cycles_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, true);
        assert_eq!(app.currency, CURRENCIES[0]);
        app.cycle_currency();
        assert_eq!(app.currency, CURRENCIES[1]);
        assert_eq!(app.storage.currency(), Some(CURRENCIES[1]));
    }

    #[test]
    fn test_chart_routes_do_not_fetch() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, true);
        for route in [
            Route::AvgByCategory,
            Route::ScatterChart,
            Route::BarChart,
            Route::PieChart,
        ] {
            assert!(app.navigate(route).is_empty());
        }
    }

    #[test]
    fn test_cursor_editing_handles_multibyte() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, false);
        app.navigate(Route::Signin);
        app.start_editing();
        type_text(&mut app, "a€b");
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.signin.email, "ab");
        assert_eq!(app.cursor_position, 1);
    }
}
