//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::messages::RenderState;
use crate::routes::Route;
use crate::store::{AuthField, ExpenseField};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    Navigate(Route),
    NextField,
    PrevField,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,

    /// Submit the form of the current route
    Submit,

    // Expense list
    SelectNext,
    SelectPrev,
    ShowMore,
    Refresh,
    StartSearch,
    SearchDateRange,
    ClearDateRange,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    EditSelected,

    // Expense form
    NextCategory,
    PrevCategory,
    OpenNewCategory,
    CloseNewCategory,
    CreateCategory,

    // Profile
    CycleCurrency,
    SignOut,

    // Charts
    ChartPrevPeriod,
    ChartNextPeriod,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Element of the current view that receives input
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Focus {
    #[default]
    None,
    Auth(AuthField),
    Expense(ExpenseField),
    List,
    SearchFrom,
    SearchTo,
    NewCategory,
}

impl Focus {
    /// Whether the focused element is edited by typing
    pub fn is_text(&self) -> bool {
        match self {
            Focus::Auth(_) | Focus::SearchFrom | Focus::SearchTo | Focus::NewCategory => true,
            Focus::Expense(field) => field.is_text(),
            Focus::None | Focus::List => false,
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Focus::SearchFrom | Focus::SearchTo)
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Popups take every key
    if state.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if state.confirm_delete.is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelDelete),
            _ => None,
        };
    }

    match state.input_mode {
        InputMode::Editing => editing_keys(key, state),
        InputMode::Normal => normal_keys(key, state),
    }
}

fn editing_keys(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc if state.focus == Focus::NewCategory => Some(UiEvent::CloseNewCategory),
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Enter => match state.focus {
            Focus::NewCategory => Some(UiEvent::CreateCategory),
            Focus::SearchFrom | Focus::SearchTo => Some(UiEvent::SearchDateRange),
            _ => Some(UiEvent::StopEditing),
        },
        KeyCode::Tab if state.focus != Focus::NewCategory => Some(UiEvent::NextField),
        KeyCode::BackTab if state.focus != Focus::NewCategory => Some(UiEvent::PrevField),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn normal_keys(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    if let Some(event) = route_keys(key, state) {
        return Some(event);
    }

    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Char('e') | KeyCode::Enter if state.focus.is_text() => Some(UiEvent::StartEditing),
        KeyCode::Char('h') => Some(UiEvent::Navigate(Route::Home)),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10)? as usize - 1;
            Route::NAV.get(index).map(|route| UiEvent::Navigate(*route))
        }
        KeyCode::Char('i') if state.session.is_none() => Some(UiEvent::Navigate(Route::Signin)),
        KeyCode::Char('u') if state.session.is_none() => Some(UiEvent::Navigate(Route::Signup)),
        _ => None,
    }
}

/// Keys whose meaning depends on the current route
fn route_keys(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    match state.route {
        Route::Signup | Route::Signin => match key.code {
            KeyCode::Char('s') => Some(UiEvent::Submit),
            _ => None,
        },
        Route::Expenses => match key.code {
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectNext),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectPrev),
            KeyCode::Char('m') => Some(UiEvent::ShowMore),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            KeyCode::Char('/') => Some(UiEvent::StartSearch),
            KeyCode::Char('b') => Some(UiEvent::ClearDateRange),
            KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::RequestDelete),
            KeyCode::Char('e') | KeyCode::Enter if state.focus == Focus::List => {
                Some(UiEvent::EditSelected)
            }
            KeyCode::Char('n') => Some(UiEvent::Navigate(Route::NewExpense)),
            _ => None,
        },
        Route::NewExpense | Route::EditExpense => match key.code {
            KeyCode::Char('s') => Some(UiEvent::Submit),
            KeyCode::Char('c') => Some(UiEvent::OpenNewCategory),
            KeyCode::Right | KeyCode::Down | KeyCode::Enter
                if state.focus == Focus::Expense(ExpenseField::Category) =>
            {
                Some(UiEvent::NextCategory)
            }
            KeyCode::Left | KeyCode::Up if state.focus == Focus::Expense(ExpenseField::Category) => {
                Some(UiEvent::PrevCategory)
            }
            KeyCode::Esc if state.route == Route::EditExpense => {
                Some(UiEvent::Navigate(Route::Expenses))
            }
            _ => None,
        },
        Route::Profile => match key.code {
            KeyCode::Char('c') => Some(UiEvent::CycleCurrency),
            KeyCode::Char('o') => Some(UiEvent::SignOut),
            _ => None,
        },
        route if route.is_chart() => match key.code {
            KeyCode::Left | KeyCode::Char('[') => Some(UiEvent::ChartPrevPeriod),
            KeyCode::Right | KeyCode::Char(']') => Some(UiEvent::ChartNextPeriod),
            _ => None,
        },
        _ => None,
    }
}
