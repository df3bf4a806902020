//! Expense form slice shared by the create and edit screens

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{ApiError, ValidationError};
use crate::models::{Category, CategoryRef, Expense, ExpensePayload, SavedExpense};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExpenseField {
    Title,
    Amount,
    Category,
    Notes,
    IncurredOn,
}

impl ExpenseField {
    pub const ALL: [ExpenseField; 5] = [
        ExpenseField::Title,
        ExpenseField::Amount,
        ExpenseField::Category,
        ExpenseField::Notes,
        ExpenseField::IncurredOn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseField::Title => "Title",
            ExpenseField::Amount => "Amount",
            ExpenseField::Category => "Category",
            ExpenseField::Notes => "Notes",
            ExpenseField::IncurredOn => "Date",
        }
    }

    /// Category is picked from a list rather than typed
    pub fn is_text(&self) -> bool {
        !matches!(self, ExpenseField::Category)
    }
}

/// In-progress values of the form
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: String,
    pub category: Option<Category>,
    pub notes: String,
    pub incurred_on: String,
    /// Timestamp of the expense being edited, kept when its date is unchanged
    original_incurred_on: Option<DateTime<Utc>>,
}

impl ExpenseDraft {
    pub fn new(today: NaiveDate) -> Self {
        ExpenseDraft {
            title: String::new(),
            amount: String::new(),
            category: None,
            notes: String::new(),
            incurred_on: today.format(DATE_FORMAT).to_string(),
            original_incurred_on: None,
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        ExpenseDraft {
            title: expense.title.clone(),
            amount: expense.amount.to_string(),
            category: Some(expense.category.clone()),
            notes: expense.notes.clone().unwrap_or_default(),
            incurred_on: expense.incurred_date().format(DATE_FORMAT).to_string(),
            original_incurred_on: Some(expense.incurred_on),
        }
    }

    /// Text of a typed field; `None` for the category picker
    pub fn text(&self, field: ExpenseField) -> Option<&str> {
        match field {
            ExpenseField::Title => Some(&self.title),
            ExpenseField::Amount => Some(&self.amount),
            ExpenseField::Notes => Some(&self.notes),
            ExpenseField::IncurredOn => Some(&self.incurred_on),
            ExpenseField::Category => None,
        }
    }

    fn text_mut(&mut self, field: ExpenseField) -> Option<&mut String> {
        match field {
            ExpenseField::Title => Some(&mut self.title),
            ExpenseField::Amount => Some(&mut self.amount),
            ExpenseField::Notes => Some(&mut self.notes),
            ExpenseField::IncurredOn => Some(&mut self.incurred_on),
            ExpenseField::Category => None,
        }
    }

    /// Stage a typed value into the draft
    pub fn on_value_change(&mut self, field: ExpenseField, value: impl Into<String>) {
        if let Some(slot) = self.text_mut(field) {
            *slot = value.into();
        }
    }

    /// Resolve a category display title to the cached category. An unknown
    /// title clears the selection.
    pub fn select_category(&mut self, title: &str, categories: &[Category]) {
        self.category = categories.iter().find(|c| c.title == title).cloned();
    }

    /// Validate and normalize into a request body. `balance` is the wallet
    /// balance the amount may not exceed, when one is known.
    pub fn to_payload(&self, balance: Option<f64>) -> Result<ExpensePayload, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if let Some(balance) = balance {
            if amount > balance {
                return Err(ValidationError::InsufficientBalance { amount, balance });
            }
        }

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let category = self.category.as_ref().ok_or(ValidationError::MissingCategory)?;
        let incurred_on = self.incurred_timestamp()?;

        let notes = self.notes.trim();
        Ok(ExpensePayload {
            title: title.to_string(),
            amount,
            category: CategoryRef {
                id: category.id.clone(),
            },
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            incurred_on,
        })
    }

    fn incurred_timestamp(&self) -> Result<DateTime<Utc>, ValidationError> {
        let date = NaiveDate::parse_from_str(self.incurred_on.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(self.incurred_on.clone()))?;
        match self.original_incurred_on {
            Some(original) if original.date_naive() == date => Ok(original),
            _ => Ok(date.and_time(NaiveTime::MIN).and_utc()),
        }
    }
}

/// Numeric coercion of the amount field. Blank reads as zero.
fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidAmount(raw.trim().to_string())),
    }
}

/// What a valid submission asks the network layer to do
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitRequest {
    Create(ExpensePayload),
    Update { id: String, payload: ExpensePayload },
}

/// Form state for one screen: the draft plus request bookkeeping
#[derive(Clone, Debug)]
pub struct ExpenseForm {
    pub draft: ExpenseDraft,
    /// Expense being edited; `None` on the create screen
    pub expense_to_edit: Option<Expense>,
    pub is_loading: bool,
    pub validation_error: Option<ValidationError>,
    pub server_error: Option<String>,
    /// Last successful update, waiting to be handed back to the list
    pub edited_expense: Option<SavedExpense>,
    pub did_finish_editing: bool,
}

impl ExpenseForm {
    pub fn create(today: NaiveDate) -> Self {
        ExpenseForm {
            draft: ExpenseDraft::new(today),
            expense_to_edit: None,
            is_loading: false,
            validation_error: None,
            server_error: None,
            edited_expense: None,
            did_finish_editing: false,
        }
    }

    /// Reset the form to the values of the selected expense
    pub fn edit(expense: &Expense, today: NaiveDate) -> Self {
        let mut form = ExpenseForm::create(today);
        form.draft = ExpenseDraft::from_expense(expense);
        form.expense_to_edit = Some(expense.clone());
        form
    }

    pub fn is_edit(&self) -> bool {
        self.expense_to_edit.is_some()
    }

    /// Validate the draft. On failure the error is kept for display and
    /// nothing is returned, so no request goes out.
    pub fn submit(&mut self, balance: Option<f64>) -> Option<SubmitRequest> {
        if self.is_loading {
            return None;
        }
        self.server_error = None;
        let payload = match self.draft.to_payload(balance) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Expense draft rejected");
                self.validation_error = Some(e);
                return None;
            }
        };
        self.validation_error = None;

        let request = match self.expense_to_edit.as_ref().and_then(|e| e.id.clone()) {
            Some(id) => SubmitRequest::Update { id, payload },
            None => SubmitRequest::Create(payload),
        };
        self.is_loading = true;
        Some(request)
    }

    /// Apply a create/update completion. Returns true on success.
    pub fn apply_saved(&mut self, result: Result<SavedExpense, ApiError>, today: NaiveDate) -> bool {
        self.is_loading = false;
        match result {
            Ok(saved) => {
                if self.is_edit() {
                    self.edited_expense = Some(saved);
                    self.did_finish_editing = true;
                } else {
                    self.draft = ExpenseDraft::new(today);
                }
                true
            }
            Err(e) => {
                self.server_error = Some(e.to_string());
                false
            }
        }
    }

    /// Take the finished edit, leaving the flag cleared
    pub fn take_edited(&mut self) -> Option<SavedExpense> {
        if !self.did_finish_editing {
            return None;
        }
        self.did_finish_editing = false;
        self.edited_expense.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INSUFFICIENT_BALANCE_MESSAGE;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn categories() -> Vec<Category> {
        vec![Category::new("c1", "Food"), Category::new("c2", "Rent")]
    }

    fn valid_draft() -> ExpenseDraft {
        let mut draft = ExpenseDraft::new(today());
        draft.on_value_change(ExpenseField::Title, "Groceries");
        draft.on_value_change(ExpenseField::Amount, "42.50");
        draft.select_category("Food", &categories());
        draft
    }

    #[test]
    fn test_payload_is_normalized() {
        let payload = valid_draft().to_payload(None).unwrap();
        assert_eq!(payload.amount, 42.5);
        assert_eq!(payload.category, CategoryRef { id: "c1".to_string() });
        assert_eq!(payload.notes, None);
        assert_eq!(payload.incurred_on.date_naive(), today());
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        for raw in ["0", "-5", "", "  "] {
            let mut draft = valid_draft();
            draft.on_value_change(ExpenseField::Amount, raw);
            assert_eq!(draft.to_payload(None), Err(ValidationError::NonPositiveAmount));
        }
        let mut draft = valid_draft();
        draft.on_value_change(ExpenseField::Amount, "abc");
        assert!(matches!(draft.to_payload(None), Err(ValidationError::InvalidAmount(_))));
    }

    #[test]
    fn test_amount_above_balance_is_rejected() {
        let err = valid_draft().to_payload(Some(40.0)).unwrap_err();
        assert_eq!(err.to_string(), INSUFFICIENT_BALANCE_MESSAGE);
        assert!(valid_draft().to_payload(Some(42.5)).is_ok());
    }

    #[test]
    fn test_unknown_category_title_clears_selection() {
        let mut draft = valid_draft();
        draft.select_category("Travel", &categories());
        assert_eq!(draft.to_payload(None), Err(ValidationError::MissingCategory));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut draft = valid_draft();
        draft.on_value_change(ExpenseField::IncurredOn, "20/05/2024");
        assert!(matches!(draft.to_payload(None), Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn test_invalid_submit_keeps_error_and_sends_nothing() {
        let mut form = ExpenseForm::create(today());
        form.draft = valid_draft();
        form.draft.on_value_change(ExpenseField::Amount, "0");
        assert!(form.submit(None).is_none());
        assert!(!form.is_loading);
        assert_eq!(form.validation_error, Some(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn test_edit_submits_update_and_keeps_timestamp() {
        let expense = Expense {
            id: Some("e1".to_string()),
            title: "Rent".to_string(),
            amount: 900.0,
            category: Category::new("c2", "Rent"),
            notes: Some("May".to_string()),
            incurred_on: "2024-05-01T08:30:00Z".parse().unwrap(),
        };
        let mut form = ExpenseForm::edit(&expense, today());
        match form.submit(None).unwrap() {
            SubmitRequest::Update { id, payload } => {
                assert_eq!(id, "e1");
                assert_eq!(payload.incurred_on, expense.incurred_on);
                assert_eq!(payload.notes.as_deref(), Some("May"));
            }
            other => panic!("expected update, got {:?}", other),
        }
        assert!(form.is_loading);
    }

    #[test]
    fn test_saved_create_resets_draft_and_failure_keeps_it() {
        let mut form = ExpenseForm::create(today());
        form.draft = valid_draft();
        form.submit(None).unwrap();
        assert!(!form.apply_saved(Err(ApiError::Timeout), today()));
        assert_eq!(form.draft.title, "Groceries");
        assert_eq!(form.server_error.as_deref(), Some("Request timed out"));

        form.submit(None).unwrap();
        let saved = SavedExpense {
            id: "e9".to_string(),
            title: "Groceries".to_string(),
            amount: 42.5,
            category: "c1".to_string(),
            notes: None,
            incurred_on: Utc::now(),
        };
        assert!(form.apply_saved(Ok(saved), today()));
        assert!(form.draft.title.is_empty());
        assert!(!form.did_finish_editing);
    }
}
