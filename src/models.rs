//! Wire and domain types shared by every layer
//!
//! Field names follow the API: camelCase with Mongo-style `_id` keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Expense category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

impl Category {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Category reduced to its identifier, as sent on submission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// An expense as returned by the list endpoint (category populated)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub incurred_on: DateTime<Utc>,
}

impl Expense {
    /// Calendar day the expense was incurred on
    pub fn incurred_date(&self) -> NaiveDate {
        self.incurred_on.date_naive()
    }
}

/// An expense as returned by create/update, where `category` is only the id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedExpense {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub incurred_on: DateTime<Utc>,
}

impl SavedExpense {
    /// Rebuild a list entry, resolving the category id against the cache.
    /// Returns `None` when the category is unknown.
    pub fn resolve(&self, categories: &[Category]) -> Option<Expense> {
        let category = categories.iter().find(|c| c.id == self.category)?.clone();
        Some(Expense {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            amount: self.amount,
            category,
            notes: self.notes.clone(),
            incurred_on: self.incurred_on,
        })
    }
}

/// Normalized body of a create/update request
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub title: String,
    pub amount: f64,
    pub category: CategoryRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub incurred_on: DateTime<Utc>,
}

/// One page of the expense list
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Inclusive date range used to filter the expense list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Query parameters of the list endpoint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cursor: Option<String>,
    pub limit: usize,
}

/// Signed-in user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<f64>,
}

/// Persisted authentication
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Body of signup/signin responses
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    /// The session carried by a successful response
    pub fn session(&self) -> Option<Session> {
        match (self.success, &self.token, &self.user) {
            (true, Some(token), Some(user)) => Some(Session {
                token: token.clone(),
                user: user.clone(),
            }),
            _ => None,
        }
    }
}
