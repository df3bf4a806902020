//! Expense list slice: pages, cursor, date-range filter and deletions
//!
//! Every fetch is tagged with the filter epoch it was issued under. Changing
//! the filter bumps the epoch and clears the collection together with the
//! cursor/count/has-next-page triple, so pages of different filters never mix.
//! Responses from an older epoch are dropped.

use std::collections::HashSet;

use crate::error::{ApiError, ValidationError};
use crate::models::{DateRange, Expense, ExpensePage, ExpenseQuery};

/// How a fetched page is merged into the collection
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FetchMode {
    Replace,
    Append,
}

/// A fetch issued by the list, remembered until its response arrives
#[derive(Clone, Debug, PartialEq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub mode: FetchMode,
    pub query: ExpenseQuery,
}

/// Which empty view the list should show
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EmptyState {
    /// No filter active: the user has no expenses at all
    NoExpenses,
    /// A date-range search matched nothing
    NoMatches,
}

#[derive(Clone, Debug)]
pub struct ExpenseListState {
    pub expenses: Vec<Expense>,
    pub cursor: Option<String>,
    pub count: usize,
    pub has_next_page: bool,
    pub is_loading: bool,
    pub is_deleting: bool,
    pub filter: Option<DateRange>,
    pub error: Option<String>,
    /// At least one page arrived since the last reset
    pub loaded: bool,
    epoch: u64,
    removed: HashSet<String>,
    page_size: usize,
}

impl ExpenseListState {
    pub fn new(page_size: usize) -> Self {
        ExpenseListState {
            expenses: Vec::new(),
            cursor: None,
            count: 0,
            has_next_page: false,
            is_loading: false,
            is_deleting: false,
            filter: None,
            error: None,
            loaded: false,
            epoch: 0,
            removed: HashSet::new(),
            page_size: page_size.max(1),
        }
    }

    /// The "filtered" flag: a date-range search produced the current results
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    /// Whether the "back to unfiltered list" action is available
    pub fn show_back_button(&self) -> bool {
        self.is_filtered()
    }

    /// Request the unfiltered first page, discarding the current results
    pub fn fetch_first_page(&mut self) -> FetchTicket {
        self.start_over(None)
    }

    /// Request the first page of a date-range search
    pub fn search(&mut self, range: DateRange) -> Result<FetchTicket, ValidationError> {
        if range.from > range.to {
            return Err(ValidationError::InvertedDateRange);
        }
        Ok(self.start_over(Some(range)))
    }

    /// Leave a filtered view: clear the flag and request the unfiltered first page
    pub fn reset_filter(&mut self) -> FetchTicket {
        self.start_over(None)
    }

    /// Append the next page under the current filter. `None` when there is
    /// nothing more to load or a fetch is already running.
    pub fn show_more(&mut self) -> Option<FetchTicket> {
        if self.is_loading || !self.has_next_page {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.is_loading = true;
        self.error = None;
        Some(FetchTicket {
            epoch: self.epoch,
            mode: FetchMode::Append,
            query: self.query(Some(cursor)),
        })
    }

    fn start_over(&mut self, filter: Option<DateRange>) -> FetchTicket {
        self.epoch += 1;
        self.filter = filter;
        self.expenses.clear();
        self.cursor = None;
        self.count = 0;
        self.has_next_page = false;
        self.loaded = false;
        self.error = None;
        self.is_loading = true;
        FetchTicket {
            epoch: self.epoch,
            mode: FetchMode::Replace,
            query: self.query(None),
        }
    }

    fn query(&self, cursor: Option<String>) -> ExpenseQuery {
        ExpenseQuery {
            start_date: self.filter.map(|f| f.from),
            end_date: self.filter.map(|f| f.to),
            cursor,
            limit: self.page_size,
        }
    }

    /// Merge a fetch response. Returns false when the response was stale and ignored.
    pub fn apply_page(&mut self, ticket: &FetchTicket, result: Result<ExpensePage, ApiError>) -> bool {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "Dropping expense page from a previous filter"
            );
            return false;
        }
        self.is_loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.error = Some(e.to_string());
                return true;
            }
        };

        let incoming: Vec<Expense> = page
            .expenses
            .into_iter()
            .filter(|e| e.id.as_ref().map_or(true, |id| !self.removed.contains(id)))
            .collect();

        match ticket.mode {
            FetchMode::Replace => {
                self.count = incoming.len();
                self.expenses = incoming;
            }
            FetchMode::Append => {
                for expense in incoming {
                    let duplicate = expense.id.is_some()
                        && self.expenses.iter().any(|e| e.id == expense.id);
                    if !duplicate {
                        self.expenses.push(expense);
                        self.count += 1;
                    }
                }
            }
        }

        self.cursor = page.cursor;
        self.has_next_page = page.has_next_page && self.cursor.is_some();
        self.loaded = true;
        true
    }

    /// Mark a delete as running. `false` if one is already in flight.
    pub fn begin_delete(&mut self) -> bool {
        if self.is_deleting {
            return false;
        }
        self.is_deleting = true;
        true
    }

    /// Apply a delete completion. On success the expense is removed, the
    /// running count decremented and the id remembered so a later page
    /// cannot bring it back.
    pub fn apply_delete(&mut self, expense_id: &str, result: Result<(), ApiError>) {
        self.is_deleting = false;
        match result {
            Ok(()) => {
                self.removed.insert(expense_id.to_string());
                let before = self.expenses.len();
                self.expenses.retain(|e| e.id.as_deref() != Some(expense_id));
                if self.expenses.len() < before {
                    self.count = self.count.saturating_sub(1);
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Replace an expense in place after it was edited
    pub fn apply_edited(&mut self, edited: Expense) -> bool {
        match self.expenses.iter_mut().find(|e| e.id.is_some() && e.id == edited.id) {
            Some(slot) => {
                *slot = edited;
                true
            }
            None => false,
        }
    }

    /// Loader is shown while nothing is loaded yet, or while an unfiltered
    /// list without further pages is being refreshed
    pub fn should_show_loader(&self) -> bool {
        self.is_loading && (self.count == 0 || (!self.is_filtered() && !self.has_next_page))
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.is_loading || !self.loaded || !self.expenses.is_empty() {
            return None;
        }
        if self.is_filtered() {
            Some(EmptyState::NoMatches)
        } else {
            Some(EmptyState::NoExpenses)
        }
    }

    /// Forget everything, e.g. on sign out
    pub fn clear(&mut self) {
        *self = ExpenseListState::new(self.page_size);
    }
}
