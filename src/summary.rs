//! Spending summaries derived from the loaded expenses
//!
//! Everything here is a pure function of the cached collection. Nothing is
//! fetched for a chart; an empty collection yields zero totals.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::Expense;

/// "You've spent" totals shown on the home view
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurrentSummary {
    pub month: f64,
    pub today: f64,
    pub yesterday: f64,
}

impl CurrentSummary {
    pub fn compute(expenses: &[Expense], today: NaiveDate) -> Self {
        let yesterday = today - Duration::days(1);
        let mut summary = CurrentSummary::default();
        for expense in expenses {
            let date = expense.incurred_date();
            if date.year() == today.year() && date.month() == today.month() {
                summary.month += expense.amount;
            }
            if date == today {
                summary.today += expense.amount;
            } else if date == yesterday {
                summary.yesterday += expense.amount;
            }
        }
        summary
    }
}

/// Spending of one category
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
    /// Share of all spending, 0-100
    pub percentage: f64,
}

impl CategoryTotal {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Per-category totals, largest first. Ties keep alphabetical order.
pub fn category_totals<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Vec<CategoryTotal> {
    let mut by_category: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut grand_total = 0.0;
    for expense in expenses {
        let entry = by_category
            .entry(expense.category.title.as_str())
            .or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
        grand_total += expense.amount;
    }

    let mut totals: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
            percentage: if grand_total > 0.0 {
                total * 100.0 / grand_total
            } else {
                0.0
            },
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

/// Average spending per category across the whole collection
pub fn category_averages(expenses: &[Expense]) -> Vec<CategoryTotal> {
    category_totals(expenses)
}

/// Category shares of one month, for the pie view
pub fn category_shares(expenses: &[Expense], period: ChartPeriod) -> Vec<CategoryTotal> {
    category_totals(expenses.iter().filter(|e| period.contains(e.incurred_date())))
}

/// (day of month, amount) points of one month, in date order
pub fn scatter_points(expenses: &[Expense], period: ChartPeriod) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = expenses
        .iter()
        .filter(|e| period.contains(e.incurred_date()))
        .map(|e| (e.incurred_date().day() as f64, e.amount))
        .collect();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    points
}

/// Total spent in each month of `year`, January first
pub fn monthly_totals(expenses: &[Expense], year: i32) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for expense in expenses {
        let date = expense.incurred_date();
        if date.year() == year {
            totals[date.month0() as usize] += expense.amount;
        }
    }
    totals
}

/// Month selected on the chart views
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartPeriod {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl ChartPeriod {
    pub fn containing(date: NaiveDate) -> Self {
        ChartPeriod {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            ChartPeriod {
                year: self.year - 1,
                month: 12,
            }
        } else {
            ChartPeriod {
                month: self.month - 1,
                ..self
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            ChartPeriod {
                year: self.year + 1,
                month: 1,
            }
        } else {
            ChartPeriod {
                month: self.month + 1,
                ..self
            }
        }
    }

    /// e.g. "March 2024"
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}
