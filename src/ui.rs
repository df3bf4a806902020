//! Views - ratatui rendering of a `RenderState`

use ratatui::{prelude::*, widgets::*};

use crate::constants::{APP_NAME, NO_EXPENSES_MESSAGE, NO_MATCHES_MESSAGE};
use crate::messages::{Focus, InputMode, RenderState};
use crate::routes::Route;
use crate::store::{AuthField, AuthForm, EmptyState, ExpenseField, ExpenseForm};
use crate::summary::{self, CurrentSummary};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Draw a full frame
pub fn draw(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Nav bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_nav_bar(f, state, chunks[0]);

    match state.route {
        Route::Home => draw_home(f, state, chunks[1]),
        Route::Signup => draw_auth_form(f, state, &state.signup, chunks[1]),
        Route::Signin => draw_auth_form(f, state, &state.signin, chunks[1]),
        Route::Expenses => draw_expenses(f, state, chunks[1]),
        Route::NewExpense | Route::EditExpense => draw_expense_form(f, state, chunks[1]),
        Route::Profile => draw_profile(f, state, chunks[1]),
        Route::AvgByCategory => draw_category_averages(f, state, chunks[1]),
        Route::ScatterChart => draw_scatter(f, state, chunks[1]),
        Route::BarChart => draw_bar(f, state, chunks[1]),
        Route::PieChart => draw_pie(f, state, chunks[1]),
    }

    draw_status_bar(f, state, chunks[2]);

    // Popups
    if state.show_new_category {
        draw_new_category_popup(f, state, area);
    }
    if state.confirm_delete.is_some() {
        draw_confirm_delete_popup(f, state, area);
    }
    if state.show_help {
        draw_help_popup(f, area);
    }
}

/// Amount with the currency symbol, thousands separators and two decimals
pub fn format_amount(currency: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, currency, grouped, frac_part)
}

fn focus_style(focused: bool, editing: bool) -> Style {
    if focused && editing {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Bordered single-line input; places the cursor while it is being edited
fn draw_input(f: &mut Frame, state: &RenderState, area: Rect, title: &str, value: &str, focus: Focus) {
    let focused = state.focus == focus;
    let editing = focused && state.input_mode == InputMode::Editing;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused, editing))
        .title(format!(" {} ", title));
    f.render_widget(Paragraph::new(value.to_string()).block(block), area);

    if editing {
        let typed = value
            .get(..state.cursor_position.min(value.len()))
            .map(|s| s.chars().count())
            .unwrap_or(0) as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        let cursor_x = (area.x + typed + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, area.y + 1));
    }
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))
}

fn hint_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn draw_nav_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", APP_NAME),
        Style::default().fg(Color::Black).bg(Color::Green).bold(),
    )];

    let entries: Vec<(String, Route)> = if state.session.is_some() {
        Route::NAV
            .iter()
            .enumerate()
            .map(|(i, r)| (format!("{}:{}", i + 1, r.title()), *r))
            .collect()
    } else {
        vec![
            ("h:Home".to_string(), Route::Home),
            ("i:Sign in".to_string(), Route::Signin),
            ("u:Sign up".to_string(), Route::Signup),
        ]
    };

    for (label, route) in entries {
        spans.push(Span::raw(" "));
        let active = route == state.route
            || (route == Route::Expenses && state.route == Route::EditExpense);
        let style = if active {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
    }

    if let Some(user) = &state.session {
        spans.push(Span::styled(
            format!("  [{}]", user.username),
            Style::default().fg(Color::Green),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_home(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Home ");

    if state.session.is_none() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Welcome to {}", APP_NAME),
                Style::default().bold(),
            )),
            Line::from("Keep track of what you spend, day by day."),
            Line::from(""),
            hint_line("Press 'i' to sign in or 'u' to create an account."),
        ];
        let welcome = Paragraph::new(lines).block(block).alignment(Alignment::Center);
        f.render_widget(welcome, area);
        return;
    }

    let current = CurrentSummary::compute(&state.expenses.expenses, state.today);
    let amount = |value: f64| {
        Span::styled(
            format_amount(&state.currency, value),
            Style::default().fg(Color::Cyan).bold(),
        )
    };
    let lines = vec![
        Line::from(""),
        Line::from("You've spent"),
        Line::from(""),
        Line::from(vec![amount(current.month), Span::raw(" this month")]),
        Line::from(vec![amount(current.today), Span::raw(" today")]),
        Line::from(vec![amount(current.yesterday), Span::raw(" yesterday")]),
        Line::from(""),
        hint_line("Totals cover the expenses loaded in the list."),
    ];
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn draw_auth_form(f: &mut Frame, state: &RenderState, form: &AuthForm, area: Rect) {
    let title = match state.route {
        Route::Signup => " Sign up ",
        _ => " Sign in ",
    };
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let fields = form.fields();
    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let value = match field {
            AuthField::Password => "*".repeat(form.password.chars().count()),
            _ => form.value(*field).to_string(),
        };
        let label = if form.has_error(*field) {
            format!("{} ({})", field.label(), field.hint())
        } else {
            field.label().to_string()
        };
        draw_input(f, state, chunks[i], &label, &value, Focus::Auth(*field));
    }

    let mut lines = Vec::new();
    if form.is_loading {
        lines.push(hint_line("Submitting..."));
    }
    if let Some(error) = &form.server_error {
        lines.push(error_line(error));
    }
    lines.push(hint_line("Tab: next field | e: edit | s: submit"));
    f.render_widget(Paragraph::new(lines), chunks[fields.len()]);
}

fn draw_expenses(f: &mut Frame, state: &RenderState, area: Rect) {
    let list = &state.expenses;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(3),    // List
            Constraint::Length(1), // Footer
        ])
        .split(area);

    // Search bar
    let search = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Min(0),
        ])
        .split(chunks[0]);
    draw_input(f, state, search[0], "From", &state.search_from, Focus::SearchFrom);
    draw_input(f, state, search[1], "To", &state.search_to, Focus::SearchTo);
    let mut search_hint = vec![hint_line(" /: search  Enter: apply")];
    if list.show_back_button() {
        search_hint.push(Line::from(Span::styled(
            " b: back to all expenses",
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(error) = &state.search_error {
        search_hint.push(error_line(&format!(" {}", error)));
    }
    f.render_widget(Paragraph::new(search_hint), search[2]);

    // List
    let title = if list.is_filtered() {
        " Expenses (filtered) "
    } else {
        " Expenses "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state.focus == Focus::List, false))
        .title(title);

    if list.should_show_loader() {
        f.render_widget(Paragraph::new(hint_line("Loading expenses...")).block(block), chunks[1]);
    } else if let Some(empty) = list.empty_state() {
        let message = match empty {
            EmptyState::NoExpenses => NO_EXPENSES_MESSAGE,
            EmptyState::NoMatches => NO_MATCHES_MESSAGE,
        };
        f.render_widget(
            Paragraph::new(message).block(block).wrap(Wrap { trim: true }),
            chunks[1],
        );
    } else {
        let items: Vec<ListItem> = list
            .expenses
            .iter()
            .map(|e| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        e.incurred_date().format("%Y-%m-%d ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(format!("{:<24} ", truncate(&e.title, 24))),
                    Span::styled(
                        format!("{:<14} ", truncate(&e.category.title, 14)),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::styled(
                        format_amount(&state.currency, e.amount),
                        Style::default().fg(Color::Cyan),
                    ),
                ]))
            })
            .collect();
        let widget = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).bold())
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        if !list.expenses.is_empty() {
            list_state.select(Some(state.selected_expense.min(list.expenses.len() - 1)));
        }
        f.render_stateful_widget(widget, chunks[1], &mut list_state);
    }

    // Footer
    let mut footer = vec![Span::styled(
        format!(" {} shown ", list.count),
        Style::default().fg(Color::Gray),
    )];
    if list.has_next_page {
        footer.push(Span::styled(
            if list.is_loading { " Loading more... " } else { " m: show more " },
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &list.error {
        footer.push(Span::styled(format!(" {} ", error), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn draw_expense_form(f: &mut Frame, state: &RenderState, area: Rect) {
    let title = if state.route == Route::EditExpense {
        " Edit expense "
    } else {
        " New expense "
    };
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let Some(form) = &state.form else {
        return;
    };

    let mut constraints: Vec<Constraint> = ExpenseField::ALL
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (i, field) in ExpenseField::ALL.iter().enumerate() {
        if !field.is_text() {
            draw_category_picker(f, state, form, chunks[i]);
            continue;
        }
        let value = form.draft.text(*field).unwrap_or("");
        let label = match field {
            ExpenseField::IncurredOn => "Date (YYYY-MM-DD)",
            other => other.label(),
        };
        draw_input(f, state, chunks[i], label, value, Focus::Expense(*field));
    }

    draw_form_messages(f, state, form, chunks[ExpenseField::ALL.len()]);
}

fn draw_category_picker(f: &mut Frame, state: &RenderState, form: &ExpenseForm, area: Rect) {
    let focused = state.focus == Focus::Expense(ExpenseField::Category);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused, false))
        .title(" Category (←/→ choose, c: new) ");

    let content = match (&form.draft.category, state.categories.is_loading) {
        (Some(category), _) => Line::from(Span::styled(
            category.title.clone(),
            Style::default().fg(Color::Magenta),
        )),
        (None, true) => hint_line("Loading categories..."),
        (None, false) if state.categories.categories.is_empty() => {
            hint_line("No categories yet, press 'c' to add one")
        }
        (None, false) => hint_line("None selected"),
    };
    f.render_widget(Paragraph::new(content).block(block), area);
}

fn draw_form_messages(f: &mut Frame, state: &RenderState, form: &ExpenseForm, area: Rect) {
    let mut lines = Vec::new();
    if form.is_loading {
        lines.push(hint_line("Saving..."));
    }
    if let Some(error) = &form.validation_error {
        lines.push(error_line(&error.to_string()));
    }
    if let Some(error) = &form.server_error {
        lines.push(error_line(error));
    }
    if let Some(balance) = state.wallet_balance {
        lines.push(hint_line(&format!(
            "Wallet balance: {}",
            format_amount(&state.currency, balance)
        )));
    }
    let hint = if state.route == Route::EditExpense {
        "Tab: next field | e: edit | s: save | Esc: back"
    } else {
        "Tab: next field | e: edit | s: save"
    };
    lines.push(hint_line(hint));
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_profile(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");
    let label = |text: &str| Span::styled(format!("{:<16}", text), Style::default().fg(Color::Gray));

    let lines = match state.profile.as_ref().or(state.session.as_ref()) {
        Some(user) => vec![
            Line::from(""),
            Line::from(vec![label("Username"), Span::raw(user.username.clone())]),
            Line::from(vec![label("Email"), Span::raw(user.email.clone())]),
            Line::from(vec![
                label("Wallet balance"),
                Span::raw(
                    state
                        .wallet_balance
                        .map(|b| format_amount(&state.currency, b))
                        .unwrap_or_else(|| "not set".to_string()),
                ),
            ]),
            Line::from(vec![label("Currency"), Span::raw(state.currency.clone())]),
            Line::from(""),
            hint_line("c: change currency | o: sign out"),
        ],
        None => vec![hint_line("Loading profile...")],
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_category_averages(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Average expense by category ");
    let averages = summary::category_averages(&state.expenses.expenses);

    if averages.is_empty() {
        f.render_widget(Paragraph::new(NO_EXPENSES_MESSAGE).block(block), area);
        return;
    }

    let rows: Vec<Row> = averages
        .iter()
        .map(|c| {
            Row::new(vec![
                c.category.clone(),
                c.count.to_string(),
                format_amount(&state.currency, c.total),
                format_amount(&state.currency, c.average()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
        ],
    )
    .header(
        Row::new(vec!["Category", "Count", "Total", "Average"])
            .style(Style::default().fg(Color::Yellow).bold()),
    )
    .block(block);
    f.render_widget(table, area);
}

fn period_title(kind: &str, label: &str) -> String {
    format!(" {} - {} (←/→ change) ", kind, label)
}

fn draw_scatter(f: &mut Frame, state: &RenderState, area: Rect) {
    let period = state.chart_period;
    let points = summary::scatter_points(&state.expenses.expenses, period);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(period_title("Expenses per day", &period.label()));

    if points.is_empty() {
        f.render_widget(Paragraph::new(hint_line("No expenses in this month.")).block(block), area);
        return;
    }

    let max_amount = points.iter().map(|(_, y)| *y).fold(0.0, f64::max).max(1.0);
    let dataset = Dataset::default()
        .name("amount")
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Day")
                .bounds([1.0, 31.0])
                .labels(["1", "8", "15", "22", "31"]),
        )
        .y_axis(
            Axis::default()
                .title(state.currency.clone())
                .bounds([0.0, max_amount * 1.1])
                .labels([
                    "0".to_string(),
                    format!("{:.0}", max_amount / 2.0),
                    format!("{:.0}", max_amount),
                ]),
        );
    f.render_widget(chart, area);
}

fn draw_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let year = state.chart_period.year;
    let totals = summary::monthly_totals(&state.expenses.expenses, year);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(period_title("Monthly totals", &year.to_string()));

    let bars: Vec<Bar> = totals
        .iter()
        .zip(MONTHS)
        .map(|(total, month)| {
            Bar::default()
                .value(total.round().max(0.0) as u64)
                .label(month.into())
                .text_value(format!("{:.0}", total))
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}

fn draw_pie(f: &mut Frame, state: &RenderState, area: Rect) {
    let period = state.chart_period;
    let shares = summary::category_shares(&state.expenses.expenses, period);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(period_title("Share by category", &period.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if shares.is_empty() {
        f.render_widget(Paragraph::new(hint_line("No expenses in this month.")), inner);
        return;
    }

    const COLORS: [Color; 6] = [
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Red,
    ];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(shares.iter().map(|_| Constraint::Length(1)).chain([Constraint::Min(0)]))
        .split(inner);

    for (i, share) in shares.iter().enumerate() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(COLORS[i % COLORS.len()]))
            .ratio((share.percentage / 100.0).clamp(0.0, 1.0))
            .label(format!(
                "{} {:.1}% ({})",
                share.category,
                share.percentage,
                format_amount(&state.currency, share.total)
            ));
        f.render_widget(gauge, rows[i]);
    }
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if let Some(status) = &state.status {
        let bar = Paragraph::new(format!(" {} ", status)).style(Style::default().fg(Color::Yellow));
        f.render_widget(bar, area);
        return;
    }

    let hint = if state.input_mode == InputMode::Editing {
        " Esc: stop editing | ←/→: move | Tab: next field "
    } else {
        match state.route {
            Route::Expenses => " j/k: select | e: edit | d: delete | n: new | m: more | ?: help | q: quit ",
            route if route.is_chart() => " ←/→: period | ?: help | q: quit ",
            _ => " Tab: field | ?: help | q: quit ",
        }
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_new_category_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" New category (Enter to create, Esc to cancel) ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);
    draw_input(f, state, chunks[0], "Title", &state.categories.new_title, Focus::NewCategory);

    let mut lines = Vec::new();
    if state.categories.is_creating {
        lines.push(hint_line("Creating..."));
    }
    if let Some(error) = &state.categories.error {
        lines.push(error_line(error));
    }
    f.render_widget(Paragraph::new(lines), chunks[1]);
}

fn draw_confirm_delete_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(expense) = &state.confirm_delete else {
        return;
    };
    let popup_area = centered_rect(50, 25, area);

    let mut lines = vec![
        Line::from(format!(
            "Delete '{}' ({})?",
            expense.title,
            format_amount(&state.currency, expense.amount)
        )),
        Line::from(""),
    ];
    if state.expenses.is_deleting {
        lines.push(hint_line("Deleting..."));
    } else {
        lines.push(hint_line("y: delete | n: cancel"));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Confirm ")
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 SPENDLY - Keyboard Shortcuts

 NAVIGATION
   1-7                Expenses, New, By category, Scatter, Bar, Pie, Profile
   h                  Home
   i / u              Sign in / Sign up (signed out)
   Tab / Shift+Tab    Next / previous field

 FORMS
   e / Enter          Edit the focused field
   Esc                Stop editing
   s                  Submit
   ←/→                Choose category
   c                  New category

 EXPENSES
   j/k or ↓/↑         Select
   e / Enter          Edit selected
   d                  Delete selected
   m                  Show more
   /                  Search by date range
   b                  Back to all expenses
   r                  Refresh

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DateRange, Expense, ExpensePage, User};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn render(state: &RenderState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn signed_in(route: Route) -> RenderState {
        RenderState {
            route,
            session: Some(User {
                id: "u1".to_string(),
                username: "ann".to_string(),
                email: "ann@example.com".to_string(),
                wallet_balance: None,
            }),
            ..RenderState::default()
        }
    }

    fn expense(title: &str, amount: f64) -> Expense {
        Expense {
            id: Some(title.to_lowercase()),
            title: title.to_string(),
            amount,
            category: Category::new("c1", "Food"),
            notes: None,
            incurred_on: "2024-03-10T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("$", 0.0), "$0.00");
        assert_eq!(format_amount("$", 1234.5), "$1,234.50");
        assert_eq!(format_amount("€", 1_000_000.0), "€1,000,000.00");
        assert_eq!(format_amount("$", -42.0), "-$42.00");
    }

    #[test]
    fn test_empty_list_messages_are_distinct() {
        let mut state = signed_in(Route::Expenses);
        let ticket = state.expenses.fetch_first_page();
        state.expenses.apply_page(&ticket, Ok(ExpensePage::default()));
        let unfiltered = render(&state);
        assert!(unfiltered.contains("You have not recorded any expenses yet"));

        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };
        let ticket = state.expenses.search(range).unwrap();
        state.expenses.apply_page(&ticket, Ok(ExpensePage::default()));
        let filtered = render(&state);
        assert!(filtered.contains("No expenses match this date range"));
        assert!(filtered.contains("b: back to all expenses"));
        assert!(!filtered.contains("You have not recorded any expenses yet"));
    }

    #[test]
    fn test_list_shows_rows_and_show_more() {
        let mut state = signed_in(Route::Expenses);
        let ticket = state.expenses.fetch_first_page();
        state.expenses.apply_page(
            &ticket,
            Ok(ExpensePage {
                expenses: vec![expense("Groceries", 1500.0)],
                cursor: Some("next".to_string()),
                has_next_page: true,
            }),
        );
        let screen = render(&state);
        assert!(screen.contains("Groceries"));
        assert!(screen.contains("$1,500.00"));
        assert!(screen.contains("m: show more"));
    }

    #[test]
    fn test_loader_while_first_page_loads() {
        let mut state = signed_in(Route::Expenses);
        state.expenses.fetch_first_page();
        assert!(render(&state).contains("Loading expenses..."));
    }

    #[test]
    fn test_confirm_dialog_renders() {
        let mut state = signed_in(Route::Expenses);
        state.confirm_delete = Some(expense("Taxi", 20.0));
        let screen = render(&state);
        assert!(screen.contains("Delete 'Taxi'"));
        assert!(screen.contains("y: delete"));
    }

    #[test]
    fn test_signed_out_home_and_nav() {
        let screen = render(&RenderState::default());
        assert!(screen.contains("Welcome to Spendly"));
        assert!(screen.contains("i:Sign in"));
    }

    #[test]
    fn test_every_route_renders_with_empty_data() {
        for route in Route::ALL {
            let mut state = signed_in(route);
            if matches!(route, Route::NewExpense | Route::EditExpense) {
                state.form = Some(ExpenseForm::create(state.today));
            }
            render(&state);
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long title", 6), "a lon…");
    }
}
