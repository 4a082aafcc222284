//! Plain-text views
//!
//! Every function here is pure: it takes controller state (and "now" where
//! deadlines are involved) and returns the text to print.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::{Application, DashboardStats, University, User};
use crate::controller::deadline::{self, DeadlineStatus};
use crate::controller::{ListController, PageItem, ViewMode};
use crate::util::{group_thousands, pad_to_width, truncate_to_width};

const NOT_AVAILABLE: &str = "N/A";
const CARD_WIDTH: usize = 46;
const CARDS_PER_ROW: usize = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Formatting helpers
// ─────────────────────────────────────────────────────────────────────────────

/// "Jan 5, 2026", or "N/A"
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Whole dollars with separators: "$20,000", or "N/A"
pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(a) if a.is_finite() => {
            let rounded = a.abs().round() as u64;
            let sign = if a < 0.0 && rounded > 0 { "-" } else { "" };
            format!("{}${}", sign, group_thousands(rounded))
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Short label for a deadline badge; empty when there is nothing to flag
pub fn deadline_badge(status: DeadlineStatus) -> String {
    match status {
        DeadlineStatus::Passed => "Deadline passed".to_string(),
        DeadlineStatus::Approaching { days: 1 } => "Closes in 1 day".to_string(),
        DeadlineStatus::Approaching { days } => format!("Closes in {} days", days),
        DeadlineStatus::None | DeadlineStatus::Open => String::new(),
    }
}

fn location(u: &University) -> String {
    match (u.city.is_empty(), u.country.is_empty()) {
        (false, false) => format!("{}, {}", u.city, u.country),
        (true, false) => u.country.clone(),
        (false, true) => u.city.clone(),
        (true, true) => NOT_AVAILABLE.to_string(),
    }
}

fn kind(u: &University) -> String {
    u.university_type_display
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| capitalize(&u.university_type))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn deadline_line(u: &University, now: NaiveDateTime) -> String {
    let badge = deadline_badge(deadline::classify(u.deadline, now));
    if badge.is_empty() {
        format_date(u.deadline)
    } else {
        format!("{} ({})", format_date(u.deadline), badge)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination bar with the current page bracketed: "1 ... 6 [7] 8 ... 12"
pub fn pagination_bar(items: &[PageItem], current: u32) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{}]", n),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The list screen in its current view mode
pub fn list_view(list: &ListController, now: NaiveDateTime) -> String {
    let mut out = String::new();

    if let Some(error) = list.error() {
        let _ = writeln!(out, "Error: {}", error);
        return out;
    }
    if let Some(notice) = list.notice() {
        let _ = writeln!(out, "! {}", notice);
    }

    let universities = list.universities();
    if universities.is_empty() {
        out.push_str("No universities found.\n");
        if list.filters().is_filtered() {
            out.push_str("Try clearing some filters.\n");
        }
        return out;
    }

    let _ = writeln!(
        out,
        "Showing {} of {} universities (page {} of {})",
        universities.len(),
        list.total_count(),
        list.filters().page,
        list.total_pages().max(1)
    );
    out.push('\n');

    match list.view_mode() {
        ViewMode::Grid => grid(&mut out, list, now),
        ViewMode::List => rows(&mut out, list, now),
    }

    if list.total_pages() > 1 {
        out.push('\n');
        let _ = writeln!(out, "{}", pagination_bar(&list.page_items(), list.filters().page));
    }
    out
}

fn card(u: &University, applied: bool, now: NaiveDateTime) -> Vec<String> {
    let mut title = u.name.clone();
    if applied {
        title.push_str(" ✓");
    }
    let ranking = u
        .ranking
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let scholarships = if u.scholarships_available {
        "Scholarships available"
    } else {
        ""
    };
    vec![
        title,
        location(u),
        format!("{} · Rank {}", kind(u), ranking),
        format!("Tuition {}", format_currency(u.tuition_fee)),
        format!("Deadline {}", deadline_line(u, now)),
        scholarships.to_string(),
    ]
}

fn grid(out: &mut String, list: &ListController, now: NaiveDateTime) {
    let cards: Vec<Vec<String>> = list
        .universities()
        .iter()
        .map(|u| card(u, list.has_applied(u.id), now))
        .collect();

    for row in cards.chunks(CARDS_PER_ROW) {
        let height = row.iter().map(Vec::len).max().unwrap_or(0);
        for line in 0..height {
            let text: Vec<String> = row
                .iter()
                .map(|c| pad_to_width(c.get(line).map(String::as_str).unwrap_or(""), CARD_WIDTH))
                .collect();
            let _ = writeln!(out, "{}", text.join("  ").trim_end());
        }
        out.push('\n');
    }
}

fn rows(out: &mut String, list: &ListController, now: NaiveDateTime) {
    let _ = writeln!(
        out,
        "{} {} {} {} {} {}",
        pad_to_width("ID", 5),
        pad_to_width("Name", 32),
        pad_to_width("Location", 24),
        pad_to_width("Tuition", 10),
        pad_to_width("Deadline", 32),
        "Applied"
    );
    for u in list.universities() {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {}",
            pad_to_width(&u.id.to_string(), 5),
            pad_to_width(&u.name, 32),
            pad_to_width(&location(u), 24),
            pad_to_width(&format_currency(u.tuition_fee), 10),
            pad_to_width(&deadline_line(u, now), 32),
            if list.has_applied(u.id) { "yes" } else { "" }
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detail
// ─────────────────────────────────────────────────────────────────────────────

pub fn detail_view(u: &University, applied: bool, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", u.name);
    let _ = writeln!(out, "{}", "=".repeat(u.name.chars().count().max(3)));
    let _ = writeln!(out, "{} · {}", location(u), kind(u));
    if !u.website.is_empty() {
        let _ = writeln!(out, "{}", u.website);
    }
    if !u.description.is_empty() {
        let _ = writeln!(out, "\n{}", u.description);
    }
    out.push('\n');

    let field = |out: &mut String, label: &str, value: String| {
        let _ = writeln!(out, "{} {}", pad_to_width(label, 18), value);
    };
    let opt = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    field(&mut out, "Ranking", opt(u.ranking.map(|r| format!("#{}", r))));
    field(&mut out, "Founded", opt(u.founded_year.map(|y| y.to_string())));
    field(&mut out, "Deadline", deadline_line(u, now));
    field(&mut out, "Application fee", format_currency(u.application_fee));
    field(&mut out, "Tuition", format_currency(u.tuition_fee));
    field(
        &mut out,
        "Admission rate",
        opt(u
            .admission_rate_display
            .clone()
            .or_else(|| u.admission_rate.map(|r| format!("{}%", r)))),
    );
    field(&mut out, "IELTS", opt(u.ielts_score.map(|s| s.to_string())));
    field(&mut out, "TOEFL", opt(u.toefl_score.map(|s| s.to_string())));
    field(&mut out, "GRE", opt(u.gre_score.map(|s| s.to_string())));
    field(&mut out, "GMAT", opt(u.gmat_score.map(|s| s.to_string())));
    field(
        &mut out,
        "Scholarships",
        if u.scholarships_available {
            if u.scholarships_description.is_empty() {
                "Available".to_string()
            } else {
                format!("Available: {}", u.scholarships_description)
            }
        } else {
            "None".to_string()
        },
    );
    if !u.email.is_empty() || !u.phone.is_empty() {
        let contact = [u.email.as_str(), u.phone.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");
        field(&mut out, "Contact", contact);
    }

    if let Some(programs) = u.programs.as_ref().filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "\nPrograms");
        for p in programs {
            let years = p
                .duration_years
                .map(|y| format!(", {} yr", y))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  - {} ({}{}) {}",
                p.name,
                p.degree_type,
                years,
                format_currency(p.tuition_fee)
            );
        }
    }

    out.push('\n');
    let status = if applied {
        "You have applied to this university."
    } else if deadline::is_passed(u.deadline, now) {
        "Applications are closed."
    } else {
        "You have not applied yet."
    };
    let _ = writeln!(out, "{}", status);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard and applications
// ─────────────────────────────────────────────────────────────────────────────

pub fn dashboard_view(user: &User, stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome back, {}", user.display_name());
    out.push('\n');
    let _ = writeln!(out, "Applications      {}", stats.applied_count);
    if user.is_staff {
        let _ = writeln!(out, "Universities added {}", stats.added_count);
    }

    out.push('\n');
    if stats.recent_applications.is_empty() {
        out.push_str("No applications yet.\n");
    } else {
        out.push_str("Recent applications\n");
        for app in &stats.recent_applications {
            let _ = writeln!(
                out,
                "  {} {} {}",
                pad_to_width(&app.university_name, 32),
                pad_to_width(&status_label(app), 12),
                format_date(app.applied_at.map(|t| t.date_naive()))
            );
        }
    }
    out
}

fn status_label(app: &Application) -> String {
    if app.status_display.is_empty() {
        capitalize(app.status.as_str())
    } else {
        app.status_display.clone()
    }
}

/// Application table, used for both "my applications" and the admin review
pub fn applications_view(apps: &[Application]) -> String {
    if apps.is_empty() {
        return "No applications.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        pad_to_width("ID", 5),
        pad_to_width("University", 32),
        pad_to_width("Country", 14),
        pad_to_width("Status", 12),
        "Applied"
    );
    for app in apps {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            pad_to_width(&app.id.to_string(), 5),
            pad_to_width(&app.university_name, 32),
            pad_to_width(&app.university_country, 14),
            pad_to_width(&status_label(app), 12),
            format_date(app.applied_at.map(|t| t.date_naive()))
        );
        if !app.notes.is_empty() {
            let _ = writeln!(out, "      {}", truncate_to_width(&app.notes, 70));
        }
    }
    out
}
