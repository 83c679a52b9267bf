//! Plain-text rendering of the payments list.

use chrono::{DateTime, FixedOffset};
use colored::Colorize;
use dashboard_client::{ListView, PaymentListController, PaymentRow, PaymentSummary};

const HEADERS: [&str; 6] = ["ID", "Merchant", "Amount", "Date", "Status", "Action"];

/// `IDR 1,250.00`. Amounts that are not numbers are shown as sent.
pub fn format_amount(raw: &str) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return raw.to_string();
    };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("IDR {sign}{grouped}.{cents}")
}

pub fn format_date(created_at: Option<&DateTime<FixedOffset>>) -> String {
    created_at
        .map(|at| at.format("%d %b %Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn cells(row: &PaymentRow) -> [String; 6] {
    let payment = &row.payment;
    [
        payment.id.clone(),
        payment.merchant.clone(),
        format_amount(&payment.amount),
        format_date(payment.created_at.as_ref()),
        payment.status.clone(),
        if row.can_review {
            "Review".to_string()
        } else {
            String::new()
        },
    ]
}

fn paint_status(padded: String, status: &str) -> String {
    match status {
        "completed" => padded.green().to_string(),
        "failed" => padded.red().to_string(),
        "pending" => padded.yellow().to_string(),
        _ => padded,
    }
}

/// Column-aligned table. Padding is applied before coloring so escape
/// codes do not skew widths.
pub fn table(rows: &[PaymentRow]) -> String {
    let body: Vec<[String; 6]> = rows.iter().map(cells).collect();
    let mut widths = HEADERS.map(str::len);
    for line in &body {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(&header.join("  ").bold().to_string());
    out.push('\n');

    for line in &body {
        let rendered: Vec<String> = line
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, w))| {
                let padded = format!("{cell:<w$}");
                match col {
                    4 => paint_status(padded, cell),
                    5 => padded.cyan().to_string(),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(rendered.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn summary(summary: &PaymentSummary) -> String {
    format!(
        "Total {}  {} {}  {} {}  {} {}",
        summary.total,
        "completed".green(),
        summary.completed,
        "pending".yellow(),
        summary.pending,
        "failed".red(),
        summary.failed,
    )
}

/// Everything the list shows for the controller's current state.
pub fn view(controller: &PaymentListController) -> String {
    let query = controller.query();
    match controller.view() {
        ListView::Loading => "Loading payments...".dimmed().to_string(),
        ListView::Failed(err) => format!(
            "{} {}",
            "Could not load payments:".red().bold(),
            err.description()
        ),
        ListView::Empty(list) => format!(
            "{}\n{}",
            summary(&list.summary),
            "No payments match the current filters.".dimmed()
        ),
        ListView::Populated(list) => {
            let mut out = summary(&list.summary);
            out.push_str("\n\n");
            out.push_str(&table(&controller.rows()));
            out.push_str(&format!(
                "\nPage {} of {}  (sort {}{})",
                controller.current_page(),
                controller.page_count().max(1),
                query.sort,
                query
                    .status
                    .as_deref()
                    .map(|s| format!(", status {s}"))
                    .unwrap_or_default(),
            ));
            out
        }
    }
}
