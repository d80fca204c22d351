//! Plain-text rendering for the terminal.

use std::fmt::Write;

use super::{AvailabilityCard, DonorTable, HomeStats, RegistryView, NO_DONORS_MESSAGE};
use crate::registry::TargetEditor;

const HEADERS: [&str; 7] = ["ID", "Name", "Blood", "Age", "Contact", "City", "Registered"];

/// Render the home page numbers.
#[must_use]
pub fn home(stats: &HomeStats) -> String {
    format!(
        "Total donors:  {}\nMost needed:   {}\n",
        stats.total_donors, stats.most_needed_label
    )
}

/// Render availability cards with bars `bar_width` characters wide.
#[must_use]
pub fn availability(cards: &[AvailabilityCard], bar_width: usize) -> String {
    let mut out = String::new();
    for card in cards {
        let _ = writeln!(
            out,
            "{:<4} {} donors • target {}",
            card.group.label(),
            card.count,
            card.target
        );
        let _ = writeln!(
            out,
            "     [{}] {}",
            bar(card.bar_width, bar_width),
            card.bar_label
        );
    }
    out
}

/// Render the views that follow a change to donors or targets: the
/// availability cards, the donor table, then the home numbers.
#[must_use]
pub fn refreshed(view: &RegistryView, bar_width: usize) -> String {
    format!(
        "{}\n{}\n{}",
        availability(&view.availability, bar_width),
        donor_table(&view.donors),
        home(&view.home)
    )
}

/// Render the donor table, or a notice when it is empty.
#[must_use]
pub fn donor_table(table: &DonorTable) -> String {
    if table.is_empty() {
        return format!("{NO_DONORS_MESSAGE}\n");
    }

    let cells: Vec<[String; 7]> = table
        .rows
        .iter()
        .map(|row| {
            [
                row.id.to_string(),
                row.name.clone(),
                row.blood_group.clone(),
                row.age.clone(),
                row.contact.clone(),
                row.city.clone(),
                row.registered.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

/// Render the target editor's current values.
#[must_use]
pub fn targets(editor: &TargetEditor) -> String {
    let mut out = String::new();
    for input in editor.inputs() {
        let _ = writeln!(out, "{:<4} target {}", input.group.label(), input.value);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

/// A bar `width` characters wide, filled to `percent`.
fn bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}
