//! HTML fragment rendering.
//!
//! Fragments use the element ids and classes the registry's pages bind to
//! (`#totalDonors`, `#mostNeeded`, `#availabilityList`, `#donorTableWrap`,
//! `#targetControls`). Every piece of stored text is escaped.

use std::fmt::Write;

use super::{AvailabilityCard, DonorTable, HomeStats, NO_DONORS_MESSAGE};
use crate::registry::TargetEditor;

/// Escape text for use in HTML content and quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the home page numbers.
#[must_use]
pub fn home(stats: &HomeStats) -> String {
    format!(
        "<span id=\"totalDonors\">{}</span>\n<span id=\"mostNeeded\">{}</span>\n",
        stats.total_donors,
        escape_html(&stats.most_needed_label)
    )
}

/// Render the availability cards.
#[must_use]
pub fn availability(cards: &[AvailabilityCard]) -> String {
    let mut out = String::from("<div id=\"availabilityList\">\n");
    for card in cards {
        let group = escape_html(card.group.label());
        let _ = write!(
            out,
            concat!(
                "<div class=\"card progress-row\">\n",
                "  <div class=\"progress-head\"><div class=\"group\">{group}</div>",
                "<div class=\"small-muted\">{count} donors • target {target}</div></div>\n",
                "  <label>{group} — {percent_text} of target</label>\n",
                "  <div class=\"progress\" aria-valuemin=\"0\" aria-valuemax=\"100\" aria-valuenow=\"{width}\">",
                "<span style=\"width:{width}%\">{bar_label}</span></div>\n",
                "</div>\n",
            ),
            group = group,
            count = card.count,
            target = card.target,
            percent_text = escape_html(&card.percent_text),
            width = card.bar_width,
            bar_label = escape_html(&card.bar_label),
        );
    }
    out.push_str("</div>\n");
    out
}

/// Render the donor table, or a notice when it is empty.
#[must_use]
pub fn donor_table(table: &DonorTable) -> String {
    let mut out = String::from("<div id=\"donorTableWrap\">\n");
    if table.is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"card center small-muted\">{}</div>",
            escape_html(NO_DONORS_MESSAGE)
        );
        out.push_str("</div>\n");
        return out;
    }

    out.push_str("<table class=\"table card\">\n");
    out.push_str(
        "<thead><tr><th>Name</th><th>Blood</th><th>Age</th><th>Contact</th><th>City</th><th>Registered</th><th></th></tr></thead>\n",
    );
    out.push_str("<tbody>\n");
    for row in &table.rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"small-muted\">{}</td><td><button class=\"btn-inline\" data-id=\"{}\">Delete</button></td></tr>",
            escape_html(&row.name),
            escape_html(&row.blood_group),
            escape_html(&row.age),
            escape_html(&row.contact),
            escape_html(&row.city),
            escape_html(&row.registered),
            row.id,
        );
    }
    out.push_str("</tbody>\n</table>\n</div>\n");
    out
}

/// Render one numeric input per group, seeded from the editor.
#[must_use]
pub fn target_controls(editor: &TargetEditor) -> String {
    let mut out = String::from("<div id=\"targetControls\">\n");
    for input in editor.inputs() {
        let group = escape_html(input.group.label());
        let _ = writeln!(
            out,
            "<div class=\"col\"><label>{group} target</label><input type=\"number\" min=\"0\" value=\"{}\" data-bg=\"{group}\"></div>",
            escape_html(&input.value),
        );
    }
    out.push_str("<div class=\"actions\"><button class=\"btn-inline\">Save targets</button></div>\n</div>\n");
    out
}
