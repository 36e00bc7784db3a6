use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use super::{LibraryReport, UNKNOWN};

/// Render a colored terminal report.
pub fn render(rows: &[LibraryReport], scanned: &[String], quiet: bool) -> Result<()> {
    let total = rows.len();
    let unknown_count = rows.iter().filter(|r| r.has_unknown_license()).count();
    let packages: usize = rows.iter().map(|r| r.packages.len()).sum();

    if quiet {
        println!(
            "Libraries: {}  Packages: {}  Unknown license: {}",
            total,
            packages,
            if unknown_count > 0 {
                unknown_count.to_string().red()
            } else {
                unknown_count.to_string().green()
            },
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "mod-licenses".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", scanned.join(" "));

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Libraries          : {}", total));
    println!(" │  {:<48} │", format!("Packages           : {}", packages));
    println!(
        " │  {:<48} │",
        format!("Licenses           : {}", summarize_licenses(rows))
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unknown license : {:>4}", "⚠".yellow(), unknown_count)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if total > 0 {
        render_table(rows);
        println!();
    }

    Ok(())
}

fn render_table(rows: &[LibraryReport]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Library").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("License URL").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let license_color = if row.has_unknown_license() {
            Color::Red
        } else {
            Color::Green
        };
        let url_color = if row.license_url == UNKNOWN {
            Color::DarkGrey
        } else {
            Color::Reset
        };

        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.version),
            Cell::new(&row.license_name).fg(license_color),
            Cell::new(&row.license_url).fg(url_color),
        ]);
    }

    println!("{}", table);
}

/// The three most common licenses, e.g. `[MIT (4), Apache-2.0 (2)]`.
fn summarize_licenses(rows: &[LibraryReport]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.license_name.as_str()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
