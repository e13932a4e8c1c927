use std::fmt::Write;

use products_hr::{Employee, EmployeePage};

const HEADERS: [&str; 5] = ["ID", "First name", "Last name", "Date of birth", "Job title"];

fn cells(employee: &Employee) -> [String; 5] {
    [
        employee.id.to_string(),
        employee.first_name.clone(),
        employee.last_name.clone(),
        employee.date_of_birth.format("%d.%m.%Y").to_string(),
        employee.job_title.clone(),
    ]
}

/// Plain-text table followed by a page footer.
pub fn table(page: &EmployeePage) -> String {
    let rows: Vec<[String; 5]> = page.items.iter().map(cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        let _ = writeln!(out, "(no matching employees)");
    }
    let _ = writeln!(
        out,
        "page {} of {} · {} employee(s)",
        page.page + 1,
        page.page_count().max(1),
        page.total
    );
    out
}

fn push_row(out: &mut String, row: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}
