use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use loris_core::{NotificationReport, RunReport};
use loris_model::{IngestStats, NotificationKind};

pub fn print_summary(report: &RunReport, log_file: Option<&Path>) {
    if report.dry_run {
        println!("Mode: dry run (nothing uploaded, no mail sent)");
    }
    if let Some(path) = log_file {
        println!("Run log: {}", path.display());
    }
    if report.projects.is_empty() {
        println!("No projects matched the selection.");
        return;
    }
    println!("{}", summary_table(report));
    if let Some(table) = error_table(report) {
        println!();
        println!("Errors:");
        println!("{table}");
    }
}

/// One row per project plus a TOTAL row.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Collection"),
        header_cell("Project"),
        header_cell("Total"),
        header_cell("Success"),
        header_cell("Failed"),
        header_cell("Skipped"),
        header_cell("Rows uploaded"),
        header_cell("Rows present"),
        header_cell("Candidates"),
        header_cell("Notification"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for project in &report.projects {
        let mut row = vec![
            Cell::new(&project.collection),
            Cell::new(&project.project)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
        ];
        row.extend(stat_cells(&project.stats));
        row.push(notification_cell(&project.notification));
        table.add_row(row);
    }
    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} project(s)", report.projects.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        stat_cells(&report.totals)
            .into_iter()
            .map(|cell| cell.add_attribute(Attribute::Bold)),
    );
    total_row.push(dim_cell("-"));
    table.add_row(total_row);
    table
}

/// Every recorded error entry, or `None` when the run had none.
pub fn error_table(report: &RunReport) -> Option<Table> {
    let rows: Vec<_> = report
        .projects
        .iter()
        .flat_map(|project| {
            project
                .stats
                .errors
                .iter()
                .map(move |entry| (project.project.as_str(), entry))
        })
        .collect();
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Instrument"),
        header_cell("File"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for (project, entry) in rows {
        table.add_row(vec![
            Cell::new(project),
            Cell::new(&entry.instrument).fg(Color::Red),
            dim_cell(entry.file.display()),
            Cell::new(entry.messages.join("\n")),
        ]);
    }
    Some(table)
}

fn stat_cells(stats: &IngestStats) -> Vec<Cell> {
    vec![
        Cell::new(stats.total),
        count_cell(stats.success, Color::Green),
        count_cell(stats.failed, Color::Red),
        count_cell(stats.skipped, Color::Yellow),
        Cell::new(stats.rows_uploaded),
        Cell::new(stats.rows_skipped),
        Cell::new(stats.candidates_created),
    ]
}

fn notification_cell(notification: &NotificationReport) -> Cell {
    if !notification.dispatched {
        return dim_cell(format!("{} (not sent)", notification.kind.label()));
    }
    let sent = notification.delivery.sent.len();
    let attempted = sent + notification.delivery.failed.len();
    let label = format!("{} {sent}/{attempted}", notification.kind.label());
    let color = match notification.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Failed => Color::Red,
    };
    if attempted == 0 {
        dim_cell(format!("{} (no recipients)", notification.kind.label()))
    } else if sent < attempted {
        Cell::new(label).fg(Color::Yellow)
    } else {
        Cell::new(label).fg(color)
    }
}

fn count_cell(count: u64, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
