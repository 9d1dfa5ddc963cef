use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use his_transform::{JoinRecord, JoinStatus};

use crate::types::{ConsolidateResult, ValidateResult};

pub fn print_consolidation_summary(result: &ConsolidateResult) {
    println!("Output: {} ({})", result.output.display(), result.format);
    println!(
        "Uploads: {} files, {} trama/plano, masters: {}",
        result.upload_files,
        result.transaction_files,
        master_list(result)
    );
    for path in &result.unknown_files {
        eprintln!("Ignored (unrecognized): {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Master"),
        header_cell("Key"),
        header_cell("Status"),
        header_cell("Matched"),
        header_cell("Rows after"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for record in &result.joins {
        table.add_row(join_row(record));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!(
            "{} joined, {} skipped",
            result.joins.iter().filter(|r| r.is_joined()).count(),
            result.joins.iter().filter(|r| !r.is_joined()).count()
        ))
        .add_attribute(Attribute::Bold),
        dim_cell(result.input_rows),
        Cell::new(result.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("Consolidated: {} rows x {} columns", result.rows, result.columns);
}

fn master_list(result: &ConsolidateResult) -> String {
    if result.master_roles.is_empty() {
        return "none".to_string();
    }
    result
        .master_roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_row(record: &JoinRecord) -> Vec<Cell> {
    let key = match &record.key {
        Some(key) => Cell::new(key),
        None => dim_cell("-"),
    };
    match &record.status {
        JoinStatus::Joined {
            matched_rows,
            rows_after,
        } => vec![
            Cell::new(&record.master)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            key,
            Cell::new("joined").fg(Color::Green),
            count_cell(*matched_rows),
            Cell::new(rows_after),
        ],
        JoinStatus::Skipped(reason) => vec![
            Cell::new(&record.master).fg(Color::DarkGrey),
            key,
            Cell::new(format!("skipped: {reason}")).fg(Color::Yellow),
            dim_cell("-"),
            dim_cell("-"),
        ],
    }
}

pub fn print_preview(result: &ValidateResult) {
    let preview = &result.preview;
    println!(
        "Filter: {} ({} flagged rows)",
        result.selection, preview.total_records
    );
    if preview.total_records == 0 {
        println!("No errors found.");
    } else {
        let mut table = Table::new();
        table.set_header(preview.columns.iter().map(|name| header_cell(name)));
        apply_table_style(&mut table);
        for row in &preview.data {
            table.add_row(row.iter().map(Cell::new));
        }
        println!("{table}");
        if preview.is_truncated() {
            println!(
                "Showing {} of {} rows (use --limit or --errors-out for more).",
                preview.shown_records, preview.total_records
            );
        }
    }
    if let Some(path) = &result.errors_out {
        println!("Error report: {}", path.display());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(200);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
