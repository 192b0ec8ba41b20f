use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use survey_cli::workspace::{GroupPreview, PreviewRow};
use survey_core::ExportArtifact;
use survey_model::QuestionType;

pub fn print_preview(groups: &[GroupPreview], show_disabled: bool) {
    for group in groups {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Question"),
            header_cell("Type"),
            header_cell("Items"),
            header_cell("Text"),
        ]);
        apply_preview_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Center);
        align_column(&mut table, 2, CellAlignment::Right);
        let mut shown = 0usize;
        let mut matrices = 0usize;
        let mut hidden = 0usize;
        for row in &group.rows {
            if !row.enabled && !show_disabled {
                hidden += 1;
                continue;
            }
            if row.question_type == QuestionType::ArrayMatrix {
                matrices += 1;
            }
            shown += 1;
            table.add_row(preview_row(row));
        }
        println!("{}", group.name);
        println!("{table}");
        let mut footer = format!("{shown} questions, {matrices} matrices");
        if hidden > 0 {
            footer.push_str(&format!(", {hidden} disabled items hidden"));
        }
        println!("{footer}");
        println!();
    }
}

pub fn print_export(artifact: &ExportArtifact, path: &std::path::Path) {
    println!("Wrote {} ({} bytes)", path.display(), artifact.content.len());
    if let Some(count) = artifact.persisted_templates {
        println!("Stored {count} templates in the library");
    }
}

pub fn print_types() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Type"),
        header_cell("Override fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for question_type in QuestionType::ALL {
        let fields: Vec<&str> = survey_model::OverrideKey::fields_for(question_type)
            .into_iter()
            .map(|key| key.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(question_type.code())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(question_type.as_str()),
            Cell::new(fields.join(", ")),
        ]);
    }
    println!("{table}");
}

fn preview_row(row: &PreviewRow) -> Vec<Cell> {
    let label = if row.question_type == QuestionType::ArrayMatrix {
        Cell::new(&row.label)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(&row.label)
    };
    let items = if row.item_codes.len() > 1 {
        Cell::new(row.item_codes.join(", "))
    } else {
        dim_cell("-")
    };
    let text = if row.enabled {
        Cell::new(&row.text)
    } else {
        dim_cell(format!("{} (disabled)", row.text))
    };
    vec![label, Cell::new(row.question_type.code()), items, text]
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_preview_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140)
        .set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::LowerBoundary(Width::Fixed(4)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(55)),
        ]);
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
