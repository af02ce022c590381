//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::resource::{CellFormat, Column, ResourceKind, Row};
use colored::Colorize;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render flattened rows of one resource kind.
    ///
    /// Without headers the table has no borders, icons or legend so the output
    /// can be piped into other tools.
    pub fn render_rows(&self, kind: ResourceKind, rows: &[Row], with_headers: bool) -> String {
        if rows.is_empty() {
            return format!("No {} resources found", kind);
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if with_headers {
            table.load_preset(UTF8_FULL).set_header(
                kind.columns()
                    .iter()
                    .map(|c| Cell::new(c.header).set_alignment(CellAlignment::Left))
                    .collect::<Vec<_>>(),
            );
        } else {
            table.load_preset(NOTHING);
        }

        for row in rows {
            table.add_row(
                row.cells
                    .iter()
                    .map(|(column, value)| self.cell(column, value, with_headers))
                    .collect::<Vec<_>>(),
            );
        }

        if !with_headers {
            return table.to_string();
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} {} ─╮\n",
            kind,
            format!("[{} items]", rows.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');

        if kind.columns().iter().any(|c| c.format == CellFormat::State) {
            output.push_str(&format!(
                "Legend: {} Ready  {} Busy  {} Failed\n",
                StatusIcon::SUCCESS.green(),
                StatusIcon::PENDING.yellow(),
                StatusIcon::ERROR.red()
            ));
        }

        output
    }

    fn cell(&self, column: &Column, value: &str, decorated: bool) -> Cell {
        match column.format {
            CellFormat::State if decorated && !value.is_empty() => Cell::new(format!(
                "{} {}",
                StatusIcon::get_state_icon(value),
                value
            ))
            .fg(self.theme.get_state_color(value)),
            _ => Cell::new(value),
        }
    }
}
