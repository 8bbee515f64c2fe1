//! Plain-text rendering of protocol sheets.
//!
//! Columns are padded by display width so Cyrillic headers and names line up.

use unicode_width::UnicodeWidthStr;

use crate::sheet::ProtocolSheet;

const COLUMN_GAP: &str = "  ";

/// Display width of every column of `sheet`, header included.
pub fn column_widths(sheet: &ProtocolSheet) -> Vec<usize> {
    let mut widths: Vec<usize> = sheet.header.iter().map(|h| h.width()).collect();
    for row in &sheet.rows {
        for (i, cell) in row.iter().enumerate() {
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(cell.width()),
                None => widths.push(cell.width()),
            }
        }
    }
    widths
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{cell}{}", " ".repeat(fill))
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| pad(cell, w))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

/// Render one sheet: a title line, the header, a rule and the rows.
pub fn render_sheet(sheet: &ProtocolSheet) -> String {
    let widths = column_widths(sheet);
    let rule_width = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);

    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", sheet.name));
    out.push_str(&render_line(&sheet.header, &widths));
    out.push('\n');
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in &sheet.rows {
        out.push_str(&render_line(row, &widths));
        out.push('\n');
    }
    out
}

/// Render all sheets separated by blank lines.
pub fn render_sheets(sheets: &[ProtocolSheet]) -> String {
    sheets
        .iter()
        .map(render_sheet)
        .collect::<Vec<_>>()
        .join("\n")
}
