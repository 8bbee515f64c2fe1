//! Protocol sheet view for the terminal viewer.
//!
//! Renders a row of class tabs, a bordered [`ratatui::widgets::Table`] for the
//! selected sheet and a key-hint footer.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

use crate::sheet::{ProtocolSheet, SESSION_HEADER, TOTAL_HEADER};
use crate::text::column_widths;
use crate::themes::Theme;

/// Render the class tabs into `area`, highlighting `selected`.
pub fn render_tabs(frame: &mut Frame, area: Rect, sheets: &[ProtocolSheet], selected: usize, theme: &Theme) {
    let titles: Vec<Line> = sheets.iter().map(|s| Line::from(s.name.clone())).collect();
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme.tab)
        .highlight_style(theme.tab_selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Span::styled(" Classes ", theme.title)),
        );
    frame.render_widget(tabs, area);
}

/// Render one protocol sheet as a table into `area`.
///
/// Column widths follow the widest cell. Session best and total columns are
/// highlighted, and the podium rows use the podium style.
pub fn render_sheet(frame: &mut Frame, area: Rect, sheet: &ProtocolSheet, theme: &Theme) {
    let highlighted: Vec<bool> = sheet
        .header
        .iter()
        .map(|h| h.ends_with(SESSION_HEADER) || h == TOTAL_HEADER)
        .collect();

    let header = Row::new(
        sheet
            .header
            .iter()
            .map(|h| Cell::from(h.clone()).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.iter().enumerate().map(|(col, cell)| {
                let c = Cell::from(cell.clone());
                if highlighted.get(col).copied().unwrap_or(false) && i >= 3 {
                    c.style(theme.highlight_column)
                } else {
                    c
                }
            });
            Row::new(cells).style(theme.row_style(i))
        })
        .collect();

    let widths: Vec<Constraint> = column_widths(sheet)
        .into_iter()
        .map(|w| Constraint::Length(w as u16))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border)
                .title(Span::styled(format!(" {} ", sheet.name), theme.title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when there is nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No laps found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press q to quit", theme.footer)),
    ];
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(Span::styled(" Protocol ", theme.title)),
    );
    frame.render_widget(paragraph, area);
}

/// Full screen: tabs on top, the selected sheet, then key hints.
pub fn render_protocol(frame: &mut Frame, sheets: &[ProtocolSheet], selected: usize, theme: &Theme) {
    let area = frame.area();
    let Some(sheet) = sheets.get(selected) else {
        render_no_data(frame, area, theme);
        return;
    };

    let [tabs_area, table_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_tabs(frame, tabs_area, sheets, selected, theme);
    render_sheet(frame, table_area, sheet, theme);
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(
            "Tab/←/→ switch class ({}/{})  q quit",
            selected + 1,
            sheets.len()
        ),
        theme.footer,
    )));
    frame.render_widget(footer, footer_area);
}
