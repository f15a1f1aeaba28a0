use std::cmp;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, Wrap,
    },
};

use crate::model::{PopupView, PromptView, UIData};

pub const STATUSLINE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;

/// Render one frame from the prepared [`UIData`]. The index panel and the
/// grid share the row slice the model cut, so they always line up.
pub fn draw(uidata: &UIData, frame: &mut Frame) {
    let area = frame.area();
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(STATUSLINE_HEIGHT as u16),
    ])
    .areas(area);

    let [index_area, grid_area, scrollbar_area] = Layout::horizontal([
        Constraint::Length(uidata.layout.index_width as u16),
        Constraint::Min(0),
        Constraint::Length(SCROLLBAR_WIDTH as u16),
    ])
    .areas(main_area);

    draw_index(uidata, frame, index_area);
    draw_grid(uidata, frame, grid_area);
    draw_scrollbar(uidata, frame, scrollbar_area);
    draw_statusline(uidata, frame, status_area);

    // Modal surfaces paint over the grid, the popup over everything
    if let Some(prompt) = &uidata.prompt {
        draw_prompt(prompt, frame, area);
    }
    if let Some(popup) = &uidata.popup {
        draw_popup(popup, frame, area);
    }
}

fn draw_index(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let width = uidata.index.width.saturating_sub(1);
    let header = Row::new([Cell::from(format!("{:>width$}", uidata.index.name))]).bold();
    let rows = uidata
        .index
        .data
        .iter()
        .map(|n| Row::new([Cell::from(format!("{n:>width$}"))]));
    let table = Table::new(rows, [Constraint::Length(uidata.index.width as u16)])
        .header(header)
        .column_spacing(0);
    frame.render_widget(table, area);
}

fn draw_grid(uidata: &UIData, frame: &mut Frame, area: Rect) {
    if uidata.table.is_empty() {
        let hint = Paragraph::new("Empty table. Ctrl+F adds a field, F1 shows help.").dim();
        frame.render_widget(hint, area);
        return;
    }
    let nvisible = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
    let header = Row::new(uidata.table.iter().map(|c| Cell::from(c.name.as_str()))).bold();
    let rows = (0..nvisible)
        .map(|r| Row::new(uidata.table.iter().map(move |c| Cell::from(c.data[r].as_str()))));
    let widths = uidata
        .table
        .iter()
        .map(|c| Constraint::Length(c.width as u16));
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, area);
}

fn draw_scrollbar(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let mut state = ScrollbarState::new(uidata.nrows).position(uidata.offset_row);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area,
        &mut state,
    );
}

fn draw_statusline(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let line = format!(
        " {} | {} rows x {} cols | {}",
        uidata.name, uidata.nrows, uidata.ncols, uidata.status_message
    );
    let statusline = Paragraph::new(line).style(Style::new().add_modifier(Modifier::REVERSED));
    frame.render_widget(statusline, area);
}

fn draw_prompt(prompt: &PromptView, frame: &mut Frame, area: Rect) {
    let width = cmp::min(area.width, 60);
    let popup_area = centered_rect(area, width, 4);
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Line::from(prompt.title.as_str()).centered())
        .title_bottom(Line::from(" Enter Ok | Esc Cancel ").centered());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [label_area, input_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(Paragraph::new(prompt.label.as_str()), label_area);
    frame.render_widget(Paragraph::new(prompt.input.as_str()), input_area);

    let cursor_x = input_area.x + cmp::min(prompt.cursor as u16, input_area.width.saturating_sub(1));
    frame.set_cursor_position((cursor_x, input_area.y));
}

fn draw_popup(popup: &PopupView, frame: &mut Frame, area: Rect) {
    let longest = popup
        .message
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let width = cmp::min(area.width, cmp::max(30, longest + 4));
    let height = cmp::min(area.height, popup.message.lines().count() as u16 + 2);
    let popup_area = centered_rect(area, width, height);
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(Line::from(popup.title.as_str()).centered());
    let paragraph = Paragraph::new(popup.message.as_str())
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
