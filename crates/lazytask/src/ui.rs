use crate::state::{App, Overlay, Pane, PanelView};
use crate::theme::{self, keys};
use lazytask_core::TableModel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

const ADD_MODAL_WIDTH: u16 = 40;
const ADD_MODAL_HEIGHT: u16 = 5;
const CONFIRM_MODAL_WIDTH: u16 = 50;
const CONFIRM_MODAL_HEIGHT: u16 = 6;

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(outer[0]);

    let focus = app.focus;
    render_panel(f, &mut app.tasks, Pane::Tasks, focus == Pane::Tasks, panels[0]);
    render_panel(
        f,
        &mut app.intervals,
        Pane::Intervals,
        focus == Pane::Intervals,
        panels[1],
    );
    render_footer(f, app, outer[1]);

    match &app.overlay {
        Overlay::None => {}
        Overlay::AddTask { input } => render_add_modal(f, input, area),
        Overlay::ConfirmDelete { id, description } => {
            render_confirm_modal(f, id, description, area)
        }
    }
}

fn pane_title(pane: Pane) -> &'static str {
    match pane {
        Pane::Tasks => "Tasks",
        Pane::Intervals => "Day",
    }
}

fn render_panel(f: &mut Frame, view: &mut PanelView, pane: Pane, focused: bool, area: Rect) {
    let border_style = if focused {
        theme::FOCUSED_BORDER
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(pane_title(pane))
        .border_style(border_style);

    if view.model.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        let p = Paragraph::new(Line::from(Span::styled("Nothing to show", theme::HINT_STYLE)));
        f.render_widget(p, inner);
        return;
    }

    let model = &view.model;
    let selected = view.selected_row();
    let highlight_cell = match pane {
        Pane::Tasks => None,
        Pane::Intervals => {
            selected.and_then(|row| model.selectable_column(row).map(|column| (row, column)))
        }
    };

    let header = Row::new(header_cells(model)).height(1);
    let rows: Vec<Row> = model
        .rows()
        .iter()
        .enumerate()
        .skip(1)
        .map(|(row_idx, cells)| {
            let cells = (0..model.column_count()).map(|column| {
                let (text, tone) = cells
                    .get(column)
                    .map(|cell| (cell.text.as_str(), cell.tone))
                    .unwrap_or_default();
                let mut style = theme::tone_style(tone);
                if highlight_cell == Some((row_idx, column)) {
                    style = theme::SELECTED_STYLE;
                }
                Cell::from(text.to_string()).style(style)
            });
            Row::new(cells).style(theme::zebra_row_style(row_idx - 1))
        })
        .collect();

    let widths: Vec<Constraint> = model
        .column_widths()
        .into_iter()
        .map(|width| Constraint::Length(width.min(u16::MAX as usize) as u16))
        .collect();

    let mut table = Table::new(rows, widths).header(header).block(block);
    if pane == Pane::Tasks {
        table = table.highlight_style(theme::SELECTED_STYLE);
    }
    f.render_stateful_widget(table, area, &mut view.state);
}

fn header_cells(model: &TableModel) -> Vec<Cell<'static>> {
    let header = model.rows().first();
    (0..model.column_count())
        .map(|column| {
            let text = header
                .and_then(|cells| cells.get(column))
                .map(|cell| cell.text.clone())
                .unwrap_or_default();
            Cell::from(text).style(theme::HEADER_STYLE)
        })
        .collect()
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.notice {
        Some(notice) => Line::from(Span::styled(
            notice.text.clone(),
            theme::notice_style(notice.is_error),
        )),
        None => {
            let mut spans = Vec::new();
            for (key, label) in keys::HINTS {
                spans.push(Span::styled(*key, theme::FOCUSED_BORDER));
                spans.push(Span::styled(format!(" {label}  "), theme::HINT_STYLE));
            }
            Line::from(spans)
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_add_modal(f: &mut Frame, input: &str, area: Rect) {
    let rect = centered_rect(ADD_MODAL_WIDTH, ADD_MODAL_HEIGHT, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Add task")
        .border_style(theme::MODAL_BORDER);
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let text = vec![
        Line::from(format!("{input}_")),
        Line::from(""),
        Line::from(Span::styled("Enter to add, Esc to cancel", theme::HINT_STYLE)),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn render_confirm_modal(f: &mut Frame, id: &str, description: &str, area: Rect) {
    let rect = centered_rect(CONFIRM_MODAL_WIDTH, CONFIRM_MODAL_HEIGHT, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Delete task")
        .border_style(theme::MODAL_BORDER);
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let text = vec![
        Line::from(format!("Delete task {id}?")),
        Line::from(description.to_string()),
        Line::from(""),
        Line::from(Span::styled("y to delete, n to keep", theme::HINT_STYLE)),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
