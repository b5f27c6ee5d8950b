use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use symspan::presenter::TextField;
use symspan::view::BoardView;

const HORIZONTAL_MARGIN: u16 = 1;
const MARKER_WIDTH: u16 = 3;
const HELP: &str =
    "s start · space pause · y/n answer · enter submit · ⌫ clear · r restart · +/- [/] timing · q quit";

/// Draws the whole screen and returns the board's inner area, in terminal
/// cells, so mouse clicks can be mapped back onto targets.
pub fn draw(f: &mut Frame, view: &mut BoardView) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Board
            Constraint::Length(5), // Instructions
        ])
        .split(f.area());

    render_header(f, view, chunks[0]);

    let board_block = Block::default().borders(Borders::ALL).title("Board");
    let board = board_block.inner(chunks[1]);
    f.render_widget(board_block, chunks[1]);
    view.resize_cells(board.width, board.height);
    render_targets(f, view, board);

    render_footer(f, view, chunks[2]);

    if view.overlay_visible() {
        render_symmetry_overlay(f, view, chunks[1]);
    }

    board
}

fn render_header(f: &mut Frame, view: &BoardView, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(10),
            Constraint::Length(5),
        ])
        .split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let level = Paragraph::new(format!("Level {}", view.text(TextField::LevelNum)))
        .style(bold.fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    let timer = Paragraph::new(view.text(TextField::Timer).to_string())
        .style(bold)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .label(view.text(TextField::ProgressText).to_string())
        .percent(view.progress_percent().round() as u16);
    let play = Paragraph::new(view.text(TextField::PlayButton).to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(level, columns[0]);
    f.render_widget(timer, columns[1]);
    f.render_widget(progress, columns[2]);
    f.render_widget(play, columns[3]);
}

fn render_targets(f: &mut Frame, view: &BoardView, board: Rect) {
    let idle = Style::default().fg(Color::Blue);
    let active = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED);
    let selected = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);

    let buf = f.buffer_mut();
    for target in view.targets() {
        let (column, row) = target.cell();
        if board.width < MARKER_WIDTH || column >= board.width || row >= board.height {
            continue;
        }
        let (symbol, style) = match (target.active, target.selected) {
            (true, _) => ("(●)".to_string(), active),
            (false, Some(order)) => (format!("[{order}]"), selected),
            (false, None) => ("(○)".to_string(), idle),
        };
        // centre the marker on the target's cell, kept inside the border
        let x = board.x + column.saturating_sub(1).min(board.width - MARKER_WIDTH);
        buf.set_string(x, board.y + row, symbol, style);
    }
}

fn render_footer(f: &mut Frame, view: &BoardView, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        view.text(TextField::GameInstruction).to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if view.selection_controls() {
        lines.push(Line::from(format!(
            "Selected {}/{} · enter to submit · backspace to clear",
            view.text(TextField::SelectedCount),
            view.text(TextField::TotalNeeded),
        )));
    }

    let message = view.text(TextField::Message);
    if !message.is_empty() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(Span::styled(
        HELP,
        Style::default().add_modifier(Modifier::DIM),
    )));

    let footer = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

fn render_symmetry_overlay(f: &mut Frame, view: &BoardView, area: Rect) {
    let grid_lines: Vec<Line> = view
        .grid_rows()
        .map(|row| {
            let centre = row.len() / 2;
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(idx, &cell)| match (cell, idx == centre) {
                    (1, _) => Span::styled("██", Style::default().fg(Color::White)),
                    (_, true) => Span::styled("┃ ", Style::default().fg(Color::Red)),
                    _ => Span::styled("· ", Style::default().add_modifier(Modifier::DIM)),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let grid_width = view.grid_rows().next().map_or(0, |r| r.len() as u16 * 2);
    let width = (grid_width + 4).max(36).min(area.width);
    let height = (grid_lines.len() as u16 + 5).min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let mut lines = grid_lines;
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "{}s left · y = yes · n = no",
        view.text(TextField::SymmetryTimer)
    )));

    let overlay = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.text(TextField::SymmetryQuestion).to_string()),
    );
    f.render_widget(Clear, popup);
    f.render_widget(overlay, popup);
}
