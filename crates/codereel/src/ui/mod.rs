//! UI rendering for the TUI

mod canvas;


pub use canvas::{CellMetrics, TerminalSurface};

use crate::app::App;
use crate::color::to_color;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Replay canvas
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_canvas(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[1]);
}

fn draw_canvas(frame: &mut Frame, app: &mut App, area: Rect) {
    let now = app.clock().as_millis() as u64;
    {
        let mut surface = TerminalSurface::new(frame.buffer_mut(), area);
        app.renderer.paint(
            app.scheduler.context(),
            &mut app.viewport,
            &CellMetrics,
            &mut surface,
            now,
        );
    }

    if app.scheduler.context().files().is_empty() && area.height > 0 {
        let theme = app.renderer.style.theme;
        let hint = match app.branch() {
            Some(branch) => format!("No changes on {branch}"),
            None => "No branches to replay besides the default branch".to_string(),
        };
        let line_area = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(to_color(theme.muted)).bg(to_color(theme.background)))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, line_area);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.renderer.style.theme;
    let ctx = app.scheduler.context();
    let state = ctx.state();

    let state_style = if state.is_running() {
        Style::default()
            .fg(to_color(theme.background))
            .bg(to_color(theme.tab_active))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(to_color(theme.text))
            .bg(to_color(theme.rule))
    };

    let mut spans = vec![Span::styled(format!(" {} ", state.label().to_uppercase()), state_style)];

    if let Some(file) = ctx.active_file() {
        spans.push(Span::styled(
            format!(" {}/{} ", ctx.active_index() + 1, ctx.files().len()),
            Style::default().fg(to_color(theme.muted)),
        ));
        spans.push(Span::styled(
            file.path.display().to_string(),
            Style::default().fg(to_color(theme.text)),
        ));
        let stats = ctx.stats(ctx.active_index());
        spans.push(Span::styled(
            format!(" +{}", stats.insertions),
            Style::default().fg(to_color(theme.tab_active)),
        ));
        spans.push(Span::styled(
            format!(" -{}", stats.deletions),
            Style::default().fg(to_color(theme.highlight)),
        ));
    }

    if let Some(branch) = app.branch() {
        spans.push(Span::styled(
            format!("  @{branch}"),
            Style::default().fg(to_color(theme.muted)),
        ));
    }

    if let Some(message) = app.message() {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(to_color(theme.cursor)).add_modifier(Modifier::ITALIC),
        ));
    }

    let status = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(to_color(theme.background)));
    frame.render_widget(status, area);
}
