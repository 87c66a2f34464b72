//! Drawing a session view.
//!
//! The rendered tree is flattened into lines: text as styled lines,
//! buttons as bracketed labels, loaders as spinners, nested containers
//! indented by two columns.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::theme::{component_style, COLOR_ACTIVE, COLOR_BORDER, COLOR_DIM, COLOR_ERROR, COLOR_FOCUS, COLOR_HEADER};
use super::UiState;
use crate::engine::{RenderNode, RenderedButton};
use crate::session::SessionView;

/// Spinner frames for loaders
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const KEY_HINTS: &str = "[Tab] next  [Shift-Tab] prev  [Enter] press  [q] quit";

pub fn render_screen(frame: &mut Frame, view: &SessionView, ui: &UiState) {
    let area = frame.area();

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(Span::styled(
            format!(" {} ", view.screen_id()),
            Style::default().fg(COLOR_HEADER).add_modifier(Modifier::BOLD),
        ));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let [body, hints] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner.inner(Margin::new(1, 0)));

    let paragraph = Paragraph::new(view_lines(view, ui)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, body);
    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(COLOR_DIM)),
        hints,
    );
}

/// Lines for a view; also used by tests.
pub fn view_lines(view: &SessionView, ui: &UiState) -> Vec<Line<'static>> {
    match view {
        SessionView::Loading { .. } => vec![Line::from(vec![
            Span::styled(spinner(ui.tick), Style::default().fg(COLOR_ACTIVE)),
            Span::raw(" Cargando..."),
        ])],
        SessionView::Failed { message, .. } => vec![
            Line::styled(message.clone(), Style::default().fg(COLOR_ERROR)),
            Line::default(),
            Line::styled("Open another screen to retry.", Style::default().fg(COLOR_DIM)),
        ],
        SessionView::Ready { root: None, .. } => Vec::new(),
        SessionView::Ready { root: Some(root), .. } => {
            let mut lines = Vec::new();
            let mut button_index = 0;
            push_node(root, 0, ui, &mut button_index, &mut lines);
            lines
        }
    }
}

fn push_node(
    node: &RenderNode,
    depth: usize,
    ui: &UiState,
    button_index: &mut usize,
    lines: &mut Vec<Line<'static>>,
) {
    let indent = "  ".repeat(depth);
    match node {
        RenderNode::Container(container) => {
            // The root container adds no indentation.
            let child_depth = if depth == 0 && container.id.is_none() { 0 } else { depth + 1 };
            for child in &container.children {
                push_node(child, child_depth, ui, button_index, lines);
            }
        }
        RenderNode::Text(text) => {
            let style = component_style(&text.style);
            for part in text.text.lines() {
                lines.push(Line::from(vec![
                    Span::raw(indent.clone()),
                    Span::styled(part.to_string(), style),
                ]));
            }
        }
        RenderNode::Button(button) => {
            let focused = *button_index == ui.focus;
            *button_index += 1;
            lines.push(Line::from(vec![Span::raw(indent), button_span(button, focused, ui.tick)]));
        }
        RenderNode::Loader(loader) => {
            let mut spans = vec![
                Span::raw(indent),
                Span::styled(spinner(ui.tick), Style::default().fg(COLOR_ACTIVE)),
            ];
            if let Some(text) = &loader.text {
                spans.push(Span::raw(format!(" {}", text)));
            }
            lines.push(Line::from(spans));
        }
    }
}

fn button_span(button: &RenderedButton, focused: bool, tick: usize) -> Span<'static> {
    let label = if button.loading {
        format!("[ {} {} ]", spinner(tick), button.title)
    } else {
        format!("[ {} ]", button.title)
    };
    let mut style = component_style(&button.style);
    if !button.is_enabled() {
        style = style.fg(COLOR_DIM);
    } else if focused {
        style = style.fg(COLOR_FOCUS).add_modifier(Modifier::BOLD | Modifier::REVERSED);
    } else if button.variant == "primary" {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(label, style)
}

fn spinner(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}
