//! TUI rendering.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::app::{LineKind, PlanApp};

/// Draw the full plan view: scrollback, tool activity, question panel,
/// status bar.
pub fn draw(frame: &mut Frame, app: &PlanApp) {
    let question_height = app.current_question().map_or(0, |question| {
        // Header line + options (or input line) + key hint.
        let rows = if question.options.is_empty() {
            2
        } else {
            u16::try_from(question.options.len()).unwrap_or(u16::MAX).saturating_add(1)
        };
        rows.saturating_add(2)
    });

    let mut constraints = vec![Constraint::Min(3)];
    if app.tool_line.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if question_height > 0 {
        constraints.push(Constraint::Length(question_height));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let mut next = 0;
    draw_output(frame, app, chunks[next]);
    next += 1;
    if app.tool_line.is_some() {
        draw_tool_line(frame, app, chunks[next]);
        next += 1;
    }
    if question_height > 0 {
        draw_question_panel(frame, app, chunks[next]);
        next += 1;
    }
    draw_status(frame, app, chunks[next]);
}

/// Scrollback area: each block gets a colored gutter bullet on its first
/// line and plain continuation lines after it.
fn draw_output(frame: &mut Frame, app: &PlanApp, area: Rect) {
    let palette = app.palette();
    let mut lines: Vec<Line> = Vec::new();

    for block in &app.lines {
        let (bullet, color) = match block.kind {
            LineKind::Output => ("• ", palette.output),
            LineKind::Answer => ("", palette.answer),
            LineKind::Success => ("• ", palette.success),
            LineKind::Error => ("• ", palette.error),
        };
        for (i, text_line) in block.text.lines().enumerate() {
            if i == 0 {
                lines.push(Line::from(vec![
                    Span::styled(bullet, Style::default().fg(color)),
                    Span::styled(text_line.to_owned(), Style::default().fg(color)),
                ]));
            } else {
                lines.push(Line::from(Span::styled(
                    format!("{}{text_line}", " ".repeat(bullet.chars().count())),
                    Style::default().fg(color),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    let visible_height = usize::from(area.height);
    let total = lines.len();
    let max_offset = total.saturating_sub(visible_height);
    let offset = if app.follow {
        max_offset
    } else {
        app.scroll.min(max_offset)
    };

    let visible: Vec<Line> = lines.into_iter().skip(offset).collect();
    frame.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), area);
}

/// Single-line tool activity indicator.
fn draw_tool_line(frame: &mut Frame, app: &PlanApp, area: Rect) {
    let palette = app.palette();
    let Some((name, summary)) = &app.tool_line else {
        return;
    };
    let line = Line::from(vec![
        Span::styled("⚙ ", Style::default().fg(palette.answer)),
        Span::styled(
            name.clone(),
            Style::default()
                .fg(palette.answer)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(summary.clone(), Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Interactive question panel: header, numbered options or a free-text
/// input line, and the key hint.
fn draw_question_panel(frame: &mut Frame, app: &PlanApp, area: Rect) {
    let palette = app.palette();
    let Some(question) = app.current_question() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    let header = if question.header.is_empty() {
        question.text.clone()
    } else {
        format!("{}: {}", question.header, question.text)
    };
    lines.push(Line::from(Span::styled(
        header,
        Style::default().add_modifier(Modifier::BOLD),
    )));

    if question.options.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("› ", Style::default().fg(palette.answer)),
            Span::raw(app.answer_input.clone()),
            Span::styled("▌", Style::default().add_modifier(Modifier::DIM)),
        ]));
        lines.push(Line::from(Span::styled(
            "type your answer, enter to submit",
            Style::default().add_modifier(Modifier::DIM),
        )));
    } else {
        for (i, option) in question.options.iter().enumerate() {
            let mut spans = vec![
                Span::raw("  "),
                Span::styled(
                    format!("{}", i + 1),
                    Style::default()
                        .fg(palette.question)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(option.label.clone()),
            ];
            if let Some(description) = &option.description {
                spans.push(Span::styled(
                    format!("  - {description}"),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(Span::styled(
            "press a number to select",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let block = Block::default().borders(Borders::TOP);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Status bar: current activity plus the follow-mode hint.
fn draw_status(frame: &mut Frame, app: &PlanApp, area: Rect) {
    let follow_hint = if app.follow {
        "f: follow on"
    } else {
        "f: re-enable follow"
    };
    let line = Line::from(vec![
        Span::raw(app.status.clone()),
        Span::styled(
            format!("  {follow_hint}  t: theme  q: quit"),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
