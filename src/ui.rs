//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. The
//! timeline pane draws the goal segments and the selected tracks side by side,
//! one terminal row per `pixels_per_row` pixels, so a track's block is as tall
//! as the stretch of the run it covers.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Focus};
use crate::auth::AuthState;
use crate::library::display_from_fields;
use crate::pace::{Projection, Segment, format_pace};

/// Render the controls help text for the focused pane.
fn controls_text(focus: Focus, editing: bool) -> String {
    let pane: &[(&str, &str)] = match (focus, editing) {
        (Focus::Search, true) => &[("enter/esc", "done"), ("backspace", "delete")],
        (Focus::Goal, _) => &[
            ("u", "units"),
            ("+/-", "distance"),
            ("]/[", "goal time"),
            (">/<", "scale"),
        ],
        (Focus::Search, false) => &[
            ("/", "edit query"),
            ("j/k", "down/up"),
            ("enter", "add track"),
        ],
        (Focus::Selection, _) => &[
            ("j/k", "down/up"),
            ("K/J", "move up/down"),
            ("d", "remove"),
            ("c", "create playlist"),
        ],
    };
    let global: &[(&str, &str)] = if editing {
        &[]
    } else {
        &[("tab", "next pane"), ("a", "sign in"), ("q", "quit")]
    };

    pane.iter()
        .chain(global)
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// What one terminal row of the timeline pane shows.
#[derive(Debug, Clone, Default, PartialEq)]
struct TimelineRow {
    /// Segment covering the row, used to alternate shading.
    segment: Option<usize>,
    /// Segment whose end mark falls in this row.
    segment_end: Option<usize>,
    /// Selected track covering the row.
    track: Option<usize>,
    /// A track starts in this row (its title goes here).
    track_start: Option<usize>,
}

/// Which row a pixel offset falls in.
fn row_of(px: f64, pixels_per_row: f64) -> usize {
    (px / pixels_per_row).floor().max(0.0) as usize
}

/// Lay segments and projected tracks out on terminal rows.
fn timeline_rows(
    segments: &[Segment],
    projections: &[Projection],
    pixels_per_row: f64,
) -> Vec<TimelineRow> {
    let mut segment_spans = Vec::with_capacity(segments.len());
    let mut end = 0.0;
    for s in segments {
        let start = end;
        end += s.pixel_height;
        segment_spans.push((start, end));
    }
    let timeline_end = end;
    let stack_end = projections.last().map_or(0.0, |p| p.end_px);

    let count = (timeline_end.max(stack_end) / pixels_per_row).ceil() as usize;
    let mut rows = vec![TimelineRow::default(); count];

    for (r, row) in rows.iter_mut().enumerate() {
        let mid = (r as f64 + 0.5) * pixels_per_row;
        row.segment = segment_spans
            .iter()
            .position(|&(start, end)| mid >= start && mid < end);
        row.track = projections
            .iter()
            .position(|p| mid >= p.start_px && mid < p.end_px);
    }

    for (i, &(_, end)) in segment_spans.iter().enumerate() {
        // the end mark sits on the last row the segment touches
        let r = row_of(end - 1e-9, pixels_per_row);
        if let Some(row) = rows.get_mut(r) {
            row.segment_end = Some(i);
        }
    }
    // a track starting in a row already taken is labelled on the next free one
    let mut next_free = 0;
    for (i, p) in projections.iter().enumerate() {
        let r = row_of(p.start_px, pixels_per_row).max(next_free);
        if let Some(row) = rows.get_mut(r) {
            row.track_start = Some(i);
            next_free = r + 1;
        }
    }

    rows
}

/// Pick the first visible row so that `focus_row` stays on screen.
fn scroll_offset(total: usize, height: usize, focus_row: usize) -> usize {
    if total <= height || height == 0 {
        return 0;
    }
    let half = height / 2;
    focus_row.saturating_sub(half).min(total - height)
}

fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

fn auth_text(state: &AuthState) -> &'static str {
    match state {
        AuthState::Unauthenticated => "signed out",
        AuthState::AwaitingCallback { .. } => "waiting for browser sign-in",
        AuthState::Authenticated { .. } => "signed in",
    }
}

fn pane_block(title: &'static str, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan))
    } else {
        block
    }
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(app.settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" pacelist ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_goal(frame, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    draw_timeline(frame, app, body[0]);
    draw_search(frame, app, body[1]);

    let footer = Paragraph::new(controls_text(app.focus, app.search.editing))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_goal(frame: &mut Frame, app: &App, area: Rect) {
    let timeline = app.timeline();
    let unit = timeline.unit.label();
    let selected = app.selection().total_duration();
    let delta = app.alignment_minutes();

    let goal = format!(
        "GOAL: {} {} in {} • PACE: {} /{} • SCALE: {}",
        timeline.goal_length,
        unit,
        format_pace(timeline.goal_time_minutes),
        app.pace_label(),
        unit,
        timeline.scale,
    );
    let plan = format!(
        "PLAYLIST: {} tracks, {} ({}{:.1} min) • {}",
        app.selection().len(),
        format_pace(selected.as_secs_f64() / 60.0),
        if delta >= 0.0 { "+" } else { "" },
        delta,
        auth_text(app.auth_state()),
    );

    let plan = match app.last_playlist() {
        Some(p) => format!("{plan} • LAST EXPORT: {}", p.id),
        None => plan,
    };

    let mut lines = vec![Line::from(goal), Line::from(plan)];
    if let Some(status) = app.status() {
        let style = if status.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        lines.push(Line::from(Span::styled(status.text.clone(), style)));
    }

    let par = Paragraph::new(lines)
        .block(
            pane_block(" goal ", app.focus == Focus::Goal).padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}

fn draw_timeline(frame: &mut Frame, app: &App, area: Rect) {
    let segments = app.segments();
    let projections = app.projections();
    let rows = timeline_rows(
        &segments,
        &projections,
        app.settings.timeline.pixels_per_row,
    );

    let inner_width = area.width.saturating_sub(2) as usize;
    let seg_width = 22.min(inner_width / 2);
    let track_width = inner_width.saturating_sub(seg_width + 1);
    let height = area.height.saturating_sub(2) as usize;

    let focus_row = projections
        .get(app.cursor)
        .map_or(0, |p| row_of(p.start_px, app.settings.timeline.pixels_per_row));
    let offset = scroll_offset(rows.len(), height, focus_row);
    let ui = &app.settings.ui;

    let lines: Vec<Line> = rows
        .iter()
        .skip(offset)
        .take(height)
        .map(|row| {
            let seg_text = match row.segment_end {
                Some(i) => format!(
                    "{} {}",
                    segments[i].label,
                    format_pace(segments[i].cumulative_time_minutes)
                ),
                None => String::new(),
            };
            let mut seg_style = match row.segment {
                Some(i) if i % 2 == 0 => Style::default().bg(Color::DarkGray),
                Some(_) => Style::default().bg(Color::Gray).fg(Color::Black),
                None => Style::default(),
            };
            if row.segment_end.is_some_and(|i| segments[i].is_final) {
                seg_style = seg_style.add_modifier(Modifier::BOLD);
            }

            let (track_text, track_style) = match (row.track_start, row.track) {
                (Some(i), _) => {
                    let entry = &app.selection().as_slice()[i];
                    let title = display_from_fields(
                        &entry.track,
                        &ui.track_fields,
                        &ui.track_separator,
                    );
                    (
                        format!("┌ {} ({})", title, format_mmss(entry.track.duration())),
                        entry_style(app, i),
                    )
                }
                (None, Some(i)) => ("│".to_string(), entry_style(app, i)),
                (None, None) => (String::new(), Style::default()),
            };

            Line::from(vec![
                Span::styled(pad(&seg_text, seg_width), seg_style),
                Span::raw(" "),
                Span::styled(pad(&track_text, track_width), track_style),
            ])
        })
        .collect();

    let par = Paragraph::new(lines).block(pane_block(
        " timeline ",
        app.focus == Focus::Selection,
    ));
    frame.render_widget(par, area);
}

fn entry_style(app: &App, index: usize) -> Style {
    if app.focus == Focus::Selection && index == app.cursor {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let focused = app.focus == Focus::Search;
    let query = if app.search.editing {
        format!("{}_", app.search.query)
    } else if app.search.query.is_empty() {
        "your top tracks (press / to search)".to_string()
    } else {
        app.search.query.clone()
    };
    let query_par = Paragraph::new(query).block(pane_block(" search ", focused));
    let query_par = if app.search.editing {
        query_par.bold()
    } else {
        query_par
    };
    frame.render_widget(query_par, chunks[0]);

    let ui = &app.settings.ui;
    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .map(|t| {
            ListItem::new(format!(
                "{} ({})",
                display_from_fields(t, &ui.track_fields, &ui.track_separator),
                format_mmss(t.duration())
            ))
        })
        .collect();

    let title = if app.search.in_flight() {
        " results (loading) "
    } else {
        " results "
    };
    let list = List::new(items)
        .block(pane_block(title, focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.search.results.is_empty() {
        state.select(Some(app.search.highlighted));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);
}
