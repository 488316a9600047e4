pub mod charting;

use std::str::FromStr;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::diff::{Glyph, GlyphClass};
use crate::metrics::Metrics;
use crate::session::RecordStatus;
use crate::style::{CaretStyle, StyleProfile};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Shown in place of a mistyped space so the error stays visible
const ERROR_SPACE_SYMBOL: &str = "·";

fn base_style(profile: &StyleProfile) -> Style {
    let style = Style::default();
    if profile.is_bold() {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn text_color(profile: &StyleProfile) -> Color {
    Color::from_str(&profile.text_color).unwrap_or(Color::White)
}

fn caret_modifier(caret: CaretStyle) -> Modifier {
    match caret {
        CaretStyle::None => Modifier::empty(),
        CaretStyle::Underline => Modifier::UNDERLINED,
        CaretStyle::Block => Modifier::REVERSED,
        CaretStyle::Outline => Modifier::BOLD | Modifier::UNDERLINED,
    }
}

/// Map one engine glyph to a styled span
pub fn glyph_span(glyph: &Glyph, profile: &StyleProfile) -> Span<'static> {
    let base = base_style(profile);
    let (symbol, style) = match glyph.class {
        GlyphClass::Correct => (glyph.ch.to_string(), base.fg(Color::Green)),
        GlyphClass::Error => (
            match glyph.ch {
                ' ' => ERROR_SPACE_SYMBOL.to_owned(),
                c => c.to_string(),
            },
            base.fg(Color::Red),
        ),
        GlyphClass::ErrorSpace => (
            " ".to_owned(),
            base.fg(Color::Red).add_modifier(Modifier::UNDERLINED),
        ),
        GlyphClass::Pending => (
            glyph.ch.to_string(),
            base.fg(text_color(profile)).add_modifier(Modifier::DIM),
        ),
    };

    let style = match glyph.caret {
        Some(caret) => style.add_modifier(caret_modifier(caret)),
        None => style,
    };

    let symbol = if profile.word_spacing > 0 && symbol == " " {
        "  ".to_owned()
    } else {
        symbol
    };

    Span::styled(symbol, style)
}

pub fn status_line(metrics: &Metrics) -> String {
    format!(
        "{:.2} raw wpm | {:.2}% acc | {:.2} wpm",
        metrics.raw_wpm, metrics.accuracy, metrics.net_wpm
    )
}

fn record_line(status: &RecordStatus) -> String {
    match status {
        RecordStatus::Recorded => "session saved".to_owned(),
        RecordStatus::NoUserBound => "not saved (no user)".to_owned(),
        RecordStatus::NoRecorder => "not saved (recording off)".to_owned(),
        RecordStatus::AlreadyRecorded => "already saved for this text".to_owned(),
        RecordStatus::Failed(err) => format!("save failed: {err}"),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Disabled => render_disabled(self, area, buf),
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_disabled(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::from(Span::styled(
        "typing disabled - (tab) new text / (esc)ape",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    ))];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(lines.len() as u16),
            Constraint::Fill(1),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let spans: Vec<Span> = app
        .engine
        .render(&app.style)
        .iter()
        .map(|glyph| glyph_span(glyph, &app.style))
        .collect();
    let prompt_width: usize = spans.iter().map(|s| s.content.width()).sum();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() as u16).saturating_add(1)
    };
    let padding = area
        .height
        .saturating_sub(prompt_occupied_lines.saturating_add(4))
        / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Length(1), // source / notice
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        status_line(app.engine.live_metrics()),
        dim_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let footer = match &app.notice {
        Some(notice) => Span::styled(notice.clone(), Style::default().fg(Color::Red)),
        None => Span::styled(
            app.source_label(),
            dim_style.add_modifier(Modifier::ITALIC),
        ),
    };
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // recording
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let samples = app.engine.samples();
    let (overall_duration, highest_wpm) = charting::chart_bounds(samples);
    let points = charting::chart_points(samples);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    let metrics = app
        .last_report
        .as_ref()
        .map(|report| report.metrics.clone())
        .unwrap_or_else(|| app.engine.metrics());

    Paragraph::new(Span::styled(
        format!(
            "{:.2} wpm   {:.2}% acc   {:.2} raw   {:.2} sd",
            metrics.net_wpm, metrics.accuracy, metrics.raw_wpm, metrics.consistency
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some(report) = &app.last_report {
        Paragraph::new(Span::styled(
            record_line(&report.recording),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (backspace) correct / (esc)ape",
        italic_style,
    ))
    .render(chunks[4], buf);
}
