//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame,
};
use vidsynth_core::edl::{build_edl, total_duration};
use vidsynth_core::format::{format_range, format_score, format_time};
use vidsynth_core::sandbox::topic_labels;
use vidsynth_core::semantic::ScoreBucket;
use vidsynth_core::strategy::StrategyField;
use vidsynth_core::{LogKind, PipelineStatus, Segment, VideoStatus};

use crate::app::{App, Stage, ViewMode};

mod config_modal;
mod pipeline;
mod sandbox;

use config_modal::render_config_modal;
use pipeline::render_pipeline_view;
use sandbox::render_sandbox_view;

// ========== Color Palette ==========

/// Border for the active video / status panels
const BORDER_PIPELINE: Color = Color::Rgb(0, 150, 150);
/// Border for timeline and segment panels
const BORDER_TIMELINE: Color = Color::Rgb(80, 160, 80);
/// Border for the strategy log
const BORDER_LOG: Color = Color::Rgb(180, 100, 180);
/// Border for the sandbox plot
const BORDER_SANDBOX: Color = Color::Rgb(100, 180, 100);
/// Border for the config modal
const BORDER_MODAL: Color = Color::Rgb(255, 180, 100);
/// Section labels
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Ground-truth track
const TRACK_GT: Color = Color::Rgb(220, 180, 0);
/// Predicted track
const TRACK_PRED: Color = Color::Rgb(0, 180, 180);
/// Empty track cells
const TRACK_EMPTY: Color = Color::Rgb(60, 60, 60);

/// Cluster colors on the sandbox plot
const CLUSTER_COLORS: [Color; 4] = [
    Color::Rgb(239, 68, 68),
    Color::Rgb(59, 130, 246),
    Color::Rgb(16, 185, 129),
    Color::Rgb(245, 158, 11),
];

pub fn render(frame: &mut Frame, app: &mut App) {
    match app.view_mode {
        ViewMode::Pipeline => render_pipeline_view(frame, app),
        ViewMode::Sandbox => render_sandbox_view(frame, app),
    }

    if app.config_modal.is_some() {
        render_config_modal(frame, app);
    }
}

/// Which tab is currently active.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveTab {
    Pipeline,
    Sandbox,
}

/// Render the tab bar header with the Pipeline and Sandbox tabs.
fn render_tab_header(frame: &mut Frame, active: ActiveTab, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Length(11), // App name
        Constraint::Min(1),     // Tabs
    ])
    .split(area);

    let app_name = Paragraph::new(" vidsynth").style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(app_name, chunks[0]);

    let active_style = Style::default()
        .fg(Color::Cyan)
        .bold()
        .add_modifier(Modifier::UNDERLINED);
    let inactive_style = Style::default().fg(Color::DarkGray);

    let style_for = |tab: ActiveTab| {
        if tab == active {
            active_style
        } else {
            inactive_style
        }
    };

    let tabs = Line::from(vec![
        Span::styled(" Main Pipeline ", style_for(ActiveTab::Pipeline)),
        Span::styled("  ", Style::default()),
        Span::styled(" Cluster Sandbox ", style_for(ActiveTab::Sandbox)),
    ]);

    let tabs_para = Paragraph::new(tabs).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs_para, chunks[1]);
}

/// Render a footer of `key description` pairs.
fn render_footer(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {}", key), Style::default().fg(Color::Yellow)),
                Span::raw(format!(" {}  ", label)),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Rounded, titled panel in the house style.
fn panel(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color).bold())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn status_color(status: PipelineStatus) -> Color {
    match status {
        PipelineStatus::Idle => Color::DarkGray,
        PipelineStatus::Processing => Color::Yellow,
        PipelineStatus::Done => Color::Green,
        PipelineStatus::Error => Color::Red,
    }
}

fn bucket_color(bucket: ScoreBucket) -> Color {
    match bucket {
        ScoreBucket::Low => Color::Rgb(30, 58, 138),
        ScoreBucket::Medium => Color::Rgb(37, 99, 235),
        ScoreBucket::High => Color::Rgb(96, 165, 250),
        ScoreBucket::Peak => Color::Rgb(224, 242, 254),
    }
}

fn log_kind_color(kind: LogKind) -> Color {
    match kind {
        LogKind::Info => Color::Gray,
        LogKind::Filter => Color::Yellow,
        LogKind::Merge => Color::Cyan,
        LogKind::Result => Color::Green,
    }
}

/// Server status marker used in video lists.
fn server_marker(status: VideoStatus) -> Span<'static> {
    match status {
        VideoStatus::Processing | VideoStatus::Pending => {
            Span::styled("● ", Style::default().fg(Color::Yellow))
        }
        VideoStatus::Error => Span::styled("✗ ", Style::default().fg(Color::Red)),
        _ => Span::raw("  "),
    }
}

/// Rasterize `segments` over `duration` into `width` cells.
///
/// Cells covered by any segment are filled; the cell holding the playhead
/// is drawn as a cursor.
fn track_line(
    segments: &[Segment],
    duration: f64,
    width: usize,
    playhead: Option<f64>,
    color: Color,
) -> Line<'static> {
    if width == 0 || duration <= 0.0 {
        return Line::from(Span::styled(
            "no duration",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let cell = duration / width as f64;
    let playhead_col = playhead.map(|p| ((p / cell) as usize).min(width - 1));

    let spans = (0..width)
        .map(|col| {
            let t = (col as f64 + 0.5) * cell;
            if playhead_col == Some(col) {
                return Span::styled("│", Style::default().fg(Color::White).bold());
            }
            let covered = segments.iter().any(|s| s.start <= t && t < s.end);
            if covered {
                Span::styled("█", Style::default().fg(color))
            } else {
                Span::styled("·", Style::default().fg(TRACK_EMPTY))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Center a `percent_x` by `percent_y` rectangle within `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> Segment {
        Segment {
            id: format!("clip_{start}"),
            start,
            end,
            label: String::new(),
            score: None,
            pos_score: None,
            neg_score: None,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_track_line_marks_covered_cells() {
        let line = track_line(&[seg(0.0, 5.0)], 10.0, 10, None, TRACK_PRED);
        assert_eq!(text(&line), "█████·····");
    }

    #[test]
    fn test_track_line_draws_playhead() {
        let line = track_line(&[], 10.0, 5, Some(4.1), TRACK_GT);
        assert_eq!(text(&line), "··│··");
    }

    #[test]
    fn test_track_line_without_duration() {
        let line = track_line(&[seg(0.0, 1.0)], 0.0, 10, None, TRACK_GT);
        assert_eq!(text(&line), "no duration");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 60, area);
        assert!((58..=62).contains(&inner.width));
        assert!(inner.x >= 18 && inner.right() <= 82);
        assert!(inner.y >= 8 && inner.bottom() <= 42);
    }
}
