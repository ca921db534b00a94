use super::*;

pub(super) fn render_pipeline_view(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: tab header, active video, stage tabs, stage body, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Tab header
        Constraint::Length(3), // Active video selector
        Constraint::Length(1), // Stage tabs
        Constraint::Min(5),    // Stage body
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_tab_header(frame, ActiveTab::Pipeline, chunks[0]);
    render_video_selector(frame, app, chunks[1]);
    render_stage_tabs(frame, app.stage, chunks[2]);

    if let Some(message) = app.pipeline.placeholder() {
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(panel("Pipeline", BORDER_PIPELINE));
        frame.render_widget(placeholder, chunks[3]);
    } else {
        match app.stage {
            Stage::Segmentation => render_segmentation_stage(frame, app, chunks[3]),
            Stage::Semantic => render_semantic_stage(frame, app, chunks[3]),
            Stage::Strategy => render_strategy_stage(frame, app, chunks[3]),
            Stage::FinalCut => render_final_cut_stage(frame, app, chunks[3]),
        }
    }

    render_pipeline_footer(frame, app.stage, chunks[4]);
}

/// Active video, its reconciled status and the stream state.
fn render_video_selector(frame: &mut Frame, app: &App, area: Rect) {
    let pipeline = &app.pipeline;
    let mut spans = Vec::new();

    match pipeline.active_video() {
        Some(video) => {
            let status = pipeline.resolve_status(video);
            let position = pipeline.active_index().map(|i| i + 1).unwrap_or(0);
            spans.push(Span::styled(
                format!(" [{}/{}] ", position, pipeline.videos().len()),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::styled(
                video.name.clone(),
                Style::default().fg(Color::White).bold(),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                status.as_str().to_uppercase(),
                Style::default().fg(status_color(status)).bold(),
            ));
            spans.push(Span::styled(
                format!("  {}", format_time(video.duration)),
                Style::default().fg(Color::DarkGray),
            ));
        }
        None => spans.push(Span::styled(
            " no active video",
            Style::default().fg(Color::DarkGray),
        )),
    }

    spans.push(Span::styled(
        format!("   stream: {}", pipeline.connection().as_str()),
        Style::default().fg(LABEL_COLOR),
    ));

    let selector = Paragraph::new(Line::from(spans)).block(panel("Active Video", BORDER_PIPELINE));
    frame.render_widget(selector, area);
}

fn render_stage_tabs(frame: &mut Frame, active: Stage, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for stage in Stage::ALL {
        let style = if stage == active {
            Style::default()
                .fg(Color::Cyan)
                .bold()
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", stage.title()), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ========== Stage 1: Segmentation ==========

fn render_segmentation_stage(frame: &mut Frame, app: &App, area: Rect) {
    let Some(video) = app.pipeline.active_video() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(4), // Run status
        Constraint::Length(4), // Tracks
        Constraint::Min(3),    // Segment table
    ])
    .split(area);

    // === Run status ===
    let status = app.pipeline.resolve_status(video);
    let block = panel("Segmentation", BORDER_PIPELINE);
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    if status.is_processing() {
        let progress = app.pipeline.progress(video).clamp(0.0, 100.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 40)))
            .ratio(progress / 100.0)
            .label(Span::styled(
                format!("PROCESSING {:.0}%", progress),
                Style::default().fg(Color::White).bold(),
            ));
        frame.render_widget(gauge, rows[0]);
    } else {
        let action = if status == PipelineStatus::Done {
            "Re-run"
        } else {
            "Execute"
        };
        let line = Line::from(vec![
            Span::styled("Status: ", Style::default().fg(LABEL_COLOR)),
            Span::styled(status.as_str(), Style::default().fg(status_color(status))),
            Span::raw("   "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {}", action)),
        ]);
        frame.render_widget(Paragraph::new(line), rows[0]);
    }

    let mut notices = Vec::new();
    if let Some(error) = app.pipeline.task_error() {
        notices.push(Span::styled(
            format!("✗ {}", error),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(banner) = app.pipeline.stream_banner() {
        if !notices.is_empty() {
            notices.push(Span::raw("   "));
        }
        notices.push(Span::styled(
            format!("⚠ {}", banner),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(notices)), rows[1]);

    // === Tracks ===
    let playback = &app.pipeline.playback;
    let play_icon = if playback.is_playing() { "▶" } else { "⏸" };
    let title = format!(
        "Timeline  {} {} / {}",
        play_icon,
        format_time(playback.position()),
        format_time(video.duration)
    );
    let block = panel(&title, BORDER_TIMELINE);
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    let label_width = 6;
    let width = (inner.width as usize).saturating_sub(label_width);
    let playhead = Some(playback.position());

    let gt_line = match &video.ground_truth {
        Some(gt) => track_line(gt, video.duration, width, playhead, TRACK_GT),
        None if video.has_gt => Line::from(Span::styled(
            "loading ground truth...",
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::from(Span::styled(
            "no ground truth",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let pred_line = track_line(
        &video.predicted_segments,
        video.duration,
        width,
        playhead,
        TRACK_PRED,
    );

    let mut gt_spans = vec![Span::styled("GT    ", Style::default().fg(TRACK_GT))];
    gt_spans.extend(gt_line.spans);
    let mut pred_spans = vec![Span::styled("PRED  ", Style::default().fg(TRACK_PRED))];
    pred_spans.extend(pred_line.spans);
    frame.render_widget(
        Paragraph::new(vec![Line::from(gt_spans), Line::from(pred_spans)]),
        inner,
    );

    // === Segment table ===
    let segments = &video.predicted_segments;
    if segments.is_empty() {
        let message = if status.is_processing() {
            "Waiting for segmentation results..."
        } else {
            "No predicted segments"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(panel("Segments", BORDER_TIMELINE));
        frame.render_widget(empty, chunks[2]);
        return;
    }

    let header = Row::new(vec!["ID", "Range", "Score", "Pos", "Neg"])
        .style(Style::default().fg(LABEL_COLOR).bold());
    let rows: Vec<Row> = segments
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.id.clone()),
                Cell::from(format_range(s.start, s.end)),
                Cell::from(format_score(s.score)),
                Cell::from(format_score(s.pos_score)),
                Cell::from(format_score(s.neg_score)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(14),
        Constraint::Length(22),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&format!("Segments ({})", segments.len()), BORDER_TIMELINE))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    let selected = app
        .pipeline
        .selected_segment()
        .filter(|selected| selected.video_id == video.id)
        .and_then(|selected| segments.iter().position(|s| s.id == selected.segment_id));
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, chunks[2], &mut state);
}

// ========== Stage 2: Semantic ==========

fn render_semantic_stage(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Scan progress
        Constraint::Length(5), // Heatmap
        Constraint::Min(3),    // Gallery
    ])
    .split(area);

    // === Scan ===
    let scan = &app.pipeline.semantic;
    let progress = scan.display_progress().min(100);
    let label = if scan.is_running() {
        format!("ANALYZING {}%", progress)
    } else {
        "s Start Analysis".to_string()
    };
    let gauge = Gauge::default()
        .block(panel("Semantic Analysis", BORDER_PIPELINE))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Rgb(40, 40, 40)))
        .ratio(progress as f64 / 100.0)
        .label(Span::styled(label, Style::default().fg(Color::White).bold()));
    frame.render_widget(gauge, chunks[0]);

    let index = app.pipeline.selected_index();
    let timeline = app.pipeline.timeline();

    // === Heatmap ===
    let cells: Vec<Span> = timeline
        .segments()
        .iter()
        .map(|flat| {
            let color = bucket_color(ScoreBucket::from_score(flat.segment.score));
            let mut style = Style::default().fg(color);
            if index == Some(flat.global_index) {
                style = style.bg(Color::White);
            }
            Span::styled("█", style)
        })
        .collect();
    let heatmap = if cells.is_empty() {
        Paragraph::new("No segments loaded").style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(Line::from(cells)).wrap(Wrap { trim: false })
    };
    frame.render_widget(
        heatmap.block(panel(
            &format!("Heatmap ({} segments)", timeline.len()),
            BORDER_TIMELINE,
        )),
        chunks[1],
    );

    // === Gallery ===
    let header = Row::new(vec!["#", "Video", "Segment", "Range", "Score", "Bucket"])
        .style(Style::default().fg(LABEL_COLOR).bold());
    let rows: Vec<Row> = timeline
        .segments()
        .iter()
        .map(|flat| {
            let bucket = ScoreBucket::from_score(flat.segment.score);
            Row::new(vec![
                Cell::from(flat.global_index.to_string()),
                Cell::from(flat.video_name.clone()),
                Cell::from(flat.segment.label.clone()),
                Cell::from(format_range(flat.segment.start, flat.segment.end)),
                Cell::from(format_score(flat.segment.score)),
                Cell::from(Span::styled(
                    bucket.as_str(),
                    Style::default().fg(bucket_color(bucket)),
                )),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Length(6),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel("Gallery", BORDER_TIMELINE))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(index);
    frame.render_stateful_widget(table, chunks[2], &mut state);
}

// ========== Stage 3: Strategy ==========

fn render_strategy_stage(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(40), // Parameters
        Constraint::Percentage(60), // Log
    ])
    .split(area);

    let run = &app.pipeline.strategy;
    let left = Layout::vertical([Constraint::Min(7), Constraint::Length(3)]).split(chunks[0]);

    // === Parameters ===
    let params = run.params();
    let rows: Vec<Row> = StrategyField::ALL
        .iter()
        .map(|field| {
            let precision = if field.step() < 0.1 { 2 } else { 1 };
            Row::new(vec![
                Cell::from(field.label()),
                Cell::from(format!("{:.*}", precision, params.get(*field))),
            ])
        })
        .collect();
    let title = if run.is_running() {
        "Parameters (locked)"
    } else {
        "Parameters"
    };
    let table = Table::new(rows, [Constraint::Min(18), Constraint::Length(8)])
        .block(panel(title, BORDER_PIPELINE))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let selected = StrategyField::ALL
        .iter()
        .position(|f| *f == app.strategy_field);
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, left[0], &mut state);

    // === Run progress ===
    let label = if run.is_running() {
        format!("RUNNING {}%", run.progress())
    } else {
        "Enter Run Strategy".to_string()
    };
    let gauge = Gauge::default()
        .block(panel("Run", BORDER_PIPELINE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Rgb(40, 40, 40)))
        .ratio(run.progress().min(100) as f64 / 100.0)
        .label(Span::styled(label, Style::default().fg(Color::White).bold()));
    frame.render_widget(gauge, left[1]);

    // === Log ===
    let block = panel(&format!("Strategy Log ({})", run.logs().len()), BORDER_LOG);
    let inner_height = block.inner(chunks[1]).height as usize;
    let skip = run.logs().len().saturating_sub(inner_height);
    let lines: Vec<Line> = run
        .logs()
        .iter()
        .skip(skip)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<7}", entry.kind.as_str().to_uppercase()),
                    Style::default().fg(log_kind_color(entry.kind)).bold(),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

// ========== Stage 4: Final Cut ==========

fn render_final_cut_stage(frame: &mut Frame, app: &App, area: Rect) {
    let Some(video) = app.pipeline.active_video() else {
        return;
    };
    let edl = build_edl(video);
    let title = format!(
        "Final Cut ({} clips, {})",
        edl.len(),
        format_time(total_duration(&edl))
    );

    if edl.is_empty() {
        let empty = Paragraph::new("Nothing to cut yet; run segmentation first")
            .style(Style::default().fg(Color::DarkGray))
            .block(panel(&title, BORDER_TIMELINE));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["ID", "Source", "Source Range", "Target Range"])
        .style(Style::default().fg(LABEL_COLOR).bold());
    let rows: Vec<Row> = edl
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.id.clone()),
                Cell::from(item.source_id.clone()),
                Cell::from(format_range(item.source_start, item.source_end)),
                Cell::from(format_range(item.target_start, item.target_end)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(22),
        Constraint::Length(22),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&title, BORDER_TIMELINE));
    frame.render_widget(table, area);
}

fn render_pipeline_footer(frame: &mut Frame, stage: Stage, area: Rect) {
    let mut hints = vec![("Tab", "sandbox"), ("1-4", "stage"), ("[ ]", "video")];
    match stage {
        Stage::Segmentation => {
            hints.extend([("Enter", "run"), ("Space", "play"), ("j/k", "segment")]);
        }
        Stage::Semantic => {
            hints.extend([("s", "analyze"), ("←/→", "gallery")]);
        }
        Stage::Strategy => {
            hints.extend([("Enter", "run"), ("j/k", "param"), ("+/-", "adjust")]);
        }
        Stage::FinalCut => {}
    }
    hints.extend([("c", "config"), ("q", "quit")]);
    render_footer(frame, area, &hints);
}
