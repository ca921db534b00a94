use super::*;

pub(super) fn render_config_modal(frame: &mut Frame, app: &App) {
    let Some(modal) = app.config_modal.as_ref() else {
        return;
    };
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = panel("Project Config", BORDER_MODAL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Min(4),    // Video pool
        Constraint::Length(1), // GT registry summary
        Constraint::Length(3), // Add sources
        Constraint::Length(1), // Upload status
        Constraint::Length(1), // Hints
    ])
    .split(inner);

    // === Video pool ===
    let videos = app.pipeline.videos();
    let active = app.pipeline.active_video_id();
    let header = Row::new(vec!["", "Video", "Status", "GT"])
        .style(Style::default().fg(LABEL_COLOR).bold());
    let rows: Vec<Row> = videos
        .iter()
        .map(|video| {
            let name = if Some(video.id.as_str()) == active {
                Span::styled(video.name.clone(), Style::default().fg(Color::Cyan).bold())
            } else {
                Span::raw(video.name.clone())
            };
            let gt = if video.has_gt {
                Span::styled("mapped", Style::default().fg(Color::Green))
            } else {
                Span::styled("missing", Style::default().fg(Color::DarkGray))
            };
            Row::new(vec![
                Cell::from(server_marker(video.status)),
                Cell::from(name),
                Cell::from(video.status.as_str()),
                Cell::from(gt),
            ])
        })
        .collect();
    let pool_title = if app.pipeline.assets_loading() {
        format!("Video Pool ({}) syncing...", videos.len())
    } else {
        format!("Video Pool ({})", videos.len())
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(16),
            Constraint::Length(11),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(panel(&pool_title, BORDER_PIPELINE))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("▶ ");
    let selected = (!videos.is_empty()).then_some(modal.cursor);
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, chunks[0], &mut state);

    // === GT registry ===
    let mapped = videos.iter().filter(|v| v.has_gt).count();
    let registry = Line::from(vec![
        Span::styled(" GT Registry  ", Style::default().fg(LABEL_COLOR).bold()),
        Span::raw(format!("Status: {}/{} Mapped", mapped, videos.len())),
    ]);
    frame.render_widget(Paragraph::new(registry), chunks[1]);

    // === Add sources ===
    let input = Paragraph::new(Line::from(vec![
        Span::raw(modal.input.clone()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
    ]))
    .block(panel("Add Sources (comma-separated paths)", BORDER_MODAL));
    frame.render_widget(input, chunks[2]);

    // === Upload status ===
    let status = if modal.uploading {
        Line::from(Span::styled(
            " Uploading...",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &modal.upload_error {
        Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(error) = app.pipeline.assets_error() {
        Line::from(Span::styled(
            format!(" Failed to load assets: {}", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), chunks[3]);

    render_footer(
        frame,
        chunks[4],
        &[
            ("Enter", "upload"),
            ("F5", "sync"),
            ("↑/↓", "select"),
            ("Esc", "close"),
        ],
    );
}
