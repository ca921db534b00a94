use super::*;

pub(super) fn render_sandbox_view(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(2), // Tab header
        Constraint::Min(5),    // Plot + labels
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_tab_header(frame, ActiveTab::Sandbox, chunks[0]);

    let body = Layout::horizontal([
        Constraint::Percentage(70), // Scatter plot
        Constraint::Percentage(30), // Cluster labels
    ])
    .split(chunks[1]);

    render_cluster_plot(frame, app, body[0]);
    render_cluster_labels(frame, app, body[1]);

    render_footer(
        frame,
        chunks[2],
        &[
            ("Tab", "pipeline"),
            ("+/-", "k"),
            ("r", "run"),
            ("c", "config"),
            ("q", "quit"),
        ],
    );
}

/// Scatter plot of the synthetic embedding points, colored by cluster.
fn render_cluster_plot(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.sandbox.points();
    let groups: Vec<Vec<(f64, f64)>> = (0..CLUSTER_COLORS.len())
        .map(|cluster| {
            points
                .iter()
                .filter(|p| p.cluster_id == cluster)
                .map(|p| (p.x, p.y))
                .collect()
        })
        .collect();

    let canvas = Canvas::default()
        .block(panel(
            &format!("Embedding Space ({} points)", points.len()),
            BORDER_SANDBOX,
        ))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(|ctx| {
            for (coords, color) in groups.iter().zip(CLUSTER_COLORS) {
                ctx.draw(&Points {
                    coords,
                    color,
                });
            }
        });
    frame.render_widget(canvas, area);
}

fn render_cluster_labels(frame: &mut Frame, app: &App, area: Rect) {
    let k = app.sandbox.k();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("k = ", Style::default().fg(LABEL_COLOR)),
            Span::styled(k.to_string(), Style::default().fg(Color::White).bold()),
        ]),
        Line::from(""),
    ];
    lines.extend(
        topic_labels(k)
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let color = CLUSTER_COLORS[i % CLUSTER_COLORS.len()];
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(color)),
                    Span::raw(label),
                ])
            }),
    );

    let labels = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(panel("Clusters", BORDER_SANDBOX));
    frame.render_widget(labels, area);
}
