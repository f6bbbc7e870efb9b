mod app;

use std::io;
use std::time::Duration;

use app::{
    format_alert_detail, format_signal, format_status, format_team, format_time, truncate,
    AppState, ConnectionStatus,
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut games_state = TableState::default();
    games_state.select(None);

    let result = run_loop(&mut terminal, &mut app, &client, &mut games_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    games_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(2);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, games_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Char('s') | KeyCode::Char('S') => {
                            app.next_sport();
                            games_state.select(None);
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Char('x') | KeyCode::Char('X') => {
                            app.reset_session(client).await;
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.games.len().saturating_sub(1);
                            let next = games_state.selected().map_or(0, |i| (i + 1).min(max));
                            games_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = games_state
                                .selected()
                                .map_or(0, |i| i.saturating_sub(1));
                            games_state.select(Some(prev));
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, games_state: &mut TableState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, games_state, chunks[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let latency_str = match (app.latency.p50_ms, app.latency.p99_ms) {
        (Some(p50), Some(p99)) => format!("cycle p50 {p50}ms p99 {p99}ms"),
        _ => "cycle —".to_string(),
    };
    let failures_color = if app.health.upstream_failures > 0 {
        Color::Red
    } else {
        Color::White
    };

    let title_spans = vec![
        Span::styled(
            " Courtside Edge  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            app.sport().unwrap_or("all").to_uppercase(),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!(
                "{} games  {} alerts",
                app.health.games_tracked, app.health.alerts_published
            ),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("{} cycles ({})", app.health.cycles_completed, app.health.status),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(latency_str, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(
            format!("{} upstream failures", app.health.upstream_failures),
            Style::default().fg(failures_color),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, games_state: &mut TableState, area: Rect) {
    // Horizontal split: games (55%) | alerts (45%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_games_table(f, app, games_state, halves[0]);
    render_alerts_table(f, app, halves[1]);
}

fn render_games_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["Lg", "Away", "Home", "Score", "Status", "Signal"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .games
        .iter()
        .map(|g| {
            let s = &g.snapshot;
            let fav_style = |side: &str| {
                if g.favorite == side {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                }
            };
            let score = if s.state == "scheduled" {
                "—".to_string()
            } else {
                format!("{}-{}", s.away.score, s.home.score)
            };
            let status_color = match s.state.as_str() {
                "live" => Color::Green,
                "final" => Color::DarkGray,
                _ => Color::White,
            };
            let signal_color = match g.edge.as_ref().map(|e| e.strength.as_str()) {
                Some("STRONG") => Color::Green,
                Some("MODERATE") => Color::LightGreen,
                Some("LEAN") => Color::Yellow,
                Some(_) => Color::DarkGray,
                None => match g.projection.as_ref().and_then(|p| p.cushion) {
                    Some(c) if c >= 0.0 => Color::Cyan,
                    Some(_) => Color::Red,
                    None => Color::White,
                },
            };

            Row::new(vec![
                Cell::from(s.sport.to_uppercase()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&format_team(&s.away), 18)).style(fav_style("away")),
                Cell::from(truncate(&format_team(&s.home), 18)).style(fav_style("home")),
                Cell::from(score),
                Cell::from(format_status(s)).style(Style::default().fg(status_color)),
                Cell::from(format_signal(g)).style(Style::default().fg(signal_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(22),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " GAMES ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_alerts_table(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["Time", "Kind", "Game", "Detail"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .alerts
        .iter()
        .map(|a| {
            let kind_color = match a.kind.as_str() {
                "sniper" => Color::Magenta,
                "comeback" => Color::Green,
                "mispricing" => Color::Yellow,
                _ => Color::White,
            };
            Row::new(vec![
                Cell::from(format_time(&a.fired_at)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(a.kind.to_uppercase()).style(Style::default().fg(kind_color)),
                Cell::from(truncate(&a.matchup, 24)),
                Cell::from(format_alert_detail(a)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(24),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " ALERTS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[s] ", Style::default().fg(Color::Yellow)),
        Span::raw("league  "),
        Span::styled("[x] ", Style::default().fg(Color::Yellow)),
        Span::raw("reset session  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll games  "),
        Span::styled("auto-refresh: 2s", Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
