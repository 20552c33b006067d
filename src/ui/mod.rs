//! Terminal presentation layer.
//!
//! Consumes read-only snapshots of the metrics aggregate and the event
//! journal on a fixed cadence and never touches core state directly. The
//! dashboard owns the terminal (alternate screen, raw mode) and turns the
//! `q`/Esc key into the same cancellation signal the OS signal handler
//! fires; `run_headless` is the no-TTY fallback that logs snapshots
//! instead.

use crate::journal::EventJournal;
use crate::metrics::{LoadMetrics, MetricsSnapshot};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table};
use ratatui::{Frame, Terminal};
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often the dashboard polls for key events between redraws.
const POLL_RATE: Duration = Duration::from_millis(250);

/// Cadence of headless snapshot logging.
const HEADLESS_REFRESH: Duration = Duration::from_secs(1);

/// Rows for the metrics table, shared between the dashboard and tests.
fn metrics_rows(snapshot: &MetricsSnapshot) -> Vec<(&'static str, String)> {
    vec![
        ("Total Requests", snapshot.total_requests.to_string()),
        ("Success Requests", snapshot.success_requests.to_string()),
        ("Failed Requests", snapshot.failed_requests.to_string()),
        (
            "Average Latency (ms)",
            format!("{:.2}", snapshot.average_latency_ms),
        ),
    ]
}

fn draw(frame: &mut Frame, snapshot: &MetricsSnapshot, entries: &[String]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Metrics
            Constraint::Min(4),    // Logs
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let header = Paragraph::new("Barrage Load Harness")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let rows: Vec<Row> = metrics_rows(snapshot)
        .into_iter()
        .map(|(name, value)| Row::new(vec![name.to_string(), value]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(24), Constraint::Length(16)])
        .header(
            Row::new(vec!["Metric", "Value"]).style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(" Metrics ").borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| ListItem::new(entry.as_str()))
        .collect();
    let logs = List::new(items)
        .style(Style::default().fg(Color::White))
        .block(Block::default().title(" Logs ").borders(Borders::ALL));
    frame.render_widget(logs, chunks[2]);

    let footer = Paragraph::new("[q] Quit").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);
}

/// Run the live dashboard until the quit key or an external cancellation.
///
/// `q`, Esc, and Ctrl-C in raw mode all cancel the shared token, so the bot
/// pool observes the same signal regardless of who triggered shutdown.
pub async fn run_dashboard(
    metrics: &LoadMetrics,
    journal: &EventJournal,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = dashboard_loop(&mut terminal, metrics, journal, &cancel);

    // Restore the terminal even when the loop errored.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn dashboard_loop(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
    metrics: &LoadMetrics,
    journal: &EventJournal,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let snapshot = metrics.snapshot();
        let entries = journal.snapshot();
        terminal.draw(|f| draw(f, &snapshot, &entries))?;

        if event::poll(POLL_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            journal.append("Received 'q'. Stopping bots...");
                            cancel.cancel();
                            break;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            cancel.cancel();
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }

        // Signal-driven shutdown: leave the terminal to the final summary.
        if cancel.is_cancelled() {
            break;
        }
    }

    Ok(())
}

/// Log a metrics snapshot once per second until cancelled.
pub async fn run_headless(metrics: &LoadMetrics, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(HEADLESS_REFRESH) => {
                let snapshot = metrics.snapshot();
                tracing::info!(
                    total = snapshot.total_requests,
                    success = snapshot.success_requests,
                    failed = snapshot.failed_requests,
                    avg_latency_ms = format!("{:.2}", snapshot.average_latency_ms),
                    "progress"
                );
            }
        }
    }
}
