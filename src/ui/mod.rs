use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, InputMode, StatusLevel};
use crate::domain::address::short_addr;
use crate::domain::{Field, NetworkId, ProbeStatus};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_controls(f, areas.controls, app);
    draw_results(f, areas.results, app);
    draw_status_line(f, areas.status_line, app);
    draw_hint_line(f, areas.hint_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn label(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let config = app.workflow.config();
    let line = Line::from(vec![
        Span::styled(
            "QuartzSignal",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Built for Base  "),
        label("RPC "),
        Span::raw(app.rpc_endpoint.clone()),
        Span::raw("  "),
        label("Network "),
        Span::raw(config.caption()),
    ]);
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let current = app.network();
    let mut network_spans = vec![label("Network  ")];
    for id in NetworkId::ALL {
        let caption = format!(" {} ", id.config().caption());
        let style = if id == current {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        network_spans.push(Span::styled(caption, style));
        network_spans.push(Span::raw(" "));
    }

    let address_line = match app.input_mode {
        InputMode::Address => Line::from(vec![
            label("Address  "),
            Span::styled(
                format!("{}_", app.address_draft),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        InputMode::Normal if app.address.is_empty() => {
            Line::from(vec![label("Address  "), label("0x… (press a to edit)")])
        }
        InputMode::Normal => {
            let marker = if app.address_is_valid() {
                Span::styled("  ✓", Style::default().fg(Color::Green))
            } else {
                Span::styled("  not an address", Style::default().fg(Color::Yellow))
            };
            Line::from(vec![label("Address  "), Span::raw(app.address.clone()), marker])
        }
    };

    let status = &app.probe().status;
    let status_line = Line::from(vec![
        label("Status   "),
        Span::styled(
            status.label(),
            status_style(status).add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(network_spans), address_line, status_line])
        .block(Block::default().borders(Borders::ALL).title("Probe"));
    f.render_widget(paragraph, area);
}

fn status_style(status: &ProbeStatus) -> Style {
    match status {
        ProbeStatus::Idle => Style::default().fg(Color::Gray),
        ProbeStatus::Running => Style::default().fg(Color::Yellow),
        ProbeStatus::Finished => Style::default().fg(Color::Green),
        ProbeStatus::Failed(_) => Style::default().fg(Color::Red),
    }
}

fn field_style<T>(field: &Field<T>) -> Style {
    match field {
        Field::NotRun => Style::default().fg(Color::DarkGray),
        Field::Pending => Style::default().fg(Color::Yellow),
        Field::Value(_) => Style::default().fg(Color::White),
        Field::Failed(_) => Style::default().fg(Color::Red),
    }
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let probe = app.probe();

    let chain_style = match (probe.observed_chain_id.value(), probe.warning.is_some()) {
        (Some(_), true) => Style::default().fg(Color::Yellow),
        _ => field_style(&probe.observed_chain_id),
    };

    let mut lines = vec![
        Line::from(vec![
            label("Expected chainId  "),
            Span::raw(probe.expected_chain_id().to_string()),
        ]),
        Line::from(vec![
            label("RPC chainId       "),
            Span::styled(probe.chain_id_text(), chain_style),
        ]),
        Line::from(vec![
            label("Latest block      "),
            Span::styled(probe.block_text(), field_style(&probe.latest_block)),
        ]),
        Line::from(vec![
            label("Native balance    "),
            Span::styled(probe.balance_text(), field_style(&probe.balance_wei)),
        ]),
    ];

    if let Some(address) = probe.address {
        lines.push(Line::from(vec![
            label("  of              "),
            Span::raw(short_addr(&address.to_string())),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label("Explorer          "),
        Span::styled(probe.explorer_link(), Style::default().fg(Color::Cyan)),
    ]));

    if let Some(at) = probe.finished_at {
        lines.push(Line::from(vec![
            label("Last probe        "),
            Span::raw(at.format("%H:%M:%S").to_string()),
        ]));
    }
    if let Some(warning) = &probe.warning {
        lines.push(Line::from(Span::styled(
            format!("⚠ {warning}"),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(error) = probe.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Base Read Results"));
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let Some((text, level)) = app.status_text() else {
        return;
    };
    let color = match level {
        StatusLevel::Info => Color::White,
        StatusLevel::Warn => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };
    let paragraph = Paragraph::new(Line::from(text.to_string()))
        .style(Style::default().fg(color))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn draw_hint_line(f: &mut Frame, area: Rect, app: &App) {
    let hint = match app.input_mode {
        InputMode::Address => "Enter save  Esc cancel",
        InputMode::Normal if app.workflow.is_running() => {
            "probe in flight; r re-runs (earlier result is dropped)  n network  q quit"
        }
        InputMode::Normal => "r run probe  n network  a address  c clear  ? help  q quit",
    };
    f.render_widget(
        Paragraph::new(Line::from(label(hint))).alignment(Alignment::Left),
        area,
    );
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Probe"),
        Line::from("  r / Enter  Run probe (chain id, block, balance)"),
        Line::from("  n / Tab    Switch network"),
        Line::from("  a / i      Edit address"),
        Line::from("  c          Clear address"),
        Line::from(""),
        Line::from("Address input"),
        Line::from("  Enter      Save"),
        Line::from("  Esc        Cancel"),
        Line::from(""),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Balance is read only for 0x + 40 hex addresses."),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::domain::probe::ProbeReport;

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_draw_initial_screen() {
        let app = App::new(NetworkId::BaseSepolia, String::new());
        let screen = rendered(&app);
        assert!(screen.contains("Expected chainId"));
        assert!(screen.contains("84532"));
        assert!(screen.contains("not run"));
        assert!(screen.contains("https://sepolia.basescan.org"));
    }

    #[test]
    fn test_draw_after_probe() {
        let mut app = App::new(NetworkId::Base, String::new());
        app.trigger_probe();
        let ticket = app.take_probe_request().unwrap();
        app.apply_probe_done(
            ticket,
            Ok(ProbeReport {
                chain_id: 8453,
                block_number: 424242,
                balance_wei: None,
            }),
        );
        let screen = rendered(&app);
        assert!(screen.contains("424242"));
        assert!(screen.contains("Finished"));
        assert!(screen.contains("n/a"));
    }
}
