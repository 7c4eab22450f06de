//! TUI rendering logic

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::cli::tui::app::App;
use crate::models::{FocusedPane, LogEntry};

/// Main UI rendering function
pub fn ui(f: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_status_banner(f, app, main_chunks[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(main_chunks[1]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[0]);

    render_port_list(f, app, left_chunks[0]);
    render_firmware_list(f, app, left_chunks[1]);
    render_log(f, app, chunks[1]);
    render_help_bar(f, app, main_chunks[2]);

    if app.show_erase_confirmation {
        render_erase_confirmation(f, app);
    } else if app.show_help {
        render_help(f);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    if focused {
        Block::default()
            .title(format!("{} [FOCUSED]", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
    } else {
        Block::default().title(title).borders(Borders::ALL)
    }
}

fn render_status_banner(f: &mut Frame, app: &App, area: Rect) {
    let banner = &app.state.banner;
    let selection = &app.state.selection;

    let port = selection.port.as_deref().unwrap_or("none");
    let firmware = selection
        .firmware_id
        .map(|id| app.catalog.label(id))
        .unwrap_or_else(|| "none".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled(banner.kind.symbol(), Style::default().fg(banner.kind.color())),
            Span::raw(" "),
            Span::styled(
                banner.message.as_str(),
                Style::default()
                    .fg(banner.kind.color())
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Port: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(port),
            Span::raw("   "),
            Span::styled("Firmware: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(firmware),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("NCD Flasher").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_port_list(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.state.selection.port.as_deref();
    let items: Vec<ListItem> = app
        .ports
        .ports()
        .iter()
        .map(|port| {
            let marker = if Some(port.name.as_str()) == selected { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(port.display_label()),
            ]))
        })
        .collect();

    let items = if items.is_empty() {
        vec![ListItem::new(Span::styled(
            app.port_status.as_str(),
            Style::default().fg(Color::Gray),
        ))]
    } else {
        items
    };

    let title = if app.refreshing_ports {
        "🔌 Ports 🔄".to_string()
    } else {
        format!("🔌 Ports ({})", app.port_status)
    };

    let list = List::new(items)
        .block(pane_block(title, app.focused_pane == FocusedPane::PortList))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, area, &mut app.port_list_state.clone());
}

fn render_firmware_list(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.state.selection.firmware_id;
    let items: Vec<ListItem> = app
        .catalog
        .all()
        .iter()
        .map(|fw| {
            let marker = if Some(fw.id) == selected { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::styled(format!("{:>2} ", fw.id), Style::default().fg(Color::Gray)),
                Span::raw(fw.name),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(
            "📦 Firmware".to_string(),
            app.focused_pane == FocusedPane::FirmwareList,
        ))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, area, &mut app.firmware_list_state.clone());
}

fn render_log(f: &mut Frame, app: &App, area: Rect) {
    let total_lines = app.state.log.len();
    let available_height = area.height.saturating_sub(2) as usize;

    let scroll_offset = if total_lines > available_height {
        let max_scroll = total_lines.saturating_sub(available_height);
        if app.log_auto_scroll {
            max_scroll
        } else {
            app.log_scroll_offset.min(max_scroll)
        }
    } else {
        0
    };

    let log_lines: Vec<Line> = if total_lines > 0 {
        let end = (scroll_offset + available_height).min(total_lines);
        app.state
            .log
            .get(scroll_offset..end)
            .unwrap_or_default()
            .iter()
            .map(colorize_log_entry)
            .collect()
    } else {
        vec![Line::from("No output yet")]
    };

    let title = if total_lines > 0 {
        format!(
            "Output ({} lines) {}",
            total_lines,
            if app.log_auto_scroll { "🔄" } else { "📌" }
        )
    } else {
        "Output".to_string()
    };

    let paragraph = Paragraph::new(log_lines)
        .block(pane_block(title, app.focused_pane == FocusedPane::LogPane))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Colorize log entries based on content
fn colorize_log_entry(entry: &LogEntry) -> Line<'_> {
    let text = entry.text.as_str();
    let style = if text.starts_with("ERROR:") || text.starts_with("FAILED:") {
        Style::default().fg(Color::Red)
    } else if text.starts_with("SUCCESS:") || text.starts_with("[CHECK]") {
        Style::default().fg(Color::Green)
    } else if text.starts_with("[INFO]") || text.starts_with("Firmware:") || text.starts_with("MAC:") {
        Style::default().fg(Color::Cyan)
    } else if text.to_lowercase().contains("warn") {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(format!("[{}] ", entry.timestamp), Style::default().fg(Color::Gray)),
        Span::styled(text, style),
    ])
}

/// Create a centered rectangle
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

fn render_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut help_text = vec![
        Span::styled("[↑↓]Navigate ", Style::default().fg(Color::Cyan)),
        Span::styled("[Enter]Select ", Style::default().fg(Color::Cyan)),
        Span::styled("[Tab]Switch Pane ", Style::default().fg(Color::White)),
    ];

    if app.is_busy() {
        help_text.push(Span::styled(
            format!("⏳ {} in progress... ", app.state.operation.name()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        help_text.extend(vec![
            Span::styled("[P]rogram ", Style::default().fg(Color::Green)),
            Span::styled("[T]est ", Style::default().fg(Color::Green)),
            Span::styled("[R]eset ", Style::default().fg(Color::LightYellow)),
            Span::styled("[E]rase ", Style::default().fg(Color::Red)),
            Span::styled("[U]Refresh ", Style::default().fg(Color::Magenta)),
        ]);
    }

    help_text.extend(vec![
        Span::styled("[C]lear ", Style::default().fg(Color::White)),
        Span::styled("[H/?]Help ", Style::default().fg(Color::Blue)),
        Span::styled("[Q]Quit", Style::default().fg(Color::Red)),
    ]);

    let help_bar = Paragraph::new(Line::from(help_text))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(help_bar, area);
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from("NCD Flasher Help"),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("Tab           Switch between Ports, Firmware and Output"),
        Line::from("↑/↓ or j/k    Move highlight / scroll output"),
        Line::from("Enter         Select highlighted port or firmware"),
        Line::from("PgUp/PgDn     Scroll output by page"),
        Line::from("Home/End      Jump to top/bottom of output"),
        Line::from(""),
        Line::from("Operations (one at a time):"),
        Line::from("p             Program selected firmware"),
        Line::from("t             Run production test"),
        Line::from("r             Factory reset"),
        Line::from("e             Erase flash (asks for confirmation)"),
        Line::from(""),
        Line::from("Other:"),
        Line::from("c             Clear output"),
        Line::from("u             Refresh serial ports"),
        Line::from("h or ?        Toggle this help"),
        Line::from("q/Ctrl+C      Quit"),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default().bg(Color::Black));
    f.render_widget(help_paragraph, area);
}

fn render_erase_confirmation(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let port = app.state.selection.port.as_deref().unwrap_or("the selected port");
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Erase the entire flash?",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Device on {} will lose its firmware and settings.", port)),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y/Enter] ", Style::default().fg(Color::Red)),
            Span::raw("Erase   "),
            Span::styled("[N/Esc] ", Style::default().fg(Color::Green)),
            Span::raw("Cancel"),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Confirm Erase")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: true });
    f.render_widget(dialog, area);
}
