use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, mpsc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use player_stats_widget::columns::{Align, CellView, ColumnDef, ColumnId, cell_view};
use player_stats_widget::config::{WidgetConfig, env_parse};
use player_stats_widget::demo_host::{self, ChannelHost};
use player_stats_widget::model::{PlayerRecord, sample_payload};
use player_stats_widget::protocol::{OutboundMessage, PLAYER_CLICK};
use player_stats_widget::surface::{LayoutMode, MemorySurface};
use player_stats_widget::widget::{Phase, Widget};

/// Terminal cells are mapped to pixels so the browser breakpoint keeps its meaning.
const PX_PER_CELL: u32 = 8;
const MAX_INBOX: usize = 50;

struct App {
    widget: Widget<MemorySurface, ChannelHost>,
    selected: usize,
    should_quit: bool,
    help_overlay: bool,
    inbox: VecDeque<String>,
}

impl App {
    fn new(widget: Widget<MemorySurface, ChannelHost>) -> Self {
        Self {
            widget,
            selected: 0,
            should_quit: false,
            help_overlay: false,
            inbox: VecDeque::with_capacity(MAX_INBOX),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Enter | KeyCode::Char('c') => self.click_selected(),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn row_count(&self) -> usize {
        self.widget.surface().rows().len()
    }

    fn select_next(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    fn click_selected(&mut self) {
        let Some(row) = self.widget.surface().rows().get(self.selected).cloned() else {
            return;
        };
        if !self.widget.on_cell_click(ColumnId::Player, &row) {
            self.push_inbox(format!("[INFO] {} has no profile link", row.sort_name()));
        }
    }

    fn record_outbound(&mut self, msg: OutboundMessage) {
        let OutboundMessage::PlayerClick(click) = msg;
        self.push_inbox(format!(
            "[HOST] {PLAYER_CLICK} team={} player={} url={}",
            click.team_id, click.player_name, click.url
        ));
    }

    fn push_inbox(&mut self, msg: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.inbox.push_back(format!("{stamp} {}", msg.into()));
        while self.inbox.len() > MAX_INBOX {
            self.inbox.pop_front();
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing()?;

    let init = match std::env::var("WIDGET_INIT_FILE") {
        Ok(path) => Some(demo_host::load_init_file(&PathBuf::from(path))?),
        Err(_) if std::env::var("WIDGET_STANDALONE").is_ok_and(|v| v == "1") => None,
        Err(_) => Some(sample_payload()),
    };
    let update_every =
        Duration::from_secs(env_parse::<u64>("WIDGET_UPDATE_SECS").unwrap_or(5).max(1));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (click_tx, click_rx) = mpsc::channel();
    let (stop_tx, stop_rx) = mpsc::channel();
    // The host may post INIT before the first frame is drawn; the widget buffers it.
    demo_host::spawn_demo_host(tx, init, update_every, stop_rx);

    let width = u32::from(terminal.size()?.width) * PX_PER_CELL;
    let widget = Widget::new(
        WidgetConfig::from_env(),
        MemorySurface::new(),
        ChannelHost::new(click_tx),
        width,
    );
    let mut app = App::new(widget);
    let res = run_app(&mut terminal, &mut app, rx, click_rx);
    let _ = stop_tx.send(());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let Ok(path) = std::env::var("WIDGET_LOG_FILE") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Value>,
    click_rx: mpsc::Receiver<OutboundMessage>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut dom_ready = false;

    loop {
        while let Ok(data) = rx.try_recv() {
            app.widget.on_message(&data);
        }
        while let Ok(msg) = click_rx.try_recv() {
            app.record_outbound(msg);
        }
        app.widget.poll(Instant::now());
        app.clamp_selection();

        terminal.draw(|f| ui(f, app))?;

        // The first completed frame plays the part of DOMContentLoaded.
        if !dom_ready {
            dom_ready = true;
            app.widget.on_dom_ready(Instant::now());
        }

        let timeout = app
            .widget
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(tick_rate)
            .min(tick_rate);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Resize(cols, _) => {
                    app.widget
                        .on_viewport_resize(u32::from(cols) * PX_PER_CELL, Instant::now());
                    app.widget.on_container_resize();
                }
                _ => {}
            }
        }

        if app.should_quit {
            app.widget.dispose();
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_table(frame, chunks[1], app);

    let console = Paragraph::new(console_text(app))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "j/k/↑/↓ Move | Enter/c Open player | ? Help | q Quit".to_string(),
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let widget = &app.widget;
    let team = widget
        .active_team()
        .and_then(|id| widget.teams().iter().find(|t| t.id == id))
        .map(|t| t.name.as_str())
        .unwrap_or("-");
    let title = format!(
        "PLAYER STATS | {} | {} | {}px",
        team,
        layout_label(widget.layout()),
        widget.viewport_width()
    );
    let line1 = format!("  .-.  {title}");
    let line2 = format!(" /___\\ {}", phase_label(widget.phase()));
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_table(frame: &mut Frame, area: Rect, app: &App) {
    let surface = app.widget.surface();
    let Some(spec) = surface.spec() else {
        let waiting = Paragraph::new("Waiting for host data...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(waiting, area);
        return;
    };

    let (header_area, list_area, hint_area) = table_sections(area);

    let rows = surface.rows();
    let widths = column_constraints(&spec.columns, spec.layout, rows);
    render_table_header(frame, header_area, &spec.columns, &widths);

    if rows.is_empty() {
        let empty = Paragraph::new("No players for this team")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(app.selected, rows.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == app.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);
        for (col, def) in spec.columns.iter().enumerate() {
            let view = cell_view(def.id, &rows[idx]);
            let text = fit_text(&view.plain_text(), cols[col].width, def.align);
            render_cell_text(frame, cols[col], &text, cell_style(&view, row_style));
        }
    }

    // Full comment of the selected row stands in for the hover hint.
    if let Some(hint) = rows.get(app.selected).and_then(comment_hint) {
        render_cell_text(frame, hint_area, &hint, Style::default().fg(Color::DarkGray));
    }
}

// Header line, roster lines, and one line always kept free for the comment hint.
fn table_sections(area: Rect) -> (Rect, Rect, Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    (sections[0], sections[1], sections[2])
}

fn comment_hint(row: &PlayerRecord) -> Option<String> {
    row.comments
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| format!("» {c}"))
}

fn column_constraints(
    defs: &[ColumnDef],
    layout: LayoutMode,
    rows: &[PlayerRecord],
) -> Vec<Constraint> {
    defs.iter()
        .map(|def| {
            let fixed = def.width.map(|w| px_to_cells(u32::from(w)));
            let min = def.min_width.map(|w| px_to_cells(u32::from(w))).unwrap_or(0);
            match (layout, fixed) {
                (_, Some(cells)) => Constraint::Length(cells),
                (LayoutMode::FitColumns, None) if def.width_grow > 0 => {
                    Constraint::Fill(def.width_grow)
                }
                _ => Constraint::Length(natural_width(def, rows).max(min)),
            }
        })
        .collect()
}

fn natural_width(def: &ColumnDef, rows: &[PlayerRecord]) -> u16 {
    let widest = rows
        .iter()
        .map(|row| cell_view(def.id, row).plain_text().chars().count())
        .chain(std::iter::once(def.title.chars().count()))
        .max()
        .unwrap_or(0);
    u16::try_from(widest + 1).unwrap_or(u16::MAX)
}

fn px_to_cells(px: u32) -> u16 {
    u16::try_from(px.div_ceil(PX_PER_CELL)).unwrap_or(u16::MAX)
}

fn render_table_header(frame: &mut Frame, area: Rect, defs: &[ColumnDef], widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (col, def) in defs.iter().enumerate() {
        let title = fit_text(def.title, cols[col].width, def.align);
        render_cell_text(frame, cols[col], &title, style);
    }
}

fn cell_style(view: &CellView, base: Style) -> Style {
    match view {
        CellView::Player(_) if view.is_interactive() => base
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED),
        CellView::Stat {
            highlight: Some(color),
            ..
        } => hex_color(color).map_or(base, |c| base.fg(c)),
        CellView::Comment { .. } => base.fg(Color::Gray),
        _ => base,
    }
}

fn hex_color(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn fit_text(text: &str, width: u16, align: Align) -> String {
    let width = width.saturating_sub(1) as usize;
    let len = text.chars().count();
    if len > width {
        if width == 0 {
            return String::new();
        }
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        return out;
    }
    match align {
        Align::Left => text.to_string(),
        Align::Center => format!("{}{text}", " ".repeat((width - len) / 2)),
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(app: &App) -> String {
    let mut lines: Vec<String> = app
        .widget
        .diagnostics()
        .entries()
        .rev()
        .take(3)
        .map(str::to_string)
        .collect();
    lines.reverse();
    let inbox: Vec<String> = app.inbox.iter().rev().take(3).cloned().collect();
    lines.extend(inbox.into_iter().rev());
    if lines.is_empty() {
        return "No events yet".to_string();
    }
    lines.join("\n")
}

fn layout_label(layout: LayoutMode) -> &'static str {
    match layout {
        LayoutMode::FitColumns => "FIT COLUMNS",
        LayoutMode::FitData => "FIT DATA",
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Uninitialized => "waiting",
        Phase::Built => "live",
        Phase::Disposed => "closed",
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Player Stats Widget - Help",
        "",
        "  j/k or ↑/↓   Move selection",
        "  Enter / c    Click player (reports to host)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Environment:",
        "  WIDGET_INIT_FILE     INIT payload JSON",
        "  WIDGET_STANDALONE=1  No host; sample data after grace period",
        "  WIDGET_UPDATE_SECS   Demo host update interval",
        "  WIDGET_LOG_FILE      Write tracing output here",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
