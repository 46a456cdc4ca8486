//! Ratatui-based terminal dashboard.
//!
//! One map per selected date: a date slider (←/→), a play/animate control that
//! steps through the full date range at a fixed per-frame delay, a metric
//! toggle (total vs proportion), raw/filtered table toggles, and a per-state
//! detail panel showing the record's hover text.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::RunOutput;
use crate::domain::{EnrichedRecord, Metric, SnapshotConfig};
use crate::error::AppError;
use crate::pipeline::{fmt_proportion, national_trend, slice_by_date};

mod plotters_chart;
mod usmap;

use plotters_chart::TrendChart;
use usmap::UsTileMap;

/// Load the dataset, then start the TUI.
pub fn run(config: &SnapshotConfig) -> Result<(), AppError> {
    // Load before touching the terminal so source errors print cleanly.
    let run = crate::app::pipeline::run_load(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(run, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// What the side panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SidePanel {
    /// State list + hover text of the selected state.
    Detail,
    /// The full raw (enriched) table.
    Raw,
    /// The current date's slice only.
    Filtered,
}

struct App {
    run: RunOutput,
    metric: Metric,
    frame_delay: Duration,
    /// Index into `run.dates`; the slider position.
    date_idx: usize,
    playing: bool,
    side: SidePanel,
    /// Index into the current date's slice; the detail selection.
    selected: usize,
    status: String,
    /// National total per date as (day offset, total), for the trend chart.
    trend: Vec<(f64, f64)>,
}

impl App {
    fn new(run: RunOutput, config: &SnapshotConfig) -> Self {
        let date_idx = config
            .target_date
            .and_then(|d| run.dates.iter().position(|&x| x == d))
            .unwrap_or(run.dates.len().saturating_sub(1));

        let first = run.stats.first_date;
        let trend = national_trend(&run.records)
            .into_iter()
            .map(|(d, total)| ((d - first).num_days() as f64, total as f64))
            .collect();

        Self {
            run,
            metric: config.metric,
            frame_delay: Duration::from_millis(config.frame_delay_ms.max(1)),
            date_idx,
            playing: false,
            side: SidePanel::Detail,
            selected: 0,
            status: "←/→ slide dates, space to animate.".to_string(),
            trend,
        }
    }

    fn current_date(&self) -> NaiveDate {
        self.run.dates[self.date_idx]
    }

    fn current_slice(&self) -> Vec<&EnrichedRecord> {
        slice_by_date(&self.run.records, self.current_date())
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let timeout = if self.playing {
                self.frame_delay
            } else {
                Duration::from_millis(100)
            };

            if !event::poll(timeout)
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                if self.playing {
                    self.play_tick();
                    needs_redraw = true;
                }
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.step_date(-1),
            KeyCode::Right => self.step_date(1),
            KeyCode::Home => {
                self.playing = false;
                self.date_idx = 0;
            }
            KeyCode::End => {
                self.playing = false;
                self.date_idx = self.run.dates.len() - 1;
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_play(),
            KeyCode::Char('m') => {
                self.metric = self.metric.toggle();
                self.status = format!("metric: {}", self.metric.display_name());
            }
            KeyCode::Char('r') => {
                self.side = if self.side == SidePanel::Raw {
                    SidePanel::Detail
                } else {
                    SidePanel::Raw
                };
            }
            KeyCode::Char('f') => {
                self.side = if self.side == SidePanel::Filtered {
                    SidePanel::Detail
                } else {
                    SidePanel::Filtered
                };
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.current_slice().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            _ => {}
        }
        false
    }

    fn step_date(&mut self, delta: i64) {
        self.playing = false;
        let last = self.run.dates.len() as i64 - 1;
        let next = (self.date_idx as i64 + delta).clamp(0, last);
        self.date_idx = next as usize;
        self.clamp_selected();
    }

    /// Start/stop the animation. Starting from the final date restarts the
    /// loop from the beginning, like pressing the animate button again.
    fn toggle_play(&mut self) {
        if self.playing {
            self.playing = false;
            self.status = format!("Paused at {}.", self.current_date());
            return;
        }
        if self.date_idx + 1 >= self.run.dates.len() {
            self.date_idx = 0;
        }
        self.playing = true;
        self.status = "Animating... (space to pause)".to_string();
    }

    /// One animation frame: advance a day; once the final date has been
    /// drawn, stop there (the final date stays on screen and is rendered once
    /// more after the loop completes).
    fn play_tick(&mut self) {
        if self.date_idx + 1 < self.run.dates.len() {
            self.date_idx += 1;
            self.clamp_selected();
        } else {
            self.playing = false;
            self.status = format!("Animation finished at {}.", self.current_date());
        }
    }

    fn clamp_selected(&mut self) {
        let len = self.current_slice().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(9),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_trend(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("covsnap", Style::default().fg(Color::Cyan)),
            Span::raw(" — US COVID Metric Snapshots"),
        ]));

        let play = if self.playing { "▶" } else { "❚❚" };
        lines.push(Line::from(Span::styled(
            format!(
                "date: {} ({}/{}) {play} | metric: {} | records: {} | states: {}",
                self.current_date(),
                self.date_idx + 1,
                self.run.dates.len(),
                self.metric.display_name(),
                self.run.stats.n_records,
                self.run.stats.n_states,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        self.draw_map(frame, chunks[0]);
        match self.side {
            SidePanel::Detail => self.draw_detail(frame, chunks[1]),
            SidePanel::Raw => self.draw_table(frame, chunks[1], false),
            SidePanel::Filtered => self.draw_table(frame, chunks[1], true),
        }
    }

    fn draw_map(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("USA COVID-19 Snapshot for {}", self.current_date());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let slice = self.current_slice();
        let selected = slice.get(self.selected).and_then(|r| r.code);
        frame.render_widget(
            UsTileMap {
                slice: &slice,
                metric: self.metric,
                selected,
            },
            inner,
        );
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        let slice = self.current_slice();
        let items: Vec<ListItem> = slice
            .iter()
            .map(|r| {
                let value = match self.metric {
                    Metric::Total => r.total.to_string(),
                    Metric::Proportion => r
                        .proportion
                        .map(|p| format!("{} %", fmt_proportion(p)))
                        .unwrap_or_else(|| "-".to_string()),
                };
                ListItem::new(format!("{:<3} {:<20} {value}", r.code.unwrap_or("-"), r.state))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("States").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        if !slice.is_empty() {
            state.select(Some(self.selected.min(slice.len() - 1)));
        }
        frame.render_stateful_widget(list, chunks[0], &mut state);

        // Hover text, verbatim: the proportion line is simply absent when no
        // population resolved.
        let hover = slice
            .get(self.selected)
            .map(|r| r.hover_text.clone())
            .unwrap_or_else(|| "No records for this date.".to_string());
        let p = Paragraph::new(hover)
            .block(Block::default().title("Hover").borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, filtered: bool) {
        let (title, rows): (String, Vec<&EnrichedRecord>) = if filtered {
            (
                format!("Filtered data ({})", self.current_date()),
                self.current_slice(),
            )
        } else {
            ("Raw data".to_string(), self.run.records.iter().collect())
        };

        let capacity = area.height.saturating_sub(3) as usize;
        let mut lines: Vec<Line> = Vec::with_capacity(capacity + 1);
        for r in rows.iter().take(capacity) {
            lines.push(Line::from(format!(
                "{} {:<3} {:<16} {:>8} {:>6}",
                r.date,
                r.code.unwrap_or("-"),
                truncate(&r.state, 16),
                r.cases,
                r.deaths,
            )));
        }
        if rows.len() > capacity {
            lines.push(Line::from(Span::styled(
                format!("... {} of {} rows", capacity, rows.len()),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("National total").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let x1 = (self.run.dates.len().saturating_sub(1)) as f64;
        let y_max = self
            .trend
            .iter()
            .map(|&(_, y)| y)
            .fold(0.0_f64, f64::max)
            .max(1.0);

        frame.render_widget(
            TrendChart {
                line: &self.trend,
                marker_x: (self.current_date() - self.run.stats.first_date).num_days() as f64,
                x_bounds: [0.0, x1.max(1.0)],
                y_bounds: [0.0, y_max * 1.05],
                first_date: self.run.stats.first_date,
            },
            inner,
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ date  Home/End bounds  space play  m metric  r raw  f filtered  ↑/↓ state  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
