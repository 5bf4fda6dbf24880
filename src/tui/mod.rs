//! Ratatui-based round stepper.
//!
//! Shows the current point cloud and lets the user run RANSAC one round at a
//! time (or a full fit), toggle the model family, reseed the data and tune
//! the inlier threshold.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{LoadedPoints, load_points};
use crate::domain::config::validate_max_distance;
use crate::domain::{DemoConfig, FitResult, PointSource, RoundModel};
use crate::error::AppError;
use crate::fit::{Decision, PointSet, decide, fit_with_observer, normalize, run_kind_round};
use crate::plot::ChartData;

mod plotters_chart;

use plotters_chart::RoundChart;

/// Round budget for `f` when the configuration is unbounded: the UI thread
/// has to come back.
const TUI_MAX_ITERATIONS: usize = 100_000;

/// Step applied by `+` / `-` to the inlier threshold.
const DISTANCE_STEP: f64 = 0.25;

/// Start the TUI.
pub fn run(config: DemoConfig) -> Result<(), AppError> {
    // Load before touching the terminal so input errors print normally.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

/// What the chart currently shows.
#[derive(Debug, Clone, PartialEq)]
enum View {
    /// Raw points, nothing fitted yet.
    Points,
    Round {
        index: usize,
        inliers: usize,
        outliers: usize,
        degenerate: bool,
        decision: Decision,
    },
    Fit {
        result: FitResult,
        degenerate_rounds: usize,
    },
}

struct App {
    config: DemoConfig,
    data: LoadedPoints,
    /// Normalized points, reused by every single round.
    set: PointSet,
    rng: StdRng,
    rounds: usize,
    view: View,
    chart: ChartData,
    status: String,
}

impl App {
    fn new(config: DemoConfig) -> Result<Self, AppError> {
        config.fit.validate()?;
        let data = load_points(&config.source, config.model)?;
        let set = normalize(&data.points);
        let rng = StdRng::seed_from_u64(config.fit_seed);
        let chart = ChartData::scatter(&data.points, "points");

        Ok(Self {
            config,
            data,
            set,
            rng,
            rounds: 0,
            view: View::Points,
            chart,
            status: "Press n for a round, f for a full fit.".to_string(),
        })
    }

    fn min_inliers(&self) -> f64 {
        self.config.fit.min_inliers(self.set.len())
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
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

    /// Apply one key press. Returns `true` to quit.
    ///
    /// Failures end up in the status line; only terminal I/O aborts the UI.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let outcome = match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') => self.next_round(),
            KeyCode::Char('f') => self.full_fit(),
            KeyCode::Char('m') => self.toggle_model(),
            KeyCode::Char('r') => self.reseed(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.adjust_distance(DISTANCE_STEP);
                Ok(())
            }
            KeyCode::Char('-') => {
                self.adjust_distance(-DISTANCE_STEP);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = outcome {
            self.status = format!("Error: {err}");
        }
        false
    }

    fn next_round(&mut self) -> Result<(), AppError> {
        validate_max_distance(self.config.fit.max_distance)?;
        self.set.ensure_at_least(self.config.model.sample_size())?;
        let outcome = run_kind_round(self.config.model, &self.set, self.config.fit.max_distance, &mut self.rng);
        self.rounds += 1;
        let decision = decide(&outcome, self.min_inliers());

        self.chart = ChartData::from_round(&outcome, format!("round {}", self.rounds));
        self.status = match &outcome.model {
            RoundModel::Fitted(model) => format!("Round {}: {}", self.rounds, model.equation()),
            RoundModel::Degenerate => format!("Round {}: degenerate sample", self.rounds),
        };
        self.view = View::Round {
            index: self.rounds,
            inliers: outcome.inlier_count(),
            outliers: outcome.outliers.len(),
            degenerate: outcome.model.is_degenerate(),
            decision,
        };
        Ok(())
    }

    fn full_fit(&mut self) -> Result<(), AppError> {
        let mut fit = self.config.fit;
        if fit.max_iterations.is_none() {
            fit = fit.with_max_iterations(TUI_MAX_ITERATIONS);
        }

        let mut degenerate_rounds = 0;
        let result = fit_with_observer(&self.data.points, self.config.model, &fit, &mut self.rng, |o| {
            if o.model.is_degenerate() {
                degenerate_rounds += 1;
            }
        })?;
        self.rounds += result.attempts();

        self.chart = ChartData::from_fit(&result, &self.data.points, "full fit");
        self.status = match result.model() {
            Some(model) => format!("Accepted after {} rounds: {}", result.attempts(), model.equation()),
            None => format!("No acceptable model after {} rounds.", result.attempts()),
        };
        self.view = View::Fit {
            result,
            degenerate_rounds,
        };
        Ok(())
    }

    fn toggle_model(&mut self) -> Result<(), AppError> {
        let model = self.config.model.toggle();
        self.config.model = model;
        self.config.fit.max_distance = model.default_max_distance();
        self.reload()?;
        self.status = format!("model: {}", model.display_name());
        Ok(())
    }

    fn reseed(&mut self) -> Result<(), AppError> {
        if let PointSource::Synthetic { seed, .. } = &mut self.config.source {
            *seed = seed.wrapping_add(1);
        }
        self.config.fit_seed = self.config.fit_seed.wrapping_add(1);
        self.reload()?;
        self.status = match &self.config.source {
            PointSource::Synthetic { seed, .. } => format!("Resampled points (seed {seed})."),
            PointSource::Csv(_) => format!("Reseeded sampler ({}).", self.config.fit_seed),
        };
        Ok(())
    }

    fn adjust_distance(&mut self, delta: f64) {
        let next = (self.config.fit.max_distance + delta).max(0.0);
        self.config.fit.max_distance = next;
        self.status = format!("max distance: {next:.2}");
    }

    /// Reload points for the current source/model and reset the round counter.
    fn reload(&mut self) -> Result<(), AppError> {
        let data = load_points(&self.config.source, self.config.model)?;
        self.set = normalize(&data.points);
        self.chart = ChartData::scatter(&data.points, "points");
        self.data = data;
        self.rng = StdRng::seed_from_u64(self.config.fit_seed);
        self.rounds = 0;
        self.view = View::Points;
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let budget = self
            .config
            .fit
            .max_iterations
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("rfit", Style::default().fg(Color::Cyan)),
                Span::raw(" - RANSAC round stepper | "),
                Span::raw(self.config.source_label()),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} | n={} | max distance: {:.2} | ratio: {} | need >= {:.1} inliers | budget: {budget}",
                    self.config.model.display_name(),
                    self.set.len(),
                    self.config.fit.max_distance,
                    self.config.fit.ratio,
                    self.min_inliers(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_stats(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!(" {} ", self.chart.title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (chart_rect, insets) = chart_layout(inner);
        frame.render_widget(RoundChart { chart: &self.chart }, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, self.chart.x_bounds, self.chart.y_bounds);
        }
    }

    fn draw_stats(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = stats_lines(&self.view, self.rounds)
            .into_iter()
            .map(ListItem::new)
            .collect();

        let legend = [
            ("sample", Color::Red),
            ("inliers", Color::Green),
            ("outliers", Color::Blue),
            ("model", Color::Yellow),
        ];
        items.push(ListItem::new(""));
        for (label, color) in legend {
            items.push(ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(label),
            ])));
        }

        let list = List::new(items).block(Block::default().title("Round").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "n next round  f full fit  m model  r reseed  +/- distance  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                self.status.as_str(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Side-panel text for the current view.
fn stats_lines(view: &View, rounds: usize) -> Vec<String> {
    let mut out = vec![format!("rounds run: {rounds}")];
    match view {
        View::Points => out.push("no round yet".to_string()),
        View::Round {
            index,
            inliers,
            outliers,
            degenerate,
            decision,
        } => {
            out.push(format!("round: {index}"));
            if *degenerate {
                out.push("degenerate sample".to_string());
            } else {
                out.push(format!("inliers: {inliers}"));
                out.push(format!("outliers: {outliers}"));
            }
            out.push(format!("decision: {decision:?}"));
        }
        View::Fit {
            result,
            degenerate_rounds,
        } => {
            match result {
                FitResult::Accepted {
                    inliers, outliers, ..
                } => {
                    out.push("fit: accepted".to_string());
                    out.push(format!("inliers: {}", inliers.len()));
                    out.push(format!("outliers: {}", outliers.len()));
                }
                FitResult::NotFound { .. } => out.push("fit: not found".to_string()),
            }
            out.push(format!("attempts: {}", result.attempts()));
            out.push(format!("degenerate: {degenerate_rounds}"));
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.1}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("x")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("y").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
