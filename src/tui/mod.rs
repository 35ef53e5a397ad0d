//! Ratatui-based terminal UI.
//!
//! Shows the samples with the fitted curve of the selected model, plus the
//! R² ranking of every model in a side panel.
//!
//! Keys: `m` cycles the model (all -> linear -> ... -> power -> all),
//! `r` resamples the synthetic data set, `q` quits.

use std::io;
use std::time::Duration;

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

use crate::app::pipeline::{run_fit, RunOutput};
use crate::cli::TuiArgs;
use crate::data::{generate_samples, GeneratorConfig};
use crate::domain::{FitConfig, ModelKind, ModelSpec, SampleSet};
use crate::error::AppError;
use crate::report::fmt_r2;

mod plotters_chart;

use plotters_chart::CurvePlottersChart;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Resolve input before touching the terminal so errors print normally.
    let source = if args.input.is_empty() {
        Source::Demo(GeneratorConfig::demo(args.seed))
    } else {
        Source::Input(crate::app::load_input(&args.input)?)
    };
    let mut app = App::new(source, args.model)?;

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

/// Where the displayed samples come from.
enum Source {
    /// User samples (CSV or inline); fixed for the session.
    Input(SampleSet),
    /// Seeded synthetic data; `r` bumps the seed.
    Demo(GeneratorConfig),
}

struct App {
    config: FitConfig,
    source: Source,
    samples: SampleSet,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(source: Source, model_spec: ModelSpec) -> Result<Self, AppError> {
        let samples = match &source {
            Source::Input(samples) => samples.clone(),
            Source::Demo(generator) => generate_samples(generator)?,
        };
        let config = FitConfig {
            model_spec,
            num_points: 200,
            plot: false,
            ..FitConfig::default()
        };

        let mut app = Self {
            config,
            source,
            samples,
            status: String::new(),
            run: None,
        };
        app.refit();
        Ok(app)
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('m') => {
                self.config.model_spec = next_model_spec(self.config.model_spec);
                self.refit();
            }
            KeyCode::Char('r') => self.resample()?,
            _ => {}
        }
        Ok(false)
    }

    fn resample(&mut self) -> Result<(), AppError> {
        match &mut self.source {
            Source::Demo(generator) => {
                generator.seed = generator.seed.wrapping_add(1);
                self.samples = generate_samples(generator)?;
                self.refit();
            }
            Source::Input(_) => {
                self.status = "Resampling needs the synthetic data set (start without --file/--x).".to_string();
            }
        }
        Ok(())
    }

    /// Re-run the pipeline. A model that cannot fit the data is reported in
    /// the status line rather than ending the session.
    fn refit(&mut self) {
        match run_fit(self.samples.clone(), &self.config) {
            Ok(run) => {
                self.status = match &run.chosen {
                    Some(fit) => format!("model: {} | {}", self.config.model_spec.id(), fit.formula()),
                    None => "No model could be fitted to these samples.".to_string(),
                };
                self.run = Some(run);
            }
            Err(err) => {
                self.status = err.to_string();
                self.run = None;
            }
        }
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
        let mut lines: Vec<Line> = Vec::new();
        let source = match &self.source {
            Source::Input(_) => "input samples".to_string(),
            Source::Demo(g) => format!("synthetic {} (seed {})", g.kind.id(), g.seed),
        };
        lines.push(Line::from(vec![
            Span::styled("curvefit", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {source}")),
        ]));

        let chosen = self.run.as_ref().and_then(|r| r.chosen.as_ref());
        let (model_name, r2) = chosen
            .map(|fit| (fit.kind.display_name(), fmt_r2(fit.r2)))
            .unwrap_or(("-", "-".to_string()));

        lines.push(Line::from(Span::styled(
            format!(
                "model: {} -> {model_name} | r2={r2} | n={}",
                self.config.model_spec.display_name(),
                self.samples.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_ranking(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Fit").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit to display.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (curve, points, x_bounds, y_bounds) = chart_series(run);

        // Plotters draws its own axes, ticks and labels inside `inner`.
        let widget = CurvePlottersChart {
            curve: &curve,
            points: &points,
            x_bounds,
            y_bounds,
            x_label: "x",
            y_label: "y",
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, inner);
    }

    fn draw_ranking(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        let chosen_kind = self
            .run
            .as_ref()
            .and_then(|r| r.chosen.as_ref())
            .map(|f| f.kind);

        if let Some(run) = &self.run {
            for (i, fit) in run.comparison.fits.iter().enumerate() {
                let style = if Some(fit.kind) == chosen_kind {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                items.push(
                    ListItem::new(format!(
                        "{}. {:<12} {:>8}",
                        i + 1,
                        fit.kind.display_name(),
                        fmt_r2(fit.r2)
                    ))
                    .style(style),
                );
            }
            for (kind, _) in &run.comparison.skipped {
                items.push(
                    ListItem::new(format!("-  {:<12} {:>8}", kind.display_name(), "skip"))
                        .style(Style::default().fg(Color::DarkGray)),
                );
            }
        }

        let list = List::new(items).block(Block::default().title("Ranking (R²)").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "m model  r resample  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn next_model_spec(cur: ModelSpec) -> ModelSpec {
    match cur.kind() {
        None => ModelSpec::from(ModelKind::ALL[0]),
        Some(ModelKind::Power) => ModelSpec::All,
        Some(kind) => ModelSpec::from(kind.next()),
    }
}

/// Build chart series for Plotters: chosen curve, observed points, bounds.
fn chart_series(run: &RunOutput) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let points: Vec<(f64, f64)> = run.samples.iter().collect();

    let curve: Vec<(f64, f64)> = run
        .chosen
        .as_ref()
        .and_then(|fit| run.curves.curves().iter().find(|c| c.kind == fit.kind))
        .map(|c| c.points().into_iter().filter(|(_, y)| y.is_finite()).collect())
        .unwrap_or_default();

    let bounds = |values: &mut dyn Iterator<Item = f64>| -> [f64; 2] {
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !lo.is_finite() || !hi.is_finite() {
            return [0.0, 1.0];
        }
        let pad = ((hi - lo).abs() * 0.05).max(1e-6);
        [lo - pad, hi + pad]
    };

    let x_bounds = bounds(&mut points.iter().chain(&curve).map(|&(x, _)| x));
    let y_bounds = bounds(&mut points.iter().chain(&curve).map(|&(_, y)| y));

    (curve, points, x_bounds, y_bounds)
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.2}")
}
