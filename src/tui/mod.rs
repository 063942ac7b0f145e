//! TUI module - log and history views with ratatui

mod views;

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};

use crate::analytics::{
    ChartPoint, SessionSnapshot, WeekGroup, group_by_week, last_session, personal_best,
    progress_series,
};
use crate::db::{Category, Exercise, Store};
use crate::rest_timer::{DEFAULT_REST_SECS, RestTimer, TimerEvent, suggested_rest};
use crate::set_form::{Field, SetForm, new_personal_best};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Log,
    History,
}

/// Where the user goes once unsaved rows are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leave {
    History,
    Quit,
}

/// Modal shown over the current view
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Dismissed by any key
    Alert(String),
    /// Unsaved rows when leaving the log view
    ConfirmLeave(Leave),
}

/// App state for TUI
pub struct App {
    store: Box<dyn Store>,
    view: View,
    overlay: Option<Overlay>,
    should_quit: bool,

    // Log view
    exercises: Vec<Exercise>,
    category: Category,
    selected: usize,
    form: SetForm,
    row: usize,
    field: Field,
    personal_best: f64,
    last_session: Option<SessionSnapshot>,
    show_chart: bool,
    chart: Option<Vec<ChartPoint>>,
    suggested_rest: u32,
    timer: RestTimer,
    ring_bell: bool,
    log_error: Option<String>,

    // History view
    weeks: Vec<WeekGroup>,
    history_error: Option<String>,
    history_scroll: u16,
}

impl App {
    pub fn new(store: Box<dyn Store>) -> Self {
        let mut app = Self {
            store,
            view: View::Log,
            overlay: None,
            should_quit: false,
            exercises: Vec::new(),
            category: Category::Push,
            selected: 0,
            form: SetForm::new(),
            row: 0,
            field: Field::Weight,
            personal_best: 0.0,
            last_session: None,
            show_chart: false,
            chart: None,
            suggested_rest: DEFAULT_REST_SECS,
            timer: RestTimer::new(),
            ring_bell: false,
            log_error: None,
            weeks: Vec::new(),
            history_error: None,
            history_scroll: 0,
        };
        app.load_exercises();
        app
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut last_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            if self.ring_bell {
                stdout().execute(Print('\x07'))?;
                self.ring_bell = false;
            }

            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }

            if last_tick.elapsed() >= TICK {
                last_tick += TICK;
                self.on_tick();
            }
        }
        Ok(())
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Exercises of the active category tab
    fn filtered(&self) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.category == self.category)
            .collect()
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.filtered().get(self.selected).copied()
    }

    /// Advance the rest timer by one second
    pub fn on_tick(&mut self) {
        if self.timer.tick() == TimerEvent::Expired {
            self.ring_bell = true;
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if let Some(overlay) = self.overlay.take() {
            if let Overlay::ConfirmLeave(to) = overlay
                && matches!(code, KeyCode::Char('y') | KeyCode::Enter)
            {
                self.form.clear();
                self.row = 0;
                self.field = Field::Weight;
                self.leave(to);
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.guard_leave(Leave::Quit),
            KeyCode::Char('t') => self.timer.toggle(self.suggested_rest),
            _ => match self.view {
                View::Log => self.handle_log_key(code),
                View::History => self.handle_history_key(code),
            },
        }
    }

    fn handle_log_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('h') => self.guard_leave(Leave::History),
            KeyCode::Tab => self.cycle_category(1),
            KeyCode::BackTab => self.cycle_category(Category::all().len() - 1),
            KeyCode::Char('>') => self.cycle_exercise(true),
            KeyCode::Char('<') => self.cycle_exercise(false),
            KeyCode::Char('c') => {
                self.show_chart = !self.show_chart;
                if self.show_chart {
                    self.load_chart();
                }
            }
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.form.add_row();
                self.row = self.form.rows().len() - 1;
                self.field = Field::Weight;
            }
            KeyCode::Char('x') | KeyCode::Char('-') => {
                self.form.remove_row(self.row);
                self.row = self.row.min(self.form.rows().len() - 1);
            }
            KeyCode::Char('f') => self.finish_exercise(),
            KeyCode::Char('w') => self.guard_leave(Leave::History),
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row = (self.row + 1).min(self.form.rows().len() - 1),
            KeyCode::Left => self.field = Field::Weight,
            KeyCode::Right => self.field = Field::Reps,
            KeyCode::Enter => match self.field {
                Field::Weight => self.field = Field::Reps,
                Field::Reps => {
                    if self.row + 1 == self.form.rows().len() {
                        self.form.add_row();
                    }
                    self.row += 1;
                    self.field = Field::Weight;
                }
            },
            KeyCode::Backspace => {
                let mut value = self.form.value(self.row, self.field).to_string();
                value.pop();
                self.form.update(self.row, self.field, value);
            }
            KeyCode::Char(c) if c.is_ascii_digit() || (c == '.' && self.field == Field::Weight) => {
                let mut value = self.form.value(self.row, self.field).to_string();
                value.push(c);
                self.form.update(self.row, self.field, value);
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('l') => self.view = View::Log,
            KeyCode::Char('r') | KeyCode::Char('h') => self.open_history(),
            KeyCode::Up => self.history_scroll = self.history_scroll.saturating_sub(1),
            KeyCode::Down => self.history_scroll = self.history_scroll.saturating_add(1),
            _ => {}
        }
    }

    fn cycle_category(&mut self, step: usize) {
        let all = Category::all();
        let idx = all.iter().position(|c| *c == self.category).unwrap_or(0);
        self.category = all[(idx + step) % all.len()];
        self.selected = 0;
        self.select_exercise();
    }

    fn cycle_exercise(&mut self, forward: bool) {
        let count = self.filtered().len();
        if count == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
        self.show_chart = false;
        self.select_exercise();
    }

    fn load_exercises(&mut self) {
        match self.store.list_exercises() {
            Ok(exercises) => {
                self.exercises = exercises;
                self.log_error = None;
            }
            Err(e) => {
                error!("failed to fetch exercises: {}", e);
                self.log_error = Some(e.to_string());
            }
        }
        self.selected = 0;
        self.select_exercise();
    }

    /// Recompute everything derived from the selected exercise
    fn select_exercise(&mut self) {
        self.last_session = None;
        self.personal_best = 0.0;
        self.chart = None;

        let Some((exercise_id, rest)) = self
            .current_exercise()
            .map(|e| (e.id, suggested_rest(e.target_muscle.as_deref())))
        else {
            self.suggested_rest = DEFAULT_REST_SECS;
            return;
        };
        self.suggested_rest = rest;

        match self.store.logs_by_weight(exercise_id) {
            Ok(logs) => {
                self.personal_best = personal_best(&logs);
                self.last_session = last_session(&logs, &Local);
                self.log_error = None;
            }
            Err(e) => {
                error!(exercise_id, "failed to fetch logs: {}", e);
                self.log_error = Some(e.to_string());
            }
        }

        if self.show_chart {
            self.load_chart();
        }
    }

    fn load_chart(&mut self) {
        let Some(exercise_id) = self.current_exercise().map(|e| e.id) else {
            return;
        };
        match self.store.logs_chronological(exercise_id) {
            Ok(logs) => {
                self.chart = progress_series(&logs, &Local);
                self.log_error = None;
            }
            Err(e) => {
                error!(exercise_id, "failed to fetch chart data: {}", e);
                self.log_error = Some(e.to_string());
            }
        }
    }

    fn finish_exercise(&mut self) {
        let Some(exercise_id) = self.current_exercise().map(|e| e.id) else {
            self.overlay = Some(Overlay::Alert("Select an exercise first".into()));
            return;
        };

        let sets = match self.form.valid_sets(exercise_id) {
            Ok(sets) => sets,
            Err(e) => {
                self.overlay = Some(Overlay::Alert(e.to_string()));
                return;
            }
        };

        if let Err(e) = self.store.insert_logs(&sets) {
            error!(exercise_id, "failed to save sets: {}", e);
            self.overlay = Some(Overlay::Alert(format!("Error: {}", e)));
            return;
        }
        info!(exercise_id, count = sets.len(), "saved sets");

        let record = new_personal_best(&sets, self.personal_best);
        self.form.clear();
        self.row = 0;
        self.field = Field::Weight;
        self.select_exercise();

        if let Some(weight) = record {
            self.overlay = Some(Overlay::Alert(format!("NEW PR! You lifted {}kg!", weight)));
        }
    }

    /// Leave, asking first when rows are still typed in
    fn guard_leave(&mut self, to: Leave) {
        if self.form.has_unsaved() {
            self.overlay = Some(Overlay::ConfirmLeave(to));
            return;
        }
        self.leave(to);
    }

    fn leave(&mut self, to: Leave) {
        match to {
            Leave::History => self.open_history(),
            Leave::Quit => self.should_quit = true,
        }
    }

    /// Switch to history and regroup from a fresh fetch
    fn open_history(&mut self) {
        self.view = View::History;
        match self.store.history() {
            Ok(logs) => {
                self.weeks = group_by_week(&logs, &Local);
                self.history_error = None;
                self.history_scroll = 0;
            }
            Err(e) => {
                // Keep whatever was shown before
                error!("failed to fetch history: {}", e);
                self.history_error = Some(e.to_string());
            }
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
