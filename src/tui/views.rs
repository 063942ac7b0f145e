//! Rendering of the log and history views

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap},
};

use super::{App, Leave, Overlay, View};
use crate::analytics::SplitTag;
use crate::db::Category;
use crate::rest_timer::format_time;
use crate::set_form::Field;

fn split_color(tag: SplitTag) -> Color {
    match tag {
        SplitTag::Push => Color::Red,
        SplitTag::Pull => Color::Yellow,
        SplitTag::Legs => Color::Green,
        SplitTag::Workout => Color::Gray,
    }
}

impl App {
    pub(super) fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        match self.view {
            View::Log => self.render_log(frame, chunks[1]),
            View::History => self.render_history(frame, chunks[1]),
        }
        self.render_nav(frame, chunks[2]);

        if let Some(overlay) = &self.overlay {
            render_overlay(frame, overlay);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = match self.view {
            View::Log => "GymLog",
            View::History => "History",
        };
        let timer = if self.timer.is_active() {
            Span::styled(
                format!("⏱ {}", format_time(self.timer.remaining())),
                Style::default().fg(Color::LightRed).bold(),
            )
        } else {
            Span::styled(
                format!("Rest ({}m)  t: start", self.suggested_rest / 60),
                Style::default().fg(Color::DarkGray),
            )
        };

        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(Color::Cyan).bold()),
            Span::raw("   "),
            timer,
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_nav(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &'static str, view: View| {
            if self.view == view {
                Span::styled(label, Style::default().fg(Color::Blue).bold())
            } else {
                Span::styled(label, Style::default().fg(Color::DarkGray))
            }
        };
        let keys = match self.view {
            View::Log => "  | f: finish exercise  w: finish workout  c: chart  q: quit",
            View::History => "  | ↑↓: scroll  r: refresh  q: quit",
        };
        let nav = Paragraph::new(Line::from(vec![
            tab("[l] Log", View::Log),
            Span::raw("   "),
            tab("[h] History", View::History),
            Span::styled(keys, Style::default().fg(Color::DarkGray)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(nav, area);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let chart_height = if self.show_chart { 10 } else { 0 };
        let error_height = if self.log_error.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(error_height),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(chart_height),
                Constraint::Length(4),
                Constraint::Min(4),
            ])
            .split(area);

        if let Some(err) = &self.log_error {
            let msg = Paragraph::new(format!("Error: {}", err))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, chunks[0]);
        }

        let titles: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        let selected_tab = Category::all().iter().position(|c| *c == self.category).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected_tab)
            .highlight_style(Style::default().fg(Color::Blue).bold())
            .block(Block::default().borders(Borders::ALL).title("Tab: category"));
        frame.render_widget(tabs, chunks[1]);

        self.render_exercise(frame, chunks[2]);
        if self.show_chart {
            self.render_chart(frame, chunks[3]);
        }
        self.render_last_session(frame, chunks[4]);
        self.render_sets(frame, chunks[5]);
    }

    fn render_exercise(&self, frame: &mut Frame, area: Rect) {
        let lines = match self.current_exercise() {
            Some(ex) => vec![
                Line::from(Span::styled(ex.name.clone(), Style::default().fg(Color::Blue).bold())),
                Line::from(vec![
                    Span::styled("Target ", Style::default().fg(Color::DarkGray)),
                    Span::raw(ex.target_muscle.clone().unwrap_or_else(|| "General".into())),
                ]),
            ],
            None => vec![Line::from(Span::styled(
                "No exercises in this category",
                Style::default().fg(Color::DarkGray).italic(),
            ))],
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title("< > exercise");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Estimated 1 Rep Max Progress");

        let Some(points) = &self.chart else {
            let msg = Paragraph::new("Log more workouts to see a chart!")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let data: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.one_rep_max as f64))
            .collect();
        let min = points.iter().map(|p| p.one_rep_max).min().unwrap_or(0) as f64;
        let max = points.iter().map(|p| p.one_rep_max).max().unwrap_or(0) as f64;
        let first = points.first().map(|p| p.date.clone()).unwrap_or_default();
        let last = points.last().map(|p| p.date.clone()).unwrap_or_default();

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&data);
        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([0.0, (data.len() - 1) as f64])
                    .labels(vec![Span::raw(first), Span::raw(last)]),
            )
            .y_axis(
                Axis::default()
                    .bounds([min - 1.0, max + 1.0])
                    .labels(vec![Span::raw(format!("{}", min)), Span::raw(format!("{}", max))]),
            );
        frame.render_widget(chart, area);
    }

    fn render_last_session(&self, frame: &mut Frame, area: Rect) {
        let (title, body) = match &self.last_session {
            Some(session) => {
                let sets: Vec<Span> = session
                    .logs
                    .iter()
                    .enumerate()
                    .flat_map(|(i, log)| {
                        [
                            Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                            Span::raw(format!("{}kg x {}   ", log.weight, log.reps)),
                        ]
                    })
                    .collect();
                (format!("Last Session - {}", session.date), Line::from(sets))
            }
            None => (
                "Last Session".to_string(),
                Line::from(Span::styled("No history yet", Style::default().fg(Color::DarkGray).italic())),
            ),
        };

        let best = Line::from(vec![
            Span::styled("PR ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}kg", self.personal_best), Style::default().fg(Color::Yellow)),
        ]);
        let widget = Paragraph::new(vec![body, best])
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, area);
    }

    fn render_sets(&self, frame: &mut Frame, area: Rect) {
        let focused = Style::default().fg(Color::Black).bg(Color::Cyan);
        let cell = |row: usize, field: Field, value: &str| {
            let text = if value.is_empty() { "0".to_string() } else { value.to_string() };
            if row == self.row && field == self.field {
                Cell::from(text).style(focused)
            } else if value.is_empty() {
                Cell::from(text).style(Style::default().fg(Color::DarkGray))
            } else {
                Cell::from(text)
            }
        };

        let rows: Vec<Row> = self
            .form
            .rows()
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let estimate = self
                    .form
                    .estimated_max(i)
                    .map(|e| format!("Est. 1RM: {}kg", e))
                    .unwrap_or_default();
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    cell(i, Field::Weight, &input.weight),
                    cell(i, Field::Reps, &input.reps),
                    Cell::from(estimate).style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Min(16),
            ],
        )
        .header(Row::new(vec!["#", "kg", "Reps", ""]).style(Style::default().bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Sets  a: add  x: remove  Enter: next"),
        );
        frame.render_widget(table, area);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(err) = &self.history_error {
            lines.push(Line::from(vec![
                Span::styled("Error loading history: ", Style::default().fg(Color::Red).bold()),
                Span::styled(err.clone(), Style::default().fg(Color::Red)),
            ]));
            lines.push(Line::default());
        }

        if self.weeks.is_empty() && self.history_error.is_none() {
            lines.push(Line::from(Span::styled(
                "No history found. Go log a set!",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for week in &self.weeks {
            lines.push(Line::from(vec![
                Span::styled(" WEEK ", Style::default().fg(Color::White).bg(Color::DarkGray).bold()),
                Span::styled(format!(" of {}", week.label), Style::default().bold()),
            ]));

            for day in &week.days {
                let tag = SplitTag::classify(&day.logs);
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(day.name.clone(), Style::default().bold()),
                    Span::styled(format!(" {} ", day.date), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("[{}]", tag), Style::default().fg(split_color(tag)).bold()),
                ]));

                for exercise in day.exercises() {
                    let sets = exercise
                        .sets
                        .iter()
                        .map(|s| format!("{}x{}", s.weight, s.reps))
                        .collect::<Vec<_>>()
                        .join(" ");
                    lines.push(Line::from(vec![
                        Span::raw(format!("    {:24}", exercise.name)),
                        Span::styled(
                            format!("{} sets  ", exercise.sets.len()),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(sets),
                    ]));
                }
            }
            lines.push(Line::default());
        }

        let widget = Paragraph::new(lines)
            .scroll((self.history_scroll, 0))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_overlay(frame: &mut Frame, overlay: &Overlay) {
    let (title, text) = match overlay {
        Overlay::Alert(msg) => ("", format!("{}\n\n(any key)", msg)),
        Overlay::ConfirmLeave(Leave::History) => {
            ("Finish Workout", "Unsaved sets! Finish anyway? (y/n)".to_string())
        }
        Overlay::ConfirmLeave(Leave::Quit) => ("Quit", "Unsaved sets! Quit anyway? (y/n)".to_string()),
    };

    let area = centered(frame.area(), 50, 7);
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
