//! gymlog - Personal strength training log

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};

use gymlog::analytics::{
    SplitTag, bar_width, group_by_week, last_session, personal_best, progress_series,
};
use gymlog::config::Config;
use gymlog::db::{Category, Exercise, NewExercise, Store, find_exercise};
use gymlog::rest_timer::{RestTimer, TimerEvent, format_time, suggested_rest};
use gymlog::set_form::{new_personal_best, parse_sets};
use gymlog::tui::App;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(author, version, about = "Personal strength training log")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI (default)
    Tui,

    /// List exercises
    Exercises {
        /// Only this category (push, pull, legs)
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Add an exercise to the catalog
    AddExercise {
        name: String,

        #[arg(short, long)]
        category: Category,

        /// Target muscle, drives the suggested rest
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Log sets for an exercise
    Log {
        /// Exercise name (e.g., "bench press", "squat")
        exercise: String,

        /// Sets as WEIGHTxREPS (e.g., 100x5 102.5x3)
        #[arg(required = true)]
        sets: Vec<String>,
    },

    /// Show the previous session and personal best
    Last {
        exercise: String,
    },

    /// Show estimated 1RM per training day
    Chart {
        exercise: String,
    },

    /// Show history grouped by week
    History {
        /// Number of weeks to show
        #[arg(short, long, default_value = "4")]
        weeks: usize,
    },

    /// Count down the suggested rest for an exercise
    Rest {
        exercise: String,
    },
}

fn init_logging(config: &Config) -> Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => tracing_subscriber::fmt().with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn lookup(store: &dyn Store, name: &str) -> Result<Exercise> {
    let exercises = store.list_exercises()?;
    find_exercise(&exercises, name)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown exercise: {} (see `gymlog exercises`)", name))
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.config)?;

    let store = cli.config.open_store().context("cannot open store")?;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(store);
            app.run()?;
        }

        Some(Commands::Exercises { category }) => {
            let exercises = store.list_exercises()?;
            println!("{:24} | {:5} | Target", "Exercise", "Split");
            println!("{:-<50}", "");
            for ex in exercises.iter().filter(|e| category.is_none_or(|c| e.category == c)) {
                println!(
                    "{:24} | {:5} | {}",
                    ex.name,
                    ex.category,
                    ex.target_muscle.as_deref().unwrap_or("-")
                );
            }
        }

        Some(Commands::AddExercise { name, category, target }) => {
            let id = store.add_exercise(&NewExercise {
                name: name.clone(),
                category,
                target_muscle: target,
            })?;
            println!("Added: {} [{}] (id: {})", name, category, id);
        }

        Some(Commands::Log { exercise, sets }) => {
            let exercise = lookup(store.as_ref(), &exercise)?;
            let sets = parse_sets(sets.as_slice())?.valid_sets(exercise.id)?;
            let previous_best = personal_best(&store.logs_by_weight(exercise.id)?);

            store.insert_logs(&sets)?;
            println!("Logged {} set(s) of {}", sets.len(), exercise.name);
            if let Some(weight) = new_personal_best(&sets, previous_best) {
                println!("NEW PR! You lifted {}kg!", weight);
            }
        }

        Some(Commands::Last { exercise }) => {
            let exercise = lookup(store.as_ref(), &exercise)?;
            let logs = store.logs_by_weight(exercise.id)?;

            println!("{}", exercise.name);
            println!("{:-<40}", "");
            match last_session(&logs, &Local) {
                Some(session) => {
                    println!("Last session: {}", session.date);
                    for (i, log) in session.logs.iter().enumerate() {
                        println!("  {}. {}kg x {}", i + 1, log.weight, log.reps);
                    }
                }
                None => println!("No history yet"),
            }
            println!("Personal best: {}kg", personal_best(&logs));
            println!(
                "Suggested rest: {}",
                format_time(suggested_rest(exercise.target_muscle.as_deref()))
            );
        }

        Some(Commands::Chart { exercise }) => {
            let exercise = lookup(store.as_ref(), &exercise)?;
            let logs = store.logs_chronological(exercise.id)?;

            println!("Estimated 1 Rep Max Progress - {}", exercise.name);
            println!("{:-<40}", "");
            match progress_series(&logs, &Local) {
                Some(points) => {
                    let top = points.iter().map(|p| p.one_rep_max).max().unwrap_or(0);
                    for p in points {
                        let bar = "#".repeat(bar_width(p.one_rep_max, top, 30));
                        println!("{:>7} | {:>4}kg {}", p.date, p.one_rep_max, bar);
                    }
                }
                None => println!("Log more workouts to see a chart!"),
            }
        }

        Some(Commands::History { weeks }) => {
            let logs = store.history()?;
            let grouped = group_by_week(&logs, &Local);
            if grouped.is_empty() {
                println!("No history found. Go log a set!");
            }
            for week in grouped.iter().take(weeks) {
                println!("WEEK of {}", week.label);
                for day in &week.days {
                    println!("  {} {} [{}]", day.name, day.date, SplitTag::classify(&day.logs));
                    for ex in day.exercises() {
                        let sets: Vec<String> =
                            ex.sets.iter().map(|s| format!("{}x{}", s.weight, s.reps)).collect();
                        println!("    {:24} {} sets: {}", ex.name, ex.sets.len(), sets.join(" "));
                    }
                }
                println!();
            }
        }

        Some(Commands::Rest { exercise }) => {
            let exercise = lookup(store.as_ref(), &exercise)?;
            let seconds = suggested_rest(exercise.target_muscle.as_deref());

            let mut timer = RestTimer::new();
            timer.toggle(seconds);
            let mut out = std::io::stdout();
            print!("Rest {} ", format_time(seconds));
            out.flush()?;
            loop {
                thread::sleep(Duration::from_secs(1));
                match timer.tick() {
                    TimerEvent::Running(left) => {
                        print!("\rRest {} ", format_time(left));
                        out.flush()?;
                    }
                    TimerEvent::Expired => {
                        println!("\rRest over! \x07");
                        break;
                    }
                    TimerEvent::Idle => break,
                }
            }
        }
    }

    Ok(())
}
