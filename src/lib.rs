//! gymlog - Personal strength training log
//!
//! Log sets per exercise, see the last session and personal best, chart the
//! estimated one-rep-max, and browse history grouped by week.

pub mod analytics;
pub mod config;
pub mod db;
pub mod rest_timer;
pub mod set_form;
pub mod tui;

pub use config::Config;
pub use db::{Database, Store};
