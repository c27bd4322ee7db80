//! Output module for reporting on the puzzle collection
//!
//! This module handles:
//! - Loading collection statistics from storage
//! - Printing them for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, PuzzleStatistics};
