//! Building cost estimation engine.
//!
//! Rate tables and benchmark settings go in, a [`estimate::Estimate`] comes
//! out, and [`reports`] turns it into text, PDF, spreadsheet and chart
//! output. The binary in `main.rs` is a thin CLI over this library.

pub mod app;
pub mod benchmark;
pub mod config;
pub mod currency;
pub mod errors;
pub mod estimate;
pub mod loader;
pub mod output;
pub mod pdf;
pub mod quantities;
pub mod reports;
pub mod strategy;
pub mod types;
pub mod util;
