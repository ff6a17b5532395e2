//! Cloud spend dashboard: spreadsheet cost data, derived views, AI summaries

pub mod cli;
pub mod config;
pub mod logging;
pub mod services;
pub mod sources;
pub mod tui;
pub mod types;

#[cfg(test)]
mod test_support;
