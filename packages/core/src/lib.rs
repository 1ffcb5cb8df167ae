// Library root: exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod api;
pub mod cache;
pub mod error;
pub mod hours;
pub mod locations;
pub mod metrics;
pub mod services;

// Only the binary reads these, but integration tests build configs too.
pub mod cli;
pub mod config;
pub mod logging;
