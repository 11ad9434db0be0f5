//! CLI entry point for the QA engine binary: `crawl`, `plan`, `execute`,
//! `run`, and `coverage {show,gaps,reset}` subcommands over the
//! crawl -> plan -> execute -> coverage pipeline. Grounded on
//! `src/cli/app.rs`'s `parse -> init_logging -> load_config -> dispatch`
//! shape.

pub mod app;
pub mod args;
pub mod dispatch;
pub mod runtime;
