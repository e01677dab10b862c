// Library surface shared by the binary and the headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod modes;
pub mod operation;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod ui;
pub mod update;
pub mod util;
