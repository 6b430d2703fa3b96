pub mod app;
pub mod cli_args;
pub mod error;
