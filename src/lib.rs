pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod preflight;
pub mod process;
pub mod release;
pub mod ui;

pub use error::{Result, SrtError};
