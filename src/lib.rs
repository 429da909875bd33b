pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod host;
pub mod outputs;
pub mod ui;

pub use error::{Result, TaggerError};
