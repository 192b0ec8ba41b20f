//! Library side of the `survey-studio` command line tool.

pub mod config;
pub mod logging;
pub mod source;
pub mod workspace;
