pub mod autofix;
pub mod config;
pub mod errors;
pub mod logging;
