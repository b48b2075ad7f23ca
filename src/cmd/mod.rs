//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `serve`    | `Serve`          |
//! | `classify` | `Classify`       |
//! | `config`   | `Config`         |

pub mod classify;
pub mod config;
pub mod serve;

pub use classify::cmd_classify;
pub use config::cmd_config;
pub use serve::cmd_serve;
