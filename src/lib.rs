pub mod app;
pub mod audio;
pub mod config;
mod lock;
pub mod telemetry;

pub use app::logging::{init_logging, log_debug, log_file_path};
pub(crate) use lock::lock_or_recover;
