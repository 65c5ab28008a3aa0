//! Logging infrastructure for leveled console and file output.

mod captured;
mod exit;
mod logger;
mod subscriber;
mod types;
mod utils;

pub use captured::{CapturedLog, Level, LogRecord};
pub use exit::ExitNotice;
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};
