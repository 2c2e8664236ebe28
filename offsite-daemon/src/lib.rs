//! Offsite daemon: terminal detachment, rotating transfer log, sync loop.

mod error;
pub mod detach;
pub mod paths;
pub mod runtime;
pub mod sink;

pub use detach::detach;
pub use error::DaemonError;
pub use runtime::{run, start_blocking};
pub use sink::{DaemonInfo, LogSink};
