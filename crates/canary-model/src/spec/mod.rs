mod watch;
pub use watch::{WatchSpec, WatchTask};
