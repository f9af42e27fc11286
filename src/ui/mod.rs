pub mod progress;
pub mod output;
pub mod signals;

pub use progress::ProgressManager;
pub use output::{OutputFormatter, OutputMode};
pub use signals::{CancellationSignal, InterruptHandler};
