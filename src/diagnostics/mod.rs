//! Serializable run reports shared by the library and the command-line tools.
//!
//! Each stage returns its numeric result together with a small trace
//! (`ReadStats`, `ThresholdTrace`, `SubsetReport`) so the tools can print a
//! summary and optionally dump the full record as JSON.

pub mod evaluation;
pub mod read;
pub mod threshold;
pub mod timing;

pub use evaluation::SubsetReport;
pub use read::ReadStats;
pub use threshold::{RepeatPercentiles, ThresholdTrace};
pub use timing::{StageTiming, TimingBreakdown};
