//! Shared data structures for biosignal monitoring
//!
//! - `Reading` / `ReadingSnapshot`: accepted measurements and consumer views
//! - `ChannelValue`: measured value or explicit reason for its absence
//! - `ChannelBand`: clinical thresholds per channel
//! - `SignalStatus` / `ChannelStatus`: classification results

mod band;
mod reading;
mod status;

pub use band::*;
pub use reading::*;
pub use status::*;
