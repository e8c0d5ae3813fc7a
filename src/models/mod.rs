//! Data models

pub mod pulse;
pub mod threat;

pub use pulse::*;
pub use threat::*;
