//! Release analysis - which upstream releases count as new

pub mod lag;
pub mod window;

pub use lag::apply_lag;
pub use window::{filter_stable, select_relevant, sort_newest_first};
