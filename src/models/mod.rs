//! Record model shared by both timesheet sources.

mod category;
mod date;
mod duration;
mod official;
mod secondary;

pub use category::*;
pub use date::*;
pub use duration::*;
pub use official::*;
pub use secondary::*;
