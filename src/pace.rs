//! Pace planning core: the goal timeline, duration projection and clock
//! formatting.
//!
//! Everything here is pure arithmetic over plain values; callers recompute on
//! every change instead of caching.

mod format;
mod projection;
mod timeline;

pub use format::format_pace;
pub use projection::*;
pub use timeline::*;

#[cfg(test)]
mod tests;
