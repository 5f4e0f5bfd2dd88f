//! Catalog tracks and the ordered selection built from them.
//!
//! `model` holds the track types, `selection` appends/removes identified
//! entries, and `sequence` reorders them one adjacent swap at a time.

mod display;
mod model;
mod selection;
mod sequence;

pub use display::display_from_fields;
pub use model::*;
pub use selection::*;
pub use sequence::*;
