//! Data model shared by the extractor, the engine and the renderers.
//!
//! [`TextFragment`] is what the extractor produces and the engine reads;
//! [`Outline`] is what the engine returns.

mod fragment;
mod outline;

pub use fragment::{DocumentFragments, PageGeometry, TextFragment};
pub(crate) use fragment::estimate_width;
pub use outline::{Heading, HeadingLevel, Outline, OutlineMetadata};
