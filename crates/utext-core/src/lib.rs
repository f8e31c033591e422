//! Normalizer stages. Every stage is pure: it takes a [`UniversalText`]
//! by reference and returns a new one.
//!
//! [`UniversalText`]: utext_types::UniversalText

pub mod dedup;
pub mod format;
mod locate;
pub mod merge;
pub mod noise;
pub mod order;
pub mod pipeline;
pub mod positions;
pub mod tokenize;

pub use dedup::remove_duplicates;
pub use format::normalize_formatting;
pub use merge::merge;
pub use noise::{NoiseFilter, filter_noise};
pub use order::order_by_reading_sequence;
pub use pipeline::{Normalizer, normalize};
pub use positions::{covered_area, map_positions, map_positions_with};
pub use tokenize::tokenize;
