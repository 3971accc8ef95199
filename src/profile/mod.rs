//! Learner profile: weakness extraction, aggregation and personalization.
//!
//! The extractor turns free-text AI review output into weakness tags; the
//! store accumulates them into a profile whose derived views (patterns,
//! focus areas) are rebuilt wholesale after every graded review.

pub mod extractor;
pub mod store;

pub use extractor::{extract, WeaknessReport};
pub use store::{
    FocusAreas, LearnerProfile, MistakeEvent, Patterns, ProfileStore, ReviewEvent,
    VocabularyGap, WeaknessRecord,
};
