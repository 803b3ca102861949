pub mod candidate;
pub mod media;
pub mod outcome;
pub mod resolved;
pub mod trace;

pub use candidate::SearchCandidate;
pub use media::{MediaIdentity, MediaTitle};
pub use outcome::ResolutionOutcome;
pub use resolved::{PageImage, ResolvedContent, VideoSource};
pub use trace::{TraceEntry, TraceLog};
pub use crate::shared::domain::value_objects::ContentKind;
