/// Core types shared across all refinery modules
pub mod class;
pub mod drop;
pub mod ids;
pub mod sequence;

// Re-export commonly used types at module level
pub use class::Class;
pub use drop::DropReason;
pub use ids::{ChoiceId, ClusterId, MemberId};
pub use sequence::SequenceType;
