pub mod registry;
pub mod translate;
pub mod types;

// Re-export commonly used types
pub use registry::{protein_hash, SequenceEntry, SequenceRegistry};
pub use translate::{translate_cds, GeneticCode, TranslationError};
pub use types::{Sequence, SequenceType};
