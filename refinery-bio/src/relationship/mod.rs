//! From classified alignments to Joined/Choice/Keep/Drop recommendations

pub mod keep;
pub mod process;
pub mod resolver;

pub use keep::{clusters_to_keep, CatalogueGroup, GroupStatus, KeepResult, NOT_MATCHED};
pub use process::{ClassProcessing, ClusterPair, CountDisplay, OrientationCounts, PairMembers, ProcessedPair, SideStatus};
pub use resolver::{
    resolve, resolve_with, Category, ClassFraction, DroppedMatch, Recommendation, RecommendedId,
    RelatedRow, RelationshipGroup, Resolution,
};
