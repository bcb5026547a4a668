pub mod attempt;
pub mod candidate;
pub mod compatibility;
pub mod performance;
pub mod ranked_row;
pub mod search_query;
pub mod selection;

pub use attempt::{FieldAttempt, HighJumpAttempt, HighJumpMark};
pub use candidate::Candidate;
pub use compatibility::{Compatibility, CompatibilityContext};
pub use performance::{EventKind, PerformanceCheck};
pub use ranked_row::{RankedRow, RankingList};
pub use search_query::{MIN_QUERY_LEN, SearchQuery};
pub use selection::Selection;
