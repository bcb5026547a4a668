pub mod classifier;

pub use classifier::{Bucket, BucketKind, Classification, ClassifiedCandidate, classify};
