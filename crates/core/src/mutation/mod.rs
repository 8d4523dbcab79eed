pub mod types;

pub use types::{DocumentPatch, MutationResult, OrderUpdate, PublishOutcome, ReorderRequest};
