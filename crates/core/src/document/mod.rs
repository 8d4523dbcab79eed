pub mod model;
pub mod nav;
pub mod slug;
pub mod validate;

pub use model::{Document, NewDocument};
