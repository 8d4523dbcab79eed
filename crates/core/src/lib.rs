//! Content core for the go-to-market strategy site.
//!
//! Documents, the pending-changes draft overlay, the ordering index, search,
//! settings, the media library and session auth all live here. The HTTP
//! surface in `gtm-site-api` is a thin layer over [`service::ContentService`].

pub mod auth;
pub mod document;
pub mod draft;
pub mod error;
pub mod events;
pub mod media;
pub mod mutation;
pub mod search;
pub mod seed;
pub mod service;
pub mod settings;
pub mod store;

pub use error::{ContentError, ContentResult};
pub use service::ContentService;
