//! Fetch recent toots from a Mastodon account and render them as HTML that
//! is safe to embed in another page.

pub mod api;
pub mod config;
pub mod embed;
pub mod error;
pub mod mastodon;
pub mod render;


pub use embed::{Embedder, Marker, MarkerKind, Replacement};
pub use error::{Error, Result};
