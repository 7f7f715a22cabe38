//! Thumbs Core
//!
//! Core domain types, traits, and error handling for the thumbs image
//! cache: geometry parsing, cache keys, render records, source descriptors
//! and the storage ports the render pipeline is built on.

pub mod config;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod path;
pub mod ports;
pub mod record;
pub mod source;
pub mod url;

pub use config::ThumbsConfig;
pub use error::{Error, Result};
pub use geometry::{Geometry, canonicalize};
pub use keys::CacheKey;
pub use record::RenderRecord;
pub use source::{HasDimensions, ImageInfo, Source, SourceDescriptor};
pub use url::{ImageAttrs, ImageUrlResolver, UrlSettings};
