//! Render cache for thumbs.
//!
//! Ties geometry parsing, key derivation, the action registry and the
//! storage ports together into the request pipeline.

pub mod metadata;
pub mod render;
pub mod storage;
pub mod types;

pub use metadata::MemoryMetadataCache;
pub use render::RenderCache;
pub use storage::FilesystemStorage;
pub use types::{CachePolicy, CacheStats, CacheStatus, RenderOutcome, RenderRequest};
