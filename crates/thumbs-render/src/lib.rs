//! Image transformation actions for thumbs.
//!
//! Actions are registered by name in an [`ActionRegistry`] and executed on a
//! bounded [`RenderPool`].

pub mod action;
pub mod pool;
pub mod registry;

pub use action::{Action, Resize, Thumbnail, content_type};
pub use pool::RenderPool;
pub use registry::{ActionRegistry, ActionRegistryBuilder};
