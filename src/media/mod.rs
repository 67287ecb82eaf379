//! Media collection — decoding, ordering, metadata.
//!
//! # Pipeline
//!
//! ```text
//! directory scan → lexical sort → MediaItem::decode (per file, failures
//! skipped) → MediaCollection (cursor + modulo navigation)
//! ```
//!
//! Everything here is toolkit-agnostic: frames are raw RGBA8 buffers and the
//! collection is plain owned state mutated only by the presentation loop.

pub mod collection;
pub mod item;
pub mod metadata;

pub use collection::MediaCollection;
pub use item::{Frame, MediaError, MediaItem, NO_DESCRIPTION};
pub use metadata::{ItemMeta, MetadataStore};
