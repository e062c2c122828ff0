#![forbid(unsafe_code)]

//! Metadata normalization for ViewTube list entries.
//!
//! List data reaches the client either from a public proxy API or from the
//! local scraper, and the two disagree on almost every field. This crate
//! detects which shape a record has, maps it onto one [`CanonicalVideo`] and
//! formats what the entry displays. Rendering, fetching and platform actions
//! stay with the caller.

pub mod config;
pub mod format;
pub mod links;
pub mod normalize;
pub mod publish;
pub mod record;

pub use normalize::{CanonicalVideo, ListEntry, Normalizer};
pub use record::{RawRecord, SchemaKind};
