//! Document metadata for pressmark.
//!
//! Metadata comes from two places: a YAML preamble at the start of the
//! document, and values supplied by the caller. This crate parses the former
//! and combines both under fixed precedence rules.
//!
//! # Example
//!
//! ```
//! use pressmark_meta::{Metadata, extract, merge_metadata};
//!
//! let source = "---\ntitle: Foo\nauthor: Someone\n---\n\n# Body";
//! let extracted = extract(source).unwrap();
//!
//! let explicit = Metadata { title: Some("Bar".into()), ..Default::default() };
//! let merged = merge_metadata(&explicit, &extracted);
//!
//! assert_eq!(merged.title.as_deref(), Some("Bar"));
//! assert_eq!(merged.author.as_deref(), Some("Someone"));
//! ```

mod merge;
mod metadata;
mod preamble;

pub use merge::merge_metadata;
pub use metadata::{DocumentSettings, Metadata, MetadataError};
pub use preamble::{Preamble, extract, split_preamble};
