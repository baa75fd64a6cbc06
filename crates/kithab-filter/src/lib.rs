#![deny(missing_docs)]

//! # kithab-filter — Hierarchical Filter Engine
//!
//! The regulation → branch → semester → subject drill-down shared by every
//! screen of the portal: student browsing, faculty upload, "manage my
//! uploads" and the admin notes manager all drive one [`HierarchyFilter`]
//! each.
//!
//! The engine is synchronous and never suspends. Metadata arrives as a
//! [`kithab_core::MetadataSnapshot`] already normalized at ingestion, so
//! every comparison here is a plain id or integer equality.
//!
//! ## Guarantees
//!
//! - `set_level` never breaks the prefix invariant: a set level implies all
//!   shallower levels are set, and changing a level clears every deeper one.
//! - `options_for` is deterministic, side-effect free and preserves source
//!   order.
//! - A selection that stops being offered after a refetch is cleared
//!   silently, together with everything below it.

pub mod engine;
pub mod error;
pub mod level;

pub use engine::HierarchyFilter;
pub use error::FilterError;
pub use level::{CompleteSelection, Level, LevelValue, OptionItem, Selection};
