//! Cleaning stages that rewrite cells or drop rows without statistics.
//!
//! This module provides:
//! - Type coercion of the date and numeric columns
//! - Exact-duplicate row removal
//! - Text normalization

pub(crate) mod converters;
mod deduplicator;
mod text;
mod type_coercer;

pub use deduplicator::Deduplicator;
pub use text::TextNormalizer;
pub use type_coercer::TypeCoercer;
