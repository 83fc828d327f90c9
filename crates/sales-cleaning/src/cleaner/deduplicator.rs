//! Exact-duplicate row removal.

use crate::error::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Removes rows identical in every column to an earlier row.
///
/// Nulls compare equal to nulls. The first occurrence is kept and the
/// surviving rows stay in their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    /// Drop duplicate rows from `df`.
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let before = df.height();
        let deduped = first_occurrences(df)?;
        let removed = before - deduped.height();

        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok((df.clone(), vec!["No duplicate rows found".to_string()]));
        }

        let pct = (removed as f64 / before as f64) * 100.0;
        info!("Removed {} duplicate rows", removed);
        Ok((
            deduped,
            vec![format!("Removed {} duplicate rows ({:.1}%)", removed, pct)],
        ))
    }

    /// Number of rows [`Deduplicator::apply`] would remove.
    pub fn count_duplicates(&self, df: &DataFrame) -> Result<usize> {
        Ok(df.height() - first_occurrences(df)?.height())
    }
}

fn first_occurrences(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 {
        return Ok(df.clone());
    }
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}
