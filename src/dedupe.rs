//! First-occurrence-wins deduplication of in-memory rows by an identifier column.

use crate::json_utils::{row_key, Row};
use anyhow::{bail, Result};

/// What to do with a row that has no usable key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingKey {
    /// The key is a required field: fail the pass.
    Fail,
    /// Drop the row and count it in [`Deduped::missing_key`].
    Skip,
}

/// Outcome of a dedupe pass.
#[derive(Clone, Debug, Default)]
pub struct Deduped {
    pub rows: Vec<Row>,
    pub duplicates: usize,
    pub missing_key: usize,
}

/// Keep the first row seen for each `key` value, preserving input order.
pub fn dedupe_by_key(rows: Vec<Row>, key: &str, on_missing: MissingKey) -> Result<Deduped> {
    let mut seen = ahash::AHashSet::with_capacity(rows.len());
    let mut out = Deduped { rows: Vec::with_capacity(rows.len()), ..Default::default() };

    for (idx, row) in rows.into_iter().enumerate() {
        let Some(k) = row_key(&row, key) else {
            match on_missing {
                MissingKey::Fail => bail!("record #{idx} has no usable `{key}` field"),
                MissingKey::Skip => {
                    out.missing_key += 1;
                    continue;
                }
            }
        };
        if seen.insert(k) {
            out.rows.push(row);
        } else {
            out.duplicates += 1;
        }
    }

    Ok(out)
}
