//! Whole-document JSON readers/writers for location inputs and cleaned outputs.
//! A `.zst` suffix means the document is zstd-compressed.

use crate::json_utils::Row;
use crate::record::CleanedRecord;
use crate::util::{create_with_backoff, open_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const ZSTD_LEVEL: i32 = 3;

pub fn is_zst(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("zst"))
}

fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let r = BufReader::new(f);
    if is_zst(path) {
        let dec = zstd::stream::read::Decoder::new(r).with_context(|| format!("zstd decoder for {}", path.display()))?;
        Ok(Box::new(dec))
    } else {
        Ok(Box::new(r))
    }
}

/// Parse a whole JSON document.
pub fn read_value(path: &Path) -> Result<Value> {
    let r = open_reader(path)?;
    serde_json::from_reader(r).with_context(|| format!("parse JSON {}", path.display()))
}

/// Read a raw input document: a JSON array whose items are all objects.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let v = read_value(path)?;
    rows_from_array(v).with_context(|| format!("records in {}", path.display()))
}

fn rows_from_array(v: Value) -> Result<Vec<Row>> {
    let Value::Array(items) = v else {
        bail!("expected a JSON array of records");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(m) => Ok(m),
            other => bail!("record #{i} is not an object: {other}"),
        })
        .collect()
}

/// Read a cleaned document, accepting either a records array or the
/// column-oriented shape `{"col": {"0": v, "1": v, ...}, ...}`.
pub fn read_records(path: &Path) -> Result<Vec<CleanedRecord>> {
    let v = read_value(path)?;
    records_from_value(v).with_context(|| format!("cleaned records in {}", path.display()))
}

pub fn records_from_value(v: Value) -> Result<Vec<CleanedRecord>> {
    match v {
        Value::Array(_) => Ok(rows_from_array(v)?.into_iter().map(CleanedRecord::from_row).collect()),
        Value::Object(columns) => {
            if !columns.values().all(|c| c.is_object()) {
                bail!("column-oriented document must map every column to an index object");
            }
            // Index labels are row numbers; order numerically, then lexically for anything else.
            let labels: BTreeSet<(u64, String)> = columns
                .values()
                .filter_map(|c| c.as_object())
                .flat_map(|c| c.keys())
                .map(|k| (k.parse::<u64>().unwrap_or(u64::MAX), k.clone()))
                .collect();
            let mut rows = Vec::with_capacity(labels.len());
            for (_, label) in &labels {
                let mut row = Row::new();
                for (col, cells) in &columns {
                    let cell = cells.get(label).cloned().unwrap_or(Value::Null);
                    row.insert(col.clone(), cell);
                }
                rows.push(CleanedRecord::from_row(row));
            }
            Ok(rows)
        }
        other => bail!("expected an array or column-oriented object, found {other}"),
    }
}

fn inprogress_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    path.with_file_name(name)
}

/// Write records as one JSON array, via a temp file promoted atomically.
/// On any failure the temp file is removed and `path` is left untouched.
pub fn write_records(path: &Path, records: &[CleanedRecord], pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = inprogress_path(path);
    let res = write_tmp(&tmp, path, records, pretty).and_then(|()| replace_file_atomic_backoff(&tmp, path));
    if res.is_err() {
        let _ = remove_with_backoff(&tmp, 4, 50);
    }
    res
}

fn write_tmp(tmp: &Path, path: &Path, records: &[CleanedRecord], pretty: bool) -> Result<()> {
    let f = create_with_backoff(tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::new(f);
    if is_zst(path) {
        let mut enc = zstd::stream::write::Encoder::new(&mut w, ZSTD_LEVEL)?;
        write_json(&mut enc, records, pretty)?;
        enc.finish()?;
    } else {
        write_json(&mut w, records, pretty)?;
    }
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    Ok(())
}

fn write_json<W: Write>(w: &mut W, records: &[CleanedRecord], pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *w, records)?;
    } else {
        serde_json::to_writer(&mut *w, records)?;
    }
    Ok(())
}
