//! Post/author join and entity flattening for one location.
//!
//! Steps, in order:
//!   1. author fields renamed to author-scoped names (`id` → `author_id`, ...)
//!   2. authors deduped by `author_id`, posts by `id` (first occurrence wins);
//!      authors without an id are dropped, posts without one fail the location
//!   3. posts inner-joined to authors on `author_id` (post order kept)
//!   4. `public_metrics`, `author_metrics` and `geo` expanded into sibling columns;
//!      a key already in the row is kept and the clashing one lands as `<column>_<key>`
//!   5. entity / referenced / context-annotation columns derived
//!   6. `entities` dropped
//!
//! Every output row then carries the same column set, absent cells as `null`.

use crate::dedupe::{dedupe_by_key, MissingKey};
use crate::json_utils::{distinct_in_order, joined, object_list, objects, pluck_nested, row_key, Row, DELIMITER};
use crate::record::CleanedRecord;
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde_json::Value;
use std::collections::BTreeSet;

/// Author columns renamed before the join so they cannot clash with post columns.
pub const AUTHOR_RENAMES: [(&str, &str); 6] = [
    ("id", "author_id"),
    ("public_metrics", "author_metrics"),
    ("created_at", "account_created"),
    ("entities", "author_entities"),
    ("location", "account-location"),
    ("url", "author_url"),
];

/// Sub-record columns replaced by their own keys.
pub const EXPANDED_COLUMNS: [&str; 3] = ["public_metrics", "author_metrics", "geo"];

/// Flattened entity columns; each holds a `", "`-joined string.
pub const ENTITY_COLUMNS: [&str; 6] = [
    "hashtags",
    "annotations",
    "urls",
    "mentions_ids",
    "mentions_usernames",
    "referenced_type",
];

pub const JOIN_KEY: &str = "author_id";

/// Counters gathered while normalizing one location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub posts_read: usize,
    pub authors_read: usize,
    pub duplicate_posts: usize,
    pub duplicate_authors: usize,
    pub authors_without_id: usize,
    pub orphan_posts: usize,
    pub records: usize,
    pub unique_conversations: usize,
}

#[derive(Clone, Debug, Default)]
pub struct NormalizeOutput {
    pub records: Vec<CleanedRecord>,
    pub stats: NormalizeStats,
}

/// Rename author-scoped fields in place (see [`AUTHOR_RENAMES`]).
pub fn rename_author_fields(mut author: Row) -> Row {
    for (from, to) in AUTHOR_RENAMES {
        if let Some(v) = author.remove(from) {
            author.insert(to.to_string(), v);
        }
    }
    author
}

/// Join, flatten and dedupe one location's raw posts and authors.
pub fn normalize(posts: Vec<Row>, authors: Vec<Row>, pb: Option<&ProgressBar>) -> Result<NormalizeOutput> {
    let mut stats = NormalizeStats { posts_read: posts.len(), authors_read: authors.len(), ..Default::default() };

    let authors: Vec<Row> = authors.into_iter().map(rename_author_fields).collect();
    let authors = dedupe_by_key(authors, JOIN_KEY, MissingKey::Skip).context("deduplicating authors")?;
    stats.duplicate_authors = authors.duplicates;
    stats.authors_without_id = authors.missing_key;
    let posts = dedupe_by_key(posts, "id", MissingKey::Fail).context("deduplicating posts")?;
    stats.duplicate_posts = posts.duplicates;
    if let Some(pb) = pb {
        pb.set_length(posts.rows.len() as u64);
    }

    let overlap = overlapping_columns(&posts.rows, &authors.rows);
    let mut by_id: AHashMap<String, usize> = AHashMap::with_capacity(authors.rows.len());
    for (i, a) in authors.rows.iter().enumerate() {
        if let Some(k) = row_key(a, JOIN_KEY) {
            by_id.insert(k, i);
        }
    }

    let mut rows: Vec<Row> = Vec::with_capacity(posts.rows.len());
    for post in posts.rows {
        if let Some(pb) = pb {
            pb.inc(1);
        }
        let author = row_key(&post, JOIN_KEY).and_then(|k| by_id.get(&k)).map(|&i| &authors.rows[i]);
        let Some(author) = author else {
            stats.orphan_posts += 1;
            continue;
        };
        let mut row = join_pair(post, author, &overlap);
        for col in EXPANDED_COLUMNS {
            expand_column(&mut row, col);
        }
        flatten_entities(&mut row);
        rows.push(row);
    }

    fill_missing_columns(&mut rows);

    let conversations: AHashSet<String> = rows.iter().filter_map(|r| row_key(r, "conversation_id")).collect();
    stats.records = rows.len();
    stats.unique_conversations = conversations.len();

    let records = rows.into_iter().map(CleanedRecord::from_row).collect();
    Ok(NormalizeOutput { records, stats })
}

/// Columns present on both sides (other than the join key); these get `_x`/`_y` suffixes.
fn overlapping_columns(posts: &[Row], authors: &[Row]) -> AHashSet<String> {
    let post_cols: AHashSet<&str> = posts.iter().flat_map(|r| r.keys().map(|k| k.as_str())).collect();
    authors
        .iter()
        .flat_map(|r| r.keys())
        .filter(|k| k.as_str() != JOIN_KEY && post_cols.contains(k.as_str()))
        .cloned()
        .collect()
}

fn join_pair(post: Row, author: &Row, overlap: &AHashSet<String>) -> Row {
    let mut row = Row::new();
    for (k, v) in post {
        if overlap.contains(&k) {
            row.insert(format!("{k}_x"), v);
        } else {
            row.insert(k, v);
        }
    }
    for (k, v) in author {
        if k == JOIN_KEY {
            continue;
        }
        if overlap.contains(k) {
            row.insert(format!("{k}_y"), v.clone());
        } else {
            row.insert(k.clone(), v.clone());
        }
    }
    row
}

/// Replace an object-valued column by its keys. Non-object values just drop the column.
/// Keys already present are never overwritten; the clashing value goes to `<column>_<key>`.
fn expand_column(row: &mut Row, column: &str) {
    if let Some(Value::Object(inner)) = row.remove(column) {
        for (k, v) in inner {
            if row.contains_key(&k) {
                row.insert(format!("{column}_{k}"), v);
            } else {
                row.insert(k, v);
            }
        }
    }
}

/// Derive the entity, referenced and context-annotation columns, dropping `entities`.
pub fn flatten_entities(row: &mut Row) {
    let entities = row.remove("entities");
    let ents = entities.as_ref();

    let hashtags = joined(&object_list(ents, "hashtags"), "tag");
    let annotations = joined(&object_list(ents, "annotations"), "normalized_text");
    let urls = joined(&object_list(ents, "urls"), "expanded_url");
    let mentions = object_list(ents, "mentions");
    let mentions_ids = joined(&mentions, "id");
    let mentions_usernames = joined(&mentions, "username");

    let (referenced_type, referenced_ids) = {
        let refs = objects(row.get("referenced_tweets"));
        (joined(&refs, "type"), joined(&refs, "id"))
    };

    let context = {
        let items = objects(row.get("context_annotations"));
        let names = distinct_in_order(pluck_nested(&items, "entity", "name"));
        if names.is_empty() {
            Value::Bool(false)
        } else {
            Value::String(names.join(DELIMITER))
        }
    };

    let values = [hashtags, annotations, urls, mentions_ids, mentions_usernames, referenced_type];
    for (col, v) in ENTITY_COLUMNS.iter().zip(values) {
        row.insert(col.to_string(), Value::String(v));
    }
    row.insert("referenced_tweets".to_string(), Value::String(referenced_ids));
    row.insert("context_annotations".to_string(), context);
}

fn fill_missing_columns(rows: &mut [Row]) {
    let all: BTreeSet<String> = rows.iter().flat_map(|r| r.keys().cloned()).collect();
    for row in rows.iter_mut() {
        for col in &all {
            if !row.contains_key(col) {
                row.insert(col.clone(), Value::Null);
            }
        }
    }
}
