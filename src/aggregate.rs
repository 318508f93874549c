//! Frequency, ranking and proportion statistics over a cleaned record set.
//!
//! Every function returns an empty result for an empty record set. Naming a
//! column that no record carries is a caller bug and fails fast.

use crate::counting::{tokenize, Counter};
use crate::date::{parse_timestamp, Bucket};
use crate::json_utils::scalar_text;
use crate::query::{matchers_for, matches_any, KeywordMatcher};
use crate::record::CleanedRecord;
use anyhow::{bail, Context, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::Date;

/// Metric columns reported by [`top_posts`], with the phrase used when printing them.
pub const TOP_METRICS: [(&str, &str); 5] = [
    ("retweet_count", "most retweeted tweet"),
    ("like_count", "most liked tweet"),
    ("reply_count", "most replied tweet"),
    ("quote_count", "most quoted tweet"),
    ("impression_count", "tweet with most impressions"),
];

/// Fails unless at least one record carries `column`.
pub fn ensure_column(records: &[CleanedRecord], column: &str) -> Result<()> {
    if records.iter().any(|r| r.has_column(column)) {
        Ok(())
    } else {
        bail!("unknown column `{column}` in record set")
    }
}

fn has_column(records: &[CleanedRecord], column: &str) -> bool {
    records.iter().any(|r| r.has_column(column))
}

/// For each keyword, how many records contain it in `column` (case-insensitive substring).
/// A record may count toward several keywords. Keyword order is kept.
pub fn count_by_keyword<S: AsRef<str>>(
    records: &[CleanedRecord],
    column: &str,
    keywords: &[S],
) -> Result<Vec<(String, u64)>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, column)?;
    let matchers = matchers_for(keywords)?;
    Ok(matchers
        .iter()
        .map(|m| {
            let n = records.iter().filter(|r| m.matches_cell(r.get(column))).count() as u64;
            (m.keyword().to_string(), n)
        })
        .collect())
}

/// Among records matching `keyword` in `column`, count by the `verified` flag.
/// Records without a boolean flag are left out.
pub fn verified_proportion(records: &[CleanedRecord], column: &str, keyword: &str) -> Result<BTreeMap<bool, u64>> {
    let mut out = BTreeMap::new();
    if records.is_empty() {
        return Ok(out);
    }
    ensure_column(records, column)?;
    ensure_column(records, "verified")?;
    let m = KeywordMatcher::new(keyword)?;
    for r in records.iter().filter(|r| m.matches_cell(r.get(column))) {
        if let Some(flag) = r.verified() {
            *out.entry(flag).or_insert(0) += 1;
        }
    }
    Ok(out)
}

/// Per-period counts of records matching `keyword`, ascending by period start.
/// Periods with no matches are omitted rather than zero-filled.
pub fn time_series_counts(
    records: &[CleanedRecord],
    column: &str,
    keyword: &str,
    bucket: Bucket,
) -> Result<Vec<(Date, u64)>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, column)?;
    ensure_column(records, "created_at")?;
    let m = KeywordMatcher::new(keyword)?;
    let mut buckets = BTreeMap::<Date, u64>::new();
    for (idx, r) in records.iter().enumerate() {
        if !m.matches_cell(r.get(column)) {
            continue;
        }
        let ts = parse_timestamp(r.get("created_at")).with_context(|| format!("record #{idx} created_at"))?;
        if let Some(ts) = ts {
            *buckets.entry(bucket.start_of(ts)?).or_insert(0) += 1;
        }
    }
    Ok(buckets.into_iter().collect())
}

/// Token counts over a comma-joined column (trimmed, lowercased, empties dropped).
pub fn token_frequency(records: &[CleanedRecord], column: &str) -> Result<Counter> {
    let mut counter = Counter::new();
    if records.is_empty() {
        return Ok(counter);
    }
    ensure_column(records, column)?;
    for r in records {
        for t in tokenize(r.get(column)) {
            counter.add(&t);
        }
    }
    Ok(counter)
}

fn rank_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Records sorted descending by a numeric column (stable; missing values last).
fn ranked_by<'a>(records: &'a [CleanedRecord], column: &str) -> Vec<&'a CleanedRecord> {
    let mut ranked: Vec<(&CleanedRecord, Option<f64>)> = records.iter().map(|r| (r, r.f64_col(column))).collect();
    ranked.sort_by(|a, b| rank_desc(a.1, b.1));
    ranked.into_iter().map(|(r, _)| r).collect()
}

/// The `n` records with the highest `metric_column`; ties keep input order.
pub fn top_by_metric<'a>(records: &'a [CleanedRecord], metric_column: &str, n: usize) -> Result<Vec<&'a CleanedRecord>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, metric_column)?;
    let mut ranked = ranked_by(records, metric_column);
    ranked.truncate(n);
    Ok(ranked)
}

/// Most frequent `source_column` tokens among records whose `filter_column`
/// contains any of `filter_values`. Ties keep first-encountered order.
pub fn most_common_filtered<S: AsRef<str>>(
    records: &[CleanedRecord],
    filter_column: &str,
    filter_values: &[S],
    source_column: &str,
    top_n: usize,
) -> Result<Vec<(String, u64)>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, filter_column)?;
    ensure_column(records, source_column)?;
    let matchers = matchers_for(filter_values)?;
    let mut counter = Counter::new();
    for r in records.iter().filter(|r| matches_any(&matchers, r.get(filter_column))) {
        for t in tokenize(r.get(source_column)) {
            counter.add(&t);
        }
    }
    Ok(counter.most_common(Some(top_n)))
}

/// Usernames ranked by `rank_column`, each kept at its highest-ranked row, at most `limit`.
pub fn popular_users(records: &[CleanedRecord], rank_column: &str, limit: usize) -> Result<Vec<String>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, rank_column)?;
    ensure_column(records, "username")?;
    let mut seen = ahash::AHashSet::new();
    let mut out = Vec::new();
    for r in ranked_by(records, rank_column) {
        if out.len() >= limit {
            break;
        }
        if let Some(u) = r.username() {
            if seen.insert(u) {
                out.push(u.to_string());
            }
        }
    }
    Ok(out)
}

/// Occurrences of each non-null value of `column`, most frequent first.
pub fn value_counts(records: &[CleanedRecord], column: &str) -> Result<Vec<(String, u64)>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    ensure_column(records, column)?;
    let mut counter = Counter::new();
    for v in records.iter().filter_map(|r| r.get(column).and_then(scalar_text)) {
        counter.add(&v);
    }
    Ok(counter.most_common(None))
}

/// Language codes (`lang`) by frequency, truncated to the first `n_lang` when given.
pub fn language_counts(records: &[CleanedRecord], n_lang: Option<usize>) -> Result<Vec<(String, u64)>> {
    let mut counts = value_counts(records, "lang")?;
    if let Some(n) = n_lang {
        counts.truncate(n);
    }
    Ok(counts)
}

/// The single best record for one metric.
#[derive(Clone, Debug, PartialEq)]
pub struct TopPost {
    pub metric: String,
    pub label: String,
    pub username: Option<String>,
    pub value: Option<f64>,
    pub text: Option<String>,
}

/// Top record for each of [`TOP_METRICS`] that the record set carries.
pub fn top_posts(records: &[CleanedRecord]) -> Result<Vec<TopPost>> {
    let mut out = Vec::new();
    for (metric, label) in TOP_METRICS {
        if !has_column(records, metric) {
            continue;
        }
        if let Some(r) = top_by_metric(records, metric, 1)?.first() {
            out.push(TopPost {
                metric: metric.to_string(),
                label: label.to_string(),
                username: r.username().map(str::to_string),
                value: r.f64_col(metric),
                text: r.text().map(str::to_string),
            });
        }
    }
    Ok(out)
}

/// Word-cloud weights: token frequency minus `stop_words`, the `max_words` most common.
pub fn word_cloud_weights<S: AsRef<str>>(
    records: &[CleanedRecord],
    column: &str,
    max_words: usize,
    stop_words: &[S],
) -> Result<Vec<(String, u64)>> {
    let mut counter = token_frequency(records, column)?;
    for w in stop_words {
        counter.remove(&w.as_ref().trim().to_lowercase());
    }
    Ok(counter.most_common(Some(max_words)))
}
