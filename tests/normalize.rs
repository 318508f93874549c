#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::{json, Value};
use tetl::{dedupe_by_key, normalize, rename_author_fields, CleanedRecord, MissingKey, ENTITY_COLUMNS};

fn by_id<'a>(recs: &'a [CleanedRecord], id: &str) -> &'a CleanedRecord {
    recs.iter().find(|r| r.id() == Some(id)).unwrap()
}

/// Minimal single post/author pair: hashtag, metric, username and verified flag
/// all land in top-level columns.
#[test]
fn single_post_is_flattened_and_joined() {
    let posts = rows(json!([
        {"id": "1", "author_id": "a", "entities": {"hashtags": [{"tag": "x"}]}, "public_metrics": {"retweet_count": 5}}
    ]));
    let authors = rows(json!([{"id": "a", "username": "bob", "verified": true}]));

    let out = normalize(posts, authors, None).unwrap();
    assert_eq!(out.records.len(), 1);
    let r = &out.records[0];
    assert_eq!(r.str_col("hashtags"), Some("x"));
    assert_eq!(r.get("retweet_count"), Some(&json!(5)));
    assert_eq!(r.username(), Some("bob"));
    assert_eq!(r.verified(), Some(true));
    assert!(!r.has_column("entities"));
    assert!(!r.has_column("public_metrics"));
}

/// Empty `context_annotations` gives the `false` sentinel, not an empty string.
#[test]
fn empty_context_annotations_become_false() {
    let posts = rows(json!([
        {"id": "1", "author_id": "a", "context_annotations": []},
        {"id": "2", "author_id": "a"}
    ]));
    let authors = rows(json!([{"id": "a", "username": "bob"}]));

    let out = normalize(posts, authors, None).unwrap();
    for r in &out.records {
        assert_eq!(r.get("context_annotations"), Some(&Value::Bool(false)));
        assert_eq!(r.context_annotations(), None);
    }
}

/// Two authors with the same id: the first one is kept.
#[test]
fn duplicate_authors_keep_first() {
    let out = normalize(rows(sample_posts()), rows(sample_users()), None).unwrap();
    assert_eq!(out.stats.duplicate_authors, 1);
    for r in out.records.iter().filter(|r| r.str_col("author_id") == Some("a")) {
        assert_eq!(r.username(), Some("bob"));
    }
    assert!(out.records.iter().all(|r| r.username() != Some("mallory")));
}

/// The full sample: one duplicate post, one orphan post, three joined records,
/// two distinct conversations.
#[test]
fn sample_location_counts() {
    let posts = rows(sample_posts());
    let n_posts = posts.len();
    let out = normalize(posts, rows(sample_users()), None).unwrap();

    assert_eq!(out.stats.posts_read, n_posts);
    assert_eq!(out.stats.authors_read, 3);
    assert_eq!(out.stats.duplicate_posts, 1);
    assert_eq!(out.stats.orphan_posts, 1);
    assert_eq!(out.stats.records, 3);
    assert_eq!(out.stats.unique_conversations, 2);

    let ids: Vec<_> = out.records.iter().map(|r| r.id().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "5"], "post order is kept");

    // Duplicate post "1" lost: first text wins, and its metrics are the first ones.
    let first = by_id(&out.records, "1");
    assert_eq!(first.text(), Some("Rust news today"));
    assert_eq!(first.get("retweet_count"), Some(&json!(5)));

    // Output never exceeds the deduplicated posts that have an author.
    let deduped_posts = n_posts - out.stats.duplicate_posts;
    assert!(out.records.len() <= deduped_posts - out.stats.orphan_posts);
}

/// Entity, referenced and context columns for a richly annotated post.
#[test]
fn entity_columns_are_joined() {
    let out = normalize(rows(sample_posts()), rows(sample_users()), None).unwrap();
    let r = by_id(&out.records, "1");

    assert_eq!(r.str_col("hashtags"), Some("News, Rust"));
    assert_eq!(r.str_col("annotations"), Some("Rust"));
    assert_eq!(r.str_col("urls"), Some("https://rust-lang.org"));
    assert_eq!(r.str_col("mentions_ids"), Some("b"));
    assert_eq!(r.str_col("mentions_usernames"), Some("carol"));
    assert_eq!(r.str_col("referenced_type"), Some("quoted"));
    assert_eq!(r.str_col("referenced_tweets"), Some("99"));
    // Repeated "News" collapses, first-seen order kept.
    assert_eq!(r.context_annotations(), Some("News, Tech"));

    let two = by_id(&out.records, "2");
    assert_eq!(two.str_col("hashtags"), Some("music"));
    assert_eq!(two.str_col("annotations"), Some(""));
    assert_eq!(two.str_col("referenced_type"), Some(""));
    assert_eq!(two.str_col("referenced_tweets"), Some(""));
}

/// Author fields are renamed, metrics and geo expanded, and every record carries
/// the same column set.
#[test]
fn author_fields_renamed_and_sub_records_expanded() {
    let out = normalize(rows(sample_posts()), rows(sample_users()), None).unwrap();
    let r = by_id(&out.records, "1");

    assert_eq!(r.str_col("account_created"), Some("2010-01-01T00:00:00.000Z"));
    assert_eq!(r.str_col("created_at"), Some("2022-11-07T10:00:00.000Z"));
    assert_eq!(r.str_col("account-location"), Some("Sydney"));
    assert_eq!(r.str_col("author_url"), Some("https://bob.example"));
    assert!(r.has_column("author_entities"));
    assert_eq!(r.get("followers_count"), Some(&json!(100)));
    assert_eq!(r.get("like_count"), Some(&json!(10)));
    assert!(!r.has_column("author_metrics"));
    assert!(!r.has_column("geo"));

    // geo only on post 5, but the column exists everywhere.
    assert_eq!(by_id(&out.records, "5").str_col("place_id"), Some("p1"));
    assert_eq!(r.get("place_id"), Some(&Value::Null));

    let cols: Vec<Vec<&str>> = out.records.iter().map(|r| r.columns().collect()).collect();
    assert!(cols.windows(2).all(|w| w[0] == w[1]));
    for col in ENTITY_COLUMNS {
        assert!(r.has_column(col), "missing {col}");
    }
}

/// Posts without entities (or with malformed pieces) are tolerated.
#[test]
fn missing_or_partial_entities_are_empty() {
    let posts = rows(json!([
        {"id": "1", "author_id": "a"},
        {"id": "2", "author_id": "a", "entities": {"hashtags": [{"start": 0}, {"tag": "ok"}], "mentions": null}},
        {"id": "3", "author_id": "a", "entities": "garbage", "referenced_tweets": null, "public_metrics": null}
    ]));
    let out = normalize(posts, rows(json!([{"id": "a", "username": "bob"}])), None).unwrap();
    assert_eq!(out.records.len(), 3);

    let r1 = by_id(&out.records, "1");
    for col in ENTITY_COLUMNS {
        assert_eq!(r1.str_col(col), Some(""), "{col}");
    }
    assert_eq!(by_id(&out.records, "2").str_col("hashtags"), Some("ok"));
    assert_eq!(by_id(&out.records, "3").str_col("mentions_usernames"), Some(""));
}

/// Posts missing `author_id` are dropped like any other orphan; ids compare by
/// their string form, so a numeric author id still joins.
#[test]
fn join_key_handling() {
    let posts = rows(json!([
        {"id": 1, "author_id": 7, "text": "numeric ids"},
        {"id": 2, "text": "no author"}
    ]));
    let authors = rows(json!([{"id": "7", "username": "seven"}]));
    let out = normalize(posts, authors, None).unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.stats.orphan_posts, 1);
    assert_eq!(out.records[0].username(), Some("seven"));
}

/// A column present on both sides after renaming gets `_x` (post) / `_y` (author).
#[test]
fn clashing_columns_get_suffixes() {
    let posts = rows(json!([{"id": "1", "author_id": "a", "withheld": {"copyright": true}}]));
    let authors = rows(json!([{"id": "a", "username": "bob", "withheld": {"country_codes": ["DE"]}}]));
    let out = normalize(posts, authors, None).unwrap();

    let r = &out.records[0];
    assert!(!r.has_column("withheld"));
    assert_eq!(r.get("withheld_x"), Some(&json!({"copyright": true})));
    assert_eq!(r.get("withheld_y"), Some(&json!({"country_codes": ["DE"]})));
}

/// A post without an id is a missing required field: the whole location fails.
#[test]
fn post_without_id_is_fatal() {
    let posts = rows(json!([{"author_id": "a", "text": "anonymous"}]));
    let err = normalize(posts, rows(json!([{"id": "a"}])), None).unwrap_err();
    assert!(format!("{err:#}").contains("id"));
}

/// Dedupe keeps first occurrences and is idempotent.
#[test]
fn dedupe_is_idempotent() {
    let authors: Vec<_> = rows(sample_users()).into_iter().map(rename_author_fields).collect();
    let once = dedupe_by_key(authors, "author_id", MissingKey::Fail).unwrap();
    assert_eq!(once.rows.len(), 2);
    assert_eq!(once.duplicates, 1);

    let twice = dedupe_by_key(once.rows.clone(), "author_id", MissingKey::Fail).unwrap();
    assert_eq!(twice.duplicates, 0);
    assert_eq!(twice.rows, once.rows);
}

/// Empty inputs produce an empty record set.
#[test]
fn empty_inputs() {
    let out = normalize(Vec::new(), Vec::new(), None).unwrap();
    assert!(out.records.is_empty());
    assert_eq!(out.stats.unique_conversations, 0);
}

/// An author without an id cannot be joined; it is dropped and counted, the
/// location still completes.
#[test]
fn author_without_id_is_dropped() {
    let posts = rows(json!([{"id": "1", "author_id": "a"}]));
    let authors = rows(json!([{"username": "ghost"}, {"id": "a", "username": "bob"}]));
    let out = normalize(posts, authors, None).unwrap();

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].username(), Some("bob"));
    assert_eq!(out.stats.authors_without_id, 1);
    assert_eq!(out.stats.duplicate_authors, 0);

    let skipped = dedupe_by_key(rows(json!([{"x": 1}, {"id": "a"}])), "id", MissingKey::Skip).unwrap();
    assert_eq!(skipped.rows.len(), 1);
    assert_eq!(skipped.missing_key, 1);
    assert!(dedupe_by_key(rows(json!([{"x": 1}])), "id", MissingKey::Fail).is_err());
}

/// Expanding author metrics never replaces a post metric of the same name.
#[test]
fn expanded_metrics_do_not_overwrite_post_metrics() {
    let posts = rows(json!([
        {"id": "1", "author_id": "a", "public_metrics": {"like_count": 10, "retweet_count": 1}}
    ]));
    let authors = rows(json!([
        {"id": "a", "username": "bob", "public_metrics": {"followers_count": 7, "like_count": 9999}}
    ]));
    let out = normalize(posts, authors, None).unwrap();
    let r = &out.records[0];

    assert_eq!(r.get("like_count"), Some(&json!(10)));
    assert_eq!(r.get("author_metrics_like_count"), Some(&json!(9999)));
    assert_eq!(r.get("followers_count"), Some(&json!(7)));
    assert_eq!(r.get("retweet_count"), Some(&json!(1)));
}

/// The per-post bar is sized to the deduplicated posts and reaches its total
/// even when some posts have no author.
#[test]
fn progress_covers_every_deduplicated_post() {
    let pb = indicatif::ProgressBar::hidden();
    let out = normalize(rows(sample_posts()), rows(sample_users()), Some(&pb)).unwrap();
    let deduped = (out.stats.posts_read - out.stats.duplicate_posts) as u64;
    assert_eq!(pb.length(), Some(deduped));
    assert_eq!(pb.position(), deduped);
}
