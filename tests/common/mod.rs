#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tetl::{CleanedRecord, Row};

/// Write a JSON document, creating parent dirs.
pub fn write_json(path: &Path, v: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    serde_json::to_writer(f, v).unwrap();
}

/// Write raw bytes (for malformed inputs).
pub fn write_raw(path: &Path, s: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    f.write_all(s.as_bytes()).unwrap();
}

/// Rows from a JSON array literal.
pub fn rows(v: Value) -> Vec<Row> {
    match v {
        Value::Array(items) => items.into_iter().map(|i| i.as_object().unwrap().clone()).collect(),
        _ => panic!("expected array"),
    }
}

/// Cleaned records from a JSON array literal.
pub fn records(v: Value) -> Vec<CleanedRecord> {
    rows(v).into_iter().map(CleanedRecord::from_row).collect()
}

/// Raw posts for the "australia" location:
/// - "1" by author a: two hashtags, a mention, a url, an annotation, a quoted post,
///   context annotations with a repeated name
/// - "2" by author b: one hashtag, `context_annotations: []`
/// - "1" again (duplicate id, different text), dropped by dedupe
/// - "4" by unknown author "zzz", dropped by the join
/// - "5" by author a: no context annotations at all, carries a `geo` sub-record
pub fn sample_posts() -> Value {
    json!([
        {
            "id": "1", "author_id": "a", "text": "Rust news today", "lang": "en",
            "conversation_id": "1", "created_at": "2022-11-07T10:00:00.000Z",
            "entities": {
                "hashtags": [{"start": 0, "end": 4, "tag": "News"}, {"start": 5, "end": 9, "tag": "Rust"}],
                "mentions": [{"id": "b", "username": "carol"}],
                "urls": [{"url": "https://t.co/x", "expanded_url": "https://rust-lang.org"}],
                "annotations": [{"type": "Product", "normalized_text": "Rust"}]
            },
            "public_metrics": {"retweet_count": 5, "reply_count": 1, "like_count": 10, "quote_count": 0, "impression_count": 100},
            "context_annotations": [
                {"domain": {"id": "1"}, "entity": {"id": "10", "name": "News"}},
                {"domain": {"id": "2"}, "entity": {"id": "11", "name": "Tech"}},
                {"domain": {"id": "3"}, "entity": {"id": "10", "name": "News"}}
            ],
            "referenced_tweets": [{"type": "quoted", "id": "99"}]
        },
        {
            "id": "2", "author_id": "b", "text": "music night", "lang": "en",
            "conversation_id": "1", "created_at": "2022-11-09T20:00:00.000Z",
            "entities": {"hashtags": [{"tag": "music"}]},
            "public_metrics": {"retweet_count": 2, "reply_count": 3, "like_count": 30, "quote_count": 1, "impression_count": 50},
            "context_annotations": []
        },
        {
            "id": "1", "author_id": "a", "text": "duplicate of 1", "lang": "en",
            "conversation_id": "1", "created_at": "2022-11-07T10:00:00.000Z",
            "public_metrics": {"retweet_count": 999}
        },
        {
            "id": "4", "author_id": "zzz", "text": "orphan", "lang": "en",
            "conversation_id": "4", "created_at": "2022-11-08T10:00:00.000Z",
            "public_metrics": {"retweet_count": 1000}
        },
        {
            "id": "5", "author_id": "a", "text": "more news", "lang": "fr",
            "conversation_id": "5", "created_at": "2022-11-15T08:00:00.000Z",
            "entities": {"hashtags": [{"tag": "news"}]},
            "public_metrics": {"retweet_count": 1, "reply_count": 0, "like_count": 2, "quote_count": 0, "impression_count": 7},
            "geo": {"place_id": "p1"}
        }
    ])
}

/// Raw authors for the "australia" location; the second "a" is a duplicate and must lose.
pub fn sample_users() -> Value {
    json!([
        {
            "id": "a", "name": "Bob", "username": "bob", "verified": true,
            "created_at": "2010-01-01T00:00:00.000Z", "location": "Sydney",
            "url": "https://bob.example", "entities": {"url": {}},
            "public_metrics": {"followers_count": 100, "following_count": 5, "tweet_count": 50, "listed_count": 1}
        },
        {
            "id": "b", "name": "Carol", "username": "carol", "verified": false,
            "created_at": "2012-05-05T00:00:00.000Z",
            "public_metrics": {"followers_count": 500, "following_count": 9, "tweet_count": 70, "listed_count": 2}
        },
        {
            "id": "a", "name": "Mallory", "username": "mallory", "verified": false,
            "created_at": "2020-01-01T00:00:00.000Z",
            "public_metrics": {"followers_count": 1, "following_count": 1, "tweet_count": 1, "listed_count": 0}
        }
    ])
}

/// Data dir with:
/// - `australia/` valid inputs ([`sample_posts`], [`sample_users`])
/// - `texas/` a posts file that is not JSON
/// - `europe/` valid authors but a post without `id`
/// - `sydney/` valid posts, plus an author without `id` among the authors
pub fn make_locations_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    write_json(&base.join("australia").join("sample_tweets.json"), &sample_posts());
    write_json(&base.join("australia").join("sample_users.json"), &sample_users());

    write_raw(&base.join("texas").join("sample_tweets.json"), "{ not json");
    write_json(&base.join("texas").join("sample_users.json"), &sample_users());

    let mut posts = sample_posts();
    if let Value::Array(items) = &mut posts {
        items.push(json!({"author_id": "a", "text": "no id"}));
    }
    write_json(&base.join("europe").join("sample_tweets.json"), &posts);
    write_json(&base.join("europe").join("sample_users.json"), &sample_users());

    let mut users = sample_users();
    if let Value::Array(items) = &mut users {
        items.insert(0, json!({"username": "nobody"}));
    }
    write_json(&base.join("sydney").join("sample_tweets.json"), &sample_posts());
    write_json(&base.join("sydney").join("sample_users.json"), &users);

    base
}

/// Cleaned-style records used by the aggregation tests.
///
/// | # | username | verified | followers | hashtags       | context          | retweets | created_at  |
/// |---|----------|----------|-----------|----------------|------------------|----------|-------------|
/// | 0 | bob      | true     | 100       | "News, Rust"   | "News, Tech"     | 5        | 2022-11-07  |
/// | 1 | carol    | false    | 500       | "music"        | false            | 2        | 2022-11-09  |
/// | 2 | bob      | true     | 100       | "news"         | false            | 1        | 2022-11-15  |
/// | 3 | dave     | false    | 50        | ""             | "Music, News"    | 5        | 2022-12-01  |
/// | 4 | erin     | null     | 500       | "C++, news"    | "Tech"           | 0        | null        |
pub fn sample_records() -> Vec<CleanedRecord> {
    records(json!([
        {"id": "1", "username": "bob", "verified": true, "followers_count": 100, "hashtags": "News, Rust",
         "context_annotations": "News, Tech", "retweet_count": 5, "like_count": 10, "lang": "en",
         "created_at": "2022-11-07T10:00:00.000Z", "text": "Rust news today"},
        {"id": "2", "username": "carol", "verified": false, "followers_count": 500, "hashtags": "music",
         "context_annotations": false, "retweet_count": 2, "like_count": 30, "lang": "en",
         "created_at": "2022-11-09T20:00:00.000Z", "text": "music night"},
        {"id": "5", "username": "bob", "verified": true, "followers_count": 100, "hashtags": "news",
         "context_annotations": false, "retweet_count": 1, "like_count": 2, "lang": "fr",
         "created_at": "2022-11-15T08:00:00.000Z", "text": "more news"},
        {"id": "6", "username": "dave", "verified": false, "followers_count": 50, "hashtags": "",
         "context_annotations": "Music, News", "retweet_count": 5, "like_count": 1, "lang": "und",
         "created_at": "2022-12-01T00:00:00.000Z", "text": "plain"},
        {"id": "7", "username": "erin", "verified": null, "followers_count": 500, "hashtags": "C++, news",
         "context_annotations": "Tech", "retweet_count": 0, "like_count": 0, "lang": "en",
         "created_at": null, "text": "cpp news"}
    ]))
}
