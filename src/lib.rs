mod config;
mod date;
mod paths;
mod json_io;
mod json_utils;

mod record;
mod dedupe;
mod normalize;

mod query;
mod counting;
mod lang;
mod aggregate;
mod report;

mod progress;
mod concurrency;
mod util;
mod mem;
mod pipeline;
mod integrity;

pub use crate::config::{ETLOptions, ReportOptions, DEFAULT_LOCATIONS};
pub use crate::date::{parse_timestamp, Bucket};
pub use crate::pipeline::{LocationSummary, RunReport, TweetETL};
pub use crate::paths::{cleaned_file_name, discover_cleaned, LocationJob};
pub use crate::record::CleanedRecord;

// Normalizer building blocks, usable without touching the filesystem.
pub use crate::normalize::{normalize, rename_author_fields, NormalizeOutput, NormalizeStats, AUTHOR_RENAMES, ENTITY_COLUMNS};
pub use crate::dedupe::{dedupe_by_key, Deduped, MissingKey};
pub use crate::json_utils::{Row, DELIMITER};

// Aggregations and reporting.
pub use crate::aggregate::{
    count_by_keyword, language_counts, most_common_filtered, popular_users, time_series_counts, token_frequency,
    top_by_metric, top_posts, value_counts, verified_proportion, word_cloud_weights, TopPost, TOP_METRICS,
};
pub use crate::counting::{tokenize, Counter};
pub use crate::lang::language_name;
pub use crate::query::KeywordMatcher;
pub use crate::report::{Chart, ChartSink, JsonChartSink, Panel, Point, ReportSummary, Reporter, Series, Slice};

// JSON document I/O (plain or `.zst`).
pub use crate::json_io::{read_records, read_rows, records_from_value, write_records};

// Expose multiprogress and progress helpers.
pub use crate::progress::{make_count_progress, set_global_multiprogress};

// Expose memory helpers for callers sizing their own runs.
pub use crate::mem::{available_memory_fraction, is_low_memory};

pub use crate::integrity::IntegrityMode;
pub use crate::util::init_tracing_once;
