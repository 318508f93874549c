//! Report pass over one cleaned record set: computes chart data and hands it to a
//! [`ChartSink`]. Drawing pixels or HTML is the sink's business, not ours.

use crate::aggregate::{
    count_by_keyword, language_counts, most_common_filtered, popular_users, time_series_counts, top_posts,
    verified_proportion, word_cloud_weights, TopPost,
};
use crate::config::ReportOptions;
use crate::counting::Counter;
use crate::date::format_date;
use crate::lang::language_name;
use crate::record::CleanedRecord;
use crate::util::{create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LANGUAGE_NOTE: &str =
    "Note- qht: Tweets with hashtags only | qam: Tweets with mentions only | qme: Tweets with media links";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub title: String,
    pub slices: Vec<Slice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Point {
    pub period_start: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Finished chart data, ready for a renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Pie { title: String, slices: Vec<Slice>, note: Option<String> },
    /// One pie per panel, laid out as a grid.
    PieGrid { title: String, panels: Vec<Panel> },
    StackedBars { title: String, y_title: String, series: Vec<Series> },
    WordCloud { title: String, weights: Vec<Slice> },
}

/// Rendering collaborator.
pub trait ChartSink {
    fn render(&mut self, name: &str, chart: &Chart) -> Result<()>;
}

/// Writes each chart as `<dir>/<name>.json`.
pub struct JsonChartSink {
    dir: PathBuf,
    pretty: bool,
}

impl JsonChartSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), pretty: true }
    }
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl JsonChartSink {
    fn write_tmp(&self, tmp: &Path, chart: &Chart) -> Result<()> {
        let f = create_with_backoff(tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = BufWriter::new(f);
        if self.pretty {
            serde_json::to_writer_pretty(&mut w, chart)?;
        } else {
            serde_json::to_writer(&mut w, chart)?;
        }
        w.flush()?;
        Ok(())
    }
}

impl ChartSink for JsonChartSink {
    fn render(&mut self, name: &str, chart: &Chart) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let out = self.path_for(name);
        let tmp = self.dir.join(format!("{name}.json.inprogress"));
        let res = self.write_tmp(&tmp, chart).and_then(|()| replace_file_atomic_backoff(&tmp, &out));
        if res.is_err() {
            let _ = remove_with_backoff(&tmp, 4, 50);
            return res.with_context(|| format!("writing chart {}", out.display()));
        }
        tracing::debug!(chart = name, path = %out.display(), "chart written");
        Ok(())
    }
}

fn slices(pairs: Vec<(String, u64)>) -> Vec<Slice> {
    pairs.into_iter().map(|(label, value)| Slice { label, value }).collect()
}

/// What a full report pass produced besides the charts themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportSummary {
    pub charts: Vec<String>,
    pub top_posts: Vec<TopPost>,
    pub popular_users: Vec<String>,
    pub relevant_hashtags: Vec<(String, u64)>,
}

/// Drives the chart set for one cleaned record set.
pub struct Reporter<'a> {
    records: &'a [CleanedRecord],
    opts: ReportOptions,
}

impl<'a> Reporter<'a> {
    pub fn new(records: &'a [CleanedRecord], opts: ReportOptions) -> Self {
        Self { records, opts }
    }

    fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|r| r.has_column(column))
    }

    /// One pie per keyword: verified vs unverified authors among matching records.
    pub fn verified_proportion_chart<S: AsRef<str>>(&self, column: &str, keywords: &[S]) -> Result<Chart> {
        let mut panels = Vec::with_capacity(keywords.len());
        for kw in keywords {
            let kw = kw.as_ref();
            let counts = verified_proportion(self.records, column, kw)?;
            panels.push(Panel {
                title: kw.chars().take(15).collect(),
                slices: counts.into_iter().map(|(flag, value)| Slice { label: flag.to_string(), value }).collect(),
            });
        }
        Ok(Chart::PieGrid { title: format!("verified user proportion based on {column}").to_uppercase(), panels })
    }

    /// Stacked bars of matching records per period, one series per keyword.
    pub fn time_series_chart<S: AsRef<str>>(&self, column: &str, keywords: &[S]) -> Result<Chart> {
        let mut series = Vec::with_capacity(keywords.len());
        for kw in keywords {
            let kw = kw.as_ref();
            let points = time_series_counts(self.records, column, kw, self.opts.bucket)?
                .into_iter()
                .map(|(d, count)| Point { period_start: format_date(d), count })
                .collect();
            series.push(Series { name: kw.to_string(), points });
        }
        Ok(Chart::StackedBars { title: column.to_uppercase(), y_title: "tweets count".to_string(), series })
    }

    pub fn word_cloud_chart(&self, column: &str) -> Result<Chart> {
        let weights = word_cloud_weights(self.records, column, self.opts.max_words, &self.opts.stop_words)?;
        Ok(Chart::WordCloud { title: column.to_string(), weights: slices(weights) })
    }

    /// Language pie, most frequent first. Codes become display names unless
    /// `language_names` is off; codes sharing a name are merged.
    pub fn language_chart(&self) -> Result<Chart> {
        let langs = if self.opts.language_names {
            let mut named = Counter::new();
            for (code, n) in language_counts(self.records, None)? {
                named.add_n(&language_name(&code), n);
            }
            named.most_common(self.opts.n_lang)
        } else {
            language_counts(self.records, self.opts.n_lang)?
        };
        Ok(Chart::Pie {
            title: "language of tweets downloaded".to_uppercase(),
            slices: slices(langs),
            note: Some(LANGUAGE_NOTE.to_string()),
        })
    }

    /// Hashtags used by records whose context annotations mention any of `contexts`.
    pub fn relevant_hashtags<S: AsRef<str>>(&self, contexts: &[S]) -> Result<Vec<(String, u64)>> {
        most_common_filtered(self.records, "context_annotations", contexts, "hashtags", 10)
    }

    /// Render the full chart set through `sink`.
    pub fn run(&self, sink: &mut dyn ChartSink) -> Result<ReportSummary> {
        let mut summary = ReportSummary::default();
        let opts = &self.opts;
        let mut emit = |name: String, chart: Chart, summary: &mut ReportSummary| -> Result<()> {
            sink.render(&name, &chart).with_context(|| format!("rendering chart {name}"))?;
            summary.charts.push(name);
            Ok(())
        };

        if !opts.keywords.is_empty() {
            let col = &opts.keyword_column;
            let counts = count_by_keyword(self.records, col, &opts.keywords)?;
            tracing::info!(column = %col, ?counts, "keyword counts");
            emit(format!("{col}_verified"), self.verified_proportion_chart(col, &opts.keywords)?, &mut summary)?;
            emit(col.clone(), self.time_series_chart(col, &opts.keywords)?, &mut summary)?;
        }

        for col in &opts.word_cloud_columns {
            emit(format!("{col}_wordcloud"), self.word_cloud_chart(col)?, &mut summary)?;
        }

        if self.has_column("lang") {
            emit("languages".to_string(), self.language_chart()?, &mut summary)?;
        } else if !self.records.is_empty() {
            tracing::warn!("no `lang` column; skipping language chart");
        }

        if !opts.relevant_contexts.is_empty() {
            let tags = self.relevant_hashtags(&opts.relevant_contexts)?;
            let chart = Chart::Pie {
                title: "hashtags used in tweets having relevant context annotations".to_uppercase(),
                slices: slices(tags.clone()),
                note: None,
            };
            emit("most_relevant_hashtags".to_string(), chart, &mut summary)?;
            summary.relevant_hashtags = tags;
        }

        summary.top_posts = top_posts(self.records)?;
        if self.has_column("followers_count") {
            summary.popular_users = popular_users(self.records, "followers_count", opts.popular_users)?;
        }
        Ok(summary)
    }
}
