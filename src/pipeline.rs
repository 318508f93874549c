use crate::concurrency::map_locations_limited;
use crate::config::{ETLOptions, ReportOptions};
use crate::json_io::{read_records, read_rows, write_records};
use crate::mem::warn_if_low_memory;
use crate::normalize::{normalize, NormalizeStats};
use crate::paths::{discover_cleaned, plan_locations, LocationJob};
use crate::progress::{finish, maybe_count_progress, tick};
use crate::report::{ChartSink, ReportSummary, Reporter};
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone, Default)]
pub struct TweetETL {
    pub(crate) opts: ETLOptions,
}

/// Outcome of cleaning one location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationSummary {
    pub location: String,
    pub stats: NormalizeStats,
    pub output: PathBuf,
}

/// Outcome of a multi-location run: completed summaries and `(location, error)` failures.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub completed: Vec<LocationSummary>,
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl TweetETL {
    pub fn new() -> Self {
        Self { opts: ETLOptions::default() }
    }

    pub fn with_options(opts: ETLOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ETLOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_data_dir(dir); self }
    pub fn cleaned_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_cleaned_dir(dir); self }
    pub fn locations<I, S>(mut self, locations: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> { self.opts = self.opts.with_locations(locations); self }
    pub fn input_files(mut self, tweets: impl Into<String>, users: impl Into<String>) -> Self { self.opts = self.opts.with_input_files(tweets, users); self }
    pub fn location_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_location_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn pretty(mut self, yes: bool) -> Self { self.opts = self.opts.with_pretty(yes); self }
    pub fn compressed_output(mut self, yes: bool) -> Self { self.opts = self.opts.with_compressed_output(yes); self }
    pub fn low_memory_frac(mut self, frac: f64) -> Self { self.opts = self.opts.with_low_memory_frac(frac); self }

    pub fn jobs(&self) -> Vec<LocationJob> {
        plan_locations(&self.opts)
    }

    /// Clean a single location: read both inputs, normalize, write the output.
    /// Any failure aborts this location without writing a partial file.
    pub fn clean_location(&self, location: &str) -> Result<LocationSummary> {
        init_tracing_once();
        let opts = self.opts.clone().with_locations([location]);
        let job = plan_locations(&opts)
            .into_iter()
            .next()
            .with_context(|| format!("invalid location name {location:?}"))?;
        self.run_job(&job)
    }

    /// Clean every configured location. Failed locations are logged and reported,
    /// the rest still complete.
    pub fn clean_all(&self) -> RunReport {
        init_tracing_once();
        let jobs = self.jobs();
        if jobs.is_empty() {
            tracing::warn!("No locations configured. Nothing to clean.");
        } else {
            tracing::info!("Planned {} locations for cleaning.", jobs.len());
        }

        let label = self.opts.progress_label.as_deref().unwrap_or("Cleaning locations");
        let pb = maybe_count_progress(self.opts.progress && jobs.len() > 1, jobs.len() as u64, label);

        let results = map_locations_limited(&jobs, self.opts.location_concurrency, |job| {
            let res = self.run_job(job);
            tick(&pb);
            (job.location.clone(), res)
        });
        finish(pb, "done");

        let mut report = RunReport::default();
        for (location, res) in results {
            match res {
                Ok(summary) => report.completed.push(summary),
                Err(e) => {
                    let msg = format!("{e:#}");
                    tracing::error!(location = %location, error = %msg, "location failed");
                    report.failed.push((location, msg));
                }
            }
        }
        report
    }

    fn run_job(&self, job: &LocationJob) -> Result<LocationSummary> {
        warn_if_low_memory(&job.location, &[job.tweets_path.as_path(), job.users_path.as_path()], self.opts.low_memory_frac);

        let posts = read_rows(&job.tweets_path).with_context(|| format!("reading posts for {}", job.location))?;
        let authors = read_rows(&job.users_path).with_context(|| format!("reading authors for {}", job.location))?;

        let pb = maybe_count_progress(self.opts.progress, posts.len() as u64, &format!("Cleaning {}", job.location));
        let out = normalize(posts, authors, pb.as_ref()).with_context(|| format!("normalizing {}", job.location))?;
        finish(pb, format!("{} cleaned", job.location));

        write_records(&job.out_path, &out.records, self.opts.pretty)
            .with_context(|| format!("writing {}", job.out_path.display()))?;

        let stats = out.stats;
        if stats.authors_without_id > 0 {
            tracing::warn!(location = %job.location, dropped = stats.authors_without_id, "authors without `id` dropped");
        }
        if stats.orphan_posts > 0 {
            tracing::debug!(location = %job.location, dropped = stats.orphan_posts, "posts without a matching author dropped");
        }
        tracing::info!(
            "{} unique tweets and overall {} tweets cleaned for {}",
            stats.unique_conversations,
            stats.records,
            job.location
        );
        Ok(LocationSummary { location: job.location.clone(), stats, output: job.out_path.clone() })
    }

    /// Cleaned outputs currently present in the cleaned dir.
    pub fn cleaned_outputs(&self) -> Vec<(String, PathBuf)> {
        discover_cleaned(&self.opts.cleaned_dir)
    }

    /// Run the report pass for one cleaned file through `sink`.
    pub fn report_file(&self, cleaned: &Path, report: ReportOptions, sink: &mut dyn ChartSink) -> Result<ReportSummary> {
        init_tracing_once();
        let records = read_records(cleaned)?;
        tracing::info!(path = %cleaned.display(), records = records.len(), "loaded cleaned records");
        Reporter::new(&records, report).run(sink)
    }
}
