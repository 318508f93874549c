use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tetl::{
    init_tracing_once, set_global_multiprogress, IntegrityMode, JsonChartSink, ReportOptions, TweetETL,
    DEFAULT_LOCATIONS,
};

const DATA_ROOT: &str = "../data/sample";
const CLEANED_ROOT: &str = "../data/sample/cleaned";
const CHARTS_ROOT: &str = "../data/sample/charts";

fn main() -> Result<()> {
    init_tracing_once();
    set_global_multiprogress(Arc::new(indicatif::MultiProgress::new()));

    let etl = TweetETL::new()
        .data_dir(PathBuf::from(DATA_ROOT))
        .cleaned_dir(PathBuf::from(CLEANED_ROOT))
        .locations(DEFAULT_LOCATIONS)
        .progress(true);

    for (path, problem) in etl.check_inputs(IntegrityMode::Quick) {
        tracing::warn!(path = %path.display(), "{problem}");
    }

    let run = etl.clean_all();
    for s in &run.completed {
        println!(
            "{} unique tweets and overall {} tweets cleaned for {}",
            s.stats.unique_conversations, s.stats.records, s.location
        );
    }

    let keywords = ["news", "music", "sport", "politics"];
    for (location, path) in etl.cleaned_outputs() {
        let report = ReportOptions::default()
            .with_keywords(keywords)
            .with_relevant_contexts(["news", "music"])
            .with_n_lang(10);
        let mut sink = JsonChartSink::new(PathBuf::from(CHARTS_ROOT).join(&location));
        let summary = etl.report_file(&path, report, &mut sink)?;

        println!("\n== {location}: {} charts written", summary.charts.len());
        for top in &summary.top_posts {
            let value = top.value.map(|v| v.to_string()).unwrap_or_default();
            println!(
                "\nFollowing is the {} authored by {} with {} of {}\n {}",
                top.label,
                top.username.as_deref().unwrap_or("?"),
                top.metric.replace('_', " "),
                value,
                top.text.as_deref().unwrap_or("")
            );
        }
        if !summary.relevant_hashtags.is_empty() {
            println!("\n{:?}", summary.relevant_hashtags);
        }
        if !summary.popular_users.is_empty() {
            println!("\nPopular users: {}", summary.popular_users.join(", "));
        }
    }

    if !run.is_success() {
        for (location, err) in &run.failed {
            eprintln!("{location}: {err}");
        }
        bail!("{} of {} locations failed", run.failed.len(), run.failed.len() + run.completed.len());
    }
    Ok(())
}
