use crate::config::ETLOptions;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Inputs and output of one location's cleaning run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationJob {
    pub location: String,
    pub tweets_path: PathBuf,
    pub users_path: PathBuf,
    pub out_path: PathBuf,
}

/// `<location>_tweets.json`, or `.json.zst` when compressing.
pub fn cleaned_file_name(location: &str, compressed: bool) -> String {
    if compressed {
        format!("{location}_tweets.json.zst")
    } else {
        format!("{location}_tweets.json")
    }
}

pub fn plan_locations(opts: &ETLOptions) -> Vec<LocationJob> {
    opts.locations
        .iter()
        .map(|loc| {
            let dir = opts.data_dir.join(loc);
            LocationJob {
                location: loc.clone(),
                tweets_path: dir.join(&opts.tweets_file),
                users_path: dir.join(&opts.users_file),
                out_path: opts.cleaned_dir.join(cleaned_file_name(loc, opts.compress_output)),
            }
        })
        .collect()
}

/// Cleaned outputs found directly under `dir`, as `(location, path)` sorted by location.
pub fn discover_cleaned(dir: &Path) -> Vec<(String, PathBuf)> {
    let re = match Regex::new(r"^(.+)_tweets\.json(\.zst)?$") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let mut found = Vec::new();
    if !dir.exists() {
        return found;
    }
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !ent.file_type().is_file() {
            continue;
        }
        if let Some(name) = ent.file_name().to_str() {
            if let Some(caps) = re.captures(name) {
                found.push((caps[1].to_string(), ent.path().to_path_buf()));
            }
        }
    }
    found.sort();
    found
}
