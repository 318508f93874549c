use std::path::{Path, PathBuf};

/// Locations cleaned when the caller does not pick any.
pub const DEFAULT_LOCATIONS: [&str; 5] = ["australia", "mumbai", "northamerica", "europe", "texas"];

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ETLOptions {
    pub data_dir: PathBuf,             // <data_dir>/<location>/<tweets_file|users_file>
    pub cleaned_dir: PathBuf,          // <cleaned_dir>/<location>_tweets.json
    pub locations: Vec<String>,        // normalized lowercase, deduped, order kept
    pub tweets_file: String,
    pub users_file: String,
    pub location_concurrency: usize,   // locations processed at once (1 = sequential)
    pub progress: bool,                // show progress bars
    pub progress_label: Option<String>,

    // output formatting
    pub pretty: bool,                  // pretty-print cleaned JSON
    pub compress_output: bool,         // write `<location>_tweets.json.zst`

    // below this fraction of free RAM a warning is logged before loading a location
    pub low_memory_frac: f64,
}

impl Default for ETLOptions {
    fn default() -> Self {
        let data = PathBuf::from("../data/sample");
        Self {
            cleaned_dir: data.join("cleaned"),
            data_dir: data,
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            tweets_file: "sample_tweets.json".to_string(),
            users_file: "sample_users.json".to_string(),
            location_concurrency: 1,
            progress: true,
            progress_label: None,
            pretty: false,
            compress_output: false,
            low_memory_frac: 0.10,
        }
    }
}

impl ETLOptions {
    /// Sets the input root; the cleaned dir follows it unless set explicitly afterwards.
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let base = dir.as_ref().to_path_buf();
        self.cleaned_dir = base.join("cleaned");
        self.data_dir = base;
        self
    }
    pub fn with_cleaned_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cleaned_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut v: Vec<String> = Vec::new();
        for loc in locations {
            let n = normalize_location(loc.as_ref());
            if !n.is_empty() && !v.contains(&n) {
                v.push(n);
            }
        }
        self.locations = v;
        self
    }
    pub fn with_input_files(mut self, tweets_file: impl Into<String>, users_file: impl Into<String>) -> Self {
        self.tweets_file = tweets_file.into();
        self.users_file = users_file.into();
        self
    }
    pub fn with_location_concurrency(mut self, n: usize) -> Self {
        self.location_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }
    pub fn with_compressed_output(mut self, yes: bool) -> Self {
        self.compress_output = yes;
        self
    }
    pub fn with_low_memory_frac(mut self, frac: f64) -> Self {
        self.low_memory_frac = frac.clamp(0.0, 1.0);
        self
    }
}

/// Options for the chart/report pass over one cleaned file.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub keyword_column: String,        // column searched for keywords (hashtags by default)
    pub keywords: Vec<String>,
    pub relevant_contexts: Vec<String>,
    pub word_cloud_columns: Vec<String>,
    pub max_words: usize,
    pub stop_words: Vec<String>,
    pub n_lang: Option<usize>,
    pub language_names: bool,          // label the language pie with names instead of codes
    pub popular_users: usize,
    pub bucket: crate::date::Bucket,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            keyword_column: "hashtags".to_string(),
            keywords: Vec::new(),
            relevant_contexts: Vec::new(),
            word_cloud_columns: vec!["hashtags".to_string(), "context_annotations".to_string()],
            max_words: 50,
            stop_words: Vec::new(),
            n_lang: None,
            language_names: true,
            popular_users: 50,
            bucket: crate::date::Bucket::Week,
        }
    }
}

impl ReportOptions {
    pub fn with_keyword_column(mut self, column: impl Into<String>) -> Self {
        self.keyword_column = column.into();
        self
    }
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_relevant_contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relevant_contexts = contexts.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_word_cloud_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.word_cloud_columns = columns.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_max_words(mut self, n: usize) -> Self {
        self.max_words = n.max(1);
        self
    }
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_n_lang(mut self, n: usize) -> Self {
        self.n_lang = Some(n);
        self
    }
    pub fn with_language_names(mut self, yes: bool) -> Self {
        self.language_names = yes;
        self
    }
    pub fn with_popular_users(mut self, n: usize) -> Self {
        self.popular_users = n;
        self
    }
    pub fn with_bucket(mut self, bucket: crate::date::Bucket) -> Self {
        self.bucket = bucket;
        self
    }
}

#[inline]
pub fn normalize_location(s: &str) -> String {
    s.trim().to_lowercase()
}
