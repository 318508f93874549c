use crate::json_io::read_rows;
use crate::json_utils::row_key;
use crate::paths::plan_locations;
use crate::progress::{finish, maybe_count_progress, tick};
use crate::util::init_tracing_once;
use crate::TweetETL;
use std::path::PathBuf;

/// How deep to look at location inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrityMode {
    /// Only check that both input files exist.
    Quick,
    /// Parse both documents and check every record carries its id
    /// (`id` for posts and authors, `author_id` for posts).
    Full,
}

impl TweetETL {
    /// Check every configured location's inputs. Returns `(path, problem)` for each issue
    /// found; an empty list means every location is ready to clean.
    ///
    /// A post missing `author_id` is reported but is not fatal when cleaning; such
    /// posts are simply dropped by the join.
    pub fn check_inputs(&self, mode: IntegrityMode) -> Vec<(PathBuf, String)> {
        init_tracing_once();
        let jobs = plan_locations(&self.opts);
        let label = match mode {
            IntegrityMode::Quick => "Inputs (quick)",
            IntegrityMode::Full => "Inputs (full)",
        };
        let pb = maybe_count_progress(self.opts.progress, jobs.len() as u64, label);

        let mut problems = Vec::new();
        for job in &jobs {
            for (path, id_fields) in [(&job.tweets_path, &["id", "author_id"][..]), (&job.users_path, &["id"][..])] {
                if !path.is_file() {
                    problems.push((path.clone(), "missing input file".to_string()));
                    continue;
                }
                if mode == IntegrityMode::Quick {
                    continue;
                }
                match read_rows(path) {
                    Err(e) => problems.push((path.clone(), format!("{e:#}"))),
                    Ok(rows) => {
                        for field in id_fields {
                            let missing = rows.iter().filter(|r| row_key(r, field).is_none()).count();
                            if missing > 0 {
                                problems.push((path.clone(), format!("{missing} records without `{field}`")));
                            }
                        }
                    }
                }
            }
            tick(&pb);
        }
        finish(pb, "done");
        problems
    }
}
