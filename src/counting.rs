//! Small reducers used by the reports: an insertion-ordered counter and the
//! comma tokenizer for joined columns.

use ahash::AHashMap;
use serde_json::Value;

/// Frequency counter that remembers first-seen order, so rankings break ties
/// by which key showed up first.
#[derive(Clone, Debug, Default)]
pub struct Counter {
    index: AHashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        self.add_n(key, 1);
    }

    pub fn add_n(&mut self, key: &str, n: u64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), n));
            }
        }
    }

    pub fn get(&self, key: &str) -> u64 {
        self.index.get(key).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn remove(&mut self, key: &str) -> Option<u64> {
        let i = self.index.remove(key)?;
        let (_, n) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(n)
    }

    /// Descending by count; equal counts keep first-seen order. `None` returns everything.
    pub fn most_common(&self, n: Option<usize>) -> Vec<(String, u64)> {
        let mut v = self.entries.clone();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(n) = n {
            v.truncate(n);
        }
        v
    }

    pub fn into_entries(self) -> Vec<(String, u64)> {
        self.entries
    }
}

// `index` is derived from `entries`.
impl PartialEq for Counter {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Counter {}

impl<'a> Extend<&'a str> for Counter {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for k in iter {
            self.add(k);
        }
    }
}

/// Split a joined cell on `,`, trim, lowercase and drop empty tokens.
/// Non-string cells (null, the `false` sentinel, numbers) yield nothing.
pub fn tokenize(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
