//! Approximate ranking of candidate labels against a free-text query.
//!
//! Text is cut into *fuzzy parts*: lowercase tokens of at least two
//! characters, with tokens longer than two characters expanded into their
//! overlapping two-character windows. A candidate scores one point for every
//! distinct query part it contains; candidates are then ordered by
//! descending score, ties keeping their input order.
//!
//! # Example
//!
//! ```
//! use subscout_core::fuzzy::Ranking;
//!
//! let mut labels = vec!["Unrelated Title", "The Matrix Reloaded"];
//! let ranking = Ranking::compute("the matrix", &labels);
//! ranking.apply(&mut labels);
//! assert_eq!(labels[0], "The Matrix Reloaded");
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};

/// Window length used to split longer tokens.
pub const FUZZY_LENGTH: usize = 2;

/// Characters trimmed from both ends of every token.
const TRIMMED: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*', '=', '.', '/', ','];

/// Splits `text` into its fuzzy parts, in order, duplicates kept.
///
/// ```
/// use subscout_core::fuzzy::fuzzy_parts;
///
/// assert_eq!(fuzzy_parts("The x, TV!"), vec!["th", "he", "tv"]);
/// ```
#[must_use]
pub fn fuzzy_parts(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut parts = Vec::new();

    for token in lowered.split_whitespace() {
        let chars: Vec<char> = token.trim_matches(TRIMMED).chars().collect();
        if chars.len() < FUZZY_LENGTH {
            continue;
        }
        if chars.len() == FUZZY_LENGTH {
            parts.push(chars.iter().collect());
            continue;
        }
        parts.extend(chars.windows(FUZZY_LENGTH).map(|w| w.iter().collect::<String>()));
    }

    parts
}

/// Scores and stable order of a candidate list for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    scores: Vec<u32>,
    order: Vec<usize>,
}

impl Ranking {
    /// Scores every label against `query`.
    #[must_use]
    pub fn compute<S: AsRef<str>>(query: &str, labels: &[S]) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, label) in labels.iter().enumerate() {
            for part in fuzzy_parts(label.as_ref()) {
                let candidates = index.entry(part).or_default();
                // Candidates are visited in order, so duplicates are adjacent.
                if candidates.last() != Some(&i) {
                    candidates.push(i);
                }
            }
        }

        let mut scores = vec![0_u32; labels.len()];
        let query_parts = fuzzy_parts(query);
        let unique: HashSet<&str> = query_parts.iter().map(String::as_str).collect();
        for part in unique {
            if let Some(candidates) = index.get(part) {
                for &i in candidates {
                    scores[i] += 1;
                }
            }
        }

        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));
        trace!(query, candidates = labels.len(), ?scores, "computed ranking");

        Self { scores, order }
    }

    /// Scores in input order.
    #[must_use]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Input indices in ranked order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Scores in ranked order (non-increasing).
    #[must_use]
    pub fn ranked_scores(&self) -> Vec<u32> {
        self.order.iter().map(|&i| self.scores[i]).collect()
    }

    /// Number of ranked candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there were no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reorders a container co-indexed with the ranked labels.
    ///
    /// Containers of a different length are left untouched.
    pub fn apply<T>(&self, items: &mut Vec<T>) {
        if items.len() != self.order.len() {
            warn!(
                expected = self.order.len(),
                actual = items.len(),
                "container length differs from ranking, not reordered"
            );
            return;
        }

        let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
        items.extend(
            self.order
                .iter()
                .filter_map(|&i| slots.get_mut(i).and_then(Option::take)),
        );
    }
}

/// Ranks `items` in place by the label each one yields, returning the ranking.
pub fn rank_by<T, F>(query: &str, items: &mut Vec<T>, label: F) -> Ranking
where
    F: Fn(&T) -> String,
{
    let labels: Vec<String> = items.iter().map(label).collect();
    let ranking = Ranking::compute(query, &labels);
    ranking.apply(items);
    ranking
}
