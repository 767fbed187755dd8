//! Fuzzy track search.
//!
//! [`FuzzyBackend`] is the pluggable matcher; [`SearchIndex`] wraps any
//! backend and enforces the list view's contract on its output.

use strsim::normalized_levenshtein;
use tracing::debug;

use cybotify_proto::model::Track;

use crate::error::NotReadyError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub score: f64,
}

/// One searchable record. Fields are matched independently; the best field
/// wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    pub fields: Vec<String>,
}

impl SearchDocument {
    pub fn for_track(track: &Track) -> Self {
        Self {
            fields: vec![track.name.clone(), track.artists_joined()],
        }
    }
}

pub trait FuzzyBackend {
    /// Replace the corpus. `tolerance` in [0, 1]: 0 accepts only exact
    /// substrings, 1 accepts everything.
    fn build(&mut self, corpus: Vec<SearchDocument>, tolerance: f64);

    /// Matches for a non-empty query. Ordering and uniqueness are not
    /// guaranteed; [`SearchIndex`] normalises them.
    fn query(&self, text: &str) -> Vec<SearchHit>;
}

/// Default backend: case-insensitive, substring hits first, then the best
/// normalised Levenshtein similarity against same-width token windows.
#[derive(Debug, Default)]
pub struct SimilarityBackend {
    corpus: Vec<Vec<String>>,
    tolerance: f64,
}

impl FuzzyBackend for SimilarityBackend {
    fn build(&mut self, corpus: Vec<SearchDocument>, tolerance: f64) {
        self.corpus = corpus
            .into_iter()
            .map(|doc| doc.fields.iter().map(|f| f.to_lowercase()).collect())
            .collect();
        self.tolerance = tolerance.clamp(0.0, 1.0);
    }

    fn query(&self, text: &str) -> Vec<SearchHit> {
        let query = text.trim().to_lowercase();
        let accept = 1.0 - self.tolerance;
        self.corpus
            .iter()
            .enumerate()
            .filter_map(|(position, fields)| {
                let score = fields
                    .iter()
                    .map(|f| field_score(&query, f))
                    .fold(0.0_f64, f64::max);
                (score >= accept).then_some(SearchHit { position, score })
            })
            .collect()
    }
}

fn field_score(query: &str, field: &str) -> f64 {
    if query.is_empty() || field.is_empty() {
        return 0.0;
    }
    if field.starts_with(query) {
        return 1.0;
    }
    if field.contains(query) {
        return 0.9;
    }

    let width = query.split_whitespace().count().max(1);
    let tokens: Vec<&str> = field.split_whitespace().collect();
    let mut best = normalized_levenshtein(query, field);
    if tokens.len() >= width {
        for window in tokens.windows(width) {
            let candidate = window.join(" ");
            best = best.max(normalized_levenshtein(query, &candidate));
        }
    }
    best
}

pub struct SearchIndex<B: FuzzyBackend = SimilarityBackend> {
    backend: B,
    tolerance: f64,
    len: Option<usize>,
}

#[cfg(test)]
impl SearchIndex<SimilarityBackend> {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self::new(SimilarityBackend::default(), tolerance)
    }
}

impl<B: FuzzyBackend> SearchIndex<B> {
    pub fn new(backend: B, tolerance: f64) -> Self {
        Self {
            backend,
            tolerance,
            len: None,
        }
    }

    /// (Re)index `tracks`. Must be called whenever the track sequence changes.
    pub fn build(&mut self, tracks: &[Track]) {
        let corpus = tracks.iter().map(SearchDocument::for_track).collect();
        self.backend.build(corpus, self.tolerance);
        self.len = Some(tracks.len());
        debug!("search index built over {} tracks", tracks.len());
    }

    pub fn reset(&mut self) {
        self.backend.build(Vec::new(), self.tolerance);
        self.len = None;
    }

    /// Ranked track positions for `text`.
    ///
    /// Empty or whitespace-only text is the identity filter and yields every
    /// position in original order. Otherwise positions are unique, inside
    /// `0..N`, best match first, ties in original order.
    pub fn query(&self, text: &str) -> Result<Vec<usize>, NotReadyError> {
        let len = self.len.ok_or(NotReadyError)?;
        if text.trim().is_empty() {
            return Ok((0..len).collect());
        }

        let mut hits: Vec<SearchHit> = self
            .backend
            .query(text)
            .into_iter()
            .filter(|h| h.position < len && h.score.is_finite())
            .collect();
        // Stable: equal scores keep position order.
        hits.sort_by_key(|h| h.position);
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = vec![false; len];
        Ok(hits
            .into_iter()
            .filter(|h| !std::mem::replace(&mut seen[h.position], true))
            .map(|h| h.position)
            .collect())
    }
}
