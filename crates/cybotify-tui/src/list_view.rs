//! ListView — the filtered + sorted projection of the playlist's tracks.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use cybotify_proto::model::{display_name, Track, TrackId};

use crate::error::ConfigError;
use crate::search::{FuzzyBackend, SearchIndex};
use crate::surface::{ListSink, LIST_CONTAINER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Default,
    Alphabetical,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Alphabetical => "alphabetical",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Default => Self::Alphabetical,
            Self::Alphabetical => Self::Default,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "alphabetical" | "alpha" => Ok(Self::Alphabetical),
            _ => Err(ConfigError::UnknownSortKey(s.to_string())),
        }
    }
}

/// What the user asked to see: filter text and sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filter: String,
    pub sort: SortKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// Index into the playlist's track sequence.
    pub position: usize,
    pub track_id: TrackId,
    pub name: String,
    pub artists: String,
}

impl RenderedRow {
    fn new(position: usize, track: &Track) -> Self {
        Self {
            position,
            track_id: track.id.clone(),
            name: track.name.clone(),
            artists: track.artists_joined(),
        }
    }

    #[cfg(test)]
    pub fn element_id(&self) -> String {
        format!("track{}", self.track_id)
    }

    #[cfg(test)]
    pub fn class(&self) -> &'static str {
        "trackInfo"
    }

    #[cfg(test)]
    pub fn markup(&self) -> String {
        format!("{}<br>{}", self.name, self.artists)
    }
}

pub struct ListView<L: ListSink> {
    sink: L,
    rows: Vec<RenderedRow>,
}

impl<L: ListSink> ListView<L> {
    pub fn new(sink: L) -> Self {
        Self {
            sink,
            rows: Vec::new(),
        }
    }

    /// Pure projection of `tracks` under `view`.
    ///
    /// A non-empty filter before the index is built projects to nothing.
    pub fn project<B: FuzzyBackend>(
        tracks: &[Track],
        view: &ViewState,
        index: &SearchIndex<B>,
    ) -> Vec<RenderedRow> {
        let positions: Vec<usize> = if view.filter.trim().is_empty() {
            (0..tracks.len()).collect()
        } else {
            match index.query(&view.filter) {
                Ok(positions) => positions,
                Err(e) => {
                    debug!("filter {:?} ignored: {}", view.filter, e);
                    Vec::new()
                }
            }
        };

        let mut rows: Vec<RenderedRow> = positions
            .into_iter()
            .filter_map(|p| tracks.get(p).map(|t| RenderedRow::new(p, t)))
            .collect();

        if view.sort == SortKey::Alphabetical {
            // `sort_by` is stable; equal names keep their relative order.
            rows.sort_by(|a, b| display_name(&a.name).cmp(display_name(&b.name)));
        }
        rows
    }

    /// Project and swap the complete row set into the sink.
    pub fn render<B: FuzzyBackend>(
        &mut self,
        tracks: &[Track],
        view: &ViewState,
        index: &SearchIndex<B>,
    ) -> &[RenderedRow] {
        let rows = Self::project(tracks, view, index);
        self.sink.replace_rows(LIST_CONTAINER, &rows);
        self.rows = rows;
        &self.rows
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.sink.replace_rows(LIST_CONTAINER, &[]);
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    #[cfg(test)]
    pub fn sink(&self) -> &L {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RowBuffer;

    fn tracks() -> Vec<Track> {
        vec![
            Track::new(1u64, "beta", &["X"]),
            Track::new(2u64, "Alpha", &["Y", "Z"]),
            Track::new(3u64, "", &["Nobody"]),
            Track::new(4u64, "Alpha", &["W"]),
            Track::new(5u64, "Velvet", &["Q"]),
        ]
    }

    fn built(tracks: &[Track]) -> SearchIndex {
        let mut index = SearchIndex::with_tolerance(0.4);
        index.build(tracks);
        index
    }

    fn ids(rows: &[RenderedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.track_id.as_str()).collect()
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Alphabetical".parse::<SortKey>(), Ok(SortKey::Alphabetical));
        assert_eq!(" alpha ".parse::<SortKey>(), Ok(SortKey::Alphabetical));
        assert_eq!("DEFAULT".parse::<SortKey>(), Ok(SortKey::Default));
        assert_eq!(
            "Chronological".parse::<SortKey>(),
            Err(ConfigError::UnknownSortKey("Chronological".to_string()))
        );
    }

    #[test]
    fn test_empty_filter_keeps_original_order() {
        let t = tracks();
        let rows = ListView::<RowBuffer>::project(&t, &ViewState::default(), &built(&t));
        assert_eq!(ids(&rows), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_alphabetical_is_stable_and_ordinal() {
        let t = tracks();
        let view = ViewState {
            filter: String::new(),
            sort: SortKey::Alphabetical,
        };
        let rows = ListView::<RowBuffer>::project(&t, &view, &built(&t));
        // Upper case sorts before lower case; "" compares as "Untitled".
        assert_eq!(ids(&rows), vec!["2", "4", "3", "5", "1"]);
        // The row itself keeps the raw name.
        assert_eq!(rows[2].name, "");
    }

    #[test]
    fn test_filter_rows_come_from_query() {
        let t = tracks();
        let index = built(&t);
        let view = ViewState {
            filter: "alpha".to_string(),
            sort: SortKey::Default,
        };
        let rows = ListView::<RowBuffer>::project(&t, &view, &index);
        let allowed = index.query("alpha").unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| allowed.contains(&r.position)));
        assert_eq!(ids(&rows), vec!["2", "4"]);
    }

    #[test]
    fn test_filter_before_index_is_empty_view() {
        let t = tracks();
        let view = ViewState {
            filter: "alpha".to_string(),
            sort: SortKey::Default,
        };
        let rows = ListView::<RowBuffer>::project(&t, &view, &SearchIndex::with_tolerance(0.4));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_row_markup() {
        let t = tracks();
        let rows = ListView::<RowBuffer>::project(&t, &ViewState::default(), &built(&t));
        assert_eq!(rows[1].markup(), "Alpha<br>Y, Z");
        assert_eq!(rows[1].element_id(), "track2");
        assert_eq!(rows[1].class(), "trackInfo");
    }

    #[test]
    fn test_render_swaps_rows_into_sink() {
        let t = tracks();
        let index = built(&t);
        let mut view = ListView::new(RowBuffer::default());
        view.render(&t, &ViewState::default(), &index);
        assert_eq!(view.sink().rows.len(), 5);
        let narrowed = ViewState {
            filter: "velvet".to_string(),
            sort: SortKey::Default,
        };
        view.render(&t, &narrowed, &index);
        assert_eq!(ids(view.sink().rows.as_slice()), vec!["5"]);
        assert_eq!(view.rows(), view.sink().rows.as_slice());
    }
}
