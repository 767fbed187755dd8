//! PlaylistDetailSession — one playlist-detail view from start to teardown.
//!
//! The session owns the playlist, the view state and every derived piece
//! (search index, rendered rows, hover bindings, chart state). Each call runs
//! to completion before the next one, so a render can never interleave with
//! another.

use tracing::{debug, info, warn};

use cybotify_proto::config::Config;
use cybotify_proto::error::ProtocolError;
use cybotify_proto::model::{FeatureVector, Playlist, PlaylistSummary, Track};
use cybotify_proto::protocol::{Stage, StageKind, TrackFeatures};

use crate::error::ConfigError;
use crate::hover::{HoverHandle, HoverLink};
use crate::list_view::{ListView, RenderedRow, SortKey, ViewState};
use crate::radar::RadarController;
use crate::search::{FuzzyBackend, SearchIndex, SimilarityBackend};
use crate::stage::{StageProgress, StageStream};
use crate::surface::{ChartBuffer, ChartSink, ListSink, RowBuffer, TitleBuffer, TitleSink};

pub type TerminalSession = PlaylistDetailSession<ChartBuffer, RowBuffer, TitleBuffer>;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub threshold: f64,
    pub closed_loop: bool,
    pub sort: SortKey,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: config.search.threshold,
            closed_loop: config.view.closed_loop,
            sort: config.view.default_sort.parse()?,
        })
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            closed_loop: true,
            sort: SortKey::Default,
        }
    }
}

pub struct PlaylistDetailSession<C, L, T, B = SimilarityBackend>
where
    C: ChartSink,
    L: ListSink,
    T: TitleSink,
    B: FuzzyBackend,
{
    playlist: Playlist,
    view: ViewState,
    stream: StageStream,
    index: SearchIndex<B>,
    list: ListView<L>,
    hover: HoverLink,
    radar: RadarController<C>,
    title: T,
    active: bool,
}

impl<C, L, T> PlaylistDetailSession<C, L, T, SimilarityBackend>
where
    C: ChartSink,
    L: ListSink,
    T: TitleSink,
{
    pub fn new(playlist_id: u64, chart: C, list: L, title: T, options: &SessionOptions) -> Self {
        Self::with_backend(
            playlist_id,
            chart,
            list,
            title,
            SimilarityBackend::default(),
            options,
        )
    }
}

impl<C, L, T, B> PlaylistDetailSession<C, L, T, B>
where
    C: ChartSink,
    L: ListSink,
    T: TitleSink,
    B: FuzzyBackend,
{
    pub fn with_backend(
        playlist_id: u64,
        chart: C,
        list: L,
        title: T,
        backend: B,
        options: &SessionOptions,
    ) -> Self {
        Self {
            playlist: Playlist {
                id: playlist_id,
                ..Default::default()
            },
            view: ViewState {
                filter: String::new(),
                sort: options.sort,
            },
            stream: StageStream::new(),
            index: SearchIndex::new(backend, options.threshold),
            list: ListView::new(list),
            hover: HoverLink::new(),
            radar: RadarController::new(chart, options.closed_loop),
            title,
            active: false,
        }
    }

    /// Take status, url and timestamp from the index entry that opened this
    /// view. The name still comes from the name stage.
    pub fn adopt_summary(&mut self, summary: &PlaylistSummary) {
        self.playlist.status = summary.status;
        self.playlist.url = summary.url.clone();
        self.playlist.last_updated = Some(summary.last_updated);
    }

    /// Show the zero aggregate right away so the chart is never blank.
    pub fn start(&mut self) {
        self.active = true;
        info!("detail session started for playlist {}", self.playlist.id);
        self.radar.show_aggregate_only();
    }

    /// Decode and apply one raw stream frame. A frame that matches no stage is
    /// logged and dropped; the session keeps waiting for the next one.
    ///
    /// After teardown frames are still classified but never applied.
    pub fn apply_frame(&mut self, text: &str) -> Result<StageKind, ProtocolError> {
        if !self.active {
            let kind = Stage::decode(text)?.kind();
            debug!("{} frame for an inactive session ignored", kind.label());
            return Ok(kind);
        }
        match self.stream.classify_frame(text) {
            Ok(stage) => Ok(self.dispatch(stage)),
            Err(e) => {
                warn!("dropping stage frame: {}", e);
                Err(e)
            }
        }
    }

    /// Apply a stage that was already adapted (fetch driver).
    pub fn apply_stage(&mut self, stage: Stage) -> StageKind {
        let kind = stage.kind();
        if !self.active {
            debug!("{} stage for an inactive session ignored", kind.label());
            return kind;
        }
        self.stream.accept(&stage);
        self.dispatch(stage)
    }

    pub fn set_filter(&mut self, text: &str) {
        if self.view.filter == text {
            return;
        }
        self.view.filter = text.to_string();
        self.rerender();
    }

    /// Explicit "clear". Same path as typing the filter down to nothing.
    pub fn clear_filter(&mut self) {
        self.set_filter("");
    }

    /// Sort by a raw UI control value. Unknown values leave the view as it was.
    pub fn set_sort(&mut self, raw: &str) -> Result<SortKey, ConfigError> {
        let key: SortKey = raw.parse()?;
        self.set_sort_key(key);
        Ok(key)
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.view.sort = key;
        self.rerender();
    }

    /// Returns whether the chart was updated.
    pub fn hover_enter(&mut self, handle: HoverHandle) -> bool {
        match self.hover.resolve(handle).cloned() {
            Some(id) => {
                self.radar.show_overlay(&id);
                true
            }
            None => false,
        }
    }

    /// Returns whether the chart was updated. Handles from discarded rows do
    /// nothing.
    pub fn hover_leave(&mut self, handle: HoverHandle) -> bool {
        if self.hover.resolve(handle).is_none() {
            return false;
        }
        self.radar.clear_overlay();
        true
    }

    pub fn hover_handle(&self, row: usize) -> Option<HoverHandle> {
        self.hover.handle(row)
    }

    #[cfg(test)]
    pub fn hover_handles(&self) -> Vec<Option<HoverHandle>> {
        self.hover.handles()
    }

    /// End of the page view: drop bindings and derived state. Later frames
    /// and stages are ignored.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.hover.clear();
        self.index.reset();
        self.list.clear();
        self.radar.reset();
        info!(
            "detail session for playlist {} torn down ({} frames, {} dropped)",
            self.playlist.id,
            self.stream.received(),
            self.stream.dropped()
        );
    }

    // ── Read access ──────────────────────────────────────────────────────────

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn progress(&self) -> StageProgress {
        self.stream.progress()
    }

    pub fn stream(&self) -> &StageStream {
        &self.stream
    }

    pub fn rows(&self) -> &[RenderedRow] {
        self.list.rows()
    }

    pub fn radar(&self) -> &RadarController<C> {
        &self.radar
    }

    #[cfg(test)]
    pub fn list_sink(&self) -> &L {
        self.list.sink()
    }

    pub fn title_sink(&self) -> &T {
        &self.title
    }

    // ── Stage dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, stage: Stage) -> StageKind {
        let kind = stage.kind();
        debug!("applying {} stage", kind.label());
        match stage {
            Stage::Name(name) => {
                self.playlist.name = name;
                self.title.set_title(self.playlist.display_name());
            }
            Stage::Tracks(tracks) => self.on_tracks(tracks),
            Stage::Features {
                aggregate,
                per_track,
            } => self.on_features(aggregate, &per_track),
        }
        kind
    }

    fn on_tracks(&mut self, mut tracks: Vec<Track>) {
        // Features may have landed first; keep what we already know.
        for track in &mut tracks {
            if let Some(v) = self.radar.features_for(&track.id) {
                track.features = Some(v);
            }
        }
        self.playlist.tracks = tracks;
        self.index.build(&self.playlist.tracks);
        self.rerender();
    }

    fn on_features(&mut self, aggregate: FeatureVector, per_track: &[TrackFeatures]) {
        self.radar.seed(aggregate, per_track);
        for track in &mut self.playlist.tracks {
            track.features = self.radar.features_for(&track.id);
        }
        self.radar.show_aggregate_only();
        self.rebind();
    }

    fn rerender(&mut self) {
        self.list
            .render(&self.playlist.tracks, &self.view, &self.index);
        // The overlaid track must still have a row.
        let orphaned = self
            .radar
            .overlay()
            .is_some_and(|id| !self.list.rows().iter().any(|row| &row.track_id == id));
        if orphaned {
            debug!("overlaid track left the list; showing the aggregate");
            self.radar.clear_overlay();
        }
        self.rebind();
    }

    fn rebind(&mut self) {
        let tracks = &self.playlist.tracks;
        self.hover.bind(self.list.rows(), |row| {
            tracks
                .get(row.position)
                .map_or(false, |t| t.features.is_some())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{RecordingChart, RecordingList, RecordingTitle};
    use crate::surface::SeriesRole;
    use chrono::{TimeZone, Utc};
    use cybotify_proto::model::{PlaylistStatus, TrackId};
    use cybotify_proto::protocol::StageFrame;

    type TestSession = PlaylistDetailSession<RecordingChart, RecordingList, RecordingTitle>;

    fn session() -> TestSession {
        let mut s = PlaylistDetailSession::new(
            1,
            RecordingChart::default(),
            RecordingList::default(),
            RecordingTitle::default(),
            &SessionOptions::default(),
        );
        s.start();
        s
    }

    fn vector(v: f64) -> FeatureVector {
        FeatureVector::from_values([v, v, v, v, v, v, v]).unwrap()
    }

    fn five_tracks() -> Vec<Track> {
        vec![
            Track::new(1u64, "Song A", &["X"]),
            Track::new(2u64, "Night Drive", &["Kavinsky"]),
            Track::new(3u64, "Midnight City", &["M83"]),
            Track::new(4u64, "Night Drive", &["Cover Band"]),
            Track::new(5u64, "", &["Anon"]),
        ]
    }

    fn features_for(ids: &[u64]) -> Stage {
        Stage::Features {
            aggregate: vector(0.5),
            per_track: ids
                .iter()
                .map(|id| TrackFeatures {
                    id: TrackId::from(*id),
                    features: vector(*id as f64 / 10.0),
                })
                .collect(),
        }
    }

    fn loaded() -> TestSession {
        let mut s = session();
        s.apply_stage(Stage::Name("Five".to_string()));
        s.apply_stage(Stage::Tracks(five_tracks()));
        s.apply_stage(features_for(&[1, 2, 3, 4, 5]));
        s
    }

    fn ids(rows: &[RenderedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.track_id.as_str()).collect()
    }

    fn chart_calls(s: &TestSession) -> usize {
        s.radar().sink().calls.len()
    }

    #[test]
    fn test_start_renders_zero_aggregate() {
        let s = session();
        let series = s.radar().sink().last().unwrap();
        assert_eq!(series.len(), 1);
        assert!(series[0].radial_values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_my_mix_scenario_over_stream_frames() {
        let mut s = session();
        let track = Track::new(1u64, "Song A", &["X"]);
        let mut frame = StageFrame {
            name: "My Mix".to_string(),
            ..Default::default()
        };
        assert_eq!(s.apply_frame(&frame.encode().unwrap()).unwrap(), StageKind::Name);
        frame.tracks = Some(vec![track]);
        assert_eq!(s.apply_frame(&frame.encode().unwrap()).unwrap(), StageKind::Tracks);
        frame.features = Some(vector(0.5));
        frame.track_features = Some(vec![TrackFeatures {
            id: TrackId::from(1u64),
            features: vector(0.2),
        }]);
        assert_eq!(
            s.apply_frame(&frame.encode().unwrap()).unwrap(),
            StageKind::Features
        );

        assert_eq!(s.title_sink().titles.last().unwrap(), "My Mix");
        let rows = s.list_sink().last();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].markup(), "Song A<br>X");

        let aggregate = s.radar().sink().last().unwrap().to_vec();
        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate[0].radial_values[0], 0.5);

        let handle = s.hover_handle(0).unwrap();
        assert!(s.hover_enter(handle));
        let overlaid = s.radar().sink().last().unwrap().to_vec();
        assert_eq!(overlaid.len(), 2);
        assert_eq!(overlaid[1].role, SeriesRole::Overlay);
        assert_eq!(overlaid[1].radial_values[0], 0.2);

        assert!(s.hover_leave(handle));
        assert_eq!(s.radar().sink().last().unwrap(), aggregate.as_slice());
        assert!(s.progress().is_complete());
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut s = loaded();
        s.set_sort_key(SortKey::Alphabetical);
        let first = s.rows().to_vec();
        s.set_sort_key(SortKey::Alphabetical);
        assert_eq!(s.rows(), first.as_slice());
        s.set_filter("night");
        let filtered = s.rows().to_vec();
        s.set_sort_key(SortKey::Alphabetical);
        assert_eq!(s.rows(), filtered.as_slice());
    }

    #[test]
    fn test_empty_filter_is_full_corpus_in_order() {
        let mut s = loaded();
        s.set_filter("night");
        s.clear_filter();
        assert_eq!(ids(s.rows()), vec!["1", "2", "3", "4", "5"]);
        s.set_filter("night");
        s.set_filter("");
        assert_eq!(ids(s.list_sink().last()), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_filtered_rows_are_query_matches() {
        let mut s = loaded();
        s.set_filter("night");
        let rows = ids(s.rows());
        assert_eq!(rows, vec!["2", "4", "3"]);
    }

    #[test]
    fn test_alphabetical_stable_with_untitled() {
        let mut s = loaded();
        s.set_sort_key(SortKey::Alphabetical);
        // Both "Night Drive" rows keep their relative order; "" sorts as "Untitled".
        assert_eq!(ids(s.rows()), vec!["3", "2", "4", "1", "5"]);
    }

    #[test]
    fn test_no_match_yields_zero_rows() {
        let mut s = loaded();
        s.set_filter("xyz-no-match");
        assert!(s.rows().is_empty());
        assert!(s.list_sink().last().is_empty());
    }

    #[test]
    fn test_unknown_sort_key_keeps_previous_rows() {
        let mut s = loaded();
        s.set_sort_key(SortKey::Alphabetical);
        let before = s.list_sink().calls.len();
        let rows = s.rows().to_vec();
        let err = s.set_sort("Chronological").unwrap_err();
        assert_eq!(err, ConfigError::UnknownSortKey("Chronological".to_string()));
        assert_eq!(s.list_sink().calls.len(), before);
        assert_eq!(s.rows(), rows.as_slice());
        assert_eq!(s.view().sort, SortKey::Alphabetical);
        assert_eq!(s.set_sort("default").unwrap(), SortKey::Default);
    }

    #[test]
    fn test_track_missing_from_analysis_gets_no_overlay() {
        let mut s = session();
        s.apply_stage(Stage::Tracks(vec![
            Track::new(1u64, "Song A", &["X"]),
            Track::new(2u64, "Song B", &["Y"]),
        ]));
        s.apply_stage(features_for(&[1]));
        let aggregate_only = s.radar().sink().last().unwrap().to_vec();
        assert!(s.hover_handle(0).is_some());
        assert!(s.hover_handle(1).is_none());

        let h = s.hover_handle(0).unwrap();
        s.hover_enter(h);
        s.hover_leave(h);
        assert_eq!(s.radar().sink().last().unwrap(), aggregate_only.as_slice());
    }

    #[test]
    fn test_stale_hover_leave_after_rerender_is_ignored() {
        let mut s = loaded();
        let old = s.hover_handle(0).unwrap();
        assert!(s.hover_enter(old));
        s.set_filter("night");
        let calls = chart_calls(&s);
        assert!(!s.hover_leave(old));
        assert!(!s.hover_enter(old));
        assert_eq!(chart_calls(&s), calls);
    }

    #[test]
    fn test_filtering_out_the_hovered_row_drops_the_overlay() {
        let mut s = loaded();
        assert!(s.hover_enter(s.hover_handle(0).unwrap()));
        assert_eq!(s.radar().sink().last().unwrap().len(), 2);

        s.set_filter("night");
        assert!(!ids(s.rows()).contains(&"1"));
        let series = s.radar().sink().last().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].role, SeriesRole::Aggregate);
        assert!(s.radar().overlay().is_none());
    }

    #[test]
    fn test_overlay_survives_rerender_that_keeps_its_row() {
        let mut s = loaded();
        assert!(s.hover_enter(s.hover_handle(1).unwrap()));
        s.set_filter("night");
        assert!(ids(s.rows()).contains(&"2"));
        assert_eq!(s.radar().overlay(), Some(&TrackId::from(2u64)));
        assert_eq!(s.radar().sink().last().unwrap().len(), 2);
    }

    #[test]
    fn test_hover_before_features_is_noop() {
        let mut s = session();
        s.apply_stage(Stage::Tracks(five_tracks()));
        assert!(s.hover_handle(0).is_none());
        assert!(s.hover_handles().iter().all(Option::is_none));
    }

    #[test]
    fn test_features_before_tracks_are_attached() {
        let mut s = session();
        s.apply_stage(features_for(&[2]));
        s.apply_stage(Stage::Tracks(five_tracks()));
        assert_eq!(s.playlist().tracks[1].features, Some(vector(0.2)));
        assert!(s.playlist().tracks[0].features.is_none());
        let h = s.hover_handle(1).unwrap();
        assert!(s.hover_enter(h));
        assert_eq!(s.radar().sink().last().unwrap().len(), 2);
    }

    #[test]
    fn test_filter_before_tracks_is_empty_view() {
        let mut s = session();
        s.set_filter("song");
        assert!(s.rows().is_empty());
        s.apply_stage(Stage::Tracks(five_tracks()));
        assert_eq!(ids(s.rows()), vec!["1"]);
    }

    #[test]
    fn test_duplicate_stage_reapplies_identically() {
        let mut s = loaded();
        let rows = s.rows().to_vec();
        s.apply_stage(Stage::Tracks(five_tracks()));
        assert_eq!(s.rows(), rows.as_slice());
        assert!(s.playlist().tracks.iter().all(|t| t.features.is_some()));
    }

    #[test]
    fn test_protocol_error_drops_frame_only() {
        let mut s = loaded();
        let rows = s.rows().to_vec();
        assert!(s.apply_frame(r#"{"bogus": true}"#).is_err());
        assert_eq!(s.rows(), rows.as_slice());
        assert_eq!(s.stream().dropped(), 1);
        assert_eq!(s.apply_frame(r#"{"name": ""}"#).unwrap(), StageKind::Name);
        assert_eq!(s.title_sink().titles.last().unwrap(), "Untitled");
    }

    #[test]
    fn test_adopted_summary_survives_name_stage() {
        let mut s = session();
        let updated = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        s.adopt_summary(&PlaylistSummary {
            id: 5,
            name: "index name".to_string(),
            last_updated: updated,
            status: PlaylistStatus::Private,
            url: "/playlists/5".to_string(),
            needs_update: true,
        });
        s.apply_stage(Stage::Name("Five".to_string()));
        let playlist = s.playlist();
        assert_eq!(playlist.name, "Five");
        assert_eq!(playlist.status, PlaylistStatus::Private);
        assert_eq!(playlist.url, "/playlists/5");
        assert_eq!(playlist.last_updated, Some(updated));
    }

    #[test]
    fn test_teardown_stops_updates() {
        let mut s = loaded();
        let h = s.hover_handle(0).unwrap();
        s.teardown();
        assert!(!s.is_active());
        let calls = chart_calls(&s);
        assert!(!s.hover_enter(h));
        s.apply_stage(Stage::Name("late".to_string()));
        assert_eq!(s.apply_frame(r#"{"name": "later"}"#).unwrap(), StageKind::Name);
        assert_eq!(chart_calls(&s), calls);
        assert_eq!(s.playlist().name, "Five");
        assert!(s.rows().is_empty());
        assert!(s.list_sink().last().is_empty());
    }
}
