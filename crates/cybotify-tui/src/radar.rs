//! RadarController — owns what the spider chart currently shows.

use std::collections::HashMap;

use cybotify_proto::model::{Feature, FeatureVector, TrackId};
use cybotify_proto::protocol::TrackFeatures;

use crate::surface::{ChartLayout, ChartSink, FillMode, PolarSeries, SeriesRole, CHART_CONTAINER};

pub struct RadarController<C: ChartSink> {
    sink: C,
    aggregate: FeatureVector,
    per_track: HashMap<TrackId, FeatureVector>,
    overlay: Option<TrackId>,
    closed_loop: bool,
    layout: ChartLayout,
}

impl<C: ChartSink> RadarController<C> {
    pub fn new(sink: C, closed_loop: bool) -> Self {
        Self {
            sink,
            aggregate: FeatureVector::EMPTY,
            per_track: HashMap::new(),
            overlay: None,
            closed_loop,
            layout: ChartLayout::default(),
        }
    }

    /// Replace the aggregate and the per-track vectors. Does not render.
    pub fn seed(&mut self, aggregate: FeatureVector, per_track: &[TrackFeatures]) {
        self.aggregate = aggregate;
        self.per_track = per_track
            .iter()
            .map(|tf| (tf.id.clone(), tf.features))
            .collect();
        self.overlay = None;
    }

    pub fn features_for(&self, id: &TrackId) -> Option<FeatureVector> {
        self.per_track.get(id).copied()
    }

    pub fn overlay(&self) -> Option<&TrackId> {
        self.overlay.as_ref()
    }

    pub fn show_aggregate_only(&mut self) {
        self.overlay = None;
        self.render();
    }

    /// Overlay `id`'s vector on the aggregate. Unknown ids render the
    /// aggregate alone.
    pub fn show_overlay(&mut self, id: &TrackId) {
        self.overlay = self.per_track.contains_key(id).then(|| id.clone());
        self.render();
    }

    pub fn clear_overlay(&mut self) {
        self.show_aggregate_only();
    }

    /// Forget everything without rendering.
    pub fn reset(&mut self) {
        self.aggregate = FeatureVector::EMPTY;
        self.per_track.clear();
        self.overlay = None;
    }

    /// Series for the current state: aggregate first, then the overlay.
    /// Every series in one call shares the same loop convention.
    pub fn series(&self) -> Vec<PolarSeries> {
        let mut out = vec![self.polar(&self.aggregate, SeriesRole::Aggregate)];
        if let Some(v) = self.overlay.as_ref().and_then(|id| self.per_track.get(id)) {
            out.push(self.polar(v, SeriesRole::Overlay));
        }
        out
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    fn polar(&self, vector: &FeatureVector, role: SeriesRole) -> PolarSeries {
        let mut radial_values = vector.values().to_vec();
        let mut axis_labels: Vec<String> = Feature::ALL.iter().map(|f| f.axis_label()).collect();
        if self.closed_loop {
            radial_values.push(radial_values[0]);
            axis_labels.push(axis_labels[0].clone());
        }
        PolarSeries {
            radial_values,
            axis_labels,
            fill: FillMode::ToSelf,
            role,
        }
    }

    fn render(&mut self) {
        let series = self.series();
        self.sink.render(CHART_CONTAINER, &series, &self.layout);
    }
}
