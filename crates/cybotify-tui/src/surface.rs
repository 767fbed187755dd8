//! The rendering collaborators the detail session draws through.
//!
//! The session never touches the terminal. It pushes complete series and
//! row sets into these sinks; the terminal implementations keep the last
//! call around for the ratatui components to draw.

use crate::list_view::RenderedRow;

/// Container the radar chart is rendered into.
pub const CHART_CONTAINER: &str = "spiderPlot";
/// Container the track rows are rendered into.
pub const LIST_CONTAINER: &str = "trackList";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Fill the polygon enclosed by the series.
    ToSelf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRole {
    Aggregate,
    Overlay,
}

/// One polar trace. `radial_values` and `axis_labels` always have the same
/// length.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarSeries {
    pub radial_values: Vec<f64>,
    pub axis_labels: Vec<String>,
    pub fill: FillMode,
    pub role: SeriesRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub radial_range: [f64; 2],
    pub show_legend: bool,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            radial_range: [0.0, 1.0],
            show_legend: false,
        }
    }
}

pub trait ChartSink {
    fn render(&mut self, container_id: &str, series: &[PolarSeries], layout: &ChartLayout);
}

pub trait ListSink {
    /// Empty the container and append `rows`, as one operation.
    fn replace_rows(&mut self, container_id: &str, rows: &[RenderedRow]);
}

pub trait TitleSink {
    fn set_title(&mut self, title: &str);
}

// ── Terminal implementations ─────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct ChartBuffer {
    pub series: Vec<PolarSeries>,
    pub layout: ChartLayout,
    pub renders: usize,
}

impl ChartSink for ChartBuffer {
    fn render(&mut self, _container_id: &str, series: &[PolarSeries], layout: &ChartLayout) {
        self.series = series.to_vec();
        self.layout = layout.clone();
        self.renders += 1;
    }
}

#[derive(Debug, Default, Clone)]
pub struct RowBuffer {
    pub rows: Vec<RenderedRow>,
}

impl ListSink for RowBuffer {
    fn replace_rows(&mut self, _container_id: &str, rows: &[RenderedRow]) {
        self.rows = rows.to_vec();
    }
}

#[derive(Debug, Default, Clone)]
pub struct TitleBuffer {
    pub title: Option<String>,
}

impl TitleSink for TitleBuffer {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
}

#[cfg(test)]
pub mod recording {
    //! Sinks that keep every call, for asserting on render sequences.

    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingChart {
        pub calls: Vec<(String, Vec<PolarSeries>, ChartLayout)>,
    }

    impl RecordingChart {
        pub fn last(&self) -> Option<&[PolarSeries]> {
            self.calls.last().map(|(_, s, _)| s.as_slice())
        }
    }

    impl ChartSink for RecordingChart {
        fn render(&mut self, container_id: &str, series: &[PolarSeries], layout: &ChartLayout) {
            self.calls
                .push((container_id.to_string(), series.to_vec(), layout.clone()));
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingList {
        pub calls: Vec<(String, Vec<RenderedRow>)>,
    }

    impl RecordingList {
        pub fn last(&self) -> &[RenderedRow] {
            self.calls.last().map(|(_, r)| r.as_slice()).unwrap_or(&[])
        }
    }

    impl ListSink for RecordingList {
        fn replace_rows(&mut self, container_id: &str, rows: &[RenderedRow]) {
            self.calls.push((container_id.to_string(), rows.to_vec()));
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingTitle {
        pub titles: Vec<String>,
    }

    impl TitleSink for RecordingTitle {
        fn set_title(&mut self, title: &str) {
            self.titles.push(title.to_string());
        }
    }
}
