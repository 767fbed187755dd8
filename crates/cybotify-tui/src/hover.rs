//! HoverLink — per-render hover bindings for track rows.
//!
//! Every bind starts a new generation. A [`HoverHandle`] remembers the
//! generation it was issued in, so a handle held by a row that has since been
//! discarded resolves to nothing.

use cybotify_proto::model::TrackId;

use crate::list_view::RenderedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoverHandle {
    generation: u64,
    row: usize,
}

impl HoverHandle {
    pub fn row(&self) -> usize {
        self.row
    }
}

#[derive(Debug, Default)]
pub struct HoverLink {
    generation: u64,
    bound: Vec<Option<TrackId>>,
}

impl HoverLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebind after a render. Rows whose track has no feature vector yet get
    /// no binding.
    pub fn bind(&mut self, rows: &[RenderedRow], has_features: impl Fn(&RenderedRow) -> bool) {
        self.generation += 1;
        self.bound = rows
            .iter()
            .map(|row| has_features(row).then(|| row.track_id.clone()))
            .collect();
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.bound.clear();
    }

    /// Handle for `row`, if that row is bound in the current generation.
    pub fn handle(&self, row: usize) -> Option<HoverHandle> {
        self.bound.get(row)?.as_ref()?;
        Some(HoverHandle {
            generation: self.generation,
            row,
        })
    }

    /// Track a live handle points at. Stale handles resolve to `None`.
    pub fn resolve(&self, handle: HoverHandle) -> Option<&TrackId> {
        if handle.generation != self.generation {
            return None;
        }
        self.bound.get(handle.row)?.as_ref()
    }

    #[cfg(test)]
    pub fn handles(&self) -> Vec<Option<HoverHandle>> {
        (0..self.bound.len()).map(|row| self.handle(row)).collect()
    }

    #[cfg(test)]
    pub fn bound_count(&self) -> usize {
        self.bound.iter().filter(|b| b.is_some()).count()
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
