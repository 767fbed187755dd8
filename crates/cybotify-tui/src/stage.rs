//! StageStream — turns inbound frames into [`Stage`] values and keeps count.

use cybotify_proto::error::ProtocolError;
use cybotify_proto::protocol::{Stage, StageKind};

/// Which stages have landed at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageProgress {
    pub name: bool,
    pub tracks: bool,
    pub features: bool,
}

impl StageProgress {
    pub fn mark(&mut self, kind: StageKind) {
        match kind {
            StageKind::Name => self.name = true,
            StageKind::Tracks => self.tracks = true,
            StageKind::Features => self.features = true,
        }
    }

    pub fn has(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::Name => self.name,
            StageKind::Tracks => self.tracks,
            StageKind::Features => self.features,
        }
    }

    pub fn landed(&self) -> usize {
        [self.name, self.tracks, self.features]
            .iter()
            .filter(|b| **b)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.landed() == 3
    }
}

#[derive(Debug, Default)]
pub struct StageStream {
    progress: StageProgress,
    received: usize,
    dropped: usize,
}

impl StageStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one raw stream frame. Frames that match no stage are counted as
    /// dropped and handed back as the error; the stream itself carries on.
    pub fn classify_frame(&mut self, text: &str) -> Result<Stage, ProtocolError> {
        self.received += 1;
        match Stage::decode(text) {
            Ok(stage) => {
                self.progress.mark(stage.kind());
                Ok(stage)
            }
            Err(e) => {
                self.dropped += 1;
                Err(e)
            }
        }
    }

    /// Record a stage that was already adapted by the fetch driver.
    pub fn accept(&mut self, stage: &Stage) {
        self.received += 1;
        self.progress.mark(stage.kind());
    }

    pub fn progress(&self) -> StageProgress {
        self.progress
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
