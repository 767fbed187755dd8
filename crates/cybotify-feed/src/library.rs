//! Playlist library served by the feed: loaded once from a JSON file.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cybotify_proto::model::{FeatureVector, PlaylistStatus, PlaylistSummary, Track};
use cybotify_proto::protocol::{AnalysisPayload, PlaylistPayload, StageFrame, TrackFeatures};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryPlaylist {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: PlaylistStatus,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub needs_update: bool,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl LibraryPlaylist {
    pub fn url(&self) -> String {
        format!("/playlists/{}", self.id)
    }

    pub fn summary(&self) -> PlaylistSummary {
        PlaylistSummary {
            id: self.id,
            name: self.name.clone(),
            last_updated: self.last_updated,
            status: self.status,
            url: self.url(),
            needs_update: self.needs_update,
        }
    }

    /// Metadata payload. Per-track features are stripped: they belong to the
    /// analysis exchange.
    pub fn payload(&self) -> PlaylistPayload {
        PlaylistPayload {
            name: self.name.clone(),
            tracks: self
                .tracks
                .iter()
                .map(|t| Track {
                    features: None,
                    ..t.clone()
                })
                .collect(),
        }
    }

    /// Aggregate = per-feature mean over the tracks that have features.
    pub fn analysis(&self) -> AnalysisPayload {
        let track_features: Vec<TrackFeatures> = self
            .tracks
            .iter()
            .filter_map(|t| {
                t.features.map(|features| TrackFeatures {
                    id: t.id.clone(),
                    features,
                })
            })
            .collect();
        let vectors: Vec<FeatureVector> = track_features.iter().map(|t| t.features).collect();
        AnalysisPayload {
            features: FeatureVector::mean(&vectors),
            track_features,
        }
    }

    /// The three cumulative frames of the staged stream, in send order.
    pub fn stage_frames(&self) -> Vec<StageFrame> {
        let payload = self.payload();
        let analysis = self.analysis();
        let name_only = StageFrame {
            name: payload.name.clone(),
            ..Default::default()
        };
        let with_tracks = StageFrame {
            tracks: Some(payload.tracks),
            ..name_only.clone()
        };
        let with_features = StageFrame {
            features: Some(analysis.features),
            track_features: Some(analysis.track_features),
            ..with_tracks.clone()
        };
        vec![name_only, with_tracks, with_features]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub playlists: Vec<LibraryPlaylist>,
}

impl Library {
    /// Load the library, seeding a demo file on first run.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let library = Self::demo();
            library.save(path)?;
            info!("Seeded demo library at {:?}", path);
            return Ok(library);
        }

        let content = std::fs::read_to_string(path)?;
        let library: Self = serde_json::from_str(&content)?;
        library.warn_on_duplicate_ids();
        info!(
            "Loaded {} playlists from {:?}",
            library.playlists.len(),
            path
        );
        Ok(library)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&LibraryPlaylist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn summaries(&self) -> Vec<PlaylistSummary> {
        self.playlists.iter().map(LibraryPlaylist::summary).collect()
    }

    fn warn_on_duplicate_ids(&self) {
        for playlist in &self.playlists {
            let mut seen = std::collections::HashSet::new();
            for track in &playlist.tracks {
                if !seen.insert(&track.id) {
                    warn!(
                        "Playlist {} lists track id {} more than once",
                        playlist.id, track.id
                    );
                }
            }
        }
    }

    /// Small built-in library so a fresh install has something to show.
    pub fn demo() -> Self {
        let vector = |v: [f64; 7]| FeatureVector::from_values(v).ok();
        let track = |id: u64, name: &str, artists: &[&str], features: Option<FeatureVector>| Track {
            features,
            ..Track::new(id, name, artists)
        };
        Self {
            playlists: vec![
                LibraryPlaylist {
                    id: 1,
                    name: "My Mix".to_string(),
                    status: PlaylistStatus::Public,
                    last_updated: Utc::now(),
                    needs_update: true,
                    tracks: vec![
                        track(1, "Song A", &["X"], vector([0.12, 0.71, 0.80, 0.02, 0.11, 0.05, 0.64])),
                        track(2, "Night Drive", &["Neon Coast", "Vela"], vector([0.03, 0.58, 0.91, 0.64, 0.22, 0.04, 0.31])),
                        track(3, "Paper Boats", &["Ada Rowe"], vector([0.88, 0.42, 0.25, 0.00, 0.09, 0.03, 0.47])),
                        track(4, "Low Tide", &["Harbor Lights"], vector([0.54, 0.36, 0.41, 0.77, 0.14, 0.06, 0.22])),
                        track(5, "Static Bloom", &["Vela"], None),
                    ],
                },
                LibraryPlaylist {
                    id: 2,
                    name: String::new(),
                    status: PlaylistStatus::Private,
                    last_updated: Utc::now(),
                    needs_update: false,
                    tracks: vec![
                        track(10, "Morning", &["Ada Rowe"], vector([0.91, 0.33, 0.18, 0.12, 0.10, 0.04, 0.58])),
                        track(11, "Evening", &["Ada Rowe"], vector([0.79, 0.29, 0.22, 0.31, 0.12, 0.03, 0.40])),
                    ],
                },
                LibraryPlaylist {
                    id: 3,
                    name: "Road Trip".to_string(),
                    status: PlaylistStatus::Collaborative,
                    last_updated: Utc::now(),
                    needs_update: false,
                    tracks: Vec::new(),
                },
            ],
        }
    }
}
