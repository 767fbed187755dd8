//! Wire payloads for both transports and the stage envelope they share.
//!
//! Transport A (fetch) delivers a [`PlaylistPayload`] and an
//! [`AnalysisPayload`]; Transport B (stream) delivers a sequence of JSON
//! frames, each matching one of three shapes. Both are reduced to [`Stage`]
//! values so the consumer never looks at raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::model::{FeatureVector, Track, TrackId};

/// `GET /api/playlists/{id}` response. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// One per-track feature vector: `{ "id": ..., "acousticness": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    pub id: TrackId,
    #[serde(flatten)]
    pub features: FeatureVector,
}

/// `GET /api/playlists/{id}/analysis` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub features: FeatureVector,
    #[serde(default)]
    pub track_features: Vec<TrackFeatures>,
}

/// Which of the three stages a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Name,
    Tracks,
    Features,
}

impl StageKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Tracks => "tracks",
            Self::Features => "features",
        }
    }
}

/// A classified update frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Name(String),
    Tracks(Vec<Track>),
    Features {
        aggregate: FeatureVector,
        per_track: Vec<TrackFeatures>,
    },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Name(_) => StageKind::Name,
            Self::Tracks(_) => StageKind::Tracks,
            Self::Features { .. } => StageKind::Features,
        }
    }

    /// Decode one stream frame.
    pub fn decode(text: &str) -> Result<Stage, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
        Self::classify(&value)
    }

    /// Structural classification: `features` wins over `tracks`, which wins
    /// over `name`. Frames may be cumulative and carry earlier fields too.
    pub fn classify(value: &Value) -> Result<Stage, ProtocolError> {
        let object = value.as_object().ok_or(ProtocolError::NotObject)?;

        if object.contains_key("features") {
            let payload: AnalysisPayload =
                AnalysisPayload::deserialize(value).map_err(|source| ProtocolError::Malformed {
                    stage: StageKind::Features.label(),
                    source,
                })?;
            return Ok(Stage::from(payload));
        }

        if let Some(tracks) = object.get("tracks") {
            let tracks: Vec<Track> =
                Vec::<Track>::deserialize(tracks).map_err(|source| ProtocolError::Malformed {
                    stage: StageKind::Tracks.label(),
                    source,
                })?;
            return Ok(Stage::Tracks(tracks));
        }

        if let Some(name) = object.get("name") {
            let name = String::deserialize(name).map_err(|source| ProtocolError::Malformed {
                stage: StageKind::Name.label(),
                source,
            })?;
            return Ok(Stage::Name(name));
        }

        Err(ProtocolError::UnknownShape {
            keys: object.keys().cloned().collect(),
        })
    }

    /// Adapt the two fetch results into the conventional name → tracks →
    /// features sequence.
    pub fn from_fetch(playlist: PlaylistPayload, analysis: AnalysisPayload) -> [Stage; 3] {
        [
            Stage::Name(playlist.name),
            Stage::Tracks(playlist.tracks),
            Stage::from(analysis),
        ]
    }
}

impl From<AnalysisPayload> for Stage {
    fn from(payload: AnalysisPayload) -> Self {
        Stage::Features {
            aggregate: payload.features,
            per_track: payload.track_features,
        }
    }
}

/// Cumulative frame as emitted by the stream server: each frame repeats the
/// fields of the previous ones and adds the next stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageFrame {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_features: Option<Vec<TrackFeatures>>,
}

impl StageFrame {
    pub fn encode(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn features() -> Value {
        json!({
            "acousticness": 0.1, "danceability": 0.2, "energy": 0.3,
            "instrumentalness": 0.4, "liveness": 0.5, "speechiness": 0.6, "valence": 0.7
        })
    }

    #[test]
    fn test_classify_name_stage() {
        let stage = Stage::decode(r#"{"name": "My Mix"}"#).unwrap();
        assert_eq!(stage, Stage::Name("My Mix".to_string()));
    }

    #[test]
    fn test_classify_tracks_wins_over_name() {
        let stage = Stage::decode(
            r#"{"name": "My Mix", "tracks": [{"id": 1, "name": "Song A", "artists": ["X"]}]}"#,
        )
        .unwrap();
        match stage {
            Stage::Tracks(tracks) => {
                assert_eq!(tracks.len(), 1);
                assert_eq!(tracks[0].id, TrackId::new("1"));
            }
            other => panic!("expected tracks stage, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_features_wins_over_everything() {
        let mut frame = json!({
            "name": "My Mix",
            "tracks": [],
            "features": features(),
            "track_features": [{"id": 1}]
        });
        frame["track_features"][0]
            .as_object_mut()
            .unwrap()
            .extend(features().as_object().unwrap().clone());
        let stage = Stage::classify(&frame).unwrap();
        match stage {
            Stage::Features { aggregate, per_track } => {
                assert_eq!(aggregate.energy, 0.3);
                assert_eq!(per_track.len(), 1);
                assert_eq!(per_track[0].id, TrackId::new("1"));
            }
            other => panic!("expected features stage, got {:?}", other),
        }
    }

    #[test]
    fn test_features_without_track_features_is_accepted() {
        let frame = json!({ "features": features() });
        match Stage::classify(&frame).unwrap() {
            Stage::Features { per_track, .. } => assert!(per_track.is_empty()),
            other => panic!("expected features stage, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shape_is_protocol_error() {
        let err = Stage::decode(r#"{"status": "PU"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownShape { ref keys } if keys == &["status"]));
        assert!(matches!(Stage::decode("[1,2]"), Err(ProtocolError::NotObject)));
        assert!(matches!(Stage::decode("{"), Err(ProtocolError::InvalidJson(_))));
    }

    #[test]
    fn test_incomplete_feature_vector_is_malformed() {
        let frame = json!({ "features": { "energy": 0.5 } });
        let err = Stage::classify(&frame).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { stage: "features", .. }));
    }

    #[test]
    fn test_cumulative_frames_classify_in_order() {
        let track = Track::new(1u64, "Song A", &["X"]);
        let aggregate = serde_json::from_value::<FeatureVector>(features()).unwrap();
        let mut frame = StageFrame {
            name: "My Mix".to_string(),
            ..Default::default()
        };
        let mut kinds = Vec::new();
        kinds.push(Stage::decode(&frame.encode().unwrap()).unwrap().kind());
        frame.tracks = Some(vec![track]);
        kinds.push(Stage::decode(&frame.encode().unwrap()).unwrap().kind());
        frame.features = Some(aggregate);
        frame.track_features = Some(Vec::new());
        kinds.push(Stage::decode(&frame.encode().unwrap()).unwrap().kind());
        assert_eq!(
            kinds,
            vec![StageKind::Name, StageKind::Tracks, StageKind::Features]
        );
    }

    #[test]
    fn test_from_fetch_yields_conventional_order() {
        let playlist = PlaylistPayload {
            name: "Mix".to_string(),
            tracks: vec![],
        };
        let analysis = AnalysisPayload {
            features: FeatureVector::EMPTY,
            track_features: vec![],
        };
        let kinds: Vec<StageKind> = Stage::from_fetch(playlist, analysis)
            .iter()
            .map(Stage::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![StageKind::Name, StageKind::Tracks, StageKind::Features]
        );
    }
}
