//! Playlist, track and audio-feature types shared by the feed and the TUI.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FeatureError;

/// The audio features plotted on the radar chart, in axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Liveness,
    Speechiness,
    Valence,
}

impl Feature {
    /// Axis order. The chart relies on this being stable.
    pub const ALL: [Feature; 7] = [
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Energy,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Speechiness,
        Feature::Valence,
    ];

    /// Wire key, as sent by the analysis endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Self::Acousticness => "acousticness",
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Speechiness => "speechiness",
            Self::Valence => "valence",
        }
    }

    /// Chart axis label: first character upper-cased, the rest lower-cased.
    pub fn axis_label(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(|c| c.to_lowercase()))
                .collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalised audio-feature tuple. All seven values are always present and
/// lie in `[0, 1]`; decoding rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureVector")]
pub struct FeatureVector {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub valence: f64,
}

impl FeatureVector {
    /// All-zero sentinel shown before any analysis arrives.
    pub const EMPTY: FeatureVector = FeatureVector {
        acousticness: 0.0,
        danceability: 0.0,
        energy: 0.0,
        instrumentalness: 0.0,
        liveness: 0.0,
        speechiness: 0.0,
        valence: 0.0,
    };

    /// Build from values in [`Feature::ALL`] order.
    pub fn from_values(values: [f64; 7]) -> Result<Self, FeatureError> {
        for (feature, value) in Feature::ALL.iter().zip(values.iter()) {
            if !value.is_finite() || !(0.0..=1.0).contains(value) {
                return Err(FeatureError::out_of_range(*feature, *value));
            }
        }
        let [acousticness, danceability, energy, instrumentalness, liveness, speechiness, valence] =
            values;
        Ok(Self {
            acousticness,
            danceability,
            energy,
            instrumentalness,
            liveness,
            speechiness,
            valence,
        })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Acousticness => self.acousticness,
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Liveness => self.liveness,
            Feature::Speechiness => self.speechiness,
            Feature::Valence => self.valence,
        }
    }

    /// Values in axis order.
    pub fn values(&self) -> [f64; 7] {
        Feature::ALL.map(|f| self.get(f))
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| *v == 0.0)
    }

    /// Per-feature arithmetic mean. An empty slice yields [`FeatureVector::EMPTY`].
    pub fn mean(vectors: &[FeatureVector]) -> FeatureVector {
        if vectors.is_empty() {
            return Self::EMPTY;
        }
        let n = vectors.len() as f64;
        let mut sums = [0.0_f64; 7];
        for v in vectors {
            for (sum, value) in sums.iter_mut().zip(v.values()) {
                *sum += value;
            }
        }
        // Means of unit-range values stay in range.
        Self::from_values(sums.map(|s| (s / n).clamp(0.0, 1.0))).unwrap_or(Self::EMPTY)
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Wire shape: every key optional so a missing one is reported by name.
/// Unknown keys (`tempo`, `key`, `loudness`, ...) are ignored.
#[derive(Deserialize)]
struct RawFeatureVector {
    acousticness: Option<f64>,
    danceability: Option<f64>,
    energy: Option<f64>,
    instrumentalness: Option<f64>,
    liveness: Option<f64>,
    speechiness: Option<f64>,
    valence: Option<f64>,
}

impl TryFrom<RawFeatureVector> for FeatureVector {
    type Error = FeatureError;

    fn try_from(raw: RawFeatureVector) -> Result<Self, Self::Error> {
        let pick = |value: Option<f64>, feature: Feature| {
            value.ok_or(FeatureError::Missing(feature.name()))
        };
        Self::from_values([
            pick(raw.acousticness, Feature::Acousticness)?,
            pick(raw.danceability, Feature::Danceability)?,
            pick(raw.energy, Feature::Energy)?,
            pick(raw.instrumentalness, Feature::Instrumentalness)?,
            pick(raw.liveness, Feature::Liveness)?,
            pick(raw.speechiness, Feature::Speechiness)?,
            pick(raw.valence, Feature::Valence)?,
        ])
    }
}

/// Stable track identifier. Accepts both JSON strings and integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => TrackId(s),
            Raw::Unsigned(n) => TrackId(n.to_string()),
            Raw::Signed(n) => TrackId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_artists")]
    pub artists: Vec<String>,
    /// Absent until the features stage lands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>, artists: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            features: None,
        }
    }

    pub fn artists_joined(&self) -> String {
        self.artists.join(", ")
    }
}

/// Artists arrive either as a list or as one comma-separated string.
fn deserialize_artists<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Sharing status of a playlist, as stored upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaylistStatus {
    #[default]
    #[serde(rename = "PR", alias = "private")]
    Private,
    #[serde(rename = "PU", alias = "public")]
    Public,
    #[serde(rename = "CO", alias = "collaborative")]
    Collaborative,
}

impl PlaylistStatus {
    pub const ALL: [PlaylistStatus; 3] = [
        PlaylistStatus::Private,
        PlaylistStatus::Public,
        PlaylistStatus::Collaborative,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Private => "PR",
            Self::Public => "PU",
            Self::Collaborative => "CO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Public => "Public",
            Self::Collaborative => "Collaborative",
        }
    }
}

pub const UNTITLED: &str = "Untitled";

/// Name shown for a playlist; empty names render as "Untitled".
pub fn display_name(name: &str) -> &str {
    if name.is_empty() {
        UNTITLED
    } else {
        name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: PlaylistStatus,
    #[serde(default)]
    pub url: String,
}

impl Playlist {
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

/// One entry of the playlist index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub status: PlaylistStatus,
    #[serde(default)]
    pub url: String,
    /// Upstream snapshot differs from the stored one; analysis will be staged.
    #[serde(default)]
    pub needs_update: bool,
}

impl PlaylistSummary {
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_json() -> serde_json::Value {
        serde_json::json!({
            "acousticness": 0.1,
            "danceability": 0.2,
            "energy": 0.3,
            "instrumentalness": 0.4,
            "liveness": 0.5,
            "speechiness": 0.6,
            "valence": 0.7,
            "tempo": 121.0,
            "key": 5
        })
    }

    #[test]
    fn test_axis_labels_capitalise_first_letter_only() {
        let labels: Vec<String> = Feature::ALL.iter().map(|f| f.axis_label()).collect();
        assert_eq!(labels[0], "Acousticness");
        assert_eq!(labels[3], "Instrumentalness");
        assert_eq!(labels[6], "Valence");
    }

    #[test]
    fn test_feature_vector_ignores_extra_keys() {
        let v: FeatureVector = serde_json::from_value(vector_json()).unwrap();
        assert_eq!(v.values(), [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
    }

    #[test]
    fn test_feature_vector_missing_key_is_error() {
        let mut json = vector_json();
        json.as_object_mut().unwrap().remove("liveness");
        let err = serde_json::from_value::<FeatureVector>(json).unwrap_err();
        assert!(err.to_string().contains("liveness"), "{err}");
    }

    #[test]
    fn test_feature_vector_out_of_range_is_error() {
        let mut json = vector_json();
        json["energy"] = serde_json::json!(1.5);
        assert!(serde_json::from_value::<FeatureVector>(json).is_err());
    }

    #[test]
    fn test_mean_of_nothing_is_empty_sentinel() {
        assert_eq!(FeatureVector::mean(&[]), FeatureVector::EMPTY);
        assert!(FeatureVector::EMPTY.is_empty());
    }

    #[test]
    fn test_mean_averages_per_feature() {
        let a = FeatureVector::from_values([0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 0.5]).unwrap();
        let b = FeatureVector::from_values([1.0, 0.4, 0.6, 0.2, 0.0, 0.0, 0.5]).unwrap();
        let m = FeatureVector::mean(&[a, b]);
        assert!((m.acousticness - 0.5).abs() < 1e-9);
        assert!((m.danceability - 0.3).abs() < 1e-9);
        assert!((m.valence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_track_accepts_numeric_id_and_joined_artists() {
        let t: Track =
            serde_json::from_str(r#"{"id": 7, "name": "Song", "artists": "X, Y"}"#).unwrap();
        assert_eq!(t.id, TrackId::new("7"));
        assert_eq!(t.artists, vec!["X", "Y"]);
        assert_eq!(t.artists_joined(), "X, Y");
        assert!(t.features.is_none());
    }

    #[test]
    fn test_untitled_only_at_display_time() {
        let p = Playlist::default();
        assert_eq!(p.name, "");
        assert_eq!(p.display_name(), "Untitled");
    }

    #[test]
    fn test_status_wire_codes() {
        let s: PlaylistStatus = serde_json::from_str("\"CO\"").unwrap();
        assert_eq!(s, PlaylistStatus::Collaborative);
        assert_eq!(serde_json::to_string(&PlaylistStatus::Public).unwrap(), "\"PU\"");
    }
}
