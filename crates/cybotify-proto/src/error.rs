use thiserror::Error;

use crate::model::Feature;

/// An inbound stage frame that could not be turned into a [`crate::protocol::Stage`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotObject,
    #[error("frame matches no known stage (keys: {keys:?})")]
    UnknownShape { keys: Vec<String> },
    #[error("malformed {stage} frame: {source}")]
    Malformed {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A feature vector that violates the seven-key / unit-range invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("feature `{0}` is missing")]
    Missing(&'static str),
    #[error("feature `{feature}` = {value} is outside [0, 1]")]
    OutOfRange { feature: &'static str, value: f64 },
}

impl FeatureError {
    pub fn out_of_range(feature: Feature, value: f64) -> Self {
        Self::OutOfRange {
            feature: feature.name(),
            value,
        }
    }
}
