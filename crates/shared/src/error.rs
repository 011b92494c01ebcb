use thiserror::Error;

/// Configuration-time failures. These are the only errors a tile feature
/// surfaces to its host; data gaps in a snapshot never become errors.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid configuration")]
    MissingConfig,
    #[error("malformed {feature} configuration: {source}")]
    Malformed {
        feature: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration type {actual:?} does not match {expected:?}")]
    WrongType {
        expected: &'static str,
        actual: String,
    },
}

impl FeatureError {
    pub fn malformed(feature: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { feature, source }
    }
}
