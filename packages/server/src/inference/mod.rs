pub mod http;

use std::fmt;

use async_trait::async_trait;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpInference;

/// Errors raised by the model capabilities.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference call timed out after {0}s")]
    Timeout(u64),

    #[error("inference backend error: {0}")]
    Backend(String),

    #[error("inference returned an undecodable payload: {0}")]
    Payload(String),
}

/// Crack categories produced by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrackType {
    /// Reserved sentinel: the classifier saw no crack in the image.
    Other,
    Linear,
    Alligator,
    Pothole,
}

impl CrackType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::Linear => "Linear",
            Self::Alligator => "Alligator",
            Self::Pothole => "Pothole",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Other" => Some(Self::Other),
            "Linear" => Some(Self::Linear),
            "Alligator" => Some(Self::Alligator),
            "Pothole" => Some(Self::Pothole),
            _ => None,
        }
    }

    /// Whether this category means "no crack present".
    pub fn is_no_defect(self) -> bool {
        matches!(self, Self::Other)
    }
}

impl fmt::Display for CrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordinal severity grade, 0 (negligible) through 3 (severe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("severity out of range: {value}"))
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Combined classifier verdict for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub crack_type: CrackType,
    pub severity: Severity,
}

/// Produces a single-channel probability mask locating the defect.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, image: &RgbImage) -> Result<GrayImage, InferenceError>;
}

/// Grades an image into a crack category and severity.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &RgbImage) -> Result<Classification, InferenceError>;
}
