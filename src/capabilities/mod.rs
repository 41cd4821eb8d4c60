mod caption;
mod compliance;
mod image;
mod video;

pub use caption::{CaptionGenerator, CaptionResult};
pub use compliance::{ComplianceChecker, DesignReview, PolicyReview};
pub use image::ImageGenerator;
pub use video::VideoGenerator;

use std::fmt;

use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Video,
}

impl ArtifactKind {
    pub fn as_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "image",
            ArtifactKind::Video => "video",
        }
    }

    pub fn subdir(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "images",
            ArtifactKind::Video => "videos",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_prefix())
    }
}

#[derive(Debug, Clone)]
pub struct BinaryArtifact {
    pub data: Vec<u8>,
    pub media_type: String,
    pub file_extension: String,
    pub summary: String,
    pub remote_url: Option<String>,
    pub metadata: Map<String, Value>,
}

impl BinaryArtifact {
    pub fn new(
        data: Vec<u8>,
        media_type: impl Into<String>,
        file_extension: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            file_extension: file_extension.into(),
            summary: summary.into(),
            remote_url: None,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(
        data: Vec<u8>,
        media_type: impl Into<String>,
        file_extension: impl Into<String>,
        summary: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            file_extension: file_extension.into(),
            summary: summary.into(),
            remote_url: None,
            metadata,
        }
    }
}
