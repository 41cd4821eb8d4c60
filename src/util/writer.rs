use std::path::PathBuf;

use crate::{
    capabilities::{ArtifactKind, BinaryArtifact},
    errors::Result,
    util::{format_utc, now_utc, utc_rfc3339},
};
use serde_json::{Map, Value, json};
use tokio::fs;

/// Persists generated media under the artifacts root, one subdirectory per
/// artifact kind, alongside a `.meta.json` sidecar.
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub async fn persist(&self, kind: ArtifactKind, artifact: &BinaryArtifact) -> Result<PathBuf> {
        let dir = self.root.join(kind.subdir());
        fs::create_dir_all(&dir).await?;

        let now = now_utc();
        let timestamp = format_utc(&now, "%Y%m%d_%H%M%S");
        let base_name = format!("{}_{}", kind.as_prefix(), timestamp);

        let file_name = format!("{}.{}", base_name, artifact.file_extension);
        let file_path = dir.join(&file_name);
        fs::write(&file_path, &artifact.data).await?;

        let mut meta = Map::new();
        meta.insert("kind".to_string(), json!(kind.to_string()));
        meta.insert("media_type".to_string(), json!(artifact.media_type));
        meta.insert("description".to_string(), json!(artifact.summary));
        meta.insert("artifact".to_string(), json!(file_name));
        meta.insert("created_at".to_string(), json!(utc_rfc3339(&now)));

        if let Some(prompt) = artifact
            .metadata
            .get("prompt")
            .and_then(|value| value.as_str())
        {
            meta.insert("prompt".to_string(), Value::String(prompt.to_string()));
        }

        if let Some(url) = artifact.remote_url.as_deref() {
            meta.insert("remote_url".to_string(), Value::String(url.to_string()));
        }

        if !artifact.metadata.is_empty() {
            meta.insert(
                "metadata".to_string(),
                Value::Object(artifact.metadata.clone()),
            );
        }

        let meta_path = dir.join(format!("{}.meta.json", base_name));
        fs::write(&meta_path, serde_json::to_vec_pretty(&Value::Object(meta))?).await?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_image_with_sidecar() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = ArtifactWriter::new(dir.path().to_path_buf())
            .await
            .expect("writer");

        let artifact = BinaryArtifact::new(vec![1, 2, 3], "image/png", "png", "test image");
        let path = writer
            .persist(ArtifactKind::Image, &artifact)
            .await
            .expect("persist");

        assert!(path.exists());
        assert!(path.starts_with(dir.path().join("images")));

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("image_"));
        assert!(name.ends_with(".png"));

        let base = name.strip_suffix(".png").unwrap();
        let sidecar = path.parent().unwrap().join(format!("{base}.meta.json"));
        assert!(sidecar.exists());
    }

    #[tokio::test]
    async fn persists_video_under_videos_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = ArtifactWriter::new(dir.path().to_path_buf())
            .await
            .expect("writer");

        let artifact = BinaryArtifact::new(vec![0u8; 8], "video/mp4", "mp4", "test video");
        let path = writer
            .persist(ArtifactKind::Video, &artifact)
            .await
            .expect("persist");

        assert!(path.starts_with(dir.path().join("videos")));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("video_"));
        assert!(name.ends_with(".mp4"));
    }
}
