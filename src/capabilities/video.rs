use crate::{
    capabilities::BinaryArtifact,
    config::{AspectRatio, GenerationConfig, VideoServiceConfig},
    errors::{AgentError, Result},
    guidelines::GuidelineStore,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

pub struct VideoGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    guidelines: GuidelineStore,
}

impl VideoGenerator {
    pub fn new(config: &VideoServiceConfig, api_key: &str, guidelines: GuidelineStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            guidelines,
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        seconds: u32,
    ) -> Result<BinaryArtifact> {
        let seconds = GenerationConfig::clamp_duration(seconds);
        let entry = aspect_ratio.entry();
        let enriched = self.enriched_prompt(prompt, aspect_ratio, entry.size, seconds);

        let request_body = VideoGenerationRequest {
            model: &self.model,
            prompt: &enriched,
            size: entry.size,
            seconds,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::other(format!(
                "video service returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let summary = format!(
            "Model: {} | {}s at {} ({})",
            self.model, seconds, aspect_ratio, entry.size
        );
        let metadata = self.request_metadata(prompt, aspect_ratio, entry.size, seconds);

        if content_type.contains("application/json") {
            let body = response.json::<VideoGenerationResponse>().await?;
            self.from_json(body, summary, metadata).await
        } else {
            let bytes = response.bytes().await?.to_vec();
            Ok(BinaryArtifact::with_metadata(
                bytes,
                content_type,
                "mp4",
                summary,
                metadata,
            ))
        }
    }

    async fn from_json(
        &self,
        payload: VideoGenerationResponse,
        summary: String,
        metadata: Map<String, Value>,
    ) -> Result<BinaryArtifact> {
        if let Some(b64) = &payload.video_base64 {
            let data = BASE64_STANDARD
                .decode(b64)
                .map_err(|err| AgentError::other(format!("video base64 decoding failed: {err}")))?;
            let mut artifact = BinaryArtifact::with_metadata(
                data,
                payload.content_type.as_deref().unwrap_or("video/mp4"),
                payload.ext.as_deref().unwrap_or("mp4"),
                summary,
                metadata,
            );
            artifact.remote_url = payload.video_url.clone();
            return Ok(artifact);
        }

        if let Some(url) = &payload.video_url {
            debug!(target: "video_generator", "fetching video from {url}");
            let bytes = self
                .client
                .get(url)
                .bearer_auth(&self.api_key)
                .send()
                .await?
                .bytes()
                .await?
                .to_vec();
            let mut artifact = BinaryArtifact::with_metadata(
                bytes,
                payload.content_type.as_deref().unwrap_or("video/mp4"),
                payload.ext.as_deref().unwrap_or("mp4"),
                summary,
                metadata,
            );
            artifact.remote_url = Some(url.clone());
            return Ok(artifact);
        }

        Err(AgentError::unsupported(
            "video service response carried neither video_base64 nor video_url",
        ))
    }

    fn request_metadata(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: &str,
        seconds: u32,
    ) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("prompt".to_string(), Value::String(prompt.to_string()));
        metadata.insert("model".to_string(), Value::String(self.model.clone()));
        metadata.insert("aspect_ratio".to_string(), json!(aspect_ratio.as_label()));
        metadata.insert("resolution".to_string(), json!(size));
        metadata.insert("seconds".to_string(), json!(seconds));
        metadata
    }

    fn enriched_prompt(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        size: &str,
        seconds: u32,
    ) -> String {
        let design = self.guidelines.design();
        let policy = self.guidelines.policy();

        format!(
            "=== MANDATORY COMPLIANCE INSTRUCTIONS ===\n\
             Follow ALL guidelines below. They take priority over the creative request.\n\
             If any part of the request conflicts with the guidelines, the guidelines win.\n\
             \n\
             === DESIGN GUIDELINES ===\n\
             {design}\n\
             \n\
             === POLICY GUIDELINES ===\n\
             {policy}\n\
             \n\
             === VIDEO OUTPUT REQUIREMENTS ===\n\
             - Aspect ratio: {aspect_ratio}\n\
             - Resolution: {size}\n\
             - Duration: {seconds} seconds\n\
             \n\
             === CREATIVE REQUEST ===\n\
             {prompt}"
        )
    }
}

#[derive(Serialize)]
struct VideoGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    seconds: u32,
}

#[derive(Deserialize, Debug)]
struct VideoGenerationResponse {
    #[serde(default)]
    video_base64: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    ext: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_fields_all_optional() {
        let parsed: VideoGenerationResponse =
            serde_json::from_str(r#"{"video_url": "https://example.com/v.mp4"}"#).expect("parse");
        assert_eq!(parsed.video_url.as_deref(), Some("https://example.com/v.mp4"));
        assert!(parsed.video_base64.is_none());
        assert!(parsed.content_type.is_none());
        assert!(parsed.ext.is_none());

        let empty: VideoGenerationResponse = serde_json::from_str("{}").expect("parse");
        assert!(empty.video_url.is_none());
    }

    #[test]
    fn request_serializes_expected_shape() {
        let request = VideoGenerationRequest {
            model: "sora-2",
            prompt: "a drone shot",
            size: "1920x1080",
            seconds: 10,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["model"], "sora-2");
        assert_eq!(value["size"], "1920x1080");
        assert_eq!(value["seconds"], 10);
    }
}
