use std::{fmt, path::PathBuf};

use crate::{
    agents::ConversationHistory,
    capabilities::{
        ArtifactKind, CaptionGenerator, CaptionResult, ImageGenerator, VideoGenerator,
    },
    config::{AppConfig, GenerationConfig},
    errors::Result,
    guidelines::GuidelineStore,
    util::ArtifactWriter,
};
use rig::{
    client::CompletionClient,
    completion::{Chat, Prompt},
    providers::openai,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentTool {
    Image,
    Video,
    Caption,
}

impl ContentTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTool::Image => "image",
            ContentTool::Video => "video",
            ContentTool::Caption => "caption",
        }
    }

    fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "image" | "picture" | "drawing" | "art" => Some(ContentTool::Image),
            "video" | "animation" | "film" => Some(ContentTool::Video),
            "caption" | "copywriting" | "hashtags" => Some(ContentTool::Caption),
            _ => None,
        }
    }
}

impl fmt::Display for ContentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The remote model's routing verdict for one turn. Which tool runs is the
/// model's call; locally this is only a typed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDecision {
    ToolCalled { tool: ContentTool, prompt: String },
    NoToolCalled,
}

pub enum ExecutionOutcome {
    Reply {
        text: String,
    },
    Artifact {
        kind: ArtifactKind,
        path: PathBuf,
        remote_url: Option<String>,
        summary: String,
    },
    Caption {
        caption: CaptionResult,
    },
}

impl ExecutionOutcome {
    pub fn render(&self) -> String {
        match self {
            ExecutionOutcome::Reply { text } => text.clone(),
            ExecutionOutcome::Artifact {
                kind,
                path,
                remote_url,
                summary,
            } => {
                let mut lines = vec![format!("Generated {} saved to {}", kind, path.display())];
                if let Some(url) = remote_url {
                    lines.push(format!("Remote URL: {url}"));
                }
                lines.push(summary.clone());
                lines.join("\n")
            }
            ExecutionOutcome::Caption { caption } => caption.render(),
        }
    }
}

const PLANNER_PREAMBLE: &str = "You are a strict router for a social media content \
assistant. Reply with JSON only, shaped as {\"tool\": \"...\", \"prompt\": \"...\"}. \
tool must be one of image, video, caption or none. prompt is the cleaned-up \
generation request for that tool. When the user is only chatting or asking \
questions, use none and leave prompt empty.";

/// The content generation agent: one system prompt built per turn from the
/// live configuration, plus the image, video and caption tools.
pub struct ContentAgent {
    client: openai::Client,
    chat_model: String,
    image: ImageGenerator,
    video: VideoGenerator,
    caption: CaptionGenerator,
    writer: ArtifactWriter,
}

impl ContentAgent {
    pub fn new(
        client: openai::Client,
        app: &AppConfig,
        guidelines: GuidelineStore,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            image: ImageGenerator::new(client.clone(), &app.openai.image_model, guidelines.clone()),
            video: VideoGenerator::new(&app.video, &app.openai.api_key, guidelines),
            caption: CaptionGenerator::new(client.clone(), &app.openai.chat_model),
            chat_model: app.openai.chat_model.clone(),
            writer,
            client,
        }
    }

    pub async fn handle_turn(
        &self,
        config: &GenerationConfig,
        history: &mut ConversationHistory,
        input: &str,
    ) -> Result<ExecutionOutcome> {
        let decision = self.decide_tool(input).await;
        match &decision {
            ToolDecision::ToolCalled { tool, .. } => {
                info!(target: "content_agent", %tool, "dispatching generation tool");
            }
            ToolDecision::NoToolCalled => {
                info!(target: "content_agent", "conversational turn");
            }
        }

        let outcome = match decision {
            ToolDecision::ToolCalled {
                tool: ContentTool::Image,
                prompt,
            } => {
                let artifact = self
                    .image
                    .generate(&prompt, config.image_size, config.image_quality)
                    .await?;
                let path = self.writer.persist(ArtifactKind::Image, &artifact).await?;
                ExecutionOutcome::Artifact {
                    kind: ArtifactKind::Image,
                    path,
                    remote_url: artifact.remote_url.clone(),
                    summary: artifact.summary.clone(),
                }
            }
            ToolDecision::ToolCalled {
                tool: ContentTool::Video,
                prompt,
            } => {
                let artifact = self
                    .video
                    .generate(&prompt, config.video_aspect_ratio, config.video_duration)
                    .await?;
                let path = self.writer.persist(ArtifactKind::Video, &artifact).await?;
                ExecutionOutcome::Artifact {
                    kind: ArtifactKind::Video,
                    path,
                    remote_url: artifact.remote_url.clone(),
                    summary: artifact.summary.clone(),
                }
            }
            ToolDecision::ToolCalled {
                tool: ContentTool::Caption,
                prompt,
            } => {
                let caption = self.caption.generate(&prompt, config.caption_style).await?;
                ExecutionOutcome::Caption { caption }
            }
            ToolDecision::NoToolCalled => {
                let agent = self
                    .client
                    .agent(&self.chat_model)
                    .name("content-agent")
                    .preamble(&system_prompt(config))
                    .build();
                let response = agent.chat(input, history.to_messages()).await?;
                ExecutionOutcome::Reply { text: response }
            }
        };

        history.push_user(input);
        history.push_assistant(&outcome.render());

        Ok(outcome)
    }

    async fn decide_tool(&self, input: &str) -> ToolDecision {
        let planner = self
            .client
            .agent(&self.chat_model)
            .name("content-planner")
            .preamble(PLANNER_PREAMBLE)
            .build();

        let prompt = format!(
            "Decide which generation tool, if any, the user's request needs. \
             Reply with JSON only, shaped as {{\"tool\": \"...\", \"prompt\": \"...\"}}.\n\
             User request: ```{}```",
            input.trim()
        );

        match planner.prompt(&prompt).await {
            Ok(response) => {
                if let Some(decision) = parse_decision(&response) {
                    return fill_empty_prompt(decision, input);
                }
                warn!(
                    target: "content_agent",
                    response = %response,
                    "planner reply was not parseable, falling back to keywords"
                );
            }
            Err(err) => {
                warn!(
                    target: "content_agent",
                    error = ?err,
                    "planner request failed, falling back to keywords"
                );
            }
        }

        fallback_decision(input)
    }
}

fn system_prompt(config: &GenerationConfig) -> String {
    format!(
        "You are a creative assistant specialized in social media content for \
         marketing campaigns.\n\
         \n\
         Capabilities:\n\
         - Image generation for posts and banners\n\
         - Video generation for reels and shorts\n\
         - Caption writing with platform-appropriate hashtags\n\
         \n\
         Current configuration:\n\
         - Video duration: {} seconds\n\
         - Video aspect ratio: {} ({})\n\
         - Captions enabled: {}\n\
         - Caption style: {}\n\
         - Image size: {}\n\
         - Image quality: {}\n\
         \n\
         Guidelines:\n\
         1. First understand the theme, event or message before proposing content\n\
         2. Suggest creative directions when the user seems unsure\n\
         3. Use the configured settings when describing planned media\n\
         4. Recommend running /design and /policy reviews after new media\n\
         5. Keep the tone conversational and help refine ideas through dialogue",
        config.video_duration,
        config.video_aspect_ratio,
        config.video_resolution(),
        config.enable_captions,
        config.caption_style,
        config.image_size,
        config.image_quality,
    )
}

#[derive(Deserialize)]
struct PlannerResponse {
    tool: String,
    #[serde(default)]
    prompt: String,
}

pub(crate) fn parse_decision(response: &str) -> Option<ToolDecision> {
    let sanitized = strip_code_fences(response);

    if let Ok(parsed) = serde_json::from_str::<PlannerResponse>(sanitized) {
        return Some(decision_from_parts(&parsed.tool, parsed.prompt));
    }

    if let Ok(value) = serde_json::from_str::<Value>(sanitized) {
        if let Some(tool) = value.get("tool").and_then(Value::as_str) {
            let prompt = value
                .get("prompt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Some(decision_from_parts(tool, prompt));
        }
    }

    None
}

fn decision_from_parts(tool: &str, prompt: String) -> ToolDecision {
    match ContentTool::from_name(tool) {
        Some(tool) => ToolDecision::ToolCalled { tool, prompt },
        None => ToolDecision::NoToolCalled,
    }
}

fn fill_empty_prompt(decision: ToolDecision, input: &str) -> ToolDecision {
    match decision {
        ToolDecision::ToolCalled { tool, prompt } if prompt.trim().is_empty() => {
            ToolDecision::ToolCalled {
                tool,
                prompt: input.trim().to_string(),
            }
        }
        other => other,
    }
}

fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.starts_with("```json") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches('`')
            .trim()
            .trim_end_matches("```")
            .trim()
    } else if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

fn fallback_decision(input: &str) -> ToolDecision {
    let normalized = input.to_lowercase();

    let caption_keywords = ["caption", "hashtag", "post text", "copy for"];
    if caption_keywords.iter().any(|k| normalized.contains(k)) {
        return ToolDecision::ToolCalled {
            tool: ContentTool::Caption,
            prompt: input.trim().to_string(),
        };
    }

    let video_keywords = ["video", "animation", "reel", "clip", "footage"];
    if video_keywords.iter().any(|k| normalized.contains(k)) {
        return ToolDecision::ToolCalled {
            tool: ContentTool::Video,
            prompt: input.trim().to_string(),
        };
    }

    let image_keywords = ["image", "picture", "photo", "poster", "banner", "logo", "draw"];
    if image_keywords.iter().any(|k| normalized.contains(k)) {
        return ToolDecision::ToolCalled {
            tool: ContentTool::Image,
            prompt: input.trim().to_string(),
        };
    }

    ToolDecision::NoToolCalled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_decision() {
        let decision = parse_decision(r#"{"tool": "image", "prompt": "a sunset poster"}"#);
        assert_eq!(
            decision,
            Some(ToolDecision::ToolCalled {
                tool: ContentTool::Image,
                prompt: "a sunset poster".to_string(),
            })
        );
    }

    #[test]
    fn parses_fenced_json_decision() {
        let decision = parse_decision("```json\n{\"tool\": \"video\", \"prompt\": \"city at night\"}\n```");
        assert_eq!(
            decision,
            Some(ToolDecision::ToolCalled {
                tool: ContentTool::Video,
                prompt: "city at night".to_string(),
            })
        );
    }

    #[test]
    fn none_tool_means_no_tool_called() {
        let decision = parse_decision(r#"{"tool": "none", "prompt": ""}"#);
        assert_eq!(decision, Some(ToolDecision::NoToolCalled));
    }

    #[test]
    fn missing_prompt_field_defaults_empty() {
        let decision = parse_decision(r#"{"tool": "caption"}"#);
        assert_eq!(
            decision,
            Some(ToolDecision::ToolCalled {
                tool: ContentTool::Caption,
                prompt: String::new(),
            })
        );
    }

    #[test]
    fn garbage_is_unparseable() {
        assert_eq!(parse_decision("sure, generating now!"), None);
        assert_eq!(parse_decision(""), None);
    }

    #[test]
    fn empty_prompt_backfills_user_input() {
        let decision = fill_empty_prompt(
            ToolDecision::ToolCalled {
                tool: ContentTool::Image,
                prompt: "  ".to_string(),
            },
            "draw a cat",
        );
        assert_eq!(
            decision,
            ToolDecision::ToolCalled {
                tool: ContentTool::Image,
                prompt: "draw a cat".to_string(),
            }
        );
    }

    #[test]
    fn keyword_fallback_routes_by_content() {
        assert_eq!(
            fallback_decision("make me a video for the launch"),
            ToolDecision::ToolCalled {
                tool: ContentTool::Video,
                prompt: "make me a video for the launch".to_string(),
            }
        );
        assert_eq!(
            fallback_decision("I need a poster for the event"),
            ToolDecision::ToolCalled {
                tool: ContentTool::Image,
                prompt: "I need a poster for the event".to_string(),
            }
        );
        assert_eq!(
            fallback_decision("write a caption about our launch"),
            ToolDecision::ToolCalled {
                tool: ContentTool::Caption,
                prompt: "write a caption about our launch".to_string(),
            }
        );
        assert_eq!(fallback_decision("what do you think?"), ToolDecision::NoToolCalled);
    }

    #[test]
    fn system_prompt_reflects_live_config() {
        let mut config = GenerationConfig::default();
        config.video_duration = 42;
        let prompt = system_prompt(&config);
        assert!(prompt.contains("Video duration: 42 seconds"));
        assert!(prompt.contains("16:9 (1920x1080)"));
    }
}
