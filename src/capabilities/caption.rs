use crate::{config::CaptionStyle, errors::Result};
use rig::{client::CompletionClient, completion::Prompt, providers::openai};

pub struct CaptionGenerator {
    client: openai::Client,
    model_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub text: String,
    pub hashtags: Vec<String>,
}

impl CaptionResult {
    pub fn render(&self) -> String {
        if self.hashtags.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n\n{}", self.text, self.hashtags.join(" "))
        }
    }
}

impl CaptionGenerator {
    pub fn new(client: openai::Client, model_name: &str) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
        }
    }

    pub async fn generate(&self, description: &str, style: CaptionStyle) -> Result<CaptionResult> {
        let preamble = style_preamble(style);
        let agent = self
            .client
            .agent(&self.model_name)
            .name("caption-generator")
            .preamble(&preamble)
            .build();

        let response = agent
            .prompt(&format!("Create a caption for: {description}"))
            .await?;

        Ok(parse_response(&response))
    }
}

fn style_preamble(style: CaptionStyle) -> String {
    let tone = match style {
        CaptionStyle::Professional => "Polished, professional tone suited to brand marketing.",
        CaptionStyle::Casual => "Relaxed, friendly tone with light emoji use.",
        CaptionStyle::Creative => "Playful, imaginative tone with vivid language.",
    };

    format!(
        "You are a social media caption writer.\n\
         \n\
         Tone: {tone}\n\
         \n\
         Platform notes when the request names one:\n\
         - instagram: up to 2200 characters, 20-30 hashtags, visual-first storytelling\n\
         - linkedin: up to 3000 characters, 3-5 hashtags, professional thought leadership\n\
         - twitter: up to 280 characters, 1-3 hashtags, concise and punchy\n\
         - facebook: conversational, 1-3 hashtags, questions engage well\n\
         \n\
         Reply exactly as:\n\
         CAPTION: <the caption text>\n\
         HASHTAGS: <space separated #hashtags>"
    )
}

/// Splits the model reply into caption text and a hashtag list. A missing
/// HASHTAGS section falls back to collecting inline #tags.
pub(crate) fn parse_response(response: &str) -> CaptionResult {
    let mut caption_lines: Vec<&str> = Vec::new();
    let mut hashtags: Vec<String> = Vec::new();
    let mut in_hashtags = false;

    for line in response.trim().lines() {
        let lower = line.trim_start().to_lowercase();
        if lower.starts_with("hashtags") {
            in_hashtags = true;
            hashtags.extend(extract_hashtags(line));
            continue;
        }
        if in_hashtags {
            hashtags.extend(extract_hashtags(line));
        } else {
            caption_lines.push(line);
        }
    }

    let mut text = caption_lines.join("\n").trim().to_string();
    if let Some(prefix) = text.get(.."caption:".len()) {
        if prefix.eq_ignore_ascii_case("caption:") {
            text = text["caption:".len()..].trim().to_string();
        }
    }

    if hashtags.is_empty() {
        hashtags = extract_hashtags(&text);
    }

    CaptionResult { text, hashtags }
}

fn extract_hashtags(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter(|word| word.starts_with('#') && word.len() > 1)
        .map(|word| word.trim_end_matches([',', '.', ';', '!']).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labeled_sections() {
        let result = parse_response(
            "CAPTION: Launch day is here.\nHASHTAGS: #launch #startup #newproduct",
        );
        assert_eq!(result.text, "Launch day is here.");
        assert_eq!(result.hashtags, vec!["#launch", "#startup", "#newproduct"]);
    }

    #[test]
    fn parses_multiline_caption() {
        let result = parse_response(
            "CAPTION: Big news.\nWe are live today.\nHASHTAGS:\n#news #live",
        );
        assert_eq!(result.text, "Big news.\nWe are live today.");
        assert_eq!(result.hashtags, vec!["#news", "#live"]);
    }

    #[test]
    fn falls_back_to_inline_hashtags() {
        let result = parse_response("Join us at the summit! #tech #summit2026");
        assert_eq!(result.text, "Join us at the summit! #tech #summit2026");
        assert_eq!(result.hashtags, vec!["#tech", "#summit2026"]);
    }

    #[test]
    fn no_hashtags_yields_empty_list() {
        let result = parse_response("A quiet announcement with no tags.");
        assert!(result.hashtags.is_empty());
        assert_eq!(result.text, "A quiet announcement with no tags.");
    }

    #[test]
    fn render_appends_hashtags() {
        let result = CaptionResult {
            text: "Hello".to_string(),
            hashtags: vec!["#a".to_string(), "#b".to_string()],
        };
        assert_eq!(result.render(), "Hello\n\n#a #b");
    }
}
