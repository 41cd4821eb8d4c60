use crate::{config::GenerationConfig, errors::Result, guidelines::GuidelineStore};
use rig::{client::CompletionClient, completion::Prompt, providers::openai};

/// Inputs for a design review. Only the description is required; empty
/// optional fields are rendered as unspecified.
#[derive(Debug, Clone, Default)]
pub struct DesignReview {
    pub content_type: String,
    pub resolution: String,
    pub description: String,
    pub additional_context: String,
}

impl DesignReview {
    pub fn render_request(&self) -> String {
        let mut request = format!(
            "Review this visual content for design compliance.\n\
             \n\
             CONTENT TYPE: {}\n\
             RESOLUTION: {}\n\
             \n\
             CONTENT DESCRIPTION:\n\
             {}",
            self.content_type,
            if self.resolution.is_empty() {
                "Not specified"
            } else {
                &self.resolution
            },
            self.description,
        );

        if !self.additional_context.is_empty() {
            request.push_str(&format!("\n\nADDITIONAL CONTEXT: {}", self.additional_context));
        }

        request.push_str("\n\nProvide the full structured report.");
        request
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyReview {
    pub platform: String,
    pub caption: String,
    pub description: String,
}

impl PolicyReview {
    pub fn render_request(&self) -> String {
        format!(
            "Review this content for policy compliance.\n\
             \n\
             PLATFORM: {}\n\
             CAPTION: {}\n\
             \n\
             CONTENT DESCRIPTION:\n\
             {}\n\
             \n\
             Provide the full structured report.",
            self.platform,
            if self.caption.is_empty() {
                "No caption provided"
            } else {
                &self.caption
            },
            self.description,
        )
    }
}

/// One remote review call per invocation. The reviewer cannot see the
/// actual media, so the report is based on the description and flags
/// anything that needs manual visual review.
#[derive(Clone)]
pub struct ComplianceChecker {
    client: openai::Client,
    model_name: String,
    guidelines: GuidelineStore,
}

impl ComplianceChecker {
    pub fn new(client: openai::Client, model_name: &str, guidelines: GuidelineStore) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
            guidelines,
        }
    }

    pub async fn review_design(
        &self,
        review: &DesignReview,
        config: &GenerationConfig,
    ) -> Result<String> {
        let preamble = design_system_prompt(&self.guidelines.design(), config);
        self.run("design-compliance", &preamble, &review.render_request())
            .await
    }

    pub async fn review_policy(
        &self,
        review: &PolicyReview,
        config: &GenerationConfig,
    ) -> Result<String> {
        let preamble = policy_system_prompt(&self.guidelines.policy(), config);
        self.run("policy-compliance", &preamble, &review.render_request())
            .await
    }

    async fn run(&self, name: &str, preamble: &str, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model_name)
            .name(name)
            .preamble(preamble)
            .build();

        Ok(agent.prompt(prompt).await?)
    }
}

fn design_system_prompt(guidelines: &str, config: &GenerationConfig) -> String {
    format!(
        "You are a design compliance reviewer for AI-generated visual content.\n\
         \n\
         DESIGN GUIDELINES:\n\
         {guidelines}\n\
         \n\
         Session context:\n\
         - Preferred video aspect ratio: {} ({})\n\
         - Preferred image size: {}\n\
         \n\
         Review the content description against the guidelines. You cannot see\n\
         the actual media, so base the assessment on the description and flag\n\
         anything that needs manual visual review.\n\
         \n\
         Format the response exactly as:\n\
         ===========================================\n\
         \x20     DESIGN COMPLIANCE REPORT\n\
         ===========================================\n\
         \n\
         OVERALL STATUS: [PASS / WARNING / FAIL]\n\
         SCORE: [X/10]\n\
         CONTENT TYPE: [IMAGE or VIDEO]\n\
         \n\
         CATEGORY ASSESSMENT\n\
         1. Color and branding: [status and notes]\n\
         2. Composition and framing: [status and notes]\n\
         3. Technical quality: [status and notes]\n\
         4. Accessibility: [status and notes]\n\
         5. Platform optimization: [status and notes]\n\
         \n\
         POTENTIAL ISSUES\n\
         [list, or \"None identified\"]\n\
         \n\
         RECOMMENDATIONS\n\
         [actionable design recommendations]\n\
         \n\
         MANUAL REVIEW NEEDED\n\
         [aspects that require human visual review]",
        config.video_aspect_ratio,
        config.video_resolution(),
        config.image_size,
    )
}

fn policy_system_prompt(guidelines: &str, config: &GenerationConfig) -> String {
    format!(
        "You are a content policy compliance reviewer for AI-generated social\n\
         media content.\n\
         \n\
         POLICY GUIDELINES:\n\
         {guidelines}\n\
         \n\
         Session context:\n\
         - Preferred caption style: {}\n\
         \n\
         Analyze the content and provide a structured report. Be thorough but\n\
         fair.\n\
         \n\
         Format the response exactly as:\n\
         ===========================================\n\
         \x20     POLICY COMPLIANCE REPORT\n\
         ===========================================\n\
         \n\
         OVERALL STATUS: [PASS / WARNING / FAIL]\n\
         SCORE: [X/10]\n\
         \n\
         CATEGORY ASSESSMENT\n\
         1. Prohibited content: [status and notes]\n\
         2. Brand voice and tone: [status and notes]\n\
         3. Claims and accuracy: [status and notes]\n\
         4. Disclosure requirements: [status and notes]\n\
         5. Platform fit: [status and notes]\n\
         \n\
         POTENTIAL ISSUES\n\
         [list, or \"None identified\"]\n\
         \n\
         RECOMMENDATIONS\n\
         [actionable policy recommendations]",
        config.caption_style,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_request_marks_missing_fields() {
        let review = DesignReview {
            content_type: "image".to_string(),
            description: "A flat geometric poster".to_string(),
            ..Default::default()
        };
        let request = review.render_request();
        assert!(request.contains("CONTENT TYPE: image"));
        assert!(request.contains("RESOLUTION: Not specified"));
        assert!(request.contains("A flat geometric poster"));
        assert!(!request.contains("ADDITIONAL CONTEXT"));
    }

    #[test]
    fn design_request_includes_context_when_present() {
        let review = DesignReview {
            content_type: "video".to_string(),
            resolution: "1920x1080".to_string(),
            description: "Product teaser".to_string(),
            additional_context: "Uses brand orange".to_string(),
        };
        let request = review.render_request();
        assert!(request.contains("RESOLUTION: 1920x1080"));
        assert!(request.contains("ADDITIONAL CONTEXT: Uses brand orange"));
    }

    #[test]
    fn policy_request_marks_missing_caption() {
        let review = PolicyReview {
            platform: "instagram".to_string(),
            caption: String::new(),
            description: "Launch announcement".to_string(),
        };
        let request = review.render_request();
        assert!(request.contains("PLATFORM: instagram"));
        assert!(request.contains("CAPTION: No caption provided"));
    }

    #[test]
    fn system_prompts_embed_guidelines_and_config() {
        let config = GenerationConfig::default();
        let design = design_system_prompt("RULE: blue only", &config);
        assert!(design.contains("RULE: blue only"));
        assert!(design.contains("16:9 (1920x1080)"));
        assert!(design.contains("1024x1024"));

        let policy = policy_system_prompt("RULE: no claims", &config);
        assert!(policy.contains("RULE: no claims"));
        assert!(policy.contains("professional"));
    }
}
