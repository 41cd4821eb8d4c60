use crate::{
    agents::{ContentAgent, ConversationHistory, DesignAgent, PolicyAgent},
    capabilities::{ComplianceChecker, DesignReview, PolicyReview},
    config::{AppConfig, GenerationConfig},
    errors::Result,
    guidelines::GuidelineStore,
    util::{ArtifactWriter, is_affirmative, prompt_line, prompt_with_default},
};
use rig::providers::openai;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Config,
    Settings,
    Clear,
    Design,
    Policy,
    Help,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Command> {
        match input.trim().to_lowercase().as_str() {
            "/config" => Some(Command::Config),
            "/settings" => Some(Command::Settings),
            "/clear" => Some(Command::Clear),
            "/design" => Some(Command::Design),
            "/policy" => Some(Command::Policy),
            "/help" => Some(Command::Help),
            "/exit" | "/quit" => Some(Command::Exit),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

const RULE: &str = "-------------------------------------------------------";

/// The interactive session driver. Owns the generation configuration and
/// one lazily-created conversation history per agent; every user line is
/// classified as a slash command or a content turn and routed accordingly.
pub struct Session {
    config: GenerationConfig,
    content: ContentAgent,
    design: DesignAgent,
    policy: PolicyAgent,
    content_history: Option<ConversationHistory>,
    design_history: Option<ConversationHistory>,
    policy_history: Option<ConversationHistory>,
}

impl Session {
    pub async fn new(app: &AppConfig, config: GenerationConfig) -> Result<Self> {
        let mut builder = openai::Client::builder(&app.openai.api_key);
        if let Some(base_url) = app.openai.base_url.as_deref() {
            builder = builder.base_url(base_url);
        }
        let client = builder.build();

        let guidelines = GuidelineStore::new(app.guidelines_dir.clone());
        let writer = ArtifactWriter::new(app.artifacts_dir.clone()).await?;
        let checker = ComplianceChecker::new(client.clone(), &app.openai.chat_model, guidelines.clone());

        Ok(Self {
            content: ContentAgent::new(client, app, guidelines, writer),
            design: DesignAgent::new(checker.clone()),
            policy: PolicyAgent::new(checker),
            config,
            content_history: None,
            design_history: None,
            policy_history: None,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let input = line.trim();
        if input.is_empty() {
            return Flow::Continue;
        }

        if input.starts_with('/') {
            return match Command::parse(input) {
                Some(command) => self.run_command(command).await,
                None => {
                    println!("Unknown command: {input}");
                    println!("Type /help to see available commands.");
                    Flow::Continue
                }
            };
        }

        self.content_turn(input).await;
        Flow::Continue
    }

    async fn run_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Config => {
                println!("\nReconfiguring settings...");
                match GenerationConfig::collect_from_user() {
                    Ok(config) => {
                        self.config = config;
                        info!(target: "session", "configuration replaced");
                        println!("Configuration updated.");
                    }
                    Err(err) => println!("Failed to read configuration input: {err}"),
                }
            }
            Command::Settings => println!("{}", self.config),
            Command::Clear => {
                if let Some(history) = self.content_history.as_mut() {
                    history.clear();
                }
                println!("Conversation history cleared.");
            }
            Command::Design => self.design_review().await,
            Command::Policy => self.policy_review().await,
            Command::Help => println!("{}", help_text()),
            Command::Exit => {
                println!("\nGoodbye! Thanks for using the content agent.");
                return Flow::Exit;
            }
        }

        Flow::Continue
    }

    async fn content_turn(&mut self, input: &str) {
        println!("\nAgent:");
        println!("{RULE}");

        let history = self.content_history.get_or_insert_with(ConversationHistory::new);
        match self.content.handle_turn(&self.config, history, input).await {
            Ok(outcome) => println!("{}", outcome.render()),
            Err(err) => {
                warn!(target: "session", error = %err, "content turn failed");
                println!("The request failed: {err}");
                println!("{RULE}");
                return;
            }
        }
        println!("{RULE}");

        if self.config.auto_compliance_check {
            self.offer_compliance().await;
        }
    }

    /// Post-generation compliance offer. Only an affirmative answer runs
    /// the checks; failures here never roll back the content turn.
    async fn offer_compliance(&mut self) {
        let answer = match prompt_line(
            "\nRun policy/design compliance checks now? (yes/no) [default: no]: ",
        ) {
            Ok(answer) => answer,
            Err(_) => return,
        };

        if is_affirmative(&answer) {
            if let Err(err) = self.run_compliance_flow().await {
                println!("Compliance flow aborted: {err}");
            }
        }
    }

    async fn run_compliance_flow(&mut self) -> std::io::Result<()> {
        println!("\nCompliance check");
        let description = prompt_line("  Describe the generated content (required): ")?;
        if description.is_empty() {
            println!("  A content description is required. Skipping compliance.");
            return Ok(());
        }

        let content_type =
            prompt_with_default("  Content type (image/video) [default: image]: ", "image")?
                .to_lowercase();
        let resolution = prompt_line("  Resolution (e.g., 1920x1080) [optional]: ")?;
        let additional_context = prompt_line("  Additional context for design check [optional]: ")?;

        let platform = prompt_with_default(
            "  Target platform (instagram/linkedin/twitter/etc.) [default: general]: ",
            "general",
        )?
        .to_lowercase();
        let caption = prompt_line("  Caption text used (if any) [optional]: ")?;

        println!("\nRunning design compliance...");
        let review = DesignReview {
            content_type,
            resolution,
            description: description.clone(),
            additional_context,
        };
        self.run_design(&review).await;

        println!("\nRunning policy compliance...");
        let review = PolicyReview {
            platform,
            caption,
            description,
        };
        self.run_policy(&review).await;

        Ok(())
    }

    async fn design_review(&mut self) {
        println!("\nDesign compliance");
        let inputs = (|| -> std::io::Result<Option<DesignReview>> {
            let content_type =
                prompt_with_default("  Content type (image/video) [default: image]: ", "image")?
                    .to_lowercase();
            let resolution = prompt_line("  Resolution (e.g., 1920x1080) [optional]: ")?;
            let description = prompt_line("  Describe the content (required): ")?;
            let additional_context = prompt_line("  Additional context [optional]: ")?;

            if description.is_empty() {
                return Ok(None);
            }

            Ok(Some(DesignReview {
                content_type,
                resolution,
                description,
                additional_context,
            }))
        })();

        match inputs {
            Ok(Some(review)) => {
                println!("\nDesign agent:");
                println!("{RULE}");
                self.run_design(&review).await;
                println!("{RULE}");
            }
            Ok(None) => println!("  A content description is required."),
            Err(err) => println!("Failed to read review input: {err}"),
        }
    }

    async fn policy_review(&mut self) {
        println!("\nPolicy compliance");
        let inputs = (|| -> std::io::Result<Option<PolicyReview>> {
            let platform = prompt_with_default(
                "  Target platform (instagram/linkedin/twitter/etc.) [default: general]: ",
                "general",
            )?
            .to_lowercase();
            let description = prompt_line("  Describe the content (required): ")?;
            let caption = prompt_line("  Caption text used (if any) [optional]: ")?;

            if description.is_empty() {
                return Ok(None);
            }

            Ok(Some(PolicyReview {
                platform,
                caption,
                description,
            }))
        })();

        match inputs {
            Ok(Some(review)) => {
                println!("\nPolicy agent:");
                println!("{RULE}");
                self.run_policy(&review).await;
                println!("{RULE}");
            }
            Ok(None) => println!("  A content description is required."),
            Err(err) => println!("Failed to read review input: {err}"),
        }
    }

    async fn run_design(&mut self, review: &DesignReview) {
        let history = self.design_history.get_or_insert_with(ConversationHistory::new);
        match self.design.handle_turn(&self.config, history, review).await {
            Ok(report) => println!("{report}"),
            Err(err) => println!("Design compliance failed: {err}"),
        }
    }

    async fn run_policy(&mut self, review: &PolicyReview) {
        let history = self.policy_history.get_or_insert_with(ConversationHistory::new);
        match self.policy.handle_turn(&self.config, history, review).await {
            Ok(report) => println!("{report}"),
            Err(err) => println!("Policy compliance failed: {err}"),
        }
    }
}

pub fn help_text() -> &'static str {
    "\nAvailable commands\n\
     \x20 /config    Reconfigure generation settings\n\
     \x20 /settings  View current settings\n\
     \x20 /clear     Clear conversation history\n\
     \x20 /design    Run design compliance review\n\
     \x20 /policy    Run policy compliance review\n\
     \x20 /help      Show this help message\n\
     \x20 /exit      Exit the application\n\
     \x20 /quit      Exit the application\n\
     \n\
     Tips:\n\
     \x20 - Describe your event or theme and ask for content suggestions\n\
     \x20 - Request specific platforms: \"Create an Instagram post for...\"\n\
     \x20 - Ask for variations: \"Give me 3 different styles for...\"\n\
     \x20 - Refine results: \"Make it more professional\" or \"Add more energy\""
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OpenAiConfig, VideoServiceConfig};

    fn test_app_config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            openai: OpenAiConfig {
                api_key: "test-key".to_string(),
                base_url: Some("http://127.0.0.1:9".to_string()),
                chat_model: "gpt-4o".to_string(),
                image_model: "dall-e-3".to_string(),
            },
            video: VideoServiceConfig {
                endpoint: "http://127.0.0.1:9/videos".to_string(),
                model: "sora-2".to_string(),
            },
            artifacts_dir: dir.join("out"),
            guidelines_dir: dir.join("guidelines"),
        }
    }

    async fn test_session(dir: &std::path::Path) -> Session {
        Session::new(&test_app_config(dir), GenerationConfig::default())
            .await
            .expect("session")
    }

    #[test]
    fn parses_all_commands() {
        assert_eq!(Command::parse("/config"), Some(Command::Config));
        assert_eq!(Command::parse("/settings"), Some(Command::Settings));
        assert_eq!(Command::parse("/clear"), Some(Command::Clear));
        assert_eq!(Command::parse("/design"), Some(Command::Design));
        assert_eq!(Command::parse("/policy"), Some(Command::Policy));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/exit"), Some(Command::Exit));
        assert_eq!(Command::parse("/quit"), Some(Command::Exit));
    }

    #[test]
    fn command_parsing_is_case_insensitive() {
        assert_eq!(Command::parse("/EXIT"), Some(Command::Exit));
        assert_eq!(Command::parse("  /Help  "), Some(Command::Help));
    }

    #[test]
    fn non_commands_do_not_parse() {
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn exit_command_ends_the_loop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;
        assert_eq!(session.handle_line("/exit").await, Flow::Exit);
    }

    #[tokio::test]
    async fn quit_command_ends_the_loop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;
        assert_eq!(session.handle_line("/quit").await, Flow::Exit);
    }

    #[tokio::test]
    async fn empty_line_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;
        assert_eq!(session.handle_line("   ").await, Flow::Continue);
        assert!(session.content_history.is_none());
    }

    #[tokio::test]
    async fn unknown_command_keeps_the_loop_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;
        assert_eq!(session.handle_line("/bogus").await, Flow::Continue);
    }

    #[tokio::test]
    async fn settings_does_not_mutate_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;
        let before = session.config().clone();
        assert_eq!(session.handle_line("/settings").await, Flow::Continue);
        assert_eq!(session.config(), &before);
    }

    #[tokio::test]
    async fn clear_empties_only_the_content_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;

        let mut content = ConversationHistory::new();
        content.push_user("make a poster");
        content.push_assistant("done");
        session.content_history = Some(content);

        let mut design = ConversationHistory::new();
        design.push_user("review this");
        session.design_history = Some(design);

        assert_eq!(session.handle_line("/clear").await, Flow::Continue);

        assert!(session.content_history.as_ref().unwrap().is_empty());
        assert_eq!(session.design_history.as_ref().unwrap().len(), 1);
        assert!(session.policy_history.is_none());
    }

    #[tokio::test]
    async fn remote_failure_keeps_the_loop_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = test_session(dir.path()).await;

        // Both the planner and the video endpoint point at a closed local
        // port, so the turn fails without reaching any real service.
        assert_eq!(
            session.handle_line("make a video for the launch").await,
            Flow::Continue
        );

        // The failed turn recorded nothing.
        assert!(session.content_history.as_ref().unwrap().is_empty());
    }

    #[test]
    fn help_text_lists_every_command() {
        let help = help_text();
        for command in [
            "/config",
            "/settings",
            "/clear",
            "/design",
            "/policy",
            "/help",
            "/exit",
            "/quit",
        ] {
            assert!(help.contains(command), "missing {command}");
        }
    }
}
