mod agents;
mod capabilities;
mod config;
mod errors;
mod guidelines;
mod session;
mod util;

use std::io::ErrorKind;

use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::{
    config::{AppConfig, GenerationConfig},
    errors::Result,
    session::{Flow, Session},
    util::{format_utc, now_utc, prompt_line},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();
    print_banner();

    let app_config = AppConfig::load()?;
    println!("API key found.");

    println!("\nLet's configure your content generation settings.");
    println!("(Press Enter to accept default values)");
    let config = GenerationConfig::collect_from_user()?;

    println!("\nInitializing content generation agent...");
    let mut session = Session::new(&app_config, config).await?;
    println!("Agent ready.");

    println!("{}", session::help_text());

    println!("\n{}", "=".repeat(65));
    println!("  Start chatting! Tell me about your event or content needs.");
    println!("{}", "=".repeat(65));

    loop {
        let line = match prompt_line("\nYou: ") {
            Ok(line) => line,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                println!("\nGoodbye! Thanks for using the content agent.");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        if let Flow::Exit = session.handle_line(&line).await {
            break;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_timer(UtcTimer)
        .init();

    info!("tracing initialized");
}

fn print_banner() {
    println!("{}", "=".repeat(65));
    println!("  CONTENT GENERATION AGENT");
    println!("  AI-powered social media content creator");
    println!("{}", "=".repeat(65));
}

struct UtcTimer;

impl FormatTime for UtcTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = now_utc();
        write!(w, "{}", format_utc(&now, "%Y-%m-%dT%H:%M:%SZ"))
    }
}
