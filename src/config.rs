use std::{env, fmt, fs, io, path::PathBuf};

use anyhow::{Context, anyhow};
use rig::providers::openai;
use serde::Deserialize;

use crate::util::{is_affirmative, is_negative, prompt_line};

const DEFAULT_CONFIG_PATH: &str = "config/app_config.toml";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_VIDEO_MODEL: &str = "sora-2";
const DEFAULT_VIDEO_ENDPOINT: &str = "https://api.openai.com/v1/videos";
const DEFAULT_ARTIFACTS_DIR: &str = "generated_content";
const DEFAULT_GUIDELINES_DIR: &str = "guidelines";
const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

pub const MIN_VIDEO_SECONDS: u32 = 5;
pub const MAX_VIDEO_SECONDS: u32 = 60;

#[derive(Clone, Copy, Debug)]
pub struct ResolutionEntry {
    pub size: &'static str,
    pub description: &'static str,
    pub platforms: &'static [&'static str],
}

const LANDSCAPE_16X9: ResolutionEntry = ResolutionEntry {
    size: "1920x1080",
    description: "Landscape - YouTube, LinkedIn, Twitter",
    platforms: &["YouTube", "LinkedIn", "Twitter", "Facebook"],
};

const PORTRAIT_9X16: ResolutionEntry = ResolutionEntry {
    size: "1080x1920",
    description: "Portrait - TikTok, Instagram Reels, YouTube Shorts",
    platforms: &["TikTok", "Instagram Reels", "YouTube Shorts", "Snapchat"],
};

const SQUARE_1X1: ResolutionEntry = ResolutionEntry {
    size: "1080x1080",
    description: "Square - Instagram Feed, Facebook",
    platforms: &["Instagram Feed", "Facebook", "LinkedIn"],
};

const PORTRAIT_4X5: ResolutionEntry = ResolutionEntry {
    size: "1080x1350",
    description: "Portrait (4:5) - Instagram Feed optimal",
    platforms: &["Instagram Feed", "Facebook"],
};

const ULTRAWIDE_21X9: ResolutionEntry = ResolutionEntry {
    size: "2560x1080",
    description: "Ultra-wide - Cinematic content",
    platforms: &["YouTube", "Cinematic"],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectRatio {
    Landscape16x9,
    Portrait9x16,
    Square1x1,
    Portrait4x5,
    UltraWide21x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Landscape16x9,
        AspectRatio::Portrait9x16,
        AspectRatio::Square1x1,
        AspectRatio::Portrait4x5,
        AspectRatio::UltraWide21x9,
    ];

    pub fn as_label(&self) -> &'static str {
        match self {
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Square1x1 => "1:1",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::UltraWide21x9 => "21:9",
        }
    }

    pub fn entry(&self) -> &'static ResolutionEntry {
        match self {
            AspectRatio::Landscape16x9 => &LANDSCAPE_16X9,
            AspectRatio::Portrait9x16 => &PORTRAIT_9X16,
            AspectRatio::Square1x1 => &SQUARE_1X1,
            AspectRatio::Portrait4x5 => &PORTRAIT_4X5,
            AspectRatio::UltraWide21x9 => &ULTRAWIDE_21X9,
        }
    }

    pub fn resolution(&self) -> &'static str {
        self.entry().size
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "16:9" => Some(AspectRatio::Landscape16x9),
            "9:16" => Some(AspectRatio::Portrait9x16),
            "1:1" => Some(AspectRatio::Square1x1),
            "4:5" => Some(AspectRatio::Portrait4x5),
            "21:9" => Some(AspectRatio::UltraWide21x9),
            _ => None,
        }
    }

    /// Total lookup over any label. Unknown labels resolve to the 16:9
    /// entry so a stale label can never take the session down.
    pub fn resolve(label: &str) -> &'static ResolutionEntry {
        Self::parse(label)
            .unwrap_or(AspectRatio::Landscape16x9)
            .entry()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionStyle {
    Professional,
    Casual,
    Creative,
}

impl CaptionStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionStyle::Professional => "professional",
            CaptionStyle::Casual => "casual",
            CaptionStyle::Creative => "creative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "professional" => Some(CaptionStyle::Professional),
            "casual" => Some(CaptionStyle::Casual),
            "creative" => Some(CaptionStyle::Creative),
            _ => None,
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSize {
    Square1024,
    Landscape1792,
    Portrait1792,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Landscape1792 => "1792x1024",
            ImageSize::Portrait1792 => "1024x1792",
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Square1024 => (1024, 1024),
            ImageSize::Landscape1792 => (1792, 1024),
            ImageSize::Portrait1792 => (1024, 1792),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1024x1024" => Some(ImageSize::Square1024),
            "1792x1024" => Some(ImageSize::Landscape1792),
            "1024x1792" => Some(ImageSize::Portrait1792),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageQuality {
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Some(ImageQuality::Standard),
            "hd" => Some(ImageQuality::Hd),
            _ => None,
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime generation settings, owned by the session and passed by
/// reference into agents and capability tools on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    pub video_duration: u32,
    pub video_aspect_ratio: AspectRatio,
    pub enable_captions: bool,
    pub caption_style: CaptionStyle,
    pub image_size: ImageSize,
    pub image_quality: ImageQuality,
    pub auto_compliance_check: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            video_duration: 10,
            video_aspect_ratio: AspectRatio::Landscape16x9,
            enable_captions: true,
            caption_style: CaptionStyle::Professional,
            image_size: ImageSize::Square1024,
            image_quality: ImageQuality::Hd,
            auto_compliance_check: false,
        }
    }
}

impl GenerationConfig {
    pub fn video_resolution(&self) -> &'static str {
        self.video_aspect_ratio.resolution()
    }

    pub fn clamp_duration(seconds: u32) -> u32 {
        seconds.clamp(MIN_VIDEO_SECONDS, MAX_VIDEO_SECONDS)
    }

    /// Interactive field-by-field collection. Every field starts from its
    /// current default; invalid entries keep the default with a warning.
    pub fn collect_from_user() -> io::Result<Self> {
        println!("\nConfiguration setup");
        println!("{}", "=".repeat(50));

        let mut config = GenerationConfig::default();

        println!("\nVideo settings:");
        let duration = prompt_line(&format!(
            "  Duration in seconds ({MIN_VIDEO_SECONDS}-{MAX_VIDEO_SECONDS}) [default: {}]: ",
            config.video_duration
        ))?;
        if !duration.is_empty() {
            match duration.parse::<u32>() {
                Ok(value) if (MIN_VIDEO_SECONDS..=MAX_VIDEO_SECONDS).contains(&value) => {
                    config.video_duration = value;
                }
                Ok(_) => println!("  Out of range, keeping {}s.", config.video_duration),
                Err(_) => println!("  Not a number, keeping {}s.", config.video_duration),
            }
        }

        println!("\n  Available aspect ratios:");
        for ratio in AspectRatio::ALL {
            let entry = ratio.entry();
            println!("    {} ({}) - {}", ratio, entry.size, entry.description);
        }
        let aspect = prompt_line(&format!(
            "\n  Aspect ratio [default: {}]: ",
            config.video_aspect_ratio
        ))?;
        if !aspect.is_empty() {
            match AspectRatio::parse(&aspect) {
                Some(value) => config.video_aspect_ratio = value,
                None => println!(
                    "  Unknown aspect ratio, keeping {}.",
                    config.video_aspect_ratio
                ),
            }
        }

        println!("\nCaption settings:");
        let captions = prompt_line(&format!(
            "  Enable captions? (yes/no) [default: {}]: ",
            if config.enable_captions { "yes" } else { "no" }
        ))?;
        if is_affirmative(&captions) {
            config.enable_captions = true;
        } else if is_negative(&captions) {
            config.enable_captions = false;
        }

        if config.enable_captions {
            let style = prompt_line(&format!(
                "  Caption style (professional/casual/creative) [default: {}]: ",
                config.caption_style
            ))?;
            if !style.is_empty() {
                match CaptionStyle::parse(&style) {
                    Some(value) => config.caption_style = value,
                    None => println!("  Unknown style, keeping {}.", config.caption_style),
                }
            }
        }

        println!("\nImage settings:");
        println!("  Available sizes:");
        println!("    1024x1024 - Square");
        println!("    1792x1024 - Landscape");
        println!("    1024x1792 - Portrait");
        let size = prompt_line(&format!("\n  Image size [default: {}]: ", config.image_size))?;
        if !size.is_empty() {
            match ImageSize::parse(&size) {
                Some(value) => config.image_size = value,
                None => println!("  Unknown size, keeping {}.", config.image_size),
            }
        }

        let quality = prompt_line(&format!(
            "  Image quality (standard/hd) [default: {}]: ",
            config.image_quality
        ))?;
        if !quality.is_empty() {
            match ImageQuality::parse(&quality) {
                Some(value) => config.image_quality = value,
                None => println!("  Unknown quality, keeping {}.", config.image_quality),
            }
        }

        println!("\nCompliance settings:");
        let compliance = prompt_line(&format!(
            "  Auto-run compliance checks after generation? (yes/no) [default: {}]: ",
            if config.auto_compliance_check {
                "yes"
            } else {
                "no"
            }
        ))?;
        if is_affirmative(&compliance) {
            config.auto_compliance_check = true;
        } else if is_negative(&compliance) {
            config.auto_compliance_check = false;
        }

        println!("\nConfiguration saved.");
        println!("{config}");

        Ok(config)
    }
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current configuration")?;
        writeln!(
            f,
            "  Video:      video_duration={}s, video_aspect_ratio={}, video_resolution={}",
            self.video_duration,
            self.video_aspect_ratio,
            self.video_resolution()
        )?;
        writeln!(
            f,
            "  Captions:   enable_captions={}, caption_style={}",
            self.enable_captions, self.caption_style
        )?;
        writeln!(
            f,
            "  Image:      image_size={}, image_quality={}",
            self.image_size, self.image_quality
        )?;
        write!(
            f,
            "  Compliance: auto_compliance_check={}",
            self.auto_compliance_check
        )
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub chat_model: String,
    pub image_model: String,
}

#[derive(Clone, Debug)]
pub struct VideoServiceConfig {
    pub endpoint: String,
    pub model: String,
}

/// Provider settings loaded once at startup. The API key comes from the
/// environment (or the optional TOML file); its absence is fatal before
/// the session starts.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub video: VideoServiceConfig,
    pub artifacts_dir: PathBuf,
    pub guidelines_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            env::var("CONTENT_AGENT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file_config = match fs::read_to_string(&config_path) {
            Ok(contents) => toml::from_str::<FileConfig>(&contents)
                .with_context(|| format!("failed to parse config file {config_path:?}"))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => FileConfig::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file {config_path:?}"));
            }
        };

        let openai = file_config.openai.unwrap_or_default().into_domain()?;
        let video = file_config.video.unwrap_or_default().into_domain();

        let artifacts_dir = file_config
            .artifacts_dir
            .map(PathBuf::from)
            .or_else(|| env::var("ARTIFACTS_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        let guidelines_dir = file_config
            .guidelines_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GUIDELINES_DIR));

        Ok(Self {
            openai,
            video,
            artifacts_dir,
            guidelines_dir,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    artifacts_dir: Option<String>,
    #[serde(default)]
    guidelines_dir: Option<String>,
    #[serde(default)]
    openai: Option<FileOpenAiConfig>,
    #[serde(default)]
    video: Option<FileVideoConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileOpenAiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    chat_model: Option<String>,
    #[serde(default)]
    image_model: Option<String>,
}

impl FileOpenAiConfig {
    fn into_domain(self) -> anyhow::Result<OpenAiConfig> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty() && key != PLACEHOLDER_API_KEY)
            .or(self.api_key)
            .ok_or_else(|| {
                anyhow!(
                    "OPENAI_API_KEY is not set; export it or add it to the [openai] \
                     section of {DEFAULT_CONFIG_PATH}"
                )
            })?;

        Ok(OpenAiConfig {
            api_key,
            base_url: self.base_url.or_else(|| env::var("OPENAI_BASE_URL").ok()),
            chat_model: self
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| openai::DALL_E_3.to_string()),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileVideoConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl FileVideoConfig {
    fn into_domain(self) -> VideoServiceConfig {
        VideoServiceConfig {
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_VIDEO_ENDPOINT.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_documented_labels() {
        assert_eq!(AspectRatio::resolve("16:9").size, "1920x1080");
        assert_eq!(AspectRatio::resolve("9:16").size, "1080x1920");
        assert_eq!(AspectRatio::resolve("1:1").size, "1080x1080");
        assert_eq!(AspectRatio::resolve("4:5").size, "1080x1350");
        assert_eq!(AspectRatio::resolve("21:9").size, "2560x1080");
    }

    #[test]
    fn unknown_label_falls_back_to_landscape() {
        assert_eq!(AspectRatio::resolve("3:2").size, "1920x1080");
        assert_eq!(AspectRatio::resolve("").size, "1920x1080");
    }

    #[test]
    fn resolve_is_idempotent() {
        let first = AspectRatio::resolve("9:16").size;
        let second = AspectRatio::resolve("9:16").size;
        assert_eq!(first, second);
    }

    #[test]
    fn duration_clamped_into_range() {
        assert_eq!(GenerationConfig::clamp_duration(0), 5);
        assert_eq!(GenerationConfig::clamp_duration(4), 5);
        assert_eq!(GenerationConfig::clamp_duration(5), 5);
        assert_eq!(GenerationConfig::clamp_duration(30), 30);
        assert_eq!(GenerationConfig::clamp_duration(60), 60);
        assert_eq!(GenerationConfig::clamp_duration(61), 60);
        assert_eq!(GenerationConfig::clamp_duration(600), 60);
    }

    #[test]
    fn default_settings_render() {
        let config = GenerationConfig::default();
        let rendered = config.to_string();
        assert!(rendered.contains("video_duration=10s"));
        assert!(rendered.contains("video_aspect_ratio=16:9"));
        assert!(rendered.contains("video_resolution=1920x1080"));
        assert!(rendered.contains("enable_captions=true"));
        assert!(rendered.contains("caption_style=professional"));
        assert!(rendered.contains("image_size=1024x1024"));
        assert!(rendered.contains("image_quality=hd"));
        assert!(rendered.contains("auto_compliance_check=false"));
    }

    #[test]
    fn portrait_aspect_changes_resolution() {
        let mut config = GenerationConfig::default();
        config.video_aspect_ratio = AspectRatio::Portrait9x16;
        assert_eq!(config.video_resolution(), "1080x1920");
    }

    #[test]
    fn parses_enum_labels() {
        assert_eq!(AspectRatio::parse("9:16"), Some(AspectRatio::Portrait9x16));
        assert_eq!(AspectRatio::parse("2:1"), None);
        assert_eq!(
            CaptionStyle::parse("Creative"),
            Some(CaptionStyle::Creative)
        );
        assert_eq!(CaptionStyle::parse("formal"), None);
        assert_eq!(
            ImageSize::parse("1792x1024"),
            Some(ImageSize::Landscape1792)
        );
        assert_eq!(ImageSize::parse("2048x2048"), None);
        assert_eq!(ImageQuality::parse("HD"), Some(ImageQuality::Hd));
        assert_eq!(ImageQuality::parse("ultra"), None);
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let parsed: FileConfig = toml::from_str(
            r#"
            artifacts_dir = "out"

            [video]
            endpoint = "http://localhost:9000/videos"
            "#,
        )
        .expect("parse");

        assert_eq!(parsed.artifacts_dir.as_deref(), Some("out"));
        let video = parsed.video.unwrap().into_domain();
        assert_eq!(video.endpoint, "http://localhost:9000/videos");
        assert_eq!(video.model, DEFAULT_VIDEO_MODEL);
    }
}
