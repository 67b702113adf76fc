pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tiksave_core::{
    compact_count, display_date, download_links, format_engagement, load_or_default,
    DashboardState, DownloadedFile, FetchClient, FetchError, Insights, InsightsClient,
    MediaDownloader, MediaLink, TiksaveConfig, VideoRecord,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{DownloadArgs, FetchArgs, LinksArgs};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] tiksave_core::ConfigError),
    #[error("{0}")]
    EmptyLink(String),
    #[error("{message}")]
    Fetch { kind: &'static str, message: String },
    #[error("{0}")]
    ClientSetup(FetchError),
    #[error("download failed: {0}")]
    Download(#[from] tiksave_core::DownloadError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch post metadata and media links from a share link", long_about = None)]
pub struct Cli {
    /// Path to tiksave.toml (defaults are used when the file is absent)
    #[arg(long, default_value = "configs/tiksave.toml")]
    pub config: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Log fetch diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a post and show the results dashboard
    Fetch(FetchArgs),
    /// Print only the direct download links
    Links(LinksArgs),
    /// Save media from a post to disk
    Download(DownloadArgs),
    /// Show the effective configuration
    Config,
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,fetch=debug,insights=debug,download=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    let context = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Fetch(args) => {
            let report = context.dashboard(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Links(args) => {
            let record = context.fetch_record(&args.link).await?;
            let links = LinkList {
                links: download_links(&record),
            };
            render(&links, cli.format)?;
        }
        Commands::Download(args) => {
            let report = context.download(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Config => {
            render(&context.config, cli.format)?;
        }
    }

    Ok(())
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

trait DisplayFallback {
    fn display(&self) -> String;
}

struct AppContext {
    config: TiksaveConfig,
}

impl AppContext {
    fn new(cli: &Cli) -> Result<Self> {
        let config = load_or_default(&cli.config)?;
        Ok(Self { config })
    }

    async fn fetch_record(&self, link: &str) -> Result<VideoRecord> {
        let mut state = DashboardState::new();
        state.set_link(link);
        if !state.begin_fetch() {
            return Err(AppError::EmptyLink(state.toast.unwrap_or_default()));
        }

        let client =
            FetchClient::from_config(&self.config.provider).map_err(AppError::ClientSetup)?;
        let outcome = client.fetch(&state.link).await;
        let kind = outcome.as_ref().err().map(FetchError::kind);
        state.complete(outcome);

        match (state.record, state.error) {
            (Some(record), _) => Ok(record),
            (None, error) => Err(AppError::Fetch {
                kind: kind.unwrap_or("unknown"),
                message: error.unwrap_or_default(),
            }),
        }
    }

    async fn dashboard(&self, args: &FetchArgs) -> Result<DashboardReport> {
        let record = self.fetch_record(&args.link).await?;
        let insights = if args.insights {
            self.insights(&record).await
        } else {
            None
        };
        Ok(DashboardReport::new(record, insights))
    }

    async fn insights(&self, record: &VideoRecord) -> Option<Insights> {
        if !self.config.insights.enabled {
            info!(target: "insights", "insights disabled in config");
            return None;
        }
        let client = InsightsClient::from_config(&self.config.insights);
        Some(client.summarize(record).await)
    }

    async fn download(&self, args: &DownloadArgs) -> Result<DownloadReport> {
        let record = self.fetch_record(&args.link).await?;
        let dir = self.config.resolve_output_dir(args.out.as_ref());
        let files = MediaDownloader::from_config(&self.config.download)
            .save_selection(&record, args.kind.into(), &dir)
            .await?;
        Ok(DownloadReport {
            id: record.id,
            files,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub record: VideoRecord,
    pub posted: String,
    pub engagement: String,
    pub slideshow: bool,
    pub links: Vec<MediaLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}

impl DashboardReport {
    pub fn new(record: VideoRecord, insights: Option<Insights>) -> Self {
        Self {
            posted: display_date(&record),
            engagement: format_engagement(&record),
            slideshow: record.is_slideshow(),
            links: download_links(&record),
            record,
            insights,
        }
    }
}

impl DisplayFallback for DashboardReport {
    fn display(&self) -> String {
        let record = &self.record;
        let caption = if record.caption.is_empty() {
            "<no caption>"
        } else {
            record.caption.as_str()
        };
        let mut lines = vec![
            caption.to_string(),
            format!(
                "by {} (@{}) | {} | {}s | {}",
                record.author.display_name,
                record.author.handle,
                self.posted,
                record.duration_seconds,
                if record.region.is_empty() {
                    "-"
                } else {
                    record.region.as_str()
                }
            ),
        ];
        if let Some(bio) = record.author.bio.as_deref().filter(|bio| !bio.is_empty()) {
            lines.push(format!("bio: {bio}"));
        }
        let stats = &record.stats;
        lines.push(format!(
            "Plays {} | Likes {} | Comments {} | Shares {} | Saved {}",
            compact_count(stats.play_count),
            compact_count(stats.like_count),
            compact_count(stats.comment_count),
            compact_count(stats.share_count),
            compact_count(stats.collect_count),
        ));
        lines.push(format!("Engagement: {}", self.engagement));
        let audio = &record.audio_info;
        if !audio.title.is_empty() {
            let origin = if audio.is_original_sound {
                " (original sound)"
            } else {
                ""
            };
            lines.push(format!("Music: {} by {}{origin}", audio.title, audio.author));
        }
        lines.push("Download Media:".to_string());
        for link in &self.links {
            lines.push(link.display());
        }
        if self.slideshow {
            lines.push(format!(
                "Slideshow detected: {} images, each listed above.",
                record.images().len()
            ));
        }
        if let Some(insights) = &self.insights {
            lines.push(insights.display());
        }
        lines.join("\n")
    }
}

impl DisplayFallback for MediaLink {
    fn display(&self) -> String {
        format!("  - {} ({}): {}", self.label, self.sub_label, self.url)
    }
}

impl DisplayFallback for Insights {
    fn display(&self) -> String {
        let mut lines = vec!["AI Insights:".to_string(), "  Captions:".to_string()];
        for caption in &self.captions {
            lines.push(format!("    - {caption}"));
        }
        lines.push(format!("  Hashtags: {}", self.hashtags.join(" ")));
        lines.push(format!("  Analysis: {}", self.analysis));
        lines.push(format!("  Best time to post: {}", self.best_posting_time));
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct LinkList {
    pub links: Vec<MediaLink>,
}

impl DisplayFallback for LinkList {
    fn display(&self) -> String {
        if self.links.is_empty() {
            return "No downloadable media".to_string();
        }
        self.links
            .iter()
            .map(|link| link.display())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadReport {
    pub id: String,
    pub files: Vec<DownloadedFile>,
}

impl DisplayFallback for DownloadReport {
    fn display(&self) -> String {
        let mut lines = vec![format!("Saved {} file(s) for {}", self.files.len(), self.id)];
        for file in &self.files {
            lines.push(format!(
                "  - {} -> {} ({} bytes)",
                file.kind.as_str(),
                file.path.display(),
                file.bytes
            ));
        }
        lines.join("\n")
    }
}

impl DisplayFallback for TiksaveConfig {
    fn display(&self) -> String {
        let key_state = if self.insights.resolve_api_key().is_some() {
            "set"
        } else {
            "missing"
        };
        [
            format!("provider.base_url = {}", self.provider.base_url),
            format!("provider.timeout_seconds = {}", self.provider.timeout_seconds),
            format!(
                "provider.user_agent = {}",
                self.provider.user_agent.as_deref().unwrap_or("-")
            ),
            format!("insights.enabled = {}", self.insights.enabled),
            format!("insights.endpoint = {}", self.insights.endpoint),
            format!("insights.model = {}", self.insights.model),
            format!(
                "insights.api_key ({}) = {key_state}",
                self.insights.api_key_env
            ),
            format!("download.output_dir = {}", self.download.output_dir),
            format!("download.timeout_seconds = {}", self.download.timeout_seconds),
        ]
        .join("\n")
    }
}
