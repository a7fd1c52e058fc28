//! Seltag - Interactive CSS Selector Tagging
//!
//! Command-line shell around the tagging pipeline.

use clap::{Parser, Subcommand, ValueEnum};
use seltag::config::{AppConfig, ConfigLoader};
use seltag::extract::{
    flatten_contents, DocumentExtractor, ExtractionResult, Extractor, SelectorContent,
};
use seltag::network::{HttpPageFetcher, PageFetcher};
use seltag::notify::{EmailNotifier, KakaoNotifier, Notice, Notifier};
use seltag::{LabelAssignments, Pipeline, Result, SeltagError, NAME, VERSION};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Seltag CLI
#[derive(Parser)]
#[command(name = "seltag")]
#[command(about = "Tag page fields with CSS selectors, extract and forward them")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SELTAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and write the tagged preview
    Analyze {
        url: String,
        /// Label-to-selector JSON to paint onto the page
        #[arg(long)]
        selectors: Option<PathBuf>,
        /// Where to write the preview HTML
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List headings, buttons and links with their selectors
    Candidates {
        url: String,
        /// Print JSON instead of one line per element
        #[arg(long)]
        json: bool,
    },

    /// Extract fields and print them as JSON
    Extract {
        url: String,
        /// Label-to-selector map or selector array (JSON)
        #[arg(long)]
        selectors: PathBuf,
    },

    /// Extract fields and forward them
    Send {
        url: String,
        #[arg(long)]
        selectors: PathBuf,
        #[arg(long, value_enum)]
        channel: Channel,
        /// Recipient address (email channel)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Channel {
    Kakao,
    Email,
}

/// `--selectors` file: labelled map or flat list
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorsFile {
    Labelled(LabelAssignments),
    Flat(Vec<String>),
}

/// Extraction output in whichever shape was requested
enum Extracted {
    Labelled(ExtractionResult),
    Flat(Vec<SelectorContent>),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("{NAME} v{VERSION}");

    if let Err(e) = run(cli).await {
        log::error!("{e}");
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(config.fetch.clone())?);
    let extractor: Arc<dyn Extractor> =
        Arc::new(DocumentExtractor::new(fetcher.clone(), config.fetch.parser()));
    let pipeline = Pipeline::new(fetcher, extractor, config.fetch.parser(), config.palette());

    match cli.command {
        Commands::Analyze {
            url,
            selectors,
            output,
        } => analyze(&pipeline, &url, selectors.as_deref(), output.as_deref()).await,
        Commands::Candidates { url, json } => {
            let candidates = pipeline.candidates(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
                return Ok(());
            }
            for candidate in &candidates {
                let text = if candidate.text.is_empty() {
                    "(no text)"
                } else {
                    candidate.text.as_str()
                };
                println!("[{:?}] {text} - {}", candidate.kind, candidate.selector);
            }
            Ok(())
        }
        Commands::Extract { url, selectors } => {
            let extracted = extract(&pipeline, &url, &selectors).await?;
            let json = match &extracted {
                Extracted::Labelled(result) => serde_json::to_string_pretty(result)?,
                Extracted::Flat(contents) => serde_json::to_string_pretty(contents)?,
            };
            println!("{json}");
            Ok(())
        }
        Commands::Send {
            url,
            selectors,
            channel,
            to,
        } => {
            let notifier = notifier(&config, channel);
            match extract(&pipeline, &url, &selectors).await? {
                Extracted::Labelled(result) => {
                    pipeline.notify(notifier.as_ref(), &url, to.as_deref(), &result).await?;
                }
                Extracted::Flat(contents) => {
                    let mut notice = Notice::from_contents(&url, &contents);
                    if let Some(to) = to {
                        notice = notice.with_destination(to);
                    }
                    notifier.send(&notice).await?;
                }
            }
            println!("✅ Sent via {}", notifier.name());
            Ok(())
        }
    }
}

async fn analyze(
    pipeline: &Pipeline,
    url: &str,
    selectors: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let mut session = match pipeline.analyze(url).await {
        Ok(session) => session,
        Err(failure) => {
            if let Some(output) = output {
                fs::write(output, &failure.notice)?;
            }
            return Err(failure.error);
        }
    };

    if let Some(path) = selectors {
        match read_selectors(path)? {
            SelectorsFile::Labelled(assignments) => session.load_assignments(assignments),
            SelectorsFile::Flat(_) => {
                return Err(SeltagError::Other(
                    "analyze needs a label-to-selector map".into(),
                ));
            }
        }
    }

    let preview = session.render_html();
    match output {
        Some(output) => fs::write(output, preview)?,
        None => println!("{preview}"),
    }
    log::info!(
        "{} element(s) tagged on {}",
        session.overlay().painted().count(),
        session.url()
    );
    Ok(())
}

async fn extract(pipeline: &Pipeline, url: &str, selectors: &Path) -> Result<Extracted> {
    match read_selectors(selectors)? {
        SelectorsFile::Labelled(assignments) => {
            Ok(Extracted::Labelled(pipeline.extract(url, &assignments).await?))
        }
        SelectorsFile::Flat(list) => {
            let contents = pipeline.extract_flat(url, &list).await?;
            log::debug!("{}", flatten_contents(&contents));
            Ok(Extracted::Flat(contents))
        }
    }
}

fn read_selectors(path: &Path) -> Result<SelectorsFile> {
    let content = fs::read_to_string(path)?;
    log::debug!("Reading selectors from {}", path.display());
    Ok(serde_json::from_str(&content)?)
}

fn notifier(config: &AppConfig, channel: Channel) -> Box<dyn Notifier> {
    match channel {
        Channel::Kakao => Box::new(KakaoNotifier::new(&config.kakao)),
        Channel::Email => Box::new(EmailNotifier::new(&config.email)),
    }
}
