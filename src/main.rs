use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;

use quotegram::generator::load_background;
use quotegram::publish::{post_today, DryRunPublisher, Publisher};
use quotegram::quotes::{parse_post_date, read_tsv};
use quotegram::{FontHandle, GeneratorConfig, QuoteImageGenerator};

#[derive(Parser)]
#[command(name = "quotegram", version, about = "Render quote images and post them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Common {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render with fixed-width block glyphs instead of the configured fonts
    #[arg(long)]
    block_font: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render every scheduled quote of a TSV file
    Generate {
        #[command(flatten)]
        common: Common,
        /// TSV with `quote`, `author` and `post_date` columns
        #[arg(long)]
        quotes: PathBuf,
        /// Output directory (overrides the configuration)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        jobs: Option<usize>,
        /// Render at most this many quotes
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render a single quote to a file
    Preview {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        quote: String,
        #[arg(long, default_value = "")]
        author: String,
        /// Background image (defaults to the first configured one)
        #[arg(long)]
        background: Option<PathBuf>,
        #[arg(long, default_value = "preview.png")]
        output: PathBuf,
    },
    /// Post today's image, then move it to the posted directory
    Post {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory holding rendered images (overrides the configuration)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Post for this date instead of today
        #[arg(long)]
        date: Option<String>,
        /// Log what would be posted without uploading
        #[arg(long)]
        dry_run: bool,
        /// Upload endpoint (overrides the configuration)
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn build_generator(common: &Common) -> anyhow::Result<QuoteImageGenerator> {
    let config = load_config(common.config.as_ref())?;
    if common.block_font {
        let face = |size: f32| {
            let height = size.round().max(1.0) as u32;
            FontHandle::block((height / 2).max(1), height)
        };
        let quote_font = face(config.quote_style.font_size);
        let author_font = face(config.author_style.font_size);
        return Ok(QuoteImageGenerator::new(config, quote_font, author_font)?);
    }
    QuoteImageGenerator::from_config(config).context("loading fonts")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            common,
            quotes,
            out,
            jobs,
            limit,
        } => {
            let generator = build_generator(&common)?;
            let config = generator.config();
            let mut entries = read_tsv(&quotes)?;
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            let backgrounds = config
                .backgrounds
                .iter()
                .map(|p| load_background(p).with_context(|| format!("loading {}", p.display())))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let out = out.unwrap_or_else(|| config.output_dir.clone());
            let jobs = jobs.unwrap_or_else(num_cpus::get);

            let report = generator.generate_batch(&entries, &backgrounds, &out, jobs)?;
            info!("{} images written, {} failed", report.written.len(), report.failed.len());
            if !report.failed.is_empty() {
                bail!("{} quotes failed to render", report.failed.len());
            }
        }
        Command::Preview {
            common,
            quote,
            author,
            background,
            output,
        } => {
            let generator = build_generator(&common)?;
            let background = match background.or_else(|| generator.config().backgrounds.first().cloned()) {
                Some(path) => path,
                None => bail!("no background given or configured"),
            };
            let surface = load_background(&background)
                .with_context(|| format!("loading {}", background.display()))?;
            let image = generator.compose(&quote, &author, &surface)?;
            image.save(&output)?;
            info!("wrote {}", output.display());
        }
        Command::Post {
            config,
            out,
            date,
            dry_run,
            endpoint,
            username,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(endpoint) = endpoint {
                config.publisher.endpoint = endpoint;
            }
            if let Some(username) = username {
                config.publisher.username = username;
            }
            if let Ok(password) = std::env::var("QUOTEGRAM_PASSWORD") {
                config.publisher.password = password;
            }

            let today: NaiveDate = match date {
                Some(d) => match parse_post_date(&d) {
                    Some(d) => d,
                    None => bail!("unrecognized date {d:?}"),
                },
                None => chrono::Local::now().date_naive(),
            };
            let out = out.unwrap_or_else(|| config.output_dir.clone());

            let publisher: Box<dyn Publisher> = if dry_run {
                Box::new(DryRunPublisher::new())
            } else {
                http_publisher(&config)?
            };
            match post_today(&out, &config.posted_dir, today, &config.hashtags, publisher.as_ref())? {
                Some(path) => info!("posted and archived as {}", path.display()),
                None => info!("No file for today"),
            }
        }
    }
    Ok(())
}

#[cfg(feature = "http")]
fn http_publisher(config: &GeneratorConfig) -> anyhow::Result<Box<dyn Publisher>> {
    let publisher = quotegram::publish::HttpPublisher::new(config.publisher.clone())?;
    Ok(Box::new(publisher))
}

#[cfg(not(feature = "http"))]
fn http_publisher(_config: &GeneratorConfig) -> anyhow::Result<Box<dyn Publisher>> {
    bail!("built without the `http` feature; use --dry-run")
}
