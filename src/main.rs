use anyhow::{Context, Result};
use bizdash::config::DashboardConfig;
use bizdash::dashboard::SectionContent;
use bizdash::{graph, logging, render_upload_as, FeedbackSubmission, Selections, UploadFormat};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bizdash")]
#[command(about = "Render a sales dashboard description from CSV data", long_about = None)]
struct Args {
    /// CSV file with a header row, or a .json array of records (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Read the upload as a JSON array of records
    #[arg(long)]
    json: bool,

    /// Submit this feedback text with the render
    #[arg(long)]
    feedback: Option<String>,

    /// JSON config file (preview_rows, top_n, render)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also draw every chart into this directory
    #[arg(long)]
    charts: Option<PathBuf>,

    /// Pretty-print the dashboard JSON
    #[arg(long)]
    pretty: bool,

    /// Render the page as it looks before any upload
    #[arg(long, conflicts_with = "input")]
    no_upload: bool,
}

fn read_upload(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .context("Failed to read upload from stdin")?;
            Ok(bytes)
        }
    }
}

fn chart_file_name(subheading: &str, extension: &str) -> String {
    let slug: String = subheading
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}.{}", slug, extension)
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging()?;

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path).context("Failed to load config")?,
        None => DashboardConfig::default(),
    };

    let upload = if args.no_upload {
        None
    } else {
        Some(read_upload(args.input.as_deref())?)
    };

    let selections = Selections {
        feedback: args.feedback.map(|text| FeedbackSubmission {
            text,
            submitted: true,
        }),
    };

    let format = match &args.input {
        _ if args.json => UploadFormat::Json,
        Some(path) => UploadFormat::from_path(path),
        None => UploadFormat::Csv,
    };

    let dashboard = match render_upload_as(upload.as_deref(), format, &selections, &config) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(dir) = &args.charts {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        for section in &dashboard.sections {
            if let SectionContent::Chart { chart } = &section.content {
                let bytes = match graph::render_chart(chart, &config.render) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let reason = format!("{:#}", e);
                        warn!(chart = %chart.title, error = %reason, "chart not drawn");
                        continue;
                    }
                };
                let path = dir.join(chart_file_name(&section.subheading, config.render.format.extension()));
                fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "chart written");
            }
        }
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&dashboard)
    } else {
        serde_json::to_string(&dashboard)
    }
    .context("Failed to serialize dashboard")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write dashboard to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
