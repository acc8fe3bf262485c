use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use sitekit::page::Page;
use sitekit::replay::{self, ReplayReport, ReplayScript, ReplayStep};
use sitekit::runtime::{self, DEFAULT_TICK};
use sitekit::SiteConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sitekit <page.html> [script.yaml|script.json] [--url URL] [--html]";

struct Args {
    page: PathBuf,
    script: Option<PathBuf>,
    url: Option<String>,
    html: bool,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut url = None;
    let mut html = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = Some(args.next().context("--url needs a value")?),
            "--html" => html = true,
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    let Some(page) = positional.next() else {
        bail!(USAGE);
    };
    Ok(Args {
        page,
        script: positional.next(),
        url,
        html,
    })
}

fn main() -> Result<()> {
    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let args = parse_args()?;
    let config_path = std::env::var("SITEKIT_CONFIG").ok().map(PathBuf::from);
    let config = SiteConfig::load(config_path).context("load site config")?;

    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("read {}", args.page.display()))?;
    let script = args
        .script
        .as_deref()
        .map(ReplayScript::load)
        .transpose()
        .context("load replay script")?;

    let url = match (&args.url, script.as_ref().and_then(|s| s.url.clone())) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url,
        (None, None) => {
            let absolute = std::fs::canonicalize(&args.page)
                .with_context(|| format!("resolve {}", args.page.display()))?;
            url::Url::from_file_path(&absolute)
                .map_err(|_| anyhow::anyhow!("invalid file path: {}", absolute.display()))?
                .to_string()
        }
    };

    let mut page = Page::from_html(&html, &url, config).context("assemble page")?;

    match script {
        Some(script) => replay::run(&mut page, &script).context("replay script")?,
        None => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("build tokio runtime")?;
            rt.block_on(drive_from_stdin(&mut page))?;
        }
    }

    let report = ReplayReport::capture(&page, args.html);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Reads one JSON step per line from stdin and feeds them to the live driver.
async fn drive_from_stdin(page: &mut Page) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel::<ReplayStep>();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ReplayStep>(&line) {
                Ok(step) => {
                    if tx.send(step).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(target = "stdin", error = %err, "ignoring malformed step"),
            }
        }
    });

    runtime::drive(page, rx, DEFAULT_TICK).await?;
    reader.abort();
    Ok(())
}
