use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use visionbot_core::config::ClientConfig;
use visionbot_core::types::RecognitionMode;
use visionbot_engine::session::{PollEvent, PollPolicy};
use visionbot_runtime::config_store::ConfigStore;
use visionbot_runtime::runtime_engine::build_recognizer_from_config;

#[derive(Debug, Parser)]
#[command(name = "visionbot")]
#[command(about = "Recognize images with the VisionBot service")]
#[command(version)]
struct Cli {
    /// Image to recognize; asked for on stdin when omitted
    image: Option<PathBuf>,

    /// JSON client config; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to recognize: all, image or text
    #[arg(long)]
    mode: Option<RecognitionMode>,

    /// Language of the returned text
    #[arg(long)]
    lang: Option<String>,

    #[arg(long, overrides_with = "no_translate")]
    translate: bool,

    #[arg(long, overrides_with = "translate")]
    no_translate: bool,

    #[arg(long, overrides_with = "no_qr")]
    qr: bool,

    #[arg(long, overrides_with = "qr")]
    no_qr: bool,

    /// Pause before each status poll
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Polls allowed after the first one
    #[arg(long)]
    tries: Option<u32>,

    /// Give up on the whole request after this long
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the detailed outcome as JSON
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// Console defaults: translate on, 15 polls.
fn console_defaults() -> ClientConfig {
    let mut cfg = ClientConfig::default();
    cfg.polling.tries = 15;
    cfg.options.translate = true;
    cfg
}

fn resolve_config(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ConfigStore::at_path(path.clone()).load()?,
        None => console_defaults(),
    };

    if let Some(url) = env("VISIONBOT_INGEST_URL").filter(|s| !s.trim().is_empty()) {
        cfg.endpoints.ingest_url = url;
    }
    if let Some(url) = env("VISIONBOT_RESULT_URL").filter(|s| !s.trim().is_empty()) {
        cfg.endpoints.result_url = url;
    }

    if let Some(mode) = cli.mode {
        cfg.options.mode = mode;
    }
    if let Some(lang) = &cli.lang {
        cfg.options.lang = lang.clone();
    }
    if cli.translate {
        cfg.options.translate = true;
    }
    if cli.no_translate {
        cfg.options.translate = false;
    }
    if cli.qr {
        cfg.options.qr = true;
    }
    if cli.no_qr {
        cfg.options.qr = false;
    }
    if let Some(delay) = cli.delay_ms {
        cfg.polling.delay_ms = delay;
    }
    if let Some(tries) = cli.tries {
        cfg.polling.tries = tries;
    }
    if let Some(timeout) = cli.timeout_ms {
        cfg.polling.deadline_ms = Some(timeout);
    }

    cfg.validate()?;
    Ok(cfg)
}

fn image_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.image.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        println!("Provided image by path: {}", path.display());
        return Ok(path.clone());
    }

    println!("Please, type full path to image.");
    std::io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read image path from stdin")?;
    Ok(PathBuf::from(line.trim()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let cfg = resolve_config(&cli, |key| std::env::var(key).ok())?;

    println!("Program to recognize images with VisionBot service.");
    let path = image_path(&cli)?;
    if !path.is_file() {
        println!("Sorry, the path is not a readable file.");
        return Ok(ExitCode::from(2));
    }
    let image = std::fs::read(&path).with_context(|| format!("read image: {}", path.display()))?;

    println!("Begin working... Please, wait...");
    let recognizer = build_recognizer_from_config(&cfg)?;
    let policy = PollPolicy::from(&cfg.polling);

    let outcome = recognizer
        .recognize_until(
            &image,
            &cfg.options,
            &policy,
            |event| async move {
                match event {
                    PollEvent::Submitted { job_id } => log::info!("accepted as job {job_id}"),
                    PollEvent::Polled { attempt, status } => {
                        log::info!("poll {attempt}: {status:?}")
                    }
                }
            },
            async {
                if tokio::signal::ctrl_c().await.is_err() {
                    // No signal handler: never cancel.
                    std::future::pending::<()>().await;
                }
            },
        )
        .await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("encode outcome JSON")?
        );
        return Ok(if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let (text, ok) = outcome.into_result();
    if ok {
        println!("Image recognized. Text is:\n{text}");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Recognition failed.");
        Ok(ExitCode::FAILURE)
    }
}
