//! `har-capture` command-line entry point.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use har_capture::config::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_PORT};
use har_capture::{
    AppConfig, CaptureConfig, CaptureRequest, LogFormat, Orchestrator, Result, ServerConfig,
    init_tracing, server,
};

/// Capture a page load's network activity as an HTTP Archive
#[derive(Parser, Debug)]
#[command(name = "har-capture")]
#[command(version)]
#[command(about = "Capture a page load's network activity as an HTTP Archive (HAR)")]
#[command(long_about = r#"Capture a page load's network activity as an HTTP Archive (HAR)

Each capture launches an isolated headless Chromium, loads the page, waits
for network quiescence (or the navigation timeout) plus a short grace
period, and assembles every observed request and response into HAR 1.2.

EXAMPLES:
  # Run the HTTP API on port 8080
  har-capture serve --port 8080

  # Capture once to example.com_<timestamp>.har
  har-capture capture example.com

  # Capture to stdout with a specific browser
  har-capture capture https://example.com -o - --chrome-path /usr/bin/chromium
"#)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to the Chrome/Chromium executable (discovered on PATH if unset)
    #[arg(long, env = "CHROME_PATH", global = true)]
    chrome_path: Option<PathBuf>,

    /// Upper bound for navigation plus network quiescence, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    navigation_timeout_secs: u64,

    /// Extra collection time after navigation, in milliseconds
    #[arg(long, default_value_t = 2000, global = true)]
    grace_period_ms: u64,

    /// Time allowed for the browser to start, in seconds
    #[arg(long, default_value_t = 20, global = true)]
    launch_timeout_secs: u64,

    /// Log output format: pretty, compact or json
    #[arg(long, env = "HAR_LOG_FORMAT", default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl CommonArgs {
    fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            chrome_path: self.chrome_path.clone(),
            launch_timeout: Duration::from_secs(self.launch_timeout_secs),
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            grace_period: Duration::from_millis(self.grace_period_ms),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Browser origin allowed to call the API (repeatable)
        #[arg(
            long = "allowed-origin",
            env = "HAR_ALLOWED_ORIGINS",
            value_delimiter = ',',
            default_value = DEFAULT_ALLOWED_ORIGIN
        )]
        allowed_origins: Vec<String>,
    },

    /// Capture one page and write the HAR document
    Capture {
        /// Page to load; `https://` is assumed when no scheme is given
        url: String,

        /// Output file, or `-` for stdout (default: `{host}_{timestamp}.har`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.common.log_format, cli.common.verbose) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(class = %e.class(), error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let capture = cli.common.capture_config();

    match cli.command {
        Command::Serve {
            host,
            port,
            allowed_origins,
        } => {
            let config = AppConfig {
                server: ServerConfig {
                    host,
                    port,
                    allowed_origins,
                },
                capture,
            };
            config.validate()?;

            let driver = config.capture.driver()?;
            info!(browser = %driver.binary().display(), "Using browser");

            let orchestrator = Orchestrator::new(driver, config.capture);
            server::serve(orchestrator, config.server).await
        }
        Command::Capture { url, output } => {
            capture.validate()?;
            let driver = capture.driver()?;
            let orchestrator = Orchestrator::new(driver, capture);

            let outcome = orchestrator.capture(&CaptureRequest::new(url)).await?;
            let json = outcome.har.to_json_pretty()?;

            match output {
                Some(path) if path.as_os_str() == "-" => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(json.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                output => {
                    let path =
                        output.unwrap_or_else(|| PathBuf::from(outcome.timestamped_filename()));
                    tokio::fs::write(&path, json).await?;
                    info!(
                        path = %path.display(),
                        entries = outcome.har.log.entries.len(),
                        partial = outcome.is_partial(),
                        "HAR written"
                    );
                }
            }
            Ok(())
        }
    }
}
