use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{error, info};
use proxy_sieve::{
    logging, proxy::shutdown, Config, HttpProbe, LoadError, Probe, ProxyEndpoint, ProxyParser,
    ShutdownCoordinator, ValidationContext, WorkerPool,
};
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_SUCCESS: u8 = 0;

const EXIT_FAILURE: u8 = 1;

/// Exit status after Ctrl-C (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

/// Filter proxies that actually work
#[derive(Parser)]
#[command(name = "proxy-sieve", version)]
#[command(about = "Filter proxies that actually work")]
#[command(
    after_help = "The proxy file should contain one proxy per line in the form scheme://ip:port.\nWorking proxies are printed and saved to valid-proxies.txt."
)]
struct Cli {
    /// Path to the file containing proxies
    proxy_list: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let proxy_list = match require_proxy_list(Cli::parse(), &mut io::stdout()) {
        Ok(path) => path,
        Err(code) => return ExitCode::from(code),
    };

    let config = Config::default();
    if let Err(e) = logging::init(&config) {
        eprintln!("warning: {:#}", e);
    }

    let probe = HttpProbe::from_config(&config);
    info!(
        "Checking against {} with a {:?} timeout",
        probe.target_url(),
        probe.timeout()
    );

    match run(&config, proxy_list, Arc::new(probe), shutdown::ctrl_c()).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Print the usage to `out` and fail when no proxy list was given
fn require_proxy_list<W: Write>(cli: Cli, out: &mut W) -> Result<PathBuf, u8> {
    match cli.proxy_list {
        Some(path) => Ok(path),
        None => {
            let _ = writeln!(out, "{}", Cli::command().render_help());
            Err(EXIT_FAILURE)
        }
    }
}

/// Write a working proxy to stdout. A closed pipe must not stop the check.
fn print_working(endpoint: &ProxyEndpoint) {
    let _ = writeln!(io::stdout().lock(), "{}", endpoint);
}

/// Load, check and save. Returns the process exit status.
async fn run<I>(
    config: &Config,
    proxy_list: PathBuf,
    probe: Arc<dyn Probe>,
    interrupt: I,
) -> Result<u8>
where
    I: Future<Output = ()>,
{
    info!("Reading proxies from {:?}", proxy_list);
    let proxies = match ProxyParser::load(&proxy_list) {
        Ok(proxies) => proxies,
        Err(LoadError::NotFound(path)) => {
            eprintln!("File doesn't exist: {}", path.display());
            return Ok(EXIT_FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if proxies.is_empty() {
        println!("No proxies found. Quitting...");
        return Ok(EXIT_FAILURE);
    }

    let ctx = ValidationContext::new(proxies);
    let pool = WorkerPool::new(probe, config.workers).with_observer(Arc::new(print_working));
    let coordinator = ShutdownCoordinator::new(ctx.stop_signal().clone());

    let outcome = coordinator.supervise(pool.run(&ctx), interrupt).await;

    outcome.output.flush(&config.output_path)?;

    if ctx.is_aborted() {
        eprintln!(
            "{} workers crashed, {} proxies were left unchecked",
            ctx.failed_workers(),
            ctx.queue().len()
        );
        Ok(EXIT_FAILURE)
    } else if outcome.interrupted {
        eprintln!(
            "Interrupted: saved {} working proxies to {}",
            outcome.output.len(),
            config.output_path.display()
        );
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
