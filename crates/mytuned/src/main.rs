//! mytuned - MySQL knob and metric collector daemon.
//!
//! Connects to a MySQL server, checks that the user may run every collector
//! statement, then periodically collects knobs and metrics and writes each
//! observation as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use mytune_core::collector::{ConnectionConfig, connect_collector};
use mytune_core::model::Observation;
use mytune_core::observation::collect_observation;

/// Output target meaning "write to stdout".
const STDOUT_TARGET: &str = "-";

/// MySQL knob and metric collector daemon.
#[derive(Parser)]
#[command(name = "mytuned", about = "MySQL knob and metric collector daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "60")]
    interval: u64,

    /// Output directory for observations ("-" writes to stdout).
    #[arg(short, long, default_value = "./data")]
    output_dir: String,

    /// Collect a single observation and exit.
    #[arg(long)]
    once: bool,

    /// Only run the permission check; exit with status 1 if it fails.
    #[arg(long)]
    check_permissions: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["mytuned", "mytune_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Describes the contents of an observation for logging.
fn describe_observation(observation: &Observation) -> String {
    let metrics = &observation.metrics_data.global;
    let mut parts = vec![
        format!("{} knobs", observation.knobs_data.global.global.len()),
        format!("{} status counters", metrics.global.len()),
        format!("{} innodb metrics", metrics.innodb_metrics.len()),
    ];
    if metrics
        .performance_schema
        .events_statements_histogram_global
        .is_some()
    {
        parts.push("latency histogram".to_string());
    }
    if !metrics.engine.master_status.is_empty() {
        parts.push("master status".to_string());
    }
    if !metrics.engine.replica_status.is_empty() {
        parts.push("replica status".to_string());
    }
    parts.push(format!(
        "buffer_miss_ratio={:.2}%",
        metrics.derived.buffer_miss_ratio
    ));
    parts.push(format!(
        "read_write_ratio={:.4}",
        metrics.derived.read_write_ratio
    ));
    parts.join(", ")
}

/// Writes an observation as pretty JSON.
///
/// Returns the file written, or `None` when writing to stdout.
fn write_observation(observation: &Observation, output_dir: &str) -> io::Result<Option<PathBuf>> {
    if output_dir == STDOUT_TARGET {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, observation)?;
        writeln!(out)?;
        out.flush()?;
        return Ok(None);
    }

    let path = Path::new(output_dir).join(format!(
        "observation_{}.json",
        observation.summary.observation_time
    ));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, observation)?;
    writer.flush()?;
    Ok(Some(path))
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("mytuned {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, output={}",
        args.interval, args.output_dir
    );

    let config = match ConnectionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("MySQL collector: disabled ({})", e);
            print_mysql_warning(&e.to_string());
            std::process::exit(1);
        }
    };

    let mut collector = match connect_collector(&config) {
        Ok(collector) => {
            info!(
                "MySQL collector: connected to {} as {}, server version {}",
                config.endpoint(),
                config.user,
                collector.get_version()
            );
            collector
        }
        Err(e) => {
            error!("MySQL collector: connection failed ({})", e);
            print_mysql_warning(&e.to_string());
            std::process::exit(1);
        }
    };

    match collector.check_permission() {
        Ok(check) if check.success => {
            info!("Permission check passed");
        }
        Ok(check) => {
            warn!(
                "Permission check failed for {} statement(s)",
                check.results.len()
            );
            eprint!("{}", check.report);
            if args.check_permissions {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Permission check aborted: {}", e);
            std::process::exit(1);
        }
    }

    if args.check_permissions {
        return;
    }

    if args.output_dir != STDOUT_TARGET
        && let Err(e) = std::fs::create_dir_all(&args.output_dir)
    {
        error!("Failed to create output directory {}: {}", args.output_dir, e);
        std::process::exit(1);
    }

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut observation_count: u64 = 0;

    info!("Starting collection loop");

    while running.load(Ordering::SeqCst) {
        match collect_observation(&mut collector) {
            Ok(observation) => {
                observation_count += 1;
                info!(
                    "Observation #{}: {}",
                    observation_count,
                    describe_observation(&observation)
                );
                match write_observation(&observation, &args.output_dir) {
                    Ok(Some(path)) => debug!("Observation written to {}", path.display()),
                    Ok(None) => {}
                    Err(e) => error!("Failed to write observation: {}", e),
                }
            }
            Err(e) => {
                error!(sql = ?e.sql(), "Failed to collect observation: {}", e);
            }
        }

        if args.once {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete");
}

/// Prints a colored MySQL warning with configuration hints.
fn print_mysql_warning(error: &str) {
    const RED: &str = "\x1b[1;31m";
    const YELLOW: &str = "\x1b[33m";
    const RESET: &str = "\x1b[0m";

    eprintln!("{RED}MySQL: {error}{RESET}");
    eprintln!();
    eprintln!("{YELLOW}  Configure connection with environment variables:");
    eprintln!("    export MYSQL_HOST=localhost");
    eprintln!("    export MYSQL_TCP_PORT=3306");
    eprintln!("    export MYSQL_USER=tuner");
    eprintln!("    export MYSQL_PWD=secret");
    eprintln!("    export MYSQL_CONNECT_TIMEOUT=10{RESET}");
}
