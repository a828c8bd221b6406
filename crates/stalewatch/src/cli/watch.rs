//! Watch command - recurring scan cycles until interrupted
//!
//! The rules file is re-read at the start of every cycle, so edits take
//! effect without a restart. SIGINT/SIGTERM set the cancel token; a
//! cycle in flight stops at its next cancellation check and the loop
//! exits cleanly.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use stalewatch::{
    load_rules, report_cycle, run_cycle, CancelToken, CycleOptions, EventSink, JsonLineSink,
    MetricSink, TracingSink,
};

/// Arguments for the watch command
#[derive(Debug)]
pub struct WatchArgs {
    pub rules: PathBuf,
    pub interval_secs: u64,
    pub json: bool,
    pub parallel: bool,
    pub rule_timeout_secs: Option<u64>,
}

/// Run scan cycles at a fixed interval until a shutdown signal arrives.
pub fn run(args: WatchArgs) -> Result<ExitCode> {
    let cancel = CancelToken::new();
    install_shutdown_handler(&cancel)?;

    let options = CycleOptions {
        parallel: args.parallel,
        rule_timeout: args.rule_timeout_secs.map(Duration::from_secs),
    };
    let interval = Duration::from_secs(args.interval_secs.max(1));

    let json_sink;
    let tracing_sink;
    let (metrics, events): (&dyn MetricSink, &dyn EventSink) = if args.json {
        json_sink = JsonLineSink::new(io::stdout());
        (&json_sink, &json_sink)
    } else {
        tracing_sink = TracingSink;
        (&tracing_sink, &tracing_sink)
    };

    info!(
        rules = %args.rules.display(),
        interval_secs = interval.as_secs(),
        "Watching folders"
    );

    while !cancel.is_cancelled() {
        // Fresh read each cycle: config edits apply without a restart.
        match load_rules(&args.rules) {
            Ok((rules, skipped)) => {
                if !skipped.is_empty() {
                    warn!(skipped = skipped.len(), "Malformed rule lines skipped");
                }
                if rules.is_empty() {
                    warn!(rules_file = %args.rules.display(), "No valid rules configured");
                } else {
                    let results = run_cycle(&rules, options, &cancel);
                    if cancel.is_cancelled() {
                        info!("Shutdown requested, discarding interrupted cycle");
                        break;
                    }
                    report_cycle(&results, metrics, events);
                }
            }
            Err(err) => {
                // The file may reappear; keep polling rather than die.
                warn!(rules_file = %args.rules.display(), error = %err, "Cannot read rules file");
            }
        }

        sleep_until_next_cycle(interval, &cancel);
    }

    info!("Watch loop stopped");
    Ok(ExitCode::SUCCESS)
}

/// Cancel-aware sleep between cycles.
fn sleep_until_next_cycle(interval: Duration, cancel: &CancelToken) {
    let deadline = Instant::now() + interval;
    while Instant::now() < deadline {
        if cancel.is_cancelled() {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

/// Install signal handlers that cancel the watch loop.
fn install_shutdown_handler(cancel: &CancelToken) -> Result<()> {
    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("Received signal {}, finishing up...", sig);
                cancel.cancel();
            }
        });
    }

    #[cfg(windows)]
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C, finishing up...");
            cancel.cancel();
        })?;
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = cancel;
    }

    Ok(())
}
