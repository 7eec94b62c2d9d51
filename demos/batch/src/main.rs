//! Simulated batch job: copy a fixed set of records, stream an open-ended
//! log, then wait on a slow flush.
//!
//! ```sh
//! RUST_LOG=pulse_widgets=debug cargo run --manifest-path demos/batch/Cargo.toml
//! PULSE_THEME='{"tagColor":"#AF87FF"}' cargo run --manifest-path demos/batch/Cargo.toml
//! ```

use pulse_widgets::line::stderr_terminal;
use pulse_widgets::prelude::*;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const RECORDS: u64 = 50_000;
const LOG_LINES: u64 = 123_456;

fn theme_from_env() -> Theme {
    let Ok(raw) = std::env::var("PULSE_THEME") else {
        return Theme::default();
    };
    match serde_json::from_str::<ThemeConfig>(&raw) {
        Ok(config) => config.into(),
        Err(err) => {
            warn!(error = %err, "ignoring malformed PULSE_THEME");
            Theme::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr_terminal().log_sink())
        .init();

    let theme = theme_from_env();

    let mut workers: Vec<Widget> = vec![
        gauge_new(
            "[records]",
            &[
                gauge::with_limit(RECORDS),
                gauge::with_width(40),
                gauge::with_theme(theme.clone()),
            ],
        )?
        .into(),
        counter_new(
            "[log]",
            &[
                counter::with_interval(2_500),
                counter::with_frames(DOT.clone()),
                counter::with_theme(theme.clone()),
                counter::with_user_text(|| " tailing".to_string()),
            ],
        )?
        .into(),
    ];

    let totals = [RECORDS, LOG_LINES];
    for (widget, total) in workers.iter_mut().zip(totals) {
        if let Some(pulse) = widget.as_pulse() {
            for i in 0..total {
                pulse.pulse();
                if i % 1_000 == 0 {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
            }
        }
    }

    let flush = spinner_new(
        "[flush]",
        "waiting for fsync",
        &[
            spinner::with_interval(Duration::from_millis(120)),
            spinner::with_frames(MINI_DOT.clone()),
            spinner::with_theme(theme),
        ],
    )?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    workers.push(flush.into());

    for widget in workers {
        let summary = widget.complete();
        info!(
            tag = %summary.tag,
            count = ?summary.count,
            elapsed = ?summary.elapsed,
            rate = summary.total_rate,
            "finished"
        );
    }
    Ok(())
}
