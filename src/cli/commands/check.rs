//! Installation readiness check

use anyhow::{Result, bail};
use serde::Serialize;

use crate::backend::SharedBackend;
use crate::cli::commands::TICK;
use crate::cli::output::{OutputFormat, print_error, print_formatted};
use crate::state::{ReadinessProbe, ReadinessState, StateEvent};

#[derive(Serialize)]
struct CheckResult {
    ready: bool,
}

pub async fn run(backend: SharedBackend, format: OutputFormat) -> Result<()> {
    let mut probe = ReadinessProbe::default();
    probe.activate(&backend);

    let mut ticker = tokio::time::interval(TICK);
    while probe.is_loading() {
        ticker.tick().await;
        for event in probe.poll() {
            if let StateEvent::LogError(msg) = event {
                print_error(&msg);
            }
        }
    }

    let result = CheckResult {
        ready: probe.state() == ReadinessState::Ready,
    };
    print_formatted(&result, format, |r| {
        if r.ready {
            "Ready".to_string()
        } else {
            "Broken: run `sbrw-utility setup` to install the game".to_string()
        }
    });

    if !result.ready {
        bail!("Installation is not ready");
    }
    Ok(())
}
