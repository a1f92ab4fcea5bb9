//! Per-phase timing report

use masvis_core::{Phase, ProgressEvent, ProgressSink};
use std::time::Duration;
use tracing::info;

/// One row of the timing report
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub description: &'static str,
    pub elapsed: Duration,
    /// Share of the total time, in percent
    pub percent: f64,
}

/// Progress sink that records how long every phase took
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    entries: Vec<(Phase, &'static str, Option<Duration>)>,
}

impl PhaseTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time of all finished phases
    pub fn total(&self) -> Duration {
        self.entries.iter().filter_map(|(_, _, elapsed)| *elapsed).sum()
    }

    /// Finished phases in the order they ran
    pub fn report(&self) -> Vec<PhaseTiming> {
        let total = self.total().as_secs_f64();
        self.entries
            .iter()
            .filter_map(|&(phase, description, elapsed)| {
                let elapsed = elapsed?;
                let percent = if total > 0.0 {
                    100.0 * elapsed.as_secs_f64() / total
                } else {
                    0.0
                };
                Some(PhaseTiming {
                    phase,
                    description,
                    elapsed,
                    percent,
                })
            })
            .collect()
    }

    /// Log the report at info level
    pub fn log_report(&self) {
        for row in self.report() {
            info!(
                "{:<30} {:>8.3} s {:>5.1}%",
                row.description,
                row.elapsed.as_secs_f64(),
                row.percent
            );
        }
        info!("{:<30} {:>8.3} s", "Total", self.total().as_secs_f64());
    }
}

impl ProgressSink for PhaseTimings {
    fn on_event(&mut self, phase: Phase, event: ProgressEvent) {
        match event {
            ProgressEvent::Start { description } => self.entries.push((phase, description, None)),
            ProgressEvent::Stop { elapsed } => {
                if let Some(entry) = self
                    .entries
                    .iter_mut()
                    .rev()
                    .find(|(p, _, e)| *p == phase && e.is_none())
                {
                    entry.2 = Some(elapsed);
                }
            }
        }
    }
}
