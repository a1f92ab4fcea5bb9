/// Core traits for MasVis
use crate::types::{Phase, ProgressEvent};

/// Receiver of phase start/stop notifications
///
/// The analyzer owns no progress state of its own; the host passes a sink
/// into every run. Any `FnMut(Phase, ProgressEvent)` closure is a sink.
///
/// # Example
///
/// ```rust
/// use masvis_core::{Phase, ProgressEvent, ProgressSink};
///
/// let mut started = Vec::new();
/// let mut sink = |phase: Phase, event: ProgressEvent| {
///     if let ProgressEvent::Start { .. } = event {
///         started.push(phase);
///     }
/// };
/// sink.on_event(Phase::PeakRms, ProgressEvent::Start { description: "" });
/// assert_eq!(started, vec![Phase::PeakRms]);
/// ```
pub trait ProgressSink {
    /// Called when a phase starts or stops
    fn on_event(&mut self, phase: Phase, event: ProgressEvent);

    /// Polled between phases; returning `true` stops the analysis
    ///
    /// Phases themselves are never interrupted.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(Phase, ProgressEvent),
{
    fn on_event(&mut self, phase: Phase, event: ProgressEvent) {
        self(phase, event);
    }
}

/// Sink that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&mut self, _phase: Phase, _event: ProgressEvent) {}
}
