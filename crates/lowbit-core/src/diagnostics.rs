//! Diagnostic events emitted by the core algorithms.
//!
//! The algorithms never log on their own. They report to a [`Diagnostics`]
//! sink, which by default is [`LogDiagnostics`] forwarding to the `log`
//! facade. Any `Fn(&DiagnosticEvent)` closure can be used instead, which is
//! how the tests observe scans.

use std::fmt::{self, Display, Formatter};

use log::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Capacity,
    Embed,
    Extract,
    Detect,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Capacity => "capacity",
            Operation::Embed => "embed",
            Operation::Extract => "extract",
            Operation::Detect => "detect",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    ScanStarted {
        operation: Operation,
        plane: usize,
    },
    /// `bits` counts the payload bits a plane held, or for detection the samples it tested.
    ScanFinished {
        operation: Operation,
        plane: usize,
        bits: u64,
    },
    PartialExtraction {
        expected_bits: u64,
        missing_bits: u64,
    },
    TamperDetected {
        reason: String,
    },
}

pub trait Diagnostics {
    fn on_event(&self, event: &DiagnosticEvent);
}

impl<F> Diagnostics for F
where
    F: Fn(&DiagnosticEvent),
{
    fn on_event(&self, event: &DiagnosticEvent) {
        self(event)
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn on_event(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::ScanStarted { operation, plane } => {
                debug!("{operation}: scanning plane {plane}");
            }
            DiagnosticEvent::ScanFinished {
                operation,
                plane,
                bits,
            } => {
                debug!("{operation}: plane {plane} done, {bits} bits");
            }
            DiagnosticEvent::PartialExtraction {
                expected_bits,
                missing_bits,
            } => {
                warn!(
                    "Could not extract the embedded data completely: {} of {expected_bits} bits read, the last {missing_bits} bits are missing. The image was probably cropped or altered by other software",
                    expected_bits - missing_bits
                );
            }
            DiagnosticEvent::TamperDetected { reason } => {
                error!("Metadata about the embedded data is unusable ({reason}). The image is either corrupted, or has been altered by other software");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn on_event(&self, _: &DiagnosticEvent) {}
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn closures_are_sinks() {
        let seen = Cell::new(0);
        let sink = |_: &DiagnosticEvent| seen.set(seen.get() + 1);
        sink.on_event(&DiagnosticEvent::TamperDetected {
            reason: "test".to_string(),
        });
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn operations_display_lowercase() {
        assert_eq!(Operation::Extract.to_string(), "extract");
    }
}
