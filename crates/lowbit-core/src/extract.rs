use crate::bit_iterator::BitCollector;
use crate::carrier::{Carrier, Selection};
use crate::diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, Operation};
use crate::embed::StegoCarrier;
use crate::result::Result;

// upper bound for the up-front allocation, the record may be tampered with
const MAX_PREALLOCATED_BYTES: u64 = 1 << 20;

/// Payload recovered from a stego carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub payload: Vec<u8>,
    /// Payload bits announced by the metadata record.
    pub expected_bits: u64,
    /// Bits that could not be read because the carrier ran out of positions.
    pub missing_bits: u64,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.missing_bits == 0
    }
}

/// Reads payloads back, driven by the metadata record of the stego carrier.
pub struct Extractor<'d> {
    diagnostics: &'d dyn Diagnostics,
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Extractor {
            diagnostics: &LogDiagnostics,
        }
    }
}

impl<'d> Extractor<'d> {
    pub fn with_diagnostics(diagnostics: &'d dyn Diagnostics) -> Self {
        Extractor { diagnostics }
    }

    /// Replays the embedding scan with the parameter stored in the metadata.
    ///
    /// Fails before touching any plane when the record is unusable. A carrier
    /// that lost positions since embedding yields the complete bytes that
    /// could be read, with [`Extraction::missing_bits`] set.
    pub fn extract<C: Carrier>(&self, stego: &StegoCarrier<C>) -> Result<Extraction> {
        let metadata = stego.metadata().map_err(|e| {
            self.diagnostics.on_event(&DiagnosticEvent::TamperDetected {
                reason: e.to_string(),
            });
            e
        })?;
        let selection = C::Selection::from_parameter(metadata.parameter)?;
        let width = selection.bits_per_position();

        let expected_bits = metadata.payload_bits;
        let mut remaining = expected_bits;
        let mut collector =
            BitCollector::with_capacity((expected_bits / 8).min(MAX_PREALLOCATED_BYTES) as usize);
        let carrier = stego.carrier();

        for plane in 0..carrier.plane_count() {
            if remaining == 0 {
                break;
            }
            self.diagnostics.on_event(&DiagnosticEvent::ScanStarted {
                operation: Operation::Extract,
                plane,
            });
            let before = remaining;
            for position in carrier.positions(plane, selection) {
                let take = u64::from(width).min(remaining) as u8;
                collector.push_chunk(carrier.read_bits(plane, position, selection), width, take)?;
                remaining -= u64::from(take);
                if remaining == 0 {
                    break;
                }
            }
            self.diagnostics.on_event(&DiagnosticEvent::ScanFinished {
                operation: Operation::Extract,
                plane,
                bits: before - remaining,
            });
        }

        if remaining > 0 {
            self.diagnostics.on_event(&DiagnosticEvent::PartialExtraction {
                expected_bits,
                missing_bits: remaining,
            });
        }

        Ok(Extraction {
            payload: collector.into_bytes(),
            expected_bits,
            missing_bits: remaining,
        })
    }
}
