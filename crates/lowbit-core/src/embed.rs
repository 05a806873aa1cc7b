use crate::bit_iterator::BitIterator;
use crate::capacity::Cover;
use crate::carrier::{Carrier, Selection};
use crate::diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, Operation};
use crate::error::{LowbitError, MetadataError};
use crate::metadata::Metadata;
use crate::result::Result;
use crate::tags::Tags;

/// A carrier with hidden data and the tags holding its metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StegoCarrier<C> {
    carrier: C,
    tags: Tags,
}

impl<C: Carrier> StegoCarrier<C> {
    /// Wraps a carrier loaded from a file that is supposed to hide data.
    pub fn new(carrier: C, tags: Tags) -> Self {
        StegoCarrier { carrier, tags }
    }

    pub fn carrier(&self) -> &C {
        &self.carrier
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn metadata(&self) -> Result<Metadata, MetadataError> {
        Metadata::read(&self.tags, C::KIND)
    }

    pub fn into_parts(self) -> (C, Tags) {
        (self.carrier, self.tags)
    }
}

/// Writes payloads into the eligible positions of a cover.
pub struct Embedder<'d> {
    diagnostics: &'d dyn Diagnostics,
}

impl Default for Embedder<'static> {
    fn default() -> Self {
        Embedder {
            diagnostics: &LogDiagnostics,
        }
    }
}

impl<'d> Embedder<'d> {
    pub fn with_diagnostics(diagnostics: &'d dyn Diagnostics) -> Self {
        Embedder { diagnostics }
    }

    /// Embeds `payload` into a copy of the cover's carrier.
    ///
    /// The payload is written most significant bit first, plane by plane in
    /// scan order. Positions after the last payload bit are left untouched.
    pub fn embed<C: Carrier>(
        &self,
        cover: &Cover<C>,
        payload: &[u8],
        selection: C::Selection,
    ) -> Result<StegoCarrier<C>> {
        if payload.is_empty() {
            return Err(LowbitError::EmptyPayload);
        }
        let available = cover.capacity_with(selection, self.diagnostics).bytes();
        if payload.len() > available {
            return Err(LowbitError::CapacityExceeded {
                required: payload.len(),
                available,
            });
        }

        let source = cover.carrier();
        let mut carrier = source.clone();
        let width = selection.bits_per_position();
        let mut bits = BitIterator::new(payload);

        for plane in 0..source.plane_count() {
            if bits.remaining() == 0 {
                break;
            }
            self.diagnostics.on_event(&DiagnosticEvent::ScanStarted {
                operation: Operation::Embed,
                plane,
            });
            let before = bits.remaining();
            // writes keep every position eligible, so the source positions
            // are the positions of the copy
            for position in source.positions(plane, selection) {
                let Some(chunk) = bits.next_chunk(width) else {
                    break;
                };
                carrier.write_bits(plane, position, selection, chunk);
            }
            self.diagnostics.on_event(&DiagnosticEvent::ScanFinished {
                operation: Operation::Embed,
                plane,
                bits: before - bits.remaining(),
            });
        }

        let mut tags = cover.tags().clone();
        Metadata::new(payload.len() as u64 * 8, selection.parameter()).write(&mut tags);
        Ok(StegoCarrier { carrier, tags })
    }

    /// Parses the parameter for the carrier kind, then embeds.
    pub fn embed_with_parameter<C: Carrier>(
        &self,
        cover: &Cover<C>,
        payload: &[u8],
        parameter: u8,
    ) -> Result<StegoCarrier<C>> {
        self.embed(cover, payload, C::Selection::from_parameter(parameter)?)
    }

    /// Fills the capacity with as many whole copies of `payload` as fit.
    pub fn watermark<C: Carrier>(
        &self,
        cover: &Cover<C>,
        payload: &[u8],
        selection: C::Selection,
    ) -> Result<StegoCarrier<C>> {
        if payload.is_empty() {
            return Err(LowbitError::EmptyPayload);
        }
        let available = cover.capacity_with(selection, self.diagnostics).bytes();
        let copies = available / payload.len();
        if copies == 0 {
            return Err(LowbitError::CapacityExceeded {
                required: payload.len(),
                available,
            });
        }
        self.embed(cover, &payload.repeat(copies), selection)
    }
}
