use std::cell::OnceCell;

use crate::carrier::{Carrier, Selection};
use crate::diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, Operation};
use crate::tags::Tags;

/// Eligible payload bits of a carrier under one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capacity {
    pub parameter: u8,
    /// Bits per plane in scan order.
    pub plane_bits: Vec<u64>,
}

impl Capacity {
    pub fn total_bits(&self) -> u64 {
        self.plane_bits.iter().sum()
    }

    pub fn bytes(&self) -> usize {
        (self.total_bits() / 8) as usize
    }
}

/// Counts the payload bits a carrier holds, walking the same positions the
/// embedder writes to.
pub fn count_capacity<C: Carrier>(
    carrier: &C,
    selection: C::Selection,
    diagnostics: &dyn Diagnostics,
) -> Capacity {
    let width = u64::from(selection.bits_per_position());
    let plane_bits = (0..carrier.plane_count())
        .map(|plane| {
            diagnostics.on_event(&DiagnosticEvent::ScanStarted {
                operation: Operation::Capacity,
                plane,
            });
            let bits = carrier.positions(plane, selection).count() as u64 * width;
            diagnostics.on_event(&DiagnosticEvent::ScanFinished {
                operation: Operation::Capacity,
                plane,
                bits,
            });
            bits
        })
        .collect();

    Capacity {
        parameter: selection.parameter(),
        plane_bits,
    }
}

/// A carrier before embedding, together with the tags of its container.
///
/// Capacities are cached per parameter. The carrier cannot be mutated
/// through a `Cover`, so the cache never goes stale.
#[derive(Debug, Clone)]
pub struct Cover<C> {
    carrier: C,
    tags: Tags,
    capacities: [OnceCell<Capacity>; 8],
}

impl<C: Carrier> Cover<C> {
    pub fn new(carrier: C) -> Self {
        Self::with_tags(carrier, Tags::new())
    }

    pub fn with_tags(carrier: C, tags: Tags) -> Self {
        Cover {
            carrier,
            tags,
            capacities: Default::default(),
        }
    }

    pub fn carrier(&self) -> &C {
        &self.carrier
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn into_parts(self) -> (C, Tags) {
        (self.carrier, self.tags)
    }

    pub fn capacity(&self, selection: C::Selection) -> &Capacity {
        self.capacity_with(selection, &LogDiagnostics)
    }

    /// Like [`Cover::capacity`], reporting the scans of a cache miss to `diagnostics`.
    pub fn capacity_with(
        &self,
        selection: C::Selection,
        diagnostics: &dyn Diagnostics,
    ) -> &Capacity {
        let slot = usize::from(selection.parameter()).saturating_sub(1);
        self.capacities[slot].get_or_init(|| count_capacity(&self.carrier, selection, diagnostics))
    }

    /// Capacity under every valid parameter, in ascending order.
    pub fn storage_table(&self) -> Vec<Capacity> {
        C::KIND
            .parameter_range()
            .filter_map(|parameter| C::Selection::from_parameter(parameter).ok())
            .map(|selection| self.capacity(selection).clone())
            .collect()
    }
}
