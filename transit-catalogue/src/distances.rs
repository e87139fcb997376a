//! Directional road distances between stops.
//!
//! Road distances are asymmetric: one-way streets and turning loops
//! mean the driven distance from A to B need not equal B to A. Input
//! that supplies only one direction implies the same value for the
//! reverse (mirror fallback), but an explicitly supplied reverse entry
//! always wins, whatever order the entries arrive in.

use std::collections::BTreeMap;

use crate::catalogue::StopId;

/// No road distance was recorded between two stops, in either
/// direction. Routes and statistics cannot be computed across such a
/// gap, so this is a data error rather than a query miss.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no road distance recorded from stop #{} to stop #{}", from.0, to.0)]
pub struct MissingDistance {
    pub from: StopId,
    pub to: StopId,
}

/// The directional distance table, keyed by stop id pairs.
///
/// Ordered storage keeps iteration (and therefore snapshots)
/// reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceTable {
    metres: BTreeMap<(StopId, StopId), u32>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records all supplied distances, then mirrors each pair whose
    /// reverse direction was never supplied.
    ///
    /// Intended to be called once, after every stop is known. Within
    /// one call, the first entry for a directed pair wins; the mirror
    /// pass runs strictly after all explicit entries, so an explicit
    /// reverse can never be overwritten by a mirror.
    pub fn set_distances<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (StopId, StopId, u32)>,
    {
        let supplied: Vec<(StopId, StopId, u32)> = entries.into_iter().collect();

        for &(from, to, metres) in &supplied {
            self.metres.entry((from, to)).or_insert(metres);
        }
        for &(from, to, metres) in &supplied {
            self.metres.entry((to, from)).or_insert(metres);
        }
    }

    /// Directional distance in metres.
    ///
    /// # Errors
    ///
    /// Fails if neither direction was ever supplied for the pair.
    pub fn distance(&self, from: StopId, to: StopId) -> Result<u32, MissingDistance> {
        match self.metres.get(&(from, to)) {
            Some(metres) => Ok(*metres),
            None => Err(MissingDistance { from, to }),
        }
    }

    /// All directed entries (mirrored ones included), in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StopId, StopId, u32)> + '_ {
        self.metres
            .iter()
            .map(|(&(from, to), &metres)| (from, to, metres))
    }

    /// Number of directed entries, mirrored ones included.
    pub fn len(&self) -> usize {
        self.metres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metres.is_empty()
    }
}
