use std::collections::BTreeMap;

use super::factors::FactorId;

/// Per-factor polarity. A missing key reads as "not reversed"; entries are
/// only ever flipped, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReversalStore {
    flags: BTreeMap<FactorId, bool>,
}

impl ReversalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reversed(&self, id: FactorId) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Returns the new polarity.
    pub fn toggle(&mut self, id: FactorId) -> bool {
        let flag = self.flags.entry(id).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn reversed_ids(&self) -> impl Iterator<Item = FactorId> + '_ {
        self.flags
            .iter()
            .filter(|(_, reversed)| **reversed)
            .map(|(id, _)| *id)
    }

    pub fn touched_count(&self) -> usize {
        self.flags.len()
    }
}
