//! Coin control
//!
//! Collects the outpoints a transaction builder is required to spend.
//! Selection runs append to it; the builder consumes it afterwards.

use bitcoin::OutPoint;

/// Ordered set of outpoints pinned as transaction inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinControl {
    selected: Vec<OutPoint>,
}

impl CoinControl {
    /// Create an empty coin control
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin an outpoint; returns `false` if it was already pinned
    pub fn select(&mut self, outpoint: OutPoint) -> bool {
        if self.is_selected(&outpoint) {
            return false;
        }
        self.selected.push(outpoint);
        true
    }

    /// Remove a pinned outpoint
    pub fn unselect(&mut self, outpoint: &OutPoint) {
        self.selected.retain(|o| o != outpoint);
    }

    /// Remove all pinned outpoints
    pub fn unselect_all(&mut self) {
        self.selected.clear();
    }

    /// Whether `outpoint` is pinned
    pub fn is_selected(&self, outpoint: &OutPoint) -> bool {
        self.selected.contains(outpoint)
    }

    /// Whether any outpoint is pinned
    pub fn has_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Pinned outpoints in selection order
    pub fn selected(&self) -> &[OutPoint] {
        &self.selected
    }

    /// Take the pinned outpoints, leaving the coin control empty
    pub fn take(&mut self) -> Vec<OutPoint> {
        std::mem::take(&mut self.selected)
    }
}
