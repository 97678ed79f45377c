//! Position history for lag-compensated traces.

use engine_core::{EntityId, Vec3};
use std::collections::VecDeque;

/// About one second of history at the default frame time.
const MAX_SNAPSHOTS: usize = 64;

#[derive(Debug, Clone)]
struct Snapshot {
    time: i64,
    positions: Vec<(EntityId, Vec3)>,
}

/// Ring of per-frame box positions, newest last.
#[derive(Debug, Default)]
pub struct LagHistory {
    snapshots: VecDeque<Snapshot>,
}

impl LagHistory {
    pub fn push(&mut self, time: i64, positions: Vec<(EntityId, Vec3)>) {
        if self.snapshots.len() == MAX_SNAPSHOTS {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(Snapshot { time, positions });
    }

    /// Positions as they were `time_delta` ms before the newest snapshot.
    ///
    /// Picks the newest snapshot at or before the target time, falling back to
    /// the oldest one when the history is too short.
    pub fn positions_before(&self, time_delta: i64) -> Option<&[(EntityId, Vec3)]> {
        let newest = self.snapshots.back()?;
        let target = newest.time - time_delta;
        let snapshot = self
            .snapshots
            .iter()
            .rev()
            .find(|s| s.time <= target)
            .or_else(|| self.snapshots.front())?;
        Some(&snapshot.positions)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(x: f32) -> Vec<(EntityId, Vec3)> {
        vec![(EntityId(1), Vec3::new(x, 0.0, 0.0))]
    }

    #[test]
    fn picks_snapshot_at_or_before_target() {
        let mut h = LagHistory::default();
        h.push(0, snap(0.0));
        h.push(16, snap(1.0));
        h.push(32, snap(2.0));
        h.push(48, snap(3.0));

        let p = h.positions_before(20).unwrap();
        assert_eq!(p[0].1.x, 1.0);
        let p = h.positions_before(0).unwrap();
        assert_eq!(p[0].1.x, 3.0);
    }

    #[test]
    fn falls_back_to_oldest() {
        let mut h = LagHistory::default();
        h.push(100, snap(5.0));
        h.push(116, snap(6.0));
        assert_eq!(h.positions_before(1000).unwrap()[0].1.x, 5.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut h = LagHistory::default();
        for i in 0..200 {
            h.push(i * 16, snap(i as f32));
        }
        assert_eq!(h.len(), MAX_SNAPSHOTS);
    }
}
