//! Best-lap reduction for trackday events.

use std::collections::HashMap;

use protocol_core::models::LapRecord;
use tracing::debug;

/// Stateless helper that keeps each driver's fastest lap.
pub struct BestLapReducer;

impl BestLapReducer {
    /// Reduce `laps` to one record per driver name.
    ///
    /// The fastest lap wins; a later lap replaces the kept one only when it is
    /// strictly faster, so the first of several equal laps is kept. The result
    /// is ordered by each driver's first appearance.
    pub fn reduce(laps: &[LapRecord]) -> Vec<LapRecord> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut best: Vec<LapRecord> = Vec::new();

        for lap in laps {
            match index.get(lap.driver_name.as_str()) {
                Some(&i) => {
                    if lap.lap_time < best[i].lap_time {
                        best[i] = lap.clone();
                    }
                }
                None => {
                    index.insert(lap.driver_name.as_str(), best.len());
                    best.push(lap.clone());
                }
            }
        }

        debug!(
            "BestLapReducer: kept {} best laps out of {}",
            best.len(),
            laps.len()
        );
        best
    }

    /// Same as [`BestLapReducer::reduce`], keyed by driver name.
    pub fn reduce_by_driver(laps: &[LapRecord]) -> HashMap<String, LapRecord> {
        Self::reduce(laps)
            .into_iter()
            .map(|lap| (lap.driver_name.clone(), lap))
            .collect()
    }
}
