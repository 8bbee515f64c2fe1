//! Session aggregation for time-attack events.
//!
//! Splits each driver's laps into sessions at out-of-session markers, picks
//! the best lap of every session and sums them into the driver's total.

use std::collections::HashMap;
use std::time::Duration;

use protocol_core::config::EngineConfig;
use protocol_core::models::{DriverResult, LapRecord, Session};
use tracing::{debug, warn};

// ── Driver grouping ───────────────────────────────────────────────────────────

/// All laps of one driver, in file order.
#[derive(Debug, Clone)]
pub struct DriverLaps<'a> {
    pub driver_name: &'a str,
    pub laps: Vec<&'a LapRecord>,
}

/// Group laps by driver name.
///
/// Drivers appear in the order of their first lap and each driver's laps keep
/// their file order, which is the only session-boundary signal.
pub fn group_by_driver(laps: &[LapRecord]) -> Vec<DriverLaps<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DriverLaps<'_>> = Vec::new();

    for lap in laps {
        let name = lap.driver_name.as_str();
        match index.get(name) {
            Some(&i) => groups[i].laps.push(lap),
            None => {
                index.insert(name, groups.len());
                groups.push(DriverLaps {
                    driver_name: name,
                    laps: vec![lap],
                });
            }
        }
    }

    groups
}

// ── SessionAggregator ─────────────────────────────────────────────────────────

/// Builds [`DriverResult`]s from raw laps.
pub struct SessionAggregator {
    config: EngineConfig,
}

impl SessionAggregator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Aggregate every driver in `laps`, in order of first appearance.
    pub fn aggregate(&self, laps: &[LapRecord]) -> Vec<DriverResult> {
        let results: Vec<DriverResult> = group_by_driver(laps)
            .iter()
            .filter_map(|group| self.aggregate_driver(group))
            .collect();

        debug!(
            "SessionAggregator: built {} driver results from {} laps",
            results.len(),
            laps.len()
        );
        results
    }

    /// Aggregate a single driver. Returns `None` when the group has no laps.
    ///
    /// Class and start number come from the driver's first lap.
    pub fn aggregate_driver(&self, group: &DriverLaps<'_>) -> Option<DriverResult> {
        let first = group.laps.first()?;

        let mut sessions = self.split_sessions(&group.laps);
        let surplus = self.surplus_sessions(&sessions);
        if surplus > 0 {
            warn!(
                "{} drove {} sessions, {} more than the configured {}; keeping all",
                group.driver_name,
                sessions.len(),
                surplus,
                self.config.session_count
            );
        }
        let total_time: Duration = sessions.iter().map(Session::best_lap_or_zero).sum();
        self.pad_sessions(&mut sessions);

        Some(DriverResult {
            driver_name: group.driver_name.to_string(),
            driver_id: first.driver_id.clone(),
            class: first.class.clone(),
            sessions,
            total_time,
        })
    }

    // ── Session helpers ───────────────────────────────────────────────────────

    /// Cut the laps into sessions.
    ///
    /// A lap longer than the threshold closes the current session (if it has
    /// laps) and opens a new one. The last open session is always closed,
    /// even when empty, so at least one session is returned.
    fn split_sessions(&self, laps: &[&LapRecord]) -> Vec<Session> {
        let threshold = self.config.lap_time_threshold;
        let mut sessions = Vec::new();
        let mut current: Vec<Duration> = Vec::new();

        for lap in laps {
            if lap.lap_time > threshold {
                if !current.is_empty() {
                    sessions.push(self.close_session(std::mem::take(&mut current)));
                }
                continue;
            }
            current.push(lap.lap_time);
        }
        sessions.push(self.close_session(current));

        sessions
    }

    /// Close a driven session. The best lap starts at the threshold, so a
    /// session without laps reports the threshold itself.
    fn close_session(&self, lap_times: Vec<Duration>) -> Session {
        let best = lap_times
            .iter()
            .copied()
            .fold(self.config.lap_time_threshold, Duration::min);
        Session {
            lap_times,
            best_lap: Some(best),
        }
    }

    /// Number of driven sessions beyond the configured count.
    fn surplus_sessions(&self, sessions: &[Session]) -> usize {
        sessions.len().saturating_sub(self.config.session_count)
    }

    /// Append padding until the configured count is reached. Extra driven
    /// sessions are left in place.
    fn pad_sessions(&self, sessions: &mut Vec<Session>) {
        while sessions.len() < self.config.session_count {
            sessions.push(Session::padding());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(v: u64) -> Duration {
        Duration::from_secs(v)
    }

    fn lap(name: &str, time_secs: u64, class: &str) -> LapRecord {
        LapRecord {
            number: 0,
            driver_id: format!("{}-id", name),
            driver_name: name.to_string(),
            lap_time: secs(time_secs),
            transponder_id: String::new(),
            class: class.to_string(),
        }
    }

    fn laps_for(name: &str, times: &[u64]) -> Vec<LapRecord> {
        times.iter().map(|&t| lap(name, t, "Pro")).collect()
    }

    fn aggregator() -> SessionAggregator {
        SessionAggregator::new(EngineConfig::default())
    }

    // ── group_by_driver ───────────────────────────────────────────────────────

    #[test]
    fn test_group_by_driver_keeps_first_appearance_order() {
        let laps = vec![
            lap("Carol", 50, "Pro"),
            lap("Alice", 51, "Pro"),
            lap("Carol", 49, "Pro"),
            lap("Bob", 52, "Pro"),
        ];
        let groups = group_by_driver(&laps);
        let names: Vec<&str> = groups.iter().map(|g| g.driver_name).collect();
        assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
        assert_eq!(groups[0].laps.len(), 2);
        assert_eq!(groups[0].laps[1].lap_time, secs(49));
    }

    #[test]
    fn test_group_by_driver_empty() {
        assert!(group_by_driver(&[]).is_empty());
    }

    // ── Segmentation ──────────────────────────────────────────────────────────

    #[test]
    fn test_two_sessions_split_by_long_lap() {
        let laps = laps_for("Alice", &[50, 55, 200, 48, 47]);
        let results = aggregator().aggregate(&laps);
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.sessions.len(), 3);
        assert_eq!(r.sessions[0].lap_times, vec![secs(50), secs(55)]);
        assert_eq!(r.sessions[0].best_lap, Some(secs(50)));
        assert_eq!(r.sessions[1].lap_times, vec![secs(48), secs(47)]);
        assert_eq!(r.sessions[1].best_lap, Some(secs(47)));
        assert!(r.sessions[2].is_padding());
        assert_eq!(r.total_time, secs(97));
        assert_eq!(r.driven_sessions(), 2);
    }

    #[test]
    fn test_only_long_laps_gives_threshold_session() {
        let laps = laps_for("Bob", &[200, 250]);
        let results = aggregator().aggregate(&laps);
        let r = &results[0];

        assert_eq!(r.sessions.len(), 3);
        assert!(r.sessions[0].lap_times.is_empty());
        assert_eq!(r.sessions[0].best_lap, Some(secs(180)));
        assert!(r.sessions[1].is_padding());
        assert!(r.sessions[2].is_padding());
        assert_eq!(r.total_time, secs(180));
    }

    #[test]
    fn test_trailing_long_lap_closes_with_empty_session() {
        let laps = laps_for("Carol", &[50, 200]);
        let results = aggregator().aggregate(&laps);
        let r = &results[0];

        assert_eq!(r.sessions[0].best_lap, Some(secs(50)));
        assert_eq!(r.sessions[1].best_lap, Some(secs(180)));
        assert!(r.sessions[1].lap_times.is_empty());
        assert!(r.sessions[2].is_padding());
        assert_eq!(r.total_time, secs(230));
    }

    #[test]
    fn test_consecutive_long_laps_do_not_create_extra_sessions() {
        let laps = laps_for("Dave", &[50, 200, 300, 400, 49]);
        let results = aggregator().aggregate(&laps);
        let r = &results[0];
        assert_eq!(r.driven_sessions(), 2);
        assert_eq!(r.sessions[1].best_lap, Some(secs(49)));
    }

    #[test]
    fn test_lap_equal_to_threshold_is_a_real_lap() {
        let laps = laps_for("Eve", &[180, 60]);
        let results = aggregator().aggregate(&laps);
        let r = &results[0];
        assert_eq!(r.sessions[0].lap_times, vec![secs(180), secs(60)]);
        assert_eq!(r.sessions[0].best_lap, Some(secs(60)));
    }

    #[test]
    fn test_extra_sessions_are_kept() {
        let laps = laps_for("Frank", &[50, 200, 51, 200, 52, 200, 53]);
        let results = aggregator().aggregate(&laps);
        let r = &results[0];
        assert_eq!(r.sessions.len(), 4);
        assert!(r.sessions.iter().all(|s| !s.is_padding()));
        assert_eq!(r.total_time, secs(50 + 51 + 52 + 53));
    }

    #[test]
    fn test_surplus_sessions_counts_only_overflow() {
        let agg = aggregator();
        let driven = |n: usize| -> Vec<Session> {
            (0..n)
                .map(|_| Session {
                    lap_times: vec![secs(50)],
                    best_lap: Some(secs(50)),
                })
                .collect()
        };
        assert_eq!(agg.surplus_sessions(&driven(1)), 0);
        assert_eq!(agg.surplus_sessions(&driven(3)), 0);
        assert_eq!(agg.surplus_sessions(&driven(5)), 2);
    }

    #[test]
    fn test_custom_session_count_and_threshold() {
        let config = EngineConfig {
            session_count: 5,
            lap_time_threshold: secs(100),
            ..EngineConfig::default()
        };
        let laps = laps_for("Gina", &[90, 120, 80]);
        let results = SessionAggregator::new(config).aggregate(&laps);
        let r = &results[0];
        assert_eq!(r.sessions.len(), 5);
        assert_eq!(r.driven_sessions(), 2);
        assert_eq!(r.total_time, secs(170));
    }

    // ── Totals and identity ───────────────────────────────────────────────────

    #[test]
    fn test_total_matches_recomputed_sum() {
        let mut laps = laps_for("Alice", &[50, 55, 200, 48, 47, 200, 46]);
        laps.extend(laps_for("Bob", &[200, 60]));
        laps.extend(laps_for("Carol", &[300]));
        for r in aggregator().aggregate(&laps) {
            assert_eq!(r.total_time, r.sum_best_laps(), "driver {}", r.driver_name);
        }
    }

    #[test]
    fn test_class_and_id_come_from_first_lap() {
        let laps = vec![
            LapRecord {
                driver_id: "7".to_string(),
                ..lap("Alice", 50, "Pro")
            },
            LapRecord {
                driver_id: "8".to_string(),
                ..lap("Alice", 49, "Street")
            },
        ];
        let results = aggregator().aggregate(&laps);
        let r = &results[0];
        assert_eq!(r.class, "Pro");
        assert_eq!(r.driver_id, "7");
    }

    #[test]
    fn test_one_result_per_driver_name() {
        let laps = vec![
            lap("Alice", 50, "Pro"),
            lap("Bob", 51, "Pro"),
            lap("Alice", 49, "Pro"),
        ];
        let results = aggregator().aggregate(&laps);
        let names: Vec<&str> = results.iter().map(|r| r.driver_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregator().aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_driver_empty_group_is_none() {
        let group = DriverLaps {
            driver_name: "Ghost",
            laps: Vec::new(),
        };
        assert!(aggregator().aggregate_driver(&group).is_none());
    }
}
