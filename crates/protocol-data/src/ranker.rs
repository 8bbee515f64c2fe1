//! Class partitioning and ranking.

use std::collections::BTreeMap;

use protocol_core::models::{ClassGroup, DriverResult, LapRecord};

/// Stateless helper that splits results into classes and orders each class.
pub struct ClassRanker;

impl ClassRanker {
    /// Group `items` by class and sort every class ascending by `key`.
    ///
    /// Classes come out in lexicographic order of their names. The sort is
    /// stable, so equal keys keep their input order.
    pub fn rank<T, K: Ord>(
        items: Vec<T>,
        class_of: impl Fn(&T) -> &str,
        key: impl Fn(&T) -> K,
    ) -> Vec<ClassGroup<T>> {
        // BTreeMap keeps the class names sorted.
        let mut classes: BTreeMap<String, Vec<T>> = BTreeMap::new();
        for item in items {
            let class = class_of(&item).to_string();
            classes.entry(class).or_default().push(item);
        }

        classes
            .into_iter()
            .map(|(class_name, mut members)| {
                members.sort_by_key(|m| key(m));
                ClassGroup {
                    class_name,
                    members,
                }
            })
            .collect()
    }

    /// Time-attack standings: lowest total time first.
    pub fn rank_time_attack(results: Vec<DriverResult>) -> Vec<ClassGroup<DriverResult>> {
        Self::rank(results, |r| r.class.as_str(), |r| r.total_time)
    }

    /// Trackday standings: fastest single lap first.
    pub fn rank_trackday(best_laps: Vec<LapRecord>) -> Vec<ClassGroup<LapRecord>> {
        Self::rank(best_laps, |l| l.class.as_str(), |l| l.lap_time)
    }
}
