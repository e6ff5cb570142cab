use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::core::event_log::REFUELED_MARKER;

fn refuel_pattern() -> &'static Regex {
    static REFUEL_RE: OnceLock<Regex> = OnceLock::new();
    REFUEL_RE.get_or_init(|| {
        Regex::new(&format!(r"Drone (\S+) {}", REFUELED_MARKER)).expect("static regex is valid")
    })
}

/// Refuel events per drone; fewer means more autonomy retained
pub fn recharge_counts(log_entries: &[String], drone_ids: &[String]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = drone_ids.iter().map(|id| (id.clone(), 0)).collect();

    for entry in log_entries {
        if let Some(captures) = refuel_pattern().captures(entry) {
            if let Some(count) = counts.get_mut(&captures[1]) {
                *count += 1;
            }
        }
    }

    counts
}
