use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::core::config::DroneConfig;
use crate::mission::{DroneState, Position};

/// Weights of the recruitment score (lower is better)
pub const COST_WEIGHT: f64 = 0.3;
pub const TIME_WEIGHT: f64 = 0.3;
pub const QUALITY_WEIGHT: f64 = 0.2;
pub const BATTERY_WEIGHT: f64 = 0.2;

/// Unordered set of capability tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    /// Whether at least one of `skills` is in the set
    pub fn intersects(&self, skills: &[String]) -> bool {
        skills.iter().any(|s| self.0.contains(s))
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Fresh short contract identifier
pub fn new_contract_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// An unfulfilled request for a set of skills
#[derive(Debug, Clone, PartialEq)]
pub struct ContractTemplate {
    pub id: String,
    /// Skills in request order; recruitment iterates in this order
    pub required_skills: Vec<String>,
}

/// Wire form of a [`ContractTemplate`] exchanged between broker and registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRequest {
    pub id: String,
    pub required_skills: Vec<String>,
}

impl From<&ContractTemplate> for ContractRequest {
    fn from(template: &ContractTemplate) -> Self {
        Self {
            id: template.id.clone(),
            required_skills: template.required_skills.clone(),
        }
    }
}

/// Fulfilment record binding drones to a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoalitionContract {
    pub id: String,
    pub required_skills: Vec<String>,
    /// Recruited drone ids in skill-iteration order, never duplicated
    pub members: Vec<String>,
}

impl CoalitionContract {
    pub fn new(id: String, required_skills: Vec<String>) -> Self {
        Self {
            id,
            required_skills,
            members: Vec::new(),
        }
    }

    pub fn has_member(&self, drone_id: &str) -> bool {
        self.members.iter().any(|m| m == drone_id)
    }

    /// Whether every requested skill recruited a distinct drone
    pub fn is_fulfilled(&self) -> bool {
        self.members.len() == self.required_skills.len()
    }
}

/// The allocator's view of one drone
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResource {
    pub id: String,
    pub skills: SkillSet,
    pub cost: f64,
    pub time: f64,
    pub quality: f64,
    pub battery: f64,
    pub position: Position,
    pub available: bool,
}

impl CandidateResource {
    pub fn new(id: &str, skills: &[&str], cost: f64, time: f64, quality: f64, battery: f64) -> Self {
        Self {
            id: id.to_string(),
            skills: skills.iter().copied().collect(),
            cost,
            time,
            quality,
            battery,
            position: Position::ORIGIN,
            available: true,
        }
    }

    pub fn from_config(config: &DroneConfig) -> Self {
        Self {
            id: config.id.clone(),
            skills: config.skills.iter().cloned().collect(),
            cost: config.cost,
            time: config.time,
            quality: config.quality,
            battery: config.initial_battery,
            position: config.initial_position.into(),
            available: true,
        }
    }

    /// Recruitment score; the allocator picks the minimum
    pub fn score(&self) -> f64 {
        COST_WEIGHT * self.cost + TIME_WEIGHT * self.time
            - QUALITY_WEIGHT * self.quality
            - BATTERY_WEIGHT * self.battery
    }

    /// Re-read battery, position and availability from live state
    pub fn refresh(&mut self, state: &DroneState) {
        self.battery = state.battery;
        self.position = state.position;
        self.available = state.status.is_allocatable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::DroneStatus;

    #[test]
    fn test_score_weights() {
        let c = CandidateResource::new("D1", &["search"], 2.0, 4.0, 5.0, 50.0);
        let expected = 0.3 * 2.0 + 0.3 * 4.0 - 0.2 * 5.0 - 0.2 * 50.0;
        assert!((c.score() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_refresh_derives_availability_from_status() {
        let mut c = CandidateResource::new("D1", &["search"], 1.0, 1.0, 1.0, 100.0);

        for (status, available) in [
            (DroneStatus::Idle, true),
            (DroneStatus::Patrol, true),
            (DroneStatus::Refueling, false),
            (DroneStatus::Failure, false),
        ] {
            c.refresh(&DroneState::new(42.0, Position::new(1.0, 2.0), status));
            assert_eq!(c.available, available, "status {}", status);
        }
        assert_eq!(c.battery, 42.0);
        assert_eq!(c.position, Position::new(1.0, 2.0));
    }

    #[test]
    fn test_skill_set_intersection() {
        let skills: SkillSet = ["search", "relay"].into_iter().collect();
        assert!(skills.intersects(&["rescue".to_string(), "relay".to_string()]));
        assert!(!skills.intersects(&["rescue".to_string()]));
        assert!(!skills.intersects(&[]));
    }

    #[test]
    fn test_contract_ids_are_short_hex() {
        let id = new_contract_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
