//! The roles of the allocation protocol.
//!
//! - [`TemplateCreator`] (PAS) announces a request.
//! - [`Broker`] serializes it and hands it to the registry.
//! - [`Registry`] (YPA) stores every request it receives.
//! - [`Matcher`] (MRA) filters the pool; [`Allocator`] (CLA) forms the coalition.

use log::debug;
use serde::Serialize;

use super::types::{
    new_contract_id, CandidateResource, CoalitionContract, ContractRequest, ContractTemplate,
};
use crate::core::error::FleetResult;
use crate::core::event_log::EventLog;

/// Creates contract templates for skill requests
pub struct TemplateCreator {
    log: EventLog,
}

impl TemplateCreator {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }

    pub fn create_template(&self, skills: &[String]) -> ContractTemplate {
        let template = ContractTemplate {
            id: new_contract_id(),
            required_skills: skills.to_vec(),
        };
        self.log.record(format!(
            "PAS: created contract {} with skills {:?}",
            template.id, skills
        ));
        template
    }
}

/// Decouples template producers from the registry's storage
pub struct Broker {
    log: EventLog,
}

impl Broker {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }

    /// Serialize the template and deliver it to the registry
    pub fn transmit(&self, template: &ContractTemplate, registry: &mut Registry) -> FleetResult<()> {
        let data = serde_json::to_string(&ContractRequest::from(template))?;
        self.log.record(format!("Broker: transmitted request {}", data));
        registry.store_json(&data)
    }
}

/// One stored request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryRecord {
    pub contract_id: String,
    pub required_skills: Vec<String>,
}

/// Append-only table of received requests
pub struct Registry {
    records: Vec<RegistryRecord>,
    log: EventLog,
}

impl Registry {
    pub fn new(log: EventLog) -> Self {
        log.record("YPA: initialized.");
        Self {
            records: Vec::new(),
            log,
        }
    }

    /// Store a serialized request; no deduplication, no skill validation
    pub fn store_json(&mut self, data: &str) -> FleetResult<()> {
        let request: ContractRequest = serde_json::from_str(data)?;
        let record = RegistryRecord {
            contract_id: request.id,
            required_skills: request.required_skills,
        };
        self.log.record(format!(
            "YPA: stored request {{ contract_id: {}, required_skills: {:?} }}",
            record.contract_id, record.required_skills
        ));
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[RegistryRecord] {
        &self.records
    }

    pub fn find(&self, contract_id: &str) -> Option<&RegistryRecord> {
        self.records.iter().find(|r| r.contract_id == contract_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Identifies candidates for a request
pub struct Matcher {
    log: EventLog,
}

impl Matcher {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }

    /// Indices into `pool` of available drones sharing at least one skill
    pub fn identify_candidates(&self, pool: &[CandidateResource], required_skills: &[String]) -> Vec<usize> {
        let candidates: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, r)| r.available && r.skills.intersects(required_skills))
            .map(|(i, _)| i)
            .collect();
        self.log.record(format!(
            "MRA: found {} candidates with matching skills.",
            candidates.len()
        ));
        candidates
    }
}

/// Forms coalitions and keeps their history
pub struct Allocator {
    coalitions: Vec<CoalitionContract>,
    log: EventLog,
}

impl Allocator {
    pub fn new(log: EventLog) -> Self {
        log.record("CLA: initialized.");
        Self {
            coalitions: Vec::new(),
            log,
        }
    }

    pub fn create_coalition_contract(&self, required_skills: &[String]) -> CoalitionContract {
        let contract = CoalitionContract::new(new_contract_id(), required_skills.to_vec());
        self.log.record(format!("CLA: created coalition contract {}", contract.id));
        contract
    }

    /// Recruit the best remaining candidate for each skill, in request order.
    ///
    /// `available` flags flipped here are authoritative for the rest of the
    /// cycle. The finished contract is appended to the history.
    pub fn recruit_members(
        &mut self,
        pool: &mut [CandidateResource],
        candidates: &[usize],
        mut contract: CoalitionContract,
    ) -> CoalitionContract {
        for skill in &contract.required_skills {
            let mut best: Option<usize> = None;
            for &idx in candidates {
                let candidate = &pool[idx];
                if !candidate.available || !candidate.skills.contains(skill) {
                    continue;
                }
                match best {
                    Some(b) if pool[b].score() <= candidate.score() => {}
                    _ => best = Some(idx),
                }
            }

            let Some(idx) = best else {
                self.log.record(format!("CLA: no candidate with skill {}", skill));
                continue;
            };

            let chosen = &mut pool[idx];
            debug!("Skill {} -> {} (score {:.3})", skill, chosen.id, chosen.score());
            if !contract.has_member(&chosen.id) {
                contract.members.push(chosen.id.clone());
                chosen.available = false;
                self.log.record(format!(
                    "CLA: recruited {} for skill {}. Optimization criterion applied.",
                    chosen.id, skill
                ));
            }
        }

        self.coalitions.push(contract.clone());
        contract
    }

    pub fn coalitions(&self) -> &[CoalitionContract] {
        &self.coalitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_broker_delivers_serialized_request() {
        let log = EventLog::new();
        let creator = TemplateCreator::new(log.clone());
        let broker = Broker::new(log.clone());
        let mut registry = Registry::new(log.clone());

        let template = creator.create_template(&skills(&["search", "rescue"]));
        broker.transmit(&template, &mut registry).expect("transmit");
        broker.transmit(&template, &mut registry).expect("transmit");

        assert_eq!(registry.len(), 2);
        let record = registry.find(&template.id).expect("stored");
        assert_eq!(record.required_skills, skills(&["search", "rescue"]));
        assert!(log.contains("Broker: transmitted request {\"id\":"));
    }

    #[test]
    fn test_registry_rejects_malformed_payload() {
        let mut registry = Registry::new(EventLog::new());
        assert!(registry.store_json("not json").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_matcher_requires_availability_and_overlap() {
        let matcher = Matcher::new(EventLog::new());
        let mut busy = CandidateResource::new("D3", &["search"], 1.0, 1.0, 1.0, 100.0);
        busy.available = false;
        let pool = vec![
            CandidateResource::new("D1", &["search", "relay"], 1.0, 1.0, 1.0, 100.0),
            CandidateResource::new("D2", &["mapping"], 1.0, 1.0, 1.0, 100.0),
            busy,
            CandidateResource::new("D4", &["rescue"], 1.0, 1.0, 1.0, 100.0),
        ];

        let found = matcher.identify_candidates(&pool, &skills(&["rescue", "search"]));
        assert_eq!(found, vec![0, 3]);
    }

    #[test]
    fn test_recruit_skips_missing_skill_and_duplicates() {
        let log = EventLog::new();
        let mut allocator = Allocator::new(log.clone());
        let mut pool = vec![
            CandidateResource::new("D1", &["search", "rescue"], 1.0, 1.0, 1.0, 100.0),
            CandidateResource::new("D2", &["search"], 5.0, 5.0, 1.0, 100.0),
        ];
        let required = skills(&["search", "rescue", "mapping"]);
        let contract = allocator.create_coalition_contract(&required);

        let contract = allocator.recruit_members(&mut pool, &[0, 1], contract);

        // D1 wins search; rescue has nobody left; mapping has nobody at all
        assert_eq!(contract.members, vec!["D1".to_string()]);
        assert!(!pool[0].available);
        assert!(pool[1].available);
        assert!(!contract.is_fulfilled());
        assert!(log.contains("CLA: no candidate with skill rescue"));
        assert!(log.contains("CLA: no candidate with skill mapping"));
        assert_eq!(allocator.coalitions().len(), 1);
    }

    #[test]
    fn test_recruit_tie_breaks_on_first_seen() {
        let mut allocator = Allocator::new(EventLog::new());
        let mut pool = vec![
            CandidateResource::new("D1", &["search"], 1.0, 1.0, 1.0, 100.0),
            CandidateResource::new("D2", &["search"], 1.0, 1.0, 1.0, 100.0),
        ];
        let contract = allocator.create_coalition_contract(&skills(&["search"]));
        let contract = allocator.recruit_members(&mut pool, &[0, 1], contract);

        assert_eq!(contract.members, vec!["D1".to_string()]);
    }

    #[test]
    fn test_recruit_prefers_higher_battery() {
        let mut allocator = Allocator::new(EventLog::new());
        let mut pool = vec![
            CandidateResource::new("D1", &["search"], 1.0, 1.0, 1.0, 40.0),
            CandidateResource::new("D2", &["search"], 1.0, 1.0, 1.0, 90.0),
        ];
        let contract = allocator.create_coalition_contract(&skills(&["search"]));
        let contract = allocator.recruit_members(&mut pool, &[0, 1], contract);

        assert_eq!(contract.members, vec!["D2".to_string()]);
    }
}
