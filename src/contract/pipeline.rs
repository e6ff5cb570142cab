//! One allocation cycle: announce, transmit, store, match, recruit.

use log::{debug, info};

use super::roles::{Allocator, Broker, Matcher, Registry, TemplateCreator};
use super::types::{CandidateResource, CoalitionContract};
use crate::core::error::FleetResult;
use crate::core::event_log::EventLog;
use crate::mission::MissionState;

/// Owns the protocol roles and the candidate pool across cycles
pub struct ContractPipeline {
    creator: TemplateCreator,
    broker: Broker,
    registry: Registry,
    matcher: Matcher,
    allocator: Allocator,
    pool: Vec<CandidateResource>,
    log: EventLog,
}

impl ContractPipeline {
    pub fn new(pool: Vec<CandidateResource>, log: EventLog) -> Self {
        Self {
            creator: TemplateCreator::new(log.clone()),
            broker: Broker::new(log.clone()),
            registry: Registry::new(log.clone()),
            matcher: Matcher::new(log.clone()),
            allocator: Allocator::new(log.clone()),
            pool,
            log,
        }
    }

    /// Pull battery, position and availability for every candidate
    pub fn refresh_pool(&mut self, state: &MissionState) {
        for resource in &mut self.pool {
            resource.refresh(&state.state(&resource.id));
        }
        debug!(
            "Candidate pool refreshed: {} of {} available",
            self.pool.iter().filter(|r| r.available).count(),
            self.pool.len()
        );
    }

    /// Run a full cycle for `skills` against a fresh snapshot of `state`
    pub fn run_cycle(&mut self, skills: &[String], state: &MissionState) -> FleetResult<CoalitionContract> {
        let template = self.creator.create_template(skills);
        self.broker.transmit(&template, &mut self.registry)?;

        self.refresh_pool(state);

        let candidates = self
            .matcher
            .identify_candidates(&self.pool, &template.required_skills);
        let contract = self
            .allocator
            .create_coalition_contract(&template.required_skills);
        let contract = self
            .allocator
            .recruit_members(&mut self.pool, &candidates, contract);

        info!(
            "Coalition {} formed with {} of {} skills covered",
            contract.id,
            contract.members.len(),
            contract.required_skills.len()
        );
        Ok(contract)
    }

    /// Withdraw a drone from the pool until the next refresh
    pub fn mark_unavailable(&mut self, drone_id: &str) -> bool {
        match self.pool.iter_mut().find(|r| r.id == drone_id) {
            Some(resource) => {
                resource.available = false;
                self.log.record(format!(
                    "MAS: resource {} marked unavailable for contracting.",
                    drone_id
                ));
                true
            }
            None => false,
        }
    }

    pub fn pool(&self) -> &[CandidateResource] {
        &self.pool
    }

    pub fn candidate(&self, drone_id: &str) -> Option<&CandidateResource> {
        self.pool.iter().find(|r| r.id == drone_id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Every contract formed so far, oldest first
    pub fn history(&self) -> &[CoalitionContract] {
        self.allocator.coalitions()
    }
}
