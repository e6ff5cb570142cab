//! Contract-based resource allocation: a single-round, centralized
//! contract-net with greedy per-skill winner selection.

pub mod pipeline;
pub mod roles;
pub mod types;

pub use pipeline::ContractPipeline;
pub use roles::{Allocator, Broker, Matcher, Registry, RegistryRecord, TemplateCreator};
pub use types::*;
