//! Membership, activities and equipment for a colony.
//!
//! This crate holds the population side of the colony: who belongs to it,
//! with which traits, doing what, allowed to do what, and owning which
//! equipment. Agent bodies live in the world and are reached through the
//! [`AgentService`] trait.
//!
//! # Modules
//!
//! - [`service`] -- The [`AgentService`] collaborator trait.
//! - [`traits`] -- [`TraitSet`] and the status projection.
//! - [`roster`] -- The [`Roster`]: members, trait lists, locks, population.
//! - [`activity`] -- Current activities, durations, task sources.
//! - [`eligibility`] -- Pure activity eligibility gates.
//! - [`equipment`] -- [`EquipmentOwnership`].
//! - [`error`] -- [`AgentError`].

pub mod activity;
pub mod eligibility;
pub mod equipment;
pub mod error;
pub mod roster;
pub mod service;
pub mod traits;

pub use activity::{CurrentActivity, TaskSource, task_source};
pub use eligibility::{Candidate, Situation, is_eligible, is_eligible_assuming_tasks};
pub use equipment::EquipmentOwnership;
pub use error::AgentError;
pub use roster::{PRISONER_GROUP, Roster};
pub use service::AgentService;
pub use traits::{StatusSet, TraitSet, project_status};
