//! The agent service consumed by the colony.
//!
//! Agents are owned by the simulation world. The colony only holds their
//! ids and asks the world about everything else: body, morale, effects,
//! allegiance, equipment. Implementations live outside this crate; the
//! core crate ships an in-memory one for headless runs and tests.

use colony_types::{
    AgentId, ColonyId, ExperienceKind, ItemId, LastingEffect, MinionActivity, Position, TribeId,
};

/// Trait-independent agent attributes and side effects.
pub trait AgentService {
    /// Whether the agent exists and is alive.
    fn exists(&self, agent: AgentId) -> bool;

    /// Display name.
    fn name(&self, agent: AgentId) -> String;

    /// Species name, used as the default lock group.
    fn species(&self, agent: AgentId) -> String;

    /// Whether the body is humanoid.
    fn is_humanoid(&self, agent: AgentId) -> bool;

    /// Current morale in `[-1, 1]`.
    fn morale(&self, agent: AgentId) -> f64;

    /// Shift morale by `delta`; the result is clamped to `[-1, 1]`.
    fn add_morale(&mut self, agent: AgentId, delta: f64);

    /// Whether the agent's attributes allow `activity` at all.
    fn can_perform(&self, agent: AgentId, activity: MinionActivity) -> bool;

    /// Whether `effect` is active.
    fn has_effect(&self, agent: AgentId, effect: LastingEffect) -> bool;

    /// Apply `effect` until `until`, or permanently when `None`.
    fn add_effect(&mut self, agent: AgentId, effect: LastingEffect, until: Option<u64>);

    /// Clear `effect`.
    fn remove_effect(&mut self, agent: AgentId, effect: LastingEffect);

    /// Number of automaton part slots.
    fn automaton_slots(&self, agent: AgentId) -> u32;

    /// Combat difficulty, used for danger and kill points.
    fn difficulty_points(&self, agent: AgentId) -> u32;

    /// Put the agent under the control of `colony`.
    fn set_controller(&mut self, agent: AgentId, colony: ColonyId);

    /// Whether the agent keeps its own controller when joining.
    fn keeps_controller(&self, agent: AgentId) -> bool;

    /// Current allegiance.
    fn tribe(&self, agent: AgentId) -> TribeId;

    /// Change allegiance.
    fn set_tribe(&mut self, agent: AgentId, tribe: TribeId);

    /// Forget a personal grudge against `other`.
    fn remove_private_enemy(&mut self, agent: AgentId, other: AgentId);

    /// Kill the agent.
    fn kill(&mut self, agent: AgentId, attacker: Option<AgentId>);

    /// Raise an experience track.
    fn increase_experience(&mut self, agent: AgentId, kind: ExperienceKind, amount: f64);

    /// Items carried or worn.
    fn equipment(&self, agent: AgentId) -> Vec<ItemId>;

    /// Where the agent stands, if on the map.
    fn position(&self, agent: AgentId) -> Option<Position>;
}
