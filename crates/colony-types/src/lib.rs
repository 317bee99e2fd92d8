//! Shared type definitions for the colony management engine.
//!
//! This crate is the single source of truth for the identifiers, enums and
//! plain data used across the `colony-*` workspace. View types flow to
//! `TypeScript` via `ts-rs` for a presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agents, tasks, items, colonies
//! - [`enums`] -- Traits, activities, resources, furniture, zones, warnings
//! - [`structs`] -- Positions, costs, items, messages, read-only views
//! - [`dice`] -- The randomness seam

pub mod dice;
pub mod enums;
pub mod ids;
pub mod structs;

pub use dice::Dice;
pub use enums::{
    ConquerCondition, CreatureStatus, DestroyKind, ExperienceKind, FurnitureKind, FurnitureLayer,
    HighlightKind, ItemClass, LastingEffect, MessagePriority, MinionActivity, MinionTrait,
    ResourceKind, StorageKind, SunlightState, Warning, WorkshopKind, ZoneKind,
};
pub use ids::{AgentId, ColonyId, ItemId, TaskId};
pub use structs::{
    AlarmInfo, CostInfo, Item, PlayerMessage, PopulationStats, Position, ResourceSummary, TribeId,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the view types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::TaskId::export_all();
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::ColonyId::export_all();

        let _ = crate::enums::MinionTrait::export_all();
        let _ = crate::enums::CreatureStatus::export_all();
        let _ = crate::enums::MinionActivity::export_all();
        let _ = crate::enums::ResourceKind::export_all();
        let _ = crate::enums::FurnitureKind::export_all();
        let _ = crate::enums::ZoneKind::export_all();
        let _ = crate::enums::Warning::export_all();

        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::CostInfo::export_all();
        let _ = crate::structs::PlayerMessage::export_all();
        let _ = crate::structs::PopulationStats::export_all();
        let _ = crate::structs::ResourceSummary::export_all();
    }
}
