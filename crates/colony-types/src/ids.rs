//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the colony refers to has a strongly-typed ID so that an
//! agent handle can never be passed where a task handle is expected. All
//! IDs use UUID v7 (time-ordered).
//!
//! The colony never owns agents or items; these IDs are non-owning
//! handles into the simulation world.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Handle to a creature (minion) owned by the simulation world.
    AgentId
}

define_id! {
    /// Unique identifier for a task held by a colony's task queue.
    TaskId
}

define_id! {
    /// Handle to an item lying in the world or carried by a creature.
    ItemId
}

define_id! {
    /// Unique identifier for a colony (player keeper or villain).
    ColonyId
}
