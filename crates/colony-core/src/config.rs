//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `colony-config.yaml` at the project
//! root. Every field is defaulted, so an empty document is a valid
//! configuration and partial documents only override what they name.
//!
//! # Sections
//!
//! - `world` -- seed, number of ticks to run, light cycle.
//! - `logging` -- log level for the engine binary.
//! - `colony` -- behaviour switches and tuning of one colony
//!   ([`ColonyConfig`]).
//! - `sandbox` -- layout of the in-memory world used by headless runs.

use std::path::Path;

use serde::Deserialize;

use colony_types::{ConquerCondition, Item, ItemClass, ResourceKind, StorageKind, Warning};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration of a headless run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Colony behaviour and tuning.
    #[serde(default)]
    pub colony: ColonyConfig,

    /// Layout of the sandbox world.
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. Blank input yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

// ---------------------------------------------------------------------------
// World and logging
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable run name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks the engine runs.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Daylight ticks per light cycle.
    #[serde(default = "default_day_length")]
    pub day_length: u64,

    /// Darkness ticks per light cycle.
    #[serde(default = "default_night_length")]
    pub night_length: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            ticks: default_ticks(),
            day_length: default_day_length(),
            night_length: default_night_length(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log a colony summary every N ticks (0 disables).
    #[serde(default = "default_summary_interval")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_interval_ticks: default_summary_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Colony
// ---------------------------------------------------------------------------

/// Behaviour switches and tuning of one colony.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColonyConfig {
    /// Display name.
    #[serde(default = "default_colony_name")]
    pub name: String,

    /// When the colony counts as conquered.
    #[serde(default = "default_conquer_condition")]
    pub conquer_condition: ConquerCondition,

    /// Leaders are fighters too.
    #[serde(default = "default_true")]
    pub leader_is_fighter: bool,

    /// The villain keeps its own sleeping schedule (sleep only at night).
    #[serde(default)]
    pub villain_sleeping: bool,

    /// Run the periodic warning pass.
    #[serde(default = "default_true")]
    pub warnings: bool,

    /// Scan for enemies and delay tasks near them.
    #[serde(default = "default_true")]
    pub enemy_positions: bool,

    /// Run the construction sync pass.
    #[serde(default = "default_true")]
    pub constructions: bool,

    /// Track equipment ownership.
    #[serde(default = "default_true")]
    pub manage_equipment: bool,

    /// Population limit before furniture bonuses.
    #[serde(default = "default_base_population")]
    pub base_population: u32,

    /// Prisoner rebellion tuning.
    #[serde(default)]
    pub rebellion: RebellionConfig,

    /// Morale changes.
    #[serde(default)]
    pub morale: MoraleConfig,

    /// Durations and radii.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Odds of the periodic passes.
    #[serde(default)]
    pub periodic: PeriodicConfig,

    /// Danger level step at which an escalation event is published.
    #[serde(default = "default_danger_step")]
    pub danger_escalation_step: u32,

    /// Which items get hauled to which storage.
    #[serde(default = "FetchRule::standard")]
    pub fetch_rules: Vec<FetchRule>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            name: default_colony_name(),
            conquer_condition: default_conquer_condition(),
            leader_is_fighter: true,
            villain_sleeping: false,
            warnings: true,
            enemy_positions: true,
            constructions: true,
            manage_equipment: true,
            base_population: default_base_population(),
            rebellion: RebellionConfig::default(),
            morale: MoraleConfig::default(),
            timing: TimingConfig::default(),
            periodic: PeriodicConfig::default(),
            danger_escalation_step: default_danger_step(),
            fetch_rules: FetchRule::standard(),
        }
    }
}

/// Prisoner rebellion tuning.
///
/// Once prisoners exceed `free_prisoners`, the ratio of excess prisoners
/// to fighters is mapped linearly from `allowed_ratio` (probability 0) to
/// `max_ratio` (probability 1); the per-tick chance is that probability
/// divided by `chance_divisor`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RebellionConfig {
    /// Prisoners that never count towards a rebellion.
    #[serde(default = "default_free_prisoners")]
    pub free_prisoners: u32,

    /// Ratio at which the probability starts rising.
    #[serde(default = "default_allowed_ratio")]
    pub allowed_ratio: f64,

    /// Ratio at which the probability reaches 1.
    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,

    /// Divisor turning the probability into a per-tick chance.
    #[serde(default = "default_chance_divisor")]
    pub chance_divisor: f64,
}

impl Default for RebellionConfig {
    fn default() -> Self {
        Self {
            free_prisoners: default_free_prisoners(),
            allowed_ratio: default_allowed_ratio(),
            max_ratio: default_max_ratio(),
            chance_divisor: default_chance_divisor(),
        }
    }
}

/// Morale changes applied by the reactor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoraleConfig {
    /// Gain of a member that killed an enemy.
    #[serde(default = "default_kill_morale")]
    pub kill: f64,

    /// Gain of every other fighter when a member kills.
    #[serde(default = "default_kill_others_morale")]
    pub kill_others: f64,

    /// Loss of every fighter when a member dies or is captured.
    #[serde(default = "default_death_morale")]
    pub death: f64,

    /// Loss of every fighter when the only leader dies.
    #[serde(default = "default_leader_death_morale")]
    pub leader_death: f64,

    /// Loss of every fighter when a member is banished.
    #[serde(default = "default_banish_morale")]
    pub banish: f64,

    /// Gain of a minion that was whipped.
    #[serde(default = "default_whipping_morale")]
    pub whipping: f64,
}

impl Default for MoraleConfig {
    fn default() -> Self {
        Self {
            kill: default_kill_morale(),
            kill_others: default_kill_others_morale(),
            death: default_death_morale(),
            leader_death: default_leader_death_morale(),
            banish: default_banish_morale(),
            whipping: default_whipping_morale(),
        }
    }
}

/// Durations (in ticks) and radii.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// How long an alarm stays active.
    #[serde(default = "default_alarm_duration")]
    pub alarm_duration: u64,

    /// How long tasks near enemies stay delayed.
    #[serde(default = "default_delay_duration")]
    pub delay_duration: u64,

    /// Radius around enemies in which tasks are delayed.
    #[serde(default = "default_delay_radius")]
    pub delay_radius: u32,

    /// Wait time of a guard task.
    #[serde(default = "default_guard_duration")]
    pub guard_duration: u64,

    /// Rested/satiated time given to creatures joining from the world.
    #[serde(default = "default_rested_duration")]
    pub rested_duration: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            alarm_duration: default_alarm_duration(),
            delay_duration: default_delay_duration(),
            delay_radius: default_delay_radius(),
            guard_duration: default_guard_duration(),
            rested_duration: default_rested_duration(),
        }
    }
}

/// Odds of the probabilistic passes. A pass with odds `n` runs with
/// probability `1 / n` each tick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeriodicConfig {
    /// Warning evaluation.
    #[serde(default = "default_five")]
    pub warnings: u32,

    /// Enemy proximity scan.
    #[serde(default = "default_five")]
    pub enemy_scan: u32,

    /// Fetch pass.
    #[serde(default = "default_five")]
    pub fetch: u32,

    /// Equipment ownership reconciliation.
    #[serde(default = "default_equipment_odds")]
    pub equipment: u32,

    /// A torture session ends (in death or conversion).
    #[serde(default = "default_torture_odds")]
    pub torture_event: u32,
}

impl Default for PeriodicConfig {
    fn default() -> Self {
        Self {
            warnings: default_five(),
            enemy_scan: default_five(),
            fetch: default_five(),
            equipment: default_equipment_odds(),
            torture_event: default_torture_odds(),
        }
    }
}

/// Routes lying items matching a filter to one storage kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetchRule {
    /// Item classes the rule applies to (empty matches any class).
    #[serde(default)]
    pub classes: Vec<ItemClass>,

    /// Restrict to items counting as this resource.
    #[serde(default)]
    pub resource: Option<ResourceKind>,

    /// Destination storage.
    pub storage: StorageKind,

    /// Raised when the destination storage does not exist.
    #[serde(default)]
    pub warning: Option<Warning>,
}

impl FetchRule {
    /// Whether `item` falls under this rule.
    pub fn applies(&self, item: &Item) -> bool {
        let class_ok = self.classes.is_empty() || self.classes.contains(&item.class);
        let resource_ok = self.resource.is_none_or(|r| item.resource == Some(r));
        class_ok && resource_ok
    }

    /// The standard rules: gold to chests, corpses to graves, other
    /// resources to the stockpile and gear to equipment storage.
    pub fn standard() -> Vec<Self> {
        vec![
            Self {
                classes: vec![ItemClass::Resource],
                resource: Some(ResourceKind::Gold),
                storage: StorageKind::Gold,
                warning: Some(Warning::NoGoldStorage),
            },
            Self {
                classes: vec![ItemClass::Resource],
                resource: None,
                storage: StorageKind::Resource,
                warning: Some(Warning::NoResourceStorage),
            },
            Self {
                classes: vec![ItemClass::Corpse],
                resource: None,
                storage: StorageKind::Corpses,
                warning: Some(Warning::NoCorpseStorage),
            },
            Self {
                classes: vec![
                    ItemClass::Weapon,
                    ItemClass::Armor,
                    ItemClass::Potion,
                    ItemClass::Trap,
                    ItemClass::AutomatonPart,
                ],
                resource: None,
                storage: StorageKind::Equipment,
                warning: Some(Warning::NoEquipmentStorage),
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Sandbox
// ---------------------------------------------------------------------------

/// Layout of the in-memory world built by the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SandboxConfig {
    /// Map width in squares.
    #[serde(default = "default_map_size")]
    pub width: u32,

    /// Map height in squares.
    #[serde(default = "default_map_size")]
    pub height: u32,

    /// Side of the square the colony starts with.
    #[serde(default = "default_territory_size")]
    pub territory_size: u32,

    /// Starting workers.
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Starting fighters.
    #[serde(default = "default_fighters")]
    pub fighters: u32,

    /// Starting prisoners.
    #[serde(default)]
    pub prisoners: u32,

    /// Wood lying in the stockpile at start.
    #[serde(default = "default_wood")]
    pub wood: u32,

    /// Gold lying in the treasury at start.
    #[serde(default = "default_gold")]
    pub gold: u32,

    /// Trees scattered on the map.
    #[serde(default = "default_trees")]
    pub trees: u32,

    /// Hostile raiders appearing near the colony.
    #[serde(default)]
    pub raiders: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            width: default_map_size(),
            height: default_map_size(),
            territory_size: default_territory_size(),
            workers: default_workers(),
            fighters: default_fighters(),
            prisoners: 0,
            wood: default_wood(),
            gold: default_gold(),
            trees: default_trees(),
            raiders: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Sandbox".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks() -> u64 {
    2000
}

const fn default_day_length() -> u64 {
    1000
}

const fn default_night_length() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval() -> u64 {
    100
}

fn default_colony_name() -> String {
    "Keeper".to_owned()
}

const fn default_conquer_condition() -> ConquerCondition {
    ConquerCondition::KillFightersAndLeader
}

const fn default_true() -> bool {
    true
}

const fn default_base_population() -> u32 {
    10
}

const fn default_danger_step() -> u32 {
    500
}

const fn default_free_prisoners() -> u32 {
    4
}

const fn default_allowed_ratio() -> f64 {
    0.5
}

const fn default_max_ratio() -> f64 {
    1.5
}

const fn default_chance_divisor() -> f64 {
    1000.0
}

const fn default_kill_morale() -> f64 {
    0.25
}

const fn default_kill_others_morale() -> f64 {
    0.015
}

const fn default_death_morale() -> f64 {
    0.015
}

const fn default_leader_death_morale() -> f64 {
    2.0
}

const fn default_banish_morale() -> f64 {
    0.05
}

const fn default_whipping_morale() -> f64 {
    0.3
}

const fn default_alarm_duration() -> u64 {
    100
}

const fn default_delay_duration() -> u64 {
    20
}

const fn default_delay_radius() -> u32 {
    10
}

const fn default_guard_duration() -> u64 {
    400
}

const fn default_rested_duration() -> u64 {
    500
}

const fn default_five() -> u32 {
    5
}

const fn default_equipment_odds() -> u32 {
    40
}

const fn default_torture_odds() -> u32 {
    30
}

const fn default_map_size() -> u32 {
    32
}

const fn default_territory_size() -> u32 {
    8
}

const fn default_workers() -> u32 {
    4
}

const fn default_fighters() -> u32 {
    3
}

const fn default_wood() -> u32 {
    60
}

const fn default_gold() -> u32 {
    100
}

const fn default_trees() -> u32 {
    12
}
