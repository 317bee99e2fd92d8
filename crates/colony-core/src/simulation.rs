//! The simulation loop.
//!
//! A [`Simulation`] owns the clock, the world, the dice and every colony
//! together with its controller. One [`Simulation::step`] is one global
//! tick:
//!
//! 1. Advance the clock and let the world expire its timed state.
//! 2. For each colony in insertion order, run its controller, then its
//!    own tick.
//! 3. Deliver events. World events and colony outboxes are published to
//!    the bus in emission order; each event is handed to every colony.
//!    Events produced while reacting are appended and delivered in the
//!    same step.
//! 4. Take members that joined a colony out of every other colony, then
//!    hand each colony's notices to its controller.
//!
//! Cross-colony commands (trade, pillage, conquest transfer) go through
//! the simulation, which borrows both colonies at once.

use tracing::{debug, info};

use colony_agents::TraitSet;
use colony_types::{AgentId, ColonyId, Dice, Item, ItemId, SunlightState};

use crate::clock::{ClockError, WorldClock};
use crate::colony::{Colony, TickSummary};
use crate::control::{ColonyControl, Notice};
use crate::error::ColonyError;
use crate::event::EventBus;
use crate::world::{Env, World};

/// Errors that stop the simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A colony operation violated a contract.
    #[error("colony error: {source}")]
    Colony {
        /// The underlying colony error.
        #[from]
        source: ColonyError,
    },

    /// No colony with this id is part of the simulation.
    #[error("unknown colony {0}")]
    UnknownColony(ColonyId),
}

/// What one global tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// The tick that ran.
    pub tick: u64,
    /// One summary per colony, in insertion order.
    pub summaries: Vec<TickSummary>,
    /// Events delivered.
    pub events: usize,
    /// Notices handed to controllers.
    pub notices: usize,
}

/// Called after every step.
pub trait StepCallback {
    /// Observe a finished step.
    fn on_step(&mut self, report: &StepReport);
}

/// A callback that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _report: &StepReport) {}
}

struct ColonySlot {
    colony: Colony,
    control: Box<dyn ColonyControl>,
}

/// Clock, world, dice and colonies.
pub struct Simulation<W: World> {
    clock: WorldClock,
    world: W,
    dice: Box<dyn Dice>,
    slots: Vec<ColonySlot>,
    bus: EventBus,
}

impl<W: World> Simulation<W> {
    /// Assemble a simulation with no colonies.
    pub fn new(clock: WorldClock, world: W, dice: Box<dyn Dice>) -> Self {
        Self {
            clock,
            world,
            dice,
            slots: Vec::new(),
            bus: EventBus::new(),
        }
    }

    /// Add a colony driven by `control`. Returns its id.
    pub fn add_colony(&mut self, colony: Colony, control: Box<dyn ColonyControl>) -> ColonyId {
        let id = colony.id();
        info!(colony = %id, name = colony.name(), "colony added");
        self.slots.push(ColonySlot { colony, control });
        id
    }

    /// The clock.
    pub const fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// The world.
    pub const fn world(&self) -> &W {
        &self.world
    }

    /// The world, mutably, for scripted happenings between steps.
    pub const fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Colonies in insertion order.
    pub fn colonies(&self) -> impl Iterator<Item = &Colony> {
        self.slots.iter().map(|slot| &slot.colony)
    }

    /// One colony.
    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.slots
            .iter()
            .find(|slot| slot.colony.id() == id)
            .map(|slot| &slot.colony)
    }

    /// Run `f` against one colony with a fresh environment.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownColony`], or whatever `f` returns.
    pub fn with_colony<T>(
        &mut self,
        id: ColonyId,
        f: impl FnOnce(&mut Colony, &mut Env<'_>) -> Result<T, ColonyError>,
    ) -> Result<T, SimulationError> {
        let now = self.clock.tick();
        let sunlight = self.clock.sunlight();
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.colony.id() == id)
            .ok_or(SimulationError::UnknownColony(id))?;
        let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
        Ok(f(&mut slot.colony, &mut env)?)
    }

    /// Advance one global tick.
    ///
    /// # Errors
    ///
    /// [`SimulationError::Clock`] on overflow, [`SimulationError::Colony`]
    /// when a colony operation fails.
    pub fn step(&mut self) -> Result<StepReport, SimulationError> {
        let now = self.clock.advance()?;
        let sunlight = self.clock.sunlight();
        self.world.begin_tick(now);

        let mut summaries = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
            slot.control.tick(&mut slot.colony, &mut env)?;
            summaries.push(slot.colony.tick(&mut env)?);
        }

        let events = self.deliver_events(now, sunlight)?;

        let drained: Vec<Vec<Notice>> = self
            .slots
            .iter_mut()
            .map(|slot| slot.colony.drain_notices())
            .collect();
        let joined: Vec<(ColonyId, AgentId)> = self
            .slots
            .iter()
            .zip(&drained)
            .flat_map(|(slot, batch)| {
                batch.iter().filter_map(|notice| match notice {
                    Notice::MemberAdded { agent } => Some((slot.colony.id(), *agent)),
                    _ => None,
                })
            })
            .collect();
        for (keeper, agent) in joined {
            let stayed = self
                .colony(keeper)
                .is_some_and(|colony| colony.roster().contains(agent));
            if stayed {
                self.leave_other_colonies(keeper, agent, now, sunlight)?;
            }
        }

        let mut notices = 0_usize;
        for (slot, batch) in self.slots.iter_mut().zip(drained) {
            for notice in batch {
                log_notice(slot.colony.id(), &notice);
                slot.control.on_notice(&slot.colony, &notice);
                notices = notices.saturating_add(1);
            }
        }

        debug!(tick = now, events, notices, "step finished");
        Ok(StepReport {
            tick: now,
            summaries,
            events,
            notices,
        })
    }

    /// Add `agent` to colony `id`, taking it out of any other colony first.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownColony`], or the errors of
    /// [`Colony::add_member`].
    pub fn add_member(
        &mut self,
        id: ColonyId,
        agent: AgentId,
        traits: TraitSet,
    ) -> Result<(), SimulationError> {
        if self.colony(id).is_none() {
            return Err(SimulationError::UnknownColony(id));
        }
        let now = self.clock.tick();
        let sunlight = self.clock.sunlight();
        self.leave_other_colonies(id, agent, now, sunlight)?;
        self.with_colony(id, |colony, env| colony.add_member(agent, traits, env))
    }

    /// Remove `agent` from every colony but `keeper`. Returns how many it
    /// left.
    fn leave_other_colonies(
        &mut self,
        keeper: ColonyId,
        agent: AgentId,
        now: u64,
        sunlight: SunlightState,
    ) -> Result<usize, SimulationError> {
        let mut left = 0_usize;
        for slot in &mut self.slots {
            if slot.colony.id() == keeper {
                continue;
            }
            let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
            if slot.colony.remove_member(agent, &mut env)? {
                info!(colony = %slot.colony.id(), agent = %agent, joined = %keeper, "member left for another colony");
                left = left.saturating_add(1);
            }
        }
        Ok(left)
    }

    fn collect_events(&mut self) {
        self.bus.publish_all(self.world.drain_events());
        for slot in &mut self.slots {
            self.bus.publish_all(slot.colony.drain_outbox());
        }
    }

    fn deliver_events(
        &mut self,
        now: u64,
        sunlight: SunlightState,
    ) -> Result<usize, SimulationError> {
        self.collect_events();
        let mut delivered = 0_usize;
        while let Some(event) = self.bus.next_event() {
            debug!(tick = now, event = event.name(), "delivering event");
            for slot in &mut self.slots {
                let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
                slot.colony.on_event(&event, &mut env)?;
            }
            delivered = delivered.saturating_add(1);
            self.collect_events();
        }
        Ok(delivered)
    }

    /// Run `ticks` steps, reporting each to `callback`. Returns the last
    /// report.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step.
    pub fn run(
        &mut self,
        ticks: u64,
        callback: &mut dyn StepCallback,
    ) -> Result<Option<StepReport>, SimulationError> {
        info!(ticks, colonies = self.slots.len(), "simulation started");
        let mut last = None;
        for _ in 0..ticks {
            let report = self.step()?;
            callback.on_step(&report);
            last = Some(report);
        }
        info!(tick = self.clock.tick(), "simulation finished");
        Ok(last)
    }

    // -- cross-colony commands ------------------------------------------------

    /// Borrow two distinct colonies at once, in argument order.
    fn split(
        slots: &mut [ColonySlot],
        first: ColonyId,
        second: ColonyId,
    ) -> Result<(&mut Colony, &mut Colony), SimulationError> {
        let index_of = |id: ColonyId| {
            slots
                .iter()
                .position(|slot| slot.colony.id() == id)
                .ok_or(SimulationError::UnknownColony(id))
        };
        let a = index_of(first)?;
        let b = index_of(second)?;
        if a == b {
            return Err(ColonyError::SameColony.into());
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = slots.split_at_mut(high);
        let low_slot = head
            .get_mut(low)
            .ok_or(SimulationError::UnknownColony(first))?;
        let high_slot = tail
            .first_mut()
            .ok_or(SimulationError::UnknownColony(second))?;
        if a < b {
            Ok((&mut low_slot.colony, &mut high_slot.colony))
        } else {
            Ok((&mut high_slot.colony, &mut low_slot.colony))
        }
    }

    /// `buyer` buys `item` from `seller`.
    ///
    /// # Errors
    ///
    /// Unknown colonies, or the errors of [`Colony::buy_from`].
    pub fn trade(
        &mut self,
        buyer: ColonyId,
        seller: ColonyId,
        item: ItemId,
    ) -> Result<(), SimulationError> {
        let now = self.clock.tick();
        let sunlight = self.clock.sunlight();
        let (buyer, seller) = Self::split(&mut self.slots, buyer, seller)?;
        let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
        buyer.buy_from(seller, item, &mut env)?;
        Ok(())
    }

    /// Items `raider` could pillage from `victim`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownColony`].
    pub fn pillage_options(&self, victim: ColonyId) -> Result<Vec<Item>, SimulationError> {
        let victim = self
            .colony(victim)
            .ok_or(SimulationError::UnknownColony(victim))?;
        Ok(Colony::pillage_options(victim, &self.world))
    }

    /// `raider` carries `items` off from the conquered `victim`. Returns
    /// how many were moved.
    ///
    /// # Errors
    ///
    /// Unknown colonies, or the errors of [`Colony::pillage_from`].
    pub fn pillage(
        &mut self,
        raider: ColonyId,
        victim: ColonyId,
        items: &[ItemId],
    ) -> Result<usize, SimulationError> {
        let now = self.clock.tick();
        let sunlight = self.clock.sunlight();
        let (raider, victim) = Self::split(&mut self.slots, raider, victim)?;
        let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
        Ok(raider.pillage_from(victim, items, &mut env)?)
    }

    /// `winner` absorbs every member of `loser`. Returns how many moved.
    ///
    /// # Errors
    ///
    /// Unknown colonies, or the errors of [`Colony::absorb_conquered`].
    pub fn absorb(&mut self, winner: ColonyId, loser: ColonyId) -> Result<usize, SimulationError> {
        let now = self.clock.tick();
        let sunlight = self.clock.sunlight();
        let (winner, loser) = Self::split(&mut self.slots, winner, loser)?;
        let mut env = Env::new(&mut self.world, &mut *self.dice, now, sunlight);
        Ok(winner.absorb_conquered(loser, &mut env)?)
    }
}

fn log_notice(colony: ColonyId, notice: &Notice) {
    match notice {
        Notice::Message(message) => {
            info!(colony = %colony, priority = ?message.priority, text = %message.text, "message");
        }
        Notice::Conquered { victim, .. } => {
            info!(colony = %colony, victim = %victim, "conquered");
        }
        other => debug!(colony = %colony, notice = ?other, "notice"),
    }
}
