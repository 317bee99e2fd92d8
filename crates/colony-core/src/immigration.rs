//! Pending immigration offers.
//!
//! Two kinds of creature ask to join: recruits, who may charge a fee, and
//! captives, enemies knocked out by a member that can be taken prisoner.
//! Offers are decided by the controller through
//! [`Colony::accept_immigrant`](crate::colony::Colony::accept_immigrant) and
//! [`Colony::reject_immigrant`](crate::colony::Colony::reject_immigrant).

use colony_agents::TraitSet;
use colony_types::{AgentId, CostInfo};

/// What joining means for the offered creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferKind {
    /// A volunteer.
    Recruit {
        /// Fee taken on acceptance.
        cost: Option<CostInfo>,
        /// Traits given on joining.
        traits: TraitSet,
    },
    /// A stunned enemy. Accepting makes it a prisoner; rejecting kills it.
    Captive,
}

/// One creature waiting for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// The creature.
    pub agent: AgentId,
    /// Recruit or captive.
    pub kind: OfferKind,
    /// Tick the offer was made.
    pub since: u64,
}

/// Offers in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Immigration {
    offers: Vec<Offer>,
}

impl Immigration {
    /// No offers.
    pub const fn new() -> Self {
        Self { offers: Vec::new() }
    }

    /// Offer a recruit.
    pub fn add_recruit(&mut self, agent: AgentId, cost: Option<CostInfo>, traits: TraitSet, now: u64) {
        self.push(Offer {
            agent,
            kind: OfferKind::Recruit { cost, traits },
            since: now,
        });
    }

    /// Offer a captive.
    pub fn add_captive(&mut self, agent: AgentId, now: u64) {
        self.push(Offer {
            agent,
            kind: OfferKind::Captive,
            since: now,
        });
    }

    fn push(&mut self, offer: Offer) {
        if !self.offers.iter().any(|o| o.agent == offer.agent) {
            self.offers.push(offer);
        }
    }

    /// Pending offers.
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Remove and return the offer at `index`.
    pub fn take(&mut self, index: usize) -> Option<Offer> {
        (index < self.offers.len()).then(|| self.offers.remove(index))
    }

    /// Drop offers whose creature is gone. Returns how many were dropped.
    pub fn prune(&mut self, mut exists: impl FnMut(AgentId) -> bool) -> usize {
        let before = self.offers.len();
        self.offers.retain(|o| exists(o.agent));
        before.saturating_sub(self.offers.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::MinionTrait;

    use super::*;

    #[test]
    fn one_offer_per_creature() {
        let mut imm = Immigration::new();
        let a = AgentId::new();
        imm.add_captive(a, 1);
        imm.add_recruit(a, None, TraitSet::of(&[MinionTrait::Fighter]), 2);
        assert_eq!(imm.offers().len(), 1);
        assert_eq!(imm.offers().first().unwrap().kind, OfferKind::Captive);
    }

    #[test]
    fn take_and_prune() {
        let mut imm = Immigration::new();
        let a = AgentId::new();
        let b = AgentId::new();
        imm.add_captive(a, 1);
        imm.add_captive(b, 1);
        assert!(imm.take(5).is_none());
        assert_eq!(imm.take(0).unwrap().agent, a);
        assert_eq!(imm.prune(|agent| agent != b), 1);
        assert!(imm.offers().is_empty());
    }
}
