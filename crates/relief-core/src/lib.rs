#![deny(warnings)]

//! Core domain models and invariants for the relief supply round game.
//!
//! This crate defines serializable types shared by settlement, forecasting and
//! the session runtime, with validation helpers guarding the input boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One of the three parties ordering from the shared supplier each round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Participant {
    /// The player using the tool.
    Me,
    /// First competitor.
    Competitor1,
    /// Second competitor.
    Competitor2,
}

impl Participant {
    /// Fixed iteration order used for order arrays and outcome arrays.
    pub const ALL: [Participant; 3] = [
        Participant::Me,
        Participant::Competitor1,
        Participant::Competitor2,
    ];

    /// Competitors only, in forecast order.
    pub const COMPETITORS: [Participant; 2] = [Participant::Competitor1, Participant::Competitor2];

    /// Position of the participant in per-round arrays.
    pub fn index(self) -> usize {
        match self {
            Participant::Me => 0,
            Participant::Competitor1 => 1,
            Participant::Competitor2 => 2,
        }
    }

    /// Short label used in tables.
    pub fn label(self) -> &'static str {
        match self {
            Participant::Me => "MY",
            Participant::Competitor1 => "C1",
            Participant::Competitor2 => "C2",
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Model constants, fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Units the shared supplier can ship per round (default: 120).
    pub supplier_capacity: f64,
    /// Maximum units any single participant can sell per round (default: 50).
    pub market_demand: f64,
    /// Revenue per unit sold (default: 20).
    pub revenue_per_sale: Decimal,
    /// Cost per unit received from the supplier (default: 10).
    pub cost_per_item: Decimal,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            supplier_capacity: 120.0,
            market_demand: 50.0,
            revenue_per_sale: Decimal::new(20, 0),
            cost_per_item: Decimal::new(10, 0),
        }
    }
}

impl ModelConfig {
    /// Validate constants once at startup.
    ///
    /// Rejects non-finite or negative values, and the configuration where
    /// market demand equals supplier capacity, which leaves the advisory
    /// formula without a denominator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.supplier_capacity.is_finite() && self.market_demand.is_finite()) {
            return Err(ConfigError::NonFinite);
        }
        if self.supplier_capacity < 0.0 {
            return Err(ConfigError::Negative("supplier_capacity"));
        }
        if self.market_demand < 0.0 {
            return Err(ConfigError::Negative("market_demand"));
        }
        if self.revenue_per_sale < Decimal::ZERO {
            return Err(ConfigError::Negative("revenue_per_sale"));
        }
        if self.cost_per_item < Decimal::ZERO {
            return Err(ConfigError::Negative("cost_per_item"));
        }
        if self.scarcity_gap() == 0.0 {
            return Err(ConfigError::DegenerateAdvisory {
                capacity: self.supplier_capacity,
            });
        }
        Ok(())
    }

    /// Market demand minus supplier capacity; negative under the defaults.
    pub fn scarcity_gap(&self) -> f64 {
        self.market_demand - self.supplier_capacity
    }
}

/// Errors in the model constants. Fatal at startup.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Capacity and demand must be finite.
    #[error("model constants must be finite")]
    NonFinite,
    /// Named constant is below zero.
    #[error("model constant `{0}` must be non-negative")]
    Negative(&'static str),
    /// Market demand equals supplier capacity.
    #[error("market demand equals supplier capacity ({capacity}); suggested order is undefined")]
    DegenerateAdvisory { capacity: f64 },
}

/// Input validation errors. Raised before any ledger mutation.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Round numbers start at 1.
    #[error("round number must be positive, got {0}")]
    NonPositiveRound(i64),
    /// Round number does not fit the ledger key.
    #[error("round number {0} is out of range")]
    RoundOutOfRange(i64),
    /// Order quantities cannot be negative.
    #[error("{participant} order must be non-negative, got {value}")]
    NegativeOrder { participant: Participant, value: f64 },
    /// Order quantities must be finite numbers.
    #[error("{0} order must be a finite number")]
    NonFinite(Participant),
    /// Orders are individually finite but their sum is not.
    #[error("total order overflows")]
    NonFiniteTotal,
    /// Field could not be parsed as a number.
    #[error("not a number: {0:?}")]
    NotANumber(String),
}

/// Parse a round number from user text.
pub fn parse_round(text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(text.to_string()))
}

/// Parse an order quantity from user text. Range checks happen in [`RoundInput::new`].
pub fn parse_quantity(text: &str) -> Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(text.to_string()))
}

/// Check a round number and narrow it to the ledger key type.
pub fn round_key(round: i64) -> Result<u32, ValidationError> {
    if round <= 0 {
        return Err(ValidationError::NonPositiveRound(round));
    }
    u32::try_from(round).map_err(|_| ValidationError::RoundOutOfRange(round))
}

/// A validated "new round" submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    round: u32,
    orders: [f64; 3],
}

impl RoundInput {
    /// Build a submission, rejecting non-positive rounds and negative or non-finite orders.
    pub fn new(round: i64, my_order: f64, c1_order: f64, c2_order: f64) -> Result<Self, ValidationError> {
        let round = round_key(round)?;
        let orders = [my_order, c1_order, c2_order];
        for p in Participant::ALL {
            let value = orders[p.index()];
            if !value.is_finite() {
                return Err(ValidationError::NonFinite(p));
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeOrder { participant: p, value });
            }
        }
        if !orders.iter().sum::<f64>().is_finite() {
            return Err(ValidationError::NonFiniteTotal);
        }
        Ok(Self { round, orders })
    }

    /// Round number (>= 1).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Order quantity submitted for a participant.
    pub fn order(&self, p: Participant) -> f64 {
        self.orders[p.index()]
    }

    /// All three orders in [`Participant::ALL`] order.
    pub fn orders(&self) -> [f64; 3] {
        self.orders
    }

    /// Sum of the three orders.
    pub fn total(&self) -> f64 {
        self.orders.iter().sum()
    }
}

/// Settled result for one participant in one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    /// Requested quantity.
    pub order: f64,
    /// Quantity actually received after rationing.
    pub allocated: f64,
    /// Units sold, capped by market demand.
    pub sales: f64,
    /// Sales times revenue per sale.
    pub revenue: Decimal,
    /// Allocated quantity times cost per item.
    pub cost: Decimal,
    /// Revenue minus cost.
    pub profit: Decimal,
}

impl ParticipantOutcome {
    /// Supplied minus requested; negative when the round was rationed.
    pub fn supply_delta(&self) -> f64 {
        self.allocated - self.order
    }
}

/// One settled round. Derived fields are read-only; records come from settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    input: RoundInput,
    total_order: f64,
    outcomes: [ParticipantOutcome; 3],
}

impl RoundRecord {
    /// Assemble a record from a submission and its per-participant outcomes.
    pub fn new(input: RoundInput, outcomes: [ParticipantOutcome; 3]) -> Self {
        let total_order = input.total();
        Self {
            input,
            total_order,
            outcomes,
        }
    }

    /// Ledger key.
    pub fn round(&self) -> u32 {
        self.input.round()
    }

    /// The submission this record was settled from.
    pub fn input(&self) -> &RoundInput {
        &self.input
    }

    /// Sum of the three orders.
    pub fn total_order(&self) -> f64 {
        self.total_order
    }

    /// Outcome for a single participant.
    pub fn outcome(&self, p: Participant) -> &ParticipantOutcome {
        &self.outcomes[p.index()]
    }

    /// All outcomes in [`Participant::ALL`] order.
    pub fn outcomes(&self) -> &[ParticipantOutcome; 3] {
        &self.outcomes
    }
}

/// Round-keyed table of settled rounds, iterated in ascending round order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    rounds: BTreeMap<u32, RoundRecord>,
}

impl Ledger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, fully replacing any record with the same round.
    /// Returns the replaced record.
    pub fn upsert(&mut self, record: RoundRecord) -> Option<RoundRecord> {
        self.rounds.insert(record.round(), record)
    }

    /// Record for a round, if present.
    pub fn get(&self, round: u32) -> Option<&RoundRecord> {
        self.rounds.get(&round)
    }

    /// All records sorted by round ascending.
    pub fn all(&self) -> Vec<&RoundRecord> {
        self.rounds.values().collect()
    }

    /// Iterate records sorted by round ascending.
    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> + '_ {
        self.rounds.values()
    }

    /// A participant's orders, sorted by round ascending.
    pub fn orders_of(&self, p: Participant) -> Vec<f64> {
        self.iter().map(|r| r.input().order(p)).collect()
    }

    /// Number of distinct rounds.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// True when no round has been submitted.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Remove every record.
    pub fn reset(&mut self) {
        self.rounds.clear();
    }
}
