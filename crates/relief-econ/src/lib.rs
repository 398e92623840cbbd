#![deny(warnings)]

//! Round economics for the relief supply game.
//!
//! This module provides:
//! - Proportional rationing of the shared supplier capacity
//! - Per-participant sales, revenue, cost and profit for a round
//! - The closed-form suggested order derived from competitor forecasts

use relief_core::{
    ConfigError, ModelConfig, Participant, ParticipantOutcome, RoundInput, RoundRecord,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors produced by settlement and advisory helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Quantity could not be represented as money.
    #[error("non-finite numeric conversion")]
    NonFinite,
    /// Money arithmetic left the representable range.
    #[error("monetary overflow")]
    Overflow,
    /// Model constants make the computation undefined.
    #[error("invalid model configuration: {0}")]
    Configuration(#[from] ConfigError),
}

/// Convert a quantity-derived value to money.
///
/// Example:
/// assert_eq!(to_money(2.5).unwrap(), Decimal::new(25, 1));
pub fn to_money(value: f64) -> Result<Decimal, EconError> {
    if !value.is_finite() {
        return Err(EconError::NonFinite);
    }
    Decimal::from_f64(value).ok_or(EconError::NonFinite)
}

/// Split supplier capacity across the three orders.
///
/// When the total exceeds capacity every order is scaled by
/// `capacity / total`; otherwise each participant receives its order.
/// A zero total never takes the rationing branch.
///
/// Example:
/// assert_eq!(allocate(120.0, [20.0, 20.0, 20.0]), [20.0, 20.0, 20.0]);
pub fn allocate(capacity: f64, orders: [f64; 3]) -> [f64; 3] {
    let total: f64 = orders.iter().sum();
    if total > capacity {
        let scale = capacity / total;
        orders.map(|o| o * scale)
    } else {
        orders
    }
}

/// Sales, revenue, cost and profit for one participant.
pub fn participant_outcome(
    config: &ModelConfig,
    order: f64,
    allocated: f64,
) -> Result<ParticipantOutcome, EconError> {
    let sales = allocated.min(config.market_demand);
    let revenue = to_money(sales)?
        .checked_mul(config.revenue_per_sale)
        .ok_or(EconError::Overflow)?;
    let cost = to_money(allocated)?
        .checked_mul(config.cost_per_item)
        .ok_or(EconError::Overflow)?;
    let profit = revenue.checked_sub(cost).ok_or(EconError::Overflow)?;
    Ok(ParticipantOutcome {
        order,
        allocated,
        sales,
        revenue,
        cost,
        profit,
    })
}

/// Settle a validated round submission into a ledger record.
pub fn settle(config: &ModelConfig, input: &RoundInput) -> Result<RoundRecord, EconError> {
    let orders = input.orders();
    let allocated = allocate(config.supplier_capacity, orders);
    let [me, c1, c2] = Participant::ALL
        .map(|p| participant_outcome(config, orders[p.index()], allocated[p.index()]));
    let record = RoundRecord::new(input.clone(), [me?, c1?, c2?]);
    debug!(
        round = record.round(),
        total = record.total_order(),
        rationed = record.total_order() > config.supplier_capacity,
        "settled round"
    );
    Ok(record)
}

/// Order quantity that, together with both competitor forecasts, saturates
/// the scarcity boundary used in rationing.
///
/// `-market_demand * (c1 + c2) / (market_demand - supplier_capacity)`.
/// Forecasts are used as given, including negative values.
///
/// Example:
/// let q = suggest_order(&ModelConfig::default(), 60.0, 30.0).unwrap();
/// assert!((q - 64.2857).abs() < 1e-3);
pub fn suggest_order(
    config: &ModelConfig,
    predicted_c1: f64,
    predicted_c2: f64,
) -> Result<f64, EconError> {
    let gap = config.scarcity_gap();
    if gap == 0.0 {
        return Err(ConfigError::DegenerateAdvisory {
            capacity: config.supplier_capacity,
        }
        .into());
    }
    let q = -config.market_demand * (predicted_c1 + predicted_c2) / gap;
    if !q.is_finite() {
        return Err(EconError::NonFinite);
    }
    Ok(q)
}

/// Suggested order plus its distance from the per-participant market demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Unclamped, unrounded suggestion.
    pub suggested_order: f64,
    /// `suggested_order - market_demand`.
    pub adjustment: f64,
}

/// Build the advisory shown next to the forecasts.
pub fn advise(
    config: &ModelConfig,
    predicted_c1: f64,
    predicted_c2: f64,
) -> Result<Advice, EconError> {
    let suggested_order = suggest_order(config, predicted_c1, predicted_c2)?;
    Ok(Advice {
        suggested_order,
        adjustment: suggested_order - config.market_demand,
    })
}
