#![deny(warnings)]

//! Competitor order forecasting.
//!
//! Each competitor gets an independent ordinary-least-squares line of order
//! quantity against round position (0-based index in ascending round order,
//! not the literal round number), evaluated one position past the last round.

use relief_core::{Ledger, Participant};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors produced while fitting trends.
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    /// A line needs at least two points.
    #[error("need at least two rounds to forecast, have {rounds}")]
    Degenerate { rounds: usize },
    /// Inputs were too large for a finite fit.
    #[error("non-finite trend fit")]
    NonFinite,
}

/// Fitted line `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Evaluate the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a least-squares line through `(i, ys[i])`.
pub fn fit_trend(ys: &[f64]) -> Result<LinearTrend, ForecastError> {
    let n = ys.len();
    if n < 2 {
        return Err(ForecastError::Degenerate { rounds: n });
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / nf;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    // sxx > 0 for n >= 2 distinct positions
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(ForecastError::NonFinite);
    }
    Ok(LinearTrend { slope, intercept })
}

/// One-round-ahead predictions for both competitors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Predicted Competitor 1 order; may be negative or fractional.
    pub c1: f64,
    /// Predicted Competitor 2 order; may be negative or fractional.
    pub c2: f64,
    /// Position the predictions were evaluated at.
    pub next_index: usize,
    /// Fitted lines, Competitor 1 then Competitor 2.
    pub trends: [LinearTrend; 2],
}

impl Forecast {
    /// Prediction for a competitor; `None` for [`Participant::Me`].
    pub fn predicted(&self, p: Participant) -> Option<f64> {
        match p {
            Participant::Me => None,
            Participant::Competitor1 => Some(self.c1),
            Participant::Competitor2 => Some(self.c2),
        }
    }
}

/// Forecast both competitors' next orders from the ledger history.
pub fn forecast(ledger: &Ledger) -> Result<Forecast, ForecastError> {
    let rounds = ledger.len();
    if rounds < 2 {
        return Err(ForecastError::Degenerate { rounds });
    }
    let next_index = rounds;
    let [t1, t2] = Participant::COMPETITORS.map(|p| fit_trend(&ledger.orders_of(p)));
    let trends = [t1?, t2?];
    let x = next_index as f64;
    let c1 = trends[0].predict(x);
    let c2 = trends[1].predict(x);
    if !(c1.is_finite() && c2.is_finite()) {
        return Err(ForecastError::NonFinite);
    }
    debug!(rounds, c1, c2, "forecast competitor orders");
    Ok(Forecast {
        c1,
        c2,
        next_index,
        trends,
    })
}
