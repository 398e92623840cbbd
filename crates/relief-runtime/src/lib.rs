#![deny(warnings)]

//! Session runtime for the relief supply strategizer.
//!
//! A [`Session`] owns its ledger and runs every event through one synchronous
//! pipeline: mutate the ledger, recompute the forecast, recompute the advice,
//! then hand the resulting [`DashboardSnapshot`] to a [`Presenter`].

use relief_core::{ConfigError, Ledger, ModelConfig, RoundInput, RoundRecord};
use relief_econ::{Advice, EconError};
use relief_forecast::{Forecast, ForecastError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by a session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Econ(#[from] EconError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Events accepted from the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Settle a round, replacing any earlier submission for the same round.
    NewRound(RoundInput),
    /// Empty the ledger.
    Reset,
}

/// What can be said about the next round.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outlook {
    /// No rounds submitted yet.
    Empty,
    /// Too few rounds for a trend; no forecast yet.
    Insufficient { rounds: usize },
    /// Forecast and advice available.
    Ready { forecast: Forecast, advice: Advice },
}

/// Everything the presentation layer needs after an event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Model constants in effect.
    pub config: ModelConfig,
    /// Ledger rows sorted by round ascending.
    pub rounds: Vec<RoundRecord>,
    /// Forecast state.
    pub outlook: Outlook,
}

/// Rendering collaborator invoked after each event.
pub trait Presenter {
    fn present(&mut self, snapshot: &DashboardSnapshot) -> anyhow::Result<()>;
}

/// One player's session: model constants plus a private ledger.
#[derive(Debug)]
pub struct Session {
    config: ModelConfig,
    ledger: Ledger,
}

impl Session {
    /// Start a session with an empty ledger. Invalid constants are rejected here.
    pub fn new(config: ModelConfig) -> Result<Self, SessionError> {
        config.validate()?;
        info!(
            supplier_capacity = config.supplier_capacity,
            market_demand = config.market_demand,
            revenue_per_sale = %config.revenue_per_sale,
            cost_per_item = %config.cost_per_item,
            "session started"
        );
        Ok(Self {
            config,
            ledger: Ledger::new(),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Apply one event and recompute derived values.
    ///
    /// The event is applied to a candidate ledger and committed only when
    /// settlement, forecast and advice all succeed, so a failed event leaves
    /// the ledger unchanged.
    pub fn apply(&mut self, event: SessionEvent) -> Result<DashboardSnapshot, SessionError> {
        let mut candidate = self.ledger.clone();
        match event {
            SessionEvent::NewRound(input) => {
                let record = relief_econ::settle(&self.config, &input)?;
                let round = record.round();
                let replaced = candidate.upsert(record).is_some();
                debug!(round, replaced, rounds = candidate.len(), "round settled");
            }
            SessionEvent::Reset => candidate.reset(),
        }
        let snapshot = snapshot_of(&self.config, &candidate)?;
        if candidate.is_empty() && !self.ledger.is_empty() {
            info!("ledger reset");
        }
        self.ledger = candidate;
        Ok(snapshot)
    }

    /// Apply an event and pass the snapshot to `presenter`.
    ///
    /// Session errors come back as [`SessionError`] inside the `anyhow` error,
    /// so callers can tell them apart from presenter I/O failures.
    pub fn dispatch(
        &mut self,
        event: SessionEvent,
        presenter: &mut dyn Presenter,
    ) -> anyhow::Result<()> {
        let snapshot = self.apply(event)?;
        presenter.present(&snapshot)
    }

    /// Current snapshot without mutating the ledger.
    pub fn snapshot(&self) -> Result<DashboardSnapshot, SessionError> {
        snapshot_of(&self.config, &self.ledger)
    }
}

fn snapshot_of(config: &ModelConfig, ledger: &Ledger) -> Result<DashboardSnapshot, SessionError> {
    let outlook = match relief_forecast::forecast(ledger) {
        Ok(forecast) => {
            let advice = relief_econ::advise(config, forecast.c1, forecast.c2)?;
            Outlook::Ready { forecast, advice }
        }
        Err(ForecastError::Degenerate { rounds: 0 }) => Outlook::Empty,
        Err(ForecastError::Degenerate { rounds }) => Outlook::Insufficient { rounds },
        Err(e) => return Err(e.into()),
    };
    Ok(DashboardSnapshot {
        config: config.clone(),
        rounds: ledger.iter().cloned().collect(),
        outlook,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use relief_core::Participant;

    fn round(n: i64, my: f64, c1: f64, c2: f64) -> SessionEvent {
        SessionEvent::NewRound(RoundInput::new(n, my, c1, c2).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<DashboardSnapshot>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, snapshot: &DashboardSnapshot) -> anyhow::Result<()> {
            self.seen.push(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn degenerate_config_fails_at_startup() {
        let cfg = ModelConfig {
            supplier_capacity: 50.0,
            ..ModelConfig::default()
        };
        assert_eq!(
            Session::new(cfg).unwrap_err(),
            SessionError::Config(ConfigError::DegenerateAdvisory { capacity: 50.0 })
        );
    }

    #[test]
    fn outlook_progresses_with_rounds() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        assert_eq!(s.snapshot().unwrap().outlook, Outlook::Empty);

        let snap = s.apply(round(1, 50.0, 60.0, 30.0)).unwrap();
        assert_eq!(snap.rounds.len(), 1);
        assert_eq!(snap.outlook, Outlook::Insufficient { rounds: 1 });

        let snap = s.apply(round(2, 50.0, 60.0, 30.0)).unwrap();
        match snap.outlook {
            Outlook::Ready { forecast, advice } => {
                assert!((forecast.c1 - 60.0).abs() < 1e-9);
                assert!((forecast.c2 - 30.0).abs() < 1e-9);
                assert!((advice.suggested_order - 4500.0 / 70.0).abs() < 1e-9);
            }
            other => panic!("expected forecast, got {other:?}"),
        }
    }

    #[test]
    fn resubmission_overwrites_round() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        s.apply(round(1, 50.0, 60.0, 30.0)).unwrap();
        let snap = s.apply(round(1, 20.0, 20.0, 20.0)).unwrap();
        assert_eq!(snap.rounds.len(), 1);
        let rec = &snap.rounds[0];
        assert_eq!(rec.total_order(), 60.0);
        assert_eq!(rec.outcome(Participant::Me).allocated, 20.0);
    }

    #[test]
    fn resubmitting_identical_round_is_idempotent() {
        let mut once = Session::new(ModelConfig::default()).unwrap();
        let mut twice = Session::new(ModelConfig::default()).unwrap();
        once.apply(round(3, 40.0, 45.0, 50.0)).unwrap();
        twice.apply(round(3, 40.0, 45.0, 50.0)).unwrap();
        twice.apply(round(3, 40.0, 45.0, 50.0)).unwrap();
        assert_eq!(once.ledger(), twice.ledger());
    }

    #[test]
    fn reset_empties_ledger() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        s.apply(round(1, 1.0, 2.0, 3.0)).unwrap();
        s.apply(round(2, 1.0, 2.0, 3.0)).unwrap();
        let snap = s.apply(SessionEvent::Reset).unwrap();
        assert!(snap.rounds.is_empty());
        assert_eq!(snap.outlook, Outlook::Empty);
        assert!(s.ledger().is_empty());
    }

    #[test]
    fn failed_forecast_leaves_ledger_unchanged() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        s.apply(round(1, 0.0, 1e308, 0.0)).unwrap();
        // two huge competitor orders overflow the trend fit
        assert_eq!(
            s.apply(round(2, 0.0, 1e308, 0.0)).unwrap_err(),
            SessionError::Forecast(ForecastError::NonFinite)
        );
        assert_eq!(s.ledger().len(), 1);
        assert!(s.ledger().get(2).is_none());
        assert_eq!(s.snapshot().unwrap().outlook, Outlook::Insufficient { rounds: 1 });

        s.apply(round(1, 10.0, 10.0, 10.0)).unwrap();
        let snap = s.apply(round(2, 10.0, 10.0, 10.0)).unwrap();
        assert_eq!(snap.rounds.len(), 2);
        assert!(matches!(snap.outlook, Outlook::Ready { .. }));
    }

    #[test]
    fn dispatch_surfaces_session_error() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        let mut rec = Recorder::default();
        s.dispatch(round(1, 0.0, 1e308, 0.0), &mut rec).unwrap();
        let err = s.dispatch(round(2, 0.0, 1e308, 0.0), &mut rec).unwrap_err();
        assert!(err.downcast_ref::<SessionError>().is_some());
        assert_eq!(rec.seen.len(), 1);
    }

    #[test]
    fn sessions_do_not_share_ledgers() {
        let mut a = Session::new(ModelConfig::default()).unwrap();
        let b = Session::new(ModelConfig::default()).unwrap();
        a.apply(round(1, 1.0, 2.0, 3.0)).unwrap();
        assert_eq!(a.ledger().len(), 1);
        assert!(b.ledger().is_empty());
    }

    #[test]
    fn dispatch_hands_snapshot_to_presenter() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        let mut rec = Recorder::default();
        s.dispatch(round(1, 10.0, 10.0, 10.0), &mut rec).unwrap();
        s.dispatch(SessionEvent::Reset, &mut rec).unwrap();
        assert_eq!(rec.seen.len(), 2);
        assert_eq!(rec.seen[0].rounds.len(), 1);
        assert!(rec.seen[1].rounds.is_empty());
    }

    #[test]
    fn snapshot_serializes_outlook_state() {
        let mut s = Session::new(ModelConfig::default()).unwrap();
        let snap = s.apply(round(1, 10.0, 10.0, 10.0)).unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["outlook"]["state"], "insufficient");
        assert_eq!(json["outlook"]["rounds"], 1);
        assert_eq!(json["rounds"].as_array().unwrap().len(), 1);
    }

    proptest! {
        #[test]
        fn snapshot_rounds_are_sorted_and_unique(
            events in proptest::collection::vec((1i64..15, 0.0f64..150.0, 0.0f64..150.0, 0.0f64..150.0), 1..30)
        ) {
            let mut s = Session::new(ModelConfig::default()).unwrap();
            let mut last = None;
            for (n, a, b, c) in events {
                last = Some(s.apply(round(n, a, b, c)).unwrap());
            }
            let snap = last.unwrap();
            let keys: Vec<u32> = snap.rounds.iter().map(|r| r.round()).collect();
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(keys.len(), s.ledger().len());
            for r in &snap.rounds {
                let sum: f64 = r.outcomes().iter().map(|o| o.allocated).sum();
                prop_assert!(sum <= s.config().supplier_capacity + 1e-9);
            }
        }
    }
}
