//! Terminal presenters: a transposed round table or one JSON document per event.

use relief_core::{ModelConfig, Participant, RoundRecord};
use relief_runtime::{DashboardSnapshot, Outlook, Presenter};
use rust_decimal::Decimal;
use std::io::Write;

fn qty(v: f64) -> String {
    format!("{v:.2}")
}

fn money(v: Decimal) -> String {
    v.round_dp(2).to_string()
}

fn row(label: String, rounds: &[RoundRecord], cell: impl Fn(&RoundRecord) -> String) -> (String, Vec<String>) {
    (label, rounds.iter().map(cell).collect())
}

/// Metric rows by round columns.
pub fn render_table(rounds: &[RoundRecord]) -> String {
    let mut rows = Vec::new();
    rows.push(row("Round".into(), rounds, |r| r.round().to_string()));
    for p in Participant::ALL {
        rows.push(row(format!("{p} ORDER"), rounds, |r| qty(r.input().order(p))));
    }
    rows.push(row("TOTAL ORDER".into(), rounds, |r| qty(r.total_order())));
    for p in Participant::ALL {
        rows.push(row(format!("{p} QTY"), rounds, |r| qty(r.outcome(p).allocated)));
    }
    for p in Participant::ALL {
        rows.push(row(format!("{p} SALES"), rounds, |r| qty(r.outcome(p).sales)));
        rows.push(row(format!("{p} REVENUE"), rounds, |r| money(r.outcome(p).revenue)));
        rows.push(row(format!("{p} COSTS"), rounds, |r| money(r.outcome(p).cost)));
        rows.push(row(format!("!!! {p} PROFIT"), rounds, |r| money(r.outcome(p).profit)));
    }

    let label_w = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let cell_w = rows
        .iter()
        .flat_map(|(_, cells)| cells.iter().map(String::len))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (label, cells) in &rows {
        out.push_str(&format!("{label:<label_w$}"));
        for c in cells {
            out.push_str(&format!(" | {c:>cell_w$}"));
        }
        out.push('\n');
    }
    out
}

/// Forecast and suggestion lines.
pub fn render_outlook(outlook: &Outlook) -> String {
    match outlook {
        Outlook::Empty => "No data available. Please input data for at least one round.".into(),
        Outlook::Insufficient { rounds } => format!(
            "Forecast needs at least two rounds (have {rounds}); no suggestion yet."
        ),
        Outlook::Ready { forecast, advice } => {
            let mut text = String::new();
            for p in Participant::COMPETITORS {
                if let Some(q) = forecast.predicted(p) {
                    text.push_str(&format!("Predicted order {p}: {q:.2} units | "));
                }
            }
            text.push_str(&format!(
                "Suggested order: {:.2} units ({:+.2} units adjustment)",
                advice.suggested_order, advice.adjustment
            ));
            text
        }
    }
}

/// Per-participant cards for one round. The delta is supplied minus requested.
pub fn render_cards(record: &RoundRecord) -> String {
    let mut out = format!("Round {}\n", record.round());
    for p in Participant::ALL {
        let o = record.outcome(p);
        let verdict = if o.profit > Decimal::ZERO { "gain" } else { "loss" };
        out.push_str(&format!(
            "  {p:<2} requested {} | supplied {} ({:+.2}) | sales {} | revenue ${} | costs ${} | profit ${} ({verdict})\n",
            qty(o.order),
            qty(o.allocated),
            o.supply_delta(),
            qty(o.sales),
            money(o.revenue),
            money(o.cost),
            money(o.profit),
        ));
    }
    out
}

/// Assumptions shown once at startup.
pub fn assumptions_banner(config: &ModelConfig) -> String {
    format!(
        "Assumptions: market demand per participant {}, maximum supply capacity {}, cost per item {}, revenue per sale {}",
        config.market_demand, config.supplier_capacity, config.cost_per_item, config.revenue_per_sale
    )
}

/// Human-readable presenter.
pub struct TablePresenter<W: Write> {
    out: W,
}

impl<W: Write> TablePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for TablePresenter<W> {
    fn present(&mut self, snapshot: &DashboardSnapshot) -> anyhow::Result<()> {
        writeln!(self.out, "{}", render_outlook(&snapshot.outlook))?;
        if !snapshot.rounds.is_empty() {
            write!(self.out, "{}", render_table(&snapshot.rounds))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Machine-readable presenter: one JSON object per line.
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, snapshot: &DashboardSnapshot) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
