use super::PricingResult;
use serde::Serialize;
use std::fmt;

/// One labelled block of the pricing summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub title: &'static str,
    pub rows: Vec<(&'static str, f64)>,
}

/// Label/value view of a `PricingResult`, grouped the way it is displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingReport {
    pub tables: Vec<ReportTable>,
}

impl PricingReport {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.tables
            .iter()
            .flat_map(|table| table.rows.iter())
            .find(|(name, _)| *name == label)
            .map(|(_, value)| *value)
    }

    pub fn table(&self, title: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|table| table.title == title)
    }
}

impl PricingResult {
    pub fn report(&self) -> PricingReport {
        let pair = |title, call: (&'static str, f64), put: (&'static str, f64)| ReportTable {
            title,
            rows: vec![call, put],
        };

        PricingReport {
            tables: vec![
                ReportTable {
                    title: "Prices",
                    rows: vec![
                        ("Annual Volatility", self.annual_vol),
                        ("Call Price", self.call_price),
                        ("Put Price", self.put_price),
                    ],
                },
                pair("Delta", ("Call Delta", self.call_delta), ("Put Delta", self.put_delta)),
                pair("Rho", ("Call Rho", self.call_rho), ("Put Rho", self.put_rho)),
                pair("Theta", ("Call Theta", self.call_theta), ("Put Theta", self.put_theta)),
                pair("Gamma", ("Call Gamma", self.call_gamma), ("Put Gamma", self.put_gamma)),
                pair("Vega", ("Call Vega", self.call_vega), ("Put Vega", self.put_vega)),
            ],
        }
    }
}

impl fmt::Display for PricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .tables
            .iter()
            .flat_map(|table| table.rows.iter())
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);

        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", table.title)?;
            for (label, value) in &table.rows {
                writeln!(f, "  {:<width$}  {:.6}", label, value, width = width)?;
            }
        }
        Ok(())
    }
}
