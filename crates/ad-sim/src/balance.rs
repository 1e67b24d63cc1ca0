//! Cumulative mass balance over a run.

use ad_species::{Element, Measure, Registry};
use nalgebra::DVector;

use crate::reactor::Transport;

/// Quantities a run reports closure for.
pub const BALANCE_MEASURES: [Measure; 5] = [
    Measure::Cod,
    Measure::Element(Element::C),
    Measure::Element(Element::N),
    Measure::Element(Element::P),
    Measure::Element(Element::S),
];

/// Totals for one measure [kg].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureBalance {
    pub measure: Measure,
    pub initial: f64,
    pub inventory: f64,
    /// Cumulative mass fed
    pub inflow: f64,
    /// Cumulative mass leaving with effluent and biogas
    pub outflow: f64,
}

impl MeasureBalance {
    /// inventory − initial − (in − out); zero for a closed balance.
    pub fn gap(&self) -> f64 {
        self.inventory - self.initial - (self.inflow - self.outflow)
    }

    /// Gap relative to the largest term it is built from.
    pub fn relative_gap(&self) -> f64 {
        let scale = self
            .initial
            .abs()
            .max(self.inventory.abs())
            .max(self.inflow.abs())
            .max(self.outflow.abs());
        if scale > 0.0 { self.gap() / scale } else { 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MassBalance {
    pub measures: Vec<MeasureBalance>,
    /// Per-measure amount of each species' basis
    weights: Vec<DVector<f64>>,
}

impl MassBalance {
    /// Start a balance from the initial inventory [kg basis per species].
    pub fn new(registry: &Registry, inventory: &DVector<f64>) -> Self {
        let weights: Vec<DVector<f64>> = BALANCE_MEASURES
            .iter()
            .map(|&m| {
                DVector::from_iterator(registry.len(), registry.iter().map(|(_, sp)| sp.amount_of(m)))
            })
            .collect();
        let measures = BALANCE_MEASURES
            .iter()
            .zip(&weights)
            .map(|(&measure, w)| {
                let initial = w.dot(inventory);
                MeasureBalance {
                    measure,
                    initial,
                    inventory: initial,
                    inflow: 0.0,
                    outflow: 0.0,
                }
            })
            .collect();
        Self { measures, weights }
    }

    /// Add `dt` days of boundary flux.
    pub fn add_transport(&mut self, dt: f64, transport: &Transport) {
        for (b, w) in self.measures.iter_mut().zip(&self.weights) {
            b.inflow += dt * w.dot(&transport.inflow);
            b.outflow += dt * w.dot(&transport.outflow);
        }
    }

    pub fn set_inventory(&mut self, inventory: &DVector<f64>) {
        for (b, w) in self.measures.iter_mut().zip(&self.weights) {
            b.inventory = w.dot(inventory);
        }
    }

    pub fn get(&self, measure: Measure) -> Option<&MeasureBalance> {
        self.measures.iter().find(|b| b.measure == measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_of_closed_balance_is_zero() {
        let b = MeasureBalance {
            measure: Measure::Cod,
            initial: 10.0,
            inventory: 12.0,
            inflow: 5.0,
            outflow: 3.0,
        };
        assert_eq!(b.gap(), 0.0);
        assert_eq!(b.relative_gap(), 0.0);
    }

    #[test]
    fn relative_gap_scales_by_largest_term() {
        let b = MeasureBalance {
            measure: Measure::Element(Element::N),
            initial: 100.0,
            inventory: 99.0,
            inflow: 0.0,
            outflow: 0.0,
        };
        assert!((b.relative_gap() + 0.01).abs() < 1e-15);
    }
}
