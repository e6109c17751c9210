//! DepositPredicate - caller-supplied per-entry filter
//!
//! Evaluated once per candidate deposit during conversion; must be free of
//! side effects and safe to call any number of times, including zero.

use std::fmt;

use crate::EnergyDeposit;

/// Named boolean filter over one energy deposit
pub struct DepositPredicate {
    name: String,
    filter: Box<dyn Fn(&EnergyDeposit) -> bool + Send + Sync>,
}

impl DepositPredicate {
    /// Create a predicate from a name and a filter function
    pub fn new(
        name: impl Into<String>,
        filter: impl Fn(&EnergyDeposit) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            filter: Box::new(filter),
        }
    }

    /// Predicate that accepts every deposit
    pub fn accept_all() -> Self {
        Self::new("accept_all", |_| true)
    }

    /// Predicate accepting deposits at or above an energy threshold (GeV)
    pub fn min_energy(threshold: f64) -> Self {
        Self::new(format!("min_energy({threshold})"), move |depo| {
            depo.energy >= threshold
        })
    }

    /// Predicate name (used for logging)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate on one deposit
    pub fn accepts(&self, deposit: &EnergyDeposit) -> bool {
        (self.filter)(deposit)
    }
}

impl fmt::Debug for DepositPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositPredicate")
            .field("name", &self.name)
            .finish()
    }
}
