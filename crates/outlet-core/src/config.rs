//! Engine configuration.

use crate::Role;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine-wide settings, loadable from YAML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the deterministic RNG handed to the P&L history and heatmap jitter.
    pub rng_seed: u64,
    /// Date treated as "today" for period labels. The engine never reads the clock.
    pub reference_date: Option<NaiveDate>,
    /// Monthly salary per role.
    pub salaries: SalaryTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            reference_date: None,
            salaries: SalaryTable::default(),
        }
    }
}

/// Monthly salary per catalogue role. Roles missing from a partial table
/// fall back to the standard rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalaryTable(BTreeMap<Role, Decimal>);

impl SalaryTable {
    /// Standard monthly rate for a role.
    pub fn standard(role: Role) -> Decimal {
        let amount = match role {
            Role::Waiter => 3500,
            Role::Runner => 3000,
            Role::Host => 4000,
            Role::Cashier => 3500,
            Role::Manager => 8000,
            Role::Chef => 10000,
            Role::SousChef => 7000,
            Role::LineCook => 4500,
            Role::PrepCook => 3500,
            Role::KitchenHelper => 3000,
            Role::Dishwasher => 2800,
        };
        Decimal::from(amount)
    }

    pub fn salary(&self, role: Role) -> Decimal {
        self.0
            .get(&role)
            .copied()
            .unwrap_or_else(|| SalaryTable::standard(role))
    }

    /// Override one role's rate.
    pub fn with(mut self, role: Role, salary: Decimal) -> Self {
        self.0.insert(role, salary);
        self
    }
}
