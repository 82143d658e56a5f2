//! Coin balance, lifetime earnings, and passive income.
//!
//! Negative or non-finite amounts are rejected by both `add_coins` and
//! `spend_coins`, so the balance and the lifetime counter can only move in
//! their intended directions.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Share of raw building income credited on each passive collection.
pub const DEFAULT_PASSIVE_INCOME_MODIFIER: f64 = 0.85;

/// Anything that yields coins per income tick.
pub trait IncomeSource {
    fn income(&self) -> f64;
}

/// Externally owned, mutable entities stay trackable.
impl<T: IncomeSource + ?Sized> IncomeSource for Rc<RefCell<T>> {
    fn income(&self) -> f64 {
        self.borrow().income()
    }
}

/// Adapts a closure into an [`IncomeSource`].
pub struct IncomeFn<F>(pub F);

impl<F: Fn() -> f64> IncomeSource for IncomeFn<F> {
    fn income(&self) -> f64 {
        (self.0)()
    }
}

/// Persisted balance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomySnapshot {
    #[serde(default)]
    pub coins: f64,
    #[serde(default)]
    pub total_earned: f64,
}

pub struct EconomyLedger {
    coins: f64,
    total_earned: f64,
    sources: Vec<Box<dyn IncomeSource>>,
    passive_income_modifier: f64,
}

impl EconomyLedger {
    pub fn new(initial_coins: f64, passive_income_modifier: f64) -> Self {
        Self {
            coins: initial_coins.max(0.0),
            total_earned: 0.0,
            sources: Vec::new(),
            passive_income_modifier: passive_income_modifier.clamp(0.0, 1.0),
        }
    }

    pub fn coins(&self) -> f64 {
        self.coins
    }

    pub fn total_earned(&self) -> f64 {
        self.total_earned
    }

    pub fn passive_income_modifier(&self) -> f64 {
        self.passive_income_modifier
    }

    pub fn set_coins(&mut self, amount: f64) {
        self.coins = amount.max(0.0);
    }

    pub fn set_total_earned(&mut self, amount: f64) {
        self.total_earned = amount.max(0.0);
    }

    /// Credit `amount` to the balance and the lifetime counter.
    pub fn add_coins(&mut self, amount: f64) {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "rejected coin credit");
            return;
        }
        self.coins += amount;
        self.total_earned += amount;
    }

    /// Debit `amount` if the balance covers it. Returns false (and leaves the
    /// balance alone) otherwise.
    pub fn spend_coins(&mut self, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "rejected coin debit");
            return false;
        }
        if self.coins >= amount {
            self.coins -= amount;
            true
        } else {
            false
        }
    }

    /// Track another income source. No dedup.
    pub fn register_income_source(&mut self, source: Box<dyn IncomeSource>) {
        self.sources.push(source);
    }

    pub fn income_source_count(&self) -> usize {
        self.sources.len()
    }

    /// Raw income of all tracked sources.
    pub fn calculate_income(&self) -> f64 {
        self.sources.iter().map(|s| s.income()).sum()
    }

    /// Credit `floor(income * modifier)` and return it.
    pub fn collect_passive_income(&mut self) -> f64 {
        self.collect_passive_income_with(1.0)
    }

    /// Like [`collect_passive_income`](Self::collect_passive_income) with the
    /// raw income scaled by `multiplier` first (buffs, research).
    pub fn collect_passive_income_with(&mut self, multiplier: f64) -> f64 {
        let collected = (self.calculate_income() * multiplier * self.passive_income_modifier)
            .floor()
            .max(0.0);
        self.add_coins(collected);
        collected
    }

    pub fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            coins: self.coins,
            total_earned: self.total_earned,
        }
    }

    pub fn restore(&mut self, data: &EconomySnapshot) {
        self.set_coins(data.coins);
        self.set_total_earned(data.total_earned);
    }
}

impl Default for EconomyLedger {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_PASSIVE_INCOME_MODIFIER)
    }
}
