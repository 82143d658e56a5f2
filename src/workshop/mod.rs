//! Reference game-state container.
//!
//! Owns the three ledgers side by side and does the composing they never do
//! themselves: buff and research multipliers are read here and fed into the
//! economy's income collection.

pub mod save;
mod simulator;

use std::rc::Rc;

use tracing::{debug, info};

use crate::clock::{Clock, TimerQueue};
use crate::config::WorkshopConfig;
use crate::layout::{self, BuildingSpot, TreeSpot};
use crate::ledgers::buff::{BuffCategory, BuffLedger};
use crate::ledgers::economy::EconomyLedger;
use crate::ledgers::research::ResearchLedger;
use crate::time::GameTime;

pub struct Workshop {
    pub economy: EconomyLedger,
    pub research: ResearchLedger,
    pub buffs: BuffLedger,
    pub building_spots: Vec<BuildingSpot>,
    pub tree_spots: Vec<TreeSpot>,
    time: GameTime,
    timers: TimerQueue,
    clock: Rc<dyn Clock>,
    income_interval_ticks: u32,
    ticks_since_income: u32,
}

impl Workshop {
    pub fn new(config: &WorkshopConfig, clock: Rc<dyn Clock>) -> Self {
        let timers = TimerQueue::new(clock.clone());
        Self {
            economy: EconomyLedger::new(config.initial_coins, config.passive_income_modifier),
            research: ResearchLedger::new(&config.research_catalog()),
            buffs: BuffLedger::new(
                config.buff_catalog(),
                clock.clone(),
                Box::new(timers.clone()),
            ),
            building_spots: layout::initial_building_spots(),
            tree_spots: layout::initial_tree_spots(),
            time: GameTime::new(config.ticks_per_sec, config.max_frame_ms),
            timers,
            clock,
            income_interval_ticks: config.income_interval_ticks.max(1),
            ticks_since_income: 0,
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.time.total_ticks
    }

    /// Combined multiplier applied to passive income.
    pub fn income_multiplier(&self) -> f64 {
        self.buffs.multiplier(BuffCategory::ProductionBoost)
            * self.research.production_speed_multiplier()
            * self.research.building_efficiency_multiplier()
            * self.research.holiday_synergy_multiplier()
    }

    /// Advance to the clock's current time. Delivers due buff timers, sweeps
    /// expired buffs, and collects passive income once per income interval.
    /// Returns the coins collected.
    pub fn tick(&mut self) -> f64 {
        let now = self.clock.now_ms();
        let ticks = self.time.update(now);
        if ticks == 0 {
            return 0.0;
        }

        for task in self.timers.take_due(now) {
            self.buffs.fire(&task);
        }
        self.buffs.sweep();

        self.ticks_since_income += ticks;
        let mut collected = 0.0;
        if self.ticks_since_income >= self.income_interval_ticks {
            let multiplier = self.income_multiplier();
            while self.ticks_since_income >= self.income_interval_ticks {
                self.ticks_since_income -= self.income_interval_ticks;
                collected += self.economy.collect_passive_income_with(multiplier);
            }
            debug!(collected, multiplier, coins = self.economy.coins(), "passive income");
        }
        collected
    }

    pub fn consume_cookie(&mut self, key: &str) -> bool {
        self.buffs.consume_template(key)
    }

    /// Pay the current price of `id` and raise it one level.
    pub fn purchase_research(&mut self, id: &str) -> bool {
        let cost = match self.research.upgrade(id) {
            Some(u) if !u.is_maxed() => u.cost,
            _ => return false,
        };
        if !self.economy.spend_coins(cost as f64) {
            return false;
        }
        self.research.unlock_level(id)
    }

    /// Buy the next tree plot in unlock order. Returns its id.
    pub fn plant_next_tree(&mut self) -> Option<&'static str> {
        let next = layout::next_unplanted_tree(&self.tree_spots).copied()?;
        if !self.economy.spend_coins(next.cost as f64) {
            return None;
        }
        if let Some(spot) = self.tree_spots.iter_mut().find(|s| s.id == next.id) {
            spot.planted = true;
        }
        info!(id = next.id, cost = next.cost, "tree planted");
        Some(next.id)
    }

    /// Mark plot `id` repaired. False if unknown or already repaired.
    pub fn repair_building(&mut self, id: &str) -> bool {
        match self
            .building_spots
            .iter_mut()
            .find(|s| s.id == id && !s.repaired)
        {
            Some(spot) => {
                spot.repaired = true;
                info!(id, kind = spot.kind.name(), "building repaired");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledgers::economy::IncomeFn;

    fn workshop(config: WorkshopConfig) -> (Workshop, ManualClock) {
        let clock = ManualClock::new(0.0);
        let mut w = Workshop::new(&config, Rc::new(clock.clone()));
        w.tick(); // first frame establishes the timestamp
        (w, clock)
    }

    fn flat_config() -> WorkshopConfig {
        WorkshopConfig {
            passive_income_modifier: 1.0,
            ..WorkshopConfig::default()
        }
    }

    fn run_seconds(w: &mut Workshop, clock: &ManualClock, seconds: u32) -> f64 {
        let mut total = 0.0;
        for _ in 0..seconds * 10 {
            clock.advance(100.0);
            total += w.tick();
        }
        total
    }

    #[test]
    fn income_collected_once_per_second() {
        let (mut w, clock) = workshop(flat_config());
        w.economy.register_income_source(Box::new(IncomeFn(|| 10.0)));
        assert_eq!(run_seconds(&mut w, &clock, 3), 30.0);
        assert_eq!(w.economy.coins(), 30.0);
        assert_eq!(w.total_ticks(), 30);
    }

    #[test]
    fn production_buff_scales_income_until_expiry() {
        let (mut w, clock) = workshop(flat_config());
        w.economy.register_income_source(Box::new(IncomeFn(|| 10.0)));
        assert!(w.consume_cookie("gingerbread")); // 2x for 45s
        assert_eq!(run_seconds(&mut w, &clock, 1), 20.0);
        run_seconds(&mut w, &clock, 44);
        assert!(!w.buffs.has_category(BuffCategory::ProductionBoost));
        assert_eq!(run_seconds(&mut w, &clock, 1), 10.0);
    }

    #[test]
    fn research_multipliers_feed_income() {
        let (mut w, clock) = workshop(flat_config());
        w.economy.register_income_source(Box::new(IncomeFn(|| 100.0)));
        for _ in 0..2 {
            w.research.unlock_level("prod_speed_1"); // +10%
        }
        w.research.unlock_level("building_efficiency_1"); // +4%
        let expected = (100.0_f64 * 1.1 * 1.04).floor();
        assert_eq!(run_seconds(&mut w, &clock, 1), expected);
    }

    #[test]
    fn purchase_research_spends_current_cost() {
        let (mut w, _) = workshop(flat_config());
        assert!(!w.purchase_research("prod_speed_1"));
        w.economy.add_coins(250.0);
        assert!(w.purchase_research("prod_speed_1")); // 100
        assert!(w.purchase_research("prod_speed_1")); // 150
        assert_eq!(w.economy.coins(), 0.0);
        assert!(!w.purchase_research("prod_speed_1")); // 225 unaffordable
        assert_eq!(w.research.upgrade("prod_speed_1").map(|u| u.current_level), Some(2));
    }

    #[test]
    fn purchase_research_rejects_unknown_and_maxed_without_charging() {
        let (mut w, _) = workshop(flat_config());
        w.economy.add_coins(100_000.0);
        assert!(!w.purchase_research("nope"));
        for _ in 0..3 {
            assert!(w.purchase_research("magnet_perk_1"));
        }
        let before = w.economy.coins();
        assert!(!w.purchase_research("magnet_perk_1"));
        assert_eq!(w.economy.coins(), before);
    }

    #[test]
    fn plant_trees_in_order() {
        let (mut w, _) = workshop(flat_config());
        assert_eq!(w.plant_next_tree(), None);
        w.economy.add_coins(400.0);
        assert_eq!(w.plant_next_tree(), Some("tree_2"));
        assert_eq!(w.plant_next_tree(), Some("tree_3"));
        assert!((w.economy.coins() - 70.0).abs() < 1e-9);
        assert_eq!(w.plant_next_tree(), None);
        assert_eq!(layout::planted_tree_count(&w.tree_spots), 3);
    }

    #[test]
    fn repair_building_once() {
        let (mut w, _) = workshop(flat_config());
        assert!(w.repair_building("toy_1"));
        assert!(!w.repair_building("toy_1"));
        assert!(!w.repair_building("north_pole"));
        assert_eq!(
            layout::next_unrepaired_building(&w.building_spots).map(|s| s.id),
            Some("toy_2")
        );
    }

    #[test]
    fn custom_interval_batches_income() {
        let config = WorkshopConfig {
            income_interval_ticks: 50,
            ..flat_config()
        };
        let (mut w, clock) = workshop(config);
        w.economy.register_income_source(Box::new(IncomeFn(|| 7.0)));
        assert_eq!(run_seconds(&mut w, &clock, 4), 0.0);
        assert_eq!(run_seconds(&mut w, &clock, 1), 7.0);
    }
}
