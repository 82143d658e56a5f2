//! Research tree: a fixed catalog of upgrades, each levelled independently.
//!
//! Levels within one [`ResearchType`] stack additively; the per-type sums are
//! then folded into the multipliers the rest of the game consumes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Floor on the upgrade cost multiplier.
pub const MIN_UPGRADE_COST_MULTIPLIER: f64 = 0.25;
/// Floor on the tree cooldown multiplier (recovery at most 2.5x faster).
pub const MIN_TREE_COOLDOWN_MULTIPLIER: f64 = 0.4;

/// Multiplier domain an upgrade contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchType {
    ProductionSpeed,
    UpgradeCost,
    CoinValue,
    BuildingEfficiency,
    TreeGiftValue,
    TreeRecoverySpeed,
    TreePresentBurst,
    FestiveSpirit,
    PlayerSpeed,
    MagneticPull,
}

/// Grouping shown in the research menu. Not used in any multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchCategory {
    Tree,
    Building,
    Universal,
}

/// Whether the UI should present the effect as a gain or a reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDisplay {
    Increase,
    Decrease,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResearchUpgrade {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResearchType,
    pub category: ResearchCategory,
    pub name: String,
    pub description: String,
    /// Price of the next level.
    pub cost: u64,
    pub max_level: u32,
    #[serde(default)]
    pub current_level: u32,
    pub effect_per_level: f64,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_display: Option<EffectDisplay>,
}

impl ResearchUpgrade {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: &str,
        kind: ResearchType,
        category: ResearchCategory,
        name: &str,
        description: &str,
        cost: u64,
        max_level: u32,
        effect_per_level: f64,
        icon: &str,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            category,
            name: name.into(),
            description: description.into(),
            cost,
            max_level,
            current_level: 0,
            effect_per_level,
            icon: icon.into(),
            effect_display: None,
        }
    }

    fn shown_as(mut self, display: EffectDisplay) -> Self {
        self.effect_display = Some(display);
        self
    }

    pub fn is_maxed(&self) -> bool {
        self.current_level >= self.max_level
    }

    /// This upgrade's contribution to its type's sum.
    pub fn total_effect(&self) -> f64 {
        self.current_level as f64 * self.effect_per_level
    }
}

/// Immutable research table a ledger is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchCatalog {
    upgrades: Vec<ResearchUpgrade>,
}

impl ResearchCatalog {
    pub fn new(upgrades: Vec<ResearchUpgrade>) -> Self {
        Self { upgrades }
    }

    /// The eleven reference upgrades.
    pub fn standard() -> Self {
        use ResearchCategory::{Building, Tree, Universal};
        use ResearchType::*;
        Self::new(vec![
            ResearchUpgrade::new(
                "tree_coin_value_1",
                TreeGiftValue,
                Tree,
                "Gilded Ornaments",
                "Increase tree coin value by 25%",
                80,
                5,
                0.25,
                "🎁",
            ),
            ResearchUpgrade::new(
                "tree_cooldown_1",
                TreeRecoverySpeed,
                Tree,
                "Cocoa Breaks",
                "Trees recover 10% faster between shakes",
                120,
                5,
                0.1,
                "☕",
            ),
            ResearchUpgrade::new(
                "tree_present_burst_1",
                TreePresentBurst,
                Tree,
                "Present Burst",
                "Trees drop 15% more coins per shake",
                160,
                5,
                0.15,
                "🎄",
            ),
            ResearchUpgrade::new(
                "prod_speed_1",
                ProductionSpeed,
                Building,
                "Faster Production",
                "Increase all building production speed by 5%",
                100,
                10,
                0.05,
                "⚡",
            ),
            ResearchUpgrade::new(
                "upgrade_cost_1",
                UpgradeCost,
                Building,
                "Cheaper Upgrades",
                "Reduce all building upgrade costs by 3%",
                150,
                10,
                0.03,
                "💰",
            )
            .shown_as(EffectDisplay::Decrease),
            ResearchUpgrade::new(
                "building_efficiency_1",
                BuildingEfficiency,
                Building,
                "Efficient Buildings",
                "All buildings produce 4% more income",
                250,
                10,
                0.04,
                "🏭",
            ),
            ResearchUpgrade::new(
                "precision_tools_1",
                BuildingEfficiency,
                Building,
                "Precision Tools",
                "Workshops gain an extra 2% efficiency",
                320,
                5,
                0.02,
                "🛠️",
            ),
            ResearchUpgrade::new(
                "coin_value_1",
                CoinValue,
                Universal,
                "Valuable Coins",
                "Increase coin value from all sources by 2%",
                200,
                10,
                0.02,
                "🪙",
            ),
            ResearchUpgrade::new(
                "festive_synergy_1",
                FestiveSpirit,
                Universal,
                "Festive Synergy",
                "Trees and buildings earn 2% more together",
                220,
                10,
                0.02,
                "✨",
            ),
            ResearchUpgrade::new(
                "magnet_perk_1",
                MagneticPull,
                Universal,
                "Polar Magnetism",
                "Coins gravitate toward you automatically",
                400,
                3,
                0.25,
                "🧲",
            ),
            ResearchUpgrade::new(
                "speed_perk_1",
                PlayerSpeed,
                Universal,
                "Reindeer Boots",
                "Increase movement speed by 10% per level",
                250,
                5,
                0.1,
                "👟",
            ),
        ])
    }

    pub fn entries(&self) -> &[ResearchUpgrade] {
        &self.upgrades
    }
}

impl Default for ResearchCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Multipliers applied to tree shaking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeResearchEffects {
    pub coin_value_multiplier: f64,
    pub cooldown_multiplier: f64,
    pub coin_batch_multiplier: f64,
}

/// Persisted level and price of one upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeSave {
    pub id: String,
    pub current_level: u32,
    pub cost: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchSnapshot {
    #[serde(default)]
    pub upgrades: Vec<UpgradeSave>,
}

/// Live research state: the catalog's entries plus their levels and costs.
#[derive(Clone, Debug)]
pub struct ResearchLedger {
    upgrades: Vec<ResearchUpgrade>,
    index: HashMap<String, usize>,
}

impl ResearchLedger {
    /// Copy `catalog` into a fresh ledger. Later duplicates of an id are dropped.
    pub fn new(catalog: &ResearchCatalog) -> Self {
        let mut upgrades = Vec::with_capacity(catalog.entries().len());
        let mut index = HashMap::new();
        for entry in catalog.entries() {
            if index.contains_key(&entry.id) {
                warn!(id = %entry.id, "duplicate research id in catalog ignored");
                continue;
            }
            index.insert(entry.id.clone(), upgrades.len());
            upgrades.push(entry.clone());
        }
        Self { upgrades, index }
    }

    pub fn upgrade(&self, id: &str) -> Option<&ResearchUpgrade> {
        self.index.get(id).map(|&i| &self.upgrades[i])
    }

    /// All upgrades in catalog order.
    pub fn all(&self) -> &[ResearchUpgrade] {
        &self.upgrades
    }

    pub fn by_category(&self, category: ResearchCategory) -> Vec<&ResearchUpgrade> {
        self.upgrades
            .iter()
            .filter(|u| u.category == category)
            .collect()
    }

    pub fn is_maxed(&self, id: &str) -> bool {
        self.upgrade(id).is_some_and(ResearchUpgrade::is_maxed)
    }

    /// Raise `id` one level and grow its price by half (floored).
    /// Returns false for unknown or maxed upgrades.
    pub fn unlock_level(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let upgrade = &mut self.upgrades[i];
        if upgrade.is_maxed() {
            return false;
        }
        upgrade.current_level += 1;
        upgrade.cost = upgrade.cost.saturating_mul(3) / 2;
        info!(
            id,
            level = upgrade.current_level,
            max_level = upgrade.max_level,
            next_cost = upgrade.cost,
            "research level unlocked"
        );
        true
    }

    /// Sum of `level * effect_per_level` over every upgrade of `kind`.
    pub fn total_effect(&self, kind: ResearchType) -> f64 {
        self.upgrades
            .iter()
            .filter(|u| u.kind == kind)
            .map(ResearchUpgrade::total_effect)
            .sum()
    }

    pub fn production_speed_multiplier(&self) -> f64 {
        1.0 + self.total_effect(ResearchType::ProductionSpeed)
    }

    pub fn upgrade_cost_multiplier(&self) -> f64 {
        (1.0 - self.total_effect(ResearchType::UpgradeCost)).max(MIN_UPGRADE_COST_MULTIPLIER)
    }

    pub fn coin_value_multiplier(&self) -> f64 {
        1.0 + self.total_effect(ResearchType::CoinValue)
    }

    pub fn building_efficiency_multiplier(&self) -> f64 {
        1.0 + self.total_effect(ResearchType::BuildingEfficiency)
    }

    pub fn holiday_synergy_multiplier(&self) -> f64 {
        1.0 + self.total_effect(ResearchType::FestiveSpirit)
    }

    pub fn player_speed_multiplier(&self) -> f64 {
        1.0 + self.total_effect(ResearchType::PlayerSpeed)
    }

    /// Level of the magnetic-pull upgrade, 0 if the catalog has none.
    pub fn magnet_research_level(&self) -> u32 {
        self.upgrades
            .iter()
            .find(|u| u.kind == ResearchType::MagneticPull)
            .map_or(0, |u| u.current_level)
    }

    pub fn has_permanent_magnet(&self) -> bool {
        self.magnet_research_level() > 0
    }

    /// Tree gift value, universal coin value, and festive synergy compound
    /// multiplicatively; recovery speed has diminishing returns.
    pub fn tree_research_effects(&self) -> TreeResearchEffects {
        let gift_bonus = self.total_effect(ResearchType::TreeGiftValue);
        let recovery_bonus = self.total_effect(ResearchType::TreeRecoverySpeed);
        let burst_bonus = self.total_effect(ResearchType::TreePresentBurst);

        TreeResearchEffects {
            coin_value_multiplier: (1.0 + gift_bonus)
                * self.coin_value_multiplier()
                * self.holiday_synergy_multiplier(),
            cooldown_multiplier: (1.0 / (1.0 + recovery_bonus)).max(MIN_TREE_COOLDOWN_MULTIPLIER),
            coin_batch_multiplier: 1.0 + burst_bonus,
        }
    }

    pub fn snapshot(&self) -> ResearchSnapshot {
        ResearchSnapshot {
            upgrades: self
                .upgrades
                .iter()
                .map(|u| UpgradeSave {
                    id: u.id.clone(),
                    current_level: u.current_level,
                    cost: u.cost,
                })
                .collect(),
        }
    }

    /// Overwrite level and cost of every saved id the catalog knows.
    pub fn restore(&mut self, data: &ResearchSnapshot) {
        for saved in &data.upgrades {
            match self.index.get(&saved.id) {
                Some(&i) => {
                    let upgrade = &mut self.upgrades[i];
                    upgrade.current_level = saved.current_level;
                    upgrade.cost = saved.cost;
                }
                None => warn!(id = %saved.id, "saved research id not in catalog"),
            }
        }
    }
}

impl Default for ResearchLedger {
    fn default() -> Self {
        Self::new(&ResearchCatalog::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(ledger: &mut ResearchLedger, id: &str, times: u32) {
        for _ in 0..times {
            assert!(ledger.unlock_level(id), "unlock {} failed", id);
        }
    }

    #[test]
    fn standard_catalog_has_eleven_entries() {
        let ledger = ResearchLedger::default();
        assert_eq!(ledger.all().len(), 11);
        assert!(ledger.all().iter().all(|u| u.current_level == 0));
        assert_eq!(ledger.all()[0].id, "tree_coin_value_1");
    }

    #[test]
    fn by_category_filters() {
        let ledger = ResearchLedger::default();
        assert_eq!(ledger.by_category(ResearchCategory::Tree).len(), 3);
        assert_eq!(ledger.by_category(ResearchCategory::Building).len(), 4);
        assert_eq!(ledger.by_category(ResearchCategory::Universal).len(), 4);
    }

    #[test]
    fn unlock_unknown_fails() {
        let mut ledger = ResearchLedger::default();
        assert!(!ledger.unlock_level("time_machine"));
    }

    #[test]
    fn unlock_raises_level_and_cost() {
        let mut ledger = ResearchLedger::default();
        assert!(ledger.unlock_level("tree_coin_value_1"));
        let u = ledger.upgrade("tree_coin_value_1").cloned();
        let u = u.unwrap();
        assert_eq!(u.current_level, 1);
        assert_eq!(u.cost, 120);
        ledger.unlock_level("tree_coin_value_1");
        assert_eq!(ledger.upgrade("tree_coin_value_1").map(|u| u.cost), Some(180));
    }

    #[test]
    fn cost_floors_each_step() {
        let mut ledger = ResearchLedger::default();
        // 250 → 375 → 562 → 843 → 1264 → 1896
        level(&mut ledger, "speed_perk_1", 5);
        assert_eq!(ledger.upgrade("speed_perk_1").map(|u| u.cost), Some(1896));
    }

    #[test]
    fn maxed_upgrade_rejects_further_levels() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "magnet_perk_1", 3);
        let cost = ledger.upgrade("magnet_perk_1").map(|u| u.cost);
        assert!(ledger.is_maxed("magnet_perk_1"));
        assert!(!ledger.unlock_level("magnet_perk_1"));
        assert_eq!(ledger.upgrade("magnet_perk_1").map(|u| u.cost), cost);
        assert_eq!(ledger.magnet_research_level(), 3);
    }

    #[test]
    fn neutral_multipliers_at_level_zero() {
        let ledger = ResearchLedger::default();
        assert_eq!(ledger.production_speed_multiplier(), 1.0);
        assert_eq!(ledger.upgrade_cost_multiplier(), 1.0);
        assert_eq!(ledger.coin_value_multiplier(), 1.0);
        assert_eq!(ledger.building_efficiency_multiplier(), 1.0);
        assert_eq!(ledger.holiday_synergy_multiplier(), 1.0);
        assert_eq!(ledger.player_speed_multiplier(), 1.0);
        assert!(!ledger.has_permanent_magnet());
        let tree = ledger.tree_research_effects();
        assert_eq!(tree.coin_value_multiplier, 1.0);
        assert_eq!(tree.cooldown_multiplier, 1.0);
        assert_eq!(tree.coin_batch_multiplier, 1.0);
    }

    #[test]
    fn same_type_stacks_additively() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "building_efficiency_1", 2); // 0.08
        level(&mut ledger, "precision_tools_1", 3); // 0.06
        assert!((ledger.building_efficiency_multiplier() - 1.14).abs() < 1e-9);
    }

    #[test]
    fn upgrade_cost_multiplier_reduces() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "upgrade_cost_1", 10);
        assert!((ledger.upgrade_cost_multiplier() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn upgrade_cost_multiplier_floor() {
        let catalog = ResearchCatalog::new(vec![ResearchUpgrade::new(
            "haggling",
            ResearchType::UpgradeCost,
            ResearchCategory::Building,
            "Haggling",
            "",
            10,
            10,
            0.2,
            "",
        )]);
        let mut ledger = ResearchLedger::new(&catalog);
        level(&mut ledger, "haggling", 10);
        assert_eq!(ledger.upgrade_cost_multiplier(), MIN_UPGRADE_COST_MULTIPLIER);
    }

    #[test]
    fn tree_gift_value_twice() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "tree_coin_value_1", 2);
        let tree = ledger.tree_research_effects();
        assert!((tree.coin_value_multiplier - 1.5).abs() < 1e-9);
    }

    #[test]
    fn tree_coin_value_compounds_three_layers() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "tree_coin_value_1", 1); // 1.25
        level(&mut ledger, "coin_value_1", 5); // 1.10
        level(&mut ledger, "festive_synergy_1", 10); // 1.20
        let tree = ledger.tree_research_effects();
        assert!((tree.coin_value_multiplier - 1.25 * 1.10 * 1.20).abs() < 1e-9);
    }

    #[test]
    fn tree_cooldown_diminishes_and_floors() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "tree_cooldown_1", 5); // bonus 0.5
        let tree = ledger.tree_research_effects();
        assert!((tree.cooldown_multiplier - 1.0 / 1.5).abs() < 1e-9);

        let catalog = ResearchCatalog::new(vec![ResearchUpgrade::new(
            "espresso",
            ResearchType::TreeRecoverySpeed,
            ResearchCategory::Tree,
            "Espresso",
            "",
            1,
            10,
            1.0,
            "",
        )]);
        let mut fast = ResearchLedger::new(&catalog);
        level(&mut fast, "espresso", 10);
        assert_eq!(
            fast.tree_research_effects().cooldown_multiplier,
            MIN_TREE_COOLDOWN_MULTIPLIER
        );
    }

    #[test]
    fn tree_burst_multiplier() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "tree_present_burst_1", 4);
        assert!((ledger.tree_research_effects().coin_batch_multiplier - 1.6).abs() < 1e-9);
    }

    #[test]
    fn magnet_and_speed() {
        let mut ledger = ResearchLedger::default();
        ledger.unlock_level("magnet_perk_1");
        assert!(ledger.has_permanent_magnet());
        assert_eq!(ledger.magnet_research_level(), 1);
        level(&mut ledger, "speed_perk_1", 2);
        assert!((ledger.player_speed_multiplier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn catalogs_are_independent_per_ledger() {
        let catalog = ResearchCatalog::standard();
        let mut a = ResearchLedger::new(&catalog);
        let b = ResearchLedger::new(&catalog);
        a.unlock_level("prod_speed_1");
        assert_eq!(b.upgrade("prod_speed_1").map(|u| u.current_level), Some(0));
        assert_eq!(catalog.entries()[3].current_level, 0);
    }

    #[test]
    fn duplicate_catalog_ids_keep_first() {
        let mut entries = ResearchCatalog::standard().entries().to_vec();
        let mut dup = entries[0].clone();
        dup.cost = 1;
        entries.push(dup);
        let ledger = ResearchLedger::new(&ResearchCatalog::new(entries));
        assert_eq!(ledger.all().len(), 11);
        assert_eq!(ledger.upgrade("tree_coin_value_1").map(|u| u.cost), Some(80));
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut ledger = ResearchLedger::default();
        level(&mut ledger, "prod_speed_1", 3);
        level(&mut ledger, "coin_value_1", 1);
        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let snap: ResearchSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = ResearchLedger::default();
        restored.restore(&snap);
        assert_eq!(restored.all(), ledger.all());
    }

    #[test]
    fn snapshot_shape_is_triples() {
        let ledger = ResearchLedger::default();
        let value = serde_json::to_value(ledger.snapshot()).unwrap();
        let first = &value["upgrades"][0];
        assert_eq!(first["id"], "tree_coin_value_1");
        assert_eq!(first["currentLevel"], 0);
        assert_eq!(first["cost"], 80);
        assert_eq!(first.as_object().map(|o| o.len()), Some(3));
    }

    #[test]
    fn restore_ignores_unknown_ids_and_keeps_structure() {
        let json = r#"{"upgrades": [
            {"id": "prod_speed_1", "currentLevel": 4, "cost": 506},
            {"id": "retired_upgrade", "currentLevel": 9, "cost": 1}
        ]}"#;
        let snap: ResearchSnapshot = serde_json::from_str(json).unwrap();
        let mut ledger = ResearchLedger::default();
        ledger.restore(&snap);
        let u = ledger.upgrade("prod_speed_1").cloned().unwrap();
        assert_eq!(u.current_level, 4);
        assert_eq!(u.cost, 506);
        assert_eq!(u.max_level, 10);
        assert!((u.effect_per_level - 0.05).abs() < 1e-12);
        assert!(ledger.upgrade("retired_upgrade").is_none());
        assert!((ledger.production_speed_multiplier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn upgrade_cost_entry_is_shown_as_decrease() {
        let ledger = ResearchLedger::default();
        assert_eq!(
            ledger.upgrade("upgrade_cost_1").and_then(|u| u.effect_display),
            Some(EffectDisplay::Decrease)
        );
        assert_eq!(ledger.upgrade("prod_speed_1").and_then(|u| u.effect_display), None);
    }
}
