//! Cookie buffs: timed multiplicative effects, at most one per category.
//!
//! Expiry happens two ways. `add` schedules a one-shot removal through the
//! injected [`Scheduler`], and [`BuffLedger::sweep`] removes anything whose
//! time has run out. Both paths only ever delete, and deleting a missing id
//! is a no-op, so they may fire in any order. Read paths do not filter
//! expired-but-unswept buffs; call `sweep` first when that matters.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, ExpiryTask, NoScheduler, Scheduler};

/// Effect domain a buff modifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffCategory {
    ProductionBoost,
    CollectionSpeed,
    UpgradeDiscount,
    MagneticPull,
    SpeedBoost,
}

impl BuffCategory {
    pub fn all() -> &'static [BuffCategory] {
        &[
            BuffCategory::ProductionBoost,
            BuffCategory::CollectionSpeed,
            BuffCategory::UpgradeDiscount,
            BuffCategory::MagneticPull,
            BuffCategory::SpeedBoost,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuffCategory::ProductionBoost => "production_boost",
            BuffCategory::CollectionSpeed => "collection_speed",
            BuffCategory::UpgradeDiscount => "upgrade_discount",
            BuffCategory::MagneticPull => "magnetic_pull",
            BuffCategory::SpeedBoost => "speed_boost",
        }
    }
}

/// An active buff. Times are in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buff {
    pub id: String,
    #[serde(rename = "type")]
    pub category: BuffCategory,
    pub name: String,
    pub description: String,
    pub multiplier: f64,
    pub duration: f64,
    pub start_time: f64,
    pub icon: String,
}

impl Buff {
    pub fn is_expired_at(&self, now_ms: f64) -> bool {
        now_ms - self.start_time >= self.duration
    }

    /// Time left at `now_ms`, never negative.
    pub fn remaining_at(&self, now_ms: f64) -> f64 {
        (self.duration - (now_ms - self.start_time)).max(0.0)
    }
}

/// A buff as persisted: the live record plus the time it had left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBuff {
    #[serde(flatten)]
    pub buff: Buff,
    pub remaining_time: f64,
}

/// Persisted form of a [`BuffLedger`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffSnapshot {
    #[serde(default)]
    pub active_buffs: Vec<SavedBuff>,
}

/// Recipe for a consumable cookie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffTemplate {
    /// Lookup key passed to [`BuffLedger::consume_template`].
    pub key: String,
    /// Prefix of generated buff ids (`<prefix>_<now ms>`).
    pub id_prefix: String,
    pub category: BuffCategory,
    pub name: String,
    pub description: String,
    pub multiplier: f64,
    pub duration_ms: f64,
    pub icon: String,
}

impl BuffTemplate {
    #[allow(clippy::too_many_arguments)]
    fn new(
        key: &str,
        id_prefix: &str,
        category: BuffCategory,
        name: &str,
        description: &str,
        multiplier: f64,
        duration_ms: f64,
        icon: &str,
    ) -> Self {
        Self {
            key: key.into(),
            id_prefix: id_prefix.into(),
            category,
            name: name.into(),
            description: description.into(),
            multiplier,
            duration_ms,
            icon: icon.into(),
        }
    }

    /// Stamp a fresh buff starting at `now_ms`.
    pub fn instantiate(&self, now_ms: f64) -> Buff {
        Buff {
            id: format!("{}_{}", self.id_prefix, now_ms as u64),
            category: self.category,
            name: self.name.clone(),
            description: self.description.clone(),
            multiplier: self.multiplier,
            duration: self.duration_ms,
            start_time: now_ms,
            icon: self.icon.clone(),
        }
    }
}

/// Fixed table of consumable cookies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuffCatalog {
    templates: Vec<BuffTemplate>,
}

impl BuffCatalog {
    pub fn new(templates: Vec<BuffTemplate>) -> Self {
        Self { templates }
    }

    /// The five reference cookies.
    pub fn standard() -> Self {
        use BuffCategory::*;
        Self::new(vec![
            BuffTemplate::new(
                "basic",
                "basic_cookie",
                ProductionBoost,
                "Basic Cookie",
                "Production +25% for 60s",
                1.25,
                60_000.0,
                "🍪",
            ),
            BuffTemplate::new(
                "chocolate",
                "chocolate_cookie",
                ProductionBoost,
                "Chocolate Cookie",
                "Production +50% for 90s",
                1.5,
                90_000.0,
                "🍫",
            ),
            BuffTemplate::new(
                "gingerbread",
                "gingerbread",
                ProductionBoost,
                "Gingerbread Cookie",
                "Production +100% for 45s",
                2.0,
                45_000.0,
                "🍪",
            ),
            BuffTemplate::new(
                "magnet",
                "magnet_cookie",
                MagneticPull,
                "Magnet Cookie",
                "Coins drift toward you for 45s",
                1.0,
                45_000.0,
                "🧲",
            ),
            BuffTemplate::new(
                "speed",
                "speed_cookie",
                SpeedBoost,
                "Peppermint Cookie",
                "Movement +50% for 45s",
                1.5,
                45_000.0,
                "🍬",
            ),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&BuffTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    pub fn templates(&self) -> &[BuffTemplate] {
        &self.templates
    }
}

impl Default for BuffCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Keyed store of active buffs.
pub struct BuffLedger {
    buffs: HashMap<String, Buff>,
    catalog: BuffCatalog,
    clock: Rc<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
}

impl BuffLedger {
    pub fn new(catalog: BuffCatalog, clock: Rc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            buffs: HashMap::new(),
            catalog,
            clock,
            scheduler,
        }
    }

    /// Standard catalog, no one-shot timers (sweep-only expiry).
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self::new(BuffCatalog::standard(), clock, Box::new(NoScheduler))
    }

    /// Insert `buff`, evicting any buff already holding its category, and
    /// schedule its removal after `buff.duration`.
    pub fn add(&mut self, buff: Buff) {
        if let Some(evicted) = self.remove_by_category(buff.category) {
            debug!(
                evicted = %evicted.id,
                replacement = %buff.id,
                category = buff.category.as_str(),
                "buff replaced"
            );
        }
        self.scheduler.schedule(
            buff.duration,
            ExpiryTask {
                buff_id: buff.id.clone(),
            },
        );
        debug!(
            id = %buff.id,
            category = buff.category.as_str(),
            multiplier = buff.multiplier,
            duration_ms = buff.duration,
            "buff added"
        );
        self.buffs.insert(buff.id.clone(), buff);
    }

    pub fn remove(&mut self, id: &str) -> Option<Buff> {
        self.buffs.remove(id)
    }

    /// Deliver a fired one-shot removal.
    pub fn fire(&mut self, task: &ExpiryTask) {
        if self.remove(&task.buff_id).is_some() {
            debug!(id = %task.buff_id, "buff expired (timer)");
        }
    }

    /// Remove the first buff found in `category`.
    pub fn remove_by_category(&mut self, category: BuffCategory) -> Option<Buff> {
        let id = self
            .buffs
            .values()
            .find(|b| b.category == category)
            .map(|b| b.id.clone())?;
        self.buffs.remove(&id)
    }

    pub fn get(&self, id: &str) -> Option<&Buff> {
        self.buffs.get(id)
    }

    pub fn all(&self) -> Vec<&Buff> {
        self.buffs.values().collect()
    }

    pub fn by_category(&self, category: BuffCategory) -> Vec<&Buff> {
        self.buffs
            .values()
            .filter(|b| b.category == category)
            .collect()
    }

    /// Product of every stored multiplier in `category`; 1.0 when none.
    pub fn multiplier(&self, category: BuffCategory) -> f64 {
        self.buffs
            .values()
            .filter(|b| b.category == category)
            .map(|b| b.multiplier)
            .product()
    }

    /// Milliseconds left on buff `id`; 0 for unknown ids.
    pub fn remaining_time(&self, id: &str) -> f64 {
        let now = self.clock.now_ms();
        self.buffs.get(id).map_or(0.0, |b| b.remaining_at(now))
    }

    pub fn has_category(&self, category: BuffCategory) -> bool {
        self.buffs.values().any(|b| b.category == category)
    }

    /// Remove every buff whose duration has elapsed. Returns how many went.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.buffs.len();
        self.buffs.retain(|_, b| !b.is_expired_at(now));
        let removed = before - self.buffs.len();
        if removed > 0 {
            debug!(removed, "expired buffs swept");
        }
        removed
    }

    /// Consume the cookie registered under `key`. Unknown keys do nothing.
    pub fn consume_template(&mut self, key: &str) -> bool {
        let Some(template) = self.catalog.get(key) else {
            debug!(key, "unknown cookie template");
            return false;
        };
        let buff = template.instantiate(self.clock.now_ms());
        self.add(buff);
        true
    }

    pub fn catalog(&self) -> &BuffCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// Unexpired buffs annotated with the time they have left.
    pub fn snapshot(&self) -> BuffSnapshot {
        let now = self.clock.now_ms();
        let mut active_buffs: Vec<SavedBuff> = self
            .buffs
            .values()
            .filter(|b| !b.is_expired_at(now))
            .map(|b| SavedBuff {
                buff: b.clone(),
                remaining_time: b.duration - (now - b.start_time),
            })
            .collect();
        active_buffs.sort_by(|a, b| a.buff.id.cmp(&b.buff.id));
        BuffSnapshot { active_buffs }
    }

    /// Re-insert saved buffs, rebasing each start time on the current clock
    /// so the elapsed share of its duration is preserved. Entries with no
    /// time left are still inserted; the next sweep drops them.
    pub fn restore(&mut self, data: &BuffSnapshot) {
        let now = self.clock.now_ms();
        for saved in &data.active_buffs {
            let mut buff = saved.buff.clone();
            buff.start_time = now - (buff.duration - saved.remaining_time);
            self.buffs.insert(buff.id.clone(), buff);
        }
    }
}

impl BuffSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
