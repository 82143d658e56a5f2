//! Workshop save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current envelope version. Bump when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest version that can still be loaded.
//!   Adding fields does not change it (missing fields take defaults); only
//!   changing or removing the meaning of an existing field does.
//!
//! The per-ledger snapshots inside the envelope are unversioned and restore
//! by id, so unknown entries are skipped. Where the JSON string is stored is
//! the host's business.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Workshop;
use crate::error::SaveError;
use crate::ledgers::buff::BuffSnapshot;
use crate::ledgers::economy::EconomySnapshot;
use crate::ledgers::research::ResearchSnapshot;

pub const SAVE_VERSION: u32 = 1;

pub const MIN_COMPATIBLE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub game: WorkshopSave,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopSave {
    pub economy: EconomySnapshot,
    pub buffs: BuffSnapshot,
    pub research: ResearchSnapshot,
    /// Ids of repaired building plots.
    pub repaired_buildings: Vec<String>,
    /// Ids of planted tree plots.
    pub planted_trees: Vec<String>,
}

/// Capture everything worth persisting.
pub fn extract_save(workshop: &Workshop) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: WorkshopSave {
            economy: workshop.economy.snapshot(),
            buffs: workshop.buffs.snapshot(),
            research: workshop.research.snapshot(),
            repaired_buildings: workshop
                .building_spots
                .iter()
                .filter(|s| s.repaired)
                .map(|s| s.id.to_string())
                .collect(),
            planted_trees: workshop
                .tree_spots
                .iter()
                .filter(|s| s.planted)
                .map(|s| s.id.to_string())
                .collect(),
        },
    }
}

/// Restore a save onto a freshly built workshop. Plots listed in the save
/// are marked done; plots it does not mention keep their current state.
pub fn apply_save(workshop: &mut Workshop, save: &WorkshopSave) {
    workshop.economy.restore(&save.economy);
    workshop.research.restore(&save.research);
    workshop.buffs.restore(&save.buffs);

    for spot in &mut workshop.building_spots {
        if save.repaired_buildings.iter().any(|id| id == spot.id) {
            spot.repaired = true;
        }
    }
    for spot in &mut workshop.tree_spots {
        if save.planted_trees.iter().any(|id| id == spot.id) {
            spot.planted = true;
        }
    }
}

pub fn save_to_json(workshop: &Workshop) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(workshop))?)
}

/// Parse `json` and apply it. Saves older than `MIN_COMPATIBLE_VERSION` are
/// refused and leave the workshop untouched.
pub fn load_from_json(workshop: &mut Workshop, json: &str) -> Result<(), SaveError> {
    let data: SaveData = serde_json::from_str(json)?;
    if data.version < MIN_COMPATIBLE_VERSION {
        warn!(
            saved = data.version,
            min_compatible = MIN_COMPATIBLE_VERSION,
            "save too old, ignoring"
        );
        return Err(SaveError::IncompatibleVersion {
            saved: data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if data.version < SAVE_VERSION {
        info!(
            saved = data.version,
            current = SAVE_VERSION,
            "migrating older save"
        );
    }
    apply_save(workshop, &data.game);
    Ok(())
}

impl Workshop {
    pub fn save(&self) -> Result<String, SaveError> {
        save_to_json(self)
    }

    pub fn load(&mut self, json: &str) -> Result<(), SaveError> {
        load_from_json(self, json)
    }
}
