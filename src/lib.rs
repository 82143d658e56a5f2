//! Gameplay-state ledgers for an incremental holiday workshop game.
//!
//! Three independent ledgers hold the game's mutable state:
//!
//! - [`BuffLedger`]: timed multiplicative cookie buffs, one per category.
//! - [`ResearchLedger`]: a fixed catalog of levelable research upgrades.
//! - [`EconomyLedger`]: coin balance and passive income.
//!
//! None of them calls another. [`Workshop`] is a reference orchestrator that
//! composes their multipliers on a fixed-timestep tick; games with their own
//! loop can drive the ledgers directly instead.

pub mod clock;
pub mod config;
pub mod error;
pub mod layout;
pub mod ledgers;
pub mod time;
pub mod workshop;

pub use clock::{Clock, ExpiryTask, ManualClock, NoScheduler, Scheduler, TimerQueue, WallClock};
pub use config::WorkshopConfig;
pub use error::{ConfigError, SaveError};
pub use ledgers::buff::{Buff, BuffCatalog, BuffCategory, BuffLedger, BuffSnapshot, BuffTemplate};
pub use ledgers::economy::{EconomyLedger, EconomySnapshot, IncomeFn, IncomeSource};
pub use ledgers::research::{
    ResearchCatalog, ResearchCategory, ResearchLedger, ResearchSnapshot, ResearchType,
    ResearchUpgrade, TreeResearchEffects,
};
pub use time::GameTime;
pub use workshop::Workshop;
