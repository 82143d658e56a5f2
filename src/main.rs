//! Headless workshop run.
//!
//! Usage: `workshop-sim [CONFIG.json] [SECONDS]`
//!
//! Plays a scripted session on a hand-driven clock: plots are repaired on a
//! schedule, a cookie is eaten whenever the production buff runs out, and
//! coins go to the cheapest research or the next tree. Set `RUST_LOG=debug`
//! to see every income collection.

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use holiday_workshop::layout;
use holiday_workshop::{
    BuffCategory, IncomeFn, ManualClock, ResearchType, Workshop, WorkshopConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SECONDS: u32 = 900;
const PLOT_INCOME: f64 = 4.0;
const FRAME_MS: f64 = 100.0;
const REPAIR_EVERY_SECS: u32 = 90;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&str>) -> Result<WorkshopConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let config = WorkshopConfig::from_json(&json)?;
            info!(path, "loaded config");
            Ok(config)
        }
        None => Ok(WorkshopConfig::default()),
    }
}

/// Spend on income research first, then trees. Returns how many purchases
/// went through.
fn spend(w: &mut Workshop) -> u32 {
    let mut bought = 0;
    loop {
        let coins = w.economy.coins();
        let research = w
            .research
            .all()
            .iter()
            .filter(|u| !u.is_maxed() && (u.cost as f64) <= coins)
            .filter(|u| {
                matches!(
                    u.kind,
                    ResearchType::ProductionSpeed
                        | ResearchType::BuildingEfficiency
                        | ResearchType::FestiveSpirit
                )
            })
            .min_by_key(|u| u.cost)
            .map(|u| u.id.clone());

        let ok = match research {
            Some(id) => w.purchase_research(&id),
            None => w.plant_next_tree().is_some(),
        };
        if !ok {
            return bought;
        }
        bought += 1;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let seconds = match args.get(1) {
        Some(raw) => raw.parse::<u32>()?,
        None => DEFAULT_SECONDS,
    };

    let clock = ManualClock::new(0.0);
    let mut workshop = Workshop::new(&config, Rc::new(clock.clone()));
    workshop.tick();

    let repaired = Rc::new(Cell::new(0u32));
    {
        let repaired = repaired.clone();
        workshop
            .economy
            .register_income_source(Box::new(IncomeFn(move || {
                repaired.get() as f64 * PLOT_INCOME
            })));
    }

    let cookie = ["chocolate", "basic"]
        .into_iter()
        .find(|key| workshop.buffs.catalog().get(key).is_some());
    if cookie.is_none() {
        warn!("no production cookie in the catalog, running without buffs");
    }

    let frames_per_sec = (1000.0 / FRAME_MS) as u32;
    let mut cookies_eaten = 0u32;
    let mut purchases = 0u32;
    for s in 0..seconds {
        if s % REPAIR_EVERY_SECS == 0 {
            if let Some(id) =
                layout::next_unrepaired_building(&workshop.building_spots).map(|spot| spot.id)
            {
                workshop.repair_building(id);
                repaired.set(layout::repaired_building_count(&workshop.building_spots) as u32);
            }
        }
        if let Some(key) = cookie {
            if !workshop.buffs.has_category(BuffCategory::ProductionBoost)
                && workshop.consume_cookie(key)
            {
                cookies_eaten += 1;
            }
        }
        for _ in 0..frames_per_sec {
            clock.advance(FRAME_MS);
            workshop.tick();
        }
        purchases += spend(&mut workshop);
    }

    let tree = workshop.research.tree_research_effects();
    info!(
        seconds,
        ticks = workshop.total_ticks(),
        coins = workshop.economy.coins(),
        total_earned = workshop.economy.total_earned(),
        purchases,
        cookies_eaten,
        buildings = layout::repaired_building_count(&workshop.building_spots),
        trees = layout::planted_tree_count(&workshop.tree_spots),
        income_multiplier = workshop.income_multiplier(),
        tree_cooldown = tree.cooldown_multiplier,
        "session finished"
    );

    println!("{}", workshop.save()?);
    Ok(())
}
