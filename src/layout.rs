//! Placement tables for the workshop map: building plots on the right,
//! tree plots on the left.

/// Building kinds that can occupy a plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildingType {
    ToyMaker,
    GiftWrapper,
    CookieFactory,
    ElfHouse,
    ReindeerStable,
    CookieBakery,
    GiftWrappingStation,
    ElfDormitory,
    ReindeerStables,
    SantasOffice,
}

impl BuildingType {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            BuildingType::ToyMaker => "Toy Maker",
            BuildingType::GiftWrapper => "Gift Wrapper",
            BuildingType::CookieFactory => "Cookie Factory",
            BuildingType::ElfHouse => "Elf House",
            BuildingType::ReindeerStable => "Reindeer Stable",
            BuildingType::CookieBakery => "Cookie Bakery",
            BuildingType::GiftWrappingStation => "Gift Wrapping Station",
            BuildingType::ElfDormitory => "Elf Dormitory",
            BuildingType::ReindeerStables => "Reindeer Stables",
            BuildingType::SantasOffice => "Santa's Office",
        }
    }
}

/// A building plot. Starts broken; the player repairs plots in unlock order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingSpot {
    pub id: &'static str,
    pub kind: BuildingType,
    pub x: f32,
    pub y: f32,
    pub unlock_order: u32,
    pub repaired: bool,
}

/// A tree plot. Trees pay out when shaken; planting one costs `cost` coins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeSpot {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
    pub unlock_order: u32,
    pub planted: bool,
    pub cost: u64,
}

const fn building(
    id: &'static str,
    kind: BuildingType,
    x: f32,
    y: f32,
    unlock_order: u32,
) -> BuildingSpot {
    BuildingSpot {
        id,
        kind,
        x,
        y,
        unlock_order,
        repaired: false,
    }
}

const fn tree(id: &'static str, x: f32, y: f32, unlock_order: u32, cost: u64) -> TreeSpot {
    TreeSpot {
        id,
        x,
        y,
        unlock_order,
        planted: cost == 0,
        cost,
    }
}

// Unlock order 10 is unused; the late-game row starts at 11.
pub const BUILDING_SPOTS: [BuildingSpot; 14] = {
    use BuildingType::*;
    [
        // Starter
        building("toy_1", ToyMaker, 600.0, 250.0, 1),
        building("toy_2", ToyMaker, 740.0, 240.0, 2),
        // Early production
        building("gift_1", GiftWrapper, 600.0, 360.0, 3),
        building("cookie_1", CookieFactory, 740.0, 370.0, 4),
        building("gift_2", GiftWrapper, 880.0, 300.0, 5),
        // Mid game
        building("elf_1", ElfHouse, 600.0, 480.0, 6),
        building("cookie_2", CookieFactory, 740.0, 490.0, 7),
        building("reindeer_1", ReindeerStable, 880.0, 430.0, 8),
        // Late game
        building("elf_2", ElfHouse, 670.0, 590.0, 9),
        building("cookie_bakery", CookieBakery, 950.0, 550.0, 11),
        building("gift_wrapping", GiftWrappingStation, 600.0, 700.0, 12),
        building("elf_dormitory", ElfDormitory, 740.0, 710.0, 13),
        building("reindeer_stables", ReindeerStables, 880.0, 700.0, 14),
        building("santas_office", SantasOffice, 1020.0, 650.0, 15),
    ]
};

/// `tree_1` comes pre-planted; the rest are bought in order.
pub const TREE_SPOTS: [TreeSpot; 6] = [
    tree("tree_1", 200.0, 300.0, 1, 0),
    tree("tree_2", 200.0, 450.0, 2, 110),
    tree("tree_3", 350.0, 250.0, 3, 220),
    tree("tree_4", 350.0, 400.0, 4, 420),
    tree("tree_5", 200.0, 600.0, 5, 820),
    tree("tree_6", 350.0, 550.0, 6, 1600),
];

/// Fresh, mutable copy of the building table.
pub fn initial_building_spots() -> Vec<BuildingSpot> {
    BUILDING_SPOTS.to_vec()
}

/// Fresh, mutable copy of the tree table.
pub fn initial_tree_spots() -> Vec<TreeSpot> {
    TREE_SPOTS.to_vec()
}

/// Lowest-unlock-order plot still broken.
pub fn next_unrepaired_building(spots: &[BuildingSpot]) -> Option<&BuildingSpot> {
    spots
        .iter()
        .filter(|s| !s.repaired)
        .min_by_key(|s| s.unlock_order)
}

/// Lowest-unlock-order plot still empty.
pub fn next_unplanted_tree(spots: &[TreeSpot]) -> Option<&TreeSpot> {
    spots
        .iter()
        .filter(|s| !s.planted)
        .min_by_key(|s| s.unlock_order)
}

pub fn repaired_building_count(spots: &[BuildingSpot]) -> usize {
    spots.iter().filter(|s| s.repaired).count()
}

pub fn planted_tree_count(spots: &[TreeSpot]) -> usize {
    spots.iter().filter(|s| s.planted).count()
}

pub fn total_building_count() -> usize {
    BUILDING_SPOTS.len()
}

pub fn total_tree_count() -> usize {
    TREE_SPOTS.len()
}
