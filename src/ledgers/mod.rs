//! The three gameplay ledgers. Each is owned independently by the game-state
//! container; none of them references another.

pub mod buff;
pub mod economy;
pub mod research;
