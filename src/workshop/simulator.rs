//! Pacing simulator for the workshop economy.
//! Run with: cargo test -p holiday-workshop simulate_greedy -- --nocapture
