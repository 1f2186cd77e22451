//! Frontline - turn-based tactical battle core

pub mod battle;
pub mod core;
