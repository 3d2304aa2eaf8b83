//! Domain layer: invariants, validation and menu shaping rules.

pub mod error;
pub mod menu;
pub mod validation;
