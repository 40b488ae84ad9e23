//! Transport implementations the bridge can be wired to.

pub mod simulation;
