//! Guillotine rectangle packing for laser-cut parts.
//!
//! Parts are nested onto fixed-size sheets, opening new sheets on demand, or
//! onto a single canvas that grows to fit when a sheet axis is left at zero.
//! [`solver::Solver`] tries every combination of placement heuristics and
//! keeps the best layout.

pub mod config;
pub mod dynamic;
pub mod error;
pub mod guillotine;
pub mod packer;
pub mod solver;
pub mod strategy;
pub mod types;

pub use config::PackOptions;
pub use error::PackError;
pub use solver::Solver;
pub use types::{Item, Placement, Sheet, SheetSize, Solution, Unplaced, UnplacedReason};
