//! Database seeding functionality
//!
//! Populates the reference lookup tables the submission form depends on.
//! Seeding is idempotent and can run on every deploy.

pub mod reference;

pub use reference::{SeedReport, seed_reference_data};
