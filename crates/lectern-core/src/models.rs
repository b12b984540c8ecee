//! Domain models for Lectern.
//!
//! These are the core types shared across all crates.

pub mod category;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod principal;
pub mod progress;
pub mod review;
pub mod user;
