//! Lectern Core: domain models, the shared error taxonomy, and the
//! repository traits that decouple the learning services from storage.

pub mod envelope;
pub mod error;
pub mod models;
pub mod repository;
