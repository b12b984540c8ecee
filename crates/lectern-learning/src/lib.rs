//! Lectern Learning: the services that sit between an authenticated
//! principal and the entity store: enrollment, progress tracking,
//! instructor analytics, the authorization guard, and the catalog,
//! review, account and admin operations built on the same seams.

pub mod account;
pub mod admin;
pub mod analytics;
pub mod catalog;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod guard;
pub mod paging;
pub mod password;
pub mod progress;
pub mod review;

pub use account::AccountService;
pub use admin::AdminService;
pub use analytics::AnalyticsService;
pub use catalog::CatalogService;
pub use config::LearningConfig;
pub use enrollment::EnrollmentService;
pub use error::LearningError;
pub use paging::{Page, PageRequest};
pub use progress::ProgressService;
pub use review::ReviewService;
