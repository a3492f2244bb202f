//! Database module
//!
//! Connection pooling, migrations and repository implementations

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use repositories::{
    AdminEventFilter, CategoryRepository, CompilationRepository, EventRepository,
    PublicEventFilter, RequestRepository, UserRepository,
};
pub use service::DatabaseService;
