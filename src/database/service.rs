//! Database service layer
//!
//! This module bundles the repositories behind one handle and owns the
//! pool used to open cross-repository transactions.

use sqlx::{Postgres, Transaction};

use crate::database::{
    CategoryRepository, CompilationRepository, DatabasePool, EventRepository, RequestRepository,
    UserRepository,
};
use crate::utils::errors::AfishaError;

#[derive(Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub categories: CategoryRepository,
    pub compilations: CompilationRepository,
    pub events: EventRepository,
    pub requests: RequestRepository,
    pub users: UserRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            categories: CategoryRepository::new(pool.clone()),
            compilations: CompilationRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a transaction spanning several repositories
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AfishaError> {
        Ok(self.pool.begin().await?)
    }
}
