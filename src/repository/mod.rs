//! Repository layer for database operations
//!
//! Reads go straight to the pool. Writes that take part in a lifecycle
//! operation accept the caller's connection so they run inside its
//! transaction.

pub mod authors;
pub mod books;
pub mod loans;
pub mod members;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a transaction at the default (read committed) isolation level
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
