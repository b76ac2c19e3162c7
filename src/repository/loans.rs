//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanQuery},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// List loans, newest first
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE ($1::int IS NULL OR member_id = $1)
              AND ($2::int IS NULL OR book_id = $2)
              AND ($3::bool IS NULL OR is_returned = NOT $3)
            ORDER BY loan_date DESC, id DESC
            "#,
        )
        .bind(query.member_id)
        .bind(query.book_id)
        .bind(query.active)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Get loan by ID and hold a row lock until the transaction ends
    pub async fn lock_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// Lock the earliest unreturned loan of a book by a member
    pub async fn lock_active(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
        member_id: i32,
    ) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE book_id = $1 AND member_id = $2 AND NOT is_returned
            ORDER BY loan_date, id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .fetch_optional(conn)
        .await?;
        Ok(loan)
    }

    /// Record a new loan
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
        member_id: i32,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, loan_date, due_date, is_returned)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(conn)
        .await?;
        Ok(loan)
    }

    /// Persist the mutable columns of a locked loan
    pub async fn save(&self, conn: &mut PgConnection, loan: &Loan) -> AppResult<Loan> {
        let row = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = $1, return_date = $2, is_returned = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.is_returned)
        .bind(loan.id)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }
}
