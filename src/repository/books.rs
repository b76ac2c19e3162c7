//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search books with filters and pagination, returning the page and the total count
    pub async fn search(&self, query: &BookQuery, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)> {
        let title_pattern = query.title.as_ref().map(|t| format!("%{}%", t));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE ($1::int IS NULL OR author_id = $1)
              AND ($2::text IS NULL OR title ILIKE $2)
            "#,
        )
        .bind(query.author_id)
        .bind(&title_pattern)
        .fetch_one(&self.pool)
        .await?;

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE ($1::int IS NULL OR author_id = $1)
              AND ($2::text IS NULL OR title ILIKE $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.author_id)
        .bind(&title_pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Get book by ID and hold a row lock until the transaction ends
    pub async fn lock_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Create book
    pub async fn create(
        &self,
        title: &str,
        author_id: i32,
        isbn: Option<&str>,
        total_copies: i32,
        available_copies: i32,
    ) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, isbn, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(author_id)
        .bind(isbn)
        .bind(total_copies)
        .bind(available_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Book author"))?;
        Ok(row)
    }

    /// Persist every column of a locked book
    pub async fn save(&self, conn: &mut PgConnection, book: &Book) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, isbn = $3, total_copies = $4, available_copies = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.isbn)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(book.id)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_db(e, "Book author"))?;
        Ok(row)
    }

    /// Persist the available copy count of a locked book
    pub async fn save_available_copies(&self, conn: &mut PgConnection, book: &Book) -> AppResult<()> {
        sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
            .bind(book.available_copies)
            .bind(book.id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Delete book (refused once it has loan history)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Book"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
