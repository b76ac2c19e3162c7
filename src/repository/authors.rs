//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all authors
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Create author
    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, bio, birth_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.bio)
        .bind(data.birth_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update author, leaving omitted fields unchanged and clearing
    /// nullable fields sent as `null`
    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($1, name),
                bio = CASE WHEN $2 THEN $3 ELSE bio END,
                birth_date = CASE WHEN $4 THEN $5 ELSE birth_date END
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.bio.is_some())
        .bind(data.bio.clone().flatten())
        .bind(data.birth_date.is_some())
        .bind(data.birth_date.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete author (refused while books reference it)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Author"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
