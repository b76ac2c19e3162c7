//! Members repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, TopActiveMember, UpdateMember},
};

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.user_id, u.email, u.username, m.joined_at
    FROM members m
    JOIN users u ON u.id = m.user_id
"#;

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all members
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, Member>(&format!("{} ORDER BY m.id", MEMBER_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(&format!("{} WHERE m.id = $1", MEMBER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    /// Check that a member exists, blocking its deletion until the transaction ends
    pub async fn exists(&self, conn: &mut PgConnection, id: i32) -> AppResult<bool> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT id FROM members WHERE id = $1 FOR KEY SHARE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(found.is_some())
    }

    /// Create the user identity and its member record
    pub async fn create(&self, data: &CreateMember) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let user_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (email, username) VALUES ($1, $2) RETURNING id",
        )
        .bind(&data.email)
        .bind(&data.username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "Member email or username"))?;

        let member_id: i32 =
            sqlx::query_scalar("INSERT INTO members (user_id) VALUES ($1) RETURNING id")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let member = sqlx::query_as::<_, Member>(&format!("{} WHERE m.id = $1", MEMBER_SELECT))
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(member)
    }

    /// Update the member's user identity, leaving omitted fields unchanged
    pub async fn update(&self, id: i32, data: &UpdateMember) -> AppResult<Member> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE($1, email),
                username = COALESCE($2, username)
            WHERE id = (SELECT user_id FROM members WHERE id = $3)
            "#,
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Member email or username"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Delete member and its user identity (refused once it has loan history)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = (SELECT user_id FROM members WHERE id = $1)")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Member"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }
        Ok(())
    }

    /// Members ranked by number of unreturned loans, ties broken by member ID
    pub async fn top_active(&self, limit: i64) -> AppResult<Vec<TopActiveMember>> {
        let rows = sqlx::query_as::<_, TopActiveMember>(
            r#"
            SELECT m.id, u.email, u.username,
                   COUNT(l.id) FILTER (WHERE NOT l.is_returned) AS active_loan
            FROM members m
            JOIN users u ON u.id = m.user_id
            LEFT JOIN loans l ON l.member_id = m.id
            GROUP BY m.id, u.email, u.username
            ORDER BY active_loan DESC, m.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
