use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::assignments::repo_types::{Assignment, AssignmentPatch};

// Every query is scoped by user_id, so ownership checks live in the WHERE
// clause rather than in handler code.
impl Assignment {
    /// All assignments owned by `user_id`, newest first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, user_id, title, description, due_date, is_completed, created_at, updated_at
            FROM assignments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        due_date: Option<OffsetDateTime>,
    ) -> sqlx::Result<Assignment> {
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (user_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, due_date, is_completed, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(due_date)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id_and_user(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, user_id, title, description, due_date, is_completed, created_at, updated_at
            FROM assignments
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Applies `patch` and returns the updated row, or `None` when no row
    /// matches. A single UPDATE keeps lookup and write atomic; concurrent
    /// patches to the same row serialize at the database.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        patch: &AssignmentPatch,
    ) -> sqlx::Result<Option<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET title        = COALESCE($3, title),
                description  = CASE WHEN $4 THEN $5 ELSE description END,
                due_date     = CASE WHEN $6 THEN $7 ELSE due_date END,
                is_completed = COALESCE($8, is_completed),
                updated_at   = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, due_date, is_completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.title.as_deref())
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.due_date.is_some())
        .bind(patch.due_date.flatten())
        .bind(patch.is_completed)
        .fetch_optional(db)
        .await
    }

    /// Returns whether a row was deleted.
    pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM assignments WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
