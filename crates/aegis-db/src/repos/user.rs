//! Thin user repository. User CRUD is ambient (§1 "deliberately out of scope") — kept minimal,
//! only enough to seed a row a wallet can attach to.

use sqlx::PgPool;
use uuid::Uuid;

use aegis_types::User;

use crate::error::DbResult;
use crate::models::UserRow;

pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, email: &str) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email) VALUES (gen_random_uuid(), $1) RETURNING id, email, created_at",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }
}
