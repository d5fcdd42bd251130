//! PSP webhook audit repository (§3 "PspWebhook").

use sqlx::PgExecutor;

use aegis_types::PspWebhook;

use crate::error::DbResult;
use crate::models::PspWebhookRow;

pub struct WebhookRepo;

impl WebhookRepo {
    /// Capture the raw signed payload for audit/replay (§4.5 step 2).
    pub async fn insert<'c, E>(
        executor: E,
        event_id: &str,
        payload: serde_json::Value,
    ) -> DbResult<PspWebhook>
    where
        E: PgExecutor<'c>,
    {
        let row = sqlx::query_as::<_, PspWebhookRow>(
            r#"
            INSERT INTO psp_webhooks (id, event_id, payload, status)
            VALUES (gen_random_uuid(), $1, $2, 'received')
            RETURNING id, event_id, payload, status, created_at
            "#,
        )
        .bind(event_id)
        .bind(payload)
        .fetch_one(executor)
        .await?;

        row.try_into()
    }
}
