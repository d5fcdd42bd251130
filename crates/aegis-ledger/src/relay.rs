//! Outbox relay: polls `transaction_outbox` for pending rows and publishes them to the event log
//! (§4.3). Grounded on `internal/outbox/relay.go`.

use std::time::Duration;

use aegis_db::{Database, OutboxRepo};
use aegis_eventlog::{topics, Producer};
use aegis_types::OutboxRow;

pub struct Relay {
    db: Database,
    producer: Producer,
    batch_size: i64,
    poll_interval: Duration,
}

impl Relay {
    pub fn new(db: Database, producer: Producer, batch_size: i64, poll_interval: Duration) -> Self {
        Self {
            db,
            producer,
            batch_size,
            poll_interval,
        }
    }

    /// Poll until `cancel` fires. Each tick processes at most one batch; a slow or failing batch
    /// never causes overlapping ticks since the loop awaits `process_batch` before sleeping again.
    pub async fn run(&self, cancel: tokio_util::sync::CancellationToken) {
        tracing::info!("starting outbox relay");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("stopping outbox relay");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    if let Err(e) = self.process_batch().await {
                        tracing::error!(error = %e, "failed to process outbox batch");
                    }
                }
            }
        }
    }

    async fn process_batch(&self) -> Result<(), aegis_db::DbError> {
        let mut tx = self.db.pool.begin().await?;

        let rows = OutboxRepo::fetch_pending_for_update(&mut tx, self.batch_size).await?;

        if rows.is_empty() {
            return Ok(());
        }

        tracing::info!(count = rows.len(), "fetched outbox events");

        let mut processed_ids = Vec::with_capacity(rows.len());
        for row in &rows {
            if self.publish_one(row).await {
                processed_ids.push(row.id);
            }
        }

        if processed_ids.is_empty() {
            // Leaving the transaction uncommitted releases the row locks without marking
            // anything processed; the next tick's `SKIP LOCKED` picks the rows back up.
            return Ok(());
        }

        OutboxRepo::mark_processed(&mut tx, &processed_ids).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Returns whether the row should be marked processed. A publish failure is logged and the
    /// row is left `pending` for the next tick to retry, rather than advancing past it.
    async fn publish_one(&self, row: &OutboxRow) -> bool {
        let topic = topics::topic_for_event_type(&row.event_type);
        let payload = match serde_json::to_vec(&row.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, event_id = row.id, "failed to serialize outbox payload");
                return false;
            }
        };

        match self
            .producer
            .publish(topic, &row.partition_key.to_string(), &payload, None)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_id = row.id,
                    event_type = %row.event_type,
                    "failed to publish outbox event"
                );
                false
            }
        }
    }
}
