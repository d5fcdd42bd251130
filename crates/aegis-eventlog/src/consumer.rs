//! Event log consumer (§4.7), grounded on `internal/kafka/consumer.go`'s fetch-loop /
//! exponential-backoff-retry / offset-commit-per-batch shape, adapted to JetStream's pull
//! consumer and explicit per-message ack.
//!
//! The source's `MaxRetries` has no DLQ publish after exhaustion (§9 open question); this
//! implementation adds one, since the spec requires it for the core to be safe.

use std::collections::HashMap;
use std::time::Duration;

use async_nats::jetstream::consumer::{pull, AckPolicy};
use async_nats::jetstream::context::Context as JetStreamContext;
use async_nats::jetstream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use aegis_config::EventLogConfig;
use aegis_types::AegisError;

use crate::error::{EventLogError, EventLogResult};
use crate::producer::Producer;

/// A single fetched record, decoupled from the NATS SDK's message type so handlers don't need
/// to depend on `async-nats` directly.
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl Message {
    pub fn partition_key(&self) -> Option<&str> {
        self.headers.get("Aegis-Partition-Key").map(String::as_str)
    }
}

/// Processes a single message. Returning a retryable `AegisError` triggers backoff-and-retry;
/// any other error is treated as poison and the message is ack'd without retrying (§7).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, msg: &Message) -> Result<(), AegisError>;
}

pub struct Consumer {
    jetstream: JetStreamContext,
    topic: String,
    group: String,
    max_retries: u32,
    retry_backoff: Duration,
    max_poll_records: usize,
}

impl Consumer {
    pub async fn connect(config: &EventLogConfig, topic: &str, group: &str) -> EventLogResult<Self> {
        let client = async_nats::connect(&config.nats_urls)
            .await
            .map_err(|e| EventLogError::Connection(e.to_string()))?;

        let jetstream = async_nats::jetstream::new(client);

        Ok(Self {
            jetstream,
            topic: topic.to_string(),
            group: group.to_string(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_secs(config.retry_backoff_secs),
            max_poll_records: config.max_poll_records as usize,
        })
    }

    /// Fetch batch → handle each record with exponential backoff → DLQ on exhaustion → ack.
    /// Blocks until `cancel` fires.
    pub async fn run<H: Handler>(
        &self,
        handler: H,
        dlq: &Producer,
        cancel: CancellationToken,
    ) -> EventLogResult<()> {
        let stream = self
            .jetstream
            .get_or_create_stream(stream::Config {
                name: self.topic.clone(),
                subjects: vec![self.topic.clone()],
                ..Default::default()
            })
            .await
            .map_err(|e| EventLogError::Connection(e.to_string()))?;

        let consumer = stream
            .get_or_create_consumer(
                &self.group,
                pull::Config {
                    durable_name: Some(self.group.clone()),
                    ack_policy: AckPolicy::Explicit,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| EventLogError::Connection(e.to_string()))?;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                batch = consumer.fetch().max_messages(self.max_poll_records).messages() => batch,
            };

            let mut messages = match batch {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = %e, "fetch failed, retrying next tick");
                    continue;
                }
            };

            while let Some(next) = messages.next().await {
                let message = match next {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(error = %e, "malformed pull message, skipping");
                        continue;
                    }
                };

                let headers: HashMap<String, String> = message
                    .headers
                    .as_ref()
                    .map(|h| {
                        h.iter()
                            .map(|(k, v)| (k.to_string(), v.iter().next().map(|v| v.to_string()).unwrap_or_default()))
                            .collect()
                    })
                    .unwrap_or_default();

                let msg = Message {
                    topic: self.topic.clone(),
                    payload: message.payload.to_vec(),
                    headers,
                };

                self.process_with_retry(&handler, &msg, dlq).await;

                if let Err(e) = message.ack().await {
                    tracing::warn!(error = %e, "failed to ack message");
                }
            }
        }
    }

    async fn process_with_retry<H: Handler>(&self, handler: &H, msg: &Message, dlq: &Producer) {
        let mut attempt = 0;
        loop {
            match handler.handle(msg).await {
                Ok(()) => return,
                Err(e) if !e.is_retryable() => {
                    tracing::warn!(error = %e, "poison message, dropping without retry");
                    return;
                }
                Err(e) if attempt < self.max_retries => {
                    let backoff = self.retry_backoff * 2u32.pow(attempt);
                    tracing::warn!(error = %e, attempt, ?backoff, "retryable error, backing off");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "max retries exceeded, routing to dlq");
                    let key = msg.partition_key().unwrap_or("");
                    if let Err(publish_err) =
                        dlq.publish(crate::topics::TOPIC_DLQ, key, &msg.payload, None).await
                    {
                        tracing::error!(error = %publish_err, "failed to publish to dlq");
                    }
                    return;
                }
            }
        }
    }
}
