//! Reserved topic, event-type, and consumer-group names (§6).

pub const TOPIC_PAYMENT_CREATED: &str = "aegis.payment.created";
pub const TOPIC_WEBHOOK_PENDING: &str = "aegis.webhook.pending";
pub const TOPIC_BALANCE_UPDATE: &str = "aegis.balance.update";
pub const TOPIC_PAYOUT_PENDING: &str = "aegis.payout.pending";
pub const TOPIC_PAYOUT_STATUS_UPDATE: &str = "aegis.payout.status.update";
pub const TOPIC_RECONCILIATION_JOB: &str = "aegis.reconciliation.job";
pub const TOPIC_DISCREPANCY_DETECTED: &str = "aegis.discrepancy.detected";
pub const TOPIC_DLQ: &str = "aegis.dlq";

pub const GROUP_TRANSACTION_WORKER: &str = "aegis.transaction.worker";
pub const GROUP_WEBHOOK_WORKER: &str = "aegis.webhook.worker";
pub const GROUP_BALANCE_WORKER: &str = "aegis.balance.worker";
pub const GROUP_SETTLEMENT_WORKER: &str = "aegis.settlement.worker";
pub const GROUP_PAYOUT_WORKER: &str = "aegis.payout.worker";
pub const GROUP_RECONCILIATION_WORKER: &str = "aegis.reconciliation.worker";

/// Resolve the outbox's `event_type` column to the topic the relay publishes it on (§4.3 step 3).
///
/// The source this is ported from only wired `payment.created` and `webhook.received`; the
/// `ledger.entry.created → balance.update` route that the balance worker depends on was missing
/// there (§9 open question) and is added here so the pipeline is actually connected end to end.
/// Unknown event types route to the DLQ topic rather than being silently dropped.
pub fn topic_for_event_type(event_type: &str) -> &'static str {
    match event_type {
        aegis_types::event_types::PAYMENT_CREATED => TOPIC_PAYMENT_CREATED,
        aegis_types::event_types::WEBHOOK_RECEIVED => TOPIC_WEBHOOK_PENDING,
        aegis_types::event_types::LEDGER_ENTRY_CREATED => TOPIC_BALANCE_UPDATE,
        _ => TOPIC_DLQ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_entry_created_routes_to_balance_update() {
        assert_eq!(
            topic_for_event_type(aegis_types::event_types::LEDGER_ENTRY_CREATED),
            TOPIC_BALANCE_UPDATE
        );
    }

    #[test]
    fn unknown_event_type_routes_to_dlq() {
        assert_eq!(topic_for_event_type("unknown.event"), TOPIC_DLQ);
    }
}
