//! Ordering group and deduplication id derivation for FIFO hops.

use sha2::{Digest, Sha256};

use crate::error::RelayError;
use crate::record::InboundRecord;

/// Ordering group used when the source did not attach one.
pub const FALLBACK_ORDERING_GROUP: &str = "default";

/// What each side of the hop expects from the ordering context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    /// The source queue is FIFO and manages its own deduplication.
    pub source_ordered: bool,
    /// The destination is FIFO and requires a group and a dedup id.
    pub destination_ordered: bool,
}

/// Ordering attributes to send along with a forwarded message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingContext {
    pub ordering_group: String,
    pub dedup_key: Option<String>,
}

/// Derives the ordering context for `record`.
///
/// Transport-attached attributes always win. A dedup id is only synthesized
/// when the destination needs one and the source is not FIFO; a FIFO source
/// without a dedup attribute relies on content-based deduplication, so no
/// key is invented for it.
///
/// The synthesized key is a digest of the message id, never of the body:
/// redelivering the same record produces the same key and collapses into a
/// single acceptance at the destination.
pub fn derive_context(
    record: &InboundRecord,
    policy: OrderingPolicy,
) -> Result<OrderingContext, RelayError> {
    if record.id.is_empty() {
        return Err(RelayError::MissingIdentifier);
    }

    let ordering_group = record
        .ordering_group
        .clone()
        .unwrap_or_else(|| FALLBACK_ORDERING_GROUP.to_string());

    let dedup_key = match &record.dedup_key {
        Some(key) => Some(key.clone()),
        None if policy.destination_ordered && !policy.source_ordered => {
            Some(dedup_digest(&record.id))
        }
        None => None,
    };

    Ok(OrderingContext {
        ordering_group,
        dedup_key,
    })
}

/// Lowercase hex SHA-256 of a message id.
pub fn dedup_digest(id: &str) -> String {
    hex::encode(Sha256::digest(id.as_bytes()))
}
