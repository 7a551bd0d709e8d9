//! Deferred submissions and the pending-queue file format.
//!
//! The queue file is a single blob that is always replaced as a unit:
//!
//! ```text
//! +--------------------+
//! | Magic: "QZQ\x01"   | 4 bytes - file identification
//! +--------------------+
//! | Version: 1         | 4 bytes - u32 little-endian format version
//! +--------------------+
//! | Count: N           | 4 bytes - u32 little-endian record count
//! +--------------------+
//! | Len | Record       | N times: u32 LE length + MessagePack map
//! +--------------------+
//! ```
//!
//! Records are MessagePack maps keyed by field name, so fields added in a
//! later version are ignored by older readers and defaulted by newer ones.
//! Any truncation or trailing garbage is rejected as a whole.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CodecError, CorrelationId, OutboundRequest, Question};

/// Magic bytes identifying a pending-queue file.
pub const QUEUE_MAGIC: [u8; 4] = *b"QZQ\x01";

/// Current pending-queue format version.
pub const QUEUE_FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 12;

/// A submission waiting to be delivered to the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
    /// Token identifying this submission across restarts.
    pub correlation: CorrelationId,
    /// The exact request to replay.
    pub request: OutboundRequest,
    /// Unix timestamp (seconds) when the submission was queued.
    #[serde(default)]
    pub enqueued_at: u64,
}

impl PendingSubmission {
    /// Wrap a request for deferred delivery.
    pub fn new(request: OutboundRequest) -> Self {
        Self {
            correlation: CorrelationId::new(),
            request,
            enqueued_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// The question carried in the request body.
    pub fn question(&self) -> Result<Question, CodecError> {
        let body = self
            .request
            .body
            .as_deref()
            .ok_or_else(|| CodecError::InvalidFormat("submission has no body".into()))?;
        Question::from_json(body)
    }
}

/// Encode a whole queue into the on-disk format.
pub fn encode_queue(records: &[PendingSubmission]) -> Result<Vec<u8>, CodecError> {
    let count = u32::try_from(records.len())
        .map_err(|_| CodecError::InvalidFormat("too many records".into()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + records.len() * 256);
    output.extend_from_slice(&QUEUE_MAGIC);
    output.extend_from_slice(&QUEUE_FORMAT_VERSION.to_le_bytes());
    output.extend_from_slice(&count.to_le_bytes());

    for record in records {
        let bytes = rmp_serde::to_vec_named(record).map_err(CodecError::Serialization)?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| CodecError::InvalidFormat("record too large".into()))?;
        output.extend_from_slice(&len.to_le_bytes());
        output.extend_from_slice(&bytes);
    }

    Ok(output)
}

/// Decode a queue previously written by [`encode_queue`].
pub fn decode_queue(bytes: &[u8]) -> Result<Vec<PendingSubmission>, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::InvalidFormat("file too small".into()));
    }
    if bytes[0..4] != QUEUE_MAGIC {
        return Err(CodecError::InvalidFormat(
            "not a pending-queue file (invalid magic bytes)".into(),
        ));
    }

    let version = read_u32(bytes, 4)?;
    if version == 0 || version > QUEUE_FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            max_supported: QUEUE_FORMAT_VERSION,
        });
    }

    let count = read_u32(bytes, 8)? as usize;
    let mut records = Vec::with_capacity(count.min(1024));
    let mut offset = HEADER_LEN;

    for index in 0..count {
        let len = read_u32(bytes, offset)? as usize;
        offset += 4;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| CodecError::InvalidFormat(format!("record {index} truncated")))?;
        let record: PendingSubmission =
            rmp_serde::from_slice(&bytes[offset..end]).map_err(CodecError::Deserialization)?;
        records.push(record);
        offset = end;
    }

    if offset != bytes.len() {
        return Err(CodecError::InvalidFormat(format!(
            "{} trailing bytes after {count} records",
            bytes.len() - offset
        )));
    }

    Ok(records)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, CodecError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| CodecError::InvalidFormat(format!("truncated at byte {offset}")))
}
