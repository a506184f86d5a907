use chrono::Utc;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::{ErrorKind, QuarryError, QuarryResult};

const OBJECT_ID_BYTES: usize = 12;
const OBJECT_ID_HEX_LEN: usize = 24;

// Per-process counter for the trailing id bytes, seeded randomly so ids from
// different processes do not collide on the same second.
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>()));

/// An opaque document identifier.
///
/// Criteria documents carry a set of field names whose string values should
/// be converted to this type. An `ObjectId` is a 12-byte value with a
/// 24-character hexadecimal string form:
///
/// - 4 bytes: seconds since the Unix epoch, big-endian
/// - 5 bytes: per-process random value
/// - 3 bytes: incrementing counter, big-endian
///
/// # Conversion
///
/// [`ObjectId::parse_str`] is strict and returns an error for anything that
/// is not exactly 24 hex characters. The crate-level
/// [`to_object_id`](crate::to_object_id) helper wraps it with the lenient
/// behavior normalization wants: a string that fails to parse is passed
/// through unchanged rather than rejected.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::criteria::ObjectId;
///
/// let id = ObjectId::new();
/// let same = ObjectId::parse_str(&id.to_hex())?;
/// assert_eq!(id, same);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_BYTES],
}

impl ObjectId {
    /// Generates a new unique `ObjectId` from the current timestamp, the
    /// per-process random value, and the counter.
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let random: u64 = rand::random();
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&random.to_be_bytes()[..5]);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        ObjectId { bytes }
    }

    /// Creates an `ObjectId` from raw bytes.
    pub fn from_bytes(bytes: [u8; OBJECT_ID_BYTES]) -> Self {
        ObjectId { bytes }
    }

    /// Parses an `ObjectId` from its 24-character hexadecimal string form.
    ///
    /// # Arguments
    ///
    /// * `input` - The candidate identifier string
    ///
    /// # Returns
    ///
    /// `Ok(ObjectId)` if the string is exactly 24 hex characters, or an
    /// `ErrorKind::InvalidId` error otherwise.
    pub fn parse_str(input: &str) -> QuarryResult<ObjectId> {
        if input.len() != OBJECT_ID_HEX_LEN || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::debug!("Value is not a valid object id string: {:?}", input);
            return Err(QuarryError::new(
                &format!(
                    "ObjectId validation error: expected {} hex characters, got {:?}",
                    OBJECT_ID_HEX_LEN, input
                ),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &input[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)?;
        }
        Ok(ObjectId { bytes })
    }

    /// The 24-character lowercase hexadecimal form of this id.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_HEX_LEN);
        for byte in &self.bytes {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    /// The raw bytes of this id.
    pub fn bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.bytes
    }

    /// The seconds-since-epoch stamp encoded in the first four bytes.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}
