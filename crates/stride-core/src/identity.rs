//! Stable identity derivation: legacy document id → target-store key.
//!
//! Pure and deterministic, so independent backfill runs and independent
//! validation runs agree on "the same record" without a lookup table.

use uuid::Uuid;

/// Derive the target-store identifier for a legacy record.
///
/// Hashes `"{namespace}:legacy:{legacy_id}"` with BLAKE3, takes the
/// first 16 bytes, and stamps UUID version/variant marker bits so the
/// result has the textual shape of a standard UUID (lowercase,
/// hyphenated 8-4-4-4-12). It is NOT an RFC 4122 v5 UUID — the markers
/// only keep the output consistent with the target store's TEXT
/// primary-key columns.
///
/// The namespace prefix keeps identical legacy ids from colliding
/// across entity types.
pub fn derive_target_id(namespace: &str, legacy_id: &str) -> String {
    let digest = blake3::hash(format!("{namespace}:legacy:{legacy_id}").as_bytes());

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest.as_bytes()[..16]);
    bytes[6] = (bytes[6] & 0x0f) | 0x50;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes).hyphenated().to_string()
}
