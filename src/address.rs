// address.rs

use ripemd160::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte for legacy mainnet pay-to-public-key-hash addresses.
pub const P2PKH_VERSION: u8 = 0x00;

pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

pub fn sha256d(data: &[u8]) -> Vec<u8> {
    let first = sha256(data);
    sha256(&first)
}

/// RIPEMD-160 of the SHA-256 digest of `data`.
pub fn hash160(data: &[u8]) -> Vec<u8> {
    let sha = sha256(data);
    let mut hasher = Ripemd160::new();
    hasher.update(&sha);
    hasher.finalize().to_vec()
}

/// Base58check encoding of `prefix || payload || checksum`, where the checksum
/// is the first four bytes of the double SHA-256 of `prefix || payload`.
pub fn base58check(payload: &[u8], prefix: u8) -> String {
    let mut extended = Vec::with_capacity(1 + payload.len() + 4);
    extended.push(prefix);
    extended.extend_from_slice(payload);

    let checksum = sha256d(&extended);
    extended.extend_from_slice(&checksum[0..4]);

    bs58::encode(extended).into_string()
}

/// Legacy P2PKH address for a serialized public key.
pub fn pubkey_to_p2pkh_address(pubkey: &[u8]) -> String {
    base58check(&hash160(pubkey), P2PKH_VERSION)
}
