// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Algorand accounts and raw key material.
//!
//! An address is the base32 (unpadded) encoding of the 32-byte Ed25519
//! public key followed by the last 4 bytes of its SHA-512/256 digest.
//! Secret keys come either as the 32-byte seed or as the 64-byte
//! `seed || public_key` form used by the JavaScript SDK.

use data_encoding::{BASE32_NOPAD, HEXLOWER_PERMISSIVE};
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha512_256};

use super::WalletError;

pub const PUBLIC_KEY_LEN: usize = 32;
pub const SEED_LEN: usize = 32;
pub const SECRET_KEY_LEN: usize = 64;
const CHECKSUM_LEN: usize = 4;
const ADDRESS_LEN: usize = 58;

/// A checksummed Algorand address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlgorandAddress(String);

impl AlgorandAddress {
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        let mut bytes = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
        bytes.extend_from_slice(public_key);
        bytes.extend_from_slice(&checksum(public_key));
        Self(BASE32_NOPAD.encode(&bytes))
    }

    /// Parse and validate the checksum of an encoded address.
    pub fn parse(encoded: &str) -> Result<Self, WalletError> {
        let encoded = encoded.trim();
        if encoded.len() != ADDRESS_LEN {
            return Err(WalletError::InvalidAddress(format!(
                "expected {ADDRESS_LEN} characters, got {}",
                encoded.len()
            )));
        }
        let bytes = BASE32_NOPAD
            .decode(encoded.as_bytes())
            .map_err(|e| WalletError::InvalidAddress(e.to_string()))?;
        let (public_key, sum) = bytes.split_at(PUBLIC_KEY_LEN);
        let public_key: [u8; PUBLIC_KEY_LEN] = public_key
            .try_into()
            .map_err(|_| WalletError::InvalidAddress("wrong decoded length".to_string()))?;
        if sum != checksum(&public_key) {
            return Err(WalletError::InvalidAddress("checksum mismatch".to_string()));
        }
        Ok(Self(encoded.to_string()))
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        // Only constructed from valid encodings.
        if let Ok(bytes) = BASE32_NOPAD.decode(self.0.as_bytes()) {
            public_key.copy_from_slice(&bytes[..PUBLIC_KEY_LEN]);
        }
        public_key
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlgorandAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AlgorandAddress> for String {
    fn from(value: AlgorandAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for AlgorandAddress {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

fn checksum(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha512_256::digest(public_key);
    let mut sum = [0u8; CHECKSUM_LEN];
    sum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    sum
}

/// Secret key material as handed over by a wallet backend.
///
/// Kept unparsed until a transaction is signed, so that bad material is
/// reported at use time rather than when the account is resolved.
#[derive(Clone, PartialEq)]
pub enum KeyMaterial {
    Bytes(Vec<u8>),
    /// A JSON numeric array, or the index-keyed object a serialized
    /// `Uint8Array` turns into.
    Json(Value),
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(value: Vec<u8>) -> Self {
        KeyMaterial::Bytes(value)
    }
}

impl From<Value> for KeyMaterial {
    fn from(value: Value) -> Self {
        KeyMaterial::Json(value)
    }
}

impl KeyMaterial {
    /// Coerce to a byte sequence.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WalletError> {
        match self {
            KeyMaterial::Bytes(bytes) => Ok(bytes.clone()),
            KeyMaterial::Json(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| json_byte(i, item))
                .collect(),
            KeyMaterial::Json(Value::Object(map)) => (0..map.len())
                .map(|i| {
                    map.get(&i.to_string())
                        .ok_or_else(|| {
                            WalletError::InvalidKeyMaterial(format!("missing index {i}"))
                        })
                        .and_then(|item| json_byte(i, item))
                })
                .collect(),
            KeyMaterial::Json(other) => Err(WalletError::InvalidKeyMaterial(format!(
                "expected bytes or a numeric array, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Build the Ed25519 key pair, checking the public half of a 64-byte key.
    pub fn key_pair(&self) -> Result<Ed25519KeyPair, WalletError> {
        let bytes = self.to_bytes()?;
        match bytes.len() {
            SEED_LEN => Ed25519KeyPair::from_seed_unchecked(&bytes)
                .map_err(|e| WalletError::InvalidKeyMaterial(e.to_string())),
            SECRET_KEY_LEN => {
                let (seed, public_key) = bytes.split_at(SEED_LEN);
                Ed25519KeyPair::from_seed_and_public_key(seed, public_key).map_err(|e| {
                    WalletError::InvalidKeyMaterial(format!("public key does not match seed: {e}"))
                })
            }
            len => Err(WalletError::InvalidKeyMaterial(format!(
                "expected {SEED_LEN} or {SECRET_KEY_LEN} bytes, got {len}"
            ))),
        }
    }

    /// Address of the account this material controls.
    pub fn address(&self) -> Result<AlgorandAddress, WalletError> {
        let key_pair = self.key_pair()?;
        let public_key: [u8; PUBLIC_KEY_LEN] = key_pair
            .public_key()
            .as_ref()
            .try_into()
            .map_err(|_| WalletError::InvalidKeyMaterial("unexpected public key length".into()))?;
        Ok(AlgorandAddress::from_public_key(&public_key))
    }
}

fn json_byte(index: usize, item: &Value) -> Result<u8, WalletError> {
    item.as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| {
            WalletError::InvalidKeyMaterial(format!("element {index} is not a byte: {item}"))
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Account derived from a social-login session.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialAccount {
    pub address: AlgorandAddress,
    pub secret_key: KeyMaterial,
}

impl SocialAccount {
    /// Pair an address with key material without validating either.
    pub fn new(address: AlgorandAddress, secret_key: impl Into<KeyMaterial>) -> Self {
        Self {
            address,
            secret_key: secret_key.into(),
        }
    }

    /// Derive the account from key material, deriving the address from it.
    pub fn from_key_material(secret_key: impl Into<KeyMaterial>) -> Result<Self, WalletError> {
        let secret_key = secret_key.into();
        let address = secret_key.address()?;
        Ok(Self {
            address,
            secret_key,
        })
    }

    /// Derive the account from the hex private key a social-login provider
    /// hands out, used directly as the Ed25519 seed.
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, WalletError> {
        let hex = private_key.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let seed = HEXLOWER_PERMISSIVE
            .decode(hex.as_bytes())
            .map_err(|e| WalletError::InvalidKeyMaterial(format!("invalid hex: {e}")))?;
        if seed.len() != SEED_LEN {
            return Err(WalletError::InvalidKeyMaterial(format!(
                "expected a {SEED_LEN}-byte private key, got {} bytes",
                seed.len()
            )));
        }
        Self::from_key_material(seed)
    }
}
