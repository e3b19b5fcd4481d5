// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing capability shared by both wallet backends.

use std::sync::Arc;

use async_trait::async_trait;
use ring::signature::KeyPair;

use super::{AlgorandAddress, KeyMaterial, WalletError};

/// Domain separation prefix Algorand prepends to transactions before signing.
const TX_TAG: &[u8] = b"TX";

/// Signs selected members of a transaction group.
///
/// `group` holds canonical msgpack encodings of unsigned transactions;
/// the result holds one signed transaction per entry in `indexes`, in the
/// same order.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transactions(
        &self,
        group: &[Vec<u8>],
        indexes: &[usize],
    ) -> Result<Vec<Vec<u8>>, WalletError>;
}

pub type Signer = Arc<dyn TransactionSigner>;

/// Single-account signer over locally held key material.
///
/// Signing is deterministic and makes no network calls. Key material is
/// only parsed when signing, so bad material surfaces as an error from
/// [`TransactionSigner::sign_transactions`].
#[derive(Debug, Clone)]
pub struct SecretKeySigner {
    address: AlgorandAddress,
    secret_key: KeyMaterial,
}

impl SecretKeySigner {
    pub fn new(address: AlgorandAddress, secret_key: KeyMaterial) -> Self {
        Self {
            address,
            secret_key,
        }
    }

    pub fn address(&self) -> &AlgorandAddress {
        &self.address
    }
}

#[async_trait]
impl TransactionSigner for SecretKeySigner {
    async fn sign_transactions(
        &self,
        group: &[Vec<u8>],
        indexes: &[usize],
    ) -> Result<Vec<Vec<u8>>, WalletError> {
        let key_pair = self.secret_key.key_pair()?;
        if key_pair.public_key().as_ref() != self.address.public_key().as_slice() {
            return Err(WalletError::AddressMismatch(self.address.to_string()));
        }

        indexes
            .iter()
            .map(|&index| {
                let txn = group.get(index).ok_or(WalletError::IndexOutOfRange {
                    index,
                    len: group.len(),
                })?;
                if !is_msgpack_map(txn) {
                    return Err(WalletError::InvalidTransaction(index));
                }

                let mut message = Vec::with_capacity(TX_TAG.len() + txn.len());
                message.extend_from_slice(TX_TAG);
                message.extend_from_slice(txn);
                let signature = key_pair.sign(&message);
                Ok(encode_signed_transaction(signature.as_ref(), txn))
            })
            .collect()
    }
}

fn is_msgpack_map(bytes: &[u8]) -> bool {
    matches!(bytes.first(), Some(0x80..=0x8f | 0xde | 0xdf))
}

/// Canonical msgpack of `{"sig": <64 bytes>, "txn": <transaction map>}`.
///
/// Keys are written in sorted order and the already-canonical transaction
/// is embedded verbatim.
pub fn encode_signed_transaction(signature: &[u8], txn: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + 4 + 2 + signature.len() + 4 + txn.len());
    out.push(0x82); // fixmap, 2 entries
    out.push(0xa3); // fixstr, 3 bytes
    out.extend_from_slice(b"sig");
    out.push(0xc4); // bin 8
    out.push(signature.len() as u8);
    out.extend_from_slice(signature);
    out.push(0xa3);
    out.extend_from_slice(b"txn");
    out.extend_from_slice(txn);
    out
}
