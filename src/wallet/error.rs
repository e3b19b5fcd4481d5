// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet adapter errors.
//!
//! These never cross an HTTP boundary; the resolver surfaces them to the UI
//! layer as strings.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("invalid Algorand address: {0}")]
    InvalidAddress(String),

    #[error("signing key does not belong to {0}")]
    AddressMismatch(String),

    #[error("transaction index {index} is out of range for a group of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("transaction {0} is not an encoded transaction")]
    InvalidTransaction(usize),

    #[error("social login is not initialized")]
    NotInitialized,

    #[error("social login is not connected")]
    NotConnected,

    #[error("social login provider error: {0}")]
    Provider(String),

    #[error("wallet rejected signing: {0}")]
    Rejected(String),
}
