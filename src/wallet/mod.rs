// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Unified Wallet Adapter
//!
//! One account/signer contract over two mutually exclusive backends:
//!
//! - a social-login session, whose provider derives an Ed25519 key for the
//!   user ([`SocialLoginSession`]);
//! - a browser extension wallet, which exposes an address and its own
//!   signer.
//!
//! [`resolve`] is a pure function over snapshots of both sessions. A
//! connected social account always takes precedence, so two accounts are
//! never active at once.

pub mod account;
pub mod error;
pub mod resolver;
pub mod signer;
pub mod social;

pub use account::{AlgorandAddress, KeyMaterial, SocialAccount};
pub use error::WalletError;
pub use resolver::{
    resolve, ActiveWallet, BrowserWalletState, ResolvedWallet, SocialLoginState, WalletSource,
};
pub use signer::{SecretKeySigner, Signer, TransactionSigner};
pub use social::{SocialLoginProvider, SocialLoginSession, SocialUserInfo};
