// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ASA Mint Relay - IPFS pinning relay and unified wallet adapter
//!
//! This crate backs a minting front end for Algorand Standard Assets. It
//! relays image and metadata uploads to Pinata so credentials never reach
//! the browser, and exposes one wallet contract over social-login keys and
//! browser extension wallets.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `pinning` - Pinata client and the image-then-metadata pin flow
//! - `wallet` - Active wallet resolution and secret-key signing

pub mod api;
pub mod config;
pub mod error;
pub mod pinning;
pub mod state;
pub mod wallet;
