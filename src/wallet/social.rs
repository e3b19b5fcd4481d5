// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Social-login session driver.
//!
//! The hosted provider authenticates the user and hands back a
//! deterministic private key. [`SocialLoginSession`] walks the provider
//! through initialize, connect and logout, and keeps a
//! [`SocialLoginState`] snapshot for the resolver. Failures are recorded in
//! the snapshot's `error` as well as returned.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{SocialAccount, SocialLoginState, WalletError};

/// Profile details reported by the provider after login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialUserInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub verifier: Option<String>,
}

/// Hosted social-login service.
#[async_trait]
pub trait SocialLoginProvider: Send + Sync {
    async fn init(&self) -> Result<(), WalletError>;

    /// Run the login flow and return the user's hex-encoded private key.
    async fn connect(&self) -> Result<String, WalletError>;

    async fn user_info(&self) -> Result<SocialUserInfo, WalletError>;

    async fn logout(&self) -> Result<(), WalletError>;
}

pub struct SocialLoginSession<P> {
    provider: P,
    initialized: bool,
    state: SocialLoginState,
    user: Option<SocialUserInfo>,
}

impl<P: SocialLoginProvider> SocialLoginSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            initialized: false,
            state: SocialLoginState::default(),
            user: None,
        }
    }

    pub fn state(&self) -> &SocialLoginState {
        &self.state
    }

    pub fn user_info(&self) -> Option<&SocialUserInfo> {
        self.user.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub async fn initialize(&mut self) -> Result<(), WalletError> {
        self.state.loading = true;
        let result = self.provider.init().await;
        self.state.loading = false;

        match result {
            Ok(()) => {
                self.initialized = true;
                self.state.error = None;
                debug!("Social login provider initialized");
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Log in and derive the account. Profile lookup is best effort.
    pub async fn connect(&mut self) -> Result<SocialAccount, WalletError> {
        if !self.initialized {
            return Err(self.record(WalletError::NotInitialized));
        }

        self.state.loading = true;
        let result = self.derive_account().await;
        self.state.loading = false;

        let account = match result {
            Ok(account) => account,
            Err(e) => return Err(self.record(e)),
        };

        self.user = match self.provider.user_info().await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Social login user info unavailable");
                None
            }
        };

        info!(address = %account.address, "Social login connected");
        self.state.connected = true;
        self.state.account = Some(account.clone());
        self.state.error = None;
        Ok(account)
    }

    /// Log out. Local session state is cleared even when the provider fails.
    pub async fn logout(&mut self) -> Result<(), WalletError> {
        if !self.initialized {
            return Err(self.record(WalletError::NotInitialized));
        }
        if !self.state.connected {
            return Err(self.record(WalletError::NotConnected));
        }

        let result = self.provider.logout().await;
        self.state.connected = false;
        self.state.account = None;
        self.user = None;

        match result {
            Ok(()) => {
                self.state.error = None;
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    async fn derive_account(&self) -> Result<SocialAccount, WalletError> {
        let private_key = self.provider.connect().await?;
        SocialAccount::from_private_key_hex(&private_key)
    }

    fn record(&mut self, error: WalletError) -> WalletError {
        self.state.error = Some(error.to_string());
        error
    }
}
