// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolution of the single active wallet from two upstream sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{SecretKeySigner, Signer, SocialAccount};

/// Snapshot of the social-login session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialLoginState {
    pub connected: bool,
    pub account: Option<SocialAccount>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Snapshot of the browser-extension wallet session.
#[derive(Clone, Default)]
pub struct BrowserWalletState {
    pub active_address: Option<String>,
    pub transaction_signer: Option<Signer>,
    pub loading: bool,
    pub error: Option<String>,
}

impl std::fmt::Debug for BrowserWalletState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserWalletState")
            .field("active_address", &self.active_address)
            .field("has_signer", &self.transaction_signer.is_some())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletSource {
    None,
    Social,
    Traditional,
}

/// The one active wallet, if any.
#[derive(Clone)]
pub enum ActiveWallet {
    None,
    Social {
        account: SocialAccount,
    },
    Traditional {
        address: String,
        signer: Option<Signer>,
    },
}

impl std::fmt::Debug for ActiveWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveWallet::None => f.write_str("None"),
            ActiveWallet::Social { account } => f
                .debug_struct("Social")
                .field("address", &account.address)
                .finish(),
            ActiveWallet::Traditional { address, signer } => f
                .debug_struct("Traditional")
                .field("address", address)
                .field("has_signer", &signer.is_some())
                .finish(),
        }
    }
}

/// Result of [`resolve`]: the active wallet plus the status worth showing.
#[derive(Debug, Clone)]
pub struct ResolvedWallet {
    pub active: ActiveWallet,
    pub loading: bool,
    pub error: Option<String>,
}

impl ResolvedWallet {
    pub fn address(&self) -> Option<&str> {
        match &self.active {
            ActiveWallet::None => None,
            ActiveWallet::Social { account } => Some(account.address.as_str()),
            ActiveWallet::Traditional { address, .. } => Some(address.as_str()),
        }
    }

    /// The signer for the active account.
    ///
    /// For social accounts a fresh signer is built over the key material on
    /// every call; nothing is cached.
    pub fn signer(&self) -> Option<Signer> {
        match &self.active {
            ActiveWallet::None => None,
            ActiveWallet::Social { account } => Some(Arc::new(SecretKeySigner::new(
                account.address.clone(),
                account.secret_key.clone(),
            ))),
            ActiveWallet::Traditional { signer, .. } => signer.clone(),
        }
    }

    pub fn source(&self) -> WalletSource {
        match &self.active {
            ActiveWallet::None => WalletSource::None,
            ActiveWallet::Social { .. } => WalletSource::Social,
            ActiveWallet::Traditional { .. } => WalletSource::Traditional,
        }
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self.active, ActiveWallet::None)
    }
}

/// Pick the active wallet. Pure; call again whenever either input changes.
///
/// A connected social session with a derived account always wins, even if
/// a browser wallet is also connected. With no account on either side, the
/// status comes from whichever provider reports it.
pub fn resolve(social: &SocialLoginState, browser: &BrowserWalletState) -> ResolvedWallet {
    if social.connected {
        if let Some(account) = &social.account {
            return ResolvedWallet {
                active: ActiveWallet::Social {
                    account: account.clone(),
                },
                loading: social.loading,
                error: social.error.clone(),
            };
        }
    }

    if let Some(address) = browser
        .active_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
    {
        return ResolvedWallet {
            active: ActiveWallet::Traditional {
                address: address.to_string(),
                signer: browser.transaction_signer.clone(),
            },
            loading: browser.loading,
            error: browser.error.clone(),
        };
    }

    ResolvedWallet {
        active: ActiveWallet::None,
        loading: social.loading || browser.loading,
        error: social.error.clone().or_else(|| browser.error.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{account::tests::hex, account::tests::RFC8032_SEED, TransactionSigner, WalletError};
    use async_trait::async_trait;

    const BROWSER_ADDRESS: &str = "BROWSERWALLETADDRESS";

    struct EchoSigner;

    #[async_trait]
    impl TransactionSigner for EchoSigner {
        async fn sign_transactions(
            &self,
            group: &[Vec<u8>],
            indexes: &[usize],
        ) -> Result<Vec<Vec<u8>>, WalletError> {
            Ok(indexes.iter().map(|&i| group[i].clone()).collect())
        }
    }

    fn social_connected() -> SocialLoginState {
        SocialLoginState {
            connected: true,
            account: Some(SocialAccount::from_key_material(hex(RFC8032_SEED)).unwrap()),
            loading: false,
            error: None,
        }
    }

    fn browser_connected() -> BrowserWalletState {
        BrowserWalletState {
            active_address: Some(BROWSER_ADDRESS.into()),
            transaction_signer: Some(Arc::new(EchoSigner)),
            loading: false,
            error: None,
        }
    }

    #[test]
    fn social_wins_over_browser_wallet() {
        let social = social_connected();
        let resolved = resolve(&social, &browser_connected());

        let expected = social.account.as_ref().unwrap().address.as_str();
        assert_eq!(resolved.address(), Some(expected));
        assert_ne!(resolved.address(), Some(BROWSER_ADDRESS));
        assert_eq!(resolved.source(), WalletSource::Social);
        assert!(resolved.signer().is_some());
    }

    #[test]
    fn browser_wallet_used_when_social_disconnected() {
        let mut social = social_connected();
        social.connected = false;

        let resolved = resolve(&social, &browser_connected());
        assert_eq!(resolved.address(), Some(BROWSER_ADDRESS));
        assert_eq!(resolved.source(), WalletSource::Traditional);
        assert!(resolved.signer().is_some());
    }

    #[test]
    fn connected_social_without_account_defers_to_browser() {
        let social = SocialLoginState {
            connected: true,
            ..Default::default()
        };
        let resolved = resolve(&social, &browser_connected());
        assert_eq!(resolved.source(), WalletSource::Traditional);
    }

    #[test]
    fn nothing_connected_resolves_to_none() {
        let resolved = resolve(&SocialLoginState::default(), &BrowserWalletState::default());
        assert_eq!(resolved.address(), None);
        assert!(resolved.signer().is_none());
        assert_eq!(resolved.source(), WalletSource::None);
        assert!(!resolved.is_connected());
        assert!(!resolved.loading);
        assert_eq!(resolved.error, None);
    }

    #[test]
    fn blank_browser_address_counts_as_disconnected() {
        let browser = BrowserWalletState {
            active_address: Some("  ".into()),
            ..Default::default()
        };
        let resolved = resolve(&SocialLoginState::default(), &browser);
        assert_eq!(resolved.source(), WalletSource::None);
    }

    #[test]
    fn status_comes_from_selected_branch() {
        let mut social = social_connected();
        social.error = Some("social warning".into());
        let mut browser = browser_connected();
        browser.error = Some("browser failure".into());
        browser.loading = true;

        let resolved = resolve(&social, &browser);
        assert_eq!(resolved.error.as_deref(), Some("social warning"));
        assert!(!resolved.loading);

        social.connected = false;
        let resolved = resolve(&social, &browser);
        assert_eq!(resolved.error.as_deref(), Some("browser failure"));
        assert!(resolved.loading);
    }

    #[test]
    fn no_account_reports_the_provider_that_failed() {
        let browser = BrowserWalletState {
            error: Some("extension not installed".into()),
            ..Default::default()
        };
        let resolved = resolve(&SocialLoginState::default(), &browser);
        assert_eq!(resolved.error.as_deref(), Some("extension not installed"));

        let social = SocialLoginState {
            loading: true,
            ..Default::default()
        };
        let resolved = resolve(&social, &BrowserWalletState::default());
        assert!(resolved.loading);
    }

    #[tokio::test]
    async fn social_signer_fails_only_when_used() {
        let address = SocialAccount::from_key_material(hex(RFC8032_SEED))
            .unwrap()
            .address;
        let social = SocialLoginState {
            connected: true,
            account: Some(SocialAccount::new(address, vec![1u8, 2, 3])),
            ..Default::default()
        };

        let resolved = resolve(&social, &BrowserWalletState::default());
        assert_eq!(resolved.source(), WalletSource::Social);
        assert_eq!(resolved.error, None);

        let signer = resolved.signer().unwrap();
        let err = signer
            .sign_transactions(&[vec![0x80]], &[0])
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidKeyMaterial(_)));
    }

    #[tokio::test]
    async fn traditional_signer_is_passed_through() {
        let resolved = resolve(&SocialLoginState::default(), &browser_connected());
        let signed = resolved
            .signer()
            .unwrap()
            .sign_transactions(&[vec![1], vec![2]], &[1])
            .await
            .unwrap();
        assert_eq!(signed, vec![vec![2]]);
    }
}
