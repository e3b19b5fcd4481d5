// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`RelayConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `PINATA_JWT` | Pinata bearer token (preferred) | - |
//! | `PINATA_API_KEY` | Pinata API key (with secret) | - |
//! | `PINATA_SECRET_API_KEY` | Pinata API secret | - |
//! | `PINATA_API_BASE_URL` | Pinata API root | `https://api.pinata.cloud` |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS allow-list | `http://localhost:5173,http://localhost:3000` |
//! | `FRONTEND_ORIGIN` | Frontend origin, appended to the allow-list | - |
//! | `HOSTED_ORIGIN_SUFFIX` | Hosting domain whose subdomains are allowed | `vercel.app` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | - |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf};

use crate::{api::cors::normalize_origin, pinning::PinataAuth};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PINATA_JWT_ENV: &str = "PINATA_JWT";
pub const PINATA_API_KEY_ENV: &str = "PINATA_API_KEY";
pub const PINATA_SECRET_API_KEY_ENV: &str = "PINATA_SECRET_API_KEY";
pub const PINATA_API_BASE_URL_ENV: &str = "PINATA_API_BASE_URL";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const FRONTEND_ORIGIN_ENV: &str = "FRONTEND_ORIGIN";
pub const HOSTED_ORIGIN_SUFFIX_ENV: &str = "HOSTED_ORIGIN_SUFFIX";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PINATA_API_BASE_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
pub const DEFAULT_HOSTED_ORIGIN_SUFFIX: &str = "vercel.app";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Pinata credentials missing: set PINATA_JWT or PINATA_API_KEY and PINATA_SECRET_API_KEY")]
    MissingPinataCredentials,

    #[error("{name} is set but {missing} is not")]
    IncompletePair {
        name: &'static str,
        missing: &'static str,
    },

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// PEM certificate and key used when serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the relay reads from the environment.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub pinata_auth: PinataAuth,
    pub pinata_api_base_url: String,
    pub allowed_origins: Vec<String>,
    pub hosted_origin_suffix: Option<String>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let pinata_auth = pinata_auth(
            get(PINATA_JWT_ENV),
            get(PINATA_API_KEY_ENV),
            get(PINATA_SECRET_API_KEY_ENV),
        )?;
        let pinata_api_base_url = get(PINATA_API_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_PINATA_API_BASE_URL.to_string());
        url::Url::parse(&pinata_api_base_url).map_err(|e| ConfigError::InvalidValue {
            name: PINATA_API_BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let mut allowed_origins = parse_origin_list(
            &get(ALLOWED_ORIGINS_ENV).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );
        if let Some(frontend) = get(FRONTEND_ORIGIN_ENV) {
            let frontend = normalize_origin(&frontend);
            if !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }

        let hosted_origin_suffix = match lookup(HOSTED_ORIGIN_SUFFIX_ENV) {
            // Explicitly empty disables the hosted-subdomain rule.
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().trim_start_matches('.').to_ascii_lowercase()),
            None => Some(DEFAULT_HOSTED_ORIGIN_SUFFIX.to_string()),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompletePair {
                    name: TLS_CERT_PATH_ENV,
                    missing: TLS_KEY_PATH_ENV,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompletePair {
                    name: TLS_KEY_PATH_ENV,
                    missing: TLS_CERT_PATH_ENV,
                })
            }
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr,
            pinata_auth,
            pinata_api_base_url,
            allowed_origins,
            hosted_origin_suffix,
            tls,
            log_format,
        })
    }
}

fn pinata_auth(
    jwt: Option<String>,
    api_key: Option<String>,
    secret: Option<String>,
) -> Result<PinataAuth, ConfigError> {
    if let Some(token) = jwt {
        return Ok(PinataAuth::Jwt(token));
    }
    match (api_key, secret) {
        (Some(api_key), Some(secret_api_key)) => Ok(PinataAuth::KeyPair {
            api_key,
            secret_api_key,
        }),
        (Some(_), None) => Err(ConfigError::IncompletePair {
            name: PINATA_API_KEY_ENV,
            missing: PINATA_SECRET_API_KEY_ENV,
        }),
        (None, Some(_)) => Err(ConfigError::IncompletePair {
            name: PINATA_SECRET_API_KEY_ENV,
            missing: PINATA_API_KEY_ENV,
        }),
        (None, None) => Err(ConfigError::MissingPinataCredentials),
    }
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        let origin = normalize_origin(origin);
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
