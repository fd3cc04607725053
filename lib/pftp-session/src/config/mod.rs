/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use pftp_client::{FtpClientConfig, FtpServerAddr};

#[cfg(feature = "yaml")]
mod yaml;

/// Connection parameters of a session.
///
/// Anonymous login is used when no username is set.
#[derive(Clone, PartialEq, Eq)]
pub struct FtpSessionConfig {
    pub server: FtpServerAddr,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client: FtpClientConfig,
}

impl FtpSessionConfig {
    /// `host` may carry a port, the default ftp port is used if not.
    pub fn new(host: &str) -> Self {
        FtpSessionConfig {
            server: FtpServerAddr::parse_with_default_port(host),
            username: None,
            password: None,
            client: FtpClientConfig::default(),
        }
    }

    pub fn set_credential(&mut self, username: Option<&str>, password: Option<&str>) {
        self.username = username.map(|s| s.to_string());
        self.password = password.map(|s| s.to_string());
    }
}

impl fmt::Debug for FtpSessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpSessionConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("client", &self.client)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        let config = FtpSessionConfig::new("ftp.example.com");
        assert_eq!(config.server.host(), "ftp.example.com");
        assert_eq!(config.server.port(), 21);

        let config = FtpSessionConfig::new("127.0.0.1:2121");
        assert_eq!(config.server.host(), "127.0.0.1");
        assert_eq!(config.server.port(), 2121);
    }

    #[test]
    fn debug_masks_password() {
        let mut config = FtpSessionConfig::new("ftp.example.com");
        config.set_credential(Some("alice"), Some("secret"));
        let s = format!("{config:?}");
        assert!(s.contains("alice"));
        assert!(!s.contains("secret"));
    }
}
