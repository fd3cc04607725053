/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

pub const FTP_DEFAULT_PORT: u16 = 21;

/// Host and port of an ftp endpoint, either the control server or a
/// passive data port announced by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpServerAddr {
    host: String,
    port: u16,
}

impl FtpServerAddr {
    pub fn new(host: &str, port: u16) -> Self {
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        FtpServerAddr {
            host: host.to_string(),
            port,
        }
    }

    /// Use the default ftp port if none is given in `s`.
    pub fn parse_with_default_port(s: &str) -> Self {
        if let Some(v6) = s.strip_prefix('[') {
            if let Some((host, tail)) = v6.split_once(']') {
                let port = tail
                    .strip_prefix(':')
                    .and_then(|p| u16::from_str(p).ok())
                    .unwrap_or(FTP_DEFAULT_PORT);
                return FtpServerAddr::new(host, port);
            }
        }
        if IpAddr::from_str(s).is_ok() {
            // bare ipv6 address without brackets
            return FtpServerAddr::new(s, FTP_DEFAULT_PORT);
        }
        match s.rsplit_once(':') {
            Some((host, port)) => match u16::from_str(port) {
                Ok(port) => FtpServerAddr::new(host, port),
                Err(_) => FtpServerAddr::new(s, FTP_DEFAULT_PORT),
            },
            None => FtpServerAddr::new(s, FTP_DEFAULT_PORT),
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub(crate) fn with_port(&self, port: u16) -> Self {
        FtpServerAddr {
            host: self.host.clone(),
            port,
        }
    }
}

impl fmt::Display for FtpServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
