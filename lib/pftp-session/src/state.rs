/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// Lifecycle of a [`FtpSession`](crate::FtpSession).
///
/// ```text
/// Unconnected --login--> Connected --quit--> Closed
///      |                     |
///      +--login failed--> Failed <--control connection broken
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpSessionState {
    Unconnected,
    Connected,
    Failed,
    Closed,
}

impl FtpSessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpSessionState::Unconnected => "unconnected",
            FtpSessionState::Connected => "connected",
            FtpSessionState::Failed => "failed",
            FtpSessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for FtpSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
