/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::FtpCommandError;

/// Outcome of a single USER or PASS command.
pub(crate) enum FtpAuthStatus {
    LoggedIn,
    NeedPassword,
    NeedAccount,
    NotLoggedIn,
}

#[derive(Debug, Error)]
pub enum FtpLoginError {
    #[error("login command failed: {0}")]
    Command(FtpCommandError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("user or password rejected")]
    NotLoggedIn,
    #[error("an account is required")]
    AccountNeeded,
}
