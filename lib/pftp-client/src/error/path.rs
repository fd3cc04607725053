/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::FtpCommandError;

/// Errors of commands that take a remote path, like CWD and MKD.
#[derive(Debug, Error)]
pub enum FtpPathError {
    #[error("{0}")]
    Command(FtpCommandError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("path unavailable")]
    PathUnavailable,
}
