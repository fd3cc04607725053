/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("login required")]
    NotLoggedIn,
    #[error("failed to send command: {0:?}")]
    SendFailed(io::Error),
    #[error("failed to read reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("server rejected the syntax of {0}")]
    RejectedCommandSyntax(FtpCommand),
    #[error("server does not implement {0}")]
    CommandNotImplemented(FtpCommand),
    #[error("server does not implement the parameter of {0}")]
    ParameterNotImplemented(FtpCommand),
    #[error("unexpected reply {1} to {0}")]
    UnexpectedReplyCode(FtpCommand, u16),
    #[error("malformed reply {1} to {0}")]
    InvalidReplySyntax(FtpCommand, u16),
    #[error("{0} sent out of sequence")]
    BadCommandSequence(FtpCommand),
}

impl FtpCommandError {
    /// The server does not support the command, or the given parameter of it.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            FtpCommandError::RejectedCommandSyntax(_)
                | FtpCommandError::CommandNotImplemented(_)
                | FtpCommandError::ParameterNotImplemented(_)
        )
    }
}
