/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{FtpCommandError, FtpRawResponseError};
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpTransferSetupError {
    #[error("{0}")]
    Command(FtpCommandError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("server supports neither EPSV nor PASV")]
    PassiveModeUnavailable,
    #[error("data connect: {0}")]
    DataConnectFailed(String),
    #[error("data connect timed out")]
    DataConnectTimedOut,
}

/// Failures reported in the end reply of a data transfer.
#[derive(Debug, Error)]
pub enum FtpTransferServerError {
    #[error("{0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("server asks for a restart marker")]
    RestartNeeded,
    #[error("server could not open the data connection")]
    DataTransferNotEstablished,
    #[error("data connection closed, transfer aborted")]
    DataTransferLost,
    #[error("local error on server")]
    ServerFailed,
    #[error("unknown page type")]
    PageTypeUnknown,
    #[error("storage allocation exceeded")]
    ExceededStorageAllocation,
    #[error("unexpected end reply {1} to {0}")]
    UnexpectedEndReplyCode(FtpCommand, u16),
}

#[derive(Debug, Error)]
pub enum FtpLineDataReadError {
    #[error("data read: {0:?}")]
    ReadFailed(#[from] io::Error),
    #[error("line is not valid utf-8")]
    UnsupportedEncoding,
    #[error("line {0} is too long")]
    LineTooLong(usize),
    #[error("more than {0} entries")]
    TooManyEntries(usize),
    #[error("aborted by callback")]
    AbortedByCallback,
}
