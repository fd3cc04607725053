/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpRawResponseError {
    #[error("control read: {0:?}")]
    ReadFailed(io::Error),
    #[error("control connection closed by server")]
    ConnectionClosed,
    #[error("reply line longer than {0} bytes")]
    LineTooLong(usize),
    #[error("malformed reply line")]
    InvalidLineFormat,
    #[error("reply code {0} out of range")]
    InvalidReplyCode(u16),
    #[error("reply line is not valid utf-8")]
    LineIsNotUtf8,
    #[error("more than {0} lines in a multi-line reply")]
    TooManyLines(usize),
    #[error("no reply to {0} in time")]
    ReadResponseTimedOut(FtpCommand),
}
