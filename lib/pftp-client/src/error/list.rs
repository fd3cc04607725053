/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{FtpCommandError, FtpLineDataReadError, FtpTransferServerError, FtpTransferSetupError};

#[derive(Debug, Error)]
pub enum FtpListStartError {
    #[error("data connection setup: {0}")]
    TransferSetup(FtpTransferSetupError),
    #[error("{0}")]
    Command(FtpCommandError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("path unavailable")]
    PathUnavailable,
}

impl From<FtpTransferSetupError> for FtpListStartError {
    fn from(e: FtpTransferSetupError) -> Self {
        if let FtpTransferSetupError::ServiceNotAvailable = e {
            FtpListStartError::ServiceNotAvailable
        } else {
            FtpListStartError::TransferSetup(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpListError {
    #[error("end of listing: {0}")]
    Server(#[from] FtpTransferServerError),
    #[error("no end of listing reply in time")]
    EndReplyTimedOut,
    #[error("listing data not complete in time")]
    DataTimedOut,
    #[error("listing data: {0}")]
    DataRead(FtpLineDataReadError),
    #[error("listing aborted by receiver")]
    AbortedByReceiver,
}

impl From<FtpLineDataReadError> for FtpListError {
    fn from(e: FtpLineDataReadError) -> Self {
        match e {
            FtpLineDataReadError::AbortedByCallback => FtpListError::AbortedByReceiver,
            e => FtpListError::DataRead(e),
        }
    }
}
