/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{FtpCommandError, FtpRawResponseError, FtpTransferServerError, FtpTransferSetupError};

#[derive(Debug, Error)]
pub enum FtpStoreStartError {
    #[error("data connection setup: {0}")]
    TransferSetup(FtpTransferSetupError),
    #[error("{0}")]
    Command(FtpCommandError),
    #[error("server is closing the control connection")]
    ServiceNotAvailable,
    #[error("path unavailable")]
    PathUnavailable,
    #[error("an account is required to store files")]
    AccountNeeded,
    #[error("file name not allowed")]
    NameNotAllowed,
    #[error("not enough storage space on server")]
    InsufficientStorage,
}

impl From<FtpTransferSetupError> for FtpStoreStartError {
    fn from(e: FtpTransferSetupError) -> Self {
        if let FtpTransferSetupError::ServiceNotAvailable = e {
            FtpStoreStartError::ServiceNotAvailable
        } else {
            FtpStoreStartError::TransferSetup(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpStoreError {
    #[error("end of store: {0}")]
    Server(FtpTransferServerError),
    #[error("no end of store reply in time")]
    EndReplyTimedOut,
    #[error("{0}")]
    ControlRead(#[from] FtpRawResponseError),
    #[error("data copy: {0:?}")]
    DataCopy(io::Error),
}

impl From<FtpTransferServerError> for FtpStoreError {
    fn from(e: FtpTransferServerError) -> Self {
        match e {
            FtpTransferServerError::RecvFailed(e) => FtpStoreError::ControlRead(e),
            e => FtpStoreError::Server(e),
        }
    }
}
