/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use thiserror::Error;

use pftp_client::{
    FtpCommandError, FtpListError, FtpListStartError, FtpLoginError, FtpPathError, FtpStoreError,
    FtpStoreStartError,
};

use crate::FtpSessionState;

#[derive(Debug, Error)]
pub enum FtpTransferError {
    #[error("store rejected: {0}")]
    StoreStart(#[from] FtpStoreStartError),
    #[error("store failed: {0}")]
    Store(#[from] FtpStoreError),
    #[error("uploaded file {0} not found on server")]
    UploadNotFound(String),
}

#[derive(Debug, Error)]
pub enum FtpProtocolError {
    #[error("command failed: {0}")]
    Command(#[from] FtpCommandError),
    #[error("path command failed: {0}")]
    PathCommand(#[from] FtpPathError),
    #[error("list start failed: {0}")]
    ListStart(#[from] FtpListStartError),
    #[error("list failed: {0}")]
    List(#[from] FtpListError),
    #[error("invalid list line: {0}")]
    InvalidListLine(String),
    #[error("SIZE is not supported by server")]
    SizeNotSupported,
}

#[derive(Debug, Error)]
pub enum FtpSessionError {
    #[error("connection failed: {0}")]
    Connection(Box<dyn std::error::Error + Send + Sync>),
    #[error("authentication failed: {0}")]
    Authentication(FtpLoginError),
    #[error("not connected, session is {0}")]
    NotConnected(FtpSessionState),
    #[error("login is not allowed, session is {0}")]
    LoginNotAllowed(FtpSessionState),
    #[error("remote directory {0} not found")]
    DirectoryNotFound(String),
    #[error("remote file {0} not found")]
    FileNotFound(String),
    #[error("local file {} not found", .0.display())]
    LocalFileNotFound(PathBuf),
    #[error("file {0} already exists on server")]
    FileExistsOnServer(String),
    #[error("transfer error: {0}")]
    Transfer(#[from] FtpTransferError),
    #[error("protocol error: {0}")]
    Protocol(#[from] FtpProtocolError),
}

impl From<FtpCommandError> for FtpSessionError {
    fn from(e: FtpCommandError) -> Self {
        FtpSessionError::Protocol(FtpProtocolError::Command(e))
    }
}
