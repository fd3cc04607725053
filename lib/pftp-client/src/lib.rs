/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod addr;
pub use addr::FtpServerAddr;

mod config;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};

#[cfg(feature = "yaml")]
pub mod yaml;

mod connection;
pub use connection::{FtpConnectionProvider, TcpConnectionProvider};

mod error;
pub use error::{
    FtpCommandError, FtpConnectError, FtpLineDataReadError, FtpListError, FtpListStartError,
    FtpLoginError, FtpPathError, FtpRawResponseError, FtpStoreError, FtpStoreStartError,
    FtpTransferServerError, FtpTransferSetupError,
};

mod io;

mod feature;
pub use feature::FtpServerFeature;

mod control;
pub use control::FtpCommand;

mod transfer;
pub use transfer::{FtpLineDataReceiver, FtpTransferType};

mod client;
pub use client::FtpClient;
