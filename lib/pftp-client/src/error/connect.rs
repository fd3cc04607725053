/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::FtpCommandError;

#[derive(Debug, Error)]
pub enum FtpConnectError<E: std::error::Error> {
    #[error("unable to connect: {0:?}")]
    ConnectFailed(E),
    #[error("connect timed out")]
    ConnectTimedOut,
    #[error("no greeting in time")]
    GreetingTimedOut,
    #[error("bad greeting: {0}")]
    GreetingFailed(FtpCommandError),
    #[error("feature negotiation failed: {0}")]
    NegotiationFailed(FtpCommandError),
    #[error("server refused the connection with 421")]
    ServiceNotAvailable,
}
