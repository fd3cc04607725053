/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod line;
pub(crate) use line::FtpLineDataTransfer;
pub use line::FtpLineDataReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpTransferType {
    /// TYPE A, used for directory listings
    Ascii,
    /// TYPE I, byte for byte transfer
    Image,
}
