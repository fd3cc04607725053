/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::FtpSessionConfig;

mod error;
pub use error::{FtpProtocolError, FtpSessionError, FtpTransferError};

mod state;
pub use state::FtpSessionState;

mod listing;
pub use listing::DirectoryListing;

mod path;

mod upload;
pub use upload::UploadOptions;

mod session;
pub use session::FtpSession;
