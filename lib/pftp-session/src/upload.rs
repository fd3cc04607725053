/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Options of [`FtpSession::upload_file`](crate::FtpSession::upload_file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Remote directory to store into, absolute or relative to the current
    /// directory. Default: the current directory.
    pub target_dir: Option<String>,
    /// Remote file name. Default: the file name of the local file.
    pub target_filename: Option<String>,
    /// Replace a file of the same name. When disabled an existing file fails
    /// the upload before any data is sent. Default: true.
    pub overwrite: bool,
    /// List the target directory after the upload and check that the file
    /// shows up. Default: true.
    pub verify: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            target_dir: None,
            target_filename: None,
            overwrite: true,
            verify: true,
        }
    }
}

impl UploadOptions {
    pub fn with_target_dir(mut self, dir: &str) -> Self {
        self.target_dir = Some(dir.to_string());
        self
    }

    pub fn with_target_filename(mut self, name: &str) -> Self {
        self.target_filename = Some(name.to_string());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}
