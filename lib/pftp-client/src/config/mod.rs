/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpControlConfig {
    /// max length of a single reply line, including the line ending
    pub max_line_len: usize,
    /// max number of lines in a multi-line reply
    pub max_multi_lines: usize,
    /// time to wait for the reply of a single command
    pub command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 128,
            command_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpTransferConfig {
    /// max length of a single line in a LIST reply
    pub list_max_line_len: usize,
    /// max number of entries accepted in a single LIST reply, headers not included
    pub list_max_entries: usize,
    /// time to receive the whole LIST data
    pub list_all_timeout: Duration,
    /// time to wait for the end reply after the data connection closed
    pub end_wait_timeout: Duration,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            list_max_line_len: 2048,
            list_max_entries: 1 << 20,
            list_all_timeout: Duration::from_secs(120),
            end_wait_timeout: Duration::from_secs(2),
        }
    }
}

impl FtpTransferConfig {
    pub fn set_list_all_timeout(&mut self, timeout: Duration) {
        self.list_all_timeout = timeout;
        if self.end_wait_timeout > timeout {
            self.end_wait_timeout = timeout;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpClientConfig {
    pub control: FtpControlConfig,
    pub transfer: FtpTransferConfig,
    /// time to establish the control connection
    pub connect_timeout: Duration,
    /// time to receive the server greeting once connected
    pub greeting_timeout: Duration,
    /// use EPSV even if the server does not announce it in FEAT
    pub always_try_epsv: bool,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: Default::default(),
            transfer: Default::default(),
            connect_timeout: Duration::from_secs(20),
            greeting_timeout: Duration::from_secs(10),
            always_try_epsv: true,
        }
    }
}
