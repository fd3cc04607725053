/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use yaml_rust::Yaml;

use super::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};
use crate::yaml as y;

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let mut config = FtpControlConfig::default();
        y::parse_map(value, "ftp control config", |k, v| {
            match k {
                "max_line_len" | "max_line_length" => config.max_line_len = y::as_byte_size(v)?,
                "max_multi_lines" => config.max_multi_lines = y::as_usize(v)?,
                "command_timeout" => config.command_timeout = y::as_duration(v)?,
                _ => return y::unknown_key(k),
            }
            Ok(())
        })?;
        Ok(config)
    }
}

impl FtpTransferConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let mut config = FtpTransferConfig::default();
        y::parse_map(value, "ftp transfer config", |k, v| {
            match k {
                "list_max_line_len" | "list_max_line_length" => {
                    config.list_max_line_len = y::as_byte_size(v)?
                }
                "list_max_entries" => config.list_max_entries = y::as_usize(v)?,
                "list_all_timeout" => config.set_list_all_timeout(y::as_duration(v)?),
                "end_wait_timeout" => config.end_wait_timeout = y::as_duration(v)?,
                _ => return y::unknown_key(k),
            }
            Ok(())
        })?;
        Ok(config)
    }
}

impl FtpClientConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let mut config = FtpClientConfig::default();
        y::parse_map(value, "ftp client config", |k, v| {
            match k {
                "control" => config.control = FtpControlConfig::parse_yaml(v)?,
                "transfer" => config.transfer = FtpTransferConfig::parse_yaml(v)?,
                "connect_timeout" => config.connect_timeout = y::as_duration(v)?,
                "greeting_timeout" => config.greeting_timeout = y::as_duration(v)?,
                "always_try_epsv" => config.always_try_epsv = y::as_bool(v)?,
                _ => return y::unknown_key(k),
            }
            Ok(())
        })?;
        Ok(config)
    }
}
