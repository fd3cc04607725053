/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use yaml_rust::Yaml;

use pftp_client::yaml as y;
use pftp_client::{FtpClientConfig, FtpServerAddr};

use super::FtpSessionConfig;

impl FtpSessionConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let mut server: Option<FtpServerAddr> = None;
        let mut port: Option<u16> = None;
        let mut username: Option<String> = None;
        let mut password: Option<String> = None;
        let mut client = FtpClientConfig::default();
        y::parse_map(value, "ftp session config", |k, v| {
            match k {
                "server" | "host" => {
                    server = Some(FtpServerAddr::parse_with_default_port(&y::as_string(v)?))
                }
                "port" => port = Some(y::as_u16(v)?),
                "username" | "user" => username = Some(y::as_string(v)?),
                "password" | "credential" => password = Some(y::as_string(v)?),
                "client" => client = FtpClientConfig::parse_yaml(v)?,
                _ => return y::unknown_key(k),
            }
            Ok(())
        })?;

        let mut server = server.ok_or_else(|| anyhow!("no server set"))?;
        if let Some(port) = port {
            server.set_port(port);
        }
        Ok(FtpSessionConfig {
            server,
            username,
            password,
            client,
        })
    }
}
