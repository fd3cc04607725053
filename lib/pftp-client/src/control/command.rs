/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::FtpControlChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand(&'static str);

impl FtpCommand {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand($phrase);
        )+
        }
    };
}

ftp_commands! {
    /// a fake command for greeting
    (GREETING, "-");
    (FEAT, "FEAT");
    (OPTS_UTF8_ON, "OPTS UTF8 ON");
    (USER, "USER");
    (PASS, "PASS");
    (QUIT, "QUIT");
    (PWD, "PWD");
    (CWD, "CWD");
    (MKD, "MKD");
    (TYPE_A, "TYPE A");
    (TYPE_I, "TYPE I");
    (PASV, "PASV");
    (EPSV, "EPSV");
    (SIZE, "SIZE");
    (LIST, "LIST");
    (STOR, "STOR");
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Write `cmd`, followed by `param` if it is not empty, as one command line.
    pub(super) async fn send_command(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
    ) -> io::Result<()> {
        let param = param.filter(|p| !p.is_empty());
        let mut line = String::with_capacity(cmd.0.len() + param.map_or(0, |p| p.len() + 1) + 2);
        line.push_str(cmd.0);
        if let Some(p) = param {
            // no way to smuggle in a second command
            if p.contains(['\r', '\n']) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "line break in command parameter",
                ));
            }
            line.push(' ');
            line.push_str(p);
        }
        line.push_str("\r\n");

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_cmd(line.trim_end());

        let r = async {
            self.stream.write_all(line.as_bytes()).await?;
            self.stream.flush().await
        }
        .await;
        if r.is_err() {
            self.broken = true;
        }
        r
    }
}
