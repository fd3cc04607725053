/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use crate::FtpControlConfig;
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpListStartError, FtpPathError, FtpStoreStartError,
    FtpTransferServerError,
};
use crate::feature::FtpServerFeature;
use crate::transfer::FtpTransferType;

mod response;
use response::FtpRawResponse;

mod command;
pub use command::FtpCommand;

pub(crate) const ANONYMOUS_USERNAME: &str = "anonymous";
pub(crate) const ANONYMOUS_PASSWORD: &str = "anonymous@";

/// Map the reply codes that mean the same for every command.
fn reply_error(cmd: FtpCommand, code: u16) -> FtpCommandError {
    match code {
        421 => FtpCommandError::ServiceNotAvailable,
        500 | 501 => FtpCommandError::RejectedCommandSyntax(cmd),
        502 => FtpCommandError::CommandNotImplemented(cmd),
        503 => FtpCommandError::BadCommandSequence(cmd),
        504 => FtpCommandError::ParameterNotImplemented(cmd),
        530 => FtpCommandError::NotLoggedIn,
        n => FtpCommandError::UnexpectedReplyCode(cmd, n),
    }
}

fn end_reply_error(cmd: FtpCommand, code: u16) -> FtpTransferServerError {
    match code {
        110 => FtpTransferServerError::RestartNeeded,
        425 => FtpTransferServerError::DataTransferNotEstablished,
        426 => FtpTransferServerError::DataTransferLost,
        451 => FtpTransferServerError::ServerFailed,
        551 => FtpTransferServerError::PageTypeUnknown,
        552 => FtpTransferServerError::ExceededStorageAllocation,
        n => FtpTransferServerError::UnexpectedEndReplyCode(cmd, n),
    }
}

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
    broken: bool,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
            broken: false,
        }
    }

    /// The control connection is no longer usable, either because of an io
    /// error or because the server announced that it is closing it.
    #[inline]
    pub(crate) fn is_broken(&self) -> bool {
        self.broken
    }

    pub(crate) async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
        self.broken = true;
    }

    /// Send `cmd` and wait for its reply within the command timeout.
    async fn execute(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
    ) -> Result<FtpRawResponse, FtpCommandError> {
        self.send_command(cmd, param)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response(cmd).await?;
        Ok(reply)
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            match reply.code() {
                // service ready in a few minutes
                120 => {}
                220 => return Ok(()),
                n => return Err(reply_error(FtpCommand::GREETING, n)),
            }
        }
    }

    pub(crate) async fn check_server_feature(
        &mut self,
    ) -> Result<FtpServerFeature, FtpCommandError> {
        let cmd = FtpCommand::FEAT;
        let reply = self.execute(cmd, None).await?;

        let mut feature = FtpServerFeature::default();
        match reply.code() {
            211 => {
                // skip the header line, stop at the end line
                let lines = reply.lines().unwrap_or_default();
                for line in lines.iter().skip(1) {
                    let Some(feat) = line.strip_prefix(' ') else {
                        break;
                    };
                    feature.parse_and_set(feat.trim());
                }
            }
            // FEAT is optional, assume no extension
            500..=502 => {}
            n => return Err(reply_error(cmd, n)),
        }
        Ok(feature)
    }

    /// Returns false if the server does not accept the option.
    pub(crate) async fn set_use_utf8(&mut self) -> Result<bool, FtpCommandError> {
        let cmd = FtpCommand::OPTS_UTF8_ON;
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            200 | 202 => Ok(true),
            500..=502 | 504 => Ok(false),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        name: Option<&str>,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        let name = name.unwrap_or(ANONYMOUS_USERNAME);
        let reply = self.execute(cmd, Some(name)).await?;
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn send_password(
        &mut self,
        pass: Option<&str>,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        let pass = pass.unwrap_or(ANONYMOUS_PASSWORD);
        let reply = self.execute(cmd, Some(pass)).await?;
        match reply.code() {
            202 | 230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::QUIT;
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            221 => Ok(()),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn request_pwd(&mut self) -> Result<String, FtpCommandError> {
        let cmd = FtpCommand::PWD;
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            257 => reply
                .parse_path_257_reply()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 257)),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn change_dir(&mut self, path: &str) -> Result<(), FtpPathError> {
        let cmd = FtpCommand::CWD;
        let reply = self.execute(cmd, Some(path)).await?;
        match reply.code() {
            200 | 250 => Ok(()),
            550 => Err(FtpPathError::PathUnavailable),
            n => Err(reply_error(cmd, n).into()),
        }
    }

    pub(crate) async fn make_dir(&mut self, path: &str) -> Result<Option<String>, FtpPathError> {
        let cmd = FtpCommand::MKD;
        let reply = self.execute(cmd, Some(path)).await?;
        match reply.code() {
            // not all servers quote the created path
            257 => Ok(reply.parse_path_257_reply()),
            550 => Err(FtpPathError::PathUnavailable),
            n => Err(reply_error(cmd, n).into()),
        }
    }

    /// `None` if the file is not found, or if `path` is empty.
    pub(crate) async fn request_size(&mut self, path: &str) -> Result<Option<u64>, FtpCommandError> {
        if path.is_empty() {
            return Ok(None);
        }

        let cmd = FtpCommand::SIZE;
        let reply = self.execute(cmd, Some(path)).await?;
        match reply.code() {
            213 => reply
                .line_trimmed()
                .and_then(|s| u64::from_str(s).ok())
                .map(Some)
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 213)),
            550 => Ok(None),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            227 => reply
                .parse_pasv_227_reply()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 227)),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn request_epsv_port(&mut self) -> Result<u16, FtpCommandError> {
        let cmd = FtpCommand::EPSV;
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            229 => reply
                .parse_epsv_229_reply()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 229)),
            // network protocol not supported
            522 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn request_transfer_type(
        &mut self,
        t: FtpTransferType,
    ) -> Result<(), FtpCommandError> {
        let cmd = match t {
            FtpTransferType::Ascii => FtpCommand::TYPE_A,
            FtpTransferType::Image => FtpCommand::TYPE_I,
        };
        let reply = self.execute(cmd, None).await?;
        match reply.code() {
            200 => Ok(()),
            n => Err(reply_error(cmd, n)),
        }
    }

    pub(crate) async fn start_list(&mut self, path: &str) -> Result<(), FtpListStartError> {
        let cmd = FtpCommand::LIST;
        let reply = self.execute(cmd, Some(path)).await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 550 => Err(FtpListStartError::PathUnavailable),
            n => Err(reply_error(cmd, n).into()),
        }
    }

    pub(crate) async fn start_store(&mut self, path: &str) -> Result<(), FtpStoreStartError> {
        let cmd = FtpCommand::STOR;
        let reply = self.execute(cmd, Some(path)).await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 550 => Err(FtpStoreStartError::PathUnavailable),
            452 => Err(FtpStoreStartError::InsufficientStorage),
            532 => Err(FtpStoreStartError::AccountNeeded),
            553 => Err(FtpStoreStartError::NameNotAllowed),
            n => Err(reply_error(cmd, n).into()),
        }
    }

    async fn wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<(), FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            226 | 250 => Ok(()),
            n => Err(end_reply_error(cmd, n)),
        }
    }

    /// Wait for the reply that ends the transfer started by `cmd`.
    ///
    /// `None` if it does not come within `timeout`. A late reply would be
    /// taken for the reply of the next command, so the channel is broken then.
    pub(crate) async fn timed_wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
        timeout: Duration,
    ) -> Option<Result<(), FtpTransferServerError>> {
        match tokio::time::timeout(timeout, self.wait_transfer_end(cmd)).await {
            Ok(r) => Some(r),
            Err(_) => {
                self.broken = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    use crate::error::FtpRawResponseError;

    fn channel(stream: tokio_test::io::Mock) -> FtpControlChannel<tokio_test::io::Mock> {
        FtpControlChannel::new(stream, FtpControlConfig::default())
    }

    #[tokio::test]
    async fn greeting_and_feature() {
        let stream = Builder::new()
            .read(b"120 wait a moment\r\n")
            .read(b"220 ready\r\n")
            .write(b"FEAT\r\n")
            .read(b"211-Features:\r\n EPSV\r\n SIZE\r\n REST STREAM\r\n211 End\r\n")
            .build();
        let mut control = channel(stream);
        control.wait_greetings().await.unwrap();
        let feature = control.check_server_feature().await.unwrap();
        assert!(feature.support_epsv());
        assert!(feature.support_size());
        assert!(!feature.support_utf8());
        assert!(!control.is_broken());
    }

    #[tokio::test]
    async fn service_not_available() {
        let stream = Builder::new().read(b"421 too many users\r\n").build();
        let mut control = channel(stream);
        assert!(matches!(
            control.wait_greetings().await,
            Err(FtpCommandError::ServiceNotAvailable)
        ));
        assert!(control.is_broken());
    }

    #[tokio::test]
    async fn closed_connection_is_broken() {
        let stream = Builder::new().write(b"PWD\r\n").build();
        let mut control = channel(stream);
        assert!(matches!(
            control.request_pwd().await,
            Err(FtpCommandError::RecvFailed(_))
        ));
        assert!(control.is_broken());
    }

    #[tokio::test]
    async fn pwd_and_cwd() {
        let stream = Builder::new()
            .write(b"PWD\r\n")
            .read(b"257 \"/home/ftp\" is the current directory\r\n")
            .write(b"CWD missing\r\n")
            .read(b"550 Failed to change directory.\r\n")
            .write(b"CWD pub\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .build();
        let mut control = channel(stream);
        assert_eq!(control.request_pwd().await.unwrap(), "/home/ftp");
        assert!(matches!(
            control.change_dir("missing").await,
            Err(FtpPathError::PathUnavailable)
        ));
        control.change_dir("pub").await.unwrap();
        assert!(!control.is_broken());
    }

    #[tokio::test]
    async fn size() {
        let stream = Builder::new()
            .write(b"SIZE a.bin\r\n")
            .read(b"213 1024\r\n")
            .write(b"SIZE b.bin\r\n")
            .read(b"550 Could not get file size.\r\n")
            .write(b"SIZE c.bin\r\n")
            .read(b"502 SIZE not implemented\r\n")
            .write(b"SIZE d.bin\r\n")
            .read(b"213 unknown\r\n")
            .build();
        let mut control = channel(stream);
        assert_eq!(control.request_size("a.bin").await.unwrap(), Some(1024));
        assert_eq!(control.request_size("b.bin").await.unwrap(), None);
        assert!(matches!(
            control.request_size("c.bin").await,
            Err(FtpCommandError::CommandNotImplemented(FtpCommand::SIZE))
        ));
        assert!(matches!(
            control.request_size("d.bin").await,
            Err(FtpCommandError::InvalidReplySyntax(FtpCommand::SIZE, 213))
        ));
        assert_eq!(control.request_size("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn epsv_unsupported() {
        let stream = Builder::new()
            .write(b"EPSV\r\n")
            .read(b"522 Network protocol not supported, use (1)\r\n")
            .build();
        let mut control = channel(stream);
        let e = control.request_epsv_port().await.unwrap_err();
        assert!(e.is_unsupported());
    }

    #[tokio::test]
    async fn store_start_rejected() {
        let stream = Builder::new()
            .write(b"STOR a.bin\r\n")
            .read(b"452 Insufficient storage space.\r\n")
            .write(b"STOR b.bin\r\n")
            .read(b"530 Not logged in.\r\n")
            .build();
        let mut control = channel(stream);
        assert!(matches!(
            control.start_store("a.bin").await,
            Err(FtpStoreStartError::InsufficientStorage)
        ));
        assert!(matches!(
            control.start_store("b.bin").await,
            Err(FtpStoreStartError::Command(FtpCommandError::NotLoggedIn))
        ));
    }

    #[tokio::test]
    async fn transfer_end() {
        let stream = Builder::new()
            .read(b"226 Transfer complete.\r\n")
            .read(b"426 Connection closed; transfer aborted.\r\n")
            .build();
        let mut control = channel(stream);
        control.wait_transfer_end(FtpCommand::LIST).await.unwrap();
        assert!(matches!(
            control.wait_transfer_end(FtpCommand::STOR).await,
            Err(FtpTransferServerError::DataTransferLost)
        ));
        assert!(!control.is_broken());
    }

    #[tokio::test(start_paused = true)]
    async fn transfer_end_timed_out() {
        let stream = Builder::new()
            .read(b"226 Transfer complete.\r\n")
            .wait(Duration::from_secs(3))
            .build();
        let mut control = channel(stream);
        let end_wait = Duration::from_secs(2);
        assert!(matches!(
            control.timed_wait_transfer_end(FtpCommand::LIST, end_wait).await,
            Some(Ok(()))
        ));
        assert!(!control.is_broken());
        assert!(
            control
                .timed_wait_transfer_end(FtpCommand::STOR, end_wait)
                .await
                .is_none()
        );
        assert!(control.is_broken());
    }

    #[tokio::test(start_paused = true)]
    async fn command_timed_out() {
        let stream = Builder::new()
            .write(b"PWD\r\n")
            .wait(Duration::from_secs(30))
            .build();
        let mut control = channel(stream);
        assert!(matches!(
            control.request_pwd().await,
            Err(FtpCommandError::RecvFailed(
                FtpRawResponseError::ReadResponseTimedOut(FtpCommand::PWD)
            ))
        ));
        assert!(control.is_broken());
    }

    #[tokio::test]
    async fn reject_line_break_param() {
        let stream = Builder::new().build();
        let mut control = channel(stream);
        assert!(matches!(
            control.change_dir("a\r\nDELE b").await,
            Err(FtpPathError::Command(FtpCommandError::SendFailed(_)))
        ));
        assert!(!control.is_broken());
    }
}
