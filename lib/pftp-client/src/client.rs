/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpConnectError, FtpListError, FtpListStartError,
    FtpLoginError, FtpPathError, FtpStoreError, FtpStoreStartError, FtpTransferSetupError,
};
use crate::transfer::{FtpLineDataReceiver, FtpLineDataTransfer, FtpTransferType};
use crate::{
    FTP_DEBUG_LOG_TARGET, FtpClientConfig, FtpConnectionProvider, FtpServerAddr,
    FtpServerFeature,
};

/// A logged in (or about to log in) ftp control connection.
///
/// All methods take `&mut self`, the client can only run one command at a time.
pub struct FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite,
    E: std::error::Error,
{
    config: Arc<FtpClientConfig>,
    server: FtpServerAddr,
    conn_provider: CP,
    control: FtpControlChannel<S>,
    server_feature: FtpServerFeature,
    epsv_unavailable: bool,
    _phantom: PhantomData<E>,
}

impl<CP, S, E> FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    pub async fn connect_to(
        server: FtpServerAddr,
        mut conn_provider: CP,
        config: &Arc<FtpClientConfig>,
    ) -> Result<Self, FtpConnectError<E>> {
        let stream = match tokio::time::timeout(
            config.connect_timeout,
            conn_provider.new_control_connection(&server),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(FtpConnectError::ConnectFailed(e)),
            Err(_) => return Err(FtpConnectError::ConnectTimedOut),
        };

        let mut control = FtpControlChannel::new(stream, config.control);
        match tokio::time::timeout(config.greeting_timeout, control.wait_greetings()).await {
            Ok(Ok(_)) => {}
            Ok(Err(FtpCommandError::ServiceNotAvailable)) => {
                return Err(FtpConnectError::ServiceNotAvailable);
            }
            Ok(Err(e)) => return Err(FtpConnectError::GreetingFailed(e)),
            Err(_) => return Err(FtpConnectError::GreetingTimedOut),
        }

        let server_feature = control
            .check_server_feature()
            .await
            .map_err(FtpConnectError::NegotiationFailed)?;
        if server_feature.support_utf8() {
            let enabled = control
                .set_use_utf8()
                .await
                .map_err(FtpConnectError::NegotiationFailed)?;
            debug!(target: FTP_DEBUG_LOG_TARGET, "utf8 path names enabled: {enabled}");
        }

        Ok(FtpClient {
            config: Arc::clone(config),
            server,
            conn_provider,
            control,
            server_feature,
            epsv_unavailable: false,
            _phantom: PhantomData,
        })
    }

    #[inline]
    pub fn server(&self) -> &FtpServerAddr {
        &self.server
    }

    #[inline]
    pub fn server_feature(&self) -> &FtpServerFeature {
        &self.server_feature
    }

    /// The control connection can not be used any more.
    #[inline]
    pub fn is_broken(&self) -> bool {
        self.control.is_broken()
    }

    pub async fn new_user_session(
        &mut self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), FtpLoginError> {
        match self.control.send_username(username).await? {
            FtpAuthStatus::LoggedIn => Ok(()),
            FtpAuthStatus::NotLoggedIn => Err(FtpLoginError::NotLoggedIn),
            FtpAuthStatus::NeedAccount => Err(FtpLoginError::AccountNeeded),
            FtpAuthStatus::NeedPassword => match self.control.send_password(password).await? {
                FtpAuthStatus::LoggedIn => Ok(()),
                FtpAuthStatus::NeedAccount => Err(FtpLoginError::AccountNeeded),
                FtpAuthStatus::NotLoggedIn | FtpAuthStatus::NeedPassword => {
                    Err(FtpLoginError::NotLoggedIn)
                }
            },
        }
    }

    pub async fn print_working_directory(&mut self) -> Result<String, FtpCommandError> {
        self.control.request_pwd().await
    }

    pub async fn change_directory(&mut self, path: &str) -> Result<(), FtpPathError> {
        self.control.change_dir(path).await
    }

    /// Returns the path of the new directory if reported by the server.
    pub async fn make_directory(&mut self, path: &str) -> Result<Option<String>, FtpPathError> {
        self.control.make_dir(path).await
    }

    /// Binary transfer type is set before the SIZE command, as some servers
    /// refuse to report sizes in ASCII mode.
    pub async fn fetch_file_size(&mut self, path: &str) -> Result<Option<u64>, FtpCommandError> {
        self.control
            .request_transfer_type(FtpTransferType::Image)
            .await?;
        self.control.request_size(path).await
    }

    async fn new_data_connection(&mut self) -> Result<S, FtpTransferSetupError> {
        let data_addr = self.request_passive_addr().await?;
        match tokio::time::timeout(
            self.config.connect_timeout,
            self.conn_provider.new_data_connection(&data_addr),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FtpTransferSetupError::DataConnectFailed(e.to_string())),
            Err(_) => Err(FtpTransferSetupError::DataConnectTimedOut),
        }
    }

    async fn request_passive_addr(&mut self) -> Result<FtpServerAddr, FtpTransferSetupError> {
        let try_epsv = !self.epsv_unavailable
            && (self.config.always_try_epsv || self.server_feature.support_epsv());
        if try_epsv {
            match self.control.request_epsv_port().await {
                Ok(port) => return Ok(self.server.with_port(port)),
                Err(e) if e.is_unsupported() => {
                    debug!(target: FTP_DEBUG_LOG_TARGET, "EPSV unavailable, fallback to PASV: {e}");
                    self.epsv_unavailable = true;
                }
                Err(e) => return Err(e.into()),
            }
        }

        match self.control.request_pasv_port().await {
            Ok(addr) => Ok(FtpServerAddr::new(&addr.ip().to_string(), addr.port())),
            Err(e) if e.is_unsupported() => Err(FtpTransferSetupError::PassiveModeUnavailable),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a LIST transfer and return the data stream to read from.
    ///
    /// An empty path lists the current working directory.
    pub async fn list_directory_detailed_start(
        &mut self,
        path: &str,
    ) -> Result<S, FtpListStartError> {
        self.control
            .request_transfer_type(FtpTransferType::Ascii)
            .await?;
        let data_stream = self.new_data_connection().await?;
        self.control.start_list(path).await?;
        Ok(data_stream)
    }

    pub async fn list_directory_detailed_receive<R>(
        &mut self,
        data_stream: S,
        receiver: &mut R,
    ) -> Result<(), FtpListError>
    where
        R: FtpLineDataReceiver + Send,
    {
        let transfer = FtpLineDataTransfer::new(data_stream, &self.config.transfer);
        let r = tokio::time::timeout(
            self.config.transfer.list_all_timeout,
            transfer.read_to_end(receiver),
        )
        .await;
        // the data stream has been dropped here, the server will send the end reply
        let data_result = match r {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(FtpListError::from(e)),
            Err(_) => Err(FtpListError::DataTimedOut),
        };

        let end_wait = self.config.transfer.end_wait_timeout;
        match self
            .control
            .timed_wait_transfer_end(FtpCommand::LIST, end_wait)
            .await
        {
            Some(Ok(_)) => data_result,
            Some(Err(e)) => {
                data_result?;
                Err(e.into())
            }
            None => {
                data_result?;
                Err(FtpListError::EndReplyTimedOut)
            }
        }
    }

    /// Start a STOR transfer in binary mode and return the data stream to write to.
    pub async fn store_file_start(&mut self, path: &str) -> Result<S, FtpStoreStartError> {
        self.control
            .request_transfer_type(FtpTransferType::Image)
            .await?;
        let data_stream = self.new_data_connection().await?;
        self.control.start_store(path).await?;
        Ok(data_stream)
    }

    /// Copy all of `source` to the data stream, close it and wait for the end reply.
    pub async fn store_file_send<R>(
        &mut self,
        mut data_stream: S,
        source: &mut R,
    ) -> Result<u64, FtpStoreError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let copy_result = async {
            let nw = tokio::io::copy(source, &mut data_stream).await?;
            data_stream.shutdown().await?;
            Ok::<u64, std::io::Error>(nw)
        }
        .await;
        drop(data_stream);

        let end_wait = self.config.transfer.end_wait_timeout;
        let end_result = self
            .control
            .timed_wait_transfer_end(FtpCommand::STOR, end_wait)
            .await;
        match copy_result {
            Ok(nw) => match end_result {
                Some(Ok(_)) => Ok(nw),
                Some(Err(e)) => Err(e.into()),
                None => Err(FtpStoreError::EndReplyTimedOut),
            },
            // the end reply, if any, is only read to keep the control channel in sync
            Err(e) => Err(FtpStoreError::DataCopy(e)),
        }
    }

    pub async fn quit_and_close(mut self) -> Result<(), FtpCommandError> {
        let r = self.control.send_quit().await;
        self.control.shutdown().await;
        r
    }
}
