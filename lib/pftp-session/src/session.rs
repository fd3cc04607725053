/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use pftp_client::{
    FtpClient, FtpClientConfig, FtpCommandError, FtpConnectionProvider, FtpListStartError,
    FtpLoginError, FtpPathError, TcpConnectionProvider,
};

use crate::listing::ListingCollector;
use crate::{
    DirectoryListing, FtpProtocolError, FtpSessionConfig, FtpSessionError, FtpSessionState,
    FtpTransferError, UploadOptions, path,
};

const ROOT_PATH: &str = "/";

/// A session to a single ftp server.
///
/// The session owns at most one control connection. All operations take
/// `&mut self`, so a session runs one command at a time. Use one session per
/// concurrent connection.
pub struct FtpSession<CP = TcpConnectionProvider, S = TcpStream, E = io::Error>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite,
    E: std::error::Error,
{
    config: FtpSessionConfig,
    client_config: Arc<FtpClientConfig>,
    conn_provider: Option<CP>,
    client: Option<FtpClient<CP, S, E>>,
    state: FtpSessionState,
    current_path: String,
}

impl FtpSession {
    /// Anonymous login is used if `user` is not set. No connection is made
    /// before [`login`](Self::login).
    pub fn new(host: &str, user: Option<&str>, credential: Option<&str>) -> Self {
        let mut config = FtpSessionConfig::new(host);
        config.set_credential(user, credential);
        Self::with_config(config)
    }

    pub fn with_config(config: FtpSessionConfig) -> Self {
        Self::with_provider(config, TcpConnectionProvider::default())
    }
}

impl<CP, S, E> FtpSession<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    pub fn with_provider(config: FtpSessionConfig, conn_provider: CP) -> Self {
        let client_config = Arc::new(config.client.clone());
        FtpSession {
            config,
            client_config,
            conn_provider: Some(conn_provider),
            client: None,
            state: FtpSessionState::Unconnected,
            current_path: String::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &FtpSessionConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> FtpSessionState {
        self.state
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state == FtpSessionState::Connected
    }

    fn connected_client(&mut self) -> Result<&mut FtpClient<CP, S, E>, FtpSessionError> {
        match self.client.as_mut() {
            Some(client) if self.state == FtpSessionState::Connected => Ok(client),
            _ => Err(FtpSessionError::NotConnected(self.state)),
        }
    }

    /// Fail the session if the control connection broke during the last operation.
    fn check_broken<T>(&mut self, r: Result<T, FtpSessionError>) -> Result<T, FtpSessionError> {
        if self.client.as_ref().is_some_and(|c| c.is_broken()) {
            warn!(
                "control connection to ftp server {} is broken, session failed",
                self.config.server
            );
            self.client = None;
            self.state = FtpSessionState::Failed;
        }
        r
    }

    /// Connect and authenticate.
    ///
    /// Only allowed once, on a session that has never been connected.
    pub async fn login(&mut self) -> Result<(), FtpSessionError> {
        if self.state != FtpSessionState::Unconnected {
            return Err(FtpSessionError::LoginNotAllowed(self.state));
        }
        let Some(conn_provider) = self.conn_provider.take() else {
            return Err(FtpSessionError::LoginNotAllowed(self.state));
        };

        match self.open_client(conn_provider).await {
            Ok((client, current_path)) => {
                debug!(
                    "logged in to ftp server {}, working directory {current_path}",
                    self.config.server
                );
                self.client = Some(client);
                self.current_path = current_path;
                self.state = FtpSessionState::Connected;
                Ok(())
            }
            Err(e) => {
                warn!("failed to login to ftp server {}: {e}", self.config.server);
                self.state = FtpSessionState::Failed;
                Err(e)
            }
        }
    }

    async fn open_client(
        &self,
        conn_provider: CP,
    ) -> Result<(FtpClient<CP, S, E>, String), FtpSessionError> {
        let mut client = FtpClient::connect_to(
            self.config.server.clone(),
            conn_provider,
            &self.client_config,
        )
        .await
        .map_err(|e| FtpSessionError::Connection(Box::new(e)))?;

        client
            .new_user_session(
                self.config.username.as_deref(),
                self.config.password.as_deref(),
            )
            .await
            .map_err(|e| match e {
                FtpLoginError::NotLoggedIn | FtpLoginError::AccountNeeded => {
                    FtpSessionError::Authentication(e)
                }
                _ => FtpSessionError::Connection(Box::new(e)),
            })?;

        let current_path = Self::query_pwd_or_unknown(&mut client)
            .await
            .map_err(|e| FtpSessionError::Connection(Box::new(e)))?
            .unwrap_or_else(|| ROOT_PATH.to_string());
        Ok((client, current_path))
    }

    /// `None` if the server can not tell.
    async fn query_pwd(
        client: &mut FtpClient<CP, S, E>,
    ) -> Result<Option<String>, FtpSessionError> {
        match client.print_working_directory().await {
            Ok(path) if !path.is_empty() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e @ FtpCommandError::InvalidReplySyntax(..)) => {
                debug!("no usable PWD reply: {e}");
                Ok(None)
            }
            Err(e) if e.is_unsupported() => {
                debug!("PWD is not supported: {e}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// PWD after a successful login or CWD. A failure that leaves the control
    /// connection usable only means the path is unknown.
    async fn query_pwd_or_unknown(
        client: &mut FtpClient<CP, S, E>,
    ) -> Result<Option<String>, FtpCommandError> {
        match client.print_working_directory().await {
            Ok(path) if !path.is_empty() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if !client.is_broken() => {
                debug!("working directory unknown, PWD failed: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list(
        client: &mut FtpClient<CP, S, E>,
        dir: &str,
    ) -> Result<DirectoryListing, FtpSessionError> {
        let data_stream = client
            .list_directory_detailed_start(dir)
            .await
            .map_err(|e| match e {
                FtpListStartError::PathUnavailable => {
                    FtpSessionError::DirectoryNotFound(dir.to_string())
                }
                e => FtpProtocolError::ListStart(e).into(),
            })?;

        let mut collector = ListingCollector::default();
        if let Err(e) = client
            .list_directory_detailed_receive(data_stream, &mut collector)
            .await
        {
            return match collector.take_error() {
                Some(invalid_line) => Err(invalid_line.into()),
                None => Err(FtpProtocolError::List(e).into()),
            };
        }
        collector.into_listing().map_err(FtpSessionError::from)
    }

    /// List the current directory.
    pub async fn get_contents(&mut self) -> Result<DirectoryListing, FtpSessionError> {
        let client = self.connected_client()?;
        let r = Self::list(client, "").await;
        self.check_broken(r).map_err(|e| match e {
            FtpSessionError::DirectoryNotFound(_) => {
                FtpSessionError::DirectoryNotFound(self.current_path.clone())
            }
            e => e,
        })
    }

    /// List `dir`, absolute or relative to the current directory.
    pub async fn get_contents_of(
        &mut self,
        dir: &str,
    ) -> Result<DirectoryListing, FtpSessionError> {
        let client = self.connected_client()?;
        let r = Self::list(client, dir).await;
        self.check_broken(r)
    }

    /// Check whether the current directory contains the file `name`,
    /// ignoring case.
    pub async fn file_exists(&mut self, name: &str) -> Result<bool, FtpSessionError> {
        let listing = self.get_contents().await?;
        Ok(listing.contains_file(name))
    }

    /// Store the local `file` on the server, returns the number of bytes sent.
    ///
    /// Partial remote files are not removed if the transfer fails.
    pub async fn upload_file<P: AsRef<Path>>(
        &mut self,
        file: P,
        options: &UploadOptions,
    ) -> Result<u64, FtpSessionError> {
        let client = self.connected_client()?;
        let r = Self::upload(client, file.as_ref(), options).await;
        self.check_broken(r)
    }

    async fn upload(
        client: &mut FtpClient<CP, S, E>,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<u64, FtpSessionError> {
        let not_found = || FtpSessionError::LocalFileNotFound(local_path.to_path_buf());
        match tokio::fs::metadata(local_path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(not_found()),
        }

        let file_name = match &options.target_filename {
            Some(name) => name.as_str(),
            None => path::local_file_name(local_path).ok_or_else(not_found)?,
        };
        let target_dir = options.target_dir.as_deref().filter(|d| !d.is_empty());
        let remote_path = match target_dir {
            Some(dir) => path::child(dir, file_name),
            None => file_name.to_string(),
        };

        if !options.overwrite {
            let listing = Self::list(client, target_dir.unwrap_or_default()).await?;
            if listing.contains_file(file_name) {
                return Err(FtpSessionError::FileExistsOnServer(remote_path));
            }
        }

        let mut local_file = tokio::fs::File::open(local_path)
            .await
            .map_err(|_| not_found())?;
        let data_stream = client
            .store_file_start(&remote_path)
            .await
            .map_err(FtpTransferError::StoreStart)?;
        let nw = client
            .store_file_send(data_stream, &mut local_file)
            .await
            .map_err(FtpTransferError::Store)?;
        drop(local_file);
        debug!(
            "uploaded {} to {remote_path}, {nw} bytes",
            local_path.display()
        );

        if options.verify {
            let listing = Self::list(client, target_dir.unwrap_or_default()).await?;
            if !listing.contains_file(file_name) {
                return Err(FtpTransferError::UploadNotFound(remote_path).into());
            }
        }
        Ok(nw)
    }

    /// Change the working directory.
    ///
    /// The new path is taken from the server if possible, or else resolved
    /// locally. The cached path is kept if CWD fails.
    pub async fn cwd(&mut self, dir: &str) -> Result<(), FtpSessionError> {
        let client = self.connected_client()?;
        let r = Self::change_dir(client, dir).await;
        let new_path = self.check_broken(r)?;
        self.current_path = new_path.unwrap_or_else(|| path::resolve(&self.current_path, dir));
        debug!("working directory changed to {}", self.current_path);
        Ok(())
    }

    async fn change_dir(
        client: &mut FtpClient<CP, S, E>,
        dir: &str,
    ) -> Result<Option<String>, FtpSessionError> {
        client.change_directory(dir).await.map_err(|e| match e {
            FtpPathError::PathUnavailable => {
                FtpSessionError::DirectoryNotFound(dir.to_string())
            }
            e => FtpProtocolError::PathCommand(e).into(),
        })?;
        let path = Self::query_pwd_or_unknown(client).await?;
        Ok(path)
    }

    /// The cached working directory, no request is sent.
    ///
    /// Returns `NotConnected` before login and after the session failed or
    /// was closed.
    pub fn pwd(&self) -> Result<&str, FtpSessionError> {
        if self.state == FtpSessionState::Connected {
            Ok(&self.current_path)
        } else {
            Err(FtpSessionError::NotConnected(self.state))
        }
    }

    /// Ask the server for the working directory and update the cache.
    pub async fn refresh_pwd(&mut self) -> Result<&str, FtpSessionError> {
        let client = self.connected_client()?;
        let r = Self::query_pwd(client).await;
        if let Some(path) = self.check_broken(r)? {
            self.current_path = path;
        }
        Ok(&self.current_path)
    }

    /// Size in bytes of a remote file.
    pub async fn get_size(&mut self, filename: &str) -> Result<u64, FtpSessionError> {
        let client = self.connected_client()?;
        let r = match client.fetch_file_size(filename).await {
            Ok(Some(size)) => Ok(size),
            Ok(None) => Err(FtpSessionError::FileNotFound(filename.to_string())),
            Err(e) if e.is_unsupported() => Err(FtpProtocolError::SizeNotSupported.into()),
            Err(e) => Err(e.into()),
        };
        self.check_broken(r)
    }

    /// Create a remote directory, returns its path.
    pub async fn make_dir(&mut self, name: &str) -> Result<String, FtpSessionError> {
        let client = self.connected_client()?;
        let r = client
            .make_directory(name)
            .await
            .map_err(|e| FtpSessionError::from(FtpProtocolError::PathCommand(e)));
        let created = self.check_broken(r)?;
        Ok(created.unwrap_or_else(|| path::resolve(&self.current_path, name)))
    }

    /// Create the subdirectory `name` of the current directory if it is not
    /// listed yet. Returns whether it has been created.
    pub async fn ensure_dir(&mut self, name: &str) -> Result<bool, FtpSessionError> {
        let listing = self.get_contents().await?;
        if listing.contains_directory(name) {
            return Ok(false);
        }
        self.make_dir(name).await?;
        Ok(true)
    }

    /// Log out and close the control connection.
    pub async fn quit(&mut self) -> Result<(), FtpSessionError> {
        if self.state != FtpSessionState::Connected {
            return Err(FtpSessionError::NotConnected(self.state));
        }
        let Some(client) = self.client.take() else {
            return Err(FtpSessionError::NotConnected(self.state));
        };
        self.state = FtpSessionState::Closed;
        debug!("closing ftp session to {}", self.config.server);
        client.quit_and_close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use pftp_client::{
        FtpLineDataReadError, FtpListError, FtpServerAddr, FtpStoreStartError,
    };
    use tokio_test::io::{Builder, Mock};

    struct MockProvider {
        control: Option<Mock>,
        data: VecDeque<Mock>,
        data_connects: usize,
    }

    #[async_trait]
    impl FtpConnectionProvider<Mock, io::Error> for MockProvider {
        async fn new_control_connection(&mut self, _server: &FtpServerAddr) -> io::Result<Mock> {
            self.control
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }

        async fn new_data_connection(&mut self, _server: &FtpServerAddr) -> io::Result<Mock> {
            self.data_connects += 1;
            self.data
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    type MockSession = FtpSession<MockProvider, Mock, io::Error>;

    fn session_config() -> FtpSessionConfig {
        let mut config = FtpSessionConfig::new("ftp.example.com");
        config.set_credential(Some("alice"), Some("secret"));
        config
    }

    fn new_session(control: Option<Mock>, data: Vec<Mock>) -> MockSession {
        new_session_with_config(session_config(), control, data)
    }

    fn new_session_with_config(
        config: FtpSessionConfig,
        control: Option<Mock>,
        data: Vec<Mock>,
    ) -> MockSession {
        let provider = MockProvider {
            control,
            data: data.into(),
            data_connects: 0,
        };
        FtpSession::with_provider(config, provider)
    }

    fn login_script(builder: &mut Builder) -> &mut Builder {
        auth_script(builder)
            .write(b"PWD\r\n")
            .read(b"257 \"/\" is the current directory\r\n")
    }

    fn auth_script(builder: &mut Builder) -> &mut Builder {
        builder
            .read(b"220 Welcome to ftp.example.com\r\n")
            .write(b"FEAT\r\n")
            .read(b"211-Features:\r\n EPSV\r\n SIZE\r\n UTF8\r\n211 End\r\n")
            .write(b"OPTS UTF8 ON\r\n")
            .read(b"200 Always in UTF8 mode.\r\n")
            .write(b"USER alice\r\n")
            .read(b"331 Please specify the password.\r\n")
            .write(b"PASS secret\r\n")
            .read(b"230 Login successful.\r\n")
    }

    fn list_prefix<'a>(builder: &'a mut Builder, cmd: &[u8]) -> &'a mut Builder {
        builder
            .write(b"TYPE A\r\n")
            .read(b"200 Switching to ASCII mode.\r\n")
            .write(b"EPSV\r\n")
            .read(b"229 Entering Extended Passive Mode (|||50000|)\r\n")
            .write(cmd)
            .read(b"150 Here comes the directory listing.\r\n")
    }

    fn list_script<'a>(builder: &'a mut Builder, cmd: &[u8]) -> &'a mut Builder {
        list_prefix(builder, cmd).read(b"226 Directory send OK.\r\n")
    }

    fn list_data(lines: &[&str]) -> Mock {
        let mut builder = Builder::new();
        for line in lines {
            builder.read(line.as_bytes());
        }
        builder.build()
    }

    const DIR1_LINE: &str = "drwxr-xr-x    2 ftp      ftp          4096 Mar 11 09:12 DIR1\r\n";
    const PUBLIC_LINE: &str = "drwxr-xr-x    2 ftp      ftp          4096 Mar 11 09:12 public\r\n";
    const HELLO_LINE: &str = "-rw-r--r--    1 ftp      ftp            11 Mar 11 09:13 hello.txt\r\n";

    #[tokio::test]
    async fn not_connected() {
        let mut session = new_session(Some(Builder::new().build()), Vec::new());
        assert_eq!(session.state(), FtpSessionState::Unconnected);

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::NotConnected(FtpSessionState::Unconnected))
        ));
        assert!(matches!(
            session.cwd("public").await,
            Err(FtpSessionError::NotConnected(_))
        ));
        assert!(matches!(
            session.get_size("a.txt").await,
            Err(FtpSessionError::NotConnected(_))
        ));
        assert!(matches!(
            session.upload_file("/no/such/file", &UploadOptions::default()).await,
            Err(FtpSessionError::NotConnected(_))
        ));
        assert!(matches!(session.pwd(), Err(FtpSessionError::NotConnected(_))));

        let provider = session.conn_provider.as_ref().unwrap();
        assert!(provider.control.is_some());
        assert_eq!(provider.data_connects, 0);
    }

    #[tokio::test]
    async fn login_and_quit() {
        let control = login_script(&mut Builder::new())
            .write(b"QUIT\r\n")
            .read(b"221 Goodbye.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();
        assert!(session.is_connected());
        assert_eq!(session.pwd().unwrap(), "/");

        assert!(matches!(
            session.login().await,
            Err(FtpSessionError::LoginNotAllowed(FtpSessionState::Connected))
        ));

        session.quit().await.unwrap();
        assert_eq!(session.state(), FtpSessionState::Closed);
        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::NotConnected(FtpSessionState::Closed))
        ));
    }

    #[tokio::test]
    async fn login_anonymous_without_pwd() {
        let control = Builder::new()
            .read(b"220 ready\r\n")
            .write(b"FEAT\r\n")
            .read(b"502 Command not implemented.\r\n")
            .write(b"USER anonymous\r\n")
            .read(b"331 Guest login ok, send your email address as password.\r\n")
            .write(b"PASS anonymous@\r\n")
            .read(b"230 Guest login ok.\r\n")
            .write(b"PWD\r\n")
            .read(b"502 Command not implemented.\r\n")
            .build();
        let provider = MockProvider {
            control: Some(control),
            data: VecDeque::new(),
            data_connects: 0,
        };
        let config = FtpSessionConfig::new("ftp.example.com");
        let mut session = FtpSession::with_provider(config, provider);
        session.login().await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/");
    }

    #[tokio::test]
    async fn login_rejected() {
        let control = Builder::new()
            .read(b"220 ready\r\n")
            .write(b"FEAT\r\n")
            .read(b"500 Unknown command.\r\n")
            .write(b"USER alice\r\n")
            .read(b"331 Please specify the password.\r\n")
            .write(b"PASS secret\r\n")
            .read(b"530 Login incorrect.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        assert!(matches!(
            session.login().await,
            Err(FtpSessionError::Authentication(FtpLoginError::NotLoggedIn))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
        assert!(matches!(
            session.login().await,
            Err(FtpSessionError::LoginNotAllowed(FtpSessionState::Failed))
        ));
    }

    #[tokio::test]
    async fn connect_refused() {
        let mut session = new_session(None, Vec::new());
        assert!(matches!(
            session.login().await,
            Err(FtpSessionError::Connection(_))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
    }

    #[tokio::test]
    async fn list_and_change_dir() {
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n")
            .write(b"CWD public\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"PWD\r\n")
            .read(b"257 \"/public\" is the current directory\r\n")
            .write(b"CWD missing\r\n")
            .read(b"550 Failed to change directory.\r\n");
        let control = builder.build();
        let data = list_data(&["total 8\r\n", DIR1_LINE, PUBLIC_LINE]);
        let mut session = new_session(Some(control), vec![data]);
        session.login().await.unwrap();

        let listing = session.get_contents().await.unwrap();
        assert_eq!(
            listing.into_parts(),
            (vec!["DIR1".to_string(), "public".to_string()], Vec::new())
        );

        session.cwd("public").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/public");

        assert!(matches!(
            session.cwd("missing").await,
            Err(FtpSessionError::DirectoryNotFound(dir)) if dir == "missing"
        ));
        assert_eq!(session.pwd().unwrap(), "/public");
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn change_dir_without_pwd_path() {
        let control = login_script(&mut Builder::new())
            .write(b"CWD pub/incoming\r\n")
            .read(b"250 OK.\r\n")
            .write(b"PWD\r\n")
            .read(b"257 current directory unknown\r\n")
            .write(b"CWD ..\r\n")
            .read(b"250 OK.\r\n")
            .write(b"PWD\r\n")
            .read(b"502 Command not implemented.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();

        session.cwd("pub/incoming").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/pub/incoming");
        session.cwd("..").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/pub");
    }

    #[tokio::test]
    async fn list_empty_dir() {
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let mut session = new_session(Some(control), vec![Builder::new().build()]);
        session.login().await.unwrap();

        let listing = session.get_contents().await.unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.into_parts(), (Vec::new(), Vec::new()));
    }

    #[tokio::test]
    async fn list_missing_dir() {
        let control = login_script(&mut Builder::new())
            .write(b"TYPE A\r\n")
            .read(b"200 Switching to ASCII mode.\r\n")
            .write(b"EPSV\r\n")
            .read(b"229 Entering Extended Passive Mode (|||50000|)\r\n")
            .write(b"LIST /nowhere\r\n")
            .read(b"550 No such directory.\r\n")
            .build();
        let mut session = new_session(Some(control), vec![Builder::new().build()]);
        session.login().await.unwrap();

        assert!(matches!(
            session.get_contents_of("/nowhere").await,
            Err(FtpSessionError::DirectoryNotFound(dir)) if dir == "/nowhere"
        ));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn list_invalid_line() {
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let data = list_data(&[DIR1_LINE, "03-11-24  09:12AM       <DIR>          DIR2\r\n"]);
        let mut session = new_session(Some(control), vec![data]);
        session.login().await.unwrap();

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::Protocol(FtpProtocolError::InvalidListLine(_)))
        ));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn broken_control_connection() {
        let control = login_script(&mut Builder::new())
            .write(b"TYPE A\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::Protocol(_))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
        assert!(matches!(
            session.cwd("public").await,
            Err(FtpSessionError::NotConnected(FtpSessionState::Failed))
        ));
    }

    #[tokio::test]
    async fn upload_list_and_size() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let local = tmp_dir.path().join("hello.txt");
        std::fs::write(&local, b"hello world").unwrap();

        let mut builder = Builder::new();
        login_script(&mut builder)
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"EPSV\r\n")
            .read(b"229 Entering Extended Passive Mode (|||50001|)\r\n")
            .write(b"STOR hello.txt\r\n")
            .read(b"150 Ok to send data.\r\n")
            .read(b"226 Transfer complete.\r\n");
        list_script(&mut builder, b"LIST\r\n");
        list_script(&mut builder, b"LIST\r\n")
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"SIZE hello.txt\r\n")
            .read(b"213 11\r\n");
        let control = builder.build();
        let data = vec![
            Builder::new().write(b"hello world").build(),
            list_data(&[DIR1_LINE, HELLO_LINE]),
            list_data(&[DIR1_LINE, HELLO_LINE]),
        ];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        let nw = session
            .upload_file(&local, &UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(nw, 11);

        let listing = session.get_contents().await.unwrap();
        assert_eq!(listing.files, ["hello.txt"]);
        assert_eq!(session.get_size("hello.txt").await.unwrap(), 11);
    }

    #[tokio::test]
    async fn upload_to_target_dir() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let local = tmp_dir.path().join("report.csv");
        std::fs::write(&local, b"a,b\n1,2\n").unwrap();

        let control = login_script(&mut Builder::new())
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"EPSV\r\n")
            .read(b"229 Entering Extended Passive Mode (|||50001|)\r\n")
            .write(b"STOR /upload/2024.csv\r\n")
            .read(b"150 Ok to send data.\r\n")
            .read(b"226 Transfer complete.\r\n")
            .build();
        let data = vec![Builder::new().write(b"a,b\n1,2\n").build()];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        let options = UploadOptions::default()
            .with_target_dir("/upload/")
            .with_target_filename("2024.csv")
            .with_verify(false);
        assert_eq!(session.upload_file(&local, &options).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn upload_no_overwrite() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let local = tmp_dir.path().join("HELLO.TXT");
        std::fs::write(&local, b"hello world").unwrap();

        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let data = vec![list_data(&[HELLO_LINE])];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        let options = UploadOptions::default().with_overwrite(false);
        assert!(matches!(
            session.upload_file(&local, &options).await,
            Err(FtpSessionError::FileExistsOnServer(name)) if name == "HELLO.TXT"
        ));
    }

    #[tokio::test]
    async fn upload_errors() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let local = tmp_dir.path().join("hello.txt");
        std::fs::write(&local, b"hello world").unwrap();

        let control = login_script(&mut Builder::new())
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"EPSV\r\n")
            .read(b"229 Entering Extended Passive Mode (|||50001|)\r\n")
            .write(b"STOR hello.txt\r\n")
            .read(b"553 Could not create file.\r\n")
            .build();
        let data = vec![Builder::new().build()];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        assert!(matches!(
            session
                .upload_file(tmp_dir.path().join("missing.txt"), &UploadOptions::default())
                .await,
            Err(FtpSessionError::LocalFileNotFound(_))
        ));
        assert!(matches!(
            session.upload_file(tmp_dir.path(), &UploadOptions::default()).await,
            Err(FtpSessionError::LocalFileNotFound(_))
        ));
        assert!(matches!(
            session.upload_file(&local, &UploadOptions::default()).await,
            Err(FtpSessionError::Transfer(FtpTransferError::StoreStart(
                FtpStoreStartError::NameNotAllowed
            )))
        ));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn size_errors() {
        let control = login_script(&mut Builder::new())
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"SIZE missing.txt\r\n")
            .read(b"550 Could not get file size.\r\n")
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"SIZE hello.txt\r\n")
            .read(b"502 Command not implemented.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();

        assert!(matches!(
            session.get_size("missing.txt").await,
            Err(FtpSessionError::FileNotFound(name)) if name == "missing.txt"
        ));
        assert!(matches!(
            session.get_size("hello.txt").await,
            Err(FtpSessionError::Protocol(FtpProtocolError::SizeNotSupported))
        ));
    }

    #[tokio::test]
    async fn ensure_dir() {
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        list_script(&mut builder, b"LIST\r\n")
            .write(b"MKD upload\r\n")
            .read(b"257 \"/upload\" created\r\n");
        let control = builder.build();
        let data = vec![list_data(&[DIR1_LINE]), list_data(&[DIR1_LINE])];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        assert!(!session.ensure_dir("dir1").await.unwrap());
        assert!(session.ensure_dir("upload").await.unwrap());
    }

    #[tokio::test]
    async fn file_exists() {
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let data = vec![
            list_data(&[DIR1_LINE, HELLO_LINE]),
            list_data(&[DIR1_LINE, HELLO_LINE]),
        ];
        let mut session = new_session(Some(control), data);
        session.login().await.unwrap();

        assert!(session.file_exists("Hello.TXT").await.unwrap());
        assert!(!session.file_exists("DIR1").await.unwrap());
    }

    #[tokio::test]
    async fn refresh_pwd() {
        let control = login_script(&mut Builder::new())
            .write(b"PWD\r\n")
            .read(b"257 \"/home/alice\" is the current directory\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/");
        assert_eq!(session.refresh_pwd().await.unwrap(), "/home/alice");
        assert_eq!(session.pwd().unwrap(), "/home/alice");
    }

    #[tokio::test]
    async fn change_dir_with_pwd_rejected() {
        let control = login_script(&mut Builder::new())
            .write(b"CWD public\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"PWD\r\n")
            .read(b"550 Permission denied.\r\n")
            .write(b"CWD incoming\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"PWD\r\n")
            .read(b"450 Requested file action not taken.\r\n")
            .write(b"CWD ..\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"PWD\r\n")
            .read(b"530 Not logged in.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();

        session.cwd("public").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/public");
        session.cwd("incoming").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/public/incoming");
        session.cwd("..").await.unwrap();
        assert_eq!(session.pwd().unwrap(), "/public");
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn login_with_pwd_rejected() {
        let control = auth_script(&mut Builder::new())
            .write(b"PWD\r\n")
            .read(b"530 Not logged in.\r\n")
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();
        assert!(session.is_connected());
        assert_eq!(session.pwd().unwrap(), "/");
    }

    #[tokio::test(start_paused = true)]
    async fn login_pwd_timed_out() {
        let control = auth_script(&mut Builder::new())
            .write(b"PWD\r\n")
            .wait(Duration::from_secs(30))
            .build();
        let mut session = new_session(Some(control), Vec::new());
        assert!(matches!(
            session.login().await,
            Err(FtpSessionError::Connection(_))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
    }

    #[tokio::test]
    async fn list_large_dir() {
        let mut data = String::from("total 3000\r\n");
        for i in 0..1500 {
            data.push_str(&format!(
                "-rw-r--r--    1 ftp      ftp            11 Mar 11 09:13 file-{i:04}.dat\r\n"
            ));
        }
        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let data = Builder::new().read(data.as_bytes()).build();
        let mut session = new_session(Some(control), vec![data]);
        session.login().await.unwrap();

        let listing = session.get_contents().await.unwrap();
        assert_eq!(listing.files.len(), 1500);
        assert_eq!(listing.files[0], "file-0000.dat");
        assert_eq!(listing.files[1499], "file-1499.dat");
        assert!(listing.directories.is_empty());
    }

    #[tokio::test]
    async fn list_entry_limit() {
        let mut config = session_config();
        config.client.transfer.list_max_entries = 2;

        let mut builder = Builder::new();
        login_script(&mut builder);
        list_script(&mut builder, b"LIST\r\n");
        list_script(&mut builder, b"LIST\r\n");
        let control = builder.build();
        let data = vec![
            list_data(&["total 8\r\n", DIR1_LINE, "\r\n", HELLO_LINE]),
            list_data(&[DIR1_LINE, PUBLIC_LINE, HELLO_LINE]),
        ];
        let mut session = new_session_with_config(config, Some(control), data);
        session.login().await.unwrap();

        let listing = session.get_contents().await.unwrap();
        assert_eq!(listing.directories, ["DIR1"]);
        assert_eq!(listing.files, ["hello.txt"]);

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::Protocol(FtpProtocolError::List(
                FtpListError::DataRead(FtpLineDataReadError::TooManyEntries(2))
            )))
        ));
        assert!(session.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn command_timed_out() {
        let control = login_script(&mut Builder::new())
            .write(b"TYPE I\r\n")
            .wait(Duration::from_secs(30))
            .build();
        let mut session = new_session(Some(control), Vec::new());
        session.login().await.unwrap();

        assert!(matches!(
            session.get_size("hello.txt").await,
            Err(FtpSessionError::Protocol(FtpProtocolError::Command(_)))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
        assert!(matches!(
            session.get_size("hello.txt").await,
            Err(FtpSessionError::NotConnected(FtpSessionState::Failed))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn list_data_timed_out() {
        let mut builder = Builder::new();
        let control = login_script(&mut builder);
        let control = list_prefix(control, b"LIST\r\n")
            .read(b"426 Connection closed; transfer aborted.\r\n")
            .build();
        let data = Builder::new()
            .read(DIR1_LINE.as_bytes())
            .wait(Duration::from_secs(200))
            .build();
        let mut session = new_session(Some(control), vec![data]);
        session.login().await.unwrap();

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::Protocol(FtpProtocolError::List(
                FtpListError::DataTimedOut
            )))
        ));
        assert!(session.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn list_end_reply_timed_out() {
        let mut builder = Builder::new();
        let control = login_script(&mut builder);
        let control = list_prefix(control, b"LIST\r\n")
            .wait(Duration::from_secs(3))
            .build();
        let data = list_data(&[DIR1_LINE]);
        let mut session = new_session(Some(control), vec![data]);
        session.login().await.unwrap();

        assert!(matches!(
            session.get_contents().await,
            Err(FtpSessionError::Protocol(FtpProtocolError::List(
                FtpListError::EndReplyTimedOut
            )))
        ));
        assert_eq!(session.state(), FtpSessionState::Failed);
        assert!(matches!(
            session.get_size("hello.txt").await,
            Err(FtpSessionError::NotConnected(FtpSessionState::Failed))
        ));
    }
}
