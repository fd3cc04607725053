/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;
use tokio::io::{AsyncRead, BufReader};

use crate::config::FtpTransferConfig;
use crate::error::FtpLineDataReadError;
use crate::io::limited_read_until;

#[async_trait]
pub trait FtpLineDataReceiver {
    /// Called for every line received, the line ending is not stripped.
    ///
    /// Returns whether the line is a listing entry. Only entries count
    /// against the entry limit, so headers and blank lines should return false.
    async fn recv_line(&mut self, line: &str) -> bool;
    fn should_return_early(&self) -> bool;
}

/// Reads LIST style data, one line at a time, until the server closes the
/// data connection.
pub(crate) struct FtpLineDataTransfer<T: AsyncRead> {
    reader: BufReader<T>,
    max_entries: usize,
    max_line_len: usize,
}

impl<T> FtpLineDataTransfer<T>
where
    T: AsyncRead + Unpin,
{
    pub(crate) fn new(io: T, config: &FtpTransferConfig) -> Self {
        FtpLineDataTransfer {
            reader: BufReader::new(io),
            max_entries: config.list_max_entries,
            max_line_len: config.list_max_line_len,
        }
    }

    pub(crate) async fn read_to_end<R>(mut self, receiver: &mut R) -> Result<(), FtpLineDataReadError>
    where
        R: FtpLineDataReceiver + Send,
    {
        let mut buf = Vec::with_capacity(self.max_line_len);
        let mut line_count = 0usize;
        let mut entry_count = 0usize;
        loop {
            buf.clear();
            let (found, nr) =
                limited_read_until(&mut self.reader, b'\n', self.max_line_len, &mut buf).await?;
            if nr == 0 {
                return Ok(());
            }
            // a full buffer without line ending can not be a final unterminated line
            if !found && nr >= self.max_line_len {
                return Err(FtpLineDataReadError::LineTooLong(line_count + 1));
            }
            line_count += 1;

            let line =
                std::str::from_utf8(&buf).map_err(|_| FtpLineDataReadError::UnsupportedEncoding)?;
            if receiver.recv_line(line).await {
                entry_count += 1;
                if entry_count > self.max_entries {
                    return Err(FtpLineDataReadError::TooManyEntries(self.max_entries));
                }
            }
            if receiver.should_return_early() {
                return Err(FtpLineDataReadError::AbortedByCallback);
            }
            if !found {
                return Ok(());
            }
        }
    }
}
