/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{Ipv4Addr, SocketAddr};

use tokio::io::{AsyncRead, AsyncWrite};

use super::{FtpCommand, FtpControlChannel};
use crate::error::FtpRawResponseError;
use crate::io::limited_read_until;

/// A complete server reply. The text of every line is kept without the
/// line ending, continuation lines keep their leading spaces.
#[derive(Debug)]
pub(crate) struct FtpRawResponse {
    code: u16,
    lines: Vec<String>,
}

/// Split `<code><sep><text>` and check the code.
fn split_reply_line(line: &[u8]) -> Result<(u16, u8, &[u8]), FtpRawResponseError> {
    let digits = &line[..3];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(FtpRawResponseError::InvalidLineFormat);
    }
    let code = digits
        .iter()
        .fold(0u16, |acc, c| acc * 10 + u16::from(c - b'0'));
    if !(100..600).contains(&code) {
        return Err(FtpRawResponseError::InvalidReplyCode(code));
    }
    let sep = line[3];
    let text = line.get(4..).unwrap_or_default();
    Ok((code, sep, text))
}

fn line_text(raw: &[u8]) -> Result<String, FtpRawResponseError> {
    let s = std::str::from_utf8(raw).map_err(|_| FtpRawResponseError::LineIsNotUtf8)?;
    Ok(s.trim_end().to_string())
}

impl FtpRawResponse {
    #[cfg(test)]
    fn single(code: u16, text: &str) -> Self {
        FtpRawResponse {
            code,
            lines: vec![text.to_string()],
        }
    }

    #[inline]
    pub(crate) fn code(&self) -> u16 {
        self.code
    }

    /// Text of a single line reply, surrounding spaces removed.
    pub(crate) fn line_trimmed(&self) -> Option<&str> {
        match self.lines.as_slice() {
            [line] => Some(line.trim()),
            _ => None,
        }
    }

    /// All lines of a multi-line reply, `None` for single line replies.
    pub(crate) fn lines(&self) -> Option<&[String]> {
        if self.lines.len() > 1 {
            Some(&self.lines)
        } else {
            None
        }
    }

    fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    /// `h1,h2,h3,h4,p1,p2` in a 227 reply, with or without parentheses.
    pub(crate) fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let line = self.line_trimmed()?;
        let start = line.find(|c: char| c.is_ascii_digit())?;
        let tail = &line[start..];
        let end = tail
            .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == ' '))
            .unwrap_or(tail.len());

        let mut nums = [0u8; 6];
        let mut parts = tail[..end].split(',');
        for n in nums.iter_mut() {
            *n = parts.next()?.trim().parse().ok()?;
        }
        if parts.next().is_some() {
            return None;
        }

        let ip = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
        let port = u16::from_be_bytes([nums[4], nums[5]]);
        Some(SocketAddr::new(ip.into(), port))
    }

    /// The port in `(|||port|)` of a 229 reply.
    pub(crate) fn parse_epsv_229_reply(&self) -> Option<u16> {
        let line = self.line_trimmed()?;
        let open = memchr::memchr(b'(', line.as_bytes())?;
        let close = memchr::memchr(b')', &line.as_bytes()[open..])? + open;
        line[open + 1..close]
            .strip_prefix("|||")?
            .strip_suffix('|')?
            .parse()
            .ok()
    }

    /// Get the quoted path in a 257 reply to PWD or MKD.
    ///
    /// A double quote inside the path is sent as two double quotes.
    pub(crate) fn parse_path_257_reply(&self) -> Option<String> {
        let line = self.first_line();
        let p_start = memchr::memchr(b'"', line.as_bytes())?;

        let mut path = String::with_capacity(line.len());
        let mut chars = line[p_start + 1..].chars().peekable();
        while let Some(c) = chars.next() {
            if c != '"' {
                path.push(c);
            } else if chars.next_if_eq(&'"').is_some() {
                path.push('"');
            } else {
                return Some(path);
            }
        }

        None
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_reply_line(
        &mut self,
        buf: &mut Vec<u8>,
        min_len: usize,
    ) -> Result<(), FtpRawResponseError> {
        buf.clear();

        let max_len = self.config.max_line_len;
        let (found, len) = limited_read_until(&mut self.stream, b'\n', max_len, buf)
            .await
            .map_err(FtpRawResponseError::ReadFailed)?;

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_rsp(String::from_utf8_lossy(buf).trim_end());

        match (len, found) {
            (0, _) => Err(FtpRawResponseError::ConnectionClosed),
            (_, false) => Err(FtpRawResponseError::LineTooLong(max_len)),
            (n, true) if n < min_len => Err(FtpRawResponseError::InvalidLineFormat),
            _ => Ok(()),
        }
    }

    async fn do_read_raw_response(&mut self) -> Result<FtpRawResponse, FtpRawResponseError> {
        let mut buf = Vec::<u8>::with_capacity(self.config.max_line_len);
        // at least <code>\n
        self.read_reply_line(&mut buf, 4).await?;

        let (code, sep, text) = split_reply_line(&buf)?;
        let mut lines = vec![line_text(text)?];
        match sep {
            b' ' | b'\r' | b'\n' => return Ok(FtpRawResponse { code, lines }),
            b'-' => {}
            _ => return Err(FtpRawResponseError::InvalidLineFormat),
        }

        // the reply ends at the first line that starts with "<code> "
        let end_prefix = [buf[0], buf[1], buf[2], b' '];
        let max_lines = self.config.max_multi_lines;
        for _ in 0..max_lines {
            self.read_reply_line(&mut buf, 1).await?;
            if let Some(last) = buf.strip_prefix(&end_prefix[..]) {
                lines.push(line_text(last)?);
                return Ok(FtpRawResponse { code, lines });
            }
            lines.push(line_text(&buf)?);
        }
        Err(FtpRawResponseError::TooManyLines(max_lines))
    }

    pub(crate) async fn read_raw_response(
        &mut self,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        let r = self.do_read_raw_response().await;
        // a 421 reply means the server is closing the connection
        if r.as_ref().map_or(true, |reply| reply.code() == 421) {
            self.broken = true;
        }
        r
    }

    pub(crate) async fn timed_read_raw_response(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<FtpRawResponse, FtpRawResponseError> {
        let timeout = self.config.command_timeout;
        tokio::time::timeout(timeout, self.read_raw_response())
            .await
            .unwrap_or_else(|_| {
                self.broken = true;
                Err(FtpRawResponseError::ReadResponseTimedOut(cmd))
            })
    }
}
