/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;

use pftp_client::FtpLineDataReceiver;

use crate::FtpProtocolError;

/// Names of the entries of a remote directory, in the order sent by the server.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

impl DirectoryListing {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    /// File names are compared case-insensitively.
    pub fn contains_file(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.files.iter().any(|f| f.to_lowercase() == name)
    }

    pub fn contains_directory(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.directories.iter().any(|d| d.to_lowercase() == name)
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.directories, self.files)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ListEntry<'a> {
    Directory(&'a str),
    File(&'a str),
}

/// Number of columns in front of the name in a unix `ls -l` line:
/// mode, links, owner, group, size, month, day, time or year.
const LIST_NAME_COLUMN: usize = 8;

/// Parse one line of a unix style LIST reply.
///
/// Returns `None` for lines that carry no entry.
fn parse_list_line(line: &str) -> Result<Option<ListEntry<'_>>, FtpProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut rest = line.trim_start();
    if rest.is_empty() {
        return Ok(None);
    }
    if let Some(count) = rest.strip_prefix("total ") {
        if count.trim().bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }
    }

    let is_dir = rest.starts_with('d');
    for _ in 0..LIST_NAME_COLUMN {
        let Some(end) = rest.find(char::is_whitespace) else {
            return Err(FtpProtocolError::InvalidListLine(line.to_string()));
        };
        rest = rest[end..].trim_start();
    }
    // the name keeps its inner spacing
    let name = rest;
    match name {
        "" => Err(FtpProtocolError::InvalidListLine(line.to_string())),
        "." | ".." => Ok(None),
        _ if is_dir => Ok(Some(ListEntry::Directory(name))),
        _ => Ok(Some(ListEntry::File(name))),
    }
}

/// Collect the entries of a LIST reply, stop at the first invalid line.
#[derive(Default)]
pub(crate) struct ListingCollector {
    listing: DirectoryListing,
    error: Option<FtpProtocolError>,
}

impl ListingCollector {
    pub(crate) fn take_error(&mut self) -> Option<FtpProtocolError> {
        self.error.take()
    }

    pub(crate) fn into_listing(self) -> Result<DirectoryListing, FtpProtocolError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.listing),
        }
    }
}

#[async_trait]
impl FtpLineDataReceiver for ListingCollector {
    async fn recv_line(&mut self, line: &str) -> bool {
        match parse_list_line(line) {
            Ok(Some(ListEntry::Directory(name))) => {
                self.listing.directories.push(name.to_string());
                true
            }
            Ok(Some(ListEntry::File(name))) => {
                self.listing.files.push(name.to_string());
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    #[inline]
    fn should_return_early(&self) -> bool {
        self.error.is_some()
    }
}
