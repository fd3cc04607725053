/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read into `buf` until `delimiter` is found or `max_len` bytes have been read.
///
/// Returns whether the delimiter was found and how many bytes were read.
/// A zero read length means the peer closed the stream.
pub(crate) async fn limited_read_until<R>(
    reader: &mut R,
    delimiter: u8,
    max_len: usize,
    buf: &mut Vec<u8>,
) -> io::Result<(bool, usize)>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut nr = 0usize;
    while nr < max_len {
        let (found, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok((false, nr));
            }
            let left = max_len - nr;
            let search = if available.len() > left {
                &available[..left]
            } else {
                available
            };
            match memchr::memchr(delimiter, search) {
                Some(p) => {
                    buf.extend_from_slice(&search[..=p]);
                    (true, p + 1)
                }
                None => {
                    buf.extend_from_slice(search);
                    (false, search.len())
                }
            }
        };
        reader.consume(used);
        nr += used;
        if found {
            return Ok((true, nr));
        }
    }
    Ok((false, nr))
}
