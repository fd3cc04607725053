/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

/// Resolve `path` against the remote directory `base`.
///
/// Used when the server can not tell us the new working directory.
pub(crate) fn resolve(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize(path)
    } else {
        normalize(&format!("{base}/{path}"))
    }
}

/// Collapse `.`, `..` and repeated separators of an absolute remote path.
pub(crate) fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Remote path of `name` inside `dir`, `dir` may be relative.
pub(crate) fn child(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() && !name.is_empty() {
        // `dir` was the root directory
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

pub(crate) fn local_file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}
