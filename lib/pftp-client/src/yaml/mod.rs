/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Helpers for reading client configs from yaml documents.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

/// Keys are matched in lower case, with `-` treated as `_`.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

/// Call `f` with the normalized key and the value of every map entry.
///
/// `what` names the config being parsed and shows up in errors.
pub fn parse_map<F>(value: &Yaml, what: &str, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    let Yaml::Hash(map) = value else {
        return Err(anyhow!("{what} should be a yaml map"));
    };
    for (k, v) in map {
        let Yaml::String(key) = k else {
            return Err(anyhow!("non-string key found in {what}"));
        };
        f(&normalize_key(key), v).with_context(|| format!("invalid value for {what} key {key}"))?;
    }
    Ok(())
}

/// Reject a key that no config field is bound to.
pub fn unknown_key(key: &str) -> anyhow::Result<()> {
    Err(anyhow!("unknown key {key}"))
}

pub fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::Integer(i) => Ok(*i != 0),
        Yaml::String(s) => {
            let s = s.to_lowercase();
            if ["on", "true", "yes", "1"].contains(&s.as_str()) {
                Ok(true)
            } else if ["off", "false", "no", "0"].contains(&s.as_str()) {
                Ok(false)
            } else {
                Err(anyhow!("{s} is not a bool value"))
            }
        }
        _ => Err(anyhow!("a bool should be given as boolean, integer or string")),
    }
}

fn as_integer<T>(v: &Yaml) -> anyhow::Result<T>
where
    T: FromStr + TryFrom<i64>,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    <T as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    match v {
        Yaml::Integer(i) => Ok(T::try_from(*i)?),
        Yaml::String(s) => Ok(T::from_str(s)?),
        _ => Err(anyhow!("an integer should be given as integer or string")),
    }
}

pub fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    as_integer(v)
}

pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    as_integer(v)
}

pub fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) | Yaml::Real(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!("a string should be given as string or number")),
    }
}

/// A byte size like `4KB`, or a plain integer.
pub fn as_byte_size(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(s.parse::<Bytes>()?.size()),
        _ => as_integer(v),
    }
}

fn secs_f64(s: &str) -> anyhow::Result<Duration> {
    let f = f64::from_str(s).map_err(|_| anyhow!("{s} is not a duration"))?;
    Ok(Duration::try_from_secs_f64(f)?)
}

/// A duration like `1m30s`. Numbers without unit are seconds.
pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::Integer(i) => u64::try_from(*i)
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("negative duration {i}")),
        Yaml::Real(s) => secs_f64(s),
        Yaml::String(s) => match humanize_rs::duration::parse(s) {
            Ok(d) => Ok(d),
            Err(ParseError::MissingUnit) => secs_f64(s),
            Err(e) => Err(anyhow!("invalid duration {s}: {e}")),
        },
        _ => Err(anyhow!("a duration should be given as string or number")),
    }
}
