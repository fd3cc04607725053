/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Extensions announced by the server in its FEAT reply.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FtpServerFeature {
    epsv: bool,
    size: bool,
    utf8: bool,
}

impl FtpServerFeature {
    pub(crate) fn parse_and_set(&mut self, feat: &str) {
        let name = feat.split_once(' ').map_or(feat, |(name, _)| name);
        match name.to_uppercase().as_str() {
            "EPSV" => self.epsv = true,
            "SIZE" => self.size = true,
            "UTF8" => self.utf8 = true,
            _ => {}
        }
    }

    #[inline]
    pub fn support_epsv(&self) -> bool {
        self.epsv
    }

    #[inline]
    pub fn support_size(&self) -> bool {
        self.size
    }

    #[inline]
    pub fn support_utf8(&self) -> bool {
        self.utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let mut feature = FtpServerFeature::default();
        for line in ["EPSV", "size", "REST STREAM", "MLST type*;size*;"] {
            feature.parse_and_set(line);
        }
        assert!(feature.support_epsv());
        assert!(feature.support_size());
        assert!(!feature.support_utf8());

        feature.parse_and_set("utf8");
        assert!(feature.support_utf8());
    }
}
