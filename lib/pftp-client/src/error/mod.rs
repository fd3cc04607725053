/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod response;
pub use response::FtpRawResponseError;

mod command;
pub use command::FtpCommandError;

mod connect;
pub use connect::FtpConnectError;

mod login;
pub(crate) use login::FtpAuthStatus;
pub use login::FtpLoginError;

mod transfer;
pub use transfer::{FtpLineDataReadError, FtpTransferServerError, FtpTransferSetupError};

mod path;
pub use path::FtpPathError;

mod list;
pub use list::{FtpListError, FtpListStartError};

mod store;
pub use store::{FtpStoreError, FtpStoreStartError};

/// A 421 reply is reported on its own, all other command errors are wrapped.
macro_rules! impl_from_command_error {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<FtpCommandError> for $t {
                fn from(e: FtpCommandError) -> Self {
                    match e {
                        FtpCommandError::ServiceNotAvailable => Self::ServiceNotAvailable,
                        e => Self::Command(e),
                    }
                }
            }
        )+
    };
}

impl_from_command_error!(
    FtpLoginError,
    FtpPathError,
    FtpTransferSetupError,
    FtpListStartError,
    FtpStoreStartError,
);
