//! Port for the delegated command-line tool.
//!
//! After startup, control passes to an [`EntryPoint`]. The launcher's
//! arguments are handed over untouched in an [`Invocation`], together with the
//! headers the backend's client was built with; the entry point's [`ExitCode`]
//! becomes the process exit status.

use std::ffi::OsString;

use async_trait::async_trait;

use crate::{ExitCode, LaunchError, RequestHeaders};

/// A single call into the delegated tool.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Arguments passed through verbatim (without the launcher's own program name).
    pub args: Vec<OsString>,
    /// Headers the delegated tool should attach to its own requests.
    pub headers: RequestHeaders,
}

impl Invocation {
    /// Creates an invocation with `args` and no headers.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            headers: RequestHeaders::new(),
        }
    }

    /// Attaches the headers to forward to the delegated tool.
    pub fn with_headers(mut self, headers: RequestHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the value given for a long option, as `--name value` or
    /// `--name=value`. The last occurrence wins.
    ///
    /// Used to read options meant for the delegated tool; the arguments
    /// themselves are never changed.
    pub fn option_value(&self, name: &str) -> Option<String> {
        let flag = format!("--{name}");
        let prefix = format!("{flag}=");
        let mut found = None;
        let mut args = self.args.iter().filter_map(|a| a.to_str());
        while let Some(arg) = args.next() {
            if arg == flag {
                if let Some(value) = args.next() {
                    found = Some(value.to_owned());
                }
            } else if let Some(value) = arg.strip_prefix(&prefix) {
                found = Some(value.to_owned());
            }
        }
        found
    }
}

/// The command-line entry point control is delegated to.
#[async_trait]
pub trait EntryPoint: Send + Sync {
    /// Runs the tool to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] only when the tool could not be run at all; a
    /// non-zero status is returned as `Ok`.
    async fn run(&self, invocation: Invocation) -> Result<ExitCode, LaunchError>;
}
