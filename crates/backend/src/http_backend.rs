//! The HTTP backend and its one-shot startup.
//!
//! An [`HttpBackend`] is created unstarted with its [`BackendSettings`], the
//! injected [`BackendStartup`] variant, and a [`ClientFactory`].
//! [`HttpBackend::process_startup`] builds the client exactly once; a second
//! call is rejected with [`StartupError::AlreadyStarted`].

use crate::{ApiKey, BackendSettings, BackendStartup, ClientFactory, RequestHeaders, StartupError};

/// Issues HTTP requests to an inference endpoint on behalf of the
/// benchmarking tool.
pub struct HttpBackend<F: ClientFactory> {
    settings: BackendSettings,
    startup: Box<dyn BackendStartup>,
    factory: F,
    client: Option<F::Client>,
    in_process: bool,
}

impl<F: ClientFactory> HttpBackend<F> {
    /// Creates an unstarted backend.
    pub fn new(settings: BackendSettings, startup: Box<dyn BackendStartup>, factory: F) -> Self {
        Self {
            settings,
            startup,
            factory,
            client: None,
            in_process: false,
        }
    }

    /// Builds the backend's HTTP client and marks the backend as in process.
    ///
    /// The client is constructed from the backend's settings, the headers of
    /// the injected startup variant, and unbounded connection limits. The
    /// in-process flag is set only after the factory has finished.
    ///
    /// # Errors
    ///
    /// - [`StartupError::AlreadyStarted`] if the backend is already in
    ///   process. The existing client is kept and the factory is not called.
    /// - Any error returned by the factory; the backend stays unstarted.
    #[tracing::instrument(
        name = "process_startup",
        skip(self),
        fields(authenticated = self.startup.api_key().is_some())
    )]
    pub async fn process_startup(&mut self) -> Result<(), StartupError> {
        if self.in_process {
            tracing::warn!("startup requested on a backend that is already in process");
            return Err(StartupError::AlreadyStarted);
        }

        let spec = self.startup.client_spec(&self.settings);
        let client = self.factory.build(&spec).await?;

        self.client = Some(client);
        self.in_process = true;

        tracing::info!(
            http2 = spec.settings.http2,
            timeout_secs = spec.settings.timeout.as_secs_f64(),
            follow_redirects = spec.settings.follow_redirects,
            verify = spec.settings.verify,
            keepalive_expiry_secs = spec.limits.keepalive_expiry.as_secs_f64(),
            "backend started"
        );
        Ok(())
    }

    /// Returns `true` once [`Self::process_startup`] has succeeded.
    pub fn is_in_process(&self) -> bool {
        self.in_process
    }

    /// Returns the constructed client, if the backend has started.
    pub fn client(&self) -> Option<&F::Client> {
        self.client.as_ref()
    }

    /// Returns the backend's transport settings.
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// Returns the key the backend authenticates with, if any.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.startup.api_key()
    }

    /// Returns the headers the backend's client sends with every request.
    pub fn headers(&self) -> RequestHeaders {
        self.startup.headers()
    }

    /// Returns the client factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F: ClientFactory> std::fmt::Debug for HttpBackend<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("settings", &self.settings)
            .field("startup", &self.startup)
            .field("in_process", &self.in_process)
            .finish_non_exhaustive()
    }
}
