//! Start the backend, then hand control to the entry point.
//!
//! [`start_and_delegate`] does both steps; [`delegate`] runs only the second,
//! for callers that use the started backend's client in between.

use std::ffi::OsString;

use crate::{
    ClientFactory, DelegationError, EntryPoint, ExitCode, HttpBackend, Invocation, StartupError,
};

/// Starts `backend` and runs `entry` with `args`, returning its exit code
/// unchanged.
///
/// The entry point is not run if startup fails.
///
/// # Errors
///
/// - [`DelegationError::Startup`] if the backend could not be started.
/// - [`DelegationError::Launch`] if the entry point could not be run.
pub async fn start_and_delegate<F, E>(
    backend: &mut HttpBackend<F>,
    entry: &E,
    args: Vec<OsString>,
) -> Result<ExitCode, DelegationError>
where
    F: ClientFactory,
    E: EntryPoint + ?Sized,
{
    backend.process_startup().await?;
    delegate(backend, entry, args).await
}

/// Runs `entry` with `args` on behalf of an already started `backend`.
///
/// The headers of the backend's client travel with the [`Invocation`], so the
/// delegated tool authenticates its requests the same way.
///
/// # Errors
///
/// - [`DelegationError::Startup`] if the backend has not been started.
/// - [`DelegationError::Launch`] if the entry point could not be run.
pub async fn delegate<F, E>(
    backend: &HttpBackend<F>,
    entry: &E,
    args: Vec<OsString>,
) -> Result<ExitCode, DelegationError>
where
    F: ClientFactory,
    E: EntryPoint + ?Sized,
{
    if !backend.is_in_process() {
        return Err(StartupError::NotStarted.into());
    }

    let invocation = Invocation::new(args).with_headers(backend.headers());
    tracing::debug!(
        args = ?invocation.args,
        headers = ?invocation.headers,
        "delegating to entry point"
    );

    let code = entry.run(invocation).await?;
    tracing::info!(exit_code = code.as_i32(), "entry point finished");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{select_startup, BackendSettings, ClientSpec, LaunchError, AUTHORIZATION};

    struct UnitFactory;

    #[async_trait]
    impl ClientFactory for UnitFactory {
        type Client = ();

        async fn build(&self, _spec: &ClientSpec) -> Result<(), StartupError> {
            Ok(())
        }
    }

    /// Returns a fixed code and remembers what it was called with.
    struct FixedEntryPoint {
        code: i32,
        seen: Mutex<Vec<Invocation>>,
    }

    impl FixedEntryPoint {
        fn new(code: i32) -> Self {
            Self {
                code,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EntryPoint for FixedEntryPoint {
        async fn run(&self, invocation: Invocation) -> Result<ExitCode, LaunchError> {
            self.seen.lock().unwrap().push(invocation);
            Ok(ExitCode::new(self.code))
        }
    }

    fn backend(key: Option<&str>) -> HttpBackend<UnitFactory> {
        HttpBackend::new(
            BackendSettings {
                timeout: Duration::from_secs(5),
                ..BackendSettings::default()
            },
            select_startup(key.map(str::to_owned)),
            UnitFactory,
        )
    }

    #[tokio::test]
    async fn exit_code_is_propagated_unchanged() {
        let mut backend = backend(None);
        let entry = FixedEntryPoint::new(2);

        let code = start_and_delegate(&mut backend, &entry, Vec::new())
            .await
            .unwrap();

        assert_eq!(code, ExitCode::new(2));
        assert!(backend.is_in_process());
    }

    #[tokio::test]
    async fn arguments_and_headers_are_forwarded() {
        let mut backend = backend(Some("sk-forward"));
        let entry = FixedEntryPoint::new(0);
        let args = vec![
            OsString::from("benchmark"),
            OsString::from("--target"),
            OsString::from("http://localhost:8000"),
        ];

        start_and_delegate(&mut backend, &entry, args.clone())
            .await
            .unwrap();

        let seen = entry.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].args, args);
        assert_eq!(
            seen[0].headers.get(AUTHORIZATION),
            Some("Bearer sk-forward")
        );
    }

    #[tokio::test]
    async fn unauthenticated_backend_forwards_no_headers() {
        let mut backend = backend(None);
        let entry = FixedEntryPoint::new(0);

        start_and_delegate(&mut backend, &entry, Vec::new())
            .await
            .unwrap();

        assert!(entry.seen.lock().unwrap()[0].headers.is_empty());
    }

    #[tokio::test]
    async fn delegation_requires_a_started_backend() {
        let backend = backend(Some("sk-early"));
        let entry = FixedEntryPoint::new(0);

        let err = delegate(&backend, &entry, Vec::new()).await.unwrap_err();

        assert!(matches!(
            err,
            DelegationError::Startup(StartupError::NotStarted)
        ));
        assert!(entry.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn already_started_backend_does_not_delegate() {
        let mut backend = backend(None);
        backend.process_startup().await.unwrap();
        let entry = FixedEntryPoint::new(0);

        let err = start_and_delegate(&mut backend, &entry, Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DelegationError::Startup(StartupError::AlreadyStarted)
        ));
        assert!(entry.seen.lock().unwrap().is_empty());
    }
}
