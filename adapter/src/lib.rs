//! Debug adapter subprocess management.
//!
//! Resolves which adapter command line to run, spawns it with the fixed
//! flag selecting DAP mode, exposes its stdio as a [`wire::DapTransport`],
//! and tears the process down when the owning handle is dropped.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use wire::DapTransport;

/// The flag that switches gdb into DAP-server mode. Always appended to
/// the resolved command line.
pub const DAP_MODE_FLAG: &str = "-i=dap";

/// The fallback adapter program when neither a user preference nor a
/// project attribute names one.
pub const DEFAULT_ADAPTER: &str = "gdb";

/// Errors from launching the adapter subprocess.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("adapter process has no stdio pipes")]
    MissingStdio,
}

/// A resolved adapter command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AdapterCommand {
    /// Resolve the adapter command line from, in order of precedence: the
    /// user's preference, the project attribute, the toolchain default.
    /// The chosen command always gets [`DAP_MODE_FLAG`] appended.
    pub fn resolve(
        preference: Option<&str>,
        project_attribute: Option<&str>,
        toolchain_default: Option<&str>,
    ) -> Self {
        let text = preference
            .or(project_attribute)
            .or(toolchain_default)
            .unwrap_or(DEFAULT_ADAPTER);

        let mut words = text.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_else(|| DEFAULT_ADAPTER.to_string());
        let mut args: Vec<String> = words.collect();
        args.push(DAP_MODE_FLAG.to_string());

        Self { program, args }
    }
}

/// Owning handle for the adapter subprocess.
///
/// Dropping it kills the process; the session drops it only after the
/// request registry has been drained, so no GUI object lifetime is
/// involved in teardown.
pub struct Adapter {
    child: Child,
    command: AdapterCommand,
}

impl Adapter {
    /// Spawn the adapter and return the owning handle together with the
    /// transport over its stdio.
    ///
    /// stderr is drained to the log in a background task so a chatty
    /// adapter cannot block on a full pipe.
    pub fn spawn(command: AdapterCommand) -> Result<(Self, AdapterTransport), SpawnError> {
        tracing::debug!(program = %command.program, args = ?command.args, "starting adapter process");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpawnError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(SpawnError::MissingStdio)?;
        let stdout = child.stdout.take().ok_or(SpawnError::MissingStdio)?;
        let stderr = child.stderr.take().ok_or(SpawnError::MissingStdio)?;

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "adapter::stderr", "{line}");
            }
        });

        let adapter = Self { child, command };
        let transport = AdapterTransport { stdin, stdout };
        Ok((adapter, transport))
    }

    /// The command line this adapter was started with.
    pub fn command(&self) -> &AdapterCommand {
        &self.command
    }

    /// Kill the subprocess and reap it.
    pub async fn shutdown(mut self) {
        tracing::debug!("terminating adapter process");
        match self.child.kill().await {
            Ok(()) => tracing::debug!("adapter process terminated"),
            Err(e) => tracing::warn!(error = %e, "could not terminate adapter process"),
        }
    }
}

/// The adapter's stdio pair as a DAP transport.
pub struct AdapterTransport {
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl DapTransport for AdapterTransport {
    type Read = ChildStdout;
    type Write = ChildStdin;

    fn into_split(self) -> (Self::Read, Self::Write) {
        (self.stdout, self.stdin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // compile-time check that the stdio pair satisfies the transport trait
    fn _assert_transport(_: impl DapTransport) {}
    fn _check_adapter_transport() {
        fn make() -> AdapterTransport {
            unimplemented!()
        }
        _assert_transport(make());
    }

    #[test]
    fn resolve_uses_preference_first() {
        let cmd = AdapterCommand::resolve(
            Some("arm-eabi-gdb --quiet"),
            Some("project-gdb"),
            Some("toolchain-gdb"),
        );
        assert_eq!(cmd.program, "arm-eabi-gdb");
        assert_eq!(cmd.args, vec!["--quiet".to_string(), DAP_MODE_FLAG.to_string()]);
    }

    #[test]
    fn resolve_falls_back_to_project_then_toolchain() {
        let cmd = AdapterCommand::resolve(None, Some("project-gdb"), Some("toolchain-gdb"));
        assert_eq!(cmd.program, "project-gdb");

        let cmd = AdapterCommand::resolve(None, None, Some("toolchain-gdb"));
        assert_eq!(cmd.program, "toolchain-gdb");
    }

    #[test]
    fn resolve_defaults_to_gdb_in_dap_mode() {
        let cmd = AdapterCommand::resolve(None, None, None);
        assert_eq!(cmd.program, DEFAULT_ADAPTER);
        assert_eq!(cmd.args, vec![DAP_MODE_FLAG.to_string()]);
    }
}
