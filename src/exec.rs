//! The [`ExternalBinary`] contract and its blocking process runner.

use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::checksum::crc32_hex;
use crate::config::BinaryConfig;
use crate::error::{Error, Result};

/// Exit code reserved for invocations that exceeded their timeout.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

const WAIT_POLL: Duration = Duration::from_millis(25);

/// Outcome of one external invocation: the process exit code and the file
/// holding its merged stdout/stderr.
///
/// Code 0 is success by convention and [`TIMEOUT_EXIT_CODE`] marks a
/// timeout; any other code is a normal, reportable result, never an error.
#[derive(Debug, Clone, Serialize)]
pub struct ExecOutcome {
    pub code: i32,
    pub output: PathBuf,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn timed_out(&self) -> bool {
        self.code == TIMEOUT_EXIT_CODE
    }
}

/// A configurable external tool that can be executed repeatedly.
///
/// Implementors supply the configuration store and a pure [`command`]
/// method; the provided [`execute`] drives working-directory creation,
/// output redirection, the output cache, and the timeout policy.
///
/// [`command`]: ExternalBinary::command
/// [`execute`]: ExternalBinary::execute
pub trait ExternalBinary {
    fn config(&self) -> &BinaryConfig;
    fn config_mut(&mut self) -> &mut BinaryConfig;

    /// Build the full command array from the current argument/option state.
    /// Must be a pure function of the configuration.
    fn command(&self) -> Result<Vec<String>>;

    /// Run the command and return its outcome.
    ///
    /// With output caching enabled, an existing cache file for the current
    /// command returns immediately without spawning anything; a stale cache
    /// is only invalidated by deleting the file or changing the command.
    /// On timeout the child is force-killed and the outcome carries
    /// [`TIMEOUT_EXIT_CODE`] with a message file; the partially written
    /// redirect file stays on disk but is not returned.
    fn execute(&mut self) -> Result<ExecOutcome> {
        let work_dir = self.config().work_dir().to_path_buf();
        if !work_dir.exists() {
            fs::create_dir_all(&work_dir)?;
        }
        let command = self.command()?;
        let Some((program, args)) = command.split_first() else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty command array",
            )));
        };

        let joined = shell_words::join(&command);
        let out_path = work_dir.join(format!(".{}.cache", crc32_hex(joined.as_bytes())));
        if self.config().cache_output() && out_path.exists() {
            debug!("cache hit for: {joined}");
            return Ok(ExecOutcome {
                code: 0,
                output: out_path,
            });
        }

        debug!("running: {joined}");
        let redirect = File::create(&out_path)?;
        let stderr = redirect.try_clone()?;
        let mut child = Command::new(program)
            .args(args)
            .current_dir(&work_dir)
            .stdin(Stdio::null())
            .stdout(redirect)
            .stderr(stderr)
            .spawn()?;

        let timeout = self.config().timeout();
        match wait_with_deadline(&mut child, timeout)? {
            Some(status) => {
                let code = exit_code(&status);
                debug!("exited with code {code}");
                Ok(ExecOutcome {
                    code,
                    output: out_path,
                })
            }
            None => {
                warn!("timed out after {}s, killing", timeout.as_secs());
                let _ = child.kill();
                let _ = child.wait();
                let message = tempfile::NamedTempFile::new()?;
                let (_, path) = message.keep().map_err(|err| err.error)?;
                fs::write(&path, format!("timed out after {} seconds\n", timeout.as_secs()))?;
                Ok(ExecOutcome {
                    code: TIMEOUT_EXIT_CODE,
                    output: path,
                })
            }
        }
    }

    /// Apply `reconfigure`, execute once, and restore the exact pre-call
    /// argument/option maps whether or not execution succeeded.
    fn execute_with<F>(&mut self, reconfigure: F) -> Result<ExecOutcome>
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        let snapshot = self.config().snapshot();
        reconfigure(self);
        let outcome = self.execute();
        self.config_mut().restore(snapshot);
        outcome
    }
}

/// Poll a child until it exits or `timeout` elapses. `Ok(None)` means the
/// deadline fired with the child still running; the caller owns
/// termination.
pub(crate) fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_POLL);
    }
}

fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    // Unix signal death; keep TIMEOUT_EXIT_CODE reserved for timeouts.
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
