//! Subprocess plumbing shared by the command-line backends and the format bridge.
//!
//! Every child spawned through here is reaped before the call returns, whether
//! it finished, failed or was killed on timeout.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Resolve `program` the way the shell would: paths are checked directly,
/// bare names are searched on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Outcome of a finished child.
#[derive(Debug)]
pub struct Finished {
    pub status: ExitStatus,
    pub stderr: String,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[derive(Debug)]
pub enum RunError {
    /// The executable could not be spawned because it does not exist.
    NotFound,
    TimedOut(Duration),
    Io(io::Error),
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            RunError::NotFound
        } else {
            RunError::Io(e)
        }
    }
}

/// Spawn `cmd`, optionally feed `input` on stdin, and wait for it.
///
/// Stdout is discarded (all engines here write to a file), stderr is captured
/// for diagnostics.
pub fn run(
    mut cmd: Command,
    input: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Finished, RunError> {
    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::null())
    .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    // Drain stderr on its own thread so a chatty engine cannot fill the pipe
    // while we wait on it.
    let drain = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    // Feed stdin from its own thread too: an engine that never reads must not
    // hold us up before the timeout clock starts.
    let feed = match (input, child.stdin.take()) {
        (Some(bytes), Some(mut stdin)) => {
            let bytes = bytes.to_vec();
            Some(std::thread::spawn(move || -> io::Result<()> {
                // A child that exits early closes the pipe; its exit status says why.
                match stdin.write_all(&bytes) {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
                // stdin is dropped here, closing the pipe
            }))
        }
        _ => None,
    };

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                // The feeder is left detached; it ends once the pipe closes.
                reap(&mut child);
                return Err(RunError::TimedOut(limit));
            }
        },
    };

    if let Some(handle) = feed {
        if let Ok(Err(e)) = handle.join() {
            return Err(RunError::Io(e));
        }
    }

    let stderr = drain
        .and_then(|handle| handle.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
        .unwrap_or_default();

    Ok(Finished { status, stderr })
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Write an executable stand-in engine script for tests.
#[cfg(all(test, unix))]
pub(crate) fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(format!("#!/bin/sh\n{}\n", body).as_bytes())
        .unwrap();
    file.sync_all().unwrap();
    drop(file);
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
