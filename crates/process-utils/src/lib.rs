//! Helpers for locating and spawning the external tools the downloader
//! drives (converters and media players).

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Apply the Windows `CREATE_NO_WINDOW` flag to child processes.
///
/// On non-Windows targets this is a no-op.
pub trait NoWindowExt {
    fn no_window(&mut self);
}

impl NoWindowExt for tokio::process::Command {
    fn no_window(&mut self) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            self.as_std_mut().creation_flags(CREATE_NO_WINDOW);
        }
    }
}

/// Create a `tokio::process::Command` with `CREATE_NO_WINDOW` applied on Windows.
pub fn tokio_command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.no_window();
    cmd
}

/// Create a command whose stdio is inherited when `verbose`, discarded otherwise.
///
/// The child is killed if the command's future is dropped before it exits.
pub fn quiet_command(program: impl AsRef<OsStr>, verbose: bool) -> tokio::process::Command {
    let mut cmd = tokio_command(program);
    cmd.kill_on_drop(true);
    if !verbose {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
    }
    cmd
}

/// First of `candidates` that resolves to an executable, either as a path or
/// through `PATH`.
pub fn find_executable<I, S>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    candidates
        .into_iter()
        .find_map(|candidate| which::which(candidate.as_ref()).ok())
}
