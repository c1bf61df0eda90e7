//! External programs that do the actual mounting.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::{
    error::{Error, Result},
    options::MountOption,
};

pub trait MountHelper {
    /// Starts a mount and returns without waiting for it to finish.
    fn mount(&mut self, options: &[MountOption], remote: &str, local: &Path) -> Result<()>;

    /// Force-unmounts `local`. Returns once the unmount program has exited.
    fn unmount(&mut self, local: &Path) -> Result<()>;
}

/// `sshfs` for mounting; `fusermount -u -z` (Linux) or `umount -f` for
/// unmounting.
#[derive(Debug, Clone)]
pub struct Sshfs {
    pub program: String,
}

impl Default for Sshfs {
    fn default() -> Self {
        Self {
            program: "sshfs".to_string(),
        }
    }
}

impl MountHelper for Sshfs {
    fn mount(&mut self, options: &[MountOption], remote: &str, local: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(options.iter().flat_map(MountOption::to_args))
            .arg(remote)
            .arg(local)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        tracing::debug!("spawning {cmd:?}");

        // The child is never waited on: this may run inside an ssh
        // LocalCommand, which blocks until we exit.
        cmd.spawn().map_err(|source| Error::HelperLaunch {
            program: self.program.clone(),
            source,
        })?;
        Ok(())
    }

    fn unmount(&mut self, local: &Path) -> Result<()> {
        let (program, flags) = unmount_command();
        let status = Command::new(program)
            .args(flags)
            .arg(local)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| Error::HelperLaunch {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            tracing::debug!("{program} exited with {status} for {}", local.display());
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn unmount_command() -> (&'static str, &'static [&'static str]) {
    ("fusermount", &["-u", "-z"])
}

#[cfg(not(target_os = "linux"))]
fn unmount_command() -> (&'static str, &'static [&'static str]) {
    ("umount", &["-f"])
}
