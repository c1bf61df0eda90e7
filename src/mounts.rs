//! Read-only view of the kernel mount table.
//!
//! The mount table is the only record of what autosshfs has mounted; nothing
//! is cached between calls.

use crate::error::{Error, Result};

/// Source of the live mount records, one string per mounted filesystem.
pub trait MountTable {
    fn records(&self) -> Result<Vec<String>>;
}

/// `/proc/mounts` on Linux, the `mount` command elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMountTable;

impl MountTable for SystemMountTable {
    fn records(&self) -> Result<Vec<String>> {
        let text = read_system_table()?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

#[cfg(target_os = "linux")]
fn read_system_table() -> Result<String> {
    std::fs::read_to_string("/proc/mounts").map_err(|source| Error::ResourceUnavailable {
        detail: "/proc/mounts".to_string(),
        source,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_system_table() -> Result<String> {
    use std::{io, process::Command};

    let out = Command::new("mount")
        .output()
        .map_err(|source| Error::ResourceUnavailable {
            detail: "mount".to_string(),
            source,
        })?;
    if !out.status.success() {
        return Err(Error::ResourceUnavailable {
            detail: "mount".to_string(),
            source: io::Error::other(format!("mount exited with {}", out.status)),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

pub(crate) fn references(record: &str, target: &str) -> bool {
    record.contains(&format!("@{target}:"))
}

pub fn is_mounted(table: &dyn MountTable, target: &str) -> Result<bool> {
    Ok(table.records()?.iter().any(|r| references(r, target)))
}

/// Records that reference any of `targets`, in mount-table order.
pub fn list_mounted<'t, I>(table: &dyn MountTable, targets: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'t str>,
{
    let needles: Vec<String> = targets.into_iter().map(|t| format!("@{t}:")).collect();
    Ok(table
        .records()?
        .into_iter()
        .filter(|r| needles.iter().any(|n| r.contains(n.as_str())))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct Fixed(Vec<&'static str>);

    impl MountTable for Fixed {
        fn records(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Broken;

    impl MountTable for Broken {
        fn records(&self) -> Result<Vec<String>> {
            Err(Error::ResourceUnavailable {
                detail: "test".to_string(),
                source: io::Error::other("busy"),
            })
        }
    }

    fn table() -> Fixed {
        Fixed(vec![
            "carol@db1:. /home/u/autosshfs/db1 fuse.sshfs rw 0 0",
            "proc /proc proc rw 0 0",
            "bob@web:/srv /home/u/autosshfs/web fuse.sshfs rw 0 0",
        ])
    }

    #[test]
    fn matches_on_user_host_colon() {
        let t = table();
        assert!(is_mounted(&t, "db1").unwrap());
        assert!(is_mounted(&t, "web").unwrap());
        assert!(!is_mounted(&t, "db").unwrap());
        assert!(!is_mounted(&t, "proc").unwrap());
    }

    #[test]
    fn lists_in_table_order() {
        let t = table();
        let got = list_mounted(&t, ["web", "db1", "other"]).unwrap();
        assert_eq!(got.len(), 2);
        assert!(got[0].starts_with("carol@db1:"));
        assert!(got[1].starts_with("bob@web:"));
    }

    #[test]
    fn unreadable_table_is_an_error_not_unmounted() {
        let err = is_mounted(&Broken, "db1").unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }
}
