use std::{collections::BTreeSet, fmt, fs, thread, time::Duration};

use crate::{
    config::Config,
    helper::MountHelper,
    mounts::{self, MountTable},
    options,
};

/// How long to wait after launching mounts before checking on them.
///
/// sshfs gives no completion signal once detached; this is a guess, not a
/// synchronization point.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    AlreadyMounted,
    MountRequested,
    Mounted,
    MountFailed(String),
    NotMounted,
    Unmounted,
    UnmountFailed(String),
    CheckFailed(String),
}

impl Status {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::MountFailed(_) | Status::UnmountFailed(_) | Status::CheckFailed(_)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::AlreadyMounted => f.write_str("already mounted"),
            Status::MountRequested => f.write_str("mount requested"),
            Status::Mounted => f.write_str("mounted"),
            Status::MountFailed(why) => write!(f, "mount failed: {why}"),
            Status::NotMounted => f.write_str("not mounted"),
            Status::Unmounted => f.write_str("unmounted"),
            Status::UnmountFailed(why) => write!(f, "unmount failed: {why}"),
            Status::CheckFailed(why) => write!(f, "status check failed: {why}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub target: String,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<TargetStatus>,
}

impl Report {
    fn push(&mut self, target: &str, status: Status) {
        if status.is_failure() {
            tracing::warn!("{target}: {status}");
        } else {
            tracing::debug!("{target}: {status}");
        }
        self.entries.push(TargetStatus {
            target: target.to_string(),
            status,
        });
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_failure()).count()
    }
}

/// Runs connect/disconnect/reconnect over a resolved target list.
///
/// Every target is handled on its own: a failure is recorded in the report
/// and the batch carries on.
pub struct Orchestrator<'a> {
    cfg: &'a Config,
    table: &'a dyn MountTable,
    helper: &'a mut dyn MountHelper,
    settle: Duration,
    verbose: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        cfg: &'a Config,
        table: &'a dyn MountTable,
        helper: &'a mut dyn MountHelper,
    ) -> Self {
        Self {
            cfg,
            table,
            helper,
            settle: DEFAULT_SETTLE,
            verbose: false,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// In verbose mode connect waits for the settle interval and reports
    /// whether each mount actually appeared.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn connect(&mut self, targets: &[String]) -> Report {
        let mut report = Report::default();
        let mut launched: Vec<&str> = Vec::new();
        let mut seen = BTreeSet::new();

        for target in targets {
            if !seen.insert(target.as_str()) {
                continue;
            }
            self.warn_if_unconfigured(target);

            match mounts::is_mounted(self.table, target) {
                Ok(true) => {
                    report.push(target, Status::AlreadyMounted);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    report.push(target, Status::CheckFailed(e.to_string()));
                    continue;
                }
            }

            match self.launch(target) {
                Ok(()) => launched.push(target),
                Err(why) => report.push(target, Status::MountFailed(why)),
            }
        }

        if launched.is_empty() {
            return report;
        }

        if !self.verbose {
            for target in launched {
                report.push(target, Status::MountRequested);
            }
            return report;
        }

        thread::sleep(self.settle);
        for target in launched {
            let status = match mounts::is_mounted(self.table, target) {
                Ok(true) => Status::Mounted,
                Ok(false) => Status::MountFailed("not in mount table after settle".to_string()),
                Err(e) => Status::CheckFailed(e.to_string()),
            };
            report.push(target, status);
        }

        report
    }

    fn launch(&mut self, target: &str) -> Result<(), String> {
        let opts = options::compose(self.cfg, target);
        let remote = options::remote_spec(self.cfg, target);
        let local = options::local_path(self.cfg, target);

        fs::create_dir_all(&local)
            .map_err(|e| format!("cannot create {}: {e}", local.display()))?;

        tracing::info!("mounting {remote} on {}", local.display());
        self.helper
            .mount(&opts, &remote, &local)
            .map_err(|e| e.to_string())
    }

    pub fn disconnect(&mut self, targets: &[String]) -> Report {
        let mut report = Report::default();
        let mut seen = BTreeSet::new();

        for target in targets {
            if !seen.insert(target.as_str()) {
                continue;
            }
            self.warn_if_unconfigured(target);
            let status = self.disconnect_one(target);
            report.push(target, status);
        }

        report
    }

    fn disconnect_one(&mut self, target: &str) -> Status {
        match mounts::is_mounted(self.table, target) {
            Ok(true) => {}
            Ok(false) => return Status::NotMounted,
            Err(e) => return Status::CheckFailed(e.to_string()),
        }

        let local = options::local_path(self.cfg, target);
        tracing::info!("unmounting {}", local.display());
        if let Err(e) = self.helper.unmount(&local) {
            return Status::UnmountFailed(e.to_string());
        }

        match mounts::is_mounted(self.table, target) {
            Ok(false) => Status::Unmounted,
            Ok(true) => Status::UnmountFailed("still in mount table".to_string()),
            Err(e) => Status::CheckFailed(e.to_string()),
        }
    }

    /// Disconnects every target, then connects them again.
    pub fn reconnect(&mut self, targets: &[String]) -> Report {
        let mut report = self.disconnect(targets);
        report.entries.extend(self.connect(targets).entries);
        report
    }

    fn warn_if_unconfigured(&self, target: &str) {
        if self.cfg.host(target).is_none() {
            tracing::warn!("{target}: no Host entry in config, using defaults");
        }
    }
}
