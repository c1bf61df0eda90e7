use std::path::PathBuf;

use clap::Parser;

use crate::targets::{Mode, Targets};

/// Mount sshfs targets declared in your ssh config.
///
/// Each `Host` block is a target. autosshfs settings live in comments that
/// start with `#!!!#`, e.g. `#!!!# Remotedir /srv/data`.
#[derive(Parser, Debug)]
#[command(name = "autosshfs", version, about)]
pub struct Args {
    /// Path to the ssh config (overrides AUTOSSHFS_CONFIG and ~/.ssh/config)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List configured targets
    #[arg(short, long)]
    pub list: bool,

    /// Print the target list as JSON (with --list)
    #[arg(long, requires = "list")]
    pub json: bool,

    /// List live mounts of configured targets
    #[arg(short, long)]
    pub mounts: bool,

    /// Connect targets (comma-separated; all if omitted)
    #[arg(short, long, value_name = "TARGETS", num_args = 0..=1, default_missing_value = "all")]
    pub connect: Option<String>,

    /// Disconnect targets (comma-separated; all if omitted)
    #[arg(short, long, value_name = "TARGETS", num_args = 0..=1, default_missing_value = "all")]
    pub disconnect: Option<String>,

    /// Disconnect then connect targets (comma-separated; all mounted if omitted)
    #[arg(short, long, value_name = "TARGETS", num_args = 0..=1, default_missing_value = "all")]
    pub reconnect: Option<String>,

    /// Report the outcome for every target
    #[arg(short, long)]
    pub verbose: bool,

    /// Seconds to wait before checking new mounts (with --verbose)
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub settle: u64,
}

impl Args {
    /// Requested operations in the order they run.
    pub fn actions(&self) -> Vec<(Mode, Targets)> {
        [
            (Mode::Disconnect, &self.disconnect),
            (Mode::Reconnect, &self.reconnect),
            (Mode::Connect, &self.connect),
        ]
        .into_iter()
        .filter_map(|(mode, raw)| raw.as_deref().map(|r| (mode, Targets::parse(Some(r)))))
        .collect()
    }

    pub fn has_work(&self) -> bool {
        self.list || self.mounts || !self.actions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("autosshfs").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn bare_flag_means_all() {
        let a = args(&["-c"]);
        assert_eq!(a.actions(), vec![(Mode::Connect, Targets::All)]);
    }

    #[test]
    fn comma_list() {
        let a = args(&["--disconnect", "db1,web"]);
        assert_eq!(
            a.actions(),
            vec![(
                Mode::Disconnect,
                Targets::Named(vec!["db1".into(), "web".into()])
            )]
        );
    }

    #[test]
    fn nothing_to_do() {
        let a = args(&["-v"]);
        assert!(!a.has_work());
        assert!(args(&["-l"]).has_work());
    }

    #[test]
    fn json_needs_list() {
        let argv = ["autosshfs", "--json"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
