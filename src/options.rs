use std::path::PathBuf;

use crate::config::Config;

/// Options every sshfs mount gets, whatever the Host block says.
pub const BASELINE: [(&str, &str); 4] = [
    ("-C", ""),
    ("-o", "follow_symlinks"),
    ("-o", "transform_symlinks"),
    ("-o", "reconnect"),
];

/// Directives that must never reach sshfs as `-o Name=value`.
const NOT_FORWARDED: [&str; 7] = [
    "autosshfs",
    "Host",
    "HostName",
    "LocalCommand",
    "LocalForward",
    "RemoteForward",
    "DynamicForward",
];

fn forwarded(name: &str) -> bool {
    !NOT_FORWARDED.iter().any(|x| x.eq_ignore_ascii_case(name))
}

/// One sshfs command-line option, a flag plus an optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOption {
    pub flag: String,
    pub value: Option<String>,
}

impl MountOption {
    fn new(flag: &str, value: &str) -> Self {
        Self {
            flag: flag.to_string(),
            value: (!value.is_empty()).then(|| value.to_string()),
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut out = vec![self.flag.clone()];
        out.extend(self.value.clone());
        out
    }
}

/// Baseline options followed by the target's own ssh directives, sorted by
/// name.
pub fn compose(cfg: &Config, target: &str) -> Vec<MountOption> {
    let mut out: Vec<MountOption> = BASELINE
        .iter()
        .map(|(flag, value)| MountOption::new(flag, value))
        .collect();

    if let Some(host) = cfg.host(target) {
        for (name, value) in host.ssh.iter().filter(|(n, _)| forwarded(n)) {
            out.push(MountOption::new("-o", &format!("{name}={value}")));
        }
    }

    out
}

/// `<Basedir>/<Localdir or target>`
pub fn local_path(cfg: &Config, target: &str) -> PathBuf {
    let dir = cfg
        .host(target)
        .and_then(|h| h.custom_value("Localdir"))
        .unwrap_or(target);
    cfg.basedir().join(dir)
}

/// `[<User>@]<target>:<Remotedir or .>`
pub fn remote_spec(cfg: &Config, target: &str) -> String {
    let host = cfg.host(target);
    let user = host
        .and_then(|h| h.ssh_value("User"))
        .or_else(|| cfg.generic().and_then(|g| g.ssh_value("User")));
    let dir = host.and_then(|h| h.custom_value("Remotedir")).unwrap_or(".");

    match user {
        Some(u) => format!("{u}@{target}:{dir}"),
        None => format!("{target}:{dir}"),
    }
}
