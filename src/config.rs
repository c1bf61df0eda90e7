use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

mod parse;

/// Host key under which the `Host *` block is stored.
pub const GENERIC_HOST: &str = "*";

/// Marker that turns an ssh comment into an autosshfs directive.
pub const DIRECTIVE_MARKER: &str = "#!!!#";

pub type DirectiveMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEntry {
    /// Plain ssh directives (`User`, `Hostname`, ...), keys normalized.
    pub ssh: DirectiveMap,

    /// `#!!!#` directives (`Basedir`, `Localdir`, ...), keys normalized and
    /// values env-expanded.
    pub custom: DirectiveMap,
}

impl HostEntry {
    pub fn ssh_value(&self, name: &str) -> Option<&str> {
        self.ssh.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn custom_value(&self, name: &str) -> Option<&str> {
        self.custom.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn custom_flag(&self, name: &str) -> bool {
        self.custom_value(name).is_some_and(is_yes)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub hosts: BTreeMap<String, HostEntry>,
}

impl Config {
    /// Reads and parses the file. Nothing is returned if the file cannot be
    /// read.
    pub fn load_from_path(
        path: &Path,
        env: &BTreeMap<String, String>,
        home: &Path,
    ) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("parsing {}", path.display());
        Ok(Self::parse(&text, env, home))
    }

    pub fn parse(text: &str, env: &BTreeMap<String, String>, home: &Path) -> Self {
        let mut cfg = parse::parse_lines(text, env);
        cfg.apply_defaults(home);
        cfg
    }

    fn apply_defaults(&mut self, home: &Path) {
        let generic = self.hosts.entry(GENERIC_HOST.to_string()).or_default();

        generic.custom.entry("Basedir".to_string()).or_insert_with(|| {
            home.join("autosshfs").to_string_lossy().to_string()
        });

        if !self.local_command_enabled() {
            tracing::warn!(
                "PermitLocalCommand is not set to yes under Host *; \
                 mounting from an ssh LocalCommand will not work"
            );
        }
    }

    pub fn generic(&self) -> Option<&HostEntry> {
        self.hosts.get(GENERIC_HOST)
    }

    pub fn host(&self, key: &str) -> Option<&HostEntry> {
        self.hosts.get(key)
    }

    /// Every configured target, sorted, without the generic host.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.hosts
            .keys()
            .map(String::as_str)
            .filter(|k| *k != GENERIC_HOST)
    }

    pub fn basedir(&self) -> PathBuf {
        self.generic()
            .and_then(|g| g.custom_value("Basedir"))
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    pub fn prompt_for_all(&self) -> bool {
        self.generic().is_some_and(|g| g.custom_flag("Promptforall"))
    }

    pub fn local_command_enabled(&self) -> bool {
        self.generic()
            .and_then(|g| g.ssh_value("PermitLocalCommand"))
            .is_some_and(is_yes)
    }

    pub fn excluded_from_all(&self, target: &str) -> bool {
        self.host(target).is_some_and(|h| h.custom_flag("Excludefromall"))
    }
}

/// `HOSTNAME`, `hostName` -> `Hostname`.
pub fn normalize_name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn is_yes(v: &str) -> bool {
    v.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("HOME".to_string(), "/home/u".to_string()),
            ("USER".to_string(), "bob".to_string()),
        ])
    }

    fn parse(text: &str) -> Config {
        Config::parse(text, &env(), Path::new("/home/u"))
    }

    #[test]
    fn normalizes_directive_names() {
        assert_eq!(normalize_name("HostName"), "Hostname");
        assert_eq!(normalize_name("user"), "User");
        assert_eq!(normalize_name("PERMITLOCALCOMMAND"), "Permitlocalcommand");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn generic_and_targets_are_separate() {
        let cfg = parse(
            "User early\n\
             Host *\n  PermitLocalCommand yes\n\
             Host a\n  User alice\n\
             Host b\n  User bob\n",
        );

        assert_eq!(cfg.hosts.len(), 3);
        assert_eq!(cfg.targets().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(cfg.hosts.values().all(|h| h.ssh_value("User") != Some("early")));
        assert!(cfg.local_command_enabled());
    }

    #[test]
    fn basedir_defaults_under_home() {
        let cfg = parse("Host a\n  User alice\n");
        assert_eq!(cfg.basedir(), PathBuf::from("/home/u/autosshfs"));
        assert!(cfg.generic().is_some());
        assert!(!cfg.local_command_enabled());
    }

    #[test]
    fn empty_directives_keep_derived_defaults() {
        let cfg = parse(
            "Host *\n#!!!# Basedir \n\
             Host db1\n#!!!# Localdir \n#!!!# Remotedir \n",
        );
        assert_eq!(cfg.basedir(), PathBuf::from("/home/u/autosshfs"));
        assert_eq!(
            crate::options::local_path(&cfg, "db1"),
            PathBuf::from("/home/u/autosshfs/db1")
        );
        assert_eq!(crate::options::remote_spec(&cfg, "db1"), "db1:.");
    }

    #[test]
    fn basedir_from_generic_custom_directive() {
        let cfg = parse("Host *\n#!!!# Basedir $HOME/mnt\n");
        assert_eq!(cfg.basedir(), PathBuf::from("/home/u/mnt"));
    }

    #[test]
    fn flags_are_case_insensitive() {
        let cfg = parse(
            "Host *\n#!!!# PromptForAll YES\n\
             Host a\n#!!!# excludefromall Yes\n\
             Host b\n#!!!# Excludefromall no\n",
        );
        assert!(cfg.prompt_for_all());
        assert!(cfg.excluded_from_all("a"));
        assert!(!cfg.excluded_from_all("b"));
        assert!(!cfg.excluded_from_all("missing"));
    }

    #[test]
    fn unreadable_file_is_file_access_error() {
        let err = Config::load_from_path(
            Path::new("/nonexistent/autosshfs/config"),
            &env(),
            Path::new("/home/u"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }
}
