use anyhow::{bail, Context as _, Result};
use std::{
    collections::BTreeMap,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
};

/// What autosshfs knows about the invocation before reading any config.
#[derive(Debug, Clone)]
pub struct ContextEnv {
    pub vars: BTreeMap<String, String>,
    home: PathBuf,
    interactive: bool,
}

impl ContextEnv {
    pub fn new() -> Result<Self> {
        let mut vars: BTreeMap<String, String> = std::env::vars().collect();

        let home = dirs::home_dir()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
            .context("could not determine home directory")?;

        vars.entry("HOME".to_string())
            .or_insert_with(|| home.to_string_lossy().to_string());

        Ok(Self {
            vars,
            home,
            interactive: io::stdin().is_terminal(),
        })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// True when a person can answer a confirmation prompt.
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn default_config_path(&self) -> PathBuf {
        self.home.join(".ssh").join("config")
    }

    /// Config path precedence:
    /// 1) CLI --file (must exist)
    /// 2) AUTOSSHFS_CONFIG (must exist)
    /// 3) ~/.ssh/config
    pub fn locate_config(&self, cli_config: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = cli_config {
            if !p.exists() {
                bail!("--file was provided but file does not exist: {}", p.display());
            }
            return Ok(p.to_path_buf());
        }

        if let Some(p) = self.get_env_path("AUTOSSHFS_CONFIG") {
            if !p.exists() {
                bail!(
                    "AUTOSSHFS_CONFIG is set but file does not exist: {}",
                    p.display()
                );
            }
            return Ok(p);
        }

        Ok(self.default_config_path())
    }

    fn get_env_path(&self, key: &str) -> Option<PathBuf> {
        self.vars
            .get(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}
