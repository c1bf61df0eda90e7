use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use super::{normalize_name, Config, DIRECTIVE_MARKER, GENERIC_HOST};
use crate::resolve::Resolver;

static HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?i:host)(?:\s*=\s*|\s+)(\S+)\s*$").expect("static regex")
});

static CUSTOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^\s*{}\s+(\S+)\s+(\S.*?)\s*$", regex::escape(DIRECTIVE_MARKER));
    Regex::new(&pattern).expect("static regex")
});

static PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9]*)(?:\s*=\s*|\s+)(.*?)\s*$").expect("static regex")
});

/// One classified input line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Host(&'a str),
    Custom { name: &'a str, value: &'a str },
    Plain { name: &'a str, value: &'a str },
    Skip,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(c) = CUSTOM_RE.captures(line) {
        let (Some(name), Some(value)) = (c.get(1), c.get(2)) else {
            return Line::Skip;
        };
        return Line::Custom {
            name: name.as_str(),
            value: value.as_str(),
        };
    }

    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Skip;
    }

    if let Some(pattern) = HOST_RE.captures(line).and_then(|c| c.get(1)) {
        return Line::Host(pattern.as_str());
    }

    if let Some(c) = PLAIN_RE.captures(line) {
        if let (Some(name), Some(value)) = (c.get(1), c.get(2)) {
            if !value.as_str().is_empty() {
                return Line::Plain {
                    name: name.as_str(),
                    value: value.as_str(),
                };
            }
        }
    }

    Line::Skip
}

/// Which Host block directive lines are attributed to.
#[derive(Debug, Default)]
struct ParseState {
    current: Option<String>,
}

impl ParseState {
    fn step(self, line: &str, cfg: &mut Config, resolver: &Resolver<'_>) -> Self {
        match classify(line) {
            Line::Host(pattern) => {
                let key = if pattern == "*" { GENERIC_HOST } else { pattern };
                cfg.hosts.entry(key.to_string()).or_default();
                Self {
                    current: Some(key.to_string()),
                }
            }
            Line::Custom { name, value } => {
                match self.entry(cfg) {
                    Some(host) => {
                        host.custom.insert(normalize_name(name), resolver.resolve(value));
                    }
                    None => tracing::debug!("ignoring {name} before any Host line"),
                }
                self
            }
            Line::Plain { name, value } => {
                match self.entry(cfg) {
                    Some(host) => {
                        host.ssh.insert(normalize_name(name), value.to_string());
                    }
                    None => tracing::debug!("ignoring {name} before any Host line"),
                }
                self
            }
            Line::Skip => self,
        }
    }

    fn entry<'c>(&self, cfg: &'c mut Config) -> Option<&'c mut super::HostEntry> {
        let key = self.current.as_ref()?;
        cfg.hosts.get_mut(key)
    }
}

pub(super) fn parse_lines(text: &str, env: &BTreeMap<String, String>) -> Config {
    let resolver = Resolver::new(env);
    let mut cfg = Config::default();

    text.lines().fold(ParseState::default(), |state, line| {
        state.step(line, &mut cfg, &resolver)
    });

    cfg
}
