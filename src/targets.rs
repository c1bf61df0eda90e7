use std::{
    fmt,
    io::{self, BufRead, Write},
};

use crate::{
    config::Config,
    error::{Error, Result},
    mounts::{self, MountTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Connect,
    Disconnect,
    Reconnect,
}

impl Mode {
    pub fn verb(self) -> &'static str {
        match self {
            Mode::Connect => "connect",
            Mode::Disconnect => "disconnect",
            Mode::Reconnect => "reconnect",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    All,
    Named(Vec<String>),
}

impl Targets {
    /// `None`, an empty string or `all` mean every target; anything else is a
    /// comma-separated list.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Targets::All;
        };
        if raw.eq_ignore_ascii_case("all") {
            return Targets::All;
        }

        let names: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            Targets::All
        } else {
            Targets::Named(names)
        }
    }
}

/// Yes/no prompt shown before bulk operations when `Promptforall` is set.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let mut err = io::stderr().lock();
        write!(err, "{question} [y/N] ")?;
        err.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

/// Turns the request into the concrete list of targets to operate on.
///
/// An empty result means the user declined the confirmation prompt.
pub fn resolve(
    cfg: &Config,
    table: &dyn MountTable,
    requested: &Targets,
    mode: Mode,
    confirm: Option<&mut dyn Confirm>,
) -> Result<Vec<String>> {
    let names = match requested {
        Targets::Named(names) => return Ok(names.clone()),
        Targets::All => names_for_all(cfg, table, mode)?,
    };

    if !cfg.prompt_for_all() {
        return Ok(names);
    }

    let Some(confirm) = confirm else {
        return Err(Error::PolicyViolation(format!(
            "Promptforall is set: {mode} of all targets requires interactive confirmation"
        )));
    };

    let question = format!("Really {mode} all targets ({})?", names.join(", "));
    match confirm.confirm(&question) {
        Ok(true) => Ok(names),
        Ok(false) => {
            tracing::info!("{mode} all: declined");
            Ok(Vec::new())
        }
        Err(e) => {
            tracing::warn!("could not read confirmation: {e}");
            Ok(Vec::new())
        }
    }
}

fn names_for_all(cfg: &Config, table: &dyn MountTable, mode: Mode) -> Result<Vec<String>> {
    let mounted = match mode {
        Mode::Reconnect => Some(table.records()?),
        Mode::Connect | Mode::Disconnect => None,
    };

    let names = cfg
        .targets()
        .filter(|t| match &mounted {
            Some(records) => records.iter().any(|r| mounts::references(r, t)),
            None => true,
        })
        .filter(|t| {
            let excluded = cfg.excluded_from_all(t);
            if excluded {
                tracing::debug!("{t}: excluded from all");
            }
            !excluded
        })
        .map(str::to_string)
        .collect();

    Ok(names)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, path::Path};

    use super::*;

    struct Fixed(Vec<String>);

    impl MountTable for Fixed {
        fn records(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct Answer {
        yes: bool,
        asked: Vec<String>,
    }

    impl Answer {
        fn new(yes: bool) -> Self {
            Self {
                yes,
                asked: Vec::new(),
            }
        }
    }

    impl Confirm for Answer {
        fn confirm(&mut self, question: &str) -> io::Result<bool> {
            self.asked.push(question.to_string());
            Ok(self.yes)
        }
    }

    fn parse(text: &str) -> Config {
        Config::parse(text, &BTreeMap::new(), Path::new("/home/u"))
    }

    fn mounted(keys: &[&str]) -> Fixed {
        Fixed(
            keys.iter()
                .map(|k| format!("u@{k}:. /home/u/autosshfs/{k} fuse.sshfs rw 0 0"))
                .collect(),
        )
    }

    const CFG: &str = "Host *\n\
                       Host c\n\
                       Host a\n\
                       Host b\n#!!!# ExcludeFromAll YES\n";

    #[test]
    fn parses_requests() {
        assert_eq!(Targets::parse(None), Targets::All);
        assert_eq!(Targets::parse(Some("all")), Targets::All);
        assert_eq!(Targets::parse(Some(" , ")), Targets::All);
        assert_eq!(
            Targets::parse(Some("b, a,b")),
            Targets::Named(vec!["b".into(), "a".into(), "b".into()])
        );
    }

    #[test]
    fn named_targets_pass_through() {
        let cfg = parse(CFG);
        let req = Targets::Named(vec!["b".into(), "x".into(), "b".into()]);
        let got = resolve(&cfg, &mounted(&[]), &req, Mode::Connect, None).unwrap();
        assert_eq!(got, vec!["b", "x", "b"]);
    }

    #[test]
    fn all_is_sorted_and_skips_excluded() {
        let cfg = parse(CFG);
        for mode in [Mode::Connect, Mode::Disconnect] {
            let got = resolve(&cfg, &mounted(&[]), &Targets::All, mode, None).unwrap();
            assert_eq!(got, vec!["a", "c"]);
        }
    }

    #[test]
    fn reconnect_all_only_takes_mounted() {
        let cfg = parse(CFG);
        let table = mounted(&["c", "b", "elsewhere"]);
        let got = resolve(&cfg, &table, &Targets::All, Mode::Reconnect, None).unwrap();
        assert_eq!(got, vec!["c"]);
    }

    #[test]
    fn prompt_without_terminal_is_a_policy_violation() {
        let cfg = parse(&format!("{CFG}Host *\n#!!!# Promptforall yes\n"));
        let err = resolve(&cfg, &mounted(&[]), &Targets::All, Mode::Connect, None).unwrap_err();
        assert!(matches!(err, Error::PolicyViolation(_)));

        // explicit targets never prompt
        let req = Targets::Named(vec!["a".into()]);
        assert!(resolve(&cfg, &mounted(&[]), &req, Mode::Connect, None).is_ok());
    }

    #[test]
    fn prompt_decline_is_empty() {
        let cfg = parse(&format!("{CFG}Host *\n#!!!# Promptforall yes\n"));

        let mut no = Answer::new(false);
        let got = resolve(
            &cfg,
            &mounted(&[]),
            &Targets::All,
            Mode::Disconnect,
            Some(&mut no as &mut dyn Confirm),
        );
        assert!(got.unwrap().is_empty());
        assert_eq!(no.asked, vec!["Really disconnect all targets (a, c)?"]);

        let mut yes = Answer::new(true);
        let got = resolve(
            &cfg,
            &mounted(&[]),
            &Targets::All,
            Mode::Disconnect,
            Some(&mut yes as &mut dyn Confirm),
        );
        assert_eq!(got.unwrap(), vec!["a", "c"]);
        assert_eq!(yes.asked.len(), 1);
        assert!(yes.asked[0].contains("disconnect"));
    }
}
