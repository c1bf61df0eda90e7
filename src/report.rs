use serde::Serialize;

use crate::{config::Config, options, orchestrate::Report};

#[derive(Debug, Serialize)]
pub struct TargetInfo {
    pub name: String,
    pub local: String,
    pub remote: String,
    pub excluded_from_all: bool,
}

pub fn target_infos(cfg: &Config) -> Vec<TargetInfo> {
    cfg.targets()
        .map(|t| TargetInfo {
            name: t.to_string(),
            local: options::local_path(cfg, t).to_string_lossy().to_string(),
            remote: options::remote_spec(cfg, t),
            excluded_from_all: cfg.excluded_from_all(t),
        })
        .collect()
}

pub fn list_targets(cfg: &Config) -> String {
    let infos = target_infos(cfg);
    let width = infos.iter().map(|i| i.name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for i in &infos {
        out.push_str(&format!(
            "{:width$}  {} -> {}{}\n",
            i.name,
            i.remote,
            i.local,
            if i.excluded_from_all { "  (excluded from all)" } else { "" },
        ));
    }
    out
}

pub fn list_targets_json(cfg: &Config) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&target_infos(cfg))
}

pub fn list_mounts(records: &[String]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(r);
        out.push('\n');
    }
    out
}

pub fn status_report(report: &Report) -> String {
    let mut out = String::new();
    for e in &report.entries {
        out.push_str(&format!("{}: {}\n", e.target, e.status));
    }
    out
}
