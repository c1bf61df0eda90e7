use anyhow::{Context as _, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::{io, process::ExitCode, time::Duration};
use tracing_subscriber::EnvFilter;

use autosshfs::{
    cli::Args,
    mounts, report,
    targets::{self, Confirm, TerminalConfirm},
    Config, ContextEnv, Mode, Orchestrator, Sshfs, SystemMountTable,
};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(args.verbose);

    if !args.has_work() {
        let _ = Args::command().print_help();
        eprintln!("\nautosshfs: no action given");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("autosshfs: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let ctx = ContextEnv::new()?;
    let path = ctx.locate_config(args.config.as_deref())?;
    let cfg = Config::load_from_path(&path, &ctx.vars, ctx.home())?;
    let table = SystemMountTable;

    if args.list {
        if args.json {
            println!("{}", report::list_targets_json(&cfg)?);
        } else {
            print!("{}", report::list_targets(&cfg));
        }
    }

    if args.mounts {
        let records = mounts::list_mounted(&table, cfg.targets())
            .context("failed to list mounts")?;
        print!("{}", report::list_mounts(&records));
    }

    // Resolve everything first so a refused "all" stops the run before
    // anything is mounted or unmounted.
    let mut batches: Vec<(Mode, Vec<String>)> = Vec::new();
    for (mode, requested) in args.actions() {
        let mut prompt = TerminalConfirm;
        let confirm = ctx
            .interactive()
            .then_some(&mut prompt as &mut dyn Confirm);
        let names = targets::resolve(&cfg, &table, &requested, mode, confirm)?;
        if names.is_empty() {
            tracing::info!("{mode}: no targets");
            continue;
        }
        batches.push((mode, names));
    }

    let mut helper = Sshfs::default();
    for (mode, names) in batches {
        let mut orch = Orchestrator::new(&cfg, &table, &mut helper)
            .with_settle(Duration::from_secs(args.settle))
            .verbose(args.verbose);

        let outcome = match mode {
            Mode::Connect => orch.connect(&names),
            Mode::Disconnect => orch.disconnect(&names),
            Mode::Reconnect => orch.reconnect(&names),
        };

        if args.verbose {
            print!("{}", report::status_report(&outcome));
        }
    }

    Ok(())
}
