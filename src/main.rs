mod cli;
mod error;
mod logging;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use arrange_config::Config;
use arrange_engine::session::{Confirm, Session};
use arrange_engine::{CollectOptions, Executor, LinkKind, Normalizer, Plan, SidecarAnalyzer, collect};
use clap::Parser;
use exn::ResultExt;
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    logging::init(&config.log.level, cli.quiet);
    let yes = cli.yes;
    run(cli, config, &|plan: &Plan| yes || ask(plan)).await
}

async fn run(cli: Cli, config: Config, gate: &impl Confirm) -> Result<ExitCode> {
    let output = std::path::absolute(&cli.output).map_err(ErrorKind::Io)?;
    let mode = cli.mode.unwrap_or(config.planning.mode);
    let options = CollectOptions {
        include_hidden: config.collect.include_hidden,
        exclude: vec![output.clone()],
    };
    let collection = collect(&cli.inputs, &options).await.or_raise(|| ErrorKind::Engine)?;
    let mut session = Session::new(collection);

    if mode.needs_analysis() {
        let analyzer = match &cli.analysis {
            Some(path) => SidecarAnalyzer::load(path).await.or_raise(|| ErrorKind::Engine)?,
            None => {
                warn!("no analysis sidecar given, every file will be filed under its original name");
                SidecarAnalyzer::default()
            },
        };
        session = session.analyze(&analyzer, &config.analysis.options()).await;
    }

    let mut builder = config.planning.builder().with_existing(&output).await.or_raise(|| ErrorKind::Engine)?;
    if cli.copy {
        builder = builder.link(LinkKind::Copy);
    }
    let strategy = mode.strategy(Normalizer::new(config.planning.normalizer));
    let planned = session.plan(builder, &*strategy);
    preview(planned.plan(), &output);

    if cli.dry_run || planned.plan().is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    // An unusable output root is reported before anyone is asked to confirm.
    let created = !output.exists();
    let executor = Executor::new(&output, config.execute).or_raise(|| ErrorKind::Engine)?;
    let confirmed = match planned.confirm(gate) {
        Ok(confirmed) => confirmed,
        Err(_) => {
            if created {
                _ = std::fs::remove_dir(&output);
            }
            println!("Nothing was changed.");
            return Ok(ExitCode::SUCCESS);
        },
    };

    let cancel = executor.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current file");
            cancel.cancel();
        }
    });
    let done = confirmed.execute(&executor).await.or_raise(|| ErrorKind::Engine)?;

    let summary = done.summary();
    print!("{summary}");
    if let Some(audit) = &config.log.audit_file {
        append_audit_log(audit, done.plan())?;
    }
    Ok(match summary.failed.is_empty() && summary.pending == 0 {
        true => ExitCode::SUCCESS,
        false => ExitCode::FAILURE,
    })
}

fn preview(plan: &Plan, output: &Path) {
    println!("{} ({} files by {})", output.display(), plan.len(), plan.mode());
    print!("{}", plan.tree());
    for diagnostic in plan.diagnostics() {
        println!("note: {diagnostic}");
    }
    for exclusion in plan.exclusions() {
        println!("skipped: {exclusion}");
    }
}

fn ask(plan: &Plan) -> bool {
    print!("Organize {} files? [y/N] ", plan.len());
    _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn append_audit_log(path: &Path, plan: &Plan) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path).map_err(ErrorKind::Io)?;
    plan.write_log(file).map_err(ErrorKind::Io)?;
    info!(path = %path.display(), "audit log written");
    Ok(())
}
