mod args;
mod job;

use std::process::ExitCode;

use bulk_sql_loader::prelude::*;
use clap::Parser;

use crate::args::Args;
use crate::job::Job;

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(args.log_level)
        .init();

    match run(&args) {
        Ok(report) => {
            let summary =
                serde_json::to_string_pretty(&report).unwrap_or_else(|_| format!("{report:?}"));
            println!("{summary}");
            if report.aborted {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "bulk load failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<BatchRunReport, BulkLoaderError> {
    let options = resolve_options(args)?;
    let job = Job::load(&args.job)?;
    tracing::info!(
        statements = job.statements.len(),
        parameters = job.parameters.len(),
        limit = options.params_batch_limit,
        "loaded job"
    );

    let conn = SqliteOptionsBuilder::new(args.db.to_string_lossy())
        .wal(!args.no_wal)
        .build();
    let mut loader = BulkSqlLoader::with_options(conn, options)?;

    if args.suspend {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| BulkLoaderError::WorkerError(format!("failed to start runtime: {e}")))?;
        runtime.block_on(loader.execute_non_queries_async(
            &job.statements,
            &job.parameters,
            args.isolation,
        ))
    } else {
        loader.execute_non_queries(&job.statements, &job.parameters, args.isolation)
    }
}

fn resolve_options(args: &Args) -> Result<LoaderOptions, BulkLoaderError> {
    let base = match &args.settings {
        Some(path) => LoaderOptions::from_json_file(path)?,
        None => LoaderOptions::default(),
    };
    let raise = base.raise_on_failure || args.raise;
    let mut builder = LoaderOptionsBuilder::from(base).raise_on_failure(raise);
    if let Some(backend) = args.backend {
        builder = builder.backend(backend);
    }
    if let Some(limit) = args.limit {
        builder = builder.params_batch_limit(limit);
    }
    if let Some(attempts) = args.attempts {
        builder = builder.connect_attempts(attempts);
    }
    builder.build()
}
