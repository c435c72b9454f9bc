//! A statement whose placeholder count meets the ceiling on its own is sent
//! in a batch by itself instead of stalling the run.

mod common;

use bulk_sql_loader::prelude::*;
use bulk_sql_loader::test_utils::{DriverEvent, ScriptedConnection};
use common::with_captured_logs;
use tracing::Level;

fn statement(first: usize, n: usize) -> String {
    let names: Vec<String> = (first..first + n).map(|i| format!("@p{i}")).collect();
    format!("INSERT INTO wide VALUES ({})", names.join(", "))
}

#[test]
fn oversized_statement_runs_alone_with_a_warning() {
    let statements = vec![statement(0, 1), statement(1, 4), statement(5, 1)];
    let params: Vec<RowValues> = (0..6).map(RowValues::Int).collect();
    let options = LoaderOptions::builder()
        .params_batch_limit(3)
        .raise_on_failure(true)
        .build()
        .unwrap();
    let mut loader = BulkSqlLoader::with_options(ScriptedConnection::new(), options).unwrap();

    let (report, logs) = with_captured_logs(Level::WARN, || {
        loader.execute_non_queries(&statements, &params, IsolationLevel::default())
    });
    let report = report.unwrap();

    assert_eq!(report.batches_committed, 3);
    assert_eq!(report.parameters_bound, 6);
    loader
        .with_connection(|conn| {
            let executes: Vec<&DriverEvent> = conn
                .events()
                .iter()
                .filter(|e| matches!(e, DriverEvent::Execute { .. }))
                .collect();
            assert_eq!(
                executes,
                [
                    &DriverEvent::Execute { statements: 1, parameters: 1, ok: true },
                    &DriverEvent::Execute { statements: 1, parameters: 4, ok: true },
                    &DriverEvent::Execute { statements: 1, parameters: 1, ok: true },
                ]
            );
        })
        .unwrap();

    let output = logs.output();
    let warnings: Vec<&str> = output.lines().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "{output}");
    assert!(warnings[0].contains("statement=1"), "{output}");
}

#[test]
fn oversized_statement_lands_in_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("wide.db");
    let options = LoaderOptions::builder()
        .params_batch_limit(2)
        .raise_on_failure(true)
        .build()?;
    let mut loader =
        BulkSqlLoader::with_options(SqliteConnection::for_path(path.to_string_lossy()), options)?;

    loader.execute_non_query(
        "CREATE TABLE wide (a INTEGER, b INTEGER, c INTEGER, d INTEGER)",
        &[],
        IsolationLevel::default(),
    )?;
    let statements = [statement(0, 4), statement(4, 4)];
    let params: Vec<RowValues> = (0..8).map(RowValues::Int).collect();

    let report = loader.execute_non_queries(&statements, &params, IsolationLevel::default())?;

    assert_eq!(report.batches_committed, 2);
    let rs = loader.execute_query("SELECT a, d FROM wide ORDER BY a")?;
    assert_eq!(rs.len(), 2);
    assert_eq!(rs.results[1].get("a"), Some(&RowValues::Int(4)));
    assert_eq!(rs.results[1].get("d"), Some(&RowValues::Int(7)));
    Ok(())
}
