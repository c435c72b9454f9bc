//! Failure policy: what is committed, what is returned and what is swallowed
//! when a batch, statement or query fails part way.

use bulk_sql_loader::prelude::*;
use bulk_sql_loader::test_utils::{DriverEvent, ScriptedConnection};
use tempfile::TempDir;

fn pairs(count: usize) -> (Vec<String>, Vec<RowValues>) {
    let statements = (0..count)
        .map(|i| format!("INSERT INTO t (a, b) VALUES (@p{}, @p{})", 2 * i, 2 * i + 1))
        .collect();
    let params = (0..2 * count as i64).map(RowValues::Int).collect();
    (statements, params)
}

fn loader(conn: ScriptedConnection, limit: usize, raise: bool) -> BulkSqlLoader<ScriptedConnection> {
    let options = LoaderOptions::builder()
        .params_batch_limit(limit)
        .raise_on_failure(raise)
        .build()
        .unwrap();
    BulkSqlLoader::with_options(conn, options).unwrap()
}

#[test]
fn swallowed_failure_keeps_earlier_batches() {
    let (statements, params) = pairs(3);
    let mut loader = loader(ScriptedConnection::new().failing_execute(2), 5, false);

    let report = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap();

    assert!(report.aborted);
    assert_eq!(report.batches_committed, 1);
    assert_eq!(report.statements_committed, 2);
    loader
        .with_connection(|conn| {
            assert_eq!(conn.committed_statements(), statements[..2]);
            assert_eq!(conn.count(|e| *e == DriverEvent::Rollback { ok: true }), 1);
            assert_eq!(conn.events().last(), Some(&DriverEvent::Close));
        })
        .unwrap();
}

#[test]
fn raised_failure_names_the_batch() {
    let (statements, params) = pairs(3);
    let mut loader = loader(ScriptedConnection::new().failing_execute(2), 5, true);

    let err = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap_err();

    match err {
        BulkLoaderError::BatchError {
            batch,
            first_statement,
            source,
        } => {
            assert_eq!(batch, 2);
            assert_eq!(first_statement, 2);
            assert!(matches!(*source, BulkLoaderError::DriverError(_)));
        }
        other => panic!("expected a batch error, got {other:?}"),
    }
    loader
        .with_connection(|conn| {
            assert_eq!(conn.committed().len(), 1);
            assert!(!conn.is_open());
        })
        .unwrap();
}

#[test]
fn failed_commit_rolls_the_batch_back() {
    let (statements, params) = pairs(3);
    let mut loader = loader(ScriptedConnection::new().failing_commit(1), 5, false);

    let report = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap();

    assert!(report.aborted);
    assert_eq!(report.batches_committed, 0);
    loader
        .with_connection(|conn| {
            assert!(conn.committed().is_empty());
            assert_eq!(conn.count(|e| matches!(e, DriverEvent::Rollback { .. })), 1);
            // the run stops at the failed batch
            assert_eq!(conn.count(|e| matches!(e, DriverEvent::Begin(_))), 1);
        })
        .unwrap();
}

#[test]
fn rollback_failure_does_not_mask_the_cause() {
    let (statements, params) = pairs(2);
    let conn = ScriptedConnection::new().failing_execute(1).failing_rollbacks();
    let mut loader = loader(conn, 100, true);

    let err = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap_err();

    match err {
        BulkLoaderError::BatchError { source, .. } => match *source {
            BulkLoaderError::DriverError(message) => assert!(message.contains("execute")),
            other => panic!("expected the execute failure, got {other:?}"),
        },
        other => panic!("expected a batch error, got {other:?}"),
    }
    loader
        .with_connection(|conn| {
            assert_eq!(conn.count(|e| *e == DriverEvent::Rollback { ok: false }), 1);
        })
        .unwrap();
}

#[test]
fn short_parameter_vector_surfaces_even_when_swallowing() {
    let (statements, mut params) = pairs(2);
    params.truncate(3);
    // limit 3 puts each statement in its own batch
    let mut loader = loader(ScriptedConnection::new(), 3, false);

    let err = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap_err();

    assert!(matches!(
        err,
        BulkLoaderError::ParameterAlignmentError {
            statement: 1,
            needed: 3,
            available: 3
        }
    ));
    loader
        .with_connection(|conn| {
            assert_eq!(conn.committed_statements(), statements[..1]);
            assert!(!conn.is_open());
        })
        .unwrap();
}

#[test]
fn non_query_failure_returns_minus_one_when_swallowing() {
    let mut swallowing = loader(ScriptedConnection::new().failing_execute(1), 5, false);
    let rows = swallowing
        .execute_non_query("DELETE FROM t", &[], IsolationLevel::default())
        .unwrap();
    assert_eq!(rows, SWALLOWED_FAILURE_ROWS);

    let mut raising = loader(ScriptedConnection::new().failing_execute(1), 5, true);
    let err = raising
        .execute_non_query("DELETE FROM t", &[], IsolationLevel::default())
        .unwrap_err();
    assert!(matches!(err, BulkLoaderError::StatementError { .. }));
    raising
        .with_connection(|conn| {
            assert!(conn.committed().is_empty());
            assert_eq!(conn.events().last(), Some(&DriverEvent::Close));
        })
        .unwrap();
}

#[test]
fn non_query_alignment_fails_before_connecting() {
    let mut loader = loader(ScriptedConnection::new(), 5, false);

    let err = loader
        .execute_non_query(
            "UPDATE t SET a = @p0 WHERE b = @p1",
            &[RowValues::Int(1)],
            IsolationLevel::default(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BulkLoaderError::ParameterAlignmentError {
            needed: 1,
            available: 1,
            ..
        }
    ));
    loader
        .with_connection(|conn| assert_eq!(conn.open_attempts(), 0))
        .unwrap();
}

#[test]
fn query_failure_returns_empty_result_when_swallowing() {
    let mut swallowing = loader(ScriptedConnection::new().failing_queries(), 5, false);
    assert!(swallowing.execute_query("SELECT * FROM t").unwrap().is_empty());
    assert!(swallowing.column_names("t").unwrap().is_empty());

    let mut raising = loader(ScriptedConnection::new().failing_queries(), 5, true);
    let err = raising.execute_query("SELECT * FROM t").unwrap_err();
    assert!(matches!(err, BulkLoaderError::QueryError { .. }));
}

#[test]
fn scripted_query_result_is_passed_through() {
    let mut rs = ResultSet::with_columns(vec!["a".into(), "b".into()]);
    rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("x".into())]);
    let mut loader = loader(ScriptedConnection::new().with_query_result(rs), 5, true);

    assert_eq!(loader.column_names("t").unwrap(), ["a", "b"]);
    loader
        .with_connection(|conn| {
            assert!(conn.events().contains(&DriverEvent::Query("SELECT * FROM t WHERE 1 = 0".into())));
        })
        .unwrap();
}

fn sqlite_loader(dir: &TempDir, raise: bool) -> BulkSqlLoader<SqliteConnection> {
    let path = dir.path().join("partial.db");
    let options = LoaderOptions::builder()
        .params_batch_limit(5)
        .raise_on_failure(raise)
        .build()
        .unwrap();
    BulkSqlLoader::with_options(SqliteConnection::for_path(path.to_string_lossy()), options)
        .unwrap()
}

#[test]
fn sqlite_keeps_committed_batches_only() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut loader = sqlite_loader(&dir, false);
    loader.execute_non_query(
        "CREATE TABLE t (a INTEGER PRIMARY KEY, b INTEGER)",
        &[],
        IsolationLevel::default(),
    )?;

    // the second batch reuses a primary key and fails
    let statements = [
        "INSERT INTO t (a, b) VALUES (@p0, @p1)",
        "INSERT INTO t (a, b) VALUES (@p2, @p3)",
        "INSERT INTO t (a, b) VALUES (@p4, @p5)",
        "INSERT INTO t (a, b) VALUES (@p6, @p7)",
    ];
    let params: Vec<RowValues> = [1, 10, 2, 20, 3, 30, 1, 40]
        .into_iter()
        .map(RowValues::Int)
        .collect();

    let report = loader.execute_non_queries(&statements, &params, IsolationLevel::default())?;

    assert!(report.aborted);
    assert_eq!(report.batches_committed, 1);
    let rs = loader.execute_query("SELECT a FROM t ORDER BY a")?;
    let keys: Vec<i64> = rs.iter().filter_map(|row| row.get("a")?.as_int().copied()).collect();
    assert_eq!(keys, [1, 2]);

    let mut raising = sqlite_loader(&dir, true);
    let err = raising
        .execute_non_queries(
            &["INSERT INTO t (a, b) VALUES (@p0, @p1)"],
            &[RowValues::Int(2), RowValues::Int(50)],
            IsolationLevel::default(),
        )
        .unwrap_err();
    assert!(matches!(err, BulkLoaderError::BatchError { batch: 1, .. }));
    Ok(())
}

#[test]
fn raise_flag_can_be_flipped_between_calls() {
    let conn = ScriptedConnection::new().failing_execute(1).failing_execute(2);
    let mut loader = loader(conn, 5, false);

    let rows = loader
        .execute_non_query("DELETE FROM t", &[], IsolationLevel::default())
        .unwrap();
    assert_eq!(rows, SWALLOWED_FAILURE_ROWS);

    loader.set_raise_on_failure(true);
    assert!(loader.options().raise_on_failure);
    let err = loader
        .execute_non_query("DELETE FROM t", &[], IsolationLevel::default())
        .unwrap_err();
    assert!(matches!(err, BulkLoaderError::StatementError { .. }));
}

#[test]
fn batch_limit_can_be_changed_between_calls() {
    let (statements, params) = pairs(3);
    let mut loader = loader(ScriptedConnection::new(), 100, true);

    let report = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap();
    assert_eq!(report.batches_committed, 1);

    loader.set_params_batch_limit(3).unwrap();
    let report = loader
        .execute_non_queries(&statements, &params, IsolationLevel::default())
        .unwrap();
    assert_eq!(report.batches_committed, 3);

    let err = loader.set_params_batch_limit(0).unwrap_err();
    assert!(matches!(err, BulkLoaderError::ConfigError(_)));
    assert_eq!(loader.options().params_batch_limit, 3);
}
