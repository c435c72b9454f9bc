use std::collections::BTreeSet;
use std::time::Duration;

use crate::driver::{Command, DbConnection};
use crate::error::BulkLoaderError;
use crate::results::ResultSet;
use crate::types::IsolationLevel;

/// Every call the loader made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Open { attempt: u32, ok: bool },
    Close,
    Dispose,
    Begin(IsolationLevel),
    Execute { statements: usize, parameters: usize, ok: bool },
    Commit { ok: bool },
    Rollback { ok: bool },
    Query(String),
}

/// In-memory `DbConnection` that records calls and fails on request.
///
/// Executed commands are held as pending until their transaction commits, so
/// tests can assert exactly which statements a run made durable.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    open: bool,
    in_transaction: bool,
    failing_opens: u32,
    open_attempts: u32,
    execute_calls: usize,
    commit_calls: usize,
    failing_executes: BTreeSet<usize>,
    failing_commits: BTreeSet<usize>,
    failing_rollbacks: bool,
    failing_queries: bool,
    execute_delay: Option<Duration>,
    query_result: ResultSet,
    pending: Vec<Command>,
    committed: Vec<Command>,
    events: Vec<DriverEvent>,
}

impl ScriptedConnection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` open attempts.
    #[must_use]
    pub fn failing_opens(mut self, count: u32) -> Self {
        self.failing_opens = count;
        self
    }

    /// Fail the `call`-th execute (1-based, counted over the handle's lifetime).
    #[must_use]
    pub fn failing_execute(mut self, call: usize) -> Self {
        self.failing_executes.insert(call);
        self
    }

    /// Fail the `call`-th commit (1-based).
    #[must_use]
    pub fn failing_commit(mut self, call: usize) -> Self {
        self.failing_commits.insert(call);
        self
    }

    #[must_use]
    pub fn failing_rollbacks(mut self) -> Self {
        self.failing_rollbacks = true;
        self
    }

    #[must_use]
    pub fn failing_queries(mut self) -> Self {
        self.failing_queries = true;
        self
    }

    /// Block every execute for `delay` before it completes.
    #[must_use]
    pub fn slow_executes(mut self, delay: Duration) -> Self {
        self.execute_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_query_result(mut self, result_set: ResultSet) -> Self {
        self.query_result = result_set;
        self
    }

    #[must_use]
    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    #[must_use]
    pub fn open_attempts(&self) -> u32 {
        self.open_attempts
    }

    /// Commands whose transaction committed, in commit order.
    #[must_use]
    pub fn committed(&self) -> &[Command] {
        &self.committed
    }

    /// Statements made durable, in order.
    #[must_use]
    pub fn committed_statements(&self) -> Vec<String> {
        self.committed
            .iter()
            .flat_map(|c| c.statements().map(str::to_owned))
            .collect()
    }

    #[must_use]
    pub fn count(&self, matches: impl Fn(&DriverEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(e)).count()
    }

    fn ensure_open(&self) -> Result<(), BulkLoaderError> {
        if self.open {
            Ok(())
        } else {
            Err(BulkLoaderError::DriverError("scripted connection is closed".into()))
        }
    }
}

impl DbConnection for ScriptedConnection {
    fn open(&mut self) -> Result<(), BulkLoaderError> {
        self.open_attempts += 1;
        let ok = self.failing_opens == 0;
        self.events.push(DriverEvent::Open {
            attempt: self.open_attempts,
            ok,
        });
        if !ok {
            self.failing_opens -= 1;
            return Err(BulkLoaderError::DriverError(format!(
                "scripted open failure #{}",
                self.open_attempts
            )));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BulkLoaderError> {
        if self.open {
            self.events.push(DriverEvent::Close);
        }
        self.open = false;
        self.in_transaction = false;
        self.pending.clear();
        Ok(())
    }

    fn dispose(&mut self) {
        self.events.push(DriverEvent::Dispose);
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), BulkLoaderError> {
        self.ensure_open()?;
        if self.in_transaction {
            return Err(BulkLoaderError::DriverError("transaction already open".into()));
        }
        self.events.push(DriverEvent::Begin(isolation));
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BulkLoaderError> {
        self.ensure_open()?;
        self.commit_calls += 1;
        let ok = !self.failing_commits.contains(&self.commit_calls);
        self.events.push(DriverEvent::Commit { ok });
        if !ok {
            return Err(BulkLoaderError::DriverError(format!(
                "scripted commit failure #{}",
                self.commit_calls
            )));
        }
        self.in_transaction = false;
        self.committed.append(&mut self.pending);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BulkLoaderError> {
        let ok = !self.failing_rollbacks;
        self.events.push(DriverEvent::Rollback { ok });
        self.in_transaction = false;
        self.pending.clear();
        if ok {
            Ok(())
        } else {
            Err(BulkLoaderError::DriverError("scripted rollback failure".into()))
        }
    }

    fn execute(&mut self, command: &Command) -> Result<usize, BulkLoaderError> {
        self.ensure_open()?;
        if let Some(delay) = self.execute_delay {
            std::thread::sleep(delay);
        }
        self.execute_calls += 1;
        let ok = !self.failing_executes.contains(&self.execute_calls);
        self.events.push(DriverEvent::Execute {
            statements: command.statement_count(),
            parameters: command.parameters().len(),
            ok,
        });
        if !ok {
            return Err(BulkLoaderError::DriverError(format!(
                "scripted execute failure #{}",
                self.execute_calls
            )));
        }
        if self.in_transaction {
            self.pending.push(command.clone());
        } else {
            self.committed.push(command.clone());
        }
        Ok(command.statement_count())
    }

    fn query(&mut self, sql: &str) -> Result<ResultSet, BulkLoaderError> {
        self.ensure_open()?;
        self.events.push(DriverEvent::Query(sql.to_owned()));
        if self.failing_queries {
            return Err(BulkLoaderError::DriverError("scripted query failure".into()));
        }
        Ok(self.query_result.clone())
    }
}
