//! Scripted executor and hand-written models shared by unit tests.

use crate::client::{Executor, Row};
use crate::error::{OrmError, OrmResult};
use crate::field::{FieldDef, FieldKind};
use crate::model::Model;
use crate::record::Record;
use crate::sql::Dialect;
use crate::value::{FieldValue, Value};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// Canned response for the next executor call.
#[derive(Debug)]
pub(crate) enum Reply {
    Rows(Vec<Row>),
    Affected(u64),
    Inserted(i64),
    Fail(String),
}

/// Records every statement and answers from a queue of [`Reply`]s.
///
/// With the queue empty, `fetch` returns no rows, `execute` affects nothing and
/// `insert` hands out increasing ids starting at 1.
pub(crate) struct MockExecutor {
    dialect: Dialect,
    statements: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
    next_id: AtomicI64,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::MySql)
    }

    pub fn postgres() -> Self {
        Self::with_dialect(Dialect::Postgres)
    }

    fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn rows(self, rows: Vec<Row>) -> Self {
        self.reply(Reply::Rows(rows))
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn last_statement(&self) -> Option<String> {
        self.statements.lock().unwrap().last().cloned()
    }

    fn record(&self, sql: &str) -> Option<Reply> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.replies.lock().unwrap().pop_front()
    }
}

fn unexpected(reply: Reply, call: &str) -> OrmError {
    OrmError::Other(format!("scripted {reply:?} does not answer {call}"))
}

impl Executor for MockExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch(&self, sql: &str) -> OrmResult<Vec<Row>> {
        match self.record(sql) {
            None => Ok(Vec::new()),
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            Some(other) => Err(unexpected(other, "fetch")),
        }
    }

    async fn execute(&self, sql: &str) -> OrmResult<u64> {
        match self.record(sql) {
            None => Ok(0),
            Some(Reply::Affected(n)) => Ok(n),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            Some(other) => Err(unexpected(other, "execute")),
        }
    }

    async fn insert(&self, sql: &str) -> OrmResult<i64> {
        match self.record(sql) {
            None => Ok(self.next_id.fetch_add(1, Ordering::SeqCst)),
            Some(Reply::Inserted(id)) => Ok(id),
            Some(Reply::Fail(message)) => Err(OrmError::Other(message)),
            Some(other) => Err(unexpected(other, "insert")),
        }
    }
}

/// A model with nothing but its id.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Bare {
    pub id: Option<i64>,
}

impl fmt::Display for Bare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Object")
    }
}

impl Model for Bare {
    const NAME: &'static str = "Model";
    const TABLE: &'static str = "model";
    const SCHEMA: &'static [FieldDef] = &[FieldDef::id()];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![self.id.to_value()]
    }

    fn from_record(record: &Record) -> OrmResult<Self> {
        Ok(Self {
            id: record.decode("id")?,
        })
    }
}

/// A to-do item belonging to a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct HelperModel {
    pub id: Option<i64>,
    pub list_id: Option<i64>,
    pub name: Option<String>,
}

impl HelperModel {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn row(id: i64, list_id: i64, name: &str) -> Row {
        vec![Value::Int(id), Value::Int(list_id), Value::from(name)]
    }
}

impl fmt::Display for HelperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

impl Model for HelperModel {
    const NAME: &'static str = "HelperModel";
    const TABLE: &'static str = "helpermodel";
    const SCHEMA: &'static [FieldDef] = &[
        FieldDef::id(),
        FieldDef::new("list_id", FieldKind::Integer, true).required(),
        FieldDef::new("name", FieldKind::Text, true).required(),
    ];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.to_value(),
            self.list_id.to_value(),
            self.name.to_value(),
        ]
    }

    fn from_record(record: &Record) -> OrmResult<Self> {
        Ok(Self {
            id: record.decode("id")?,
            list_id: record.decode("list_id")?,
            name: record.decode("name")?,
        })
    }
}
