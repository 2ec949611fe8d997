//! In-memory collaborators for router tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use adminkit_app::ports::database::{ColumnInfo, ListQuery, RecordPage};
use adminkit_app::ports::theme::{DetailView, FormView, ListView, PageView};
use adminkit_app::ports::{Connection, DatabaseError, ThemeAdapter, ThemeError};
use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::record::{Record, display_value, record_id};

/// Tables kept as vectors of records; integer ids are assigned on insert.
#[derive(Default)]
pub(crate) struct MemoryConnection {
    tables: Mutex<BTreeMap<String, Vec<Record>>>,
    /// Reject the next writes with a constraint violation.
    pub reject_writes: AtomicBool,
    closed: AtomicBool,
}

impl MemoryConnection {
    pub fn seed(&self, table: &str, records: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        for value in records {
            let Value::Object(record) = value else {
                panic!("expected an object");
            };
            rows.push(record);
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<(), DatabaseError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(DatabaseError::Constraint("UNIQUE constraint failed".to_string()))
        } else {
            Ok(())
        }
    }
}

fn matches(table: &TableDescriptor, record: &Record, search: Option<&str>) -> bool {
    let Some(term) = search else {
        return true;
    };
    let term = term.to_lowercase();
    table.fields.iter().filter(|f| f.searchable).any(|field| {
        record
            .get(&field.name)
            .is_some_and(|value| display_value(value).to_lowercase().contains(&term))
    })
}

#[async_trait]
impl Connection for MemoryConnection {
    fn driver(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn describe(&self, _table: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn list(
        &self,
        table: &TableDescriptor,
        query: &ListQuery,
    ) -> Result<RecordPage, DatabaseError> {
        let matching: Vec<Record> = self
            .rows(&table.name)
            .into_iter()
            .filter(|record| matches(table, record, query.search.as_deref()))
            .collect();
        let total = matching.len() as u64;
        let records = match query.per_page {
            Some(per_page) => matching
                .into_iter()
                .skip(usize::try_from(query.offset()).unwrap())
                .take(per_page as usize)
                .collect(),
            None => matching,
        };
        Ok(RecordPage {
            records,
            total,
            page: query.page.max(1),
            per_page: query.per_page,
        })
    }

    async fn fetch(
        &self,
        table: &TableDescriptor,
        id: &str,
    ) -> Result<Option<Record>, DatabaseError> {
        Ok(self
            .rows(&table.name)
            .into_iter()
            .find(|record| record_id(record, &table.primary_key).as_deref() == Some(id)))
    }

    async fn insert(
        &self,
        table: &TableDescriptor,
        record: &Record,
    ) -> Result<String, DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.name.clone()).or_default();
        let mut record = record.clone();
        let id = record_id(&record, &table.primary_key).unwrap_or_else(|| {
            let next = rows.len() + 1;
            record.insert(table.primary_key.clone(), Value::from(next));
            next.to_string()
        });
        rows.push(record);
        Ok(id)
    }

    async fn update(
        &self,
        table: &TableDescriptor,
        id: &str,
        record: &Record,
    ) -> Result<(), DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .get_mut(&table.name)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| record_id(row, &table.primary_key).as_deref() == Some(id))
            })
            .ok_or(DatabaseError::NotFound)?;
        for (name, value) in record {
            row.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete(&self, table: &TableDescriptor, id: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.get_mut(&table.name).ok_or(DatabaseError::NotFound)?;
        let before = rows.len();
        rows.retain(|row| record_id(row, &table.primary_key).as_deref() != Some(id));
        if rows.len() == before {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn count(&self, table: &TableDescriptor) -> Result<u64, DatabaseError> {
        Ok(self.rows(&table.name).len() as u64)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Renders one summary line per view so tests can assert on it.
pub(crate) struct EchoTheme;

impl ThemeAdapter for EchoTheme {
    fn render_list(&self, view: &ListView<'_>) -> Result<String, ThemeError> {
        let ids: Vec<String> = view
            .page
            .records
            .iter()
            .filter_map(|record| record_id(record, &view.table.primary_key))
            .collect();
        Ok(format!(
            "list {} total={} ids=[{}] search={} create={} delete={}",
            view.table.name,
            view.page.total,
            ids.join(","),
            view.search,
            view.can_create,
            view.can_delete,
        ))
    }

    fn render_detail(&self, view: &DetailView<'_>) -> Result<String, ThemeError> {
        Ok(format!(
            "detail {} {}",
            view.table.name,
            Value::Object(view.record.clone())
        ))
    }

    fn render_form(&self, view: &FormView<'_>) -> Result<String, ThemeError> {
        let errors: Vec<&str> = view.errors.keys().map(String::as_str).collect();
        Ok(format!(
            "form {:?} action={} errors=[{}] values={}",
            view.mode,
            view.action,
            errors.join(","),
            Value::Object(view.values.clone())
        ))
    }

    fn render_page(&self, view: &PageView<'_>) -> Result<String, ThemeError> {
        Ok(format!("page {} {}", view.title, view.body_html))
    }
}
