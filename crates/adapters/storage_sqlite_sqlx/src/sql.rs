//! Builds parameterized statements from a [`TableDescriptor`].
//!
//! Identifiers come from validated descriptors and are quoted anyway; every
//! value travels as a bound parameter.

use adminkit_app::ports::database::{ListQuery, SortOrder};
use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::record::Record;
use serde_json::Value;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

pub(crate) fn quoted(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(table: &TableDescriptor) -> String {
    table
        .fields
        .iter()
        .map(|field| quoted(&field.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `WHERE` clause matching `search` against every searchable field.
fn search_clause(table: &TableDescriptor, search: Option<&str>, params: &mut Vec<Value>) -> String {
    let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) else {
        return String::new();
    };
    let pattern = format!("%{}%", escape_like(term));
    let conditions: Vec<String> = table
        .fields
        .iter()
        .filter(|field| field.searchable)
        .map(|field| {
            params.push(Value::String(pattern.clone()));
            format!("{} LIKE ? ESCAPE '\\'", quoted(&field.name))
        })
        .collect();
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE ({})", conditions.join(" OR "))
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn order_clause(table: &TableDescriptor, sort: Option<&(String, SortOrder)>) -> String {
    let (column, order) = sort
        .filter(|(name, _)| table.field(name).is_some_and(|field| field.sortable))
        .map_or((table.primary_key.as_str(), SortOrder::Asc), |(name, order)| {
            (name.as_str(), *order)
        });
    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {} {direction}", quoted(column))
}

pub(crate) fn list(table: &TableDescriptor, query: &ListQuery) -> Statement {
    let mut params = Vec::new();
    let filter = search_clause(table, query.search.as_deref(), &mut params);
    let mut sql = format!(
        "SELECT {} FROM {}{filter}{}",
        column_list(table),
        quoted(&table.name),
        order_clause(table, query.sort.as_ref()),
    );
    if let Some(per_page) = query.per_page {
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::from(per_page));
        params.push(Value::from(query.offset()));
    }
    Statement { sql, params }
}

pub(crate) fn count_matching(table: &TableDescriptor, search: Option<&str>) -> Statement {
    let mut params = Vec::new();
    let filter = search_clause(table, search, &mut params);
    Statement {
        sql: format!("SELECT COUNT(*) FROM {}{filter}", quoted(&table.name)),
        params,
    }
}

pub(crate) fn select_by_id(table: &TableDescriptor, id: &str) -> Statement {
    let mut statement = Statement::new(format!(
        "SELECT {} FROM {} WHERE {} = ?",
        column_list(table),
        quoted(&table.name),
        quoted(&table.primary_key),
    ));
    statement.params.push(Value::String(id.to_string()));
    statement
}

pub(crate) fn insert(table: &TableDescriptor, record: &Record) -> Statement {
    let returning = format!(" RETURNING {}", quoted(&table.primary_key));
    if record.is_empty() {
        return Statement::new(format!(
            "INSERT INTO {} DEFAULT VALUES{returning}",
            quoted(&table.name)
        ));
    }
    let columns: Vec<String> = record.keys().map(|name| quoted(name)).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}){returning}",
            quoted(&table.name),
            columns.join(", "),
        ),
        params: record.values().cloned().collect(),
    }
}

/// `None` when there is nothing to set.
pub(crate) fn update(table: &TableDescriptor, id: &str, record: &Record) -> Option<Statement> {
    if record.is_empty() {
        return None;
    }
    let assignments: Vec<String> = record
        .keys()
        .map(|name| format!("{} = ?", quoted(name)))
        .collect();
    let mut params: Vec<Value> = record.values().cloned().collect();
    params.push(Value::String(id.to_string()));
    Some(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quoted(&table.name),
            assignments.join(", "),
            quoted(&table.primary_key),
        ),
        params,
    })
}

pub(crate) fn delete(table: &TableDescriptor, id: &str) -> Statement {
    let mut statement = Statement::new(format!(
        "DELETE FROM {} WHERE {} = ?",
        quoted(&table.name),
        quoted(&table.primary_key),
    ));
    statement.params.push(Value::String(id.to_string()));
    statement
}

pub(crate) fn table_info(table: &str) -> String {
    format!("PRAGMA table_info({})", quoted(table))
}
