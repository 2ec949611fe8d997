//! Table descriptors derived from the live database schema.

use async_trait::async_trait;

use adminkit_app::ports::database::ColumnInfo;
use adminkit_app::ports::{Connection, GeneratorError, TableGenerator};
use adminkit_domain::action::Action;
use adminkit_domain::descriptor::{DEFAULT_PAGE_SIZE, TableDescriptor};
use adminkit_domain::field::{Field, FieldType, Widget};

/// Introspects the named table and exposes every column.
///
/// - Declared types map to field types following `SQLite` affinity rules.
/// - `NOT NULL` columns without a default are required.
/// - An integer primary key is assigned by the database and read-only.
/// - `created_at` / `updated_at` are read-only.
/// - Password columns use the password widget and never show in lists.
/// - A table without a single-column primary key is read-only (list and
///   export).
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    page_size: u32,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SchemaGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl TableGenerator for SchemaGenerator {
    async fn generate(
        &self,
        connection: &dyn Connection,
        name: &str,
    ) -> Result<TableDescriptor, GeneratorError> {
        let columns = connection.describe(name).await?;
        if columns.is_empty() {
            return Err(GeneratorError::TableNotFound(name.to_string()));
        }

        let mut builder = TableDescriptor::builder(name)
            .page_size(self.page_size)
            .fields(columns.iter().map(field));
        let keys: Vec<&ColumnInfo> = columns.iter().filter(|column| column.primary_key).collect();
        match keys.as_slice() {
            [pk] => builder = builder.primary_key(&pk.name),
            _ => {
                // records must be addressable by a single column to be edited
                tracing::warn!(
                    table = %name,
                    key_columns = keys.len(),
                    "no single-column primary key, exposing read-only"
                );
                let first = keys.first().copied().unwrap_or(&columns[0]);
                builder = builder
                    .primary_key(&first.name)
                    .actions([Action::List, Action::Export]);
            }
        }

        let descriptor = builder.build()?;
        tracing::debug!(table = %name, fields = descriptor.fields.len(), "descriptor generated");
        Ok(descriptor)
    }
}

fn field_type(sql_type: &str) -> FieldType {
    let declared = sql_type.to_ascii_uppercase();
    if declared.contains("BOOL") {
        FieldType::Boolean
    } else if declared.contains("DATETIME") || declared.contains("TIMESTAMP") {
        FieldType::DateTime
    } else if declared.contains("DATE") {
        FieldType::Date
    } else if declared.contains("INT") {
        FieldType::Integer
    } else if declared.contains("JSON") {
        FieldType::Json
    } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|affinity| declared.contains(affinity))
    {
        FieldType::Float
    } else {
        FieldType::Text
    }
}

fn field(column: &ColumnInfo) -> Field {
    let field_type = field_type(&column.sql_type);
    let name = column.name.to_ascii_lowercase();
    let mut field = Field::new(&column.name, field_type);

    if column.primary_key && field_type == FieldType::Integer {
        field = field.read_only();
    } else if column.not_null && !column.has_default {
        field = field.required();
    }

    if name.contains("password") {
        field = field
            .widget(Widget::Password)
            .hidden_in_list()
            .searchable(false)
            .sortable(false);
    } else if name == "email" || name.ends_with("_email") {
        field = field.widget(Widget::Email);
    }

    if matches!(name.as_str(), "created_at" | "updated_at") {
        field = field.read_only();
    }
    field
}
