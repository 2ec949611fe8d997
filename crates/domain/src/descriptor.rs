//! Table descriptors — the artifact a generator produces for one admin table.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::access::{AccessRule, Principal};
use crate::action::Action;
use crate::error::{DescriptorError, FieldViolation};
use crate::field::{Field, Widget};
use crate::record::Record;

/// Default number of records shown per list page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Which form a submission comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Per-field violations collected while reading a form.
pub type FormErrors = BTreeMap<String, FieldViolation>;

/// Everything the engine needs to expose one table: fields, permitted
/// actions and the access rules guarding them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Storage name of the table.
    pub name: String,
    /// Human readable title.
    pub title: String,
    /// URL segment under the admin prefix (`/admin/<route_prefix>`).
    pub route_prefix: String,
    /// Name of the primary key field.
    pub primary_key: String,
    pub fields: Vec<Field>,
    pub actions: BTreeSet<Action>,
    /// Actions without an entry are open to every principal.
    pub access: BTreeMap<Action, AccessRule>,
    pub page_size: u32,
}

impl TableDescriptor {
    /// Create a builder for constructing a [`TableDescriptor`].
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableDescriptorBuilder {
        TableDescriptorBuilder::new(name.into())
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`DescriptorError`] found.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if !is_identifier(&self.name) {
            return Err(DescriptorError::InvalidIdentifier(self.name.clone()));
        }
        if !is_route_segment(&self.route_prefix) {
            return Err(DescriptorError::InvalidIdentifier(self.route_prefix.clone()));
        }
        if self.fields.is_empty() {
            return Err(DescriptorError::NoFields);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_identifier(&field.name) {
                return Err(DescriptorError::InvalidIdentifier(field.name.clone()));
            }
            if field.label.trim().is_empty() {
                return Err(DescriptorError::EmptyLabel(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DescriptorError::DuplicateField(field.name.clone()));
            }
        }

        if self.field(&self.primary_key).is_none() {
            return Err(DescriptorError::MissingPrimaryKey(self.primary_key.clone()));
        }
        if self.actions.is_empty() {
            return Err(DescriptorError::NoActions);
        }
        if let Some(action) = self.access.keys().find(|a| !self.actions.contains(a)) {
            return Err(DescriptorError::OrphanAccessRule(*action));
        }
        if self.page_size == 0 {
            return Err(DescriptorError::ZeroPageSize);
        }
        Ok(())
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the table permits `action` at all.
    #[must_use]
    pub fn permits(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Whether `principal` may perform `action` on this table.
    #[must_use]
    pub fn allows(&self, action: Action, principal: &Principal) -> bool {
        self.permits(action)
            && self
                .access
                .get(&action)
                .is_none_or(|rule| rule.permits(principal))
    }

    /// Fields shown as list columns, primary key first.
    pub fn list_fields(&self) -> impl Iterator<Item = &Field> {
        let pk = self.field(&self.primary_key);
        pk.into_iter().chain(
            self.fields
                .iter()
                .filter(|f| f.list_visible && f.name != self.primary_key),
        )
    }

    /// Fields accepted by the create or edit form.
    ///
    /// The primary key is only accepted on create, and only when editable.
    pub fn form_fields(&self, mode: FormMode) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| {
            f.editable && (mode == FormMode::Create || f.name != self.primary_key)
        })
    }

    /// Coerce and validate a submitted form into a record.
    ///
    /// Fields the form is not allowed to set are ignored. Empty input on
    /// create is omitted so the database default applies, and a blank
    /// password on edit keeps the stored value.
    ///
    /// # Errors
    ///
    /// Returns every field violation, keyed by field name.
    pub fn record_from_form<S: std::hash::BuildHasher>(
        &self,
        input: &HashMap<String, String, S>,
        mode: FormMode,
    ) -> Result<Record, FormErrors> {
        let mut record = Record::new();
        let mut errors = FormErrors::new();
        for field in self.form_fields(mode) {
            let raw = input.get(&field.name).map(String::as_str);
            if mode == FormMode::Edit
                && field.widget == Widget::Password
                && raw.is_none_or(str::is_empty)
            {
                continue;
            }
            match field.parse_input(raw) {
                Ok(serde_json::Value::Null) if mode == FormMode::Create => {}
                Ok(value) => {
                    record.insert(field.name.clone(), value);
                }
                Err(violation) => {
                    errors.insert(field.name.clone(), violation);
                }
            }
        }
        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

/// Step-by-step builder for [`TableDescriptor`].
#[derive(Debug)]
pub struct TableDescriptorBuilder {
    name: String,
    title: Option<String>,
    route_prefix: Option<String>,
    primary_key: String,
    fields: Vec<Field>,
    actions: BTreeSet<Action>,
    access: BTreeMap<Action, AccessRule>,
    page_size: u32,
}

impl TableDescriptorBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            title: None,
            route_prefix: None,
            primary_key: "id".to_string(),
            fields: Vec::new(),
            actions: Action::ALL.into_iter().collect(),
            access: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Replace the permitted action set (all actions by default).
    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn access(mut self, action: Action, rule: AccessRule) -> Self {
        self.access.insert(action, rule);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Consume the builder, validate, and return a [`TableDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if the result breaks an invariant.
    pub fn build(self) -> Result<TableDescriptor, DescriptorError> {
        let descriptor = TableDescriptor {
            title: self.title.unwrap_or_else(|| title_case(&self.name)),
            route_prefix: self
                .route_prefix
                .unwrap_or_else(|| self.name.to_ascii_lowercase()),
            name: self.name,
            primary_key: self.primary_key,
            fields: self.fields,
            actions: self.actions,
            access: self.access,
            page_size: self.page_size,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_route_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde_json::json;

    fn users() -> TableDescriptor {
        TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer).read_only())
            .field(Field::new("email", FieldType::Text).required())
            .field(Field::new("active", FieldType::Boolean))
            .field(Field::new("password_hash", FieldType::Text).hidden_in_list())
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_with_defaults() {
        let table = users();
        assert_eq!(table.title, "Users");
        assert_eq!(table.route_prefix, "users");
        assert_eq!(table.primary_key, "id");
        assert_eq!(table.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(table.actions.len(), Action::ALL.len());
    }

    #[test]
    fn should_title_case_multi_word_names() {
        let table = TableDescriptor::builder("order_items")
            .field(Field::new("id", FieldType::Integer))
            .build()
            .unwrap();
        assert_eq!(table.title, "Order Items");
        assert_eq!(table.route_prefix, "order_items");
    }

    #[test]
    fn should_reject_empty_name() {
        let result = TableDescriptor::builder("")
            .field(Field::new("id", FieldType::Integer))
            .build();
        assert_eq!(result, Err(DescriptorError::EmptyName));
    }

    #[test]
    fn should_reject_table_without_fields() {
        let result = TableDescriptor::builder("users").build();
        assert_eq!(result, Err(DescriptorError::NoFields));
    }

    #[test]
    fn should_reject_duplicate_fields() {
        let result = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .field(Field::new("id", FieldType::Text))
            .build();
        assert_eq!(result, Err(DescriptorError::DuplicateField("id".to_string())));
    }

    #[test]
    fn should_reject_unknown_primary_key() {
        let result = TableDescriptor::builder("users")
            .primary_key("uuid")
            .field(Field::new("id", FieldType::Integer))
            .build();
        assert_eq!(
            result,
            Err(DescriptorError::MissingPrimaryKey("uuid".to_string()))
        );
    }

    #[test]
    fn should_reject_route_prefix_with_slash() {
        let result = TableDescriptor::builder("users")
            .route_prefix("users/extra")
            .field(Field::new("id", FieldType::Integer))
            .build();
        assert_eq!(
            result,
            Err(DescriptorError::InvalidIdentifier("users/extra".to_string()))
        );
    }

    #[test]
    fn should_reject_empty_action_set() {
        let result = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .actions([])
            .build();
        assert_eq!(result, Err(DescriptorError::NoActions));
    }

    #[test]
    fn should_reject_access_rule_for_unpermitted_action() {
        let result = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .actions([Action::List])
            .access(Action::Delete, AccessRule::roles(["admin"]))
            .build();
        assert_eq!(
            result,
            Err(DescriptorError::OrphanAccessRule(Action::Delete))
        );
    }

    #[test]
    fn should_reject_zero_page_size() {
        let result = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .page_size(0)
            .build();
        assert_eq!(result, Err(DescriptorError::ZeroPageSize));
    }

    #[test]
    fn should_apply_access_rules_per_action() {
        let table = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .access(Action::Delete, AccessRule::roles(["admin"]))
            .build()
            .unwrap();
        let anonymous = Principal::anonymous();
        let admin = Principal::anonymous().with_role("admin");

        assert!(table.allows(Action::List, &anonymous));
        assert!(!table.allows(Action::Delete, &anonymous));
        assert!(table.allows(Action::Delete, &admin));
    }

    #[test]
    fn should_deny_unpermitted_action_even_for_admin() {
        let table = TableDescriptor::builder("users")
            .field(Field::new("id", FieldType::Integer))
            .actions([Action::List])
            .build()
            .unwrap();
        let admin = Principal::anonymous().with_role("admin");
        assert!(!table.allows(Action::Delete, &admin));
    }

    #[test]
    fn should_list_primary_key_first_and_skip_hidden_fields() {
        let table = users();
        let names: Vec<&str> = table.list_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "active"]);
    }

    #[test]
    fn should_exclude_read_only_fields_from_forms() {
        let table = users();
        let names: Vec<&str> = table
            .form_fields(FormMode::Create)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["email", "active", "password_hash"]);
    }

    #[test]
    fn should_build_record_from_form() {
        let table = users();
        let input = HashMap::from([
            ("email".to_string(), "ada@example.com".to_string()),
            ("active".to_string(), "on".to_string()),
            ("id".to_string(), "99".to_string()),
        ]);
        let record = table.record_from_form(&input, FormMode::Create).unwrap();
        assert_eq!(record.get("email"), Some(&json!("ada@example.com")));
        assert_eq!(record.get("active"), Some(&json!(true)));
        assert!(!record.contains_key("id"));
    }

    #[test]
    fn should_collect_every_violation_from_form() {
        let table = TableDescriptor::builder("orders")
            .field(Field::new("id", FieldType::Integer).read_only())
            .field(Field::new("customer", FieldType::Text).required())
            .field(Field::new("total", FieldType::Float))
            .build()
            .unwrap();
        let input = HashMap::from([("total".to_string(), "lots".to_string())]);
        let errors = table
            .record_from_form(&input, FormMode::Edit)
            .unwrap_err();
        assert_eq!(errors.get("customer"), Some(&FieldViolation::Required));
        assert!(matches!(
            errors.get("total"),
            Some(FieldViolation::Type { .. })
        ));
    }

    #[test]
    fn should_leave_empty_values_to_database_on_create() {
        let table = TableDescriptor::builder("tags")
            .field(Field::new("id", FieldType::Integer))
            .field(Field::new("label", FieldType::Text))
            .build()
            .unwrap();
        let input = HashMap::from([("label".to_string(), "rust".to_string())]);
        let record = table.record_from_form(&input, FormMode::Create).unwrap();
        assert!(!record.contains_key("id"));

        let record = table
            .record_from_form(&HashMap::new(), FormMode::Create)
            .unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn should_clear_optional_value_on_edit_but_keep_blank_password() {
        let table = TableDescriptor::builder("accounts")
            .field(Field::new("id", FieldType::Integer).read_only())
            .field(Field::new("nickname", FieldType::Text))
            .field(
                Field::new("password", FieldType::Text)
                    .widget(Widget::Password)
                    .required(),
            )
            .build()
            .unwrap();
        let input = HashMap::from([
            ("nickname".to_string(), String::new()),
            ("password".to_string(), String::new()),
        ]);
        let record = table.record_from_form(&input, FormMode::Edit).unwrap();
        assert_eq!(record.get("nickname"), Some(&serde_json::Value::Null));
        assert!(!record.contains_key("password"));
    }
}
