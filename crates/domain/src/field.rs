//! Fields — one column of an admin table with its editor and validation rule.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldViolation;

/// Storage type of a field, used for input coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    DateTime,
    Json,
}

/// Display widget used by the theme to render a field editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Text,
    TextArea,
    Number,
    Checkbox,
    Select,
    Date,
    DateTime,
    Email,
    Password,
    Hidden,
    ReadOnly,
}

impl Widget {
    /// The widget a field of `field_type` gets when none is chosen explicitly.
    #[must_use]
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer | FieldType::Float => Self::Number,
            FieldType::Text => Self::Text,
            FieldType::Boolean => Self::Checkbox,
            FieldType::Date => Self::Date,
            FieldType::DateTime => Self::DateTime,
            FieldType::Json => Self::TextArea,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Date => "date",
            Self::DateTime => "datetime-local",
            Self::Email => "email",
            Self::Password => "password",
            Self::Hidden => "hidden",
            Self::ReadOnly => "readonly",
        }
    }
}

/// Constraints checked against a coerced field value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Closed set of accepted values, compared on their textual form.
    pub allowed: Vec<String>,
}

impl ValidationRule {
    /// Check a coerced value against the rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldViolation`] found.
    pub fn check(&self, value: &Value) -> Result<(), FieldViolation> {
        match value {
            Value::Null => {
                if self.required {
                    return Err(FieldViolation::Required);
                }
                return Ok(());
            }
            Value::String(s) => {
                let len = u32::try_from(s.chars().count()).unwrap_or(u32::MAX);
                if let Some(min) = self.min_length
                    && len < min
                {
                    return Err(FieldViolation::TooShort(min));
                }
                if let Some(max) = self.max_length
                    && len > max
                {
                    return Err(FieldViolation::TooLong(max));
                }
            }
            Value::Number(n) => {
                let n = n.as_f64().unwrap_or(f64::NAN);
                if let Some(min) = self.minimum
                    && n < min
                {
                    return Err(FieldViolation::BelowMinimum(min.to_string()));
                }
                if let Some(max) = self.maximum
                    && n > max
                {
                    return Err(FieldViolation::AboveMaximum(max.to_string()));
                }
            }
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => {}
        }

        if !self.allowed.is_empty() {
            let text = crate::record::display_value(value);
            if !self.allowed.iter().any(|allowed| *allowed == text) {
                return Err(FieldViolation::NotAllowed(self.allowed.join(", ")));
            }
        }
        Ok(())
    }
}

/// One column of an admin table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub widget: Widget,
    pub validation: ValidationRule,
    /// Shown as a column on the list page.
    pub list_visible: bool,
    /// Accepted from create/edit forms.
    pub editable: bool,
    /// Matched by the list page search box.
    pub searchable: bool,
    /// Usable as a list sort key.
    pub sortable: bool,
}

impl Field {
    /// Create a visible, editable field with the default widget for its type
    /// and a label derived from the name (`created_at` → `Created at`).
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            label: humanize(&name),
            name,
            field_type,
            widget: Widget::default_for(field_type),
            validation: ValidationRule::default(),
            list_visible: true,
            editable: true,
            searchable: field_type == FieldType::Text,
            sortable: true,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn widget(mut self, widget: Widget) -> Self {
        self.widget = widget;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.validation.required = true;
        self
    }

    #[must_use]
    pub fn validation(mut self, rule: ValidationRule) -> Self {
        self.validation = rule;
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    #[must_use]
    pub fn hidden_in_list(mut self) -> Self {
        self.list_visible = false;
        self
    }

    #[must_use]
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Coerce raw form input into a typed value and validate it.
    ///
    /// `None` means the form did not submit the field at all, which for a
    /// checkbox means "unchecked".
    ///
    /// # Errors
    ///
    /// Returns a [`FieldViolation`] when the input cannot be coerced to the
    /// field type or breaks the validation rule.
    pub fn parse_input(&self, raw: Option<&str>) -> Result<Value, FieldViolation> {
        let value = self.coerce(raw)?;
        self.validation.check(&value)?;
        Ok(value)
    }

    fn coerce(&self, raw: Option<&str>) -> Result<Value, FieldViolation> {
        if self.field_type == FieldType::Boolean {
            return match raw.map(str::trim) {
                None | Some("" | "false" | "0" | "off" | "no") => Ok(Value::Bool(false)),
                Some("true" | "1" | "on" | "yes") => Ok(Value::Bool(true)),
                Some(_) => Err(FieldViolation::Type {
                    expected: "a boolean",
                }),
            };
        }

        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Ok(Value::Null),
        };

        match self.field_type {
            FieldType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| FieldViolation::Type {
                    expected: "an integer",
                }),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or(FieldViolation::Type {
                    expected: "a number",
                }),
            FieldType::Json => serde_json::from_str(raw).map_err(|_| FieldViolation::Type {
                expected: "valid JSON",
            }),
            FieldType::Date => {
                let raw = raw.trim();
                if is_date(raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(FieldViolation::Type {
                        expected: "a date (YYYY-MM-DD)",
                    })
                }
            }
            FieldType::DateTime => {
                let raw = raw.trim();
                let time_sep = raw.as_bytes().get(10).copied();
                if raw.len() >= 16
                    && raw.get(..10).is_some_and(is_date)
                    && matches!(time_sep, Some(b'T' | b' '))
                {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(FieldViolation::Type {
                        expected: "a date and time (YYYY-MM-DDTHH:MM)",
                    })
                }
            }
            FieldType::Text | FieldType::Boolean => Ok(Value::String(raw.to_string())),
        }
    }
}

fn is_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
