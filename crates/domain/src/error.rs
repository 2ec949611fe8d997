//! Error types for descriptor and input validation.

/// Structural problems in a [`TableDescriptor`](crate::descriptor::TableDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// The table name is empty.
    #[error("table name must not be empty")]
    EmptyName,

    /// A table name, route prefix or field name contains characters outside
    /// `[a-z0-9_-]` (fields additionally allow uppercase letters).
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// The descriptor declares no fields.
    #[error("table declares no fields")]
    NoFields,

    /// Two fields share the same name.
    #[error("duplicate field {0:?}")]
    DuplicateField(String),

    /// The primary key does not name a declared field.
    #[error("primary key {0:?} is not a declared field")]
    MissingPrimaryKey(String),

    /// The descriptor permits no actions at all.
    #[error("table permits no actions")]
    NoActions,

    /// A field that the engine must render has no label.
    #[error("field {0:?} has an empty label")]
    EmptyLabel(String),

    /// `page_size` is zero.
    #[error("page size must be positive")]
    ZeroPageSize,

    /// An access rule targets an action the table does not permit.
    #[error("access rule for {0} which is not a permitted action")]
    OrphanAccessRule(crate::action::Action),
}

/// A single field failing input coercion or validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldViolation {
    #[error("this field is required")]
    Required,

    #[error("expected {expected}")]
    Type { expected: &'static str },

    #[error("must be at least {0} characters")]
    TooShort(u32),

    #[error("must be at most {0} characters")]
    TooLong(u32),

    #[error("must be at least {0}")]
    BelowMinimum(String),

    #[error("must be at most {0}")]
    AboveMaximum(String),

    #[error("must be one of: {0}")]
    NotAllowed(String),
}
