//! Field descriptors: the per-model schema.
//!
//! A model's schema is a statically allocated, ordered slice of [`FieldDef`]s with the
//! primary key first. Descriptors carry declaration and validation metadata only; field
//! values live on the model instance.

/// Column kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    Date,
    DateTime,
    DateTimeUtc,
}

/// A declared model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Column name
    pub name: &'static str,
    /// Column kind
    pub kind: FieldKind,
    /// Whether the Rust type can hold NULL
    pub nullable: bool,
    /// Whether an empty or unset value passes validation
    pub blank: bool,
    /// Whether this is the `id` primary key
    pub primary_key: bool,
}

impl FieldDef {
    /// A blank-allowed, non-key field.
    pub const fn new(name: &'static str, kind: FieldKind, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
            blank: true,
            primary_key: false,
        }
    }

    /// The implicit `id` primary key.
    pub const fn id() -> Self {
        Self {
            name: "id",
            kind: FieldKind::Integer,
            nullable: true,
            blank: true,
            primary_key: true,
        }
    }

    /// Require a non-empty value for the owning instance to be valid.
    pub const fn required(mut self) -> Self {
        self.blank = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_builders_compose() {
        const NAME: FieldDef = FieldDef::new("name", FieldKind::Text, true).required();
        assert_eq!(NAME.name, "name");
        assert!(!NAME.blank);
        assert!(!NAME.primary_key);

        let id = FieldDef::id();
        assert!(id.primary_key);
        assert!(id.blank);
        assert_eq!(id.kind, FieldKind::Integer);
    }
}
