//! The `Model` trait: a record type mapped to one table.

use crate::client::{Executor, Row};
use crate::error::{OrmError, OrmResult};
use crate::field::FieldDef;
use crate::query::Manager;
use crate::record::Record;
use crate::serializer;
use crate::sql;
use crate::value::Value;
use std::fmt;
use std::future::Future;

/// A record type with an explicit, ordered field schema.
///
/// Usually derived:
///
/// ```ignore
/// use minorm::Model;
///
/// #[derive(Debug, Clone, Default, Model)]
/// #[orm(display = "name")]
/// struct HelperModel {
///     id: Option<i64>,
///     #[orm(blank = false)]
///     list_id: Option<i64>,
///     #[orm(blank = false)]
///     name: Option<String>,
/// }
///
/// let saved = HelperModel { name: Some("Cat".into()), list_id: Some(7), ..Default::default() }
///     .save(&db)
///     .await?;
/// let same = HelperModel::objects().get(&db, [Filter::eq("id", saved.id)]).await?;
/// ```
///
/// `SCHEMA` lists `id` first, then the declared fields in declaration order; `values`
/// must return one value per schema entry in the same order.
pub trait Model: Sized + Send + Sync + fmt::Display + 'static {
    /// Type name, used by [`Model::repr`].
    const NAME: &'static str;
    /// Table name (the lowercased type name unless overridden).
    const TABLE: &'static str;
    /// Ordered field schema, `id` first.
    const SCHEMA: &'static [FieldDef];

    /// Primary key; `None` until persisted.
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    /// Current field values in schema order.
    fn values(&self) -> Vec<Value>;

    /// Construct from a mapping. Only schema names are read; other keys are ignored and
    /// absent names decode as NULL.
    fn from_record(record: &Record) -> OrmResult<Self>;

    /// Alias for [`Model::id`].
    fn pk(&self) -> Option<i64> {
        self.id()
    }

    /// Query factory for this model.
    fn objects() -> Manager<Self> {
        Manager::new()
    }

    /// Declared field names, `id` first.
    fn field_names() -> Vec<&'static str> {
        Self::SCHEMA.iter().map(|f| f.name).collect()
    }

    /// Comma-joined column list for SELECT.
    fn select_list() -> String {
        Self::field_names().join(", ")
    }

    /// `SELECT <cols> FROM <table>`.
    fn simple_query() -> String {
        format!("SELECT {} FROM {}", Self::select_list(), Self::TABLE)
    }

    /// Zip a positional row against the schema. Extra row values are dropped, missing
    /// ones are left out of the record.
    fn row_to_record(row: Row) -> Record {
        Self::SCHEMA
            .iter()
            .map(|f| f.name.to_string())
            .zip(row)
            .collect()
    }

    /// Rehydrate an instance from a positional row.
    fn from_row(row: Row) -> OrmResult<Self> {
        Self::from_record(&Self::row_to_record(row))
    }

    /// Field name → value mapping in schema order.
    fn to_record(&self) -> Record {
        Self::SCHEMA
            .iter()
            .map(|f| f.name.to_string())
            .zip(self.values())
            .collect()
    }

    /// Values as an SQL tuple, e.g. `(NULL, 7, 'Help')`.
    fn values_sql(&self) -> String {
        let literals: Vec<String> = self.values().iter().map(Value::sql_literal).collect();
        format!("({})", literals.join(", "))
    }

    /// `<TypeName: display>`.
    fn repr(&self) -> String {
        format!("<{}: {}>", Self::NAME, self)
    }

    /// Names of non-blank fields currently holding an empty value.
    fn invalid_fields(&self) -> Vec<&'static str> {
        Self::SCHEMA
            .iter()
            .zip(self.values())
            .filter(|(def, value)| !def.blank && value.is_empty())
            .map(|(def, _)| def.name)
            .collect()
    }

    /// True iff every non-blank field holds a non-empty value.
    ///
    /// Persistence does not call this; check it before saving if validation matters.
    fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    /// [`Model::is_valid`] as a `Result`.
    fn validate(&self) -> OrmResult<()> {
        let invalid = self.invalid_fields();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(OrmError::validation(format!(
                "{}: required fields are empty: {}",
                Self::NAME,
                invalid.join(", ")
            )))
        }
    }

    /// Full-row `UPDATE` statement for this instance.
    fn update_sql(&self) -> OrmResult<String> {
        sql::update_sql(self)
    }

    fn to_json(&self) -> OrmResult<String> {
        serializer::to_json(self)
    }

    fn from_json(raw: &str) -> OrmResult<Self> {
        serializer::from_json(raw)
    }

    /// INSERT this instance and adopt the backend-assigned id.
    fn save<E: Executor>(mut self, conn: &E) -> impl Future<Output = OrmResult<Self>> + Send {
        async move {
            let statement = sql::insert_sql(&self, conn.dialect());
            let id = conn.insert(&statement).await?;
            self.set_id(Some(id));
            tracing::debug!(model = Self::NAME, id, "saved instance");
            Ok(self)
        }
    }

    /// Rewrite every declared field of the row with this instance's id.
    fn update<E: Executor>(&self, conn: &E) -> impl Future<Output = OrmResult<u64>> + Send {
        async move {
            let statement = self.update_sql()?;
            conn.execute(&statement).await
        }
    }

    /// DELETE the row with this instance's id. The instance is consumed.
    fn delete<E: Executor>(self, conn: &E) -> impl Future<Output = OrmResult<u64>> + Send {
        async move {
            let statement = sql::delete_sql(&self)?;
            conn.execute(&statement).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bare, HelperModel};

    fn todo() -> HelperModel {
        HelperModel {
            id: Some(5),
            list_id: Some(1),
            name: Some("Something to do".into()),
        }
    }

    #[test]
    fn field_names_start_with_id() {
        assert_eq!(HelperModel::field_names(), vec!["id", "list_id", "name"]);
        assert_eq!(Bare::field_names(), vec!["id"]);
    }

    #[test]
    fn select_list_and_simple_query() {
        assert_eq!(HelperModel::select_list(), "id, list_id, name");
        assert_eq!(
            HelperModel::simple_query(),
            "SELECT id, list_id, name FROM helpermodel"
        );
        assert_eq!(Bare::simple_query(), "SELECT id FROM model");
    }

    #[test]
    fn values_sql_renders_nulls_bare() {
        assert_eq!(HelperModel::named("Something").values_sql(), "(NULL, NULL, 'Something')");
        assert_eq!(Bare::default().values_sql(), "(NULL)");
        assert_eq!(todo().values_sql(), "(5, 1, 'Something to do')");
    }

    #[test]
    fn repr_uses_display() {
        assert_eq!(todo().repr(), "<HelperModel: Something to do>");
        assert_eq!(Bare::default().repr(), "<Model: Object>");
    }

    #[test]
    fn update_sql_rewrites_every_field() {
        assert_eq!(
            todo().update_sql().unwrap(),
            "UPDATE helpermodel SET id = '5', list_id = '1', name = 'Something to do' WHERE id = 5"
        );
    }

    #[test]
    fn update_sql_without_id_fails() {
        let err = HelperModel::named("unsaved").update_sql().unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn row_to_record_zips_against_the_schema() {
        let record = HelperModel::row_to_record(HelperModel::row(3, 2, "Tea"));
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["id", "list_id", "name"]);
        assert_eq!(record.get("name"), Some(&Value::from("Tea")));

        // short rows leave trailing fields out; from_record turns them into None
        let short = HelperModel::from_row(vec![Value::Int(3)]).unwrap();
        assert_eq!(short.id, Some(3));
        assert_eq!(short.name, None);
    }

    #[test]
    fn from_record_ignores_unknown_keys_and_accepts_id() {
        let record = Record::new()
            .set("id", 4)
            .set("name", "Jam")
            .set("shelf", "top");
        let item = HelperModel::from_record(&record).unwrap();
        assert_eq!(item.id, Some(4));
        assert_eq!(item.name.as_deref(), Some("Jam"));
        assert_eq!(item.list_id, None);
    }

    #[test]
    fn from_record_reports_undecodable_values() {
        let record = Record::new().set("list_id", "not a number");
        let err = HelperModel::from_record(&record).unwrap_err();
        assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "list_id"));
    }

    #[test]
    fn validation_flags_required_empty_fields() {
        assert!(todo().is_valid());
        assert!(todo().validate().is_ok());

        let missing = HelperModel {
            name: Some(String::new()),
            ..HelperModel::default()
        };
        assert_eq!(missing.invalid_fields(), vec!["list_id", "name"]);
        assert!(!missing.is_valid());
        assert!(matches!(missing.validate(), Err(OrmError::Validation(_))));

        // id is blank-allowed
        assert!(Bare::default().is_valid());
    }

    #[test]
    fn json_round_trip_of_one_instance() {
        let raw = todo().to_json().unwrap();
        assert_eq!(raw, r#"{"id":5,"list_id":1,"name":"Something to do"}"#);
        assert_eq!(HelperModel::from_json(&raw).unwrap(), todo());
    }

    #[test]
    fn pk_aliases_id() {
        assert_eq!(todo().pk(), Some(5));
        assert_eq!(Bare::default().pk(), None);
    }
}
