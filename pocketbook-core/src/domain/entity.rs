//! Table-agnostic row shape
//!
//! Every entity is persisted as a JSON document plus the handful of columns
//! the store filters on. Local and remote backends exchange the same document.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::result::{Error, Result};

/// A persistable entity owned by one user
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> &str;

    fn user_id(&self) -> &str;

    /// Calendar date for dated tables, used for the date column
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// A row as the record store sees it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: String,
    pub user_id: String,
    pub date: Option<NaiveDate>,
    pub doc: JsonValue,
}

impl StoredRow {
    /// Serialize an entity into a row
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        Ok(Self {
            id: entity.id().to_string(),
            user_id: entity.user_id().to_string(),
            date: entity.date(),
            doc: serde_json::to_value(entity)?,
        })
    }

    /// Build a row from a bare document, as returned by the remote backend
    pub fn from_doc(doc: JsonValue) -> Result<Self> {
        let id = doc
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::validation("document has no 'id'"))?
            .to_string();
        let user_id = doc
            .get("userId")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::validation(format!("document '{}' has no 'userId'", id)))?
            .to_string();
        let date = doc
            .get("date")
            .and_then(JsonValue::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

        Ok(Self {
            id,
            user_id,
            date,
            doc,
        })
    }

    /// Deserialize the document back into a typed entity
    pub fn into_entity<E: Entity>(self) -> Result<E> {
        Ok(serde_json::from_value(self.doc)?)
    }

    /// Read a document field as display text; missing and null become ""
    pub fn field_text(&self, field: &str) -> String {
        match self.doc.get(field) {
            None | Some(JsonValue::Null) => String::new(),
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Generate a fresh, never-reused identifier such as `exp_1f0c...`
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_id_is_prefixed_and_unique() {
        let a = new_id("exp");
        let b = new_id("exp");
        assert!(a.starts_with("exp_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_doc_extracts_columns() {
        let row = StoredRow::from_doc(json!({
            "id": "exp_1",
            "userId": "tg_42",
            "date": "2024-03-01",
            "amount": "450"
        }))
        .unwrap();

        assert_eq!(row.id, "exp_1");
        assert_eq!(row.user_id, "tg_42");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_from_doc_requires_owner() {
        let err = StoredRow::from_doc(json!({ "id": "exp_1" })).unwrap_err();
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn test_field_text() {
        let row = StoredRow::from_doc(json!({
            "id": "cat_1",
            "userId": "u",
            "name": "Food",
            "amount": 12.5,
            "note": null
        }))
        .unwrap();

        assert_eq!(row.field_text("name"), "Food");
        assert_eq!(row.field_text("amount"), "12.5");
        assert_eq!(row.field_text("note"), "");
        assert_eq!(row.field_text("color"), "");
    }
}
