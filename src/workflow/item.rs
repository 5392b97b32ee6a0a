use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable identifier of a finding or action.
///
/// The backend sends numeric ids for some resources and string ids for
/// others; both are normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ItemId::from(n),
            RawId::Text(s) => ItemId(s),
        })
    }
}

/// A finding or corrective action as seen by the workflow core.
///
/// Only `id` and `status` drive behavior; the record itself is owned by the
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowItem {
    pub id: ItemId,
    #[serde(rename = "estado", alias = "status")]
    pub status: String,
    #[serde(
        rename = "descripcion",
        alias = "title",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
}

impl WorkflowItem {
    pub fn new(id: impl Into<ItemId>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_deserialize() {
        let a: WorkflowItem = serde_json::from_str(r#"{"id": 42, "estado": "d1_iniciado"}"#).unwrap();
        assert_eq!(a.id.as_str(), "42");
        assert_eq!(a.status, "d1_iniciado");
        assert!(a.title.is_none());

        let b: WorkflowItem =
            serde_json::from_str(r#"{"id": "H-7", "status": "t1_en_analisis", "title": "Calibración"}"#)
                .unwrap();
        assert_eq!(b.id, ItemId::from("H-7"));
        assert_eq!(b.title.as_deref(), Some("Calibración"));
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let item = WorkflowItem::new("9", "d1_iniciado").with_title("Registro vencido");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "9");
        assert_eq!(json["estado"], "d1_iniciado");
        assert_eq!(json["descripcion"], "Registro vencido");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let item: WorkflowItem = serde_json::from_str(
            r#"{"id": 1, "estado": "x", "origen": "auditoria interna", "proceso_id": 3}"#,
        )
        .unwrap();
        assert_eq!(item.status, "x");
    }
}
