//! The per-row "add" action and the payload it receives.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;

use serde::Serialize;
use ustr::Ustr;

use crate::record::Record;
use crate::selection::IdentityField;
use crate::value::CellValue;

/// A payload field and the row keys it may be read from, in order.
#[derive(Debug, Clone, Copy)]
pub struct PayloadField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// Fields copied from a row into its [`AddPayload`], besides the identity.
pub const PAYLOAD_FIELDS: &[PayloadField] = &[
    PayloadField {
        name: "entity_name",
        aliases: &[
            "entity_name",
            "billed_entity_name",
            "organization_name",
            "name",
        ],
    },
    PayloadField {
        name: "state",
        aliases: &["state", "physical_state"],
    },
    PayloadField {
        name: "city",
        aliases: &["city", "physical_city"],
    },
    PayloadField {
        name: "entity_type",
        aliases: &["entity_type", "applicant_type"],
    },
];

/// What an add action gets: the row's identity plus a normalized subset of
/// its fields, keyed by [`PayloadField::name`]. Serializes as one flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddPayload {
    #[serde(skip)]
    pub identity: Ustr,
    #[serde(flatten)]
    pub fields: BTreeMap<String, CellValue>,
}

impl AddPayload {
    /// Build the payload for `row`. `None` when the row has no identity.
    pub fn from_record<R: Record>(row: &R, identity_field: &IdentityField) -> Option<Self> {
        let identity = identity_field.identify(row)?;

        let mut fields = BTreeMap::new();
        if let Some(key) = identity_field.canonical() {
            fields.insert(key.to_string(), CellValue::Text(identity.to_string()));
        }
        for field in PAYLOAD_FIELDS {
            let value = field.aliases.iter().find_map(|alias| {
                row.value_ignore_case(alias)
                    .map(|(_, value)| value)
                    .filter(|value| !value.is_null())
            });
            if let Some(value) = value {
                fields.insert(field.name.to_owned(), value);
            }
        }

        Some(Self { identity, fields })
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.get(name)
    }
}

/// Caller-supplied async action run for one row.
///
/// Plain async closures returning `Result<(), E>` implement this.
pub trait AddAction: Send + Sync {
    type Error: Display;

    fn add(&self, payload: AddPayload) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<F, Fut, E> AddAction for F
where
    F: Fn(AddPayload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send,
    E: Display,
{
    type Error = E;

    fn add(&self, payload: AddPayload) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self(payload)
    }
}

/// Outcome of a bulk add, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkAddReport {
    pub added: Vec<Ustr>,
    pub failed: Vec<(Ustr, String)>,
    /// Selected identities not attempted: already added, in flight, or no longer in the table.
    pub skipped: Vec<Ustr>,
}

impl BulkAddReport {
    pub fn attempted(&self) -> usize {
        self.added.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;
    use serde_json::json;

    #[test]
    fn test_payload_normalizes_aliases() {
        let row = Row::new()
            .with("BEN", 123456)
            .with("Organization_Name", "Springfield USD")
            .with("physical_state", "IL")
            .with("city", CellValue::Null)
            .with("physical_city", "Springfield")
            .with("discount", 80);

        let payload = AddPayload::from_record(&row, &IdentityField::default()).expect("identity");
        assert_eq!(payload.identity, Ustr::from("123456"));
        assert_eq!(
            serde_json::to_value(&payload).expect("serialize"),
            json!({
                "ben": "123456",
                "entity_name": "Springfield USD",
                "state": "IL",
                "city": "Springfield"
            })
        );
    }

    #[test]
    fn test_no_identity_no_payload() {
        let row = Row::new().with("name", "Nobody");
        assert!(AddPayload::from_record(&row, &IdentityField::default()).is_none());
    }

    #[test]
    fn test_custom_identity_key() {
        let row = Row::new().with("frn", "2499001").with("name", "X");
        let payload =
            AddPayload::from_record(&row, &IdentityField::new(["frn"])).expect("identity");
        assert_eq!(payload.get("frn"), Some(&CellValue::from("2499001")));
        assert_eq!(payload.get("entity_name"), Some(&CellValue::from("X")));
    }

    #[tokio::test]
    async fn test_closures_are_add_actions() {
        let action = |payload: AddPayload| async move {
            if payload.identity.as_str() == "bad" {
                Err("rejected")
            } else {
                Ok(())
            }
        };

        let ok = AddPayload {
            identity: Ustr::from("good"),
            fields: BTreeMap::new(),
        };
        let bad = AddPayload {
            identity: Ustr::from("bad"),
            fields: BTreeMap::new(),
        };
        assert!(action.add(ok).await.is_ok());
        assert_eq!(action.add(bad).await, Err("rejected"));
    }
}
