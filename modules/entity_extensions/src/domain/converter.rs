//! Wire <-> row conversion
//!
//! Locale and shop data travel pivoted on the wire:
//! `{"label": {"fr-FR": "Rouge", "en-GB": "Red"}}`
//! and are stored unpivoted, one row per junction id:
//! `[{"idLang": 1, "label": "Rouge"}, {"idLang": 2, "label": "Red"}]`

use super::casting::as_positive_id;
use super::junction::JunctionResolvers;
use crate::config::JunctionPolicy;
use crate::contract::{
    EntitySchema, ExtensionData, ExtensionError, ExtensionRow, Extraction, TableSpec,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Bidirectional transform between wire payloads and storage rows
#[derive(Clone)]
pub struct Converter {
    resolvers: JunctionResolvers,
    policy: JunctionPolicy,
}

impl Converter {
    pub fn new(resolvers: JunctionResolvers, policy: JunctionPolicy) -> Self {
        Self { resolvers, policy }
    }

    pub fn resolvers(&self) -> &JunctionResolvers {
        &self.resolvers
    }

    pub fn policy(&self) -> JunctionPolicy {
        self.policy
    }

    /// Strip extension fields out of `payload`.
    ///
    /// Entity-scope fields move by name; locale/shop objects move by json key
    /// and are normalized to row form on the way.
    pub fn extract(
        &self,
        payload: ExtensionData,
        schema: &EntitySchema,
    ) -> Result<Extraction, ExtensionError> {
        let mut extension_data = ExtensionData::new();

        // Names may repeat across entity tables, so copy first and remove after
        for field in schema.entity_tables.iter().flat_map(|t| t.fields.iter()) {
            if let Some(value) = payload.get(&field.name) {
                extension_data.insert(field.name.clone(), value.clone());
            }
        }
        let mut cleaned_payload = payload;
        for name in extension_data.keys() {
            cleaned_payload.remove(name);
        }

        for table in schema.junction_tables() {
            let Some(value) = cleaned_payload.remove(&table.json_key) else {
                continue;
            };
            let rows = self.normalize(&value, table)?;
            // The key still leaves the native payload; no rows means nothing to stash or persist
            if rows.is_empty() {
                tracing::debug!(table = %table.storage_table, "No resolvable rows in payload");
                continue;
            }
            extension_data.insert(
                table.json_key.clone(),
                Value::Array(rows.into_iter().map(Value::Object).collect()),
            );
        }

        Ok(Extraction {
            extension_data,
            cleaned_payload,
        })
    }

    /// Bring a locale/shop value into row form, resolving junction keys
    pub fn normalize(
        &self,
        value: &Value,
        table: &TableSpec,
    ) -> Result<Vec<ExtensionRow>, ExtensionError> {
        let (Some(junction), Some(resolver)) =
            (table.junction_field.as_ref(), self.resolvers.for_scope(table.scope))
        else {
            return Ok(Vec::new());
        };

        let fields = match value {
            Value::Array(items) => {
                if is_row_form(items, &junction.name) {
                    return Ok(items.iter().filter_map(|i| i.as_object().cloned()).collect());
                }
                if items.is_empty() {
                    return Ok(Vec::new());
                }
                return self.malformed(table, value);
            }
            Value::Object(fields) => fields,
            Value::Null => return Ok(Vec::new()),
            _ => return self.malformed(table, value),
        };

        let mut rows: BTreeMap<i64, ExtensionRow> = BTreeMap::new();
        for (name, per_junction) in fields {
            let Some(field) = table.field(name) else {
                tracing::debug!(
                    table = %table.storage_table,
                    field = %name,
                    "Ignoring undeclared field"
                );
                continue;
            };
            let Some(per_junction) = per_junction.as_object() else {
                tracing::debug!(
                    table = %table.storage_table,
                    field = %name,
                    "Ignoring non-object field value"
                );
                continue;
            };
            for (raw, field_value) in per_junction {
                let Some(id) = resolver.resolve(raw) else {
                    self.unresolved(table, raw)?;
                    continue;
                };
                rows.entry(id)
                    .or_insert_with(|| {
                        let mut row = Map::new();
                        row.insert(junction.name.clone(), Value::from(id));
                        row
                    })
                    .insert(field.name.clone(), field_value.clone());
            }
        }

        Ok(rows.into_values().filter(|row| row.len() > 1).collect())
    }

    /// Scatter stored rows back into wire form keyed by external junction key
    pub fn pivot(&self, rows: &[ExtensionRow], table: &TableSpec) -> ExtensionData {
        let mut pivoted = ExtensionData::new();
        let (Some(junction), Some(resolver)) =
            (table.junction_field.as_ref(), self.resolvers.for_scope(table.scope))
        else {
            return pivoted;
        };

        for row in rows {
            let Some(key) = row
                .get(&junction.name)
                .and_then(as_positive_id)
                .and_then(|id| resolver.external_key(id))
            else {
                tracing::debug!(
                    table = %table.storage_table,
                    "Skipping row with unresolvable junction"
                );
                continue;
            };
            for field in &table.fields {
                let Some(value) = row.get(&field.name) else {
                    continue;
                };
                if let Value::Object(per_junction) = pivoted
                    .entry(field.name.clone())
                    .or_insert_with(|| Value::Object(Map::new()))
                {
                    per_junction.insert(key.clone(), value.clone());
                }
            }
        }
        pivoted
    }

    /// Apply the junction policy to a key that did not resolve
    pub(crate) fn unresolved(&self, table: &TableSpec, raw: &str) -> Result<(), ExtensionError> {
        match self.policy {
            JunctionPolicy::Skip => {
                tracing::debug!(
                    table = %table.storage_table,
                    value = %raw,
                    "Dropping unresolvable junction value"
                );
                Ok(())
            }
            JunctionPolicy::Reject => Err(ExtensionError::UnknownJunction {
                table: table.storage_table.clone(),
                value: raw.to_string(),
            }),
        }
    }

    fn malformed(
        &self,
        table: &TableSpec,
        value: &Value,
    ) -> Result<Vec<ExtensionRow>, ExtensionError> {
        match self.policy {
            JunctionPolicy::Skip => {
                tracing::debug!(table = %table.storage_table, "Ignoring malformed scoped value");
                Ok(Vec::new())
            }
            JunctionPolicy::Reject => Err(ExtensionError::validation(format!(
                "'{}' expects an object keyed by field name, got {}",
                table.json_key, value
            ))),
        }
    }
}

/// Row form: a list whose first element is a map carrying the junction key
fn is_row_form(items: &[Value], junction_key: &str) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key(junction_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FieldKind, FieldSpec, Scope};
    use crate::domain::junction::{ScopeIdResolver, StaticLocaleResolver};
    use serde_json::json;
    use std::sync::Arc;

    fn converter(policy: JunctionPolicy) -> Converter {
        Converter::new(
            JunctionResolvers::new(
                Arc::new(StaticLocaleResolver::from_locales([("fr-FR", 1), ("en-GB", 2)])),
                Arc::new(ScopeIdResolver::new()),
            ),
            policy,
        )
    }

    fn widget_schema() -> EntitySchema {
        let mut schema = EntitySchema::empty("Widget", "id_");
        schema.entity_tables.push(
            TableSpec::for_entity("Widget", Scope::Entity)
                .with_field(FieldSpec::new("stringField", FieldKind::String)),
        );
        schema.locale_tables.push(
            TableSpec::for_entity("Widget", Scope::Locale)
                .with_field(FieldSpec::new("label", FieldKind::String))
                .with_field(FieldSpec::new("slug", FieldKind::String)),
        );
        schema.scope_tables.push(
            TableSpec::for_entity("Widget", Scope::Shop)
                .with_field(FieldSpec::new("intShopField", FieldKind::Integer)),
        );
        schema
    }

    fn object(value: Value) -> ExtensionData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_extract_widget_scenario() {
        let schema = widget_schema();
        let payload = object(json!({
            "name": "native",
            "widgetLangExtra": {"label": {"fr-FR": "Rouge", "en-GB": "Red"}}
        }));

        let extraction = converter(JunctionPolicy::Skip).extract(payload, &schema).unwrap();
        assert_eq!(
            Value::Object(extraction.extension_data),
            json!({"widgetLangExtra": [
                {"idLang": 1, "label": "Rouge"},
                {"idLang": 2, "label": "Red"},
            ]})
        );
        assert_eq!(Value::Object(extraction.cleaned_payload), json!({"name": "native"}));
    }

    #[test]
    fn test_extract_drops_scoped_value_without_rows() {
        let schema = widget_schema();
        let payload = object(json!({
            "name": "native",
            "widgetLangExtra": {"label": {"de-DE": "Rot"}}
        }));

        let extraction = converter(JunctionPolicy::Skip).extract(payload, &schema).unwrap();
        assert!(extraction.extension_data.is_empty());
        assert_eq!(Value::Object(extraction.cleaned_payload), json!({"name": "native"}));
    }

    #[test]
    fn test_extract_keeps_scopes_isolated() {
        let schema = widget_schema();
        let payload = object(json!({
            "name": "native",
            "stringField": "v",
            "widgetShopExtra": {"intShopField": {"1": 100, "2": 200}}
        }));

        let extraction = converter(JunctionPolicy::Skip).extract(payload, &schema).unwrap();
        assert_eq!(extraction.extension_data.get("stringField"), Some(&json!("v")));
        assert_eq!(
            extraction.extension_data.get("widgetShopExtra"),
            Some(&json!([{"idShop": 1, "intShopField": 100}, {"idShop": 2, "intShopField": 200}]))
        );
        assert!(extraction.extension_data.get("name").is_none());
        assert_eq!(Value::Object(extraction.cleaned_payload), json!({"name": "native"}));
    }

    #[test]
    fn test_field_names_repeated_across_entity_tables() {
        let mut schema = widget_schema();
        schema.entity_tables.push(
            TableSpec::new("widget_other_extra", Scope::Entity)
                .with_field(FieldSpec::new("stringField", FieldKind::String).with_column("other")),
        );
        let payload = object(json!({"stringField": "v"}));
        let extraction = converter(JunctionPolicy::Skip).extract(payload, &schema).unwrap();
        assert_eq!(extraction.extension_data.get("stringField"), Some(&json!("v")));
        assert!(extraction.cleaned_payload.is_empty());
    }

    #[test]
    fn test_row_form_passes_through_unchanged() {
        let schema = widget_schema();
        let rows = json!([{"idLang": 2, "label": "Red"}, {"idLang": 1, "slug": "rouge"}]);
        let normalized = converter(JunctionPolicy::Skip)
            .normalize(&rows, &schema.locale_tables[0])
            .unwrap();
        assert_eq!(Value::Array(normalized.into_iter().map(Value::Object).collect()), rows);
    }

    #[test]
    fn test_unresolvable_junctions_are_dropped() {
        let schema = widget_schema();
        let wire = json!({"label": {"fr-FR": "Rouge", "de-DE": "Rot"}, "unknown": {"fr-FR": 1}});
        let rows = converter(JunctionPolicy::Skip)
            .normalize(&wire, &schema.locale_tables[0])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(Value::Object(rows[0].clone()), json!({"idLang": 1, "label": "Rouge"}));

        let wire = json!({"intShopField": {"0": 5, "-3": 6}});
        let rows = converter(JunctionPolicy::Skip)
            .normalize(&wire, &schema.scope_tables[0])
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_reject_policy_reports_unknown_junction() {
        let schema = widget_schema();
        let wire = json!({"label": {"de-DE": "Rot"}});
        let err = converter(JunctionPolicy::Reject)
            .normalize(&wire, &schema.locale_tables[0])
            .unwrap_err();
        assert_eq!(
            err,
            ExtensionError::UnknownJunction {
                table: "widget_lang_extra".into(),
                value: "de-DE".into()
            }
        );

        let err = converter(JunctionPolicy::Reject)
            .normalize(&json!("oops"), &schema.locale_tables[0])
            .unwrap_err();
        assert!(matches!(err, ExtensionError::Validation { .. }));
    }

    #[test]
    fn test_pivot_skips_non_positive_and_unknown_ids() {
        let schema = widget_schema();
        let rows: Vec<ExtensionRow> = [
            json!({"idLang": 1, "label": "Rouge"}),
            json!({"idLang": 0, "label": "Zero"}),
            json!({"idLang": 9, "label": "Unknown"}),
        ]
        .into_iter()
        .map(object)
        .collect();

        let pivoted = converter(JunctionPolicy::Skip).pivot(&rows, &schema.locale_tables[0]);
        assert_eq!(Value::Object(pivoted), json!({"label": {"fr-FR": "Rouge"}}));
    }

    #[test]
    fn test_pivot_of_normalized_wire_is_identity() {
        let schema = widget_schema();
        let converter = converter(JunctionPolicy::Skip);
        let wire = json!({
            "label": {"fr-FR": "Rouge", "en-GB": "Red"},
            "slug": {"fr-FR": "rouge"}
        });

        let table = &schema.locale_tables[0];
        let rows = converter.normalize(&wire, table).unwrap();
        assert_eq!(Value::Object(converter.pivot(&rows, table)), wire);

        let table = &schema.scope_tables[0];
        let wire = json!({"intShopField": {"1": 100, "2": 200}});
        let rows = converter.normalize(&wire, table).unwrap();
        assert_eq!(Value::Object(converter.pivot(&rows, table)), wire);
    }

    #[test]
    fn test_entity_table_is_never_normalized() {
        let schema = widget_schema();
        let rows = converter(JunctionPolicy::Skip)
            .normalize(&json!({"stringField": "v"}), &schema.entity_tables[0])
            .unwrap();
        assert!(rows.is_empty());
    }
}
