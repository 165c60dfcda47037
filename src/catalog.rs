//! Grist catalog client.
//!
//! Fetches the reference records and the table's column schema from the
//! Grist API. The reconciliation core only reads the name and tag columns
//! from each record's field map; the schema is fetched for reporting only.
//!
//! Authentication is a bearer key from the `GRIST_API_KEY` environment
//! variable. Transport failures surface as errors with the response body;
//! there is no retry.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::models::{ColumnInfo, ReferenceRecord};

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    doc_id: String,
    table: String,
    api_key: String,
    name_field: String,
    tag_field: String,
}

impl CatalogClient {
    /// Build a client from configuration and the environment.
    ///
    /// Fails when the API key or document id cannot be resolved; a run
    /// without catalog access is a configuration error, not an empty run.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let api_key = std::env::var("GRIST_API_KEY")
            .map_err(|_| anyhow::anyhow!("GRIST_API_KEY environment variable not set"))?;

        let doc_id = match &config.doc_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => std::env::var("GRIST_DOC_ID").map_err(|_| {
                anyhow::anyhow!("catalog.doc_id not configured and GRIST_DOC_ID not set")
            })?,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            doc_id,
            table: config.table.clone(),
            api_key,
            name_field: config.name_field.clone(),
            tag_field: config.tag_field.clone(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach catalog API: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Catalog API error {}: {}", status, body);
        }

        Ok(response.text().await?)
    }

    /// Fetch all records from the catalog table.
    pub async fn fetch_records(&self) -> Result<Vec<ReferenceRecord>> {
        let url = format!(
            "{}/api/docs/{}/tables/{}/records",
            self.base_url, self.doc_id, self.table
        );
        let body = self.get_json(&url).await?;
        parse_records(&body, &self.name_field, &self.tag_field)
    }

    /// Fetch the table's column schema. Reporting only.
    pub async fn fetch_columns(&self) -> Result<Vec<ColumnInfo>> {
        let url = format!(
            "{}/api/docs/{}/tables/{}/columns",
            self.base_url, self.doc_id, self.table
        );
        let body = self.get_json(&url).await?;
        parse_columns(&body)
    }
}

#[derive(Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<ApiRecord>,
}

#[derive(Deserialize)]
struct ApiRecord {
    id: i64,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// Map the records payload into [`ReferenceRecord`]s.
///
/// Field values of any scalar type are coerced to trimmed strings
/// (numbers and booleans are rendered, null and absent are empty).
pub fn parse_records(body: &str, name_field: &str, tag_field: &str) -> Result<Vec<ReferenceRecord>> {
    let response: RecordsResponse =
        serde_json::from_str(body).with_context(|| "Invalid catalog records response")?;

    Ok(response
        .records
        .into_iter()
        .map(|record| ReferenceRecord {
            record_id: record.id.to_string(),
            name: field_string(&record.fields, name_field),
            tag: field_string(&record.fields, tag_field),
        })
        .collect())
}

fn field_string(fields: &HashMap<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Map the columns payload into [`ColumnInfo`]s.
///
/// Accepts both flat `{id, label, type}` entries and the nested
/// `{id, fields: {label, type}}` shape; the label falls back to the id.
pub fn parse_columns(body: &str) -> Result<Vec<ColumnInfo>> {
    let value: Value = serde_json::from_str(body).with_context(|| "Invalid catalog schema response")?;

    let columns = value
        .get("columns")
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(columns
        .iter()
        .map(|col| {
            let id = col
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let nested = col.get("fields");
            let label = col
                .get("label")
                .or_else(|| nested.and_then(|f| f.get("label")))
                .and_then(|v| v.as_str())
                .unwrap_or(&id)
                .to_string();
            let col_type = col
                .get("type")
                .or_else(|| nested.and_then(|f| f.get("type")))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            ColumnInfo {
                id,
                label,
                col_type,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_with_scalar_coercion() {
        let body = r#"{"records": [
            {"id": 1, "fields": {"nome": "  Flora of Rio ", "tag": "hhm"}},
            {"id": 2, "fields": {"nome": 42, "tag": null}},
            {"id": 3, "fields": {}}
        ]}"#;
        let records = parse_records(body, "nome", "tag").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].record_id, "1");
        assert_eq!(records[0].name, "Flora of Rio");
        assert_eq!(records[0].tag, "hhm");
        assert_eq!(records[1].name, "42");
        assert_eq!(records[1].tag, "");
        assert_eq!(records[2].name, "");
    }

    #[test]
    fn custom_field_names_are_honored() {
        let body = r#"{"records": [{"id": 9, "fields": {"name": "Bird Survey", "slug": "bs"}}]}"#;
        let records = parse_records(body, "name", "slug").unwrap();
        assert_eq!(records[0].name, "Bird Survey");
        assert_eq!(records[0].tag, "bs");
    }

    #[test]
    fn empty_records_list_is_fine() {
        assert!(parse_records(r#"{"records": []}"#, "nome", "tag")
            .unwrap()
            .is_empty());
        assert!(parse_records(r#"{}"#, "nome", "tag").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_records("not json", "nome", "tag").is_err());
    }

    #[test]
    fn parses_flat_and_nested_columns() {
        let body = r#"{"columns": [
            {"id": "nome", "label": "Nome", "type": "Text"},
            {"id": "tag", "fields": {"label": "Tag", "type": "Text"}},
            {"id": "raw"}
        ]}"#;
        let columns = parse_columns(body).unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].label, "Nome");
        assert_eq!(columns[1].label, "Tag");
        assert_eq!(columns[1].col_type, "Text");
        assert_eq!(columns[2].label, "raw");
    }
}
