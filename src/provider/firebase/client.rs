//! Low-level REST client for the Firebase Auth and Firestore APIs
//!
//! Speaks the Identity Toolkit and Firestore v1 wire formats directly and
//! translates between plain JSON objects and Firestore's typed field values.
//! The provider implementations in the parent module build on this.

use crate::error::{ClientError, Result};
use crate::types::Document;
use crate::validate::MIN_PASSWORD_LEN;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::config::FirebaseConfig;

/// Successful response from the Identity Toolkit sign-up/sign-in calls
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Server-assigned user id
    pub local_id: String,

    /// Registered email address
    pub email: String,

    /// Bearer token for subsequent Firestore calls
    pub id_token: String,
}

/// Error envelope returned by both APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// HTTP client for one Firebase project
pub struct FirebaseClient {
    http: reqwest::Client,
    config: FirebaseConfig,
}

impl FirebaseClient {
    /// Build a client from the given configuration
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Register a new email/password account
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.auth_call("accounts:signUp", email, password).await
    }

    /// Sign in with an existing email/password account
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.auth_call("accounts:signInWithPassword", email, password)
            .await
    }

    async fn auth_call(&self, method: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!(
            "{}/{}?key={}",
            self.config.auth_endpoint, method, self.config.api_key
        );
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(auth_error(method, read_error_message(response).await));
        }

        response
            .json::<AuthResponse>()
            .await
            .map_err(|e| ClientError::provider(method, e.to_string()))
    }

    /// Create or overwrite a document at `collection/key`
    ///
    /// Uses PATCH so the key is caller-chosen; the server assigns the
    /// creation time on first write and preserves it on overwrite.
    pub async fn patch_document(
        &self,
        id_token: &str,
        collection: &str,
        key: &str,
        fields: &Value,
    ) -> Result<Document> {
        let url = format!(
            "{}/{}/{}/{}",
            self.config.firestore_endpoint,
            self.config.database_path(),
            collection,
            key
        );
        let body = json!({ "fields": to_firestore_fields(fields)? });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(id_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::store(
                "patchDocument",
                read_error_message(response).await,
            ));
        }

        let doc: Value = response
            .json()
            .await
            .map_err(|e| ClientError::store("patchDocument", e.to_string()))?;
        parse_document(&doc)
    }

    /// Return all documents in `collection` where `field == value`
    pub async fn run_query(
        &self,
        id_token: &str,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        let url = format!(
            "{}/{}:runQuery",
            self.config.firestore_endpoint,
            self.config.database_path()
        );
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": value },
                    }
                },
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(id_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::store(
                "runQuery",
                read_error_message(response).await,
            ));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| ClientError::store("runQuery", e.to_string()))?;

        // Rows without a "document" member carry only a read time
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(parse_document)
            .collect()
    }
}

/// Map an Identity Toolkit error message onto the client error taxonomy
fn auth_error(operation: &str, message: String) -> ClientError {
    if message.starts_with("WEAK_PASSWORD") {
        ClientError::WeakPassword {
            min_len: MIN_PASSWORD_LEN,
        }
    } else {
        ClientError::provider(operation, message)
    }
}

async fn read_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) if !body.error.message.is_empty() => body.error.message,
        _ => format!("HTTP {}", status),
    }
}

/// Convert a plain JSON object into Firestore's typed field map
pub fn to_firestore_fields(fields: &Value) -> Result<Value> {
    let object = fields.as_object().ok_or_else(|| {
        ClientError::store("encodeFields", "document fields must be a JSON object")
    })?;

    let mut out = serde_json::Map::new();
    for (name, value) in object {
        out.insert(name.clone(), to_firestore_value(value)?);
    }
    Ok(Value::Object(out))
}

fn to_firestore_value(value: &Value) -> Result<Value> {
    let wrapped = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            json!({ "integerValue": n.to_string() })
        }
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Result<Vec<Value>> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values? } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": to_firestore_fields(value)? } }),
    };
    Ok(wrapped)
}

/// Convert Firestore's typed field map back into a plain JSON object
pub fn from_firestore_fields(fields: &Value) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(object) = fields.as_object() {
        for (name, value) in object {
            out.insert(name.clone(), from_firestore_value(value));
        }
    }
    Value::Object(out)
}

fn from_firestore_value(value: &Value) -> Value {
    if let Some(s) = value.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = value.get("timestampValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = value.get("integerValue").and_then(Value::as_str) {
        if let Ok(n) = s.parse::<i64>() {
            return json!(n);
        }
        return Value::String(s.to_string());
    }
    if let Some(n) = value.get("doubleValue") {
        return n.clone();
    }
    if let Some(b) = value.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if value.get("nullValue").is_some() {
        return Value::Null;
    }
    if let Some(items) = value
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(items.iter().map(from_firestore_value).collect());
    }
    if let Some(fields) = value.get("mapValue").and_then(|m| m.get("fields")) {
        return from_firestore_fields(fields);
    }
    Value::Null
}

/// Parse a Firestore document resource into the generic document type
fn parse_document(doc: &Value) -> Result<Document> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::store("parseDocument", "document has no name"))?;
    let key = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .to_string();

    let fields = doc
        .get("fields")
        .map(from_firestore_fields)
        .unwrap_or_else(|| json!({}));

    let create_time = doc
        .get("createTime")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Document {
        key,
        fields,
        create_time,
    })
}
