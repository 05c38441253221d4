use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header, encode};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::AdapterError;
use crate::common::DB_TOKEN_TTL_SECS;
use crate::models::PhotoMetadata;

pub trait PhotoTable: Send + Sync {
    /// Delete every row whose key column matches. Zero rows affected is a
    /// valid result, not an error.
    fn delete_by_key(&self, key: &str) -> Result<u64, AdapterError>;

    fn insert_record(&self, key: &str, metadata: &PhotoMetadata) -> Result<(), AdapterError>;
}

/// Short-lived row-store credential. A fresh token is minted for every
/// call and never cached across invocations.
#[derive(Debug, Serialize)]
struct RowStoreClaims<'a> {
    sub: &'a str,
    exp: u64,
}

impl<'a> RowStoreClaims<'a> {
    fn new(user: &'a str) -> Result<Self, AdapterError> {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| AdapterError::Credential(err.to_string()))?
            .as_secs()
            + DB_TOKEN_TTL_SECS;
        Ok(Self { sub: user, exp })
    }

    fn encode(&self, secret: &[u8]) -> Result<String, AdapterError> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret))
            .map_err(|err| AdapterError::Credential(err.to_string()))
    }
}

/// Row store reached over HTTP with per-call token authentication.
pub struct HttpPhotoTable {
    client: Client,
    endpoint: String,
    table: String,
    user: String,
    secret: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRowsBody<'a> {
    table: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRowsResponse {
    rows_affected: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRowBody<'a> {
    table: &'a str,
    key: &'a str,
    email: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpPhotoTable {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        table: impl Into<String>,
        user: impl Into<String>,
        secret: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            table: table.into(),
            user: user.into(),
            secret: secret.into(),
        }
    }

    fn fresh_token(&self) -> Result<String, AdapterError> {
        RowStoreClaims::new(&self.user)?.encode(&self.secret)
    }

    fn url(&self, action: &str) -> String {
        format!("{}/rows/{}", self.endpoint.trim_end_matches('/'), action)
    }

    fn failure(context: &str, response: reqwest::blocking::Response) -> AdapterError {
        let status = response.status();
        let detail = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        AdapterError::Remote(format!("{context}: {detail}"))
    }
}

impl PhotoTable for HttpPhotoTable {
    fn delete_by_key(&self, key: &str) -> Result<u64, AdapterError> {
        debug!("Row store delete: table={}, key={key}", self.table);
        let token = self.fresh_token()?;
        let response = self
            .client
            .post(self.url("delete"))
            .bearer_auth(token)
            .json(&DeleteRowsBody {
                table: &self.table,
                key,
            })
            .send()
            .map_err(AdapterError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(Self::failure(&format!("delete rows for '{key}'"), response));
        }

        let body: DeleteRowsResponse = response
            .json()
            .map_err(|err| AdapterError::Protocol(err.to_string()))?;
        Ok(body.rows_affected)
    }

    fn insert_record(&self, key: &str, metadata: &PhotoMetadata) -> Result<(), AdapterError> {
        debug!("Row store insert: table={}, key={key}", self.table);
        let token = self.fresh_token()?;
        let response = self
            .client
            .post(self.url("insert"))
            .bearer_auth(token)
            .json(&InsertRowBody {
                table: &self.table,
                key,
                email: &metadata.email,
                description: &metadata.description,
            })
            .send()
            .map_err(AdapterError::from_reqwest)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure(&format!("insert row for '{key}'"), response))
        }
    }
}
