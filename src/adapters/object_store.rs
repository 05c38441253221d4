use std::fmt;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::AdapterError;

/// Bucket plus key, the only addressing the object store understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Whether a delete removed something or the object was already gone.
/// Callers treat both as satisfying the deletion intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDisposition {
    Deleted,
    AlreadyAbsent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
}

pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), AdapterError>;

    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, AdapterError>;

    fn delete(&self, location: &ObjectLocation) -> Result<DeleteDisposition, AdapterError>;

    fn list(&self, bucket: &str) -> Result<Vec<StoredObject>, AdapterError>;
}

/// Object store reached over a bucket/key REST interface. Stateless apart
/// from its immutable configuration; safe to share between requests.
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    objects: Vec<StoredObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpObjectStore {
    pub fn new(client: Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }

    fn object_url(&self, location: &ObjectLocation) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            location.bucket,
            location.key
        )
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), bucket)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Pull the structured error detail out of a failed response, falling
/// back to the status line when the body is not our error shape.
fn remote_failure(context: &str, response: Response) -> AdapterError {
    let status = response.status();
    let detail = response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    AdapterError::Remote(format!("{context}: {detail}"))
}

impl ObjectStore for HttpObjectStore {
    fn put(
        &self,
        location: &ObjectLocation,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), AdapterError> {
        debug!("Object store put: {location} ({} bytes)", bytes.len());
        let response = self
            .authorize(self.client.put(self.object_url(location)))
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .map_err(AdapterError::from_reqwest)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(remote_failure(&format!("put {location}"), response))
        }
    }

    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, AdapterError> {
        debug!("Object store get: {location}");
        let response = self
            .authorize(self.client.get(self.object_url(location)))
            .send()
            .map_err(AdapterError::from_reqwest)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AdapterError::NotFound(location.to_string())),
            status if status.is_success() => {
                let bytes = response.bytes().map_err(AdapterError::from_reqwest)?;
                Ok(bytes.to_vec())
            }
            _ => Err(remote_failure(&format!("get {location}"), response)),
        }
    }

    fn delete(&self, location: &ObjectLocation) -> Result<DeleteDisposition, AdapterError> {
        debug!("Object store delete: {location}");
        let response = self
            .authorize(self.client.delete(self.object_url(location)))
            .send()
            .map_err(AdapterError::from_reqwest)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(DeleteDisposition::AlreadyAbsent),
            status if status.is_success() => Ok(DeleteDisposition::Deleted),
            _ => Err(remote_failure(&format!("delete {location}"), response)),
        }
    }

    fn list(&self, bucket: &str) -> Result<Vec<StoredObject>, AdapterError> {
        debug!("Object store list: {bucket}");
        let response = self
            .authorize(self.client.get(self.bucket_url(bucket)))
            .send()
            .map_err(AdapterError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(remote_failure(&format!("list {bucket}"), response));
        }

        let body: ListResponse = response
            .json()
            .map_err(|err| AdapterError::Protocol(err.to_string()))?;
        Ok(body.objects)
    }
}
