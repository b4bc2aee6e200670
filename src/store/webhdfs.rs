//! WebHDFS REST store backend.
//!
//! Speaks the two-step protocol: the namenode answers `CREATE` and `OPEN`
//! with a redirect to a datanode, and the payload moves on the second
//! request. Authentication is the insecure `user.name` query parameter;
//! anything stronger belongs in a different client behind the same trait.

use super::{ErrorKind, RemoteStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::LOCATION;
use std::time::Duration;

pub struct WebHdfsStore {
    base: String,
    user: Option<String>,
    client: Client,
}

impl WebHdfsStore {
    /// Build a client for `host:port` with the configured timeout.
    ///
    /// Redirects are handled manually because the datanode hop must carry
    /// the request body.
    pub fn connect(host: &str, port: u16, config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build webhdfs http client")?;
        Ok(Self {
            base: format!("http://{host}:{port}/webhdfs/v1"),
            user: config.user.clone(),
            client,
        })
    }

    fn url(&self, path: &str, op: &str, extra: &str) -> String {
        let sep = if path.starts_with('/') { "" } else { "/" };
        let mut url = format!("{}{sep}{path}?op={op}", self.base);
        if !extra.is_empty() {
            url.push('&');
            url.push_str(extra);
        }
        if let Some(user) = &self.user {
            url.push_str("&user.name=");
            url.push_str(user);
        }
        url
    }
}

fn request_error(err: &reqwest::Error) -> StoreError {
    let kind = if err.is_timeout() { ErrorKind::Timeout } else { ErrorKind::Network };
    StoreError::new(kind, err.to_string())
}

fn status_error(op: &str, path: &str, status: StatusCode) -> StoreError {
    let kind = match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::AlreadyExists,
        StatusCode::BAD_REQUEST => ErrorKind::InvalidInput,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        StatusCode::SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Internal,
    };
    StoreError::new(kind, format!("{op} {path}: http {status}"))
}

fn redirect_location(op: &str, path: &str, resp: &Response) -> StoreResult<String> {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            StoreError::new(ErrorKind::Internal, format!("{op} {path}: redirect without location"))
        })
}

impl RemoteStore for WebHdfsStore {
    fn put(&self, path: &str, data: &[u8], overwrite: bool) -> StoreResult<()> {
        let url = self.url(path, "CREATE", &format!("overwrite={overwrite}"));
        let resp = self.client.put(&url).send().map_err(|e| request_error(&e))?;
        let status = resp.status();
        if !status.is_redirection() {
            return Err(status_error("create", path, status));
        }
        let location = redirect_location("create", path, &resp)?;

        let resp =
            self.client.put(&location).body(data.to_vec()).send().map_err(|e| request_error(&e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error("create", path, status));
        }
        Ok(())
    }

    fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let url = self.url(path, "OPEN", "");
        let mut resp = self.client.get(&url).send().map_err(|e| request_error(&e))?;
        if resp.status().is_redirection() {
            let location = redirect_location("open", path, &resp)?;
            resp = self.client.get(&location).send().map_err(|e| request_error(&e))?;
        }
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error("open", path, status));
        }
        let bytes = resp.bytes().map_err(|e| request_error(&e))?;
        Ok(bytes.to_vec())
    }

    fn mkdirs(&self, path: &str) -> StoreResult<()> {
        let url = self.url(path, "MKDIRS", "");
        let resp = self.client.put(&url).send().map_err(|e| request_error(&e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error("mkdirs", path, status));
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        let url = self.url(path, "GETFILESTATUS", "");
        let resp = self.client.get(&url).send().map_err(|e| request_error(&e))?;
        match resp.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(status_error("stat", path, status)),
        }
    }

    fn list(&self, path: &str) -> StoreResult<Vec<String>> {
        let url = self.url(path, "LISTSTATUS", "");
        let resp = self.client.get(&url).send().map_err(|e| request_error(&e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error("list", path, status));
        }
        let body: serde_json::Value = resp.json().map_err(|e| {
            StoreError::new(ErrorKind::Internal, format!("list {path}: malformed response: {e}"))
        })?;
        let mut names: Vec<String> = body["FileStatuses"]["FileStatus"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|status| status["pathSuffix"].as_str())
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }
}
