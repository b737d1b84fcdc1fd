use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin client for the Supabase PostgREST API backing the record stores.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Service calls fall back to the anon key as bearer
        let bearer = auth_token.unwrap_or(&self.anon_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// GET rows from a table; `query` is a PostgREST query string without the leading `?`.
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };

        self.request(Method::GET, &path, None, None).await
    }

    /// POST a row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<T> = self.request_with_headers(
            Method::POST,
            &path,
            None,
            Some(row),
            Some(Self::return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    /// PATCH rows matching `filter` and return the updated representations.
    pub async fn update<T>(&self, table: &str, filter: &str, patch: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}?{}", table, filter);

        self.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(patch),
            Some(Self::return_representation()),
        ).await
    }

    fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
