//! HTTP transport for the Choplink backend.
//!
//! Attaches the fixed headers every endpoint expects, turns non-2xx
//! responses into [`TransportError::Status`] and decodes bodies into the
//! caller's type. Retries are left to the query cache.

use std::time::Instant;

use metrics::counter;
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::config::ApiSettings;

use super::error::TransportError;

pub(crate) const METRIC_HTTP_REQUESTS: &str = "choplink_http_requests_total";

/// Per-request knobs. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    /// Extra headers; these replace defaults with the same name.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, TransportError> {
        Self::with_json(Method::POST, body)
    }

    pub fn patch_json<B: Serialize>(body: &B) -> Result<Self, TransportError> {
        Self::with_json(Method::PATCH, body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn with_json<B: Serialize>(method: Method, body: &B) -> Result<Self, TransportError> {
        let body =
            serde_json::to_string(body).map_err(|err| TransportError::Encode(err.to_string()))?;
        Ok(Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
    base: String,
    default_headers: HeaderMap,
}

impl Transport {
    pub fn new(settings: &ApiSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Network(format!("failed to build client: {err}")))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            header_name(&settings.auth_header)?,
            header_value(&settings.auth_header, &settings.auth_token)?,
        );
        default_headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        Ok(Self {
            client,
            base: settings.base_url.as_str().trim_end_matches('/').to_string(),
            default_headers,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("choplink/", env!("CARGO_PKG_VERSION"))
    }

    /// Resolves `path` against the base URL by plain concatenation.
    pub fn url(&self, path: &str) -> Result<Url, TransportError> {
        Ok(Url::parse(&format!("{}{}", self.base, path))?)
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, TransportError> {
        let url = self.url(path)?;
        let headers = self.merged_headers(&options.headers)?;
        let method = options.method;

        let mut req = self
            .client
            .request(method.clone(), url)
            .headers(headers);
        if let Some(body) = options.body {
            req = req.body(body);
        }

        let started = Instant::now();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => {
                record(&method, "network_error");
                debug!(%method, path, error = %err, "request failed");
                return Err(TransportError::Network(err.to_string()));
            }
        };
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| {
            record(&method, "network_error");
            TransportError::Network(err.to_string())
        })?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "request completed"
        );

        if !status.is_success() {
            record(&method, "http_error");
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                record(&method, "success");
                Ok(value)
            }
            Err(err) => {
                record(&method, "decode_error");
                Err(TransportError::Decode(err.to_string()))
            }
        }
    }

    fn merged_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut headers = self.default_headers.clone();
        for (name, value) in overrides {
            headers.insert(header_name(name)?, header_value(name, value)?);
        }
        Ok(headers)
    }
}

fn record(method: &Method, outcome: &'static str) {
    counter!(METRIC_HTTP_REQUESTS, "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
}

fn header_name(name: &str) -> Result<HeaderName, TransportError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| TransportError::InvalidHeader {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|err| TransportError::InvalidHeader {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> Transport {
        let settings = ApiSettings::with_base_url(Url::parse(base).expect("url"));
        Transport::new(&settings).expect("transport")
    }

    #[test]
    fn url_is_base_plus_path() {
        let t = transport("https://choplinks-bot.fly.dev/");
        assert_eq!(
            t.url("/restaurant/").expect("url").as_str(),
            "https://choplinks-bot.fly.dev/restaurant/"
        );
        assert_eq!(
            t.url("/restaurant/4/menu").expect("url").as_str(),
            "https://choplinks-bot.fly.dev/restaurant/4/menu"
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let t = transport("https://example.com");
        let headers = t
            .merged_headers(&[("Content-Type".into(), "text/plain".into())])
            .expect("headers");
        assert_eq!(headers.get(CONTENT_TYPE).expect("content type"), "text/plain");
        assert_eq!(headers.get("abidoshaker").expect("secret header"), "secret");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let t = transport("https://example.com");
        let err = t
            .merged_headers(&[("bad header".into(), "x".into())])
            .expect_err("invalid name");
        assert!(matches!(err, TransportError::InvalidHeader { .. }));
    }

    #[test]
    fn json_options_carry_method_and_body() {
        #[derive(Serialize)]
        struct Body {
            name: &'static str,
        }
        let options = RequestOptions::patch_json(&Body { name: "SOUP" }).expect("options");
        assert_eq!(options.method, Method::PATCH);
        assert_eq!(options.body.as_deref(), Some(r#"{"name":"SOUP"}"#));
        assert_eq!(RequestOptions::get().method, Method::GET);
    }
}
