use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::Uri;

/// What a REST call carries besides its body.
#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: String,
    pub path: String,
    pub raw_query: Option<String>,
}

impl RestParams {
    pub fn from_parts(
        provider: &str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &str,
        uri: &Uri,
    ) -> Self {
        let mut out = Self {
            provider: provider.to_string(),
            headers: HashMap::new(),
            query,
            method: method.to_string(),
            path: uri.path().to_string(),
            raw_query: uri.query().map(|s| s.to_string()),
        };

        for (k, v) in headers.iter() {
            if let Ok(s) = v.to_str() {
                out.headers.insert(k.to_string(), s.to_string());
            }
        }

        out
    }

    /// A query parameter, with empty values treated as absent.
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}
