use std::fmt::Display;

use serde_json::{Map, Value};
use url::Url;

use crate::error::Error;

// Builder for JSON POST requests with extendable query pairs and body fields.
#[derive(Debug, Clone)]
pub(super) struct RequestBuilder {
    base_url: String,
    path: String,
    queries: Vec<(String, String)>,
    body: Map<String, Value>,
}

impl RequestBuilder {
    pub fn new(base_url: impl Display, path: impl Display) -> Self {
        Self {
            base_url: base_url.to_string(),
            path: path.to_string(),
            queries: Vec::new(),
            body: Map::new(),
        }
    }

    pub fn query(mut self, key: impl Display, value: impl Display) -> Self {
        self.queries.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body_field(mut self, key: impl Display, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn get_body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn build(&self) -> Result<Url, Error> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base.join(self.path.trim_start_matches('/'))?;
        if !self.queries.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.queries);
        }
        Ok(url)
    }
}
