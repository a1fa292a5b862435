use serde_json::{json, Value};
use ureq::Agent;

use crate::{
    error::Error,
    item::{BrowseId, Continuation},
    page::Page,
    source::BrowseSource,
    util::default_ureq_agent_builder,
};

use super::{model::BrowseResponse, request::RequestBuilder};

const BROWSE_PATH: &str = "youtubei/v1/browse";

#[derive(Clone, Debug)]
pub struct WebApiConfig {
    pub base_url: String,
    pub client_name: String,
    pub client_version: String,
    /// Interface language.
    pub hl: String,
    /// Content region.
    pub gl: String,
    pub proxy_url: Option<String>,
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://music.youtube.com".to_string(),
            client_name: "WEB_REMIX".to_string(),
            client_version: "1.20240403.01.00".to_string(),
            hl: "en".to_string(),
            gl: "US".to_string(),
            proxy_url: None,
        }
    }
}

/// `BrowseSource` backed by the music catalog's JSON browse endpoint.
pub struct WebApi {
    agent: Agent,
    config: WebApiConfig,
}

impl WebApi {
    pub fn new(config: WebApiConfig) -> Self {
        let agent = default_ureq_agent_builder(config.proxy_url.as_deref())
            .build()
            .into();
        Self { agent, config }
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": self.config.client_name,
                "clientVersion": self.config.client_version,
                "hl": self.config.hl,
                "gl": self.config.gl,
            }
        })
    }

    fn browse_request(&self) -> RequestBuilder {
        RequestBuilder::new(&self.config.base_url, BROWSE_PATH)
            .query("prettyPrint", "false")
            .body_field("context", self.context())
    }

    fn continued(request: RequestBuilder, token: &Continuation) -> RequestBuilder {
        request
            .query("ctoken", token.as_str())
            .query("continuation", token.as_str())
            .query("type", "next")
    }

    /// Send the request and parse the response body into a page.
    fn load_page(&self, request: &RequestBuilder) -> Result<Page, Error> {
        let url = request.build()?;
        log::debug!("requesting {}", url.path());
        let mut response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .header("Origin", &self.config.base_url)
            .send_json(request.get_body())?;
        let parsed: BrowseResponse = response.body_mut().read_json()?;
        parsed.into_page()
    }
}

impl BrowseSource for WebApi {
    fn browse_by_id(&self, browse_id: &BrowseId) -> Result<Page, Error> {
        let request = self.browse_request().body_field("browseId", browse_id.as_str());
        self.load_page(&request)
    }

    fn browse_continuation(&self, token: &Continuation) -> Result<Page, Error> {
        let request = Self::continued(self.browse_request(), token);
        self.load_page(&request)
    }

    fn charts_continuation(&self, token: Option<&Continuation>) -> Result<Page, Error> {
        let mut request = self
            .browse_request()
            .body_field("browseId", BrowseId::CHARTS);
        if let Some(token) = token {
            request = Self::continued(request, token);
        }
        self.load_page(&request)
    }
}
