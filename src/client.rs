use crate::error::FetchError;
use crate::feed::Source;
use crate::report::{self, Item, Response};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, trace, warn};
use ureq::{Agent, AgentBuilder, Error};
use url::Url;

pub const URL_BASE: &str = "https://api.dmdata.jp/v2/gd/eew/";
const USER_AGENT: &str = concat!("eew-buddy/", env!("CARGO_PKG_VERSION"));

/// Issues a single GET per call against the EEW endpoint. Holds no state
/// beyond its configuration.
#[derive(Debug)]
pub struct Client {
    client: Agent,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Client {
        let mut builder = AgentBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Client {
            client: builder.build(),
            base_url: base_url.to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    pub fn endpoint(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|source| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("formatMode", "json")
            .append_pair("xmlReport", "true");
        Ok(url)
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching {}", redact_key(url));
        match self.client.get(url.as_str()).call() {
            Ok(response) => {
                let mut body = Vec::new();
                response.into_reader().read_to_end(&mut body)?;
                trace!("Received body:\n{}", String::from_utf8_lossy(&body));
                Ok(body)
            }
            Err(Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                debug!("{code}: {body}");
                Err(FetchError::Status { code, body })
            }
            Err(Error::Transport(err)) => {
                let error = err.to_string();
                debug!("{error}");
                if let Some(message) = err.message() {
                    debug!("{message}");
                }
                Err(FetchError::Transport(error))
            }
        }
    }

    pub fn fetch_response(&self) -> Result<Response, FetchError> {
        let url = self.endpoint()?;
        if self.api_key.is_empty() {
            warn!("No API key configured, the request will likely be rejected");
        }
        let body = self.get(&url)?;
        let response = report::decode(&body)?;
        debug!(
            "Decoded response {} with {} items",
            response.response_id,
            response.items.len()
        );
        Ok(response)
    }

    pub fn fetch(&self) -> Result<Vec<Item>, FetchError> {
        Ok(self.fetch_response()?.items)
    }
}

impl Source for Client {
    fn fetch(&self) -> Result<Vec<Item>, FetchError> {
        Client::fetch(self)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(URL_BASE, "", None)
    }
}

fn redact_key(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" && !v.is_empty() {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
