use reqwest::Url;
use reqwest::blocking::RequestBuilder;

pub mod error;
pub mod bots;

use error::ApiClientError;

/// header carrying the deploy token on every request
const KEY_HEADER: &str = "key";

pub struct Info {
    pub url: Url
}

pub struct ApiClient {
    pub(crate) client: reqwest::blocking::Client,
    pub(crate) key: String,
    pub(crate) info: Info
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder {
            server: None,
            key: None,
            agent: None
        }
    }

    pub fn url(&self) -> &Url {
        &self.info.url
    }

    pub(crate) fn post<U>(&self, path: U) -> RequestBuilder
    where
        U: AsRef<str>
    {
        let url = self.info.url.join(path.as_ref()).unwrap();

        self.client.post(url)
            .header(KEY_HEADER, &self.key)
    }
}

pub struct ApiClientBuilder {
    server: Option<String>,
    key: Option<String>,
    agent: Option<String>,
}

impl ApiClientBuilder {
    pub fn server<S>(&mut self, server: S)
    where
        S: Into<String>
    {
        self.server = Some(server.into());
    }

    pub fn key<K>(&mut self, key: K)
    where
        K: Into<String>
    {
        self.key = Some(key.into());
    }

    pub fn user_agent<U>(&mut self, user_agent: U)
    where
        U: Into<String>
    {
        self.agent = Some(user_agent.into());
    }

    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let Some(server) = self.server.filter(|v| !v.is_empty()) else {
            return Err(ApiClientError::MissingServer);
        };
        let Some(key) = self.key.filter(|v| !v.is_empty()) else {
            return Err(ApiClientError::MissingKey);
        };

        let url = Url::parse(&server)
            .map_err(|e| ApiClientError::InvalidServer(e))?;
        let user_agent = self.agent.unwrap_or("botfarm-api-client/0.1.0".into());

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiClientError::Reqwest(e))?;

        tracing::debug!(url = %url, "created botfarm client");

        Ok(ApiClient {
            client,
            key,
            info: Info {
                url
            }
        })
    }
}
