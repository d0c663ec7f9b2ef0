use std::path::PathBuf;

use botfarm_api::bots;
use botfarm_api::client::ApiClient;

use crate::error::{self, Context};

pub struct AppState {
    pub state_dir: PathBuf,
    pub server: String,
    pub key: Option<String>,
}

impl AppState {
    /// botfarm reached when no server is given on the command line
    pub const DEFAULT_SERVER: &'static str = "https://botfarm.zulipdev.org/";

    /// directory bot packages are written to between pack and clean
    pub const STATE_DIR: &'static str = "bots";

    pub fn new(server: String, key: Option<String>) -> AppState {
        AppState {
            state_dir: PathBuf::from(Self::STATE_DIR),
            server,
            key,
        }
    }

    /// fixed location of the package for the given bot name
    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.state_dir.join(bots::archive_name(name))
    }

    pub fn client(&self) -> error::Result<ApiClient> {
        let mut builder = ApiClient::builder();
        builder.server(self.server.clone());

        if let Some(key) = &self.key {
            builder.key(key.clone());
        }

        builder.build().context("failed to create api client")
    }
}
