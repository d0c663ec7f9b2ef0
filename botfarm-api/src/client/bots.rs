use std::path::PathBuf;

use reqwest::StatusCode;
use reqwest::blocking::Response;
use reqwest::blocking::multipart::Form;

use crate::bots::BotRef;
use crate::client::ApiClient;
use crate::client::error::RequestError;

/// body the server responds with once a lifecycle request has completed
const DONE_BODY: &str = "done";

fn done_response(res: Response) -> Result<(), RequestError> {
    match res.status() {
        StatusCode::OK => {
            let body = res.text()?;

            if body == DONE_BODY {
                Ok(())
            } else {
                Err(RequestError::Server {
                    status: StatusCode::OK,
                    body
                })
            }
        },
        StatusCode::UNAUTHORIZED => Err(RequestError::Auth),
        status => Err(RequestError::Server {
            status,
            body: res.text().unwrap_or_default()
        })
    }
}

/// uploads a packaged bot archive to the server
pub struct UploadBot {
    archive: PathBuf
}

impl UploadBot {
    pub fn archive<P>(archive: P) -> Self
    where
        P: Into<PathBuf>
    {
        UploadBot {
            archive: archive.into()
        }
    }

    pub fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let form = Form::new().file("file", &self.archive)?;

        let res = client.post("bots/upload")
            .multipart(form)
            .send()?;

        match res.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(RequestError::Auth),
            status => Err(RequestError::Server {
                status,
                body: res.text().unwrap_or_default()
            })
        }
    }
}

/// has the server unpack and register an uploaded bot archive
pub struct ProcessBot {
    body: BotRef
}

impl ProcessBot {
    pub fn name<N>(name: N) -> Self
    where
        N: Into<String>
    {
        ProcessBot {
            body: BotRef::new(name)
        }
    }

    pub fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let res = client.post("bots/process")
            .json(&self.body)
            .send()?;

        done_response(res)
    }
}

/// starts a processed bot on the server
pub struct StartBot {
    body: BotRef
}

impl StartBot {
    pub fn name<N>(name: N) -> Self
    where
        N: Into<String>
    {
        StartBot {
            body: BotRef::new(name)
        }
    }

    pub fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let res = client.post("bots/start")
            .json(&self.body)
            .send()?;

        done_response(res)
    }
}

/// stops a running bot on the server
pub struct StopBot {
    body: BotRef
}

impl StopBot {
    pub fn name<N>(name: N) -> Self
    where
        N: Into<String>
    {
        StopBot {
            body: BotRef::new(name)
        }
    }

    pub fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let res = client.post("bots/stop")
            .json(&self.body)
            .send()?;

        done_response(res)
    }
}
