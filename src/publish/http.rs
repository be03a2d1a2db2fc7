//! HTTP publisher: multipart upload of the image and caption to an endpoint.

use std::path::Path;
use std::time::Duration;

use log::debug;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use super::{Publisher, PublisherConfig};
use crate::{Error, Result};

pub struct HttpPublisher {
    client: Client,
    config: PublisherConfig,
}

impl HttpPublisher {
    pub fn new(config: PublisherConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(Error::ConfigError("publisher endpoint is not set".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

impl Publisher for HttpPublisher {
    fn publish(&self, image_path: &Path, caption: &str) -> Result<()> {
        let bytes = std::fs::read(image_path)?;
        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());
        let photo = Part::bytes(bytes).file_name(file_name).mime_str("image/png")?;
        let form = Form::new().text("caption", caption.to_string()).part("photo", photo);

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }
        let response = request.send()?;
        let status = response.status();
        debug!("upload of {} answered {}", image_path.display(), status);
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::PublishError(format!("upload rejected with {status}: {body}")));
        }
        Ok(())
    }
}
