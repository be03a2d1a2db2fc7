//! Publishing rendered images to a posting service.
//!
//! Backends implement [`Publisher`]; [`post_today`] drives the daily flow:
//! pick today's image, publish it once, move it to the posted archive.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpPublisher;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::hashtags::caption;
use crate::output::{find_today, mark_posted, read_sidecar};
use crate::Result;

/// Something that can post an image with a caption
pub trait Publisher: Send + Sync {
    fn publish(&self, image_path: &Path, caption: &str) -> Result<()>;
}

/// Endpoint and credentials for the HTTP publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub timeout_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_ms: 30000,
        }
    }
}

/// Logs instead of posting and remembers what it was asked to publish.
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    published: Mutex<Vec<(PathBuf, String)>>,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(PathBuf, String)> {
        self.published.lock().unwrap().clone()
    }
}

impl Publisher for DryRunPublisher {
    fn publish(&self, image_path: &Path, caption: &str) -> Result<()> {
        info!("dry run: would post {} with caption {:?}", image_path.display(), caption);
        self.published
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), caption.to_string()));
        Ok(())
    }
}

/// Publish the image scheduled for `today`, if any, and archive it.
///
/// The caption comes from the image's sidecar; without one the base tags
/// are used. Returns the archived path, or `None` when nothing is due.
pub fn post_today(
    out_dir: &Path,
    posted_dir: &Path,
    today: NaiveDate,
    base_tags: &[String],
    publisher: &dyn Publisher,
) -> Result<Option<PathBuf>> {
    let Some(image) = find_today(out_dir, today)? else {
        info!("no image scheduled for {today}");
        return Ok(None);
    };

    let text = match read_sidecar(&image)? {
        Some(sidecar) => sidecar.caption,
        None => caption(base_tags, None),
    };
    publisher.publish(&image, &text)?;
    info!("posted {}", image.display());
    mark_posted(&image, posted_dir).map(Some)
}
