//! Date-named output files and the posted archive

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::quotes::parse_post_date;
use crate::Result;

/// Written next to each image so posting knows what the image says
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionSidecar {
    pub quote: String,
    pub author: String,
    pub caption: String,
    /// SHA-256 of the rendered pixels
    pub digest: String,
}

pub fn output_file_name(date: NaiveDate) -> String {
    format!("{}.png", date.format("%Y-%m-%d"))
}

pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// Date encoded in a file's stem, if any
pub fn date_from_path(path: &Path) -> Option<NaiveDate> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(parse_post_date)
}

/// First `.png` in `dir` whose name carries `today`'s date.
pub fn find_today(dir: &Path, today: NaiveDate) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "png"))
        .filter(|p| date_from_path(p) == Some(today))
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

pub fn write_sidecar(image_path: &Path, sidecar: &CaptionSidecar) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar)?;
    fs::write(sidecar_path(image_path), json)?;
    Ok(())
}

pub fn read_sidecar(image_path: &Path) -> Result<Option<CaptionSidecar>> {
    let path = sidecar_path(image_path);
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&data)?))
}

/// Move a posted image (and its sidecar) into `posted_dir` so it is never
/// posted twice. Returns the image's new path.
pub fn mark_posted(image_path: &Path, posted_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(posted_dir)?;
    let name = image_path.file_name().unwrap_or_default();
    let target = posted_dir.join(name);
    fs::rename(image_path, &target)?;

    // the caption follows only once the image has moved
    let sidecar = sidecar_path(image_path);
    if sidecar.exists() {
        if let Some(name) = sidecar.file_name() {
            fs::rename(&sidecar, posted_dir.join(name))?;
        }
    }
    info!("moved {} to {}", image_path.display(), target.display());
    Ok(target)
}
