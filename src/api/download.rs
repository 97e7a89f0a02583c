use crate::config::DownloadConfig;
use crate::error::{IngestError, Result};
use flate2::read::MultiGzDecoder;
use reqwest::Url;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Blocking HTTP client for archive downloads
pub struct Downloader {
    client: reqwest::blocking::Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// GET `url` and return the body
    ///
    /// A timed-out request is retried after `retry_delay` up to
    /// `max_retries` times. Connection failures and non-200 responses are
    /// returned immediately.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match self.fetch_once(url) {
                Err(IngestError::Http(e)) if e.is_timeout() && attempt < max_retries => {
                    attempt += 1;
                    warn!(
                        url,
                        attempt,
                        max_retries,
                        "request timed out, retrying in {:?}",
                        self.config.retry_delay()
                    );
                    thread::sleep(self.config.retry_delay());
                }
                other => return other,
            }
        }
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            return Err(IngestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }

    /// Download `url` into the download directory, unpack it when it is a
    /// gzip archive, and return the path of the JSON file
    pub fn fetch_to_disk(&self, url: &str) -> Result<PathBuf> {
        let parsed = Url::parse(url).map_err(|_| IngestError::InvalidUrl(url.to_string()))?;
        let data = self.fetch(url)?;
        debug!(url, bytes = data.len(), "download complete");

        let download_path = download_path(&self.config.download_dir(), &parsed);
        save_download(&download_path, &data)?;

        if is_gzip(&data) {
            decompress_gz_file(&download_path)
        } else {
            Ok(download_path)
        }
    }

    /// [`Downloader::fetch_to_disk`] followed by [`load_json`]
    pub fn fetch_json(&self, url: &str) -> Result<Value> {
        let path = self.fetch_to_disk(url)?;
        load_json(&path)
    }
}

/// Local path mirroring the URL path below `dir`
///
/// `https://host/export/pois.json.gz` → `<dir>/export/pois.json.gz`. A URL
/// without a file name is saved as `<dir>/.../download`.
pub fn download_path(dir: &Path, url: &Url) -> PathBuf {
    let mut path = dir.to_path_buf();
    let mut segments = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default();

    if url.path().ends_with('/') || segments.is_empty() {
        segments.push("download");
    }

    for segment in segments {
        path.push(segment);
    }
    path
}

pub fn save_download(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
    }
    fs::write(path, data).map_err(|e| IngestError::io(path, e))?;

    info!(path = %path.display(), "saved archive");
    Ok(())
}

/// Gzip member header check (RFC 1952 magic bytes)
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Unpack `gz_path` next to itself without its last extension
///
/// `pois.json.gz` → `pois.json`. A file without extension gets `.json` so
/// the archive is never overwritten by its own contents. Concatenated gzip
/// members are read to the end.
pub fn decompress_gz_file(gz_path: &Path) -> Result<PathBuf> {
    let target = decompressed_path(gz_path);

    let input = File::open(gz_path).map_err(|e| IngestError::io(gz_path, e))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));

    let output = File::create(&target).map_err(|e| IngestError::io(&target, e))?;
    let mut writer = BufWriter::new(output);

    io::copy(&mut decoder, &mut writer).map_err(|e| IngestError::io(gz_path, e))?;
    writer.flush().map_err(|e| IngestError::io(&target, e))?;

    info!(path = %target.display(), "decompressed archive");
    Ok(target)
}

fn decompressed_path(gz_path: &Path) -> PathBuf {
    match gz_path.extension() {
        Some(_) => gz_path.with_extension(""),
        None => gz_path.with_extension("json"),
    }
}

pub fn load_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut contents = String::new();
    BufReader::new(file)
        .read_to_string(&mut contents)
        .map_err(|e| IngestError::io(path, e))?;

    Ok(serde_json::from_str(&contents)?)
}
