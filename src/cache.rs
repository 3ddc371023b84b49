//! Gzip-compressed on-disk persistence for session cookies and the
//! namespace table.
//!
//! Blobs are written through the binary codec and gzipped so a cache
//! directory survives process restarts. Loads treat a missing file as
//! "nothing cached" rather than an error.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::client::Client;
use crate::error::Result;

/// Default directory for cache blobs, relative to the working directory
pub const CACHE_DIR: &str = "cache";

const COOKIES_FILE: &str = "cookies.gz";
const NAMESPACES_FILE: &str = "namespaces.gz";

fn default_path(file: &str) -> std::path::PathBuf {
    Path::new(CACHE_DIR).join(file)
}

/// Write the client's cookie jar to the default location,
/// `cache/cookies.gz`
pub fn save_cookies_default(client: &Client) -> Result<()> {
    save_cookies(client, default_path(COOKIES_FILE))
}

/// Restore the client's cookie jar from the default location.
///
/// Returns `Ok(false)` when nothing has been cached yet.
pub fn load_cookies_default(client: &mut Client) -> Result<bool> {
    load_cookies(client, default_path(COOKIES_FILE))
}

/// Write the client's namespace table to the default location,
/// `cache/namespaces.gz`
pub fn save_namespaces_default(client: &Client) -> Result<()> {
    save_namespaces(client, default_path(NAMESPACES_FILE))
}

/// Restore the client's namespace table from the default location.
///
/// Returns `Ok(false)` when nothing has been cached yet.
pub fn load_namespaces_default(client: &mut Client) -> Result<bool> {
    load_namespaces(client, default_path(NAMESPACES_FILE))
}

/// Write the client's cookie jar to `path`, creating parent directories
/// as needed.
pub fn save_cookies(client: &Client, path: impl AsRef<Path>) -> Result<()> {
    write_blob(path.as_ref(), &client.cookies_to_bytes())
}

/// Restore the client's cookie jar from `path`.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_cookies(client: &mut Client, path: impl AsRef<Path>) -> Result<bool> {
    let Some(data) = read_blob(path.as_ref())? else {
        return Ok(false);
    };
    client.load_cookies(&data)?;
    Ok(true)
}

/// Write the client's namespace table to `path`
pub fn save_namespaces(client: &Client, path: impl AsRef<Path>) -> Result<()> {
    write_blob(path.as_ref(), &client.namespaces_to_bytes())
}

/// Restore the client's namespace table from `path`.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_namespaces(client: &mut Client, path: impl AsRef<Path>) -> Result<bool> {
    let Some(data) = read_blob(path.as_ref())? else {
        return Ok(false);
    };
    client.load_namespaces(&data)?;
    Ok(true)
}

fn write_blob(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(data)?;
    encoder.finish()?;
    Ok(())
}

fn read_blob(path: &Path) -> Result<Option<Vec<u8>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut decoder = GzDecoder::new(file);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;
    Ok(Some(data))
}
