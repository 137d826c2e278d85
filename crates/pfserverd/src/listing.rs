//! Directory listing pages.
//!
//! A listing shows the immediate children of a directory as download links,
//! minus any names the configuration excludes. Entries are ordered by their
//! lower-cased name so `A.txt` and `b.txt` sort the way a reader expects.

use std::fs;
use std::io;
use std::path::Path;

use percent_encoding::percent_decode_str;
use pfserver_config::{HeaderMode, ServerConfig};
use thiserror::Error;

use crate::http::response::{NO_FILES_FOUND, NO_SUCH_DIRECTORY, escape_html};

/// A child of the listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectoryEntry {
    pub(crate) name: String,
    pub(crate) is_excluded: bool,
}

/// Why a listing could not be produced.
#[derive(Debug, Error)]
pub(crate) enum ListingError {
    #[error("no listable entries")]
    Empty,
    #[error("failed to read directory: {0}")]
    Unreadable(#[source] io::Error),
}

impl ListingError {
    /// Reason phrase for the 404 response reporting this failure.
    pub(crate) fn reason(&self) -> &'static str {
        match self {
            Self::Empty => NO_FILES_FOUND,
            Self::Unreadable(_) => NO_SUCH_DIRECTORY,
        }
    }
}

/// Reads the immediate children of `dir`, marking excluded names.
pub(crate) fn read_entries(
    dir: &Path,
    config: &ServerConfig,
) -> Result<Vec<DirectoryEntry>, ListingError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(ListingError::Unreadable)? {
        let entry = entry.map_err(ListingError::Unreadable)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_excluded = config.is_excluded(&name);
        entries.push(DirectoryEntry { name, is_excluded });
    }
    Ok(entries)
}

/// Names to show for `dir`, excluded entries removed, in display order.
pub(crate) fn visible_names(dir: &Path, config: &ServerConfig) -> Result<Vec<String>, ListingError> {
    let mut names: Vec<String> = read_entries(dir, config)?
        .into_iter()
        .filter(|entry| !entry.is_excluded)
        .map(|entry| entry.name)
        .collect();
    if names.is_empty() {
        return Err(ListingError::Empty);
    }
    names.sort_by_key(|name| name.to_lowercase());
    Ok(names)
}

/// Renders the listing page for `dir`.
pub(crate) fn render_listing(dir: &Path, config: &ServerConfig) -> Result<String, ListingError> {
    let names = visible_names(dir, config)?;
    Ok(render_page(&names, config))
}

fn render_page(names: &[String], config: &ServerConfig) -> String {
    let header = match config.header_mode {
        HeaderMode::Image => format!(
            "<img src=\"{}\"/>",
            escape_html(&config.header_image_file)
        ),
        HeaderMode::Text => format!("<h1>{}</h1>", escape_html(&config.header_text)),
    };
    let mut lines = vec![
        String::from("<html>"),
        String::from("<title>pfserver</title>"),
        String::from("<head>"),
        String::from(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
        ),
        String::from("<link rel=\"icon\" type=\"image/x-icon\" href=\"favicon.ico\">"),
        String::from("<link rel=\"stylesheet\" type=\"text/css\" href=\"style.css\">"),
        String::from("</head>"),
        String::from("<body>"),
        header,
        String::from("<br>"),
        String::from("<h3>Click a file to download.</h3>"),
        String::from("<ul>"),
    ];
    lines.extend(names.iter().map(|name| entry_line(name)));
    lines.push(String::from("</ul>"));
    lines.push(String::from("</body>"));
    lines.push(String::from("</html>"));
    lines.join("\n")
}

fn entry_line(name: &str) -> String {
    let href = percent_decode_str(name).decode_utf8_lossy();
    format!(
        "<li><a href=\"{}\" download>{}</a></li>",
        escape_html(&href),
        escape_html(name)
    )
}
