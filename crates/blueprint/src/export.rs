//! Output formats and artifact writing.

pub mod dot;

use std::{
    ffi::OsString,
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// An artifact format the renderer can produce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raster image (default)
    #[default]
    Png,
    /// Raster image
    #[serde(alias = "jpeg")]
    Jpg,
    /// Vector image
    Svg,
    /// Document
    Pdf,
    /// The Graphviz source itself; no engine run needed
    Dot,
}

impl OutputFormat {
    /// Every supported format.
    pub const ALL: [OutputFormat; 5] = [Self::Png, Self::Jpg, Self::Svg, Self::Pdf, Self::Dot];

    /// File extension of the artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }

    /// Whether the layout engine has to run to produce this format.
    pub fn needs_engine(self) -> bool {
        self != Self::Dot
    }
}

impl FromStr for OutputFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" => Ok(Self::Dot),
            _ => Err("Unsupported format, expected one of png, jpg, svg, pdf, dot"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returns the path of the `format` artifact for the output path `base`.
///
/// A known format extension on `base` is replaced; anything else is kept and
/// the format extension is appended.
pub fn artifact_path(base: &Path, format: OutputFormat) -> PathBuf {
    let known = base
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<OutputFormat>().ok())
        .is_some();

    if known {
        return base.with_extension(format.extension());
    }

    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(format.extension());
    PathBuf::from(path)
}

/// An artifact written to a temporary file next to its final path.
///
/// Dropping it removes the temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file: NamedTempFile,
    replaces: bool,
}

impl StagedFile {
    /// Final path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the file into place with a single rename.
    fn persist(self) -> io::Result<PathBuf> {
        self.file.persist(&self.path).map_err(|err| err.error)?;
        Ok(self.path)
    }
}

/// Writes `bytes` to a temporary file in the directory of `path`.
///
/// Nothing is visible at `path` until the file is committed.
///
/// # Errors
///
/// Fails if `path` is a directory or the temporary file cannot be written.
pub fn stage(path: &Path, bytes: &[u8]) -> io::Result<StagedFile> {
    if path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("Artifact path {} is a directory", path.display()),
        ));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    debug!(path:? = path, bytes = bytes.len(); "Artifact staged");
    Ok(StagedFile {
        path: path.to_path_buf(),
        file,
        replaces: path.exists(),
    })
}

/// Moves every staged file to its final path.
///
/// Each target either keeps its old content or holds the complete new
/// content. If a rename fails, artifacts created by this commit are removed
/// again and the remaining temporary files are dropped.
///
/// # Errors
///
/// Returns the error of the first rename that fails.
pub fn commit(staged: Vec<StagedFile>) -> io::Result<()> {
    let mut created = Vec::new();
    for file in staged {
        let replaces = file.replaces;
        match file.persist() {
            Ok(path) if !replaces => created.push(path),
            Ok(_) => {}
            Err(err) => {
                for path in created {
                    if let Err(remove_err) = fs::remove_file(&path) {
                        warn!(path:? = path, err:% = remove_err; "Could not remove artifact");
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(())
}
