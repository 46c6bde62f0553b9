//! Organization strategies.
//!
//! A [`Strategy`] maps one [`InputFile`] to a raw, unsanitized
//! [`PlannedPath`]. The plan builder takes care of sanitizing, resolving
//! duplicates and claiming; strategies only decide *where a file belongs*.
//!
//! The set of strategies is closed and selected by [`Mode`], once per run.

mod content;
mod date;
mod kind;

pub use self::content::ContentStrategy;
pub use self::date::DateStrategy;
pub use self::kind::TypeStrategy;

use crate::error::{Error, ErrorKind, Result};
use crate::file::InputFile;
use crate::normalize::Normalizer;
use crate::sanitize::sanitize_path;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Where a strategy wants a file to go, before sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    pub folders: Vec<String>,
    pub stem: String,
    pub extension: String,
}
impl PlannedPath {
    /// Sanitizes every component into a path relative to the output root.
    pub fn to_relative(&self) -> Result<PathBuf> {
        sanitize_path(&self.folders, &self.stem, &self.extension)
    }
}

pub trait Strategy: Send + Sync {
    fn mode(&self) -> Mode;

    /// Decides the destination of a single file.
    ///
    /// # Errors
    /// A failure only affects this file: the plan builder falls back to
    /// [`TypeStrategy`] and records a diagnostic.
    fn plan_path(&self, file: &InputFile) -> Result<PlannedPath>;
}

/// The organization mode selected for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Group by the category reported by content analysis.
    Content,
    /// Group by year and month of last modification.
    Date,
    /// Group by file extension.
    #[default]
    Type,
}
impl Mode {
    /// Builds the strategy for this mode. Only [`Mode::Content`] uses the
    /// normalizer.
    pub fn strategy(self, normalizer: Normalizer) -> Box<dyn Strategy> {
        match self {
            Self::Content => Box::new(ContentStrategy::new(normalizer)),
            Self::Date => Box::new(DateStrategy),
            Self::Type => Box::new(TypeStrategy),
        }
    }

    /// Whether planning in this mode benefits from content analysis.
    pub fn needs_analysis(&self) -> bool {
        matches!(self, Self::Content)
    }
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Content => "content",
            Self::Date => "date",
            Self::Type => "type",
        })
    }
}
impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "date" => Ok(Self::Date),
            "type" => Ok(Self::Type),
            _ => exn::bail!(ErrorKind::UnknownMode(s.to_string())),
        }
    }
}
