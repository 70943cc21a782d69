//! # Tune Files
//!
//! A tune file is PLAY notation with an optional YAML front-matter block
//! fenced by `---` lines, at the top or the bottom of the file:
//!
//! ```text
//! ---
//! title: Ode to Joy
//! composer: Beethoven
//! ---
//! T120 L4 E E F G G F E D
//! C C D E E. D8 D2
//! ```
//!
//! Lines outside the block are the tune, newlines included; the lexer treats
//! them as whitespace.

use serde::{Deserialize, Serialize};

use crate::error::PlayError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TuneMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneFile {
    pub metadata: TuneMetadata,
    pub tune: String,
}

/// Split the front matter from the tune and parse it.
pub fn parse_tune_file(source: &str) -> Result<TuneFile, PlayError> {
    let (front_matter, tune) = split_front_matter(source);

    let metadata = match front_matter {
        Some(content) if !content.trim().is_empty() => {
            serde_yaml::from_str(&content).map_err(|e| PlayError::MetadataError(e.to_string()))?
        }
        _ => TuneMetadata::default(),
    };

    Ok(TuneFile { metadata, tune })
}

/// Returns the YAML between the first pair of `---` lines, if both are
/// present, and the remaining lines.
fn split_front_matter(source: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = source.lines().collect();

    let mut fences = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == "---")
        .map(|(i, _)| i);

    match (fences.next(), fences.next()) {
        (Some(open), Some(close)) => {
            let yaml = lines[open + 1..close].join("\n");
            let tune: Vec<&str> = lines[..open].iter().chain(&lines[close + 1..]).copied().collect();
            (Some(yaml), tune.join("\n"))
        }
        _ => (None, source.to_string()),
    }
}
