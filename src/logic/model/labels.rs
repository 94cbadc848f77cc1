//! Label Map
//!
//! Class names in classifier output order. Line `i` names output unit `i`.
//!
//! Two layouts are accepted, detected from the first line:
//!
//! ```text
//! plain            indexed
//! Aphid            0 Aphid
//! Fall Armyworm    1 Fall Armyworm
//! ```

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("cannot read label file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("label file contains no class names")]
    Empty,

    #[error("label file line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Ordered class names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let labels = Self::parse(&text)?;
        tracing::info!("Loaded {} class labels from {}", labels.len(), path.display());
        Ok(labels)
    }

    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let mut lines: Vec<&str> = text.lines().map(str::trim).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let first = lines.first().ok_or(LabelError::Empty)?;
        let indexed = split_index(first).is_some();

        let mut names = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let line_no = position + 1;

            if line.is_empty() {
                return Err(LabelError::Malformed {
                    line: line_no,
                    reason: "blank line".to_string(),
                });
            }

            if !indexed {
                names.push(line.to_string());
                continue;
            }

            let (index, name) = split_index(line).ok_or_else(|| LabelError::Malformed {
                line: line_no,
                reason: "expected `<index> <name>`".to_string(),
            })?;

            if index != position {
                return Err(LabelError::Malformed {
                    line: line_no,
                    reason: format!("index {} does not match position {}", index, position),
                });
            }

            names.push(name.to_string());
        }

        Ok(Self { names })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Split `<integer><whitespace><name>`, stripping only the first token
fn split_index(line: &str) -> Option<(usize, &str)> {
    let (token, rest) = line.split_once(char::is_whitespace)?;
    let index = token.parse().ok()?;
    let name = rest.trim();
    if name.is_empty() {
        return None;
    }
    Some((index, name))
}

impl FromIterator<String> for LabelMap {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_names() {
        let labels = LabelMap::parse("Aphid\nFall Armyworm\nWhitefly\n").unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some("Fall Armyworm"));
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn test_indexed_names_strip_first_token_only() {
        let labels = LabelMap::parse("0 Aphid\n1 Fall Armyworm\r\n2  Red Spider Mite\n\n").unwrap();
        assert_eq!(labels.names(), ["Aphid", "Fall Armyworm", "Red Spider Mite"]);
    }

    #[test]
    fn test_numeric_looking_plain_name_is_not_indexed() {
        // No whitespace after the number, so this is a plain name
        let labels = LabelMap::parse("42\nAphid\n").unwrap();
        assert_eq!(labels.names(), ["42", "Aphid"]);
    }

    #[test]
    fn test_indexed_file_rejects_unprefixed_line() {
        let err = LabelMap::parse("0 Aphid\nWhitefly\n").unwrap_err();
        assert!(matches!(err, LabelError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_indexed_file_rejects_misaligned_index() {
        let err = LabelMap::parse("0 Aphid\n2 Whitefly\n").unwrap_err();
        assert!(matches!(err, LabelError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_interior_blank_line_rejected() {
        let err = LabelMap::parse("Aphid\n\nWhitefly\n").unwrap_err();
        assert!(matches!(err, LabelError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(LabelMap::parse(""), Err(LabelError::Empty)));
        assert!(matches!(LabelMap::parse("\n  \n"), Err(LabelError::Empty)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 Aphid").unwrap();
        writeln!(file, "1 Whitefly").unwrap();

        let labels = LabelMap::load(file.path()).unwrap();
        assert_eq!(labels.names(), ["Aphid", "Whitefly"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelMap::load(dir.path().join("classes.txt")).unwrap_err();
        assert!(matches!(err, LabelError::Io { .. }));
    }
}
