//! Charset and class-name loading utilities.

use crate::core::OCRError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CharsetFile {
    model: CharsetModel,
}

#[derive(Debug, Deserialize)]
struct CharsetModel {
    charset_train: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassNames {
    List(Vec<String>),
    Map(BTreeMap<usize, String>),
}

#[derive(Debug, Deserialize)]
struct ClassNamesFile {
    names: ClassNames,
}

fn read_content(path: &Path, what: &str) -> Result<String, OCRError> {
    std::fs::read_to_string(path).map_err(|e| OCRError::InvalidInput {
        message: format!("Failed to read {what} from '{}': {}", path.display(), e),
    })
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Loads the recognizer charset.
///
/// YAML files provide the charset as the string `model.charset_train`, one
/// token per character. Any other file is read as one token per line.
///
/// # Errors
///
/// Returns an `OCRError::InvalidInput` if the file cannot be read, and an
/// `OCRError::ConfigError` if it cannot be parsed or yields no tokens.
pub fn load_charset(path: &Path) -> Result<Vec<String>, OCRError> {
    let content = read_content(path, "charset")?;
    let charlist: Vec<String> = if is_yaml(path) {
        let file: CharsetFile = serde_yaml::from_str(&content).map_err(|e| {
            OCRError::config_error_detailed(format!("charset file '{}'", path.display()), e.to_string())
        })?;
        file.model
            .charset_train
            .chars()
            .map(|c| c.to_string())
            .collect()
    } else {
        content.lines().map(|s| s.to_string()).collect()
    };

    if charlist.is_empty() {
        return Err(OCRError::config_error(format!(
            "charset file '{}' contains no tokens",
            path.display()
        )));
    }
    Ok(charlist)
}

/// Loads the detector class names from a YAML `names` list or index map.
///
/// Map keys are 0-based class indices; gaps are filled with empty names.
pub fn load_class_names(path: &Path) -> Result<Vec<String>, OCRError> {
    let content = read_content(path, "class names")?;
    let file: ClassNamesFile = serde_yaml::from_str(&content).map_err(|e| {
        OCRError::config_error_detailed(format!("class names file '{}'", path.display()), e.to_string())
    })?;
    Ok(match file.names {
        ClassNames::List(names) => names,
        ClassNames::Map(map) => {
            let len = map.keys().next_back().map_or(0, |k| k + 1);
            let mut names = vec![String::new(); len];
            for (index, name) in map {
                names[index] = name;
            }
            names
        }
    })
}
