//! Policy document loading and editing.
//!
//! Each meta directory holds at most one `policy.yaml`. A document that
//! cannot be read or parsed is treated as absent; resolution never fails
//! on a bad document.

use crate::error::OpError;
use crate::policy::{meta, POLICY_FILENAME};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Load the document stored in `meta_dir`, if any. Malformed documents
/// degrade to `None` with a warning; an empty file is an empty document.
pub fn load_from_meta(meta_dir: &Path) -> Option<Mapping> {
    let path = meta_dir.join(POLICY_FILENAME);
    if !path.exists() {
        return None;
    }
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("unreadable policy document at {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&contents) {
        Ok(Value::Mapping(doc)) => Some(doc),
        Ok(Value::Null) => Some(Mapping::new()),
        Ok(_) => {
            warn!("policy document at {} is not a mapping", path.display());
            None
        }
        Err(err) => {
            warn!("malformed policy document at {}: {}", path.display(), err);
            None
        }
    }
}

/// Load the document governing `path` by resolving its meta directory.
pub fn load_for(path: &Path) -> Option<Mapping> {
    meta::find_meta_dir(path).and_then(|meta_dir| load_from_meta(&meta_dir))
}

/// Parse a user-supplied scalar the way YAML would ("true" -> bool,
/// "26" -> number, quoted strings unquoted). Falls back to the literal
/// string.
pub fn parse_scalar(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Set a dotted key in the meta directory's document, creating the
/// document and intermediate mappings as needed. Returns the document
/// path.
pub fn set_value(meta_dir: &Path, dotted: &str, value: Value) -> Result<PathBuf, OpError> {
    let mut doc = load_from_meta(meta_dir).unwrap_or_default();
    let mut current = &mut doc;
    let mut parts = dotted.split('.').peekable();
    while let Some(part) = parts.next() {
        let key = Value::String(part.to_string());
        if parts.peek().is_none() {
            current.insert(key, value);
            break;
        }
        if !current.get(&key).is_some_and(Value::is_mapping) {
            current.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        current = match current.get_mut(&key) {
            Some(Value::Mapping(next)) => next,
            _ => unreachable!("intermediate key was just inserted as a mapping"),
        };
    }
    write_document(meta_dir, &doc)
}

/// Outcome of removing a key from a local document.
#[derive(Debug)]
pub struct UnsetOutcome {
    pub document: PathBuf,
    /// True when the document became empty and was deleted.
    pub removed_document: bool,
}

/// Remove a dotted key from the meta directory's document. Empty parent
/// mappings are pruned; an empty document is deleted outright.
pub fn unset_value(meta_dir: &Path, dotted: &str) -> Result<UnsetOutcome, OpError> {
    let path = meta_dir.join(POLICY_FILENAME);
    let mut doc = load_from_meta(meta_dir)
        .ok_or_else(|| OpError::Config(format!("no policy document at {}", path.display())))?;

    if !remove_dotted(&mut doc, dotted) {
        return Err(OpError::Config(format!(
            "key {} not found in local policy",
            dotted
        )));
    }
    prune_empty(&mut doc);

    if doc.is_empty() {
        std::fs::remove_file(&path)?;
        return Ok(UnsetOutcome {
            document: path,
            removed_document: true,
        });
    }
    let document = write_document(meta_dir, &doc)?;
    Ok(UnsetOutcome {
        document,
        removed_document: false,
    })
}

fn write_document(meta_dir: &Path, doc: &Mapping) -> Result<PathBuf, OpError> {
    let path = meta_dir.join(POLICY_FILENAME);
    let rendered = serde_yaml::to_string(doc)
        .map_err(|err| OpError::Config(format!("cannot serialize policy document: {}", err)))?;
    std::fs::write(&path, rendered)?;
    Ok(path)
}

fn remove_dotted(doc: &mut Mapping, dotted: &str) -> bool {
    let parts: Vec<&str> = dotted.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };
    let mut current = doc;
    for part in parents {
        current = match current.get_mut(*part) {
            Some(Value::Mapping(next)) => next,
            _ => return false,
        };
    }
    current.remove(*last).is_some()
}

fn prune_empty(doc: &mut Mapping) {
    let empty_keys: Vec<Value> = doc
        .iter_mut()
        .filter_map(|(key, value)| {
            if let Value::Mapping(inner) = value {
                prune_empty(inner);
                if inner.is_empty() {
                    return Some(key.clone());
                }
            }
            None
        })
        .collect();
    for key in empty_keys {
        doc.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_absent_and_empty_documents() {
        let temp = TempDir::new().unwrap();
        assert!(load_from_meta(temp.path()).is_none());

        std::fs::write(temp.path().join(POLICY_FILENAME), "").unwrap();
        assert_eq!(load_from_meta(temp.path()), Some(Mapping::new()));
    }

    #[test]
    fn test_malformed_document_degrades_to_absent() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(POLICY_FILENAME), "conventions: [unclosed").unwrap();
        assert!(load_from_meta(temp.path()).is_none());
    }

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("false"), Value::Bool(false));
        assert_eq!(parse_scalar("26"), Value::Number(26.into()));
        assert_eq!(
            parse_scalar("\"26\""),
            Value::String("26".to_string())
        );
        assert_eq!(
            parse_scalar("sentence"),
            Value::String("sentence".to_string())
        );
    }

    #[test]
    fn test_set_creates_nested_keys() {
        let temp = TempDir::new().unwrap();
        set_value(temp.path(), "conventions.naming.separator", parse_scalar("_")).unwrap();

        let doc = load_from_meta(temp.path()).unwrap();
        let naming = doc
            .get("conventions")
            .and_then(Value::as_mapping)
            .and_then(|c| c.get("naming"))
            .and_then(Value::as_mapping)
            .unwrap();
        assert_eq!(naming.get("separator").and_then(Value::as_str), Some("_"));
    }

    #[test]
    fn test_unset_prunes_and_deletes_empty_document() {
        let temp = TempDir::new().unwrap();
        set_value(temp.path(), "conventions.ids_files_only", Value::Bool(true)).unwrap();
        set_value(temp.path(), "conventions.meta_id", Value::Bool(false)).unwrap();

        let outcome = unset_value(temp.path(), "conventions.ids_files_only").unwrap();
        assert!(!outcome.removed_document);

        let outcome = unset_value(temp.path(), "conventions.meta_id").unwrap();
        assert!(outcome.removed_document);
        assert!(!temp.path().join(POLICY_FILENAME).exists());
    }

    #[test]
    fn test_unset_missing_key_errors() {
        let temp = TempDir::new().unwrap();
        set_value(temp.path(), "conventions.meta_id", Value::Bool(false)).unwrap();
        assert!(unset_value(temp.path(), "conventions.nope").is_err());
    }
}
