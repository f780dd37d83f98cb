//! Gateway endpoint paths
//!
//! Collections live at `/{plural}` and items at `/{plural}/{id}`; nested
//! collections hang off their parent item. Id segments are percent-encoded.
//!
//! Ids that URL resolution would collapse (`""`, `.`, `..`) are refused:
//! percent-encoding does not protect them, since `%2e%2e` is a dot segment
//! too, and the request would land on another resource.

use crate::error::{Error, Result};

fn segment(raw: &str) -> Result<String> {
    match raw {
        "" | "." | ".." => Err(Error::InvalidId(raw.to_string())),
        _ => Ok(format!("/{}", urlencoding::encode(raw))),
    }
}

/// Build a path from alternating collection names and ids
pub fn path(segments: &[&str]) -> Result<String> {
    segments.iter().map(|s| segment(s)).collect()
}

pub fn collection(plural: &str) -> String {
    format!("/{}", plural)
}

pub fn item(plural: &str, id: &str) -> Result<String> {
    path(&[plural, id])
}

pub fn nested_collection(parent_plural: &str, parent_id: &str, plural: &str) -> Result<String> {
    path(&[parent_plural, parent_id, plural])
}

pub fn nested_item(parent_plural: &str, parent_id: &str, plural: &str, id: &str) -> Result<String> {
    path(&[parent_plural, parent_id, plural, id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(collection("apps"), "/apps");
        assert_eq!(item("apps", "a1").unwrap(), "/apps/a1");
        assert_eq!(
            nested_collection("apps", "a1", "clients").unwrap(),
            "/apps/a1/clients"
        );
        assert_eq!(
            nested_item("apps", "a1", "jobs", "j2").unwrap(),
            "/apps/a1/jobs/j2"
        );
    }

    #[test]
    fn test_ids_are_encoded() {
        assert_eq!(item("datasets", "a/b c").unwrap(), "/datasets/a%2Fb%20c");
        assert_eq!(item("datasets", "...").unwrap(), "/datasets/...");
        assert_eq!(item("datasets", "%2e%2e").unwrap(), "/datasets/%252e%252e");
    }

    #[test]
    fn test_dot_and_empty_ids_are_rejected() {
        for id in ["", ".", ".."] {
            assert!(matches!(item("apps", id), Err(Error::InvalidId(_))));
            assert!(matches!(
                nested_item("apps", "app_1", "jobs", id),
                Err(Error::InvalidId(_))
            ));
            assert!(matches!(
                nested_collection("identities", id, "consents"),
                Err(Error::InvalidId(_))
            ));
        }
    }
}
