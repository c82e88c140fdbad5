//! Resource catalogue exposed through `resources/list` and
//! `resources/templates/list`.

use serde_json::{Value, json};

pub const SCHEME: &str = "pm://";
pub const PROJECTS_URI: &str = "pm://projects";
pub const PROJECT_TEMPLATE: &str = "pm://projects/{project_id}";
pub const MIME_JSON: &str = "application/json";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Projects,
    Project(String),
}

impl ResourceRef {
    /// Parse a `pm://` URI. Returns `None` for anything outside the catalogue.
    pub fn parse(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix(SCHEME)?.trim_end_matches('/');
        match path.split_once('/') {
            None if path == "projects" => Some(Self::Projects),
            Some(("projects", id)) if !id.is_empty() && !id.contains('/') => {
                Some(Self::Project(id.to_string()))
            }
            _ => None,
        }
    }

    /// Admin API action that backs the resource.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Projects => "get_projects",
            Self::Project(_) => "get_project",
        }
    }
}

pub fn list_resources() -> Vec<Value> {
    vec![json!({
        "uri": PROJECTS_URI,
        "name": "projects",
        "description": "All projects visible to the account",
        "mimeType": MIME_JSON,
    })]
}

pub fn list_templates() -> Vec<Value> {
    vec![json!({
        "uriTemplate": PROJECT_TEMPLATE,
        "name": "project",
        "description": "A single project by ID",
        "mimeType": MIME_JSON,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projects() {
        assert_eq!(ResourceRef::parse("pm://projects"), Some(ResourceRef::Projects));
        assert_eq!(ResourceRef::parse("pm://projects/"), Some(ResourceRef::Projects));
    }

    #[test]
    fn test_parse_single_project() {
        assert_eq!(
            ResourceRef::parse("pm://projects/42"),
            Some(ResourceRef::Project("42".to_string()))
        );
        assert_eq!(ResourceRef::Project("42".to_string()).action(), "get_project");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(ResourceRef::parse("pm://tasks"), None);
        assert_eq!(ResourceRef::parse("file:///etc/passwd"), None);
        assert_eq!(ResourceRef::parse("pm://projects/1/tasks"), None);
    }

    #[test]
    fn test_catalogue_entries_are_json() {
        assert_eq!(list_resources()[0]["uri"], PROJECTS_URI);
        assert_eq!(list_templates()[0]["uriTemplate"], PROJECT_TEMPLATE);
    }
}
