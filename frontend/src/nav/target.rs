//! Navigation targets: a `/`-delimited path plus query-like parameters.

use serde::Serialize;
use std::collections::BTreeMap;

use super::NavError;

const NAV_PREFIX: &str = "@nav";
const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NavTarget {
    pub path: String,
    pub parameters: BTreeMap<String, String>,
}

impl NavTarget {
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize(path),
            parameters: BTreeMap::new(),
        }
    }

    /// Parse `/a/b?target=x&k=v`; parameter values are percent-decoded.
    pub fn parse(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let parameters = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self {
            path: normalize(path),
            parameters,
        }
    }

    pub fn with_parameter(mut self, key: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn to_url(&self) -> String {
        if self.parameters.is_empty() {
            return self.path.clone();
        }
        let query = self
            .parameters
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

impl From<&str> for NavTarget {
    fn from(url: &str) -> Self {
        Self::parse(url)
    }
}

impl From<String> for NavTarget {
    fn from(url: String) -> Self {
        Self::parse(&url)
    }
}

/// Expand `@nav[alias]/rest` and `@nav/rest` links into concrete paths.
///
/// Plain paths are returned unchanged. Alias targets may themselves be
/// `@nav` links; expansion is bounded to catch alias cycles.
pub fn expand_link(link: &str, aliases: &BTreeMap<String, String>) -> Result<String, NavError> {
    let mut current = link.to_string();
    for _ in 0..MAX_ALIAS_DEPTH {
        let Some(rest) = current.strip_prefix(NAV_PREFIX) else {
            return Ok(current);
        };
        let Some(aliased) = rest.strip_prefix('[') else {
            return Ok(normalize(rest));
        };
        let (alias, tail) = aliased.split_once(']').ok_or_else(|| NavError::InvalidTarget {
            target: link.to_string(),
            reason: "unterminated alias".to_string(),
        })?;
        let base = aliases.get(alias).ok_or_else(|| NavError::InvalidTarget {
            target: link.to_string(),
            reason: format!("unknown alias `{alias}`"),
        })?;
        current = format!("{base}{tail}");
    }
    Err(NavError::InvalidTarget {
        target: link.to_string(),
        reason: "alias expansion does not terminate".to_string(),
    })
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with(NAV_PREFIX) {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("w3nest-api".to_string(), "@nav/doc/server-api/w3nest".to_string()),
            ("loop".to_string(), "@nav[loop]".to_string()),
        ])
    }

    #[test]
    fn parse_splits_path_and_parameters() {
        let target = NavTarget::parse("/mounted/abc/?target=file_eA%3D%3D&x");
        assert_eq!(target.path, "/mounted/abc");
        assert_eq!(target.parameter("target"), Some("file_eA=="));
        assert_eq!(target.parameter("x"), Some(""));
        assert_eq!(target.segments(), vec!["mounted", "abc"]);
    }

    #[test]
    fn url_round_trips_through_parse() {
        let target = NavTarget::new("environment/backends").with_parameter("target", "a b&c");
        assert_eq!(target.path, "/environment/backends");
        assert_eq!(NavTarget::parse(&target.to_url()), target);
        assert_eq!(NavTarget::new("").to_url(), "/");
        assert_eq!(NavTarget::parse("@nav[w3nest-api]/x").path, "@nav[w3nest-api]/x");
    }

    #[test]
    fn aliases_expand_before_walking() {
        let expanded = expand_link("@nav[w3nest-api]/app/middlewares", &aliases()).unwrap();
        assert_eq!(expanded, "/doc/server-api/w3nest/app/middlewares");
        assert_eq!(expand_link("@nav/projects", &aliases()).unwrap(), "/projects");
        assert_eq!(expand_link("/plain", &aliases()).unwrap(), "/plain");
    }

    #[test]
    fn bad_aliases_are_reported() {
        assert!(matches!(
            expand_link("@nav[missing]/x", &aliases()),
            Err(NavError::InvalidTarget { .. })
        ));
        assert!(matches!(
            expand_link("@nav[w3nest-api", &aliases()),
            Err(NavError::InvalidTarget { .. })
        ));
        assert!(matches!(
            expand_link("@nav[loop]", &aliases()),
            Err(NavError::InvalidTarget { .. })
        ));
    }
}
