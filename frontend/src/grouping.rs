//! Grouping of flat entity listings (projects, packages) into tree levels.
//!
//! Listings are replaced wholesale by the server, so every function here works
//! on a full snapshot and is re-run on each resolution.

use std::collections::BTreeMap;

/// Id prefix of namespace nodes, keeping them apart from entity ids.
pub const NAMESPACE_PREFIX: &str = "ns_";

/// `true` when `path` lies strictly below `prefix`, component-wise:
/// `/a/b` is under `/a`, `/ab` is not.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path.starts_with(prefix) && path.len() > prefix.len() && path[prefix.len()..].starts_with('/')
}

/// Entities below `prefix` that have no closer ancestor among themselves.
pub fn direct_children<'a, T>(
    prefix: &str,
    entities: &'a [T],
    path: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    let below: Vec<&T> = entities
        .iter()
        .filter(|entity| is_under(path(entity), prefix))
        .collect();
    below
        .iter()
        .copied()
        .filter(|candidate| {
            !below
                .iter()
                .any(|other| is_under(path(candidate), path(other)))
        })
        .collect()
}

/// `foo` for `foo/bar`; `None` for names without namespace.
pub fn namespace(name: &str) -> Option<&str> {
    name.split_once('/')
        .map(|(namespace, _)| namespace)
        .filter(|namespace| !namespace.is_empty())
}

pub fn skip_namespace(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub fn namespace_id(namespace: &str) -> String {
    format!("{NAMESPACE_PREFIX}{namespace}")
}

#[derive(Debug)]
pub struct Grouped<T> {
    /// Namespace name with its members, both sorted by display name.
    pub namespaces: Vec<(String, Vec<T>)>,
    /// Entities without namespace, sorted by name.
    pub direct: Vec<T>,
}

impl<T> Grouped<T> {
    pub fn members(self, namespace: &str) -> Vec<T> {
        self.namespaces
            .into_iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, members)| members)
            .unwrap_or_default()
    }
}

pub fn group_by_namespace<T>(
    entities: impl IntoIterator<Item = T>,
    name: impl Fn(&T) -> &str,
) -> Grouped<T> {
    let mut namespaces: BTreeMap<String, Vec<T>> = BTreeMap::new();
    let mut direct = Vec::new();
    for entity in entities {
        match namespace(name(&entity)).map(str::to_string) {
            Some(key) => namespaces.entry(key).or_default().push(entity),
            None => direct.push(entity),
        }
    }
    let by_display_name = |a: &T, b: &T| skip_namespace(name(a)).cmp(skip_namespace(name(b)));
    let namespaces = namespaces
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(by_display_name);
            (key, members)
        })
        .collect();
    direct.sort_by(by_display_name);
    Grouped { namespaces, direct }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_ancestor_wins() {
        let paths = ["/a", "/a/b", "/a/b/c", "/a/x", "/ab"];
        let children: Vec<_> = direct_children("/a", &paths, |path| *path)
            .into_iter()
            .copied()
            .collect();
        assert_eq!(children, vec!["/a/b", "/a/x"]);

        let nested: Vec<_> = direct_children("/a/b", &paths, |path| *path)
            .into_iter()
            .copied()
            .collect();
        assert_eq!(nested, vec!["/a/b/c"]);
        assert!(direct_children("/a/x", &paths, |path| *path).is_empty());
    }

    #[test]
    fn prefix_match_is_component_aware() {
        assert!(is_under("/a/b", "/a"));
        assert!(is_under("/a/b", "/a/"));
        assert!(!is_under("/ab", "/a"));
        assert!(!is_under("/a", "/a"));
        assert!(is_under("/a", "/"));
    }

    #[test]
    fn names_partition_into_namespaces() {
        let grouped = group_by_namespace(["qux", "foo/baz", "foo/bar"], |name| *name);
        assert_eq!(grouped.direct, vec!["qux"]);
        assert_eq!(grouped.namespaces.len(), 1);
        let (key, members) = &grouped.namespaces[0];
        assert_eq!(namespace_id(key), "ns_foo");
        assert_eq!(members, &vec!["foo/bar", "foo/baz"]);
        assert_eq!(skip_namespace("@youwol/foo"), "foo");
        assert_eq!(namespace("/foo"), None);
    }
}
