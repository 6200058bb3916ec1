//! Host paths exposed under `/mounted`.

use futures::{StreamExt, select};
use shared::{MountedKind, MountedPath, PathsBook};
use std::sync::Arc;

use crate::dataflow::{Actor, Relay, relay};
use crate::path_codec;

#[derive(Clone, Debug)]
pub struct MountedPaths {
    pub paths: Actor<Arc<Vec<MountedPath>>>,

    /// User mounted a folder or file from the host
    pub path_mounted_relay: Relay<MountedPath>,
    /// User removed a mounted path
    pub path_unmounted_relay: Relay<String>,
    /// Environment snapshot arrived, possibly with a new paths book
    pub paths_book_received_relay: Relay<PathsBook>,
}

impl MountedPaths {
    pub fn new() -> Self {
        let (path_mounted_relay, mut mounted_stream) = relay::<MountedPath>();
        let (path_unmounted_relay, mut unmounted_stream) = relay::<String>();
        let (paths_book_received_relay, mut book_stream) = relay::<PathsBook>();

        let paths = Actor::new(Arc::new(Vec::new()), |state| async move {
            let mut current_book: Option<PathsBook> = None;
            loop {
                select! {
                    book = book_stream.next() => match book {
                        Some(book) => {
                            // A new configuration resets the mounts.
                            if current_book.as_ref() != Some(&book) {
                                log::debug!("paths book changed, resetting mounted paths");
                                state.set(Arc::new(book_paths(&book)));
                                current_book = Some(book);
                            }
                        }
                        None => break,
                    },
                    mounted = mounted_stream.next() => match mounted {
                        Some(mounted) => {
                            let current = state.get_cloned();
                            if !current.iter().any(|known| known.path == mounted.path) {
                                let mut paths = current.as_ref().clone();
                                paths.push(mounted);
                                state.set(Arc::new(paths));
                            }
                        }
                        None => break,
                    },
                    unmounted = unmounted_stream.next() => match unmounted {
                        Some(path) => {
                            let mut paths = state.get_cloned().as_ref().clone();
                            paths.retain(|known| known.path != path);
                            state.set(Arc::new(paths));
                        }
                        None => break,
                    },
                }
            }
        });

        Self {
            paths,
            path_mounted_relay,
            path_unmounted_relay,
            paths_book_received_relay,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.latest().iter().any(|mounted| mounted.path == path)
    }
}

impl Default for MountedPaths {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn book_paths(book: &PathsBook) -> Vec<MountedPath> {
    [
        MountedPath::file(book.config.clone()),
        MountedPath::folder(book.databases.clone()),
        MountedPath::folder(book.system.clone()),
    ]
    .into_iter()
    .filter(|mounted| !mounted.path.is_empty())
    .collect()
}

/// Route id of a mounted path: the encoded path, `file_`-prefixed for files.
pub fn mounted_id(mounted: &MountedPath) -> String {
    let token = path_codec::encode(&mounted.path);
    match mounted.kind {
        MountedKind::Folder => token,
        MountedKind::File => format!("file_{token}"),
    }
}

pub fn mounted_nav(mounted: &MountedPath) -> String {
    format!("/mounted/{}", mounted_id(mounted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(config: &str) -> PathsBook {
        PathsBook {
            config: config.to_string(),
            databases: "/lab/databases".to_string(),
            system: "/lab/system".to_string(),
        }
    }

    #[tokio::test]
    async fn paths_book_resets_then_user_mounts_append() {
        let mounted = MountedPaths::new();
        mounted.paths_book_received_relay.send(book("/lab/config.py"));
        mounted.paths.wait_until(|paths| paths.len() == 3).await;
        mounted.path_mounted_relay.send(MountedPath::folder("/home/me/data"));
        mounted.path_mounted_relay.send(MountedPath::folder("/home/me/data"));

        let paths = mounted.paths.wait_until(|paths| paths.len() == 4).await;
        assert_eq!(paths[0], MountedPath::file("/lab/config.py"));
        assert_eq!(paths[3].base_name(), "data");

        // Same book again keeps user mounts; a new one resets them.
        mounted.paths_book_received_relay.send(book("/lab/config.py"));
        mounted.path_unmounted_relay.send("/lab/system".to_string());
        mounted.paths.wait_until(|paths| paths.len() == 3).await;
        mounted.paths_book_received_relay.send(book("/lab/other.py"));
        let reset = mounted
            .paths
            .wait_until(|paths| paths.first().map(|first| first.path.as_str()) == Some("/lab/other.py"))
            .await;
        assert_eq!(reset.len(), 3);
        assert!(!mounted.contains("/home/me/data"));
    }

    #[test]
    fn files_get_prefixed_ids() {
        let file = MountedPath::file("/lab/config.py");
        assert!(mounted_id(&file).starts_with("file_"));
        assert_eq!(mounted_nav(&MountedPath::folder("")), "/mounted/");
    }
}
