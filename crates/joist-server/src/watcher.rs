//! File watching for the dev loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Which watch binding a changed path belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// An HTML page changed; re-run the html copy task
    Html(PathBuf),

    /// A static asset changed; re-run the assets copy task
    Assets(PathBuf),

    /// A stylesheet (entry or partial) changed; re-run the css task
    Styles(PathBuf),

    /// A file in the output tree changed; reload the browser
    Output(PathBuf),
}

/// Directories the classifier needs to tell bindings apart.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub source_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl WatchPaths {
    /// Canonicalized copy, so classification matches the absolute paths that
    /// notify reports. Roots that do not exist yet are kept as given.
    fn canonicalized(&self) -> Self {
        let canon = |p: &PathBuf| p.canonicalize().unwrap_or_else(|_| p.clone());
        Self {
            source_dir: canon(&self.source_dir),
            assets_dir: canon(&self.assets_dir),
            output_dir: canon(&self.output_dir),
        }
    }
}

/// File watcher for detecting source and output changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch the source and output roots recursively.
    ///
    /// Returns the watcher and a channel of classified events. Events are
    /// debounced per path, so an editor's double-write collapses into one
    /// event while a source change and the output write it causes both get
    /// through.
    pub fn new(
        paths: &WatchPaths,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        // Create the watcher
        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for root in [&paths.source_dir, &paths.output_dir] {
            if root.exists() {
                watcher
                    .watch(root, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        // Spawn a thread to classify and forward events
        let roots = paths.canonicalized();
        std::thread::spawn(move || {
            let debounce = Duration::from_millis(100);
            let mut last_seen: HashMap<PathBuf, Instant> = HashMap::new();

            while let Ok(event) = sync_rx.recv() {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }

                for path in event.paths {
                    let now = Instant::now();
                    if let Some(seen) = last_seen.get(&path) {
                        if now.duration_since(*seen) < debounce {
                            continue;
                        }
                    }
                    last_seen.insert(path.clone(), now);

                    if let Some(e) = classify(&path, &roots) {
                        let _ = async_tx.blocking_send(e);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Map a changed path to its watch binding.
///
/// Output is checked first: anything written into the output tree means a
/// content task already ran, so the browser just reloads. Assets are matched
/// before the extension checks because an asset directory may itself contain
/// html files that belong to the assets task, not the page copier.
pub fn classify(path: &Path, roots: &WatchPaths) -> Option<WatchEvent> {
    if path.starts_with(&roots.output_dir) {
        return Some(WatchEvent::Output(path.to_path_buf()));
    }
    if path.starts_with(&roots.assets_dir) {
        return Some(WatchEvent::Assets(path.to_path_buf()));
    }
    if path.starts_with(&roots.source_dir) {
        return match path.extension().and_then(|e| e.to_str()) {
            Some("html") => Some(WatchEvent::Html(path.to_path_buf())),
            Some("scss") | Some("sass") => Some(WatchEvent::Styles(path.to_path_buf())),
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn roots() -> WatchPaths {
        WatchPaths {
            source_dir: PathBuf::from("/site/src"),
            assets_dir: PathBuf::from("/site/src/assets"),
            output_dir: PathBuf::from("/site/build"),
        }
    }

    #[test]
    fn classifies_pages_styles_and_assets() {
        let roots = roots();

        assert_eq!(
            classify(Path::new("/site/src/pages/about.html"), &roots),
            Some(WatchEvent::Html(
                "/site/src/pages/about.html".into()
            ))
        );
        assert_eq!(
            classify(Path::new("/site/src/sass/_buttons.scss"), &roots),
            Some(WatchEvent::Styles(
                "/site/src/sass/_buttons.scss".into()
            ))
        );
        assert_eq!(
            classify(Path::new("/site/src/assets/logo.svg"), &roots),
            Some(WatchEvent::Assets("/site/src/assets/logo.svg".into()))
        );
    }

    #[test]
    fn html_inside_assets_belongs_to_the_assets_task() {
        let event = classify(Path::new("/site/src/assets/embed/frame.html"), &roots());

        assert_eq!(
            event,
            Some(WatchEvent::Assets(
                "/site/src/assets/embed/frame.html".into()
            ))
        );
    }

    #[test]
    fn anything_under_output_triggers_reload() {
        let event = classify(Path::new("/site/build/css/materialize.css"), &roots());

        assert_eq!(
            event,
            Some(WatchEvent::Output("/site/build/css/materialize.css".into()))
        );
    }

    #[test]
    fn unrelated_source_files_are_ignored() {
        assert_eq!(classify(Path::new("/site/src/notes.txt"), &roots()), None);
        assert_eq!(classify(Path::new("/elsewhere/index.html"), &roots()), None);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("pages")).unwrap();

        let paths = WatchPaths {
            source_dir: src.clone(),
            assets_dir: src.join("assets"),
            output_dir: temp.path().join("build"),
        };

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(&paths).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(src.join("pages/new.html"), "<html></html>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        match event.unwrap() {
            Some(WatchEvent::Html(path)) => {
                assert!(path.ends_with("pages/new.html"));
            }
            other => panic!("expected an Html event, got {other:?}"),
        }
    }
}
