//! Filesystem watcher that requests reloads when resource files change.
//!
//! Events are filtered down to resource files (already loaded, or new files
//! matching a scan pattern) and to directories appearing or vanishing on the
//! way to a scan root, then forwarded as reload triggers on a bounded
//! channel. A full channel means a reload is already pending, so the trigger
//! is dropped.
//!
//! Scan roots that do not exist yet are watched through their nearest
//! existing parent and armed recursively once a reload finds them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use crate::backend::{LoadOutcome, Scan};
use crate::error::Result;
use crate::template::CaptureRegex;

/// Paths and patterns that count as resource files.
#[derive(Debug, Default)]
pub struct WatchSet {
    files: HashSet<PathBuf>,
    patterns: Vec<CaptureRegex>,
    roots: Vec<PathBuf>,
}

fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

impl WatchSet {
    pub fn from_outcome(outcome: &LoadOutcome) -> Self {
        Self {
            files: outcome.files.iter().map(|f| f.filename.clone()).collect(),
            patterns: outcome.scans.iter().map(|s| s.pattern.clone()).collect(),
            roots: outcome.scans.iter().map(|s| s.root.clone()).collect(),
        }
    }

    /// True for a loaded file or any path a scan pattern would pick up.
    pub fn is_relevant(&self, path: &Path) -> bool {
        // editor swap files and other dotfiles
        if is_dotfile(path) {
            return false;
        }
        self.files.contains(path) || self.patterns.iter().any(|p| p.is_match(path))
    }

    /// True for a directory inside a scan root or on the path leading to one.
    pub fn is_relevant_dir(&self, path: &Path) -> bool {
        if is_dotfile(path) {
            return false;
        }
        self.roots
            .iter()
            .any(|root| path.starts_with(root) || root.starts_with(path))
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// Whether `path` in an event of `kind` names a directory that appeared,
/// vanished or was renamed.
fn is_dir_change(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_)) => path.is_dir(),
        _ => false,
    }
}

fn send_trigger(trigger: &Sender<PathBuf>, path: PathBuf) {
    match trigger.try_send(path) {
        Ok(()) => {}
        Err(TrySendError::Full(path)) => {
            debug!(path = %path.display(), "reload already pending, coalescing");
        }
        Err(TrySendError::Closed(_)) => {
            debug!("reload receiver dropped, ignoring change");
        }
    }
}

/// Handle a single filesystem event from the notify watcher.
pub(crate) fn handle_fs_event(event: &Event, watch_set: &RwLock<WatchSet>, trigger: &Sender<PathBuf>) {
    if !is_change(&event.kind) {
        return;
    }

    let relevant = {
        let Ok(guard) = watch_set.read() else {
            warn!("watch set lock poisoned, ignoring event");
            return;
        };
        event
            .paths
            .iter()
            .find(|p| {
                guard.is_relevant(p) || (is_dir_change(&event.kind, p) && guard.is_relevant_dir(p))
            })
            .cloned()
    };

    let Some(path) = relevant else {
        return;
    };

    info!(path = %path.display(), "resource path changed");
    send_trigger(trigger, path);
}

/// Directories currently registered with the notify watcher.
struct Watches {
    watcher: RecommendedWatcher,
    /// Scan roots watched recursively.
    roots: Vec<PathBuf>,
    /// Nearest existing parents of missing scan roots, watched non-recursively.
    parents: Vec<PathBuf>,
}

impl Watches {
    /// Register every scan root that exists, and a stand-in parent for each
    /// one that does not. Returns true when a new watch was added.
    fn arm(&mut self, scans: &[Scan]) -> Result<bool> {
        let mut added = false;
        for scan in scans {
            let root = &scan.root;
            if self.roots.contains(root) {
                continue;
            }
            if root.is_dir() {
                self.watcher.watch(root, RecursiveMode::Recursive)?;
                info!(path = %root.display(), "watching resource directory for changes (recursive)");
                self.roots.push(root.clone());
                added = true;
                continue;
            }

            let Some(parent) = root.ancestors().skip(1).find(|p| p.is_dir()) else {
                debug!(root = %root.display(), "resource root has no existing parent, not watched");
                continue;
            };
            if self.parents.iter().any(|p| p == parent) {
                continue;
            }
            self.watcher.watch(parent, RecursiveMode::NonRecursive)?;
            info!(
                root = %root.display(),
                path = %parent.display(),
                "resource root missing, watching nearest existing parent"
            );
            self.parents.push(parent.to_path_buf());
            added = true;
        }
        Ok(added)
    }

    fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.parents.is_empty()
    }
}

/// Live-reload watcher over every scan root.
///
/// Dropping it stops watching.
pub struct ReloadWatcher {
    watch_set: Arc<RwLock<WatchSet>>,
    watches: Mutex<Watches>,
    trigger: Sender<PathBuf>,
}

impl ReloadWatcher {
    /// Start watching the scan roots of `outcome`, sending a path on `trigger`
    /// whenever a resource file changes.
    ///
    /// Setup errors are returned as-is. Having nothing at all to watch is an
    /// error too.
    pub fn start(outcome: &LoadOutcome, trigger: Sender<PathBuf>) -> Result<Self> {
        let watch_set = Arc::new(RwLock::new(WatchSet::from_outcome(outcome)));

        let handler_set = Arc::clone(&watch_set);
        let handler_trigger = trigger.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &handler_set, &handler_trigger),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        let mut watches = Watches {
            watcher,
            roots: Vec::new(),
            parents: Vec::new(),
        };
        watches.arm(&outcome.scans)?;
        if watches.is_empty() {
            return Err(notify::Error::generic("no existing directory to watch for resource changes").into());
        }

        Ok(Self {
            watch_set,
            watches: Mutex::new(watches),
            trigger,
        })
    }

    /// Refresh the known file set after a reload and arm scan roots that
    /// have appeared since.
    ///
    /// Arming a new directory queues one more reload, so files written
    /// before the watch took effect are still picked up.
    pub fn update(&self, outcome: &LoadOutcome) {
        match self.watch_set.write() {
            Ok(mut guard) => *guard = WatchSet::from_outcome(outcome),
            Err(_) => warn!("watch set lock poisoned, keeping previous file set"),
        }

        let Ok(mut watches) = self.watches.lock() else {
            warn!("watch list lock poisoned, not arming new directories");
            return;
        };
        match watches.arm(&outcome.scans) {
            Ok(true) => {
                if let Some(scan) = outcome.scans.first() {
                    debug!("new resource directory watched, rescanning");
                    send_trigger(&self.trigger, scan.root.clone());
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to watch new resource directory"),
        }
    }

    /// Scan roots currently watched recursively.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.watches
            .lock()
            .map(|w| w.roots.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, DataChange};
    use tokio::sync::mpsc;

    use super::*;
    use crate::template::PathTemplate;

    fn watch_set() -> RwLock<WatchSet> {
        let pattern = PathTemplate::parse("/res/{lang}/{namespace}.{ext}")
            .unwrap()
            .to_regex()
            .unwrap();
        RwLock::new(WatchSet {
            files: [PathBuf::from("/res/en/default.json")].into_iter().collect(),
            patterns: vec![pattern],
            roots: vec![PathBuf::from("/res")],
        })
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn relevant_paths_include_new_matching_files() {
        let set = watch_set();
        let set = set.read().unwrap();
        assert!(set.is_relevant(Path::new("/res/en/default.json")));
        assert!(set.is_relevant(Path::new("/res/fr/forms.yaml")));
        assert!(!set.is_relevant(Path::new("/res/fr/notes.txt")));
        assert!(!set.is_relevant(Path::new("/res/fr/.forms.yaml")));
    }

    #[test]
    fn change_events_trigger_and_coalesce() {
        let set = watch_set();
        let (tx, mut rx) = mpsc::channel(1);

        handle_fs_event(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/res/en/default.json"),
            &set,
            &tx,
        );
        handle_fs_event(
            &event(EventKind::Create(CreateKind::File), "/res/de/default.yml"),
            &set,
            &tx,
        );

        assert_eq!(rx.try_recv().unwrap(), PathBuf::from("/res/en/default.json"));
        assert!(rx.try_recv().is_err(), "second trigger should be coalesced");
    }

    #[test]
    fn access_and_irrelevant_events_are_ignored() {
        let set = watch_set();
        let (tx, mut rx) = mpsc::channel(1);

        handle_fs_event(
            &event(EventKind::Access(AccessKind::Any), "/res/en/default.json"),
            &set,
            &tx,
        );
        handle_fs_event(
            &event(EventKind::Create(CreateKind::File), "/elsewhere/en/default.json"),
            &set,
            &tx,
        );

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn new_directories_on_the_way_to_a_root_are_relevant() {
        let set = watch_set();
        let set = set.read().unwrap();
        assert!(set.is_relevant_dir(Path::new("/res/fr")));
        assert!(set.is_relevant_dir(Path::new("/res")));
        assert!(!set.is_relevant_dir(Path::new("/elsewhere/fr")));
        assert!(!set.is_relevant_dir(Path::new("/res/.git")));
    }

    #[test]
    fn new_language_directory_triggers_reload() {
        let set = watch_set();
        let (tx, mut rx) = mpsc::channel(1);

        handle_fs_event(&event(EventKind::Create(CreateKind::Folder), "/res/fr"), &set, &tx);
        assert_eq!(rx.try_recv().unwrap(), PathBuf::from("/res/fr"));

        handle_fs_event(&event(EventKind::Remove(RemoveKind::Folder), "/res/de"), &set, &tx);
        assert_eq!(rx.try_recv().unwrap(), PathBuf::from("/res/de"));

        handle_fs_event(&event(EventKind::Create(CreateKind::Folder), "/elsewhere/fr"), &set, &tx);
        assert!(rx.try_recv().is_err());
    }
}
