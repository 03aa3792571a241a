use halo_platform::{FileStore, NamespacedStore, PlatformError, PreferenceStore};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = FileStore::open(&path);
        store.set("halo.app_theme", "light").unwrap();
        store.set("halo.app_theme", "dark").unwrap();
    }

    let reopened = FileStore::open(&path);
    assert_eq!(
        reopened.get("halo.app_theme").unwrap().as_deref(),
        Some("dark")
    );
}

#[test]
fn write_leaves_no_temporary_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prefs.json");

    let store = FileStore::open(&path);
    store.set("k", "v").unwrap();

    let names: Vec<String> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["prefs.json".to_string()]);
}

#[test]
fn corrupt_file_reads_as_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, b"{ not json").unwrap();

    let store = FileStore::open(&path);
    assert_eq!(store.get("k").unwrap(), None);

    store.set("k", "v").unwrap();
    assert_eq!(FileStore::open(&path).get("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn quota_failure_keeps_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let store = FileStore::open(&path).with_quota(16);
    store.set("theme", "dark").unwrap();

    let err = store.set("theme", "a-very-long-theme-name").unwrap_err();
    assert!(matches!(err, PlatformError::QuotaExceeded { .. }));
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    assert_eq!(
        FileStore::open(&path).get("theme").unwrap().as_deref(),
        Some("dark")
    );
}

#[test]
fn namespaced_file_store_removes_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let store = NamespacedStore::new(FileStore::open(&path), "halo");
    store.set("app_theme", "light").unwrap();
    store.remove("app_theme").unwrap();
    store.remove("app_theme").unwrap();

    assert_eq!(FileStore::open(&path).get("halo.app_theme").unwrap(), None);
}

#[test]
fn concurrent_writers_keep_every_key() {
    use std::sync::Arc;
    use std::thread;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    for round in 0..10 {
        let store = Arc::new(FileStore::open(&path));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.set(&format!("k{i}"), &format!("r{round}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let reopened = FileStore::open(&path);
        for i in 0..8 {
            assert_eq!(
                reopened.get(&format!("k{i}")).unwrap(),
                Some(format!("r{round}"))
            );
        }
    }
}
