//! Artifact cache behavior observed through factories: staleness, reload and
//! concurrent first requests.

mod support;

use std::fs::{File, OpenOptions};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, SystemTime};

use stencil::{DirectorySource, FamilyConfig, MemorySource, TemplateFactory, TemplateSource};
use support::init_tracing;

fn txt_factory(source: Arc<dyn TemplateSource>) -> TemplateFactory {
    TemplateFactory::new(FamilyConfig::new("txt", ".txt"), source).unwrap()
}

fn bump_mtime(file: &File, seconds: u64) {
    file.set_modified(SystemTime::now() + Duration::from_secs(seconds))
        .unwrap();
}

#[test]
fn test_touched_file_is_recompiled() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    std::fs::write(&path, "v1 {{v x/}}").unwrap();
    let factory = txt_factory(Arc::new(DirectorySource::new([dir.path()])));

    let mut before = factory.get("note").unwrap();
    std::fs::write(&path, "v2 {{v x/}}").unwrap();
    bump_mtime(&OpenOptions::new().write(true).open(&path).unwrap(), 60);

    let mut after = factory.get("note").unwrap();
    assert_eq!(factory.loader().compilation_count(), 2);
    assert!(after.generation() > before.generation());

    before.set_value("x", "a").unwrap();
    after.set_value("x", "a").unwrap();
    assert_eq!(before.get_content().unwrap(), "v1 a");
    assert_eq!(after.get_content().unwrap(), "v2 a");
}

#[test]
fn test_touched_file_is_ignored_without_auto_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    std::fs::write(&path, "v1").unwrap();
    let factory = txt_factory(Arc::new(DirectorySource::new([dir.path()]))).with_auto_reload(false);

    factory.get("note").unwrap();
    std::fs::write(&path, "v2").unwrap();
    bump_mtime(&OpenOptions::new().write(true).open(&path).unwrap(), 60);

    let mut template = factory.get("note").unwrap();
    assert_eq!(template.get_content().unwrap(), "v1");
    assert_eq!(factory.loader().compilation_count(), 1);
}

#[test]
fn test_included_file_change_recompiles_includer() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("parts")).unwrap();
    let footer = dir.path().join("parts").join("footer.txt");
    std::fs::write(&footer, "-- old").unwrap();
    std::fs::write(dir.path().join("mail.txt"), "body\n{{i parts.footer/}}").unwrap();
    let factory = txt_factory(Arc::new(DirectorySource::new([dir.path()])));

    assert_eq!(factory.get("mail").unwrap().get_content().unwrap(), "body\n-- old");

    std::fs::write(&footer, "-- new").unwrap();
    bump_mtime(&OpenOptions::new().write(true).open(&footer).unwrap(), 60);
    assert_eq!(factory.get("mail").unwrap().get_content().unwrap(), "body\n-- new");
}

#[test]
fn test_broken_edit_keeps_serving_previous_artifact() {
    let source = Arc::new(MemorySource::new());
    let t0 = chrono::Utc::now();
    source.insert_with_modified("page", ".txt", "ok", t0);
    let factory = txt_factory(Arc::clone(&source) as Arc<dyn TemplateSource>);
    let mut running = factory.get("page").unwrap();

    source.insert_with_modified("page", ".txt", "{{v unclosed}}", t0 + chrono::Duration::seconds(5));
    assert!(factory.get("page").is_err());
    assert_eq!(running.get_content().unwrap(), "ok");

    source.insert_with_modified("page", ".txt", "fixed", t0 + chrono::Duration::seconds(10));
    assert_eq!(factory.get("page").unwrap().get_content().unwrap(), "fixed");
}

#[test]
fn test_concurrent_requests_compile_once() {
    let source = Arc::new(MemorySource::new());
    for name in ["alpha", "beta"] {
        source.insert(name, ".txt", format!("{name}: {{{{v n/}}}}"));
    }
    let factory = Arc::new(txt_factory(source));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let factory = Arc::clone(&factory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let name = if i % 2 == 0 { "alpha" } else { "beta" };
                barrier.wait();
                let mut template = factory.get(name).unwrap();
                template.set_value("n", i.to_string()).unwrap();
                (name, template.generation(), template.get_content().unwrap())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(factory.loader().compilation_count(), 2);
    for (name, generation, content) in &results {
        assert!(content.starts_with(&format!("{name}: ")));
        let same_name = results.iter().filter(|(n, _, _)| n == name);
        assert!(same_name.into_iter().all(|(_, g, _)| g == generation));
    }
}

#[test]
fn test_persisted_artifacts_survive_new_factory() {
    let templates = tempfile::tempdir().unwrap();
    let generated = tempfile::tempdir().unwrap();
    std::fs::write(templates.path().join("cached.txt"), "hello {{v who/}}").unwrap();
    let source: Arc<dyn TemplateSource> = Arc::new(DirectorySource::new([templates.path()]));

    let first = txt_factory(Arc::clone(&source)).with_persistence(generated.path());
    first.get("cached").unwrap();
    assert_eq!(first.loader().compilation_count(), 1);

    let second = txt_factory(source).with_persistence(generated.path());
    let mut template = second.get("cached").unwrap();
    template.set_value("who", "again").unwrap();
    assert_eq!(template.get_content().unwrap(), "hello again");
    assert_eq!(second.loader().compilation_count(), 0);
}
