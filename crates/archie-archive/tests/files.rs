mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use archie_archive::{ArchiveFormat, Error, Matcher, Registry, RewriteOptions, rewriter_for};
use archie_verify::Sidecars;
use common::*;

fn stage(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn unsupported_suffix_is_rejected_before_io() {
    let registry = Arc::new(Registry::builder().build().unwrap());
    let err = rewriter_for(Path::new("/does/not/exist/archive.tgz"), registry).unwrap_err();
    assert!(matches!(err, Error::UnsupportedContainerType { ref filename } if filename == "archive.tgz"));
}

#[test]
fn rewrite_file_picks_format_from_name() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "app.war", ARCHIVE_JAR);
    let dest = dir.path().join("out.war");

    let registry = Arc::new(
        Registry::builder()
            .append(Matcher::suffix(".class"), "+")
            .build()
            .unwrap(),
    );
    let rewriter = rewriter_for(&src, registry).unwrap();
    assert_eq!(rewriter.format(), ArchiveFormat::Jar);

    let report = rewriter.rewrite_file(&src, &dest).unwrap();
    assert_eq!(report.entries_written, zip_names(ARCHIVE_JAR).len());

    let out = fs::read(&dest).unwrap();
    assert_eq!(
        zip_content(&out, "com/example/Green.class").unwrap(),
        b"\xca\xfe\xba\xbe green+"
    );
}

#[test]
fn missing_source_is_a_read_failure_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("missing.zip");
    let registry = Arc::new(Registry::builder().build().unwrap());

    let err = rewriter_for(&src, registry)
        .unwrap()
        .rewrite_file(&src, &dir.path().join("out.zip"))
        .unwrap_err();
    match err {
        Error::ReadFailed { path, .. } => assert!(path.ends_with("missing.zip")),
        other => panic!("expected ReadFailed, got {other:?}"),
    }
}

#[test]
fn pdf_passes_through_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "document.pdf", DOCUMENT_PDF);
    let dest = dir.path().join("copy.pdf");

    let registry = Arc::new(
        Registry::builder()
            .replace(Matcher::Any, "ignored")
            .before(|out| out.add_file("ignored", b""))
            .build()
            .unwrap(),
    );
    let (report, digests) = rewriter_for(&src, registry)
        .unwrap()
        .rewrite_file_with_sidecars(&src, &dest)
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), DOCUMENT_PDF);
    assert_eq!(report.bytes_out, DOCUMENT_PDF.len() as u64);
    assert_eq!(digests.bytes, DOCUMENT_PDF.len() as u64);
    Sidecars::new(&dest).verify().unwrap();
}

#[test]
fn tar_gz_sidecars_are_written_while_streaming() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "archive.tar.gz", ARCHIVE_TAR_GZ);
    let dest = dir.path().join("rewritten.tar.gz");

    let registry = Arc::new(Registry::builder().add("README.txt", "hi").build().unwrap());
    let (_, digests) = rewriter_for(&src, registry)
        .unwrap()
        .rewrite_file_with_sidecars(&src, &dest)
        .unwrap();

    let sidecars = Sidecars::new(&dest);
    sidecars.verify().unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("rewritten.tar.gz.sha256")).unwrap(),
        digests.sha256
    );
    assert_eq!(tar_names(&fs::read(&dest).unwrap()).last().unwrap(), "README.txt");
}

#[test]
fn zip_sidecars_are_generated_after_writing() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "archive.zip", ARCHIVE_ZIP);
    let dest = dir.path().join("rewritten.zip");
    fs::write(dir.path().join("rewritten.zip.md5"), "stale").unwrap();

    let registry = Arc::new(Registry::builder().build().unwrap());
    rewriter_for(&src, registry)
        .unwrap()
        .rewrite_file_with_sidecars(&src, &dest)
        .unwrap();

    Sidecars::new(&dest).verify().unwrap();
}

#[test]
fn failed_stream_rewrite_leaves_no_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "broken.tar.gz", b"this is not gzip");
    let dest = dir.path().join("out.tar.gz");

    let registry = Arc::new(Registry::builder().build().unwrap());
    let err = rewriter_for(&src, registry)
        .unwrap()
        .rewrite_file_with_sidecars(&src, &dest)
        .unwrap_err();
    assert!(matches!(err, Error::ReadFailed { .. }));
    assert!(!dir.path().join("out.tar.gz.sha1").exists());
}

#[test]
fn progress_reports_each_written_entry() {
    let dir = tempfile::tempdir().unwrap();
    let src = stage(dir.path(), "colors.jar", COLORS_JAR);
    let dest = dir.path().join("out.jar");

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let options = RewriteOptions::default().on_progress(Arc::new(move |p| {
        seen.fetch_add(1, Ordering::SeqCst);
        assert!(p.current_entry.is_some());
    }));

    let registry = Arc::new(Registry::builder().skip("red.txt").build().unwrap());
    rewriter_for(&src, registry)
        .unwrap()
        .with_options(options)
        .rewrite_file(&src, &dest)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn one_registry_serves_many_threads() {
    let registry = Arc::new(
        Registry::builder()
            .append(Matcher::suffix(".txt"), "!")
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let rewriter = archie_archive::Rewriter::new(ArchiveFormat::Jar, registry.clone());
            std::thread::spawn(move || rewriter.rewrite_bytes(COLORS_JAR).unwrap())
        })
        .collect();
    for handle in handles {
        let out = handle.join().unwrap();
        assert_eq!(zip_content(&out, "red.txt").unwrap(), b"red\n!");
    }
}
