//! Integration tests for directory batches

mod common;

use common::{registry, write_docx};
use redact_core::RedactionLevel;
use redact_formats::{BatchDispatcher, ProgressCallback, ProgressEvent, OUTPUT_DIR_NAME};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[test]
fn test_failures_do_not_stop_the_batch() {
    let tmp = TempDir::new().expect("create temp dir");
    let dir = tmp.path();
    std::fs::write(dir.join("a_note.txt"), "Call Jane Doe").expect("write");
    std::fs::write(dir.join("b_broken.docx"), "not a zip").expect("write");
    write_docx(&dir.join("c_letter.docx"), "<w:p><w:r><w:t>From Jane</w:t></w:r></w:p>");
    std::fs::write(dir.join("d_latin1.txt"), [0xe9, 0xff]).expect("write");
    std::fs::write(dir.join("e_readme.md"), "Jane Doe").expect("write");

    let registry = registry();
    let report = BatchDispatcher::new(&registry)
        .run(dir, RedactionLevel::Basic, &AtomicBool::new(false))
        .expect("run batch");

    let out = dir.join(OUTPUT_DIR_NAME);
    assert_eq!(report.output_dir, out);
    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.skipped_cancelled, 0);

    assert_eq!(report.succeeded[0].input_path, dir.join("a_note.txt"));
    assert_eq!(report.succeeded[0].output_path, out.join("redacted_a_note.txt"));
    assert_eq!(
        std::fs::read_to_string(out.join("redacted_a_note.txt")).expect("read output"),
        "Call [REDACTED]"
    );
    assert!(out.join("redacted_c_letter.docx").exists());

    assert_eq!(report.failed[0].path, dir.join("b_broken.docx"));
    assert!(report.failed[0].reason.starts_with("corrupt container"));
    assert_eq!(report.failed[1].path, dir.join("d_latin1.txt"));
    assert!(!out.join("redacted_b_broken.docx").exists());
    assert!(!out.join("redacted_d_latin1.txt").exists());
    assert!(!out.join("redacted_e_readme.md").exists());
}

#[test]
fn test_cancel_skips_remaining_files() {
    let tmp = TempDir::new().expect("create temp dir");
    let dir = tmp.path();
    for name in ["1.txt", "2.txt", "3.txt", "4.txt"] {
        std::fs::write(dir.join(name), "Jane").expect("write");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
    let callback: ProgressCallback = {
        let cancel = Arc::clone(&cancel);
        let seen = Arc::clone(&seen);
        Arc::new(move |event: &ProgressEvent| {
            if let ProgressEvent::File { index, .. } = event {
                seen.lock().expect("seen lock poisoned").push(*index);
                if *index == 2 {
                    cancel.store(true, Ordering::SeqCst);
                }
            }
        })
    };

    let registry = registry();
    let report = BatchDispatcher::new(&registry)
        .with_progress(callback)
        .run(dir, RedactionLevel::Basic, &cancel)
        .expect("run batch");

    // The file in flight when cancel is set still completes
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.skipped_cancelled, 2);
    assert_eq!(report.total(), 4);
    assert_eq!(*seen.lock().expect("seen lock poisoned"), vec![1, 2]);
    assert!(!dir.join(OUTPUT_DIR_NAME).join("redacted_3.txt").exists());
}

#[test]
fn test_empty_directory_and_rerun() {
    let tmp = TempDir::new().expect("create temp dir");
    let registry = registry();
    let dispatcher = BatchDispatcher::new(&registry);

    let report = dispatcher
        .run(tmp.path(), RedactionLevel::Advanced, &AtomicBool::new(false))
        .expect("run batch");
    assert_eq!(report.total(), 0);
    assert!(tmp.path().join(OUTPUT_DIR_NAME).is_dir());

    // Outputs live in a subdirectory and are not picked up again
    std::fs::write(tmp.path().join("x.txt"), "Jane").expect("write");
    dispatcher
        .run(tmp.path(), RedactionLevel::Advanced, &AtomicBool::new(false))
        .expect("first run");
    let report = dispatcher
        .run(tmp.path(), RedactionLevel::Advanced, &AtomicBool::new(false))
        .expect("second run");
    assert_eq!(report.total(), 1);
}

#[test]
fn test_file_as_directory_is_rejected() {
    let tmp = TempDir::new().expect("create temp dir");
    let file = tmp.path().join("plain.txt");
    std::fs::write(&file, "Jane").expect("write");

    let registry = registry();
    let err = BatchDispatcher::new(&registry)
        .run(&file, RedactionLevel::Basic, &AtomicBool::new(false))
        .expect_err("not a directory");
    assert_eq!(err.code(), "VALIDATION_ERROR");
}
