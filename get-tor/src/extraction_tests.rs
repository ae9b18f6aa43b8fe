//! Unit tests for native archive tool invocation.

use super::*;
use crate::distribution::{Distribution, SevenZipSelection};
use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, success_output};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Work {
    _temp: TempDir,
    dir: Utf8PathBuf,
}

#[fixture]
fn work() -> Work {
    let temp = tempfile::tempdir().expect("temp dir");
    let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    Work { _temp: temp, dir }
}

fn tarball() -> ArchiveFormat {
    Distribution::linux().format
}

/// Pretend to be `tar -xf <archive> -C <dir>` for the Linux layout.
fn fake_tar_unpack(args: &[&str]) {
    let dir = args.last().expect("tar called with -C <dir>");
    let root = Utf8Path::new(dir).join("tor-browser_en-US/Browser/TorBrowser/Tor");
    fs::create_dir_all(root).expect("create fake extraction");
}

fn tar_call(work: &Work, archive: &Utf8Path) -> ExpectedCall {
    ExpectedCall::new(
        "tar",
        &["-xf", archive.as_str(), "-C", work.dir.as_str()],
        Ok(success_output()),
    )
}

#[rstest]
fn tarball_root_is_inside_working_dir(work: Work) {
    let archive = work.dir.join("tor.tar.xz");
    let executor = StubExecutor::new(vec![tar_call(&work, &archive).with_effect(fake_tar_unpack)]);

    let extracted = extract(&executor, &tarball(), &archive, &work.dir).expect("extract");

    executor.assert_finished();
    assert_eq!(
        extracted.root,
        work.dir.join("tor-browser_en-US").join("Browser/TorBrowser")
    );
    assert_eq!(extracted.mounted_volume, None);
}

#[rstest]
fn tarball_extraction_clears_previous_unpack(work: Work) {
    let stale = work.dir.join("tor-browser_en-US").join("stale.txt");
    fs::create_dir_all(stale.parent().expect("parent")).expect("mkdir");
    fs::write(&stale, b"old").expect("write stale");

    let archive = work.dir.join("tor.tar.xz");
    let executor = StubExecutor::new(vec![tar_call(&work, &archive).with_effect(fake_tar_unpack)]);
    extract(&executor, &tarball(), &archive, &work.dir).expect("extract");

    assert!(!stale.exists());
}

#[rstest]
fn failing_tool_is_reported_immediately(work: Work) {
    let archive = work.dir.join("tor.tar.xz");
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "tar",
        &["-xf", archive.as_str(), "-C", work.dir.as_str()],
        Ok(failure_output("xz: (stdin): File format not recognized\n")),
    )]);

    let err = extract(&executor, &tarball(), &archive, &work.dir).expect_err("tar fails");

    match err {
        ExtractionError::ToolFailed { tool, code, stderr } => {
            assert_eq!(tool, "tar");
            assert_eq!(code, Some(1));
            assert_eq!(stderr, "xz: (stdin): File format not recognized");
        }
        other => panic!("expected ToolFailed, got {other:?}"),
    }
}

#[rstest]
fn tool_that_cannot_start_is_a_spawn_error(work: Work) {
    let archive = work.dir.join("tor.tar.xz");
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "tar",
        &["-xf", archive.as_str(), "-C", work.dir.as_str()],
        Err(io::Error::new(io::ErrorKind::NotFound, "tar not found")),
    )]);

    let err = extract(&executor, &tarball(), &archive, &work.dir).expect_err("spawn fails");
    assert!(matches!(err, ExtractionError::Spawn { tool: "tar", .. }));
}

#[rstest]
fn silent_tool_without_output_is_missing_root(work: Work) {
    let archive = work.dir.join("tor.tar.xz");
    let executor = StubExecutor::new(vec![tar_call(&work, &archive)]);

    let err = extract(&executor, &tarball(), &archive, &work.dir).expect_err("nothing unpacked");
    assert!(matches!(err, ExtractionError::MissingRoot { .. }));
}

#[rstest]
fn seven_zip_runs_one_flat_extraction_per_selection(work: Work) {
    const SELECTIONS: &[SevenZipSelection] = &[
        SevenZipSelection {
            pattern: "Browser\\TorBrowser\\Tor",
            output: "Tor",
        },
        SevenZipSelection {
            pattern: "Browser\\TorBrowser\\Data\\Tor\\geoip*",
            output: "Data",
        },
    ];
    let archive = work.dir.join("torbrowser-install.exe");
    let tor_flag = format!("-o{}", work.dir.join("Tor"));
    let data_flag = format!("-o{}", work.dir.join("Data"));
    let executor = StubExecutor::new(vec![
        ExpectedCall::new(
            "7z",
            &["e", "-y", archive.as_str(), "Browser\\TorBrowser\\Tor", &tor_flag],
            Ok(success_output()),
        ),
        ExpectedCall::new(
            "7z",
            &[
                "e",
                "-y",
                archive.as_str(),
                "Browser\\TorBrowser\\Data\\Tor\\geoip*",
                &data_flag,
            ],
            Ok(success_output()),
        ),
    ]);

    let format = ArchiveFormat::SevenZip {
        selections: SELECTIONS,
    };
    let extracted = extract(&executor, &format, &archive, &work.dir).expect("extract");

    executor.assert_finished();
    assert_eq!(extracted.root, work.dir);
}

#[rstest]
fn disk_image_is_attached_and_ejected(work: Work) {
    let volume = work.dir.join("Tor Browser");
    fs::create_dir_all(volume.join("Tor Browser.app/Contents")).expect("fake mount");
    let archive = work.dir.join("TorBrowser.dmg");
    let format = ArchiveFormat::DiskImage {
        volume: volume.clone(),
        contents: "Tor Browser.app/Contents",
    };
    let executor = StubExecutor::new(vec![
        ExpectedCall::new("hdiutil", &["attach", archive.as_str()], Ok(success_output())),
        ExpectedCall::new("diskutil", &["eject", volume.as_str()], Ok(success_output())),
    ]);

    let extracted = extract(&executor, &format, &archive, &work.dir).expect("attach");
    assert_eq!(extracted.root, volume.join("Tor Browser.app/Contents"));
    assert_eq!(extracted.mounted_volume.as_ref(), Some(&volume));

    release(&executor, &extracted).expect("eject");
    executor.assert_finished();
}

#[rstest]
fn release_without_mount_runs_nothing(work: Work) {
    let executor = StubExecutor::new(Vec::new());
    let extracted = ExtractedArchive {
        root: work.dir.clone(),
        mounted_volume: None,
    };
    release(&executor, &extracted).expect("nothing to release");
}

#[test]
fn tool_failed_message_mentions_status() {
    let err = ExtractionError::ToolFailed {
        tool: "7z",
        code: Some(2),
        stderr: "Fatal error".to_owned(),
    };
    assert_eq!(err.to_string(), "7z exited with status 2: Fatal error");

    let killed = ExtractionError::ToolFailed {
        tool: "tar",
        code: None,
        stderr: String::new(),
    };
    assert!(killed.to_string().contains("a signal"));
}
