//! End-to-end behavior of the watch loop: detection, replacement, shutdown

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use pdfdog::viewer::ViewerCommand;
use pdfdog::watch::{LoopExit, LoopState, StepOutcome, WatchLoop};
use pdfdog::WatchError;

use super::helpers::{pid_alive, wait_for, WatchFixture};

const WAIT: Duration = Duration::from_secs(10);

#[test]
fn test_file_appearing_later_launches_once() {
    let fx = WatchFixture::new();
    let mut watch = WatchLoop::new(&fx.config(), fx.viewer());

    for _ in 0..5 {
        assert_eq!(watch.step().unwrap(), StepOutcome::Unchanged);
    }

    fx.write(b"%PDF-1.4 created", SystemTime::now());
    let StepOutcome::Relaunched { pid, copy } = watch.step().unwrap() else {
        panic!("expected the new file to be shown");
    };

    for _ in 0..5 {
        assert_eq!(watch.step().unwrap(), StepOutcome::Unchanged);
    }

    assert!(pid_alive(pid));
    assert!(wait_for(WAIT, || fx.launched() == vec![copy.clone()]));
    assert_eq!(fx.copies_on_disk(), vec![copy]);
}

#[test]
fn test_every_change_keeps_a_single_pair() {
    let fx = WatchFixture::new();
    let t0 = SystemTime::now() - Duration::from_secs(600);
    let mut watch = WatchLoop::new(&fx.config(), fx.viewer());
    let mut previous: Option<u32> = None;

    for i in 0..5u64 {
        let content = format!("revision {i}");
        fx.write(content.as_bytes(), t0 + Duration::from_secs(i));

        let StepOutcome::Relaunched { pid, copy } = watch.step().unwrap() else {
            panic!("revision {i} was not detected");
        };

        assert_eq!(std::fs::read(&copy).unwrap(), content.as_bytes());
        assert_eq!(fx.copies_on_disk(), vec![copy]);
        assert!(pid_alive(pid));
        if let Some(old) = previous {
            assert!(!pid_alive(old), "viewer {old} outlived its replacement");
        }
        previous = Some(pid);
    }
}

#[test]
fn test_rapid_writes_settle_on_last_version() {
    let fx = WatchFixture::new();
    let t0 = SystemTime::now() - Duration::from_secs(600);
    fx.write(b"one", t0);
    let mut watch = WatchLoop::new(&fx.config(), fx.viewer());

    let StepOutcome::Relaunched { pid: first_pid, copy: first_copy } = watch.step().unwrap()
    else {
        panic!("expected first launch");
    };

    // Two writes land before the loop polls again
    fx.write(b"two", t0 + Duration::from_secs(1));
    fx.write(b"three", t0 + Duration::from_secs(2));

    let StepOutcome::Relaunched { pid, copy } = watch.step().unwrap() else {
        panic!("expected relaunch");
    };
    assert_eq!(watch.step().unwrap(), StepOutcome::Unchanged);

    assert!(!pid_alive(first_pid));
    assert!(!first_copy.exists());
    assert!(pid_alive(pid));
    assert_eq!(std::fs::read(&copy).unwrap(), b"three");
    assert_eq!(fx.copies_on_disk(), vec![copy]);
}

#[test]
fn test_interrupt_retires_pair_and_exits_cleanly() {
    let fx = WatchFixture::new();
    fx.write(b"%PDF-1.4", SystemTime::now());

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let config = fx.config();
    let viewer = fx.viewer();

    let handle = thread::spawn(move || {
        let mut watch = WatchLoop::new(&config, viewer);
        watch.run(&flag)
    });

    assert!(wait_for(WAIT, || fx.launched().len() == 1));
    assert_eq!(fx.copies_on_disk().len(), 1);

    running.store(false, Ordering::SeqCst);
    let exit = handle.join().expect("watch thread panicked").unwrap();

    assert_eq!(exit, LoopExit::Interrupted);
    assert!(fx.copies_on_disk().is_empty());
}

#[test]
fn test_copy_failure_exits_without_launching() {
    let fx = WatchFixture::new();
    fx.write(b"%PDF-1.4", SystemTime::now());

    let mut config = fx.config();
    config.temp_dir = Some(fx.temp.path().join("vanished"));
    let running = AtomicBool::new(true);
    let mut watch = WatchLoop::new(&config, fx.viewer());

    let err = watch.run(&running).unwrap_err();
    assert!(matches!(err, WatchError::Io { .. }));
    assert!(watch.viewer_pid().is_none());

    thread::sleep(Duration::from_millis(100));
    assert!(fx.launched().is_empty());
}

/// Regular file that cannot be opened for reading, even by root
#[cfg(target_os = "linux")]
const UNREADABLE_FILE: &str = "/proc/sys/vm/drop_caches";

#[test]
#[cfg(target_os = "linux")]
fn test_copy_failure_after_launch_retires_previous_pair() {
    if std::fs::File::open(UNREADABLE_FILE).is_ok() {
        eprintln!("skipping: {UNREADABLE_FILE} is readable here");
        return;
    }

    let fx = WatchFixture::new();
    fx.write(b"%PDF-1.4 first", SystemTime::UNIX_EPOCH + Duration::from_secs(1));
    let mut watch = WatchLoop::new(&fx.config(), fx.viewer());

    let StepOutcome::Relaunched { pid, copy } = watch.step().unwrap() else {
        panic!("expected first launch");
    };
    assert!(wait_for(WAIT, || fx.launched().len() == 1));

    // Newer mtime than the first version, but the next copy cannot read it
    std::fs::remove_file(&fx.watched).unwrap();
    std::os::unix::fs::symlink(UNREADABLE_FILE, &fx.watched).unwrap();

    let running = AtomicBool::new(true);
    let err = watch.run(&running).unwrap_err();

    assert!(matches!(err, WatchError::Io { .. }), "unexpected error: {err:?}");
    assert_eq!(watch.state(), LoopState::Failed);
    assert!(!copy.exists());
    assert!(!pid_alive(pid));
    assert!(watch.viewer_pid().is_none());
    assert!(fx.copies_on_disk().is_empty());

    thread::sleep(Duration::from_millis(100));
    assert_eq!(fx.launched(), vec![copy]);
}

#[test]
fn test_viewer_closed_by_user_is_replaced() {
    let fx = WatchFixture::new();
    let t0 = SystemTime::now() - Duration::from_secs(60);
    fx.write(b"one", t0);

    let viewer = ViewerCommand::new("sh").with_args(["-c", "exit 0", "viewer"]);
    let mut watch = WatchLoop::new(&fx.config(), viewer);

    let StepOutcome::Relaunched { copy: first, .. } = watch.step().unwrap() else {
        panic!("expected first launch");
    };
    thread::sleep(Duration::from_millis(100));

    fx.write(b"two", t0 + Duration::from_secs(1));
    let StepOutcome::Relaunched { copy, .. } = watch.step().unwrap() else {
        panic!("expected relaunch");
    };

    assert!(!first.exists());
    assert_eq!(std::fs::read(&copy).unwrap(), b"two");
    assert_eq!(fx.copies_on_disk(), vec![copy]);

    watch.retire().unwrap();
    assert!(fx.copies_on_disk().is_empty());
}
