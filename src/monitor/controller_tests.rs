//! Tests for the context monitor controller

use super::*;
use crate::test_utils::test_helpers::{ScriptedCapture, run_paused};
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(5);
const TIMEOUT: Duration = Duration::from_secs(10);

fn controller(capture: &ScriptedCapture) -> MonitorController<ScriptedCapture> {
    MonitorController::new(capture.clone(), INTERVAL, TIMEOUT)
}

#[test]
fn test_first_capture_waits_for_debounce() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);
        let mut rx = monitor.subscribe();
        let start = Instant::now();

        monitor.start().await;
        assert!(monitor.is_active());

        rx.recv().await.unwrap();
        assert!(start.elapsed() >= START_DEBOUNCE);
        assert!(start.elapsed() < INTERVAL);

        monitor.stop().await;
    });
}

#[test]
fn test_stacked_starts_run_one_loop() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);

        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        monitor.start().await;

        tokio::time::sleep(INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(capture.attempts(), 1);

        monitor.stop().await;
    });
}

#[test]
fn test_latest_start_controls_first_capture_time() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);
        let mut rx = monitor.subscribe();
        let begin = Instant::now();

        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        monitor.start().await;

        rx.recv().await.unwrap();
        assert!(begin.elapsed() >= Duration::from_millis(180));

        monitor.stop().await;
    });
}

#[test]
fn test_stop_before_debounce_prevents_capture() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);

        monitor.start().await;
        monitor.stop().await;
        tokio::time::sleep(INTERVAL * 2).await;

        assert_eq!(capture.attempts(), 0);
        assert!(!monitor.is_active());
    });
}

#[test]
fn test_stop_cancels_reschedule() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);
        let mut rx = monitor.subscribe();

        monitor.start().await;
        rx.recv().await.unwrap();
        monitor.stop().await;

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(capture.attempts(), 1);
        assert!(!monitor.is_active());
    });
}

#[test]
fn test_restart_uses_new_interval() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);
        let mut rx = monitor.subscribe();

        monitor.reconfigure(capture.clone(), Duration::from_secs(1), TIMEOUT);
        assert_eq!(monitor.interval(), Duration::from_secs(1));
        monitor.start().await;

        rx.recv().await.unwrap();
        let first = Instant::now();
        rx.recv().await.unwrap();
        assert!(first.elapsed() >= Duration::from_secs(1));
        assert!(first.elapsed() < INTERVAL);

        monitor.stop().await;
    });
}

#[test]
fn test_every_subscriber_sees_each_snapshot() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);
        let mut a = monitor.subscribe();
        let mut b = monitor.subscribe();

        monitor.start().await;

        assert_eq!(a.recv().await.unwrap(), b.recv().await.unwrap());

        monitor.stop().await;
    });
}

#[test]
fn test_stop_without_start_is_noop() {
    run_paused(async {
        let capture = ScriptedCapture::instant();
        let mut monitor = controller(&capture);

        monitor.stop().await;

        assert!(!monitor.is_active());
        assert_eq!(capture.attempts(), 0);
    });
}
