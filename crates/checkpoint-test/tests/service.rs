//! Scan service driven from async tasks

use std::sync::Arc;
use std::time::Duration;

use checkpoint_core::{CheckpointError, Lane, ScanEvent, SlotIndex};
use checkpoint_runtime::{Checkpoint, CheckpointService, Peripherals};
use checkpoint_test::{simulation_config, simulation_epoch, RecordingOutput};
use checkpoint_time::{ClockSource, ManualClock, UnavailableClock};

fn checkpoint() -> (Checkpoint, ManualClock, RecordingOutput) {
    let clock = ManualClock::new(simulation_epoch());
    let output = RecordingOutput::new();
    let io = Peripherals {
        clock: Box::new(clock.clone()),
        presenter: Box::new(output.clone()),
        feedback: Box::new(output.clone()),
        diagnostics: Box::new(output.clone()),
    };
    let checkpoint = Checkpoint::new(simulation_config(), io).unwrap();
    (checkpoint, clock, output)
}

fn spawn(checkpoint: Checkpoint, clock: &ManualClock, refresh_every: Duration) -> CheckpointService {
    CheckpointService::spawn(checkpoint, Arc::new(clock.clone()), refresh_every)
}

#[tokio::test]
async fn test_service_tracks_occupancy() {
    let (checkpoint, clock, _output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_millis(10));

    service.scan(Lane::Entry, "5ADA9C80").await.unwrap();
    clock.advance_millis(2000);
    service.scan(Lane::Entry, "a3f2b71c").await.unwrap();

    let inside = service.occupancy().await.unwrap();
    assert_eq!(inside.len(), 2);
    assert_eq!(inside[0].name, "Alice");
    assert_eq!(inside[0].entered_at, simulation_epoch());
    assert_eq!(inside[1].name, "Bob");

    clock.advance_millis(2000);
    service.scan(Lane::Exit, "5ADA9C80").await.unwrap();
    let inside = service.occupancy().await.unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].name, "Bob");

    let checkpoint = service.shutdown().await.unwrap();
    assert_eq!(checkpoint.stats().entries, 2);
    assert_eq!(checkpoint.stats().exits, 1);
}

#[tokio::test]
async fn test_service_drops_scans_inside_window() {
    let (checkpoint, clock, _output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_millis(10));

    service.scan(Lane::Entry, "5ADA9C80").await.unwrap();
    clock.advance_millis(500);
    service.scan(Lane::Exit, "5ADA9C80").await.unwrap();

    // Commands are handled in order, so the reply follows both scans
    let inside = service.occupancy().await.unwrap();
    assert_eq!(inside.len(), 1);

    let checkpoint = service.shutdown().await.unwrap();
    assert_eq!(checkpoint.stats().scans_accepted, 1);
    assert_eq!(checkpoint.stats().scans_dropped, 1);
}

#[tokio::test]
async fn test_service_dump_log() {
    let (checkpoint, clock, output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_millis(10));

    service.scan(Lane::Exit, "0C41E9D2").await.unwrap();
    clock.advance_millis(1500);
    service.scan(Lane::Entry, "12345678").await.unwrap();

    let entries = service.dump_log().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "Invalid exit: Carol");
    assert_eq!(entries[1].message, "Unknown card at ENTRY: 12345678");

    let lines = output.lines();
    assert!(lines.iter().any(|l| l == "Event log: 2 retained, 2 total"));
    assert!(lines.iter().any(|l| l == "[2026-10-19 08:00:00] Invalid exit: Carol"));

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_senders_share_one_queue() {
    let (checkpoint, clock, _output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_millis(10));

    let sender = service.sender();
    let lane_task = tokio::spawn(async move { sender.scan(Lane::Entry, "0C41E9D2").await });
    lane_task.await.unwrap().unwrap();

    assert_eq!(service.occupancy().await.unwrap().len(), 1);

    let sender = service.sender();
    let checkpoint = service.shutdown().await.unwrap();
    assert_eq!(checkpoint.stats().entries, 1);

    clock.advance_millis(2000);
    assert_eq!(
        sender.scan(Lane::Exit, "0C41E9D2").await,
        Err(CheckpointError::QueueClosed)
    );
}

#[tokio::test]
async fn test_service_returns_to_ready_screen() {
    let (checkpoint, clock, output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_millis(5));

    service.scan(Lane::Entry, "A3F2B71C").await.unwrap();
    assert_eq!(service.occupancy().await.unwrap().len(), 1);
    assert_eq!(output.last_screen().unwrap().line1, "Hello Bob");

    clock.advance_millis(3000);
    let mut ready = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        if output.last_screen().is_some_and(|s| s.line1 == "Ready to scan") {
            ready = true;
            break;
        }
    }
    assert!(ready);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_queued_scans_keep_their_send_time() {
    let (checkpoint, clock, _output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_secs(60));

    // Nothing is handled until the consumer task gets to run, so all three
    // scans sit in the queue while the clock moves on
    service.scan(Lane::Entry, "5ADA9C80").await.unwrap();
    clock.advance_millis(1600);
    service.scan(Lane::Entry, "A3F2B71C").await.unwrap();
    clock.advance_millis(3000);
    service.scan(Lane::Exit, "5ADA9C80").await.unwrap();
    clock.advance_millis(60_000);

    let inside = service.occupancy().await.unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].name, "Bob");
    assert_eq!(inside[0].entered_at, simulation_epoch() + Duration::from_millis(1600));

    let checkpoint = service.shutdown().await.unwrap();
    assert_eq!(checkpoint.stats().scans_dropped, 0);
    assert_eq!(checkpoint.stats().exits, 1);
}

#[tokio::test]
async fn test_lane_stamped_event_is_used_as_is() {
    let (checkpoint, clock, output) = checkpoint();
    let service = spawn(checkpoint, &clock, Duration::from_secs(60));
    let sender = service.sender();

    let t0 = simulation_epoch();
    let stay = Duration::from_secs(45 * 60);
    sender.submit_event(ScanEvent::new(Lane::Entry, "0C41E9D2", t0)).await.unwrap();
    sender
        .submit_event(ScanEvent::new(Lane::Exit, "0C41E9D2", t0 + stay))
        .await
        .unwrap();

    assert!(service.occupancy().await.unwrap().is_empty());
    assert!(output.lines().iter().any(|l| l.ends_with("ValidExit Carol (dwell 00:45:00)")));

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unstamped_scan_uses_checkpoint_clock() {
    let (checkpoint, _clock, _output) = checkpoint();
    let broken: Arc<dyn ClockSource> = Arc::new(UnavailableClock);
    let service = CheckpointService::spawn(checkpoint, broken, Duration::from_secs(60));

    service.scan(Lane::Entry, "A3F2B71C").await.unwrap();

    let inside = service.occupancy().await.unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].entered_at, simulation_epoch());

    let checkpoint = service.shutdown().await.unwrap();
    assert_eq!(checkpoint.stats().entries, 1);
    assert!(checkpoint.engine().registry().get(SlotIndex(1)).unwrap().is_inside());
}
