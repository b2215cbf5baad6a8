//! End-to-end player task tests against the platform mocks.
//!
//! These drive the real decode loop with in-memory WAV files and the real
//! command bus; only the hardware seams are mocked.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration, Timer};
use platform::mocks::{MockAudio, MockDisplay, MockStorage, MockWatchdog};
use playback::task::{run_player, StartError, StartParams};
use playback::{Command, CommandBus, PlaylistError};

/// Minimal RIFF/WAVE bytes: 16-bit PCM, `n_samples` zero samples.
fn wav(sample_rate: u32, channels: u16, n_samples: usize) -> Vec<u8> {
    let data_len = (n_samples * 2) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
    out.extend_from_slice(&(channels * 2).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(out.len() + n_samples * 2, 0);
    out
}

/// An ID3v2.3 tag with latin-1 TIT2/TPE1 frames, followed by garbage audio.
fn tagged_mp3(title: &str, artist: &str) -> Vec<u8> {
    let mut frames = Vec::new();
    for (id, text) in [(b"TIT2", title), (b"TPE1", artist)] {
        frames.extend_from_slice(id);
        frames.extend_from_slice(&((text.len() + 1) as u32).to_be_bytes());
        frames.extend_from_slice(&[0, 0]);
        frames.push(0); // latin-1
        frames.extend_from_slice(text.as_bytes());
    }
    let mut out = Vec::new();
    out.extend_from_slice(b"ID3\x03\x00\x00");
    let size = frames.len() as u32;
    out.extend_from_slice(&[
        ((size >> 21) & 0x7F) as u8,
        ((size >> 14) & 0x7F) as u8,
        ((size >> 7) & 0x7F) as u8,
        (size & 0x7F) as u8,
    ]);
    out.extend_from_slice(&frames);
    out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
    out
}

#[tokio::test]
async fn plays_a_directory_until_terminated() {
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("01 intro.wav", wav(44_100, 2, 4096));
    storage.add_file("02 theme.wav", wav(48_000, 2, 2048));
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let driver = async {
        Timer::after_millis(30).await;
        assert!(bus.is_alive());
        bus.handle().terminate().await;
    };
    let run = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    );
    let (result, ()) = with_timeout(Duration::from_secs(5), join(run, driver))
        .await
        .expect("player task wedged");

    result.expect("playback should start");
    assert!(!bus.is_alive());
    assert!(audio.frames_accepted > 0);
    assert!(audio.started_rates.contains(&44_100));
    assert!(audio.started_rates.contains(&48_000));
    assert!(!audio.running, "sink must be torn down on exit");
    assert!(watchdog.feeds > 0);

    let sink = display.lock().await;
    let seen = &sink.now_playing;
    assert!(seen
        .iter()
        .any(|(t, a)| t == "01 intro.wav" && a == "Unknown Artist"));
    assert!(seen.iter().any(|(t, _)| t == "02 theme.wav"));
}

#[tokio::test]
async fn corrupt_file_is_skipped_not_fatal() {
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("a.wav", wav(44_100, 2, 1024));
    storage.add_file("b.wav", b"this is not a wave file".to_vec());
    storage.add_file("c.wav", wav(44_100, 2, 1024));
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let driver = async {
        Timer::after_millis(30).await;
        bus.handle().terminate().await;
    };
    let run = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    );
    let (result, ()) = with_timeout(Duration::from_secs(5), join(run, driver))
        .await
        .expect("skip-and-continue must not wedge the loop");

    result.expect("playback should start despite the corrupt file");
    // The broken song still gets its metadata line (filename fallback),
    // and playback carried on around it.
    let sink = display.lock().await;
    let seen = &sink.now_playing;
    assert!(seen.iter().any(|(t, _)| t == "b.wav"));
    assert!(seen.iter().any(|(t, _)| t == "c.wav"));
    assert!(audio.frames_accepted > 0);
}

#[tokio::test]
async fn mp3_tags_reach_the_display_even_without_the_codec() {
    // The mp3 feature is off in this build: the file cannot be decoded and
    // is skipped, but its ID3 tags must still be shown first.
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("paranoid.mp3", tagged_mp3("Paranoid", "Black Sabbath"));
    storage.add_file("z.wav", wav(44_100, 2, 512));
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let driver = async {
        Timer::after_millis(30).await;
        bus.handle().terminate().await;
    };
    let run = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    );
    let (result, ()) = with_timeout(Duration::from_secs(5), join(run, driver))
        .await
        .expect("player task wedged");
    result.expect("playback should start");

    let sink = display.lock().await;
    let seen = &sink.now_playing;
    assert!(seen
        .iter()
        .any(|(t, a)| t == "Paranoid" && a == "Black Sabbath"));
}

#[tokio::test]
async fn pause_keeps_the_task_alive_and_terminate_still_works() {
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("loop.wav", wav(44_100, 2, 65_536));
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let driver = async {
        Timer::after_millis(10).await;
        bus.handle().send(Command::Pause).await;
        Timer::after_millis(30).await;
        // Paused, not dead: the loop idles without decoding.
        assert!(bus.is_alive());
        bus.handle().terminate().await;
    };
    let run = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    );
    let (result, ()) = with_timeout(Duration::from_secs(5), join(run, driver))
        .await
        .expect("terminate must reach a paused player");
    result.expect("playback should start");
    assert!(!bus.is_alive());
    assert!(!audio.running);
}

#[tokio::test]
async fn single_mode_plays_exactly_the_selected_entry() {
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("a.wav", wav(44_100, 2, 256));
    storage.add_file("b.wav", wav(22_050, 1, 256));
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let driver = async {
        Timer::after_millis(20).await;
        bus.handle().terminate().await;
    };
    let run = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams {
            root: "",
            selected: 1,
            play_all: false,
        },
    );
    let (result, ()) = with_timeout(Duration::from_secs(5), join(run, driver))
        .await
        .expect("player task wedged");
    result.expect("playback should start");

    let sink = display.lock().await;
    let seen = &sink.now_playing;
    assert!(seen.iter().all(|(t, _)| t == "b.wav"));
    assert!(audio.started_rates.iter().all(|&r| r == 22_050));
}

#[tokio::test]
async fn empty_directory_fails_to_start() {
    let bus = CommandBus::new();
    let mut storage = MockStorage::new();
    storage.add_file("readme.txt", b"no music here".to_vec());
    let mut audio = MockAudio::new();
    let display = Mutex::<CriticalSectionRawMutex, _>::new(MockDisplay::new());
    let mut watchdog = MockWatchdog::default();

    let result = run_player(
        &bus,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    )
    .await;

    assert!(matches!(
        result,
        Err(StartError::Playlist(PlaylistError::NoPlayableFiles))
    ));
    assert!(!bus.is_alive());
    assert!(audio.started_rates.is_empty());
}
