//! Desktop emulator: the full player stack against a local music directory.
//!
//! ```text
//! cargo run -p firmware --features emulator --bin emulator -- ~/music
//! ```
//!
//! Playback control is a stdin REPL standing in for the keypad; everything
//! from the command bus inwards is the same code that runs on the device.

#![allow(clippy::expect_used, clippy::print_stdout)]

use std::io::BufRead;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use firmware::host::{HostAudio, HostDisplay};
use platform::config::DEFAULT_VOLUME;
use platform::{LocalStorage, NoopWatchdog, VolumeControl};
use playback::task::{run_player, StartParams};
use playback::{Command, CommandBus};

static BUS: CommandBus = CommandBus::new();
static VOLUME: VolumeControl = VolumeControl::new(DEFAULT_VOLUME);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let root = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MUSIC_PATH").ok())
        .unwrap_or_else(|| String::from("."));
    println!("pocketamp emulator, playing {root}");
    println!("p pause/resume | n next | b prev | l loop mode | r reinit | + / - volume | q quit");

    std::thread::spawn(stdin_loop);

    let mut storage = LocalStorage::new(&root);
    let mut audio = HostAudio::new(&VOLUME);
    let display = Mutex::<CriticalSectionRawMutex, _>::new(HostDisplay);
    let mut watchdog = NoopWatchdog;

    if let Err(err) = run_player(
        &BUS,
        &mut storage,
        &mut audio,
        &display,
        &mut watchdog,
        StartParams::play_all_from(""),
    )
    .await
    {
        eprintln!("could not start playback: {err}");
        std::process::exit(1);
    }
}

/// Keypad stand-in: one character per action, mirroring the button map.
fn stdin_loop() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let handle = BUS.handle();
        let cmd = match line.trim() {
            "p" => Some(Command::Pause),
            "n" => Some(Command::Next),
            "b" => Some(Command::Prev),
            "l" => Some(Command::ToggleLoopMode),
            "r" => Some(Command::ReinitAudio),
            "+" => {
                println!("volume {}%", VOLUME.adjust(firmware::VOLUME_STEP));
                None
            }
            "-" => {
                println!("volume {}%", VOLUME.adjust(-firmware::VOLUME_STEP));
                None
            }
            "q" => {
                embassy_futures::block_on(handle.terminate());
                break;
            }
            _ => None,
        };
        if let Some(cmd) = cmd {
            let _ = embassy_futures::block_on(handle.send(cmd));
        }
    }
}
