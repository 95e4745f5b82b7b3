//! Notification sound playback

use std::{
    path::PathBuf,
    process::Stdio,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

/// Something that can play the "time's up" notification.
///
/// Playback is fire-and-forget: implementations must return immediately and
/// must never panic when the sound cannot be played.
pub trait SoundPlayer: Send + Sync {
    fn play(&self);
}

/// Plays a sound file by spawning an external audio command (e.g. `paplay`)
#[derive(Debug, Clone)]
pub struct CommandSoundPlayer {
    program: String,
    sound_file: PathBuf,
}

impl CommandSoundPlayer {
    pub fn new(program: impl Into<String>, sound_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sound_file: sound_file.into(),
        }
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, skipping notification sound");
            return;
        };

        let program = self.program.clone();
        let sound_file = self.sound_file.clone();
        runtime.spawn(async move {
            debug!("Playing {} with {}", sound_file.display(), program);

            let result = Command::new(&program)
                .arg(&sound_file)
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await;

            match result {
                Ok(output) if output.status.success() => {
                    info!("Notification sound played");
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("{} failed: {}", program, stderr.trim());
                }
                Err(e) => {
                    warn!("Failed to execute {}: {}", program, e);
                }
            }
        });
    }
}

/// Player that only counts how often it was asked to play
#[derive(Debug, Default)]
pub struct CountingPlayer {
    plays: AtomicUsize,
}

impl CountingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl SoundPlayer for CountingPlayer {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}
