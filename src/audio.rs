use crate::config::AudioConfig;
use macroquad::audio::{load_sound, play_sound, stop_sound, PlaySoundParams, Sound};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    MainEngine,
    NextLevel,
    Explosion,
}

impl Clip {
    pub const ALL: [Clip; 3] = [Clip::MainEngine, Clip::NextLevel, Clip::Explosion];

    pub fn file_name(self) -> &'static str {
        match self {
            Clip::MainEngine => "main_engine.wav",
            Clip::NextLevel => "next_level.wav",
            Clip::Explosion => "explosion.wav",
        }
    }

    /// The engine hum repeats for as long as it is not stopped.
    fn looped(self) -> bool {
        self == Clip::MainEngine
    }
}

/// A single audio source: one clip at a time, `stop` silences everything.
pub struct AudioBank {
    sounds: Vec<(Clip, Sound)>,
    volume: f32,
    voice: Option<Clip>,
}

impl AudioBank {
    /// Loads every clip from the configured directory. Missing or unreadable
    /// files leave that clip silent.
    pub async fn load(config: &AudioConfig) -> Self {
        let mut sounds = Vec::new();
        for clip in Clip::ALL {
            let path = config.dir.join(clip.file_name());
            let Some(path_str) = path.to_str() else {
                warn!("Skipping clip with non-UTF-8 path {:?}", path);
                continue;
            };
            match load_sound(path_str).await {
                Ok(sound) => {
                    debug!("Loaded {:?} from {}", clip, path_str);
                    sounds.push((clip, sound));
                }
                Err(e) => warn!("Unable to load {:?} from {}: {}", clip, path_str, e),
            }
        }

        Self {
            sounds,
            volume: config.volume,
            voice: None,
        }
    }

    #[cfg(test)]
    pub fn silent() -> Self {
        Self {
            sounds: Vec::new(),
            volume: 0.0,
            voice: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_some()
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<Clip> {
        self.voice
    }

    pub fn stop(&mut self) {
        if self.voice.take().is_some() {
            for (_, sound) in &self.sounds {
                stop_sound(sound);
            }
        }
    }

    pub fn play_one_shot(&mut self, clip: Clip) {
        self.voice = Some(clip);
        if let Some((_, sound)) = self.sounds.iter().find(|(c, _)| *c == clip) {
            play_sound(
                sound,
                PlaySoundParams {
                    looped: clip.looped(),
                    volume: self.volume,
                },
            );
        }
    }
}
