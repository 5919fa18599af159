use crate::config::SoundConfig;
use cv_audio::{AudioSink, DeviceSink, SoundPlayer};
use std::path::Path;

/// Background music plus the one-shot effect. Either may be absent when
/// its file or the output device is unavailable; the game then runs silent.
pub struct GameAudio<S: AudioSink> {
    music: Option<SoundPlayer<S>>,
    effect: Option<SoundPlayer<S>>,
}

impl GameAudio<DeviceSink> {
    pub fn open(config: &SoundConfig) -> Self {
        let music = config.music.as_deref().and_then(|p| open_player("music", p));
        let effect = config.effect.as_deref().and_then(|p| open_player("effect", p));
        let mut audio = Self::new(music, effect);
        audio.start_music();
        audio
    }
}

fn open_player(label: &str, path: &str) -> Option<SoundPlayer<DeviceSink>> {
    match SoundPlayer::open(Path::new(path)) {
        Ok(player) => Some(player),
        Err(err) => {
            log::warn!("{label} {path} not loaded: {err}");
            None
        }
    }
}

impl<S: AudioSink> GameAudio<S> {
    pub fn new(music: Option<SoundPlayer<S>>, effect: Option<SoundPlayer<S>>) -> Self {
        Self { music, effect }
    }

    pub fn start_music(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.start();
            music.continue_loop();
        }
    }

    pub fn toggle_music(&mut self) {
        let Some(music) = self.music.as_mut() else {
            log::info!("No music loaded");
            return;
        };
        if music.is_playing() {
            music.stop();
            log::info!("Music stopped");
        } else {
            music.start();
            music.continue_loop();
            log::info!("Music started");
        }
    }

    pub fn play_effect(&mut self) {
        if let Some(effect) = self.effect.as_mut() {
            effect.play_once();
        }
    }

    /// Keep the music queue topped up. Call once per frame.
    pub fn tick(&mut self) {
        if let Some(music) = self.music.as_mut() {
            if music.is_playing() {
                music.continue_loop();
            }
        }
    }

    pub fn music_playing(&self) -> bool {
        self.music.as_ref().is_some_and(|m| m.is_playing())
    }

    pub fn label(&self) -> String {
        match &self.music {
            None => "Music: unavailable".to_string(),
            Some(m) if self.music_playing() => format!("Music: playing ({} queued)", m.queued()),
            Some(_) => "Music: stopped".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_audio::WaveBuffer;

    #[derive(Default)]
    struct FakeSink {
        queued: usize,
        running: bool,
    }

    impl AudioSink for FakeSink {
        fn queued(&self) -> usize {
            self.queued
        }

        fn push(&mut self, samples: &[f32]) -> usize {
            self.queued += samples.len();
            samples.len()
        }

        fn clear(&mut self) {
            self.queued = 0;
        }

        fn resume(&mut self) {
            self.running = true;
        }

        fn pause(&mut self) {
            self.running = false;
        }

        fn channels(&self) -> u16 {
            2
        }

        fn sample_rate(&self) -> u32 {
            44_100
        }
    }

    fn player(frames: usize) -> SoundPlayer<FakeSink> {
        let wave = WaveBuffer {
            samples: vec![0.25; frames * 2],
            channels: 2,
            sample_rate: 44_100,
        };
        SoundPlayer::new(wave, FakeSink::default())
    }

    #[test]
    fn music_loop_tops_up_only_while_playing() {
        let mut audio = GameAudio::new(Some(player(100)), None);
        audio.start_music();
        assert!(audio.music_playing());
        let first = audio.music.as_ref().map(|m| m.queued());
        assert_eq!(first, Some(200));

        audio.tick();
        assert_eq!(audio.music.as_ref().map(|m| m.queued()), Some(200));

        audio.toggle_music();
        assert!(!audio.music_playing());
        audio.tick();
        assert_eq!(audio.music.as_ref().map(|m| m.queued()), Some(0));

        audio.toggle_music();
        assert!(audio.music_playing());
        assert_eq!(audio.music.as_ref().map(|m| m.queued()), Some(200));
    }

    #[test]
    fn effect_restarts_from_the_top() {
        let mut audio = GameAudio::new(None, Some(player(10)));
        audio.play_effect();
        audio.play_effect();
        assert_eq!(audio.effect.as_ref().map(|e| e.queued()), Some(20));
    }

    #[test]
    fn missing_sounds_are_silent_no_ops() {
        let mut audio: GameAudio<FakeSink> = GameAudio::new(None, None);
        audio.start_music();
        audio.toggle_music();
        audio.play_effect();
        audio.tick();
        assert!(!audio.music_playing());
        assert_eq!(audio.label(), "Music: unavailable");
    }

    #[test]
    fn label_follows_music_state() {
        let mut audio = GameAudio::new(Some(player(10)), None);
        assert_eq!(audio.label(), "Music: stopped");
        audio.start_music();
        assert_eq!(audio.label(), "Music: playing (20 queued)");
        audio.toggle_music();
        assert_eq!(audio.label(), "Music: stopped");
    }
}
