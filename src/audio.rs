//! Audio cues driven by game events
//!
//! The simulation never plays sound itself. The caller drains events each
//! frame and hands them to an `AudioManager`, which maps them to effects and
//! background music and forwards those to whatever backend is plugged in.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits wall
    WallHit,
    /// Ball hits a brick (destroyed or not)
    BrickHit,
    /// A row of bricks pushed in from the top
    NewRow,
    /// Modifier caught
    PickupCollect,
    /// Last ball fell
    LifeLost,
    /// Ball launched
    Launch,
    /// Level cleared
    LevelClear,
    /// Game over
    GameOver,
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Main,
    Extravaganza,
}

/// Output device. Implementations must not block the frame.
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
    fn play_music(&mut self, track: MusicTrack, volume: f32);
    fn stop_music(&mut self);
}

/// Map an event to its effect, if it has one
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::BallLaunched => Some(SoundEffect::Launch),
        GameEvent::PaddleHit => Some(SoundEffect::PaddleHit),
        GameEvent::BrickHit { .. } => Some(SoundEffect::BrickHit),
        GameEvent::WallHit => Some(SoundEffect::WallHit),
        GameEvent::NewRowInserted => Some(SoundEffect::NewRow),
        GameEvent::ModifierCaught(_) => Some(SoundEffect::PickupCollect),
        GameEvent::LifeLost { .. } => Some(SoundEffect::LifeLost),
        GameEvent::LevelCleared { .. } => Some(SoundEffect::LevelClear),
        GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        GameEvent::ExtravaganzaStart
        | GameEvent::ExtravaganzaStop
        | GameEvent::ModifierDropped(_)
        | GameEvent::ModifierExpired(_) => None,
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music: Option<MusicTrack>,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.05,
            muted: false,
            music: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio. Music state is still tracked while muted.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.backend.stop_music();
        } else if let Some(track) = self.music {
            let vol = self.master_volume * self.music_volume;
            self.backend.play_music(track, vol);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Track that should be playing right now
    pub fn current_music(&self) -> Option<MusicTrack> {
        self.music
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    fn switch_music(&mut self, track: Option<MusicTrack>) {
        if self.music == track {
            return;
        }
        self.music = track;
        if self.muted {
            return;
        }
        match track {
            Some(track) => {
                let vol = self.master_volume * self.music_volume;
                self.backend.play_music(track, vol);
            }
            None => self.backend.stop_music(),
        }
    }

    /// React to one frame's events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(effect) = sound_for(event) {
                self.play(effect);
            }

            match event {
                // Music starts with play and restarts after a life is lost
                GameEvent::BallLaunched if self.music.is_none() => {
                    self.switch_music(Some(MusicTrack::Main));
                }
                GameEvent::ExtravaganzaStart => self.switch_music(Some(MusicTrack::Extravaganza)),
                GameEvent::ExtravaganzaStop if self.music.is_some() => {
                    self.switch_music(Some(MusicTrack::Main));
                }
                GameEvent::LevelCleared { .. } | GameEvent::GameOver { .. } => {
                    self.switch_music(None);
                }
                _ => {}
            }
        }
    }
}

/// Backend that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {:?} at {:.2}", effect, volume);
    }

    fn play_music(&mut self, track: MusicTrack, volume: f32) {
        log::debug!("music {:?} at {:.2}", track, volume);
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
    }
}
