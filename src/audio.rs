//! Audio system over loaded sound files
//!
//! Sounds arrive asynchronously and are attached to the bank once playable.
//! Every call on a missing sound is a no-op, and play/stop are guarded so
//! repeated calls do not restart anything.

use crate::assets::{AssetProvider, Pending};
use crate::settings::Settings;
use crate::sim::SimEvent;

/// Playback control over one loaded sound
pub trait AudioHandle {
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop and rewind
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
}

/// Sound slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Background music
    Music,
    /// Monolith starts rising
    Rise,
    /// Monolith starts falling
    Fall,
    /// Walking loop
    Walk,
    /// Final monolith heartbeat
    Heartbeat,
}

impl Sound {
    pub const ALL: [Sound; 5] = [
        Sound::Music,
        Sound::Rise,
        Sound::Fall,
        Sound::Walk,
        Sound::Heartbeat,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Sound::Music => "assets/sounds/bgm.mp3",
            Sound::Rise => "assets/sounds/monolith_rise.mp3",
            Sound::Fall => "assets/sounds/monolith_fall.mp3",
            Sound::Walk => "assets/sounds/walk.mp3",
            Sound::Heartbeat => "assets/sounds/heartbeat.mp3",
        }
    }

    /// Mix level before player volume
    pub fn base_volume(&self) -> f32 {
        match self {
            Sound::Music => 0.2,
            Sound::Rise | Sound::Fall => 0.8,
            Sound::Walk => 0.2,
            Sound::Heartbeat => 1.0,
        }
    }

    pub fn looping(&self) -> bool {
        matches!(self, Sound::Music | Sound::Walk | Sound::Heartbeat)
    }

    /// Starts as soon as it is loaded (or on the next resume)
    pub fn autoplay(&self) -> bool {
        matches!(self, Sound::Music)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Sound slots with pause/resume bookkeeping
pub struct SoundBank<H: AudioHandle> {
    slots: [Pending<H>; 5],
    /// Sounds to restart on the next `play_all`
    resume: Vec<Sound>,
    paused: bool,
    music_gain: f32,
    sfx_gain: f32,
}

impl<H: AudioHandle> Default for SoundBank<H> {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl<H: AudioHandle> SoundBank<H> {
    /// Empty bank. Starts paused: nothing plays until the first `play_all`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            slots: Default::default(),
            resume: Vec::new(),
            paused: true,
            music_gain: settings.music_gain(),
            sfx_gain: settings.sfx_gain(),
        }
    }

    /// Request every sound from `provider`; each attaches itself when ready
    pub fn request_all<P>(bank: &std::rc::Rc<std::cell::RefCell<Self>>, provider: &mut P)
    where
        P: AssetProvider<Audio = H>,
        H: 'static,
    {
        for sound in Sound::ALL {
            let bank = std::rc::Rc::clone(bank);
            provider.load_audio(
                sound.path(),
                Box::new(move |handle| bank.borrow_mut().attach(sound, handle)),
            );
        }
    }

    fn volume_for(&self, sound: Sound) -> f32 {
        let gain = match sound {
            Sound::Music => self.music_gain,
            _ => self.sfx_gain,
        };
        sound.base_volume() * gain
    }

    /// Store a loaded sound
    pub fn attach(&mut self, sound: Sound, mut handle: H) {
        handle.set_volume(self.volume_for(sound));
        self.slots[sound.index()].resolve(handle);
        log::debug!("Sound ready: {:?}", sound);

        if sound.autoplay() {
            if self.paused {
                if !self.resume.contains(&sound) {
                    self.resume.push(sound);
                }
            } else {
                self.play(sound);
            }
        }
    }

    pub fn is_loaded(&self, sound: Sound) -> bool {
        self.slots[sound.index()].is_ready()
    }

    pub fn is_playing(&self, sound: Sound) -> bool {
        self.slots[sound.index()]
            .get()
            .is_some_and(|h| h.is_playing())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Start a sound unless it is already playing
    pub fn play(&mut self, sound: Sound) {
        self.slots[sound.index()].with(|h| {
            if !h.is_playing() {
                h.play();
            }
        });
    }

    /// Stop a sound if it is playing
    pub fn stop(&mut self, sound: Sound) {
        self.slots[sound.index()].with(|h| {
            if h.is_playing() {
                h.stop();
            }
        });
    }

    /// Walking loop follows avatar speed
    pub fn set_footsteps(&mut self, walking: bool) {
        if walking {
            self.play(Sound::Walk);
        } else {
            self.stop(Sound::Walk);
        }
    }

    /// Pause everything that is playing and remember it. No-op while paused.
    pub fn pause_all(&mut self) {
        if self.paused {
            return;
        }
        self.resume.clear();
        for sound in Sound::ALL {
            let paused_now = self.slots[sound.index()]
                .with(|h| {
                    let was_playing = h.is_playing();
                    if was_playing {
                        h.pause();
                    }
                    was_playing
                })
                .unwrap_or(false);
            if paused_now {
                self.resume.push(sound);
            }
        }
        self.paused = true;
    }

    /// Resume exactly what `pause_all` stopped
    pub fn play_all(&mut self) {
        for sound in std::mem::take(&mut self.resume) {
            self.play(sound);
        }
        self.paused = false;
    }

    /// React to a simulation cue
    pub fn handle_event(&mut self, event: SimEvent) {
        match event {
            SimEvent::MonolithRise(_) => self.play(Sound::Rise),
            SimEvent::MonolithFall(_) => self.play(Sound::Fall),
            SimEvent::MarkerAnimation => self.play(Sound::Heartbeat),
            SimEvent::SessionEnded(_) => self.stop(Sound::Walk),
        }
    }
}

/// Browser audio via `<audio>` elements
#[cfg(target_arch = "wasm32")]
pub mod web {
    use web_sys::HtmlAudioElement;

    use super::{AudioHandle, Sound};
    use crate::assets::{AssetProvider, OnReady};

    pub struct WebAudio {
        element: HtmlAudioElement,
    }

    impl AudioHandle for WebAudio {
        fn play(&mut self) {
            // Rejected promises (autoplay policy) are ignored
            let _ = self.element.play();
        }

        fn pause(&mut self) {
            let _ = self.element.pause();
        }

        fn stop(&mut self) {
            let _ = self.element.pause();
            self.element.set_current_time(0.0);
        }

        fn is_playing(&self) -> bool {
            !self.element.paused() && !self.element.ended()
        }

        fn set_volume(&mut self, volume: f32) {
            self.element.set_volume(volume.clamp(0.0, 1.0) as f64);
        }
    }

    /// Creates `<audio>` elements for sound paths
    #[derive(Default)]
    pub struct WebAssets;

    impl AssetProvider for WebAssets {
        type Audio = WebAudio;

        fn load_audio(&mut self, path: &'static str, on_ready: OnReady<WebAudio>) {
            match HtmlAudioElement::new_with_src(path) {
                Ok(element) => {
                    let looping = Sound::ALL
                        .iter()
                        .any(|s| s.path() == path && s.looping());
                    element.set_loop(looping);
                    element.set_preload("auto");
                    on_ready(WebAudio { element });
                }
                Err(_) => log::warn!("Failed to create audio element for {}", path),
            }
        }
    }
}
