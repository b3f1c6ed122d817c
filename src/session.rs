//! Frame driver
//!
//! Owns one `SessionState` and runs it from the host's display callback:
//! fixed-size ticks from an accumulator while the pointer is captured, then
//! audio sync, the one-time navigation on an ending, and finally the two
//! render submissions. Rendering is skipped until a surface is attached.

use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::Pending;
use crate::audio::{AudioHandle, SoundBank};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::input::InputState;
use crate::renderer::{CameraView, RenderSurface, SceneView};
use crate::settings::Settings;
use crate::sim::{Outcome, SessionConfig, SessionState, tick};

/// Leaves the session for its outcome page
pub trait Navigator {
    fn navigate_to(&mut self, outcome: Outcome);
}

/// Rolling frame-rate estimate for the stats overlay
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: [f32; 60],
    frame_index: usize,
    filled: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            filled: 0,
        }
    }
}

impl FrameStats {
    pub fn record(&mut self, dt: f32) {
        self.frame_times[self.frame_index] = dt;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();
        self.filled = (self.filled + 1).min(self.frame_times.len());
    }

    /// Frames per second over the last 60 frames
    pub fn fps(&self) -> u32 {
        let total: f32 = self.frame_times[..self.filled].iter().sum();
        if total > 0.0 {
            (self.filled as f32 / total).round() as u32
        } else {
            0
        }
    }
}

pub struct Session<S, H, N>
where
    S: RenderSurface,
    H: AudioHandle,
    N: Navigator,
{
    pub state: SessionState,
    pub input: InputState,
    audio: Rc<RefCell<SoundBank<H>>>,
    surface: Pending<S>,
    navigator: N,
    look_sensitivity: f32,
    accumulator: f32,
    navigated: bool,
    stats: FrameStats,
}

impl<S, H, N> Session<S, H, N>
where
    S: RenderSurface,
    H: AudioHandle,
    N: Navigator,
{
    pub fn new(config: SessionConfig, settings: &Settings, navigator: N) -> Self {
        log::info!(
            "Session started (seed {}, phase {:.2})",
            config.seed,
            config.start_phase
        );
        let mut input = InputState::new();
        input.show_stats = settings.show_stats;
        Self {
            state: SessionState::new(config),
            input,
            audio: Rc::new(RefCell::new(SoundBank::new(settings))),
            surface: Pending::Loading,
            navigator,
            look_sensitivity: settings.mouse_sensitivity,
            accumulator: 0.0,
            navigated: false,
            stats: FrameStats::default(),
        }
    }

    /// Shared sound bank, for load callbacks to attach into
    pub fn audio(&self) -> Rc<RefCell<SoundBank<H>>> {
        Rc::clone(&self.audio)
    }

    /// Start rendering into `surface`
    pub fn attach_surface(&mut self, surface: S) {
        self.surface.resolve(surface);
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.get_mut()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Whether the outcome page has been requested
    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    /// One display callback
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.stats.record(dt);

        if self.input.take_capture_change() {
            self.accumulator = 0.0;
            self.state.avatar.sync_look_target();
            if self.input.is_captured() {
                log::info!("Pointer captured, session running");
                self.audio.borrow_mut().play_all();
            } else {
                log::info!("Pointer released, session paused");
            }
        }

        if self.input.is_captured() {
            self.update(dt);
            self.sync_audio();
        } else {
            self.audio.borrow_mut().pause_all();
        }

        self.dispatch_navigation();
        self.render();
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // Pointer delta and aim click are drained by the first substep
            let input = self.input.take_tick_input(self.look_sensitivity);
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    fn sync_audio(&mut self) {
        let mut audio = self.audio.borrow_mut();
        for event in self.state.drain_events() {
            audio.handle_event(event);
        }
        audio.set_footsteps(self.state.avatar.footsteps);
    }

    fn dispatch_navigation(&mut self) {
        if self.navigated {
            return;
        }
        if let Some(outcome) = self.state.outcome {
            log::info!("Navigating to {}", outcome.page());
            self.navigated = true;
            self.navigator.navigate_to(outcome);
        }
    }

    fn render(&mut self) {
        let show_stats = self.input.show_stats;
        let Some(surface) = self.surface.get_mut() else {
            return;
        };

        let projection = SceneView::projection(&self.state, show_stats);
        if let Err(e) = surface.submit(&projection, &CameraView::projection(&self.state)) {
            log::warn!("Render error: {}", e);
        }

        let primary = SceneView::primary(&self.state, show_stats);
        if let Err(e) = surface.submit(&primary, &CameraView::primary(&self.state)) {
            log::warn!("Render error: {}", e);
        }
    }
}
