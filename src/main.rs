//! Monolith Walk entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use monolith_walk::audio::SoundBank;
    use monolith_walk::audio::web::{WebAssets, WebAudio};
    use monolith_walk::consts::SIM_DT;
    use monolith_walk::renderer::GpuSurface;
    use monolith_walk::{Navigator, Outcome, Session, Settings};

    // JS binding for pointer lock
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const result = document.body.requestPointerLock();
            if (result && result.catch) {
                result.catch(e => console.error('Pointer lock failed:', e));
            }
        }

        export function is_pointer_locked() {
            return document.pointerLockElement === document.body;
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
        fn is_pointer_locked() -> bool;
    }

    /// Sends the browser to the outcome page
    struct PageNavigator;

    impl Navigator for PageNavigator {
        fn navigate_to(&mut self, outcome: Outcome) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if window.location().set_href(outcome.page()).is_err() {
                log::error!("Failed to navigate to {}", outcome.page());
            }
        }
    }

    type WebSession = Session<GpuSurface, WebAudio, PageNavigator>;

    /// App instance holding the session and frame timing
    struct App {
        session: WebSession,
        settings: Settings,
        last_time: f64,
    }

    impl App {
        /// Persist the stats overlay toggle
        fn sync_settings(&mut self) {
            if self.settings.show_stats == self.session.input.show_stats {
                return;
            }
            self.settings.show_stats = self.session.input.show_stats;
            if let Err(e) = self.settings.save() {
                log::warn!("Failed to save settings: {}", e);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let captured = self.session.input.is_captured();

            // Instructions overlay while the session is paused
            if let Some(el) = document.get_element_by_id("blocker") {
                let _ = el.set_attribute("class", if captured { "hidden" } else { "" });
            }
            if let Some(el) = document.get_element_by_id("crosshair") {
                let _ = el.set_attribute("class", if captured { "" } else { "hidden" });
            }

            if let Some(el) = document.get_element_by_id("stats") {
                if self.session.input.show_stats {
                    let _ = el.set_attribute("class", "");
                    el.set_text_content(Some(&format!(
                        "{} fps | phase {:.2}",
                        self.session.stats().fps(),
                        self.session.state.phase()
                    )));
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Monolith Walk starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let session = WebSession::new(settings.session_config(seed), &settings, PageNavigator);

        // Sounds attach themselves as they finish loading
        SoundBank::request_all(&session.audio(), &mut WebAssets);

        let app = Rc::new(RefCell::new(App {
            session,
            settings,
            last_time: 0.0,
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let gpu = GpuSurface::new(surface, &adapter, width, height).await;
        app.borrow_mut().session.attach_surface(gpu);

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        setup_input_handlers(app.clone());
        setup_resize(&canvas, app.clone());

        // Start frame loop
        request_animation_frame(app);

        log::info!("Monolith Walk running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Pointer lock starts and stops the session
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = is_pointer_locked();
                app.borrow_mut().session.input.set_captured(locked);
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Pointer lock error handler
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::error!("Pointer lock error!");
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockerror",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse move - relative movement while locked
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .session
                    .input
                    .pointer_moved(event.movement_x() as f32, event.movement_y() as f32);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - aim while locked, otherwise request the lock
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.session.input.is_captured() {
                    a.session.input.pointer_pressed();
                } else {
                    drop(a); // Release borrow before the lock request
                    request_pointer_lock();
                }
            });
            let _ = document
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().session.input.key_down(&event.code());
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().session.input.key_up(&event.code());
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(gpu) = app.borrow_mut().session.surface_mut() {
                gpu.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        let navigated = {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.session.frame(dt);
            a.sync_settings();
            a.update_hud();
            a.session.has_navigated()
        };

        // The page is being replaced; stop scheduling frames
        if !navigated {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Scripted walk without a window: logs what each frame would render.

    use monolith_walk::assets::{AssetProvider, OnReady};
    use monolith_walk::audio::{AudioHandle, SoundBank};
    use monolith_walk::consts::SIM_DT;
    use monolith_walk::error::Result;
    use monolith_walk::renderer::{CameraView, RenderSurface, SceneKind, SceneView};
    use monolith_walk::sim::MonolithStatus;
    use monolith_walk::{Navigator, Outcome, Session, Settings};

    /// Frame cap for the scripted walk (ten simulated minutes)
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    #[derive(Default)]
    struct LogSurface {
        frames: u64,
    }

    impl RenderSurface for LogSurface {
        fn submit(&mut self, scene: &SceneView, camera: &CameraView) -> Result<()> {
            if scene.kind != SceneKind::Primary {
                return Ok(());
            }
            self.frames += 1;
            if self.frames % 600 == 0 {
                log::info!(
                    "frame {}: phase {:.3}, eye ({:.0}, {:.0}), fog {:?}, flesh {:.2}",
                    self.frames,
                    scene.phase,
                    camera.position.x,
                    camera.position.z,
                    scene.colors.fog.to_array(),
                    scene.flesh_transition
                );
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct SilentAudio {
        playing: bool,
    }

    impl AudioHandle for SilentAudio {
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn stop(&mut self) {
            self.playing = false;
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn set_volume(&mut self, _volume: f32) {}
    }

    struct SilentAssets;

    impl AssetProvider for SilentAssets {
        type Audio = SilentAudio;

        fn load_audio(&mut self, path: &'static str, on_ready: OnReady<SilentAudio>) {
            log::debug!("Loaded {}", path);
            on_ready(SilentAudio::default());
        }
    }

    #[derive(Default)]
    struct Destination {
        page: Option<&'static str>,
    }

    impl Navigator for Destination {
        fn navigate_to(&mut self, outcome: Outcome) {
            self.page = Some(outcome.page());
        }
    }

    pub fn run() {
        let settings = Settings::load();
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let mut session: Session<LogSurface, SilentAudio, Destination> =
            Session::new(settings.session_config(seed), &settings, Destination::default());
        SoundBank::request_all(&session.audio(), &mut SilentAssets);
        session.attach_surface(LogSurface::default());

        session.input.set_captured(true);
        session.input.key_down("KeyW");

        for _ in 0..MAX_FRAMES {
            // Look straight at any monolith waiting to be dismissed
            let pending = session
                .state
                .monoliths
                .markers
                .iter()
                .any(|m| m.status == MonolithStatus::Pending);
            if pending {
                session.state.avatar.look_target.y = 0.0;
                session.input.pointer_pressed();
            }

            session.frame(SIM_DT);
            if session.has_navigated() {
                break;
            }
        }

        match session.navigator().page {
            Some(page) => log::info!(
                "Walk ended at phase {:.3} after {} ticks -> {}",
                session.state.phase(),
                session.state.time_ticks,
                page
            ),
            None => log::info!("Walk still running at phase {:.3}", session.state.phase()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Monolith Walk (native) starting...");
    log::info!("Native mode runs a headless scripted walk - use `trunk serve` for the web version");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
