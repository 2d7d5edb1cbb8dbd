//! Star Catcher entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use glam::Vec2;
    use star_catcher::consts::SIM_DT;
    use star_catcher::renderer::{RenderState, build_frame};
    use star_catcher::{GameHost, HostConfig, Key, MemorySource};

    /// Game instance holding the host and the GPU state
    struct Game {
        host: GameHost,
        render_state: Option<RenderState>,
        last_time: f64,
        // Last values written to the DOM
        shown_score: String,
        shown_prompt: Option<bool>,
    }

    impl Game {
        fn new(host: GameHost) -> Self {
            Self {
                host,
                render_state: None,
                last_time: 0.0,
                shown_score: String::new(),
                shown_prompt: None,
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let scene = self.host.scene();
            let (Some(session), Some(layout)) = (scene.session(), scene.layout()) else {
                return;
            };

            let vertices = build_frame(session, layout, self.host.config().debug);
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Mirror the scene's text elements into the DOM
        fn update_hud(&mut self) {
            let Some(session) = self.host.scene().session() else {
                return;
            };
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if session.score_text.text != self.shown_score
                && let Some(el) = document.get_element_by_id("score")
            {
                el.set_text_content(Some(&session.score_text.text));
                self.shown_score = session.score_text.text.clone();
            }

            let visible = session.restart_prompt.visible;
            if self.shown_prompt != Some(visible)
                && let Some(el) = document.get_element_by_id("restart-prompt")
            {
                if visible {
                    el.set_text_content(Some(&session.restart_prompt.text));
                }
                let class = if visible { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
                self.shown_prompt = Some(visible);
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Star Catcher starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let config = HostConfig::load();
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(&config.parent)
            .ok_or_else(|| format!("no element #{}", config.parent))?
            .dyn_into()?;

        // Backing store at device resolution; the world is stretched over it
        let dpr = window.device_pixel_ratio();
        let width = (config.width as f64 * dpr) as u32;
        let height = (config.height as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let world = Vec2::new(config.width, config.height);

        // Assets are fetched up front; anything missing fails the boot below
        let mut source = MemorySource::new();
        for path in config.assets.paths() {
            match fetch_bytes(&window, path).await {
                Ok(bytes) => source.insert(path, bytes),
                Err(e) => log::warn!("Failed to fetch {}: {:?}", path, e),
            }
        }

        let mut host = GameHost::new(config);
        if let Err(e) = host.boot(&source) {
            log::error!("Startup failed: {}", e);
            return Err(JsValue::from_str(&e.to_string()));
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(Game::new(host)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, world)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Star Catcher running!");
        Ok(())
    }

    async fn fetch_bytes(window: &web_sys::Window, path: &str) -> Result<Vec<u8>, JsValue> {
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(path))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
        }
        let buffer = JsFuture::from(response.array_buffer()?).await?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    event.prevent_default();
                    game.borrow_mut().host.key_down(key);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    game.borrow_mut().host.key_up(key);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur: key-ups would be lost
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().host.release_keys();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.host.frame(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Star Catcher failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use star_catcher::{FsSource, GameHost, HostConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Star Catcher (native) starting...");

    let mut host = GameHost::new(HostConfig::load());
    if let Err(e) = host.boot(&FsSource::new(".")) {
        log::error!("Startup failed: {}", e);
        std::process::exit(1);
    }

    log::info!("No window on native; running a scripted headless session");
    headless::run(&mut host);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use star_catcher::consts::SIM_DT;
    use star_catcher::{GameHost, Key, ScenePhase};

    /// Simulated seconds before the scripted run gives up
    const TIME_LIMIT: f32 = 60.0;
    /// Seconds spent running in one direction before turning around
    const LEG: f32 = 4.0;

    /// Run back and forth across the floor, hopping every second, until the
    /// player is hit or time runs out
    pub fn run(host: &mut GameHost) {
        let mut elapsed = 0.0;
        let mut heading = Key::Right;
        host.key_down(heading);

        while elapsed < TIME_LIMIT {
            host.frame(SIM_DT);
            elapsed += SIM_DT;

            if host.scene().phase() == ScenePhase::GameOver {
                break;
            }

            let ticks = (elapsed / SIM_DT).round() as u32;
            if ticks % (LEG / SIM_DT).round() as u32 == 0 {
                host.key_up(heading);
                heading = match heading {
                    Key::Right => Key::Left,
                    _ => Key::Right,
                };
                host.key_down(heading);
            }
            if ticks % 60 == 0 {
                host.key_down(Key::Up);
            } else if ticks % 60 == 10 {
                host.key_up(Key::Up);
            }
        }

        let score = host.scene().session().map_or(0, |s| s.score);
        log::info!(
            "Headless run finished after {:.1}s: {:?}, score {}",
            elapsed,
            host.scene().phase(),
            score
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
