//! Reaction Speed entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent};

    use reaction_speed::audio::{AudioManager, SoundEffect};
    use reaction_speed::fx::{DotGrid, SparkField};
    use reaction_speed::leaderboard::{VIEW_ENTRIES, format_date};
    use reaction_speed::persistence::{KeyValueStore, LocalStorage, MemoryStore};
    use reaction_speed::renderer::{RenderState, SceneLayout, build_scene};
    use reaction_speed::settings::Settings;
    use reaction_speed::sim::{GamePhase, Session, SessionEvent};

    /// Longest frame step fed to the simulation (ms)
    const MAX_FRAME_MS: f64 = 100.0;
    /// How long a toast stays up (ms)
    const TOAST_MS: f64 = 2000.0;

    const PAGE_TITLE: &str = "Reaction Speed Game - Test Your Reflexes | Lightning Fast Mini-Game";
    const PAGE_DESCRIPTION: &str = "Test your reaction speed in this addictive mini-game! \
        Click targets before time runs out. Features leaderboards, difficulty scaling, \
        and smooth animations. Perfect for mobile and desktop.";

    /// Canvas size in CSS and physical pixels
    #[derive(Debug, Clone, Copy)]
    struct Viewport {
        css: Vec2,
        physical: (u32, u32),
        dpr: f32,
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        grid: DotGrid,
        sparks: SparkField,
        fx_rng: Pcg32,
        settings: Settings,
        settings_store: Box<dyn KeyValueStore>,
        layout: Option<SceneLayout>,
        render_state: Option<RenderState>,
        audio: Rc<RefCell<AudioManager>>,
        /// rAF timestamp of the previous frame (ms)
        last_time: f64,
        /// Clock for the cosmetic effects (ms)
        fx_time: f64,
        toast_until: f64,
        leaderboard_open: bool,
        raf_handle: Option<i32>,
        stopped: bool,
    }

    impl Game {
        fn new(
            seed: u64,
            store: Box<dyn KeyValueStore>,
            settings_store: Box<dyn KeyValueStore>,
        ) -> Self {
            let settings = Settings::load(settings_store.as_ref());

            let audio = Rc::new(RefCell::new(AudioManager::new()));
            audio.borrow_mut().apply_settings(&settings);

            let mut session = Session::new(seed, store, js_sys::Date::now());
            {
                let audio = audio.clone();
                session.subscribe(move |event| {
                    if let Some(effect) = SoundEffect::for_event(event) {
                        audio.borrow().play(effect);
                    }
                });
            }

            let mut grid = DotGrid::new(settings.grid.clone());
            grid.set_gap(settings.effective_grid_gap());
            grid.set_impulses(settings.effective_shock_impulse());

            Self {
                session,
                grid,
                sparks: SparkField::new(settings.spark.clone()),
                fx_rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
                settings,
                settings_store,
                layout: None,
                render_state: None,
                audio,
                last_time: 0.0,
                fx_time: 0.0,
                toast_until: 0.0,
                leaderboard_open: false,
                raf_handle: None,
                stopped: false,
            }
        }

        /// Re-layout after the canvas size changed
        fn apply_viewport(&mut self, viewport: Viewport) {
            self.layout = SceneLayout::compute(viewport.css.x, viewport.css.y);
            self.session.set_play_area(self.layout.map(|l| l.play_area()));
            self.grid.resize(viewport.css.x, viewport.css.y);
            if let Some(rs) = self.render_state.as_mut() {
                rs.resize(viewport.physical.0, viewport.physical.1, viewport.dpr);
            }
        }

        /// Canvas click at CSS pixel `pos`
        fn click(&mut self, pos: Vec2) {
            if self.settings.background_grid {
                self.grid.click(pos, self.fx_time);
            }

            let Some(layout) = self.layout else { return };
            if self.session.click_at(layout.to_play_area(pos)) && self.settings.particles {
                self.sparks.burst(&mut self.fx_rng, pos, self.fx_time);
            }
        }

        /// Q key: step through quality presets
        fn cycle_quality(&mut self) {
            let preset = self.settings.cycle_quality();
            self.grid.set_gap(self.settings.effective_grid_gap());
            let size = self.grid.size();
            self.grid.resize(size.x, size.y);
            if !self.settings.particles {
                self.sparks.clear();
            }
            self.notify(&format!("Quality: {}", preset.as_str()));
            self.save_settings();
        }

        /// M key: mute/unmute
        fn toggle_muted(&mut self) {
            let muted = self.settings.toggle_muted();
            self.audio.borrow_mut().apply_settings(&self.settings);
            self.notify(if muted { "Sound off" } else { "Sound on" });
            self.save_settings();
        }

        fn save_settings(&self) {
            if let Err(e) = self.settings.save(self.settings_store.as_ref()) {
                log::warn!("Failed to save settings: {}", e);
            }
        }

        fn notify(&mut self, title: &str) {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                self.show_toast(&document, title, "");
            }
        }

        fn start(&mut self) {
            self.audio.borrow().resume();
            self.leaderboard_open = false;
            self.session.start();
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;
            self.fx_time = time;

            self.session.advance(dt);
            if self.settings.background_grid {
                self.grid.tick(time);
            }
            self.sparks.expire(time);
        }

        /// Render the current frame
        fn render(&mut self) {
            let (Some(render_state), Some(layout)) = (self.render_state.as_mut(), self.layout.as_ref())
            else {
                return;
            };

            let vertices = build_scene(
                layout,
                self.session.state(),
                self.session.now_ms(),
                &self.grid,
                &self.sparks,
                self.fx_time,
                &self.settings,
            );
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            for event in self.session.drain_events() {
                match event {
                    SessionEvent::TargetHit { score } => {
                        self.show_toast(&document, "Hit! +1", &format!("Score: {}", score));
                    }
                    SessionEvent::GameOver { score, new_best } => {
                        self.show_toast(&document, "Game Over!", &format!("Final Score: {}", score));
                        set_text(&document, "final-score", &score.to_string());
                        set_visible(&document, "new-best", new_best);
                        log::info!("Game over with score {} (new best: {})", score, new_best);
                    }
                    SessionEvent::Started | SessionEvent::Restarted => {
                        set_visible(&document, "new-best", false);
                    }
                    SessionEvent::LeaderboardChanged => self.render_leaderboard(&document),
                    _ => {}
                }
            }

            let phase = self.session.phase();
            set_text(&document, "score", &self.session.score().to_string());
            if let Some(bar) = document.get_element_by_id("time-bar") {
                let pct = self.session.time_progress() * 100.0;
                let _ = bar.set_attribute("style", &format!("width: {:.1}%", pct));
            }

            let best = self.session.best_score();
            set_visible(&document, "best-badge", best > 0);
            set_text(&document, "best-score", &best.to_string());

            set_visible(&document, "menu", phase == GamePhase::Menu);
            set_visible(
                &document,
                "play-hud",
                matches!(phase, GamePhase::Playing | GamePhase::Paused),
            );
            set_visible(&document, "paused", phase == GamePhase::Paused);
            set_visible(&document, "game-over", phase == GamePhase::Ended);
            set_text(
                &document,
                "pause-btn",
                if phase == GamePhase::Paused { "Resume" } else { "Pause" },
            );

            set_visible(&document, "leaderboard", self.leaderboard_open);
            set_visible(&document, "toast", self.fx_time < self.toast_until);
        }

        fn show_toast(&mut self, document: &Document, title: &str, description: &str) {
            set_text(document, "toast-title", title);
            set_text(document, "toast-description", description);
            self.toast_until = self.fx_time + TOAST_MS;
        }

        fn open_leaderboard(&mut self) {
            self.leaderboard_open = true;
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                self.render_leaderboard(&document);
            }
        }

        /// Rebuild the leaderboard modal contents
        fn render_leaderboard(&self, document: &Document) {
            let current = self.session.score();
            set_visible(document, "leaderboard-current", current > 0);
            set_text(document, "leaderboard-current-score", &current.to_string());

            let board = self.session.leaderboard();
            set_visible(document, "leaderboard-best", board.best() > 0);
            set_text(document, "leaderboard-best-score", &board.best().to_string());

            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            list.set_text_content(None);

            if board.is_empty() {
                if let Some(item) = make_element(document, "li", "leaderboard-empty") {
                    item.set_text_content(Some("No scores yet! Play a game to set your first record."));
                    let _ = list.append_child(&item);
                }
                return;
            }

            for (i, record) in board.top(VIEW_ENTRIES).iter().enumerate() {
                let class = if i == 0 {
                    "leaderboard-entry first"
                } else {
                    "leaderboard-entry"
                };
                let Some(item) = make_element(document, "li", class) else {
                    continue;
                };
                for (text, class) in [
                    ((i + 1).to_string(), "rank"),
                    (record.score.to_string(), "entry-score"),
                    (format_date(&record.date), "entry-date"),
                ] {
                    if let Some(span) = make_element(document, "span", class) {
                        span.set_text_content(Some(&text));
                        let _ = item.append_child(&span);
                    }
                }
                let _ = list.append_child(&item);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn make_element(document: &Document, tag: &str, class: &str) -> Option<Element> {
        let el = document.create_element(tag).ok()?;
        el.set_class_name(class);
        Some(el)
    }

    /// LocalStorage when available, otherwise an in-memory store for this page load
    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), scores will not persist", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Title and meta description
    fn apply_page_metadata(document: &Document) {
        document.set_title(PAGE_TITLE);

        let meta = match document.query_selector("meta[name=\"description\"]").ok().flatten() {
            Some(meta) => Some(meta),
            None => document.create_element("meta").ok().inspect(|meta| {
                let _ = meta.set_attribute("name", "description");
                if let Some(head) = document.query_selector("head").ok().flatten() {
                    let _ = head.append_child(meta);
                }
            }),
        };
        if let Some(meta) = meta {
            let _ = meta.set_attribute("content", PAGE_DESCRIPTION);
        }
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> Viewport {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(0);
        let client_h = canvas.client_height().max(0);
        let width = ((client_w as f64 * dpr) as u32).max(1);
        let height = ((client_h as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        Viewport {
            css: Vec2::new(client_w as f32, client_h as f32),
            physical: (width, height),
            dpr: dpr as f32,
        }
    }

    async fn init_renderer(canvas: &HtmlCanvasElement, viewport: Viewport) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return None;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (width, height) = viewport.physical;
        match RenderState::new(surface, &adapter, width, height, viewport.dpr).await {
            Ok(rs) => Some(rs),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                None
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Reaction Speed starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        apply_page_metadata(&document);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let viewport = fit_canvas(&window, &canvas);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, open_store(), open_store())));

        log::info!("Game initialized with seed: {}", seed);

        let render_state = init_renderer(&canvas, viewport).await;
        if render_state.is_none() {
            log::warn!("Rendering disabled, HUD only");
        }
        {
            let mut g = game.borrow_mut();
            g.render_state = render_state;
            g.apply_viewport(viewport);
            g.render_leaderboard(&document);
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_keyboard(game.clone());
        setup_resize(canvas.clone(), game.clone());
        setup_auto_pause(game.clone());
        setup_page_hide(game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Reaction Speed running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move lights up the dot grid
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().grid.set_pointer(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().grid.clear_pointer();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click: grid shockwave, target hit test
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().click(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, game: &Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::debug!("No #{} button on the page", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut game.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("start-btn", &game, Game::start);
        on_click("play-again-btn", &game, Game::start);
        on_click("pause-btn", &game, |g| {
            g.session.toggle_pause();
        });
        on_click("resume-btn", &game, |g| {
            g.session.resume();
        });
        on_click("restart-btn", &game, |g| g.session.restart());
        on_click("leaderboard-btn", &game, Game::open_leaderboard);
        on_click("view-scores-btn", &game, Game::open_leaderboard);
        on_click("leaderboard-close-btn", &game, |g| g.leaderboard_open = false);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                " " | "Enter" => {
                    if matches!(g.session.phase(), GamePhase::Menu | GamePhase::Ended) {
                        event.prevent_default();
                        g.start();
                    }
                }
                "Escape" if g.leaderboard_open => g.leaderboard_open = false,
                "Escape" | "p" | "P" => {
                    g.session.toggle_pause();
                }
                "r" | "R" => g.session.restart(),
                "q" | "Q" => g.cycle_quality(),
                "m" | "M" => g.toggle_muted(),
                "l" | "L" => {
                    if g.leaderboard_open {
                        g.leaderboard_open = false;
                    } else {
                        g.open_leaderboard();
                    }
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let viewport = fit_canvas(&window, &canvas);
            game.borrow_mut().apply_viewport(viewport);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().session.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow_mut().session.pause() {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop the frame loop when the page goes away, restart it when restored from bfcache
    fn setup_page_hide(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
                if !event.persisted() {
                    return;
                }
                {
                    let mut g = game.borrow_mut();
                    if !g.stopped {
                        return;
                    }
                    g.stopped = false;
                    g.last_time = 0.0;
                }
                log::info!("Frame loop resumed");
                request_animation_frame(game.clone());
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.stopped = true;
            if let (Some(handle), Some(window)) = (g.raf_handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
            log::info!("Frame loop stopped");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let handle_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let handle = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        handle_game.borrow_mut().raf_handle = handle;
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if g.stopped {
                return;
            }
            g.raf_handle = None;

            g.update(time);
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
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reaction Speed (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    autoplay::run(seed, 3);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: a simulated player with random reaction times
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use std::rc::Rc;

    use reaction_speed::leaderboard::{VIEW_ENTRIES, format_date};
    use reaction_speed::persistence::{KeyValueStore, MemoryStore, PersistenceError};
    use reaction_speed::sim::{GamePhase, PlayArea, Session, SessionEvent};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Unix time the demo clock starts at (2024-01-01T00:00:00Z)
    const DEMO_EPOCH_MS: f64 = 1_704_067_200_000.0;

    /// Lets every demo session share one in-memory leaderboard
    struct SharedStore(Rc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), PersistenceError> {
            self.0.remove(key)
        }
    }

    pub fn run(seed: u64, games: u32) {
        let store = Rc::new(MemoryStore::new());
        let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));

        for game in 0..games {
            let mut session = Session::new(
                seed.wrapping_add(game as u64),
                Box::new(SharedStore(store.clone())),
                DEMO_EPOCH_MS + game as f64 * 60_000.0,
            );
            session.set_play_area(Some(PlayArea::new(896.0, 500.0)));
            session.start();

            let mut reaction_ms = player.random_range(180.0..450.0);
            while session.phase() == GamePhase::Playing {
                session.advance(FRAME_MS);

                let Some(target) = session.target() else { continue };
                let waited = session.now_ms() - target.spawned_at_ms;
                if !session.is_target_hit() && waited >= reaction_ms {
                    let pos = target.pos;
                    session.click_at(pos);
                    // Players slow down as the pressure builds
                    reaction_ms = player.random_range(180.0..450.0) + session.score() as f64 * 25.0;
                }
            }

            for event in session.drain_events() {
                if let SessionEvent::GameOver { score, new_best } = event {
                    log::info!(
                        "Game {} over: score {}{}",
                        game + 1,
                        score,
                        if new_best { " (new best!)" } else { "" }
                    );
                }
            }

            if game + 1 == games {
                println!("Leaderboard:");
                for (i, record) in session.leaderboard().top(VIEW_ENTRIES).iter().enumerate() {
                    println!("  {}. {:>3}  {}", i + 1, record.score, format_date(&record.date));
                }
            }
        }
    }
}
