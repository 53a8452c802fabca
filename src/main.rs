//! Paper Glide entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use paper_glide::consts::MAX_STEP_MS;
    use paper_glide::platform::{KeyValueStore, LocalStore, MemoryStore};
    use paper_glide::renderer::{CanvasSurface, FrameView, draw_frame};
    use paper_glide::sim::{Game, GameEvent, GamePhase, Key, StateChange, TickOutcome};
    use paper_glide::{Settings, Tuning, UpgradeKind};

    /// Browser-side orchestrator: session, canvas and the frame loop
    struct App {
        game: Game,
        surface: CanvasSurface,
        last_time: f64,
        /// Generation of the running tick chain, if any
        running: Option<u64>,
    }

    impl App {
        /// Advance the simulation for one animation frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                MAX_STEP_MS
            };
            self.last_time = time;

            if self.running.is_none() && self.game.phase() == GamePhase::Flying {
                self.running = Some(self.game.loop_generation());
            }
            if let Some(generation) = self.running {
                if self.game.tick_generation(generation, dt) != TickOutcome::Continue {
                    self.running = None;
                }
            }
        }

        fn render(&mut self) {
            let view = FrameView::of(&self.game);
            draw_frame(&mut self.surface, &view);
        }

        /// Forward drained session events to the DOM
        fn sync_dom(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            for event in self.game.drain_events() {
                match event {
                    GameEvent::Hud(hud) => {
                        set_text(&document, "hud-distance", &format!("{}m", hud.distance));
                        set_text(&document, "hud-altitude", &format!("{}m", hud.altitude));
                        set_text(&document, "hud-money", &format!("${}", hud.balance));
                        set_text(&document, "hud-multiplier", &format!("x{}", hud.multiplier));
                        if let Some(el) = document.get_element_by_id("fuel-fill") {
                            let width = (hud.fuel_fraction * 100.0).round();
                            let _ = el.set_attribute("style", &format!("width: {width}%"));
                        }
                    }
                    GameEvent::StateChanged(StateChange::Launching) => {
                        set_visible(&document, "menu", false);
                        set_visible(&document, "game-over", false);
                        set_visible(&document, "hud", true);
                        set_visible(&document, "launch-hint", true);
                    }
                    GameEvent::StateChanged(StateChange::Flying) => {
                        set_visible(&document, "launch-hint", false);
                    }
                    GameEvent::StateChanged(StateChange::GameOver) => {
                        set_visible(&document, "game-over", true);
                    }
                    GameEvent::StateChanged(StateChange::Restart) => {
                        self.running = None;
                    }
                    GameEvent::RunSummary(summary) => {
                        set_text(&document, "final-distance", &format!("{}m", summary.distance));
                        set_text(&document, "final-altitude", &format!("{}m", summary.altitude));
                        set_text(&document, "final-stars", &summary.collected.to_string());
                        set_text(&document, "final-earned", &format!("${}", summary.earned));
                        set_text(&document, "final-total", &format!("${}", summary.total));
                        self.refresh_shop(&document);
                    }
                    GameEvent::Purchased { .. } => self.refresh_shop(&document),
                }
            }
        }

        fn refresh_shop(&self, document: &Document) {
            let progression = self.game.progression();
            set_text(document, "shop-money", &format!("${}", progression.balance()));
            for kind in UpgradeKind::ALL {
                let name = kind.as_str();
                set_text(document, &format!("level-{name}"), &progression.level(kind).to_string());
                let cost = progression.cost(kind);
                set_text(document, &format!("cost-{name}"), &format!("${cost}"));
                if let Some(btn) = document.get_element_by_id(&format!("upgrade-{name}")) {
                    let class = if progression.can_afford(kind) {
                        "upgrade-btn"
                    } else {
                        "upgrade-btn disabled"
                    };
                    let _ = btn.set_attribute("class", class);
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn resize_canvas(canvas: &HtmlCanvasElement) -> Vec2 {
        let window = web_sys::window().expect("no window");
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1280.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(720.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        Vec2::new(width as f32, height as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Paper Glide starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let viewport = resize_canvas(&canvas);
        let surface = CanvasSurface::new(&canvas).expect("no 2d context");

        let store: Box<dyn KeyValueStore> = match LocalStore::open() {
            Some(store) => Box::new(store),
            None => {
                log::warn!("LocalStorage unavailable, progress will not persist");
                Box::new(MemoryStore::new())
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Game::with_simple_physics(store, Tuning::default(), viewport, seed);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            surface,
            last_time: 0.0,
            running: None,
        }));
        app.borrow().refresh_shop(&document);

        setup_pointer_handlers(&canvas, app.clone());
        setup_touch_handlers(&canvas, app.clone());
        setup_keyboard(app.clone());
        setup_buttons(&document, app.clone());
        setup_resize(&canvas, app.clone());

        set_visible(&document, "menu", true);
        request_animation_frame(app);

        log::info!("Paper Glide running!");
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let handlers: [(&str, fn(&mut Game, Vec2)); 3] = [
            ("mousedown", |game, pos| game.pointer_down(pos)),
            ("mousemove", |game, pos| game.pointer_move(pos)),
            ("mouseup", |game, pos| {
                game.pointer_up(pos);
            }),
        ];
        for (name, handler) in handlers {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                handler(&mut app.borrow_mut().game, pos);
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let handlers: [(&str, fn(&mut Game, Vec2)); 3] = [
            ("touchstart", |game, pos| game.pointer_down(pos)),
            ("touchmove", |game, pos| game.pointer_move(pos)),
            ("touchend", |game, pos| {
                game.pointer_up(pos);
            }),
        ];
        for (name, handler) in handlers {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                // touchend has no active touches left, only changed ones
                let touch = event
                    .touches()
                    .get(0)
                    .or_else(|| event.changed_touches().get(0));
                if let Some(touch) = touch {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let pos = Vec2::new(
                        touch.client_x() as f32 - rect.left() as f32,
                        touch.client_y() as f32 - rect.top() as f32,
                    );
                    handler(&mut app.borrow_mut().game, pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        for name in ["keydown", "keyup"] {
            let app = app.clone();
            let pressed = name == "keydown";
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_name(&event.key()) else {
                    return;
                };
                if matches!(key, Key::Control(_)) {
                    event.prevent_default();
                }
                let mut app = app.borrow_mut();
                if pressed {
                    app.game.key_down(key);
                } else {
                    app.game.key_up(key);
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut app.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        on_click(document, "start-btn", app.clone(), |app| {
            app.game.start();
        });
        on_click(document, "fly-again-btn", app.clone(), |app| {
            app.game.restart();
        });
        on_click(document, "reset-btn", app.clone(), |app| {
            app.game.reset_progress();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                app.refresh_shop(&document);
            }
        });

        let toggles: [(&str, fn(&mut Settings)); 3] = [
            ("toggle-regenerate", |s| {
                s.regenerate_world_on_restart = !s.regenerate_world_on_restart
            }),
            ("toggle-floating-text", |s| s.floating_text = !s.floating_text),
            ("toggle-trails", |s| s.trails = !s.trails),
        ];
        for (id, toggle) in toggles {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let app = app.clone();
            let btn_clone = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut app = app.borrow_mut();
                let mut settings = app.game.settings().clone();
                toggle(&mut settings);
                app.game.set_settings(settings);
                let on = btn_clone.get_attribute("class").as_deref() != Some("toggle on");
                let _ = btn_clone.set_attribute("class", if on { "toggle on" } else { "toggle" });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for kind in UpgradeKind::ALL {
            let Some(btn) = document.get_element_by_id(&format!("upgrade-{}", kind.as_str())) else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if !app.borrow_mut().game.purchase(kind) {
                    log::info!("Not enough money for {}", kind.as_str());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let viewport = resize_canvas(&canvas);
            app.borrow_mut().game.set_viewport(viewport);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut app = app.borrow_mut();
            app.update(time);
            app.render();
            app.sync_dom();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Paper Glide (native) starting...");
    log::info!("Native mode runs a headless demo flight - use `trunk serve` for the web version");

    let tuning_json = std::env::args().nth(1).and_then(|path| {
        match std::fs::read_to_string(&path) {
            Ok(json) => Some(json),
            Err(err) => {
                log::warn!("Cannot read tuning file {path}: {err}");
                None
            }
        }
    });
    let tuning = paper_glide::Tuning::load_or_default(tuning_json.as_deref());

    demo_flight(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fly one scripted run and spend the earnings
#[cfg(not(target_arch = "wasm32"))]
fn demo_flight(tuning: paper_glide::Tuning) {
    use glam::Vec2;
    use paper_glide::UpgradeKind;
    use paper_glide::consts::{BASE_DELTA_MS, DEFAULT_VIEWPORT};
    use paper_glide::platform::MemoryStore;
    use paper_glide::renderer::{FrameView, RecordingSurface, draw_frame};
    use paper_glide::sim::{Game, GameEvent, LaunchOutcome, TickOutcome};

    /// Ten minutes of 60 Hz ticks
    const MAX_TICKS: u32 = 60 * 60 * 10;

    let store = Box::new(MemoryStore::new());
    let mut game = Game::with_simple_physics(store, tuning, DEFAULT_VIEWPORT, 2024);
    game.start();
    game.pointer_down(Vec2::new(300.0, 400.0));
    game.pointer_move(Vec2::new(220.0, 440.0));
    match game.pointer_up(Vec2::new(160.0, 470.0)) {
        LaunchOutcome::Launched { velocity } => log::info!("Launched at {velocity}"),
        other => {
            log::error!("Demo launch failed: {other:?}");
            return;
        }
    }

    let generation = game.loop_generation();
    let mut ticks = 0;
    while ticks < MAX_TICKS
        && game.tick_generation(generation, BASE_DELTA_MS) == TickOutcome::Continue
    {
        ticks += 1;
    }
    if ticks == MAX_TICKS {
        game.end_flight();
    }

    for event in game.drain_events() {
        if let GameEvent::RunSummary(summary) = event {
            log::info!(
                "Run over after {ticks} ticks: {}m far, {}m high, {} collected, earned ${}, balance ${}",
                summary.distance,
                summary.altitude,
                summary.collected,
                summary.earned,
                summary.total
            );
        }
    }

    let mut surface = RecordingSurface::new();
    draw_frame(&mut surface, &FrameView::of(&game));
    log::info!("Final frame: {} draw commands", surface.commands().len());

    for kind in UpgradeKind::ALL {
        while game.purchase(kind) {}
    }
    let progression = game.progression();
    log::info!(
        "Upgrades now {:?}, ${} left",
        progression.upgrades(),
        progression.balance()
    );
}
