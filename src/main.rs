//! Empanada Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent, MouseEvent};

    use empanada_rush::audio::{AudioManager, SoundEffect};
    use empanada_rush::sim::GamePhase;
    use empanada_rush::{FrameOutcome, Game, HighScores, Intent, Settings, Snapshot};

    /// Browser-side wrapper: the game plus its frame handle and audio
    struct App {
        game: Game,
        audio: AudioManager,
        /// Pending requestAnimationFrame id, if a frame is scheduled
        raf_id: Option<i32>,
        /// This game-over's score has gone to the leaderboard
        score_submitted: bool,
    }

    type Shared = Rc<RefCell<App>>;

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if hidden {
                el.class_list().add_1("hidden")
            } else {
                el.class_list().remove_1("hidden")
            };
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Empanada Rush starting...");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Using seed: {}", seed);

        let mut game = Game::new(seed, settings);
        game.highscores = HighScores::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&game.settings);

        let app = Rc::new(RefCell::new(App {
            game,
            audio,
            raf_id: None,
            score_submitted: false,
        }));

        setup_keyboard(app.clone());
        setup_touch_controls(app.clone());
        setup_menu_buttons(app.clone());
        setup_score_entry(app.clone());
        setup_focus_handling(app.clone());
        setup_teardown(app.clone());

        render(&app.borrow(), now_ms());
        log::info!("Waiting on the start screen");
    }

    fn request_animation_frame(app: Shared) {
        let Some(window) = web_sys::window() else { return };
        let handle = app.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(handle, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => app.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn cancel_animation_frame(app: &mut App) {
        if let Some(id) = app.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn game_loop(app: Shared, time: f64) {
        let outcome = {
            let mut a = app.borrow_mut();
            a.raf_id = None;
            let outcome = a.game.on_frame(time);
            for event in a.game.take_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    a.audio.play(effect);
                }
            }
            render(&a, time);
            outcome
        };

        match outcome {
            FrameOutcome::Continue => request_animation_frame(app),
            FrameOutcome::Stop => log::info!("Frame loop stopped"),
        }
    }

    /// Push the current snapshot into the DOM
    fn render(app: &App, now: f64) {
        let Some(document) = document() else { return };
        let game = &app.game;
        let snapshot = game.snapshot(now);

        set_text(&document, "#hud-score .hud-value", &snapshot.score.to_string());
        set_text(&document, "#hud-lives .hud-value", &"❤️".repeat(snapshot.lives as usize));
        set_text(&document, "#hud-level .hud-value", &snapshot.level.to_string());
        set_text(&document, "#hud-served .hud-value", &snapshot.customers_served.to_string());
        set_hidden(&document, "hud-fps", !game.settings.show_fps);
        set_text(&document, "#hud-fps .hud-value", &game.fps().to_string());
        set_hidden(&document, "touch-controls", !game.settings.touch_controls);

        set_hidden(&document, "start-screen", snapshot.phase != GamePhase::Start);
        set_hidden(&document, "game-over", snapshot.phase != GamePhase::GameOver);
        if snapshot.phase == GamePhase::GameOver {
            set_text(&document, "#final-score", &snapshot.score.to_string());
            set_text(&document, "#final-level", &snapshot.level.to_string());
            set_text(&document, "#final-served", &snapshot.customers_served.to_string());

            // Name entry only for runs that would make the top 10
            let rank = game.highscores.potential_rank(snapshot.score);
            set_hidden(&document, "score-entry", app.score_submitted || rank.is_none());
            if let Some(rank) = rank {
                set_text(&document, "#score-entry .rank", &format!("#{rank}"));
            }
        }

        if let Some(field) = document.get_element_by_id("playfield") {
            let class = if game.settings.mobile_layout { "mobile" } else { "desktop" };
            let _ = field.set_attribute("class", class);
            field.set_inner_html(&playfield_html(&snapshot));
        }
    }

    fn playfield_html(snapshot: &Snapshot) -> String {
        let field = snapshot.playfield;
        let mut html = String::new();

        let pos = field.to_percent(snapshot.player.lane, snapshot.player.x);
        let _ = write!(
            html,
            r#"<div class="player" style="left:{:.2}%;top:{:.2}%">🧑‍🍳</div>"#,
            pos.x, pos.y
        );
        for c in &snapshot.customers {
            let pos = field.to_percent(c.lane, c.x);
            let class = if c.satisfied { "customer satisfied" } else { "customer" };
            let _ = write!(
                html,
                r#"<div class="{}" style="left:{:.2}%;top:{:.2}%">🧍</div>"#,
                class, pos.x, pos.y
            );
        }
        for e in &snapshot.empanadas {
            let pos = field.to_percent(e.lane, e.x);
            let _ = write!(
                html,
                r#"<img class="empanada" src="{}" style="left:{:.2}%;top:{:.2}%">"#,
                e.image, pos.x, pos.y
            );
        }
        for t in &snapshot.tips {
            let pos = field.to_percent(t.lane, t.x);
            let _ = write!(
                html,
                r#"<div class="tip" style="left:{:.2}%;top:{:.2}%;opacity:{:.2}">{}</div>"#,
                pos.x, pos.y, t.opacity, t.emoji
            );
        }
        for f in &snapshot.floating_scores {
            let pos = field.to_percent(f.lane, f.x);
            let _ = write!(
                html,
                concat!(
                    r#"<div class="floating-score" "#,
                    r#"style="left:{:.2}%;top:{:.2}%;--progress:{:.2}">+{}</div>"#
                ),
                pos.x, pos.y, f.progress, f.value
            );
        }
        html
    }

    /// Begin a session from the start or game-over screen
    fn begin(app: &Shared, from_game_over: bool) {
        let started = {
            let mut a = app.borrow_mut();
            let seed = js_sys::Date::now() as u64;
            let now = now_ms();
            a.audio.resume();
            a.score_submitted = false;
            cancel_animation_frame(&mut a);
            if from_game_over {
                a.game.play_again(seed, now)
            } else {
                a.game.start(seed, now)
            }
        };
        if started {
            request_animation_frame(app.clone());
        }
    }

    fn setup_keyboard(app: Shared) {
        let Some(window) = web_sys::window() else { return };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let phase = app.borrow().game.state.phase;
                match (key.as_str(), phase) {
                    ("Enter", GamePhase::Start) => begin(&app, false),
                    ("Escape", _) => app.borrow_mut().game.blur(),
                    ("i" | "I", _) => {
                        let mut a = app.borrow_mut();
                        a.game.idle_mode = !a.game.idle_mode;
                        log::info!("Idle mode: {}", a.game.idle_mode);
                    }
                    _ => {
                        let mut a = app.borrow_mut();
                        if a.game.key_down(&key) {
                            event.prevent_default();
                            if Intent::from_key(&key) == Some(Intent::Throw) {
                                a.audio.play(SoundEffect::Throw);
                            }
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            app.borrow_mut().game.key_up(&event.key());
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// On-screen buttons carry `data-control="up|down|left|right|throw"`
    fn setup_touch_controls(app: Shared) {
        let Some(document) = document() else { return };
        let Ok(buttons) = document.query_selector_all("[data-control]") else {
            return;
        };

        for i in 0..buttons.length() {
            let Some(node) = buttons.item(i) else { continue };
            let Ok(button) = node.dyn_into::<web_sys::Element>() else {
                continue;
            };
            let Some(control) = button.get_attribute("data-control") else {
                continue;
            };

            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                if a.game.control_pressed(&control)
                    && Intent::from_control(&control) == Some(Intent::Throw)
                {
                    a.audio.play(SoundEffect::Throw);
                }
            });
            let _ = button
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(app: Shared) {
        let Some(document) = document() else { return };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                begin(&app, false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                begin(&app, true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.game.back_to_menu() {
                    render(&a, now_ms());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_score_entry(app: Shared) {
        let Some(document) = document() else { return };
        let Some(btn) = document.get_element_by_id("submit-score-btn") else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let name = document
                .get_element_by_id("player-name")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();

            let mut a = app.borrow_mut();
            match a.game.submit_local(&name, js_sys::Date::now()) {
                Ok(submission) => {
                    log::info!("Submitted {} for {}", submission.score, submission.name);
                    a.score_submitted = true;
                    set_hidden(&document, "score-entry", true);
                }
                Err(e) => log::warn!("Score not submitted: {}", e),
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_focus_handling(app: Shared) {
        let Some(window) = web_sys::window() else { return };

        // Window blur: key-up events are lost, so drop held keys
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                a.game.blur();
                if a.game.settings.mute_on_blur {
                    let settings = a.game.settings.clone();
                    a.audio.set_muted(true, &settings);
                }
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut a = app.borrow_mut();
            let settings = a.game.settings.clone();
            a.audio.set_muted(settings.muted, &settings);
        });
        let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Page going away: cancel the pending frame and stop the game for good
    fn setup_teardown(app: Shared) {
        let Some(window) = web_sys::window() else { return };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            cancel_animation_frame(&mut a);
            a.game.teardown();
            a.game.settings.save();
        });
        let _ = window
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use empanada_rush::sim::GamePhase;
    use empanada_rush::{FrameOutcome, Game, Settings, Tuning};

    env_logger::init();
    log::info!("Empanada Rush (native) starting...");
    log::info!("Native mode runs a headless autopilot session - use `trunk serve` to play");

    // empanada-rush [seed] [tuning.json]
    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    let tuning = match args.get(2) {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let mut game = match Game::with_tuning(seed, Settings::load(), tuning) {
        Ok(game) => game,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    game.idle_mode = true;
    game.start(seed, 0.0);

    let mut frame = 0;
    while frame < MAX_FRAMES {
        frame += 1;
        if game.on_frame(frame as f64 * FRAME_MS) == FrameOutcome::Stop {
            break;
        }
        for event in game.take_events() {
            log::debug!("{:?}", event);
        }
    }
    log::info!("Demo ended after {} frames in phase {:?}", frame, game.state.phase);

    if game.state.phase != GamePhase::GameOver {
        game.teardown();
        println!(
            "Autopilot survived: score {} at level {}",
            game.state.score, game.state.level
        );
        return;
    }

    match game
        .submit_local("Autopilot", frame as f64 * FRAME_MS)
        .and_then(|sub| Ok(serde_json::to_string_pretty(&sub)?))
    {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not record demo run: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
