//! Flight session controller
//!
//! [`Game`] is the session context: it owns the physics engine, the world,
//! the glider, the run accumulators and the progression store, and drives
//! them through `Idle -> Launching -> Flying -> Ended` (with `Ended ->
//! Launching` as the only way back). Presentation pulls state through the
//! accessors and drains [`GameEvent`]s once per frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::effects::FloatingTexts;
use super::interaction::{self, InteractionResult};
use super::physics::{BodyState, PhysicsEngine, SimplePhysics};
use super::player::Player;
use super::state::*;
use super::world::World;
use crate::consts::*;
use crate::platform::KeyValueStore;
use crate::progression::{Progression, UpgradeKind};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Wind and the world draw from separate streams
const WIND_STREAM: u64 = 0x5749_4e44;

pub struct Game<P: PhysicsEngine = SimplePhysics> {
    physics: P,
    world: World,
    player: Option<Player>,
    phase: GamePhase,
    run: RunState,
    progression: Progression,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
    tuning: Tuning,
    viewport: Vec2,
    camera: Camera,
    wind: Wind,
    rng: Pcg32,
    controls: Controls,
    drag: Option<DragGesture>,
    effects: FloatingTexts,
    events: Vec<GameEvent>,
    loop_generation: u64,
}

impl Game<SimplePhysics> {
    /// Session on the built-in physics engine
    pub fn with_simple_physics(
        store: Box<dyn KeyValueStore>,
        tuning: Tuning,
        viewport: Vec2,
        seed: u64,
    ) -> Self {
        Self::new(SimplePhysics::new(), store, tuning, viewport, seed)
    }
}

impl<P: PhysicsEngine> Game<P> {
    /// Build a session. Progression and settings are restored from `store`
    /// (defaults when absent or malformed). The world height is fixed to the
    /// viewport height at creation.
    pub fn new(
        mut physics: P,
        store: Box<dyn KeyValueStore>,
        tuning: Tuning,
        viewport: Vec2,
        seed: u64,
    ) -> Self {
        let progression = Progression::load(store.as_ref());
        let settings = Settings::load(store.as_ref());
        let world = World::new(seed, tuning.world.clone(), viewport, &mut physics);
        log::info!("Session created (seed {seed}, viewport {viewport})");

        Self {
            physics,
            world,
            player: None,
            phase: GamePhase::Idle,
            run: RunState::default(),
            progression,
            store,
            settings,
            tuning,
            viewport,
            camera: Camera::default(),
            wind: Wind::default(),
            rng: Pcg32::seed_from_u64(seed ^ WIND_STREAM),
            controls: Controls::default(),
            drag: None,
            effects: FloatingTexts::default(),
            events: Vec::new(),
            loop_generation: 0,
        }
    }

    fn transition(&mut self, next: GamePhase) -> bool {
        if !self.phase.can_transition_to(next) {
            log::debug!(
                "Ignoring transition {} -> {}",
                self.phase.as_str(),
                next.as_str()
            );
            return false;
        }
        log::info!("Phase {} -> {}", self.phase.as_str(), next.as_str());
        self.phase = next;
        true
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Fresh glider at the start position plus cleared per-run state
    fn prepare_launch(&mut self) {
        if let Some(player) = self.player.take() {
            player.despawn(&mut self.physics);
        }
        let start = Vec2::new(
            PLAYER_START_X,
            self.world.world_height() - PLAYER_START_LIFT,
        );
        self.player = Some(Player::spawn(
            &mut self.physics,
            start,
            self.progression.upgrades(),
        ));
        self.run = RunState::default();
        self.camera = Camera::default();
        self.wind.reset();
        self.controls = Controls::default();
        self.drag = None;
        self.effects.clear();
        self.emit(GameEvent::StateChanged(StateChange::Launching));
    }

    /// Idle -> Launching
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle || !self.transition(GamePhase::Launching) {
            return false;
        }
        self.prepare_launch();
        true
    }

    /// Ended -> Launching, re-rolling the world when the settings ask for it
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::Ended || !self.transition(GamePhase::Launching) {
            return false;
        }
        self.emit(GameEvent::StateChanged(StateChange::Restart));
        if let Some(player) = self.player.take() {
            player.despawn(&mut self.physics);
        }
        if self.settings.regenerate_world_on_restart {
            self.world.reset(&mut self.physics);
        }
        self.prepare_launch();
        true
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        if self.phase == GamePhase::Launching {
            self.drag = Some(DragGesture::new(pos));
        }
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.end = pos;
        }
    }

    /// Finish the drag gesture, launching when it was long enough
    pub fn pointer_up(&mut self, pos: Vec2) -> LaunchOutcome {
        let Some(mut drag) = self.drag.take() else {
            return LaunchOutcome::Ignored;
        };
        if self.phase != GamePhase::Launching {
            return LaunchOutcome::Ignored;
        }
        drag.end = pos;
        match self.launch_velocity(&drag) {
            Some(velocity) => self.launch(velocity),
            None => {
                log::debug!("Discarded short drag ({:.1})", drag.distance());
                LaunchOutcome::Discarded
            }
        }
    }

    /// Drag power before the speed upgrade, capped
    fn drag_power(&self, drag: &DragGesture) -> f32 {
        let flight = &self.tuning.flight;
        (drag.distance() / flight.drag_power_divisor).min(flight.power_cap)
    }

    /// Initial velocity for a drag, or `None` when it is too short
    fn launch_velocity(&self, drag: &DragGesture) -> Option<Vec2> {
        let flight = &self.tuning.flight;
        if drag.distance() < flight.min_drag {
            return None;
        }
        let power = self.drag_power(drag) * self.progression.level(UpgradeKind::Speed) as f32;
        Some(self.constrain_launch(drag.pull() * power * flight.launch_velocity_scale))
    }

    /// Launches always go forward and at least slightly upward
    fn constrain_launch(&self, v: Vec2) -> Vec2 {
        let flight = &self.tuning.flight;
        Vec2::new(v.x.max(flight.min_launch_vx), v.y.min(flight.max_launch_vy))
    }

    /// Launching -> Flying with the glider at `velocity`, constrained to
    /// the forward, upward launch envelope
    pub fn launch(&mut self, velocity: Vec2) -> LaunchOutcome {
        let velocity = self.constrain_launch(velocity);
        let Some(body) = self.player.as_ref().map(Player::body) else {
            return LaunchOutcome::Ignored;
        };
        if self.phase != GamePhase::Launching || !self.transition(GamePhase::Flying) {
            return LaunchOutcome::Ignored;
        }
        self.physics.set_velocity(body, velocity);
        self.run = RunState::default();
        self.drag = None;
        self.loop_generation += 1;
        log::debug!(
            "Launched at {velocity} (loop generation {})",
            self.loop_generation
        );
        self.emit(GameEvent::StateChanged(StateChange::Flying));
        LaunchOutcome::Launched { velocity }
    }

    /// Aim indicator for the drag in progress
    pub fn launch_preview(&self) -> Option<LaunchPreview> {
        if self.phase != GamePhase::Launching {
            return None;
        }
        let drag = self.drag?;
        let velocity = self.launch_velocity(&drag);
        Some(LaunchPreview {
            drag,
            velocity: velocity.unwrap_or(Vec2::ZERO),
            power_fraction: self.drag_power(&drag) / self.tuning.flight.power_cap,
            armed: velocity.is_some(),
        })
    }

    pub fn set_control(&mut self, control: Control, held: bool) {
        self.controls.set(control, held);
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Control(control) => self.set_control(control, true),
            Key::Restart if self.phase == GamePhase::Ended => {
                self.restart();
            }
            Key::Restart => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if let Key::Control(control) = key {
            self.set_control(control, false);
        }
    }

    /// Generation the current tick chain belongs to
    pub fn loop_generation(&self) -> u64 {
        self.loop_generation
    }

    /// Tick on behalf of a scheduler started at `generation`. Stale chains
    /// from an earlier flight are stopped without touching state.
    pub fn tick_generation(&mut self, generation: u64, dt_ms: f32) -> TickOutcome {
        if generation != self.loop_generation {
            return TickOutcome::Stopped;
        }
        self.tick(dt_ms)
    }

    /// Advance one flying tick
    pub fn tick(&mut self, dt_ms: f32) -> TickOutcome {
        if self.phase != GamePhase::Flying {
            return TickOutcome::Stopped;
        }
        let Some(player) = self.player.as_mut() else {
            return TickOutcome::Stopped;
        };
        let body = player.body();
        let dt = dt_ms.clamp(0.0, MAX_STEP_MS);

        self.physics.step(dt);
        let Some(state) = player.state(&self.physics) else {
            log::error!("Glider body missing from physics");
            self.end_flight();
            return TickOutcome::Ended;
        };
        let pos = state.position;

        self.world.ensure_generated_ahead(&mut self.physics, pos.x);
        self.world.update_transients(pos);

        let flight = &self.tuning.flight;
        if self
            .wind
            .update(dt, flight.wind_interval_ms, flight.wind_force, &mut self.rng)
        {
            log::debug!("Wind now {}", self.wind.force);
        }
        self.physics.apply_force(body, pos, self.wind.force);

        player.apply_controls(&self.controls, &mut self.physics);
        player.update(&mut self.physics);
        self.world.apply_fields(&mut self.physics, body);

        let captured =
            interaction::evaluate(&mut self.world, pos, &self.tuning.capture, &mut self.effects);
        self.fold_interaction(captured, &state);

        self.run.decay_multiplier();
        self.effects.tick();

        let target = Camera::target_for(pos, self.viewport);
        self.camera.follow(target, self.tuning.flight.camera_smoothing);

        self.run.record_position(pos, self.world.world_height());
        self.run.money_earned = self.tuning.economy.earnings(
            self.run.distance,
            self.run.altitude,
            self.run.stars_collected,
        );
        self.run.ticks += 1;

        let hud = self.hud();
        self.emit(GameEvent::Hud(hud));

        if self.should_end(&state) {
            self.end_flight();
            return TickOutcome::Ended;
        }
        TickOutcome::Continue
    }

    /// Apply one tick of captures to the run and the glider
    fn fold_interaction(&mut self, captured: InteractionResult, state: &BodyState) {
        if captured.is_empty() {
            return;
        }
        self.run.collect(captured.currency_delta);
        self.run
            .add_multiplier(captured.multiplier_delta, self.tuning.flight.multiplier_ticks);

        if captured.boost_triggered {
            let impulse = self.tuning.flight.boost_impulse;
            if let Some(player) = self.player.as_mut() {
                self.physics.set_velocity(
                    player.body(),
                    state.velocity + Vec2::new(impulse, -impulse * 0.5),
                );
                player.refill_fuel(self.tuning.flight.boost_fuel_refill);
            }
        }
    }

    /// Stopped near the ground, or fallen out of the world
    fn should_end(&self, state: &BodyState) -> bool {
        let flight = &self.tuning.flight;
        let pos = state.position;
        let near_ground = pos.y > self.world.surface_at(pos.x) - flight.ground_proximity;
        let below_world = pos.y > self.world.world_height() + LOWER_BOUNDARY_MARGIN;
        (state.speed() < flight.stop_speed && near_ground) || below_world
    }

    /// Flying -> Ended. Credits the run exactly once; later calls do nothing.
    pub fn end_flight(&mut self) -> bool {
        if self.phase != GamePhase::Flying || !self.transition(GamePhase::Ended) {
            return false;
        }
        self.controls = Controls::default();

        if !self.run.settled {
            self.progression
                .credit(self.run.money_earned, self.store.as_mut());
            self.run.settled = true;
            log::info!(
                "Run settled: {} m, {} m up, {} collected (entity sum {}), earned {}, balance {}",
                self.run.distance,
                self.run.max_altitude,
                self.run.stars_collected,
                self.world.collected_star_value(),
                self.run.money_earned,
                self.progression.balance()
            );
        }

        self.emit(GameEvent::StateChanged(StateChange::GameOver));
        let summary = RunSummary {
            distance: self.run.distance,
            altitude: self.run.max_altitude,
            collected: self.run.stars_collected,
            earned: self.run.money_earned,
            total: self.progression.balance(),
        };
        self.emit(GameEvent::RunSummary(summary));
        true
    }

    /// Buy one upgrade level. Allowed in any phase; takes effect at the next spawn.
    pub fn purchase(&mut self, kind: UpgradeKind) -> bool {
        let cost = self.progression.cost(kind);
        if !self.progression.purchase(kind, self.store.as_mut()) {
            return false;
        }
        let level = self.progression.level(kind);
        self.emit(GameEvent::Purchased { kind, level, cost });
        true
    }

    /// Wipe progression back to defaults
    pub fn reset_progress(&mut self) {
        self.progression.reset(self.store.as_mut());
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> HudData {
        HudData {
            distance: self.run.distance,
            altitude: self.run.altitude,
            balance: self.progression.balance(),
            fuel_fraction: self.player.as_ref().map_or(0.0, Player::fuel_fraction),
            multiplier: self.run.multiplier,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn wind(&self) -> &Wind {
        &self.wind
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_state(&self) -> Option<BodyState> {
        self.player.as_ref()?.state(&self.physics)
    }

    pub fn effects(&self) -> &FloatingTexts {
        &self.effects
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the player's preferences
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(self.store.as_mut());
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Reframe the camera after a resize (the world height stays fixed)
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SAVE_KEY;
    use crate::platform::MemoryStore;
    use crate::sim::physics::BodyHandle;
    use crate::sim::world::CollectibleKind;
    use crate::tuning::WorldTuning;

    fn quiet_tuning() -> Tuning {
        Tuning {
            world: WorldTuning {
                star_chance: 0.0,
                space_star_chance: 0.0,
                crane_base_chance: 0.0,
                crane_max_chance: 0.0,
                thermal_chance: 0.0,
                wind_zone_chance: 0.0,
                shooting_star_chance: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn game_with(store: MemoryStore, tuning: Tuning, seed: u64) -> Game {
        Game::with_simple_physics(Box::new(store), tuning, DEFAULT_VIEWPORT, seed)
    }

    fn fresh_game() -> Game {
        game_with(MemoryStore::new(), Tuning::default(), 42)
    }

    fn drag(game: &mut Game, from: Vec2, to: Vec2) -> LaunchOutcome {
        game.pointer_down(from);
        game.pointer_move((from + to) * 0.5);
        game.pointer_up(to)
    }

    fn launched(mut game: Game) -> Game {
        assert!(game.start());
        let outcome = drag(&mut game, Vec2::new(300.0, 400.0), Vec2::new(200.0, 450.0));
        assert!(matches!(outcome, LaunchOutcome::Launched { .. }));
        game
    }

    #[test]
    fn test_start_spawns_glider() {
        let mut game = fresh_game();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.player().is_none());
        assert_eq!(game.tick(16.0), TickOutcome::Stopped);

        assert!(game.start());
        assert_eq!(game.phase(), GamePhase::Launching);
        let state = game.player_state().unwrap();
        assert_eq!(
            state.position,
            Vec2::new(PLAYER_START_X, DEFAULT_VIEWPORT.y - PLAYER_START_LIFT)
        );
        assert!(!game.start());
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::StateChanged(StateChange::Launching)]
        );
    }

    #[test]
    fn test_short_drag_is_discarded() {
        let mut game = fresh_game();
        // Nothing to release before the launch phase
        assert_eq!(
            drag(&mut game, Vec2::ZERO, Vec2::new(-100.0, 0.0)),
            LaunchOutcome::Ignored
        );

        game.start();
        assert_eq!(
            drag(&mut game, Vec2::new(100.0, 100.0), Vec2::new(80.0, 110.0)),
            LaunchOutcome::Discarded
        );
        assert_eq!(game.phase(), GamePhase::Launching);
        assert!(game.launch_preview().is_none());
        assert_eq!(game.pointer_up(Vec2::ZERO), LaunchOutcome::Ignored);
    }

    #[test]
    fn test_launch_velocity_is_clamped_upward_and_forward() {
        let mut game = fresh_game();
        game.start();
        // Pulling up-right would fire down-left
        let outcome = drag(&mut game, Vec2::new(100.0, 100.0), Vec2::new(200.0, 50.0));
        let LaunchOutcome::Launched { velocity } = outcome else {
            panic!("expected launch, got {outcome:?}");
        };
        assert_eq!(velocity.x, 5.0);
        assert_eq!(velocity.y, -2.0);
        assert_eq!(game.phase(), GamePhase::Flying);
        assert_eq!(game.player_state().unwrap().velocity, velocity);
    }

    #[test]
    fn test_direct_launch_is_constrained() {
        let mut game = fresh_game();
        game.start();
        let outcome = game.launch(Vec2::new(-20.0, 30.0));
        assert_eq!(
            outcome,
            LaunchOutcome::Launched {
                velocity: Vec2::new(5.0, -2.0)
            }
        );
        assert_eq!(game.phase(), GamePhase::Flying);
        assert_eq!(game.player_state().unwrap().velocity, Vec2::new(5.0, -2.0));
    }

    #[test]
    fn test_long_frame_is_clamped_to_max_step() {
        let mut slow = launched(game_with(MemoryStore::new(), Tuning::default(), 7));
        let mut capped = launched(game_with(MemoryStore::new(), Tuning::default(), 7));
        slow.tick(10_000.0);
        capped.tick(MAX_STEP_MS);
        assert_eq!(slow.player_state(), capped.player_state());
        assert_eq!(slow.run(), capped.run());
        assert_eq!(slow.wind(), capped.wind());
    }

    #[test]
    fn test_launch_power_scales_with_speed_level() {
        let store = MemoryStore::with_item(
            SAVE_KEY,
            r#"{"balance":0,"upgradeLevel":{"speed":2,"weight":1,"aero":1,"fuel":0}}"#,
        );
        let mut game = game_with(store, Tuning::default(), 1);
        game.start();
        game.pointer_down(Vec2::new(400.0, 400.0));
        game.pointer_move(Vec2::new(240.0, 480.0));
        let preview = game.launch_preview().unwrap();
        assert!(preview.armed);
        // distance ~178.9 -> power 2.236 of 4
        assert_eq!(preview.power_percent(), 55);
        // pull (160, -80) * (2.236 * 2) * 0.1
        assert!((preview.velocity.x - 71.55).abs() < 0.05);
        assert!((preview.velocity.y + 35.78).abs() < 0.05);
    }

    #[test]
    fn test_settlement_credits_exactly_once() {
        let store = MemoryStore::with_item(SAVE_KEY, r#"{"balance":100}"#);
        let mut game = launched(game_with(store, Tuning::default(), 7));
        game.drain_events();
        game.run.money_earned = 37;

        assert!(game.end_flight());
        assert_eq!(game.progression().balance(), 137);
        assert!(!game.end_flight());
        assert_eq!(game.progression().balance(), 137);
        assert_eq!(game.tick(16.0), TickOutcome::Stopped);
        assert_eq!(game.progression().balance(), 137);

        let events = game.drain_events();
        assert_eq!(events[0], GameEvent::StateChanged(StateChange::GameOver));
        assert!(matches!(
            events[1],
            GameEvent::RunSummary(RunSummary {
                earned: 37,
                total: 137,
                ..
            })
        ));

        // Persisted
        let reloaded = Progression::load(game.store.as_ref());
        assert_eq!(reloaded.balance(), 137);
    }

    #[test]
    fn test_falling_out_of_the_world_ends_regardless_of_speed() {
        let mut game = launched(fresh_game());
        let body = game.player().unwrap().body();
        game.physics.set_velocity(body, Vec2::new(0.0, 1000.0));
        assert_eq!(game.tick(BASE_DELTA_MS), TickOutcome::Ended);
        assert_eq!(game.phase(), GamePhase::Ended);
        assert!(game.player_state().unwrap().speed() > 100.0);
        assert!(game.run().settled);
    }

    #[test]
    fn test_crane_multiplier_lasts_its_timer() {
        let mut tuning = quiet_tuning();
        tuning.capture.crane = 10_000.0;
        let mut game = launched(game_with(MemoryStore::new(), tuning, 3));
        game.world
            .insert_collectible(CollectibleKind::Crane, Vec2::new(400.0, 300.0));
        let body = game.player().unwrap().body();
        let keep_flying = |game: &mut Game| {
            game.physics.set_velocity(body, Vec2::new(10.0, -1.0));
            assert_eq!(game.tick(BASE_DELTA_MS), TickOutcome::Continue);
        };

        keep_flying(&mut game);
        assert_eq!(game.run().multiplier, 3.0);
        assert_eq!(game.run().multiplier_ticks, 299);
        assert_eq!(game.hud().multiplier, 3.0);
        assert_eq!(game.effects().iter().next().unwrap().label, "x2");

        for _ in 0..298 {
            keep_flying(&mut game);
        }
        assert_eq!(game.run().multiplier, 3.0);
        keep_flying(&mut game);
        assert_eq!(game.run().multiplier, 1.0);
    }

    #[test]
    fn test_stars_pay_at_current_multiplier() {
        let mut tuning = quiet_tuning();
        tuning.capture.star = 10_000.0;
        let mut game = launched(game_with(MemoryStore::new(), tuning, 3));
        game.world
            .insert_collectible(CollectibleKind::RareStar, Vec2::new(400.0, 300.0));
        game.run.multiplier = 3.0;
        game.run.multiplier_ticks = 100;
        game.tick(BASE_DELTA_MS);
        assert_eq!(game.run().stars_collected, 60);
        assert!(game.run().money_earned >= 60);
    }

    #[test]
    fn test_stale_loop_generation_is_ignored() {
        let mut game = launched(fresh_game());
        let generation = game.loop_generation();
        assert_eq!(
            game.tick_generation(generation - 1, 16.0),
            TickOutcome::Stopped
        );
        assert_eq!(game.run().ticks, 0);
        assert_eq!(game.tick_generation(generation, 16.0), TickOutcome::Continue);
        assert_eq!(game.run().ticks, 1);

        // A new flight invalidates the previous chain
        game.end_flight();
        game.restart();
        drag(&mut game, Vec2::new(300.0, 400.0), Vec2::new(200.0, 450.0));
        assert_eq!(game.tick_generation(generation, 16.0), TickOutcome::Stopped);
        assert_eq!(game.loop_generation(), generation + 1);
    }

    #[test]
    fn test_restart_key_only_when_ended() {
        let mut game = launched(fresh_game());
        game.key_down(Key::Restart);
        assert_eq!(game.phase(), GamePhase::Flying);
        assert!(!game.restart());

        game.end_flight();
        game.drain_events();
        game.key_down(Key::Restart);
        assert_eq!(game.phase(), GamePhase::Launching);
        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::StateChanged(StateChange::Restart),
                GameEvent::StateChanged(StateChange::Launching),
            ]
        );
        assert_eq!(game.physics().body_count(), game.world().segments().len() + 1);
        assert_eq!(game.run(), &RunState::default());
    }

    #[test]
    fn test_restart_honours_world_regeneration_setting() {
        let terrain = |game: &Game| -> Vec<BodyHandle> {
            game.world().segments().iter().map(|s| s.body).collect()
        };

        let mut game = launched(fresh_game());
        game.set_settings(Settings {
            regenerate_world_on_restart: false,
            ..Settings::default()
        });
        let before = terrain(&game);
        assert!(game.end_flight());
        assert!(game.restart());
        assert_eq!(terrain(&game), before);

        game.set_settings(Settings::default());
        game.pointer_down(Vec2::new(300.0, 400.0));
        game.pointer_up(Vec2::new(200.0, 450.0));
        assert!(game.end_flight());
        assert!(game.restart());
        assert_ne!(terrain(&game), before);
        assert_eq!(game.settings(), &Settings::default());
    }

    #[test]
    fn test_held_controls_follow_keys() {
        let mut game = launched(fresh_game());
        game.key_down(Key::Control(Control::Boost));
        assert!(game.controls().boost);
        game.key_up(Key::Control(Control::Boost));
        assert!(!game.controls().boost);
        game.set_control(Control::PitchUp, true);
        assert!(game.controls().pitch_up);
        game.end_flight();
        assert_eq!(*game.controls(), Controls::default());
    }

    #[test]
    fn test_purchase_emits_event_and_persists() {
        let store = MemoryStore::with_item(SAVE_KEY, r#"{"balance":100}"#);
        let mut game = game_with(store, Tuning::default(), 1);
        assert!(game.purchase(UpgradeKind::Speed));
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::Purchased {
                kind: UpgradeKind::Speed,
                level: 2,
                cost: 50
            }]
        );
        assert_eq!(game.progression().balance(), 50);
        assert!(!game.purchase(UpgradeKind::Fuel));
        assert!(game.drain_events().is_empty());

        game.reset_progress();
        assert_eq!(game.progression(), &Progression::new());
    }

    #[test]
    fn test_hud_reports_run_and_balance() {
        let store = MemoryStore::with_item(SAVE_KEY, r#"{"balance":12}"#);
        let mut game = launched(game_with(store, Tuning::default(), 5));
        game.drain_events();
        game.tick(BASE_DELTA_MS);
        let events = game.drain_events();
        let Some(GameEvent::Hud(hud)) = events.first() else {
            panic!("expected a HUD event, got {events:?}");
        };
        assert_eq!(hud.balance, 12);
        assert_eq!(hud.fuel_fraction, 0.0);
        assert_eq!(hud.distance, game.run().distance);
    }

    #[test]
    fn test_same_seed_same_flight() {
        let fly = || {
            let mut game = launched(game_with(MemoryStore::new(), Tuning::default(), 99));
            game.set_control(Control::PitchUp, true);
            for _ in 0..240 {
                if game.tick(BASE_DELTA_MS) != TickOutcome::Continue {
                    break;
                }
            }
            (game.run().clone(), game.player_state(), game.world().stars().len())
        };
        assert_eq!(fly(), fly());
    }

    #[test]
    fn test_flight_eventually_ends_and_settles() {
        let mut game = launched(fresh_game());
        let mut ticks = 0;
        while game.tick(BASE_DELTA_MS) == TickOutcome::Continue {
            ticks += 1;
            assert!(ticks < 60 * 60 * 10, "flight never ended");
        }
        assert_eq!(game.phase(), GamePhase::Ended);
        assert_eq!(game.progression().balance(), game.run().money_earned);
        assert!(game.run().distance > 0);
    }
}
