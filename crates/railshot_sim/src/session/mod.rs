//! Game session state machine.
//!
//! Owns mode (title, playing, paused, game over, level complete) and the
//! run context (score, multiplier, health, overdrive, locks, buffs). All
//! mutation goes through [`GameSession::send`]; a guard that fails leaves
//! state untouched and is not an error.

mod context;
mod event;
mod state;

pub use context::{GameContext, Screen, MAX_HEALTH, MAX_OVERDRIVE};
pub use event::{GameEvent, InputDevice, SettingsTab};
pub use state::{CombatPhase, GameState, PauseScreen, TitleScreen};

use crate::components::PowerUpKind;
use tracing::{debug, info};

/// How long the firing phase blocks a new lock gesture.
pub const FIRING_HOLD: f32 = 0.1;
pub const HIT_POINTS: u64 = 100;
pub const COMBO_WINDOW: f32 = 3.0;
pub const SHIELD_DURATION: f32 = 10.0;
pub const OVERDRIVE_DURATION: f32 = 8.0;
pub const MULTILOCK_DURATION: f32 = 15.0;
pub const MULTILOCK_SLOTS: usize = 16;

#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    context: GameContext,
    base_lock_slots: usize,
    now: f32,
    last_tick: Option<f32>,
    run: u64,
}

impl GameSession {
    pub fn new(max_multiplier: u32, lock_slots: usize) -> Self {
        Self {
            state: GameState::default(),
            context: GameContext::new(max_multiplier, lock_slots),
            base_lock_slots: lock_slots,
            now: 0.0,
            last_tick: None,
            run: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    /// Incremented every time a run starts or restarts.
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Align the session clock with the simulation before events are sent.
    pub fn set_time(&mut self, now: f32) {
        self.now = now;
    }

    /// Process one event. Returns true if it changed state or context.
    pub fn send(&mut self, event: GameEvent) -> bool {
        let before = self.state;
        let handled = match self.state {
            GameState::Title(screen) => self.on_title(screen, &event),
            GameState::Playing(phase) => self.on_playing(phase, &event),
            GameState::Paused(screen) => self.on_paused(screen, &event),
            GameState::GameOver => self.on_game_over(&event),
            GameState::LevelComplete => self.on_level_complete(&event),
        };
        if self.state != before {
            info!(event = event.name(), from = %before, to = %self.state, "session transition");
        } else if handled && !matches!(event, GameEvent::Tick { .. }) {
            debug!(event = event.name(), state = %self.state, "session event");
        }
        handled
    }

    fn enter(&mut self, state: GameState) -> bool {
        self.state = state;
        true
    }

    fn start_run(&mut self) {
        self.context.reset_run(self.base_lock_slots);
        self.last_tick = None;
        self.run += 1;
    }

    fn on_title(&mut self, screen: TitleScreen, event: &GameEvent) -> bool {
        use TitleScreen::*;
        match (screen, event) {
            (Main | LevelSelect, GameEvent::Start) => {
                self.start_run();
                self.context.navigation_stack.clear();
                self.enter(GameState::Playing(CombatPhase::Idle))
            }
            (Main, GameEvent::OpenSettings) => {
                self.context.navigation_stack.push(Screen::Main);
                self.enter(GameState::Title(Settings))
            }
            (Main, GameEvent::OpenLevelSelect) => {
                self.context.navigation_stack.push(Screen::Main);
                self.enter(GameState::Title(LevelSelect))
            }
            (Settings, GameEvent::CloseSettings | GameEvent::GoBack)
            | (LevelSelect, GameEvent::GoBack) => {
                self.context.navigation_stack.pop();
                self.enter(GameState::Title(Main))
            }
            (Settings, GameEvent::OpenControls) => {
                self.context.navigation_stack.push(Screen::Settings);
                self.enter(GameState::Title(Controls))
            }
            (Controls, GameEvent::CloseControls | GameEvent::GoBack) => {
                self.context.navigation_stack.pop();
                self.enter(GameState::Title(Settings))
            }
            (Settings, GameEvent::SetTab(tab)) => self.set_tab(*tab),
            (Controls, _) => self.on_rebind(event),
            _ => false,
        }
    }

    fn on_paused(&mut self, screen: PauseScreen, event: &GameEvent) -> bool {
        use PauseScreen::*;
        match (screen, event) {
            (Overlay, GameEvent::Resume) => self.enter(GameState::Playing(CombatPhase::Idle)),
            (Overlay, GameEvent::Restart) => {
                self.start_run();
                self.enter(GameState::Playing(CombatPhase::Idle))
            }
            (Overlay, GameEvent::OpenSettings) => self.enter(GameState::Paused(Settings)),
            (Overlay, GameEvent::GoBack) => {
                self.context.navigation_stack.clear();
                self.enter(GameState::Title(TitleScreen::Main))
            }
            (Settings, GameEvent::CloseSettings | GameEvent::GoBack) => {
                self.enter(GameState::Paused(Overlay))
            }
            (Settings, GameEvent::OpenControls) => self.enter(GameState::Paused(Controls)),
            (Settings, GameEvent::SetTab(tab)) => self.set_tab(*tab),
            (Controls, GameEvent::CloseControls | GameEvent::GoBack) => {
                self.enter(GameState::Paused(Settings))
            }
            (Controls, _) => self.on_rebind(event),
            _ => false,
        }
    }

    fn on_game_over(&mut self, event: &GameEvent) -> bool {
        match event {
            GameEvent::Restart => {
                self.start_run();
                self.enter(GameState::Playing(CombatPhase::Idle))
            }
            GameEvent::GoBack => {
                self.context.navigation_stack.clear();
                self.enter(GameState::Title(TitleScreen::Main))
            }
            _ => false,
        }
    }

    fn on_level_complete(&mut self, event: &GameEvent) -> bool {
        match event {
            GameEvent::Start => {
                self.start_run();
                self.context.level += 1;
                self.enter(GameState::Playing(CombatPhase::Idle))
            }
            GameEvent::GoBack => {
                self.context.navigation_stack.clear();
                self.enter(GameState::Title(TitleScreen::Main))
            }
            _ => false,
        }
    }

    fn set_tab(&mut self, tab: SettingsTab) -> bool {
        self.context.settings_tab = tab;
        true
    }

    fn on_rebind(&mut self, event: &GameEvent) -> bool {
        match event {
            GameEvent::StartRebind { action, device } => {
                self.context.rebinding_action = Some(action.clone());
                self.context.rebinding_device = Some(*device);
                true
            }
            GameEvent::CancelRebind | GameEvent::FinishRebind { .. } => {
                self.context.rebinding_action = None;
                self.context.rebinding_device = None;
                true
            }
            _ => false,
        }
    }

    fn on_playing(&mut self, phase: CombatPhase, event: &GameEvent) -> bool {
        match event {
            GameEvent::Pause => {
                self.context.is_locking = false;
                self.enter(GameState::Paused(PauseScreen::Overlay))
            }
            GameEvent::GameOver => self.enter(GameState::GameOver),
            GameEvent::LevelComplete => self.enter(GameState::LevelComplete),
            GameEvent::Hit { on_beat, .. } => {
                self.process_hit(*on_beat);
                true
            }
            GameEvent::Miss => {
                self.context.multiplier = 1;
                self.context.combo_timer = 0.0;
                true
            }
            GameEvent::PlayerHit { damage } => self.process_player_hit(*damage),
            GameEvent::AddScore { points } => {
                self.context.score += points * u64::from(self.context.multiplier);
                true
            }
            GameEvent::ResetMultiplier => {
                self.context.multiplier = 1;
                true
            }
            GameEvent::AddOverdrive { amount } => {
                self.context.overdrive = (self.context.overdrive + amount).min(MAX_OVERDRIVE);
                true
            }
            GameEvent::ActivateOverdrive => self.activate_overdrive(),
            GameEvent::ActivateShield => self.activate_shield(),
            GameEvent::CollectPowerUp(kind) => {
                self.collect(*kind);
                true
            }
            GameEvent::Tick { now } => self.tick(phase, *now),
            _ => self.on_combat(phase, event),
        }
    }

    fn on_combat(&mut self, phase: CombatPhase, event: &GameEvent) -> bool {
        match (phase, event) {
            (CombatPhase::Idle, GameEvent::FireStart) => {
                self.context.is_locking = true;
                self.enter(GameState::Playing(CombatPhase::Locking))
            }
            (CombatPhase::Locking, GameEvent::FireRelease) => {
                self.context.is_locking = false;
                self.context.locked_target_ids.clear();
                self.enter(GameState::Playing(CombatPhase::Firing { since: self.now }))
            }
            (CombatPhase::Locking, GameEvent::LockTarget(entity)) => {
                if !self.context.can_lock() || self.context.locked_target_ids.contains(entity) {
                    return false;
                }
                self.context.locked_target_ids.push(*entity);
                true
            }
            (CombatPhase::Locking, GameEvent::UnlockTarget(entity)) => {
                let before = self.context.locked_target_ids.len();
                self.context.locked_target_ids.retain(|id| id != entity);
                self.context.locked_target_ids.len() != before
            }
            _ => false,
        }
    }

    fn process_hit(&mut self, on_beat: bool) {
        let ctx = &mut self.context;
        let bonus = if on_beat { 2 } else { 1 };
        ctx.score += HIT_POINTS * u64::from(ctx.multiplier) * bonus;
        if on_beat {
            ctx.multiplier = (ctx.multiplier + 1).min(ctx.max_multiplier);
        }
        let gain = if on_beat { 5 } else { 2 };
        ctx.overdrive = (ctx.overdrive + gain).min(MAX_OVERDRIVE);
        ctx.combo_timer = COMBO_WINDOW;
    }

    fn process_player_hit(&mut self, damage: u32) -> bool {
        if self.context.shield_active {
            debug!(damage, "hit absorbed by shield");
            return false;
        }
        self.context.health = self.context.health.saturating_sub(damage);
        self.context.multiplier = 1;
        if self.context.health == 0 {
            self.enter(GameState::GameOver);
        }
        true
    }

    fn activate_overdrive(&mut self) -> bool {
        if self.context.overdrive < MAX_OVERDRIVE {
            return false;
        }
        self.context.overdrive = 0;
        self.context.overdrive_active = true;
        self.context.overdrive_end_time = self.now + OVERDRIVE_DURATION;
        self.context.has_stored_overdrive = false;
        info!(until = self.context.overdrive_end_time, "overdrive engaged");
        true
    }

    fn activate_shield(&mut self) -> bool {
        if !self.context.has_stored_shield || self.context.shield_active {
            return false;
        }
        self.context.has_stored_shield = false;
        self.context.shield_active = true;
        self.context.shield_end_time = self.now + SHIELD_DURATION;
        info!(until = self.context.shield_end_time, "shield raised");
        true
    }

    fn collect(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Shield => self.context.has_stored_shield = true,
            PowerUpKind::Overdrive => {
                self.context.overdrive = MAX_OVERDRIVE;
                self.context.has_stored_overdrive = true;
            }
            PowerUpKind::Multilock => {
                self.context.max_lock_slots = MULTILOCK_SLOTS.max(self.base_lock_slots);
                self.context.multilock_end_time = Some(self.now + MULTILOCK_DURATION);
            }
        }
        info!(kind = kind.name(), "power-up collected");
    }

    fn tick(&mut self, phase: CombatPhase, now: f32) -> bool {
        self.now = now;
        let dt = self.last_tick.map_or(0.0, |last| (now - last).max(0.0));
        self.last_tick = Some(now);

        let ctx = &mut self.context;
        ctx.combo_timer = (ctx.combo_timer - dt).max(0.0);

        if ctx.shield_active && now >= ctx.shield_end_time {
            ctx.shield_active = false;
            debug!("shield expired");
        }
        if ctx.overdrive_active && now >= ctx.overdrive_end_time {
            ctx.overdrive_active = false;
            debug!("overdrive expired");
        }
        if ctx.multilock_end_time.is_some_and(|end| now >= end) {
            ctx.multilock_end_time = None;
            ctx.max_lock_slots = self.base_lock_slots;
            debug!("multi-lock expired");
        }

        if let CombatPhase::Firing { since } = phase {
            if now - since >= FIRING_HOLD {
                self.state = GameState::Playing(CombatPhase::Idle);
            }
        }
        true
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(100, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railshot_core::ecs::World;
    use railshot_core::ecs::Entity;

    fn playing() -> GameSession {
        let mut session = GameSession::default();
        assert!(session.send(GameEvent::Start));
        session
    }

    fn handles(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn()).collect()
    }

    fn hit(on_beat: bool) -> GameEvent {
        GameEvent::Hit {
            entity: handles(1)[0],
            on_beat,
        }
    }

    #[test]
    fn start_resets_and_enters_idle() {
        let session = playing();
        assert_eq!(session.state(), GameState::Playing(CombatPhase::Idle));
        let ctx = session.context();
        assert_eq!((ctx.score, ctx.multiplier, ctx.overdrive, ctx.health), (0, 1, 0, 100));
        assert_eq!(session.run(), 1);
    }

    #[test]
    fn on_beat_hits_build_score_and_multiplier() {
        let mut session = playing();
        for _ in 0..3 {
            session.send(hit(true));
        }
        let ctx = session.context();
        assert_eq!(ctx.score, 1200);
        assert_eq!(ctx.multiplier, 4);
        assert_eq!(ctx.overdrive, 15);
        assert_eq!(ctx.combo_timer, COMBO_WINDOW);

        session.send(GameEvent::Miss);
        let ctx = session.context();
        assert_eq!(ctx.multiplier, 1);
        assert_eq!(ctx.combo_timer, 0.0);
        assert_eq!(ctx.score, 1200);
    }

    #[test]
    fn off_beat_hit_scores_without_multiplier_growth() {
        let mut session = playing();
        session.send(hit(false));
        session.send(hit(false));
        let ctx = session.context();
        assert_eq!(ctx.score, 200);
        assert_eq!(ctx.multiplier, 1);
        assert_eq!(ctx.overdrive, 4);
    }

    #[test]
    fn multiplier_is_capped() {
        let mut session = GameSession::new(2, 8);
        session.send(GameEvent::Start);
        for _ in 0..5 {
            session.send(hit(true));
        }
        assert_eq!(session.context().multiplier, 2);
    }

    #[test]
    fn lethal_player_hit_ends_the_run() {
        let mut session = playing();
        session.send(GameEvent::PlayerHit { damage: 95 });
        assert_eq!(session.context().health, 5);
        assert!(session.state().is_playing());

        session.send(GameEvent::PlayerHit { damage: 10 });
        assert_eq!(session.context().health, 0);
        assert_eq!(session.state(), GameState::GameOver);

        session.send(GameEvent::Restart);
        assert_eq!(session.context().health, 100);
        assert_eq!(session.run(), 2);
    }

    #[test]
    fn player_hit_resets_multiplier() {
        let mut session = playing();
        session.send(hit(true));
        session.send(GameEvent::PlayerHit { damage: 10 });
        assert_eq!(session.context().multiplier, 1);
        assert_eq!(session.context().health, 90);
    }

    #[test]
    fn lock_gesture_round_trip() {
        let mut session = playing();
        let targets = handles(10);

        assert!(!session.send(GameEvent::LockTarget(targets[0])));
        session.send(GameEvent::FireStart);
        assert!(session.context().is_locking);

        for &t in &targets {
            session.send(GameEvent::LockTarget(t));
        }
        assert!(!session.send(GameEvent::LockTarget(targets[0])));
        assert_eq!(session.context().locked_target_ids, targets[..8].to_vec());

        session.send(GameEvent::UnlockTarget(targets[3]));
        assert_eq!(session.context().locked_target_ids.len(), 7);

        session.set_time(5.0);
        session.send(GameEvent::FireRelease);
        assert!(matches!(
            session.state(),
            GameState::Playing(CombatPhase::Firing { .. })
        ));
        assert!(session.context().locked_target_ids.is_empty());
        assert!(!session.context().is_locking);
    }

    #[test]
    fn firing_returns_to_idle_after_hold() {
        let mut session = playing();
        session.send(GameEvent::FireStart);
        session.set_time(1.0);
        session.send(GameEvent::FireRelease);

        session.send(GameEvent::Tick { now: 1.05 });
        assert!(!session.send(GameEvent::FireStart));
        session.send(GameEvent::Tick { now: 1.1 });
        assert_eq!(session.state(), GameState::Playing(CombatPhase::Idle));
        assert!(session.send(GameEvent::FireStart));
    }

    #[test]
    fn overdrive_needs_a_full_gauge() {
        let mut session = playing();
        session.send(GameEvent::AddOverdrive { amount: 60 });
        assert!(!session.send(GameEvent::ActivateOverdrive));
        assert_eq!(session.context().overdrive, 60);

        session.send(GameEvent::AddOverdrive { amount: 60 });
        assert_eq!(session.context().overdrive, 100);
        session.set_time(2.0);
        assert!(session.send(GameEvent::ActivateOverdrive));
        assert_eq!(session.context().overdrive, 0);
        assert!(session.context().overdrive_active);

        session.send(GameEvent::Tick { now: 9.9 });
        assert!(session.context().overdrive_active);
        session.send(GameEvent::Tick { now: 10.0 });
        assert!(!session.context().overdrive_active);
    }

    #[test]
    fn stored_shield_absorbs_hits_until_expiry() {
        let mut session = playing();
        assert!(!session.send(GameEvent::ActivateShield));

        session.send(GameEvent::CollectPowerUp(PowerUpKind::Shield));
        assert!(session.context().has_stored_shield);
        session.set_time(1.0);
        assert!(session.send(GameEvent::ActivateShield));

        session.send(GameEvent::PlayerHit { damage: 500 });
        assert_eq!(session.context().health, 100);
        assert!(session.state().is_playing());

        session.send(GameEvent::Tick { now: 11.0 });
        session.send(GameEvent::PlayerHit { damage: 10 });
        assert_eq!(session.context().health, 90);
    }

    #[test]
    fn multilock_widens_lock_slots_temporarily() {
        let mut session = playing();
        session.send(GameEvent::CollectPowerUp(PowerUpKind::Multilock));
        assert_eq!(session.context().max_lock_slots, MULTILOCK_SLOTS);

        session.send(GameEvent::FireStart);
        for t in handles(20) {
            session.send(GameEvent::LockTarget(t));
        }
        assert_eq!(session.context().locked_target_ids.len(), 16);

        session.send(GameEvent::Tick { now: MULTILOCK_DURATION });
        assert_eq!(session.context().max_lock_slots, 8);
    }

    #[test]
    fn collected_overdrive_fills_gauge() {
        let mut session = playing();
        session.send(GameEvent::CollectPowerUp(PowerUpKind::Overdrive));
        assert_eq!(session.context().overdrive, MAX_OVERDRIVE);
        assert!(session.context().has_stored_overdrive);
        assert!(session.send(GameEvent::ActivateOverdrive));
        assert!(!session.context().has_stored_overdrive);
    }

    #[test]
    fn combo_timer_counts_down_on_ticks() {
        let mut session = playing();
        session.send(GameEvent::Tick { now: 0.0 });
        session.send(hit(false));
        session.send(GameEvent::Tick { now: 1.0 });
        assert_eq!(session.context().combo_timer, 2.0);
        session.send(GameEvent::Tick { now: 5.0 });
        assert_eq!(session.context().combo_timer, 0.0);
    }

    #[test]
    fn pause_keeps_context() {
        let mut session = playing();
        session.send(hit(false));
        session.send(GameEvent::Pause);
        assert_eq!(session.state(), GameState::Paused(PauseScreen::Overlay));
        assert!(!session.send(hit(false)));

        session.send(GameEvent::Resume);
        assert_eq!(session.state(), GameState::Playing(CombatPhase::Idle));
        assert_eq!(session.context().score, 100);
        assert_eq!(session.run(), 1);
    }

    #[test]
    fn title_navigation_uses_the_stack() {
        let mut session = GameSession::default();
        session.send(GameEvent::OpenSettings);
        session.send(GameEvent::OpenControls);
        assert_eq!(session.state(), GameState::Title(TitleScreen::Controls));
        assert_eq!(
            session.context().navigation_stack,
            vec![Screen::Main, Screen::Settings]
        );

        session.send(GameEvent::StartRebind {
            action: "fire".into(),
            device: InputDevice::Gamepad,
        });
        assert_eq!(session.context().rebinding_action.as_deref(), Some("fire"));
        session.send(GameEvent::FinishRebind { key: "KeyJ".into() });
        assert!(session.context().rebinding_action.is_none());

        session.send(GameEvent::GoBack);
        session.send(GameEvent::SetTab(SettingsTab::Graphics));
        session.send(GameEvent::GoBack);
        assert_eq!(session.state(), GameState::Title(TitleScreen::Main));
        assert!(session.context().navigation_stack.is_empty());
        assert_eq!(session.context().settings_tab, SettingsTab::Graphics);
    }

    #[test]
    fn paused_menus_leave_the_stack_alone() {
        let mut session = playing();
        session.send(GameEvent::Pause);
        session.send(GameEvent::OpenSettings);
        session.send(GameEvent::OpenControls);
        assert_eq!(session.state(), GameState::Paused(PauseScreen::Controls));
        assert!(session.context().navigation_stack.is_empty());

        session.send(GameEvent::GoBack);
        session.send(GameEvent::GoBack);
        session.send(GameEvent::GoBack);
        assert_eq!(session.state(), GameState::Title(TitleScreen::Main));
    }

    #[test]
    fn level_complete_advances_level() {
        let mut session = playing();
        session.send(GameEvent::AddScore { points: 50 });
        session.send(GameEvent::LevelComplete);
        assert_eq!(session.state(), GameState::LevelComplete);

        session.send(GameEvent::Start);
        assert_eq!(session.context().level, 2);
        assert_eq!(session.context().score, 0);
        assert!(session.state().is_playing());
    }

    #[test]
    fn state_paths_match_prefixes() {
        let state = GameState::Playing(CombatPhase::Locking);
        assert!(state.matches("playing"));
        assert!(state.matches("playing.combat"));
        assert!(!state.matches("play"));
        assert_eq!(state.to_string(), "playing.combat.locking");
    }
}
