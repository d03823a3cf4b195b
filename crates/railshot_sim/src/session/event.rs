use crate::components::PowerUpKind;
use railshot_core::ecs::Entity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsTab {
    #[default]
    Audio,
    Graphics,
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    Keyboard,
    Gamepad,
}

/// Everything the session reacts to: menu navigation from the presentation
/// layer, gameplay intents from the frame driver, and outcomes the systems
/// push through the outbox.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    // Menus
    OpenSettings,
    CloseSettings,
    OpenControls,
    CloseControls,
    OpenLevelSelect,
    GoBack,
    SetTab(SettingsTab),
    StartRebind { action: String, device: InputDevice },
    CancelRebind,
    FinishRebind { key: String },

    // Session flow
    Start,
    Pause,
    Resume,
    Restart,
    LevelComplete,
    GameOver,

    // Combat
    FireStart,
    FireRelease,
    LockTarget(Entity),
    UnlockTarget(Entity),
    Hit { entity: Entity, on_beat: bool },
    Miss,
    PlayerHit { damage: u32 },
    AddScore { points: u64 },
    ResetMultiplier,
    AddOverdrive { amount: u32 },
    ActivateOverdrive,
    ActivateShield,
    CollectPowerUp(PowerUpKind),

    /// End-of-frame clock pulse: expires buffs and runs timed transitions.
    Tick { now: f32 },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::OpenSettings => "OPEN_SETTINGS",
            GameEvent::CloseSettings => "CLOSE_SETTINGS",
            GameEvent::OpenControls => "OPEN_CONTROLS",
            GameEvent::CloseControls => "CLOSE_CONTROLS",
            GameEvent::OpenLevelSelect => "OPEN_LEVEL_SELECT",
            GameEvent::GoBack => "GO_BACK",
            GameEvent::SetTab(_) => "SET_TAB",
            GameEvent::StartRebind { .. } => "START_REBIND",
            GameEvent::CancelRebind => "CANCEL_REBIND",
            GameEvent::FinishRebind { .. } => "FINISH_REBIND",
            GameEvent::Start => "START",
            GameEvent::Pause => "PAUSE",
            GameEvent::Resume => "RESUME",
            GameEvent::Restart => "RESTART",
            GameEvent::LevelComplete => "LEVEL_COMPLETE",
            GameEvent::GameOver => "GAME_OVER",
            GameEvent::FireStart => "FIRE_START",
            GameEvent::FireRelease => "FIRE_RELEASE",
            GameEvent::LockTarget(_) => "LOCK_TARGET",
            GameEvent::UnlockTarget(_) => "UNLOCK_TARGET",
            GameEvent::Hit { .. } => "HIT",
            GameEvent::Miss => "MISS",
            GameEvent::PlayerHit { .. } => "PLAYER_HIT",
            GameEvent::AddScore { .. } => "ADD_SCORE",
            GameEvent::ResetMultiplier => "RESET_MULTIPLIER",
            GameEvent::AddOverdrive { .. } => "ADD_OVERDRIVE",
            GameEvent::ActivateOverdrive => "ACTIVATE_OVERDRIVE",
            GameEvent::ActivateShield => "ACTIVATE_SHIELD",
            GameEvent::CollectPowerUp(_) => "COLLECT_POWER_UP",
            GameEvent::Tick { .. } => "TICK",
        }
    }
}
