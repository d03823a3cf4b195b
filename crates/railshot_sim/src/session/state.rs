use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleScreen {
    Main,
    Settings,
    Controls,
    LevelSelect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatPhase {
    Idle,
    Locking,
    /// Volley just released; returns to idle after [`FIRING_HOLD`](super::FIRING_HOLD).
    Firing { since: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseScreen {
    Overlay,
    Settings,
    Controls,
}

/// Hierarchical session state, flattened to one enum per top-level state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameState {
    Title(TitleScreen),
    Playing(CombatPhase),
    Paused(PauseScreen),
    GameOver,
    LevelComplete,
}

impl GameState {
    pub fn is_playing(&self) -> bool {
        matches!(self, GameState::Playing(_))
    }

    pub fn is_locking(&self) -> bool {
        matches!(self, GameState::Playing(CombatPhase::Locking))
    }

    /// Dotted state path, e.g. `playing.combat.locking`.
    pub fn path(&self) -> &'static str {
        match self {
            GameState::Title(TitleScreen::Main) => "title.main",
            GameState::Title(TitleScreen::Settings) => "title.settings",
            GameState::Title(TitleScreen::Controls) => "title.controls",
            GameState::Title(TitleScreen::LevelSelect) => "title.levelSelect",
            GameState::Playing(CombatPhase::Idle) => "playing.combat.idle",
            GameState::Playing(CombatPhase::Locking) => "playing.combat.locking",
            GameState::Playing(CombatPhase::Firing { .. }) => "playing.combat.firing",
            GameState::Paused(PauseScreen::Overlay) => "paused.overlay",
            GameState::Paused(PauseScreen::Settings) => "paused.settings",
            GameState::Paused(PauseScreen::Controls) => "paused.controls",
            GameState::GameOver => "gameOver",
            GameState::LevelComplete => "levelComplete",
        }
    }

    /// True when `self` is `prefix` or nested under it (`"playing"` matches every combat phase).
    pub fn matches(&self, prefix: &str) -> bool {
        let path = self.path();
        path == prefix
            || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'.'))
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::Title(TitleScreen::Main)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
