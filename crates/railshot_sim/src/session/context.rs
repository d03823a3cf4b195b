use super::event::{InputDevice, SettingsTab};
use railshot_core::ecs::Entity;

pub const MAX_HEALTH: u32 = 100;
pub const MAX_OVERDRIVE: u32 = 100;

/// Screens remembered for back-button navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    Settings,
}

/// Session-owned state. Systems never touch it directly; they emit events.
#[derive(Debug, Clone, PartialEq)]
pub struct GameContext {
    // Menus
    pub settings_tab: SettingsTab,
    pub rebinding_action: Option<String>,
    pub rebinding_device: Option<InputDevice>,
    pub navigation_stack: Vec<Screen>,

    // Run
    pub level: u32,
    pub score: u64,
    pub multiplier: u32,
    pub max_multiplier: u32,
    pub overdrive: u32,
    pub locked_target_ids: Vec<Entity>,
    /// Seconds left before the combo display lapses.
    pub combo_timer: f32,
    pub health: u32,
    pub max_health: u32,
    pub is_locking: bool,

    // Power-up buffs
    pub shield_active: bool,
    pub shield_end_time: f32,
    pub has_stored_shield: bool,
    pub overdrive_active: bool,
    pub overdrive_end_time: f32,
    pub has_stored_overdrive: bool,
    pub max_lock_slots: usize,
    pub multilock_end_time: Option<f32>,
}

impl GameContext {
    pub fn new(max_multiplier: u32, lock_slots: usize) -> Self {
        Self {
            settings_tab: SettingsTab::Audio,
            rebinding_action: None,
            rebinding_device: None,
            navigation_stack: Vec::new(),
            level: 1,
            score: 0,
            multiplier: 1,
            max_multiplier,
            overdrive: 0,
            locked_target_ids: Vec::new(),
            combo_timer: 0.0,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            is_locking: false,
            shield_active: false,
            shield_end_time: 0.0,
            has_stored_shield: false,
            overdrive_active: false,
            overdrive_end_time: 0.0,
            has_stored_overdrive: false,
            max_lock_slots: lock_slots,
            multilock_end_time: None,
        }
    }

    /// Back to a fresh run. Level, menus and tuning survive.
    pub(super) fn reset_run(&mut self, base_lock_slots: usize) {
        self.score = 0;
        self.multiplier = 1;
        self.overdrive = 0;
        self.locked_target_ids.clear();
        self.combo_timer = 0.0;
        self.is_locking = false;
        self.health = self.max_health;
        self.shield_active = false;
        self.has_stored_shield = false;
        self.overdrive_active = false;
        self.has_stored_overdrive = false;
        self.max_lock_slots = base_lock_slots;
        self.multilock_end_time = None;
    }

    pub fn can_lock(&self) -> bool {
        self.locked_target_ids.len() < self.max_lock_slots
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(100, 8)
    }
}
