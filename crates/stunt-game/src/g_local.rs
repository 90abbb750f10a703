// g_local.rs — Local definitions for game module

// Re-export shared items so game files can access them via `use crate::g_local::*`
pub use stunt_common::shared::*;
pub use stunt_common::animstate::PlayerAnimState;
pub use crate::game::{EntityState, Solid, CS_NAME, CVAR_LATCH, CVAR_SERVERINFO, SVF_NOCLIENT};

use stunt_common::animstate::Activity;

pub const GAMEVERSION: &str = "stunt";

// edict->spawnflags
pub const SPAWNFLAG_NOT_EASY: i32 = 0x00000100;
pub const SPAWNFLAG_NOT_MEDIUM: i32 = 0x00000200;
pub const SPAWNFLAG_NOT_HARD: i32 = 0x00000400;
pub const SPAWNFLAG_NOT_DEATHMATCH: i32 = 0x00000800;
pub const SPAWNFLAG_NOT_COOP: i32 = 0x00001000;

// edict->flags
bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntityFlags: i32 {
        const ONGROUND = 0x00000001;
        const CLIENT   = 0x00000002;
    }
}
pub const FL_ONGROUND: EntityFlags = EntityFlags::ONGROUND;
pub const FL_CLIENT: EntityFlags = EntityFlags::CLIENT;

pub const FRAMETIME: f32 = 0.1;

pub const MAX_EDICTS: usize = 1024;

// ============================================================
// Level state
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct LevelLocals {
    pub framenum: i32,
    pub time: f32,
    pub level_name: String, // the descriptive name (from worldspawn message)
    pub mapname: String,    // the server name (da_rooftops, etc)
    pub current_entity: i32, // entity index
}

// ============================================================
// Client state
// ============================================================

/// Client data that stays across deaths and level changes.
#[derive(Debug, Clone, Default)]
pub struct ClientPersistant {
    pub netname: String,
    pub connected: bool,
    pub health: i32,
    pub max_health: i32,
}

/// Server-side view of the player's studio model: main sequence position and
/// the pose parameter values the animation state machine writes. The engine
/// samples this when it builds the client frame.
#[derive(Debug, Clone)]
pub struct PlayerModel {
    pub has_data: bool,
    pub cycle: f32,
    pub playback_rate: f32,
    pub main_activity: Option<Activity>,
    pub pose_values: [f32; 4],
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self {
            has_data: false,
            cycle: 0.0,
            playback_rate: 1.0,
            main_activity: None,
            pose_values: [0.0; 4],
        }
    }
}

/// Overlay gesture clips run about a second at 10hz before auto-kill retires them.
pub const GESTURE_FRAMES: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct GestureSlotState {
    pub activity: Option<Activity>,
    pub frames_left: i32,
    pub auto_kill: bool,
}

/// One overlay layer per gesture slot, playing on top of the main sequence.
#[derive(Debug, Clone, Default)]
pub struct GestureSlots {
    pub slots: [GestureSlotState; 2],
}

/// Held weapon stub: activity substitution plus the last viewmodel activity
/// replayed onto it. Enough surface for the animation plumbing.
#[derive(Debug, Clone, Default)]
pub struct HeldWeapon {
    pub override_activity: Option<Activity>,
    pub vm_activity: Option<Activity>,
}

#[derive(Debug, Clone, Default)]
pub struct GClient {
    // Private to game
    pub pers: ClientPersistant,
    pub v_angle: Vec3, // aiming direction

    // Animation
    pub anim: PlayerAnimState,
    pub model: PlayerModel,
    pub gestures: GestureSlots,
    pub weapon: Option<HeldWeapon>,
    pub local_player: bool,

    // Posture flags maintained by the movement code
    pub ducking: bool,
    pub sliding: bool,
    pub rolling: bool,
    pub diving: bool,
    pub prone: bool,
    pub sprinting: bool,

    // Pickup effects
    pub slowmo_seconds: f32,
    pub grenades: i32,
    pub style_points: i32,
}

// ============================================================
// Edict
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct Edict {
    // Server-visible fields (DO NOT reorder)
    pub s: EntityState,
    pub client: Option<usize>, // index into clients array, None if not a player
    pub inuse: bool,
    pub svflags: i32,
    pub mins: Vec3,
    pub maxs: Vec3,
    pub absmin: Vec3,
    pub absmax: Vec3,
    pub size: Vec3,
    pub solid: Solid,

    // Game-private fields
    pub flags: EntityFlags,
    pub model: String,
    pub freetime: f32,
    pub message: String,
    pub classname: String,
    pub spawnflags: i32,
    pub target: String,
    pub targetname: String,

    pub velocity: Vec3,

    pub nextthink: f32,
    // Function callbacks — stored as indices into dispatch tables
    pub think_fn: Option<usize>,
    pub touch_fn: Option<usize>,

    pub health: i32,
    pub max_health: i32,

    pub style: i32,
    pub delay: f32,

    pub waterlevel: i32,
}

// ============================================================
// Game context
// ============================================================

/// Unified game context — all mutable game state, threaded through every
/// game entry point.
pub struct GameCtx {
    // Core state
    pub edicts: Vec<Edict>,
    pub clients: Vec<GClient>,
    pub level: LevelLocals,

    // Counts
    pub num_edicts: i32,
    pub max_edicts: i32,

    // Cvar values (cached as f32 for fast access)
    pub deathmatch: f32,
    pub maxclients: f32,
    pub anim_snap_yaw: f32,
    pub anim_prone: f32,
    pub anim_sprint: f32,
}

/// Convenience alias so every game module can refer to the context as `GameContext`.
pub type GameContext = GameCtx;

impl Default for GameCtx {
    fn default() -> Self {
        Self {
            edicts: Vec::new(),
            clients: Vec::new(),
            level: LevelLocals::default(),
            num_edicts: 0,
            max_edicts: 0,
            deathmatch: 0.0,
            maxclients: 0.0,
            anim_snap_yaw: 0.0,
            anim_prone: 1.0,
            anim_sprint: 0.0,
        }
    }
}
