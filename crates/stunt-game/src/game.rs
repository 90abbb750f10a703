// game.rs — Game module interface visible to the server

use stunt_common::shared::Vec3;

// edict->svflags
pub const SVF_NOCLIENT: i32 = 0x00000001;

// configstring indexes written by the game module
pub const CS_NAME: i32 = 0;

// cvar flags
pub const CVAR_SERVERINFO: i32 = 0x0004; // added to serverinfo when changed
pub const CVAR_LATCH: i32 = 0x0010; // saved until server restart

// edict->solid values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Solid {
    #[default]
    Not = 0,
    Trigger,
    Bbox,
    Bsp,
}

// ============================================================
// Entity state
// ============================================================

/// The part of an edict the server networks to clients.
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    pub number: i32,
    pub origin: Vec3,
    pub angles: Vec3,
    pub old_origin: Vec3,
    pub modelindex: i32,
    pub frame: i32,
    pub skinnum: i32,
    pub effects: u32,
    pub renderfx: i32,
    pub solid: i32,
    pub sound: i32,
    pub event: i32,
}
