// g_spawn.rs — Entity spawning and world initialization

use crate::g_local::*;
use crate::g_powerup::sp_da_powerup;
use crate::g_utils::{g_spawn, g_free_edict};
use crate::game_import::*;
use crate::p_client::sp_info_player_start;

// ============================================================
// Spawn function type and dispatch table
// ============================================================

/// Spawn function signature: takes a mutable game context and entity index.
pub type SpawnFn = fn(ctx: &mut GameContext, ent_idx: usize);

/// A spawn table entry mapping a classname to a spawn function.
pub struct SpawnEntry {
    pub name: &'static str,
    pub spawn: SpawnFn,
}

/// The master spawn table. ED_CallSpawn matches entity classnames against it.
pub static SPAWNS: &[SpawnEntry] = &[
    SpawnEntry { name: "worldspawn", spawn: sp_worldspawn },
    SpawnEntry { name: "info_player_start", spawn: sp_info_player_start },
    SpawnEntry { name: "da_powerup", spawn: sp_da_powerup },
];

// ============================================================
// Field type enum for ED_ParseField
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    LString,
    Vector,
    Int,
    Float,
    AngleHack,
    Ignore,
}

/// Field definition for entity key/value parsing.
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Identifies which field on the edict this maps to.
    pub target: FieldTarget,
}

/// Identifies the destination field for ED_ParseField.
/// In C this was a byte offset; in Rust we use an enum to dispatch safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    EdictClassname,
    EdictModel,
    EdictSpawnflags,
    EdictTarget,
    EdictTargetname,
    EdictMessage,
    EdictDelay,
    EdictStyle,
    EdictHealth,
    EdictLight, // (ignored)
    EdictOrigin,
    EdictAngles,
    EdictAngle,
}

/// The master field definition table for entity key/value pairs.
/// Both "style" and "type" land in `style`; da_powerup reads its kind from there.
pub static FIELDS: &[FieldDef] = &[
    FieldDef { name: "classname",  field_type: FieldType::LString,   target: FieldTarget::EdictClassname },
    FieldDef { name: "model",      field_type: FieldType::LString,   target: FieldTarget::EdictModel },
    FieldDef { name: "spawnflags", field_type: FieldType::Int,       target: FieldTarget::EdictSpawnflags },
    FieldDef { name: "target",     field_type: FieldType::LString,   target: FieldTarget::EdictTarget },
    FieldDef { name: "targetname", field_type: FieldType::LString,   target: FieldTarget::EdictTargetname },
    FieldDef { name: "message",    field_type: FieldType::LString,   target: FieldTarget::EdictMessage },
    FieldDef { name: "delay",      field_type: FieldType::Float,     target: FieldTarget::EdictDelay },
    FieldDef { name: "style",      field_type: FieldType::Int,       target: FieldTarget::EdictStyle },
    FieldDef { name: "type",       field_type: FieldType::Int,       target: FieldTarget::EdictStyle }, // powerup kind
    FieldDef { name: "health",     field_type: FieldType::Int,       target: FieldTarget::EdictHealth },
    FieldDef { name: "light",      field_type: FieldType::Ignore,    target: FieldTarget::EdictLight },
    FieldDef { name: "origin",     field_type: FieldType::Vector,    target: FieldTarget::EdictOrigin },
    FieldDef { name: "angles",     field_type: FieldType::Vector,    target: FieldTarget::EdictAngles },
    FieldDef { name: "angle",      field_type: FieldType::AngleHack, target: FieldTarget::EdictAngle },
];

// ============================================================
// ED_NewString
// ============================================================

/// Allocates a new string, converting '\\n' escape sequences to actual newlines.
pub fn ed_new_string(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(bytes.len());
    let mut i = 0;
    let l = bytes.len();

    while i < l {
        if bytes[i] == b'\\' && i < l - 1 {
            i += 1;
            if bytes[i] == b'n' {
                result.push('\n');
            } else {
                result.push('\\');
            }
        } else {
            result.push(bytes[i] as char);
        }
        i += 1;
    }

    result
}

// ============================================================
// ED_ParseField
// ============================================================

/// Sets a field on an edict from a key/value pair.
/// Field names match case-insensitively.
pub fn ed_parse_field(ctx: &mut GameContext, key: &str, value: &str, ent_idx: usize) {
    let f = match FIELDS.iter().find(|f| f.name.eq_ignore_ascii_case(key)) {
        Some(f) => f,
        None => {
            gi_dprintf(&format!("{} is not a field\n", key));
            return;
        }
    };

    match f.field_type {
        FieldType::LString => {
            let s = ed_new_string(value);
            set_field_string(ctx, f.target, ent_idx, s);
        }
        FieldType::Vector => {
            let vec = parse_vec3(value);
            set_field_vec3(ctx, f.target, ent_idx, vec);
        }
        FieldType::Int => {
            let v: i32 = value.parse().unwrap_or(0);
            set_field_int(ctx, f.target, ent_idx, v);
        }
        FieldType::Float => {
            let v: f32 = value.parse().unwrap_or(0.0);
            set_field_float(ctx, f.target, ent_idx, v);
        }
        FieldType::AngleHack => {
            let v: f32 = value.parse().unwrap_or(0.0);
            // AngleHack sets angles to [0, v, 0]
            set_field_vec3(ctx, f.target, ent_idx, [0.0, v, 0.0]);
        }
        FieldType::Ignore => {}
    }
}

/// Parse a space-separated "x y z" string into [f32; 3].
fn parse_vec3(s: &str) -> [f32; 3] {
    let mut vec = [0.0f32; 3];
    let mut parts = s.split_whitespace();
    if let Some(x) = parts.next() { vec[0] = x.parse().unwrap_or(0.0); }
    if let Some(y) = parts.next() { vec[1] = y.parse().unwrap_or(0.0); }
    if let Some(z) = parts.next() { vec[2] = z.parse().unwrap_or(0.0); }
    vec
}

/// Dispatch a string value to the correct field on the edict.
fn set_field_string(ctx: &mut GameContext, target: FieldTarget, ent_idx: usize, val: String) {
    let ent = &mut ctx.edicts[ent_idx];
    match target {
        FieldTarget::EdictClassname  => ent.classname = val,
        FieldTarget::EdictModel      => ent.model = val,
        FieldTarget::EdictTarget     => ent.target = val,
        FieldTarget::EdictTargetname => ent.targetname = val,
        FieldTarget::EdictMessage    => ent.message = val,
        _ => {}
    }
}

/// Dispatch an int value to the correct field.
fn set_field_int(ctx: &mut GameContext, target: FieldTarget, ent_idx: usize, val: i32) {
    let ent = &mut ctx.edicts[ent_idx];
    match target {
        FieldTarget::EdictSpawnflags => ent.spawnflags = val,
        FieldTarget::EdictStyle      => ent.style = val,
        FieldTarget::EdictHealth     => ent.health = val,
        _ => {}
    }
}

/// Dispatch a float value to the correct field.
fn set_field_float(ctx: &mut GameContext, target: FieldTarget, ent_idx: usize, val: f32) {
    let ent = &mut ctx.edicts[ent_idx];
    match target {
        FieldTarget::EdictDelay => ent.delay = val,
        _ => {}
    }
}

/// Dispatch a vec3 value to the correct field.
fn set_field_vec3(ctx: &mut GameContext, target: FieldTarget, ent_idx: usize, val: [f32; 3]) {
    let ent = &mut ctx.edicts[ent_idx];
    match target {
        FieldTarget::EdictOrigin => ent.s.origin = val,
        FieldTarget::EdictAngles | FieldTarget::EdictAngle => ent.s.angles = val,
        _ => {}
    }
}

// ============================================================
// ED_ParseEdict
// ============================================================

/// Parses an edict out of the given entity string, returning remaining data.
/// `ent_idx` should be a properly initialized empty edict.
pub fn ed_parse_edict(ctx: &mut GameContext, data: &str, ent_idx: usize) -> Option<String> {
    let mut init = false;
    let mut remaining = data;

    // go through all the dictionary pairs
    loop {
        // parse key
        let (com_token, rest) = com_parse(remaining);
        if com_token == "}" {
            break;
        }
        let rest = match rest {
            Some(r) => r,
            None => {
                gi_error("ED_ParseEntity: EOF without closing brace");
                return None;
            }
        };

        let keyname = com_token;

        // parse value
        let (com_token, rest) = com_parse(rest);
        if com_token == "}" {
            gi_error("ED_ParseEntity: closing brace without data");
            return None;
        }
        let rest = match rest {
            Some(r) => r,
            None => {
                gi_error("ED_ParseEntity: EOF without closing brace");
                return None;
            }
        };

        init = true;

        // keynames with a leading underscore are utility comments, discard
        if keyname.starts_with('_') {
            remaining = rest;
            continue;
        }

        ed_parse_field(ctx, &keyname, &com_token, ent_idx);
        remaining = rest;
    }

    if !init {
        ctx.edicts[ent_idx] = Edict::default();
    }

    Some(remaining.to_string())
}

// ============================================================
// ED_CallSpawn
// ============================================================

/// Finds the spawn function for the entity and calls it.
pub fn ed_call_spawn(ctx: &mut GameContext, ent_idx: usize) {
    let classname = ctx.edicts[ent_idx].classname.clone();

    if classname.is_empty() {
        gi_dprintf("ED_CallSpawn: NULL classname\n");
        return;
    }

    for entry in SPAWNS {
        if entry.name == classname {
            (entry.spawn)(ctx, ent_idx);
            return;
        }
    }

    gi_dprintf(&format!("{} doesn't have a spawn function\n", classname));
    g_free_edict(ctx, ent_idx);
}

// ============================================================
// SpawnEntities
// ============================================================

/// Creates a server's entity / program execution context by
/// parsing textual entity definitions out of an ent file.
pub fn spawn_entities(ctx: &mut GameContext, mapname: &str, entities: &str) {
    // Clear level and edicts
    ctx.level = LevelLocals::default();
    for e in ctx.edicts.iter_mut() {
        *e = Edict::default();
    }
    while ctx.edicts.len() < ctx.maxclients as usize + 1 {
        ctx.edicts.push(Edict::default());
    }

    ctx.level.mapname = mapname.to_string();

    // set client fields on player ents
    for i in 0..ctx.maxclients as usize {
        ctx.edicts[i + 1].client = Some(i);
    }

    // world plus reserved client slots
    ctx.num_edicts = ctx.maxclients as i32 + 1;

    let mut first_ent = true;
    let mut inhibit: i32 = 0;
    let mut remaining = entities.to_string();

    // parse ents
    loop {
        // parse the opening brace
        let (com_token, rest) = com_parse(&remaining);
        let rest = match rest {
            Some(r) => r,
            None => {
                if com_token.is_empty() {
                    break;
                }
                if com_token != "{" {
                    gi_error(&format!("ED_LoadFromFile: found {} when expecting {{", com_token));
                    return;
                }
                ""
            }
        };
        if com_token != "{" {
            gi_error(&format!("ED_LoadFromFile: found {} when expecting {{", com_token));
            return;
        }

        let ent_idx;
        if first_ent {
            ent_idx = 0; // world entity
            ctx.edicts[0].inuse = true;
            first_ent = false;
        } else {
            ent_idx = g_spawn(ctx);
        }

        let rest_str = match ed_parse_edict(ctx, rest, ent_idx) {
            Some(s) => s,
            None => break,
        };

        // remove things (except the world) that are not meant for deathmatch
        if ent_idx != 0 {
            if ctx.deathmatch != 0.0
                && (ctx.edicts[ent_idx].spawnflags & SPAWNFLAG_NOT_DEATHMATCH) != 0
            {
                g_free_edict(ctx, ent_idx);
                inhibit += 1;
                remaining = rest_str;
                continue;
            }

            ctx.edicts[ent_idx].spawnflags &= !(SPAWNFLAG_NOT_EASY
                | SPAWNFLAG_NOT_MEDIUM
                | SPAWNFLAG_NOT_HARD
                | SPAWNFLAG_NOT_COOP
                | SPAWNFLAG_NOT_DEATHMATCH);
        }

        ed_call_spawn(ctx, ent_idx);
        remaining = rest_str;
    }

    gi_dprintf(&format!("{} entities inhibited\n", inhibit));
}

// ============================================================
// SP_worldspawn
// ============================================================

/// Only used for the world entity.
/// Sets up the world and makes level data visible to the server.
pub fn sp_worldspawn(ctx: &mut GameContext, ent_idx: usize) {
    ctx.edicts[ent_idx].solid = Solid::Bsp;
    ctx.edicts[ent_idx].inuse = true; // since the world doesn't use G_Spawn()
    ctx.edicts[ent_idx].s.modelindex = 1; // world model is always index 1

    // make some data visible to the server
    let message = ctx.edicts[ent_idx].message.clone();
    if !message.is_empty() {
        gi_configstring(CS_NAME, &message);
        ctx.level.level_name = message;
    } else {
        ctx.level.level_name = ctx.level.mapname.clone();
    }

    gi_cvar_set("sv_gravity", "800");
}
