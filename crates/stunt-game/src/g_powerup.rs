// g_powerup.rs — da_powerup pickup entity

use crate::dispatch::{THINK_POWERUP_MATERIALIZE, TOUCH_POWERUP};
use crate::g_local::*;
use crate::g_utils::{g_entities_in_radius, g_free_edict, g_set_size};
use crate::game_import::*;

/// Pickup effect kinds. The "type" map key stores the raw value in the
/// entity's `style` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PowerupKind {
    Health = 0,
    Regen,
    Rambo,
    Slowmo,
    Grenade,
}

impl PowerupKind {
    pub fn from_raw(raw: i32) -> Option<PowerupKind> {
        match raw {
            0 => Some(PowerupKind::Health),
            1 => Some(PowerupKind::Regen),
            2 => Some(PowerupKind::Rambo),
            3 => Some(PowerupKind::Slowmo),
            4 => Some(PowerupKind::Grenade),
            _ => None,
        }
    }
}

// One visual per kind; they all share the placeholder mesh for now.
pub const POWERUP_MODELS: [&str; 5] = ["models/gibs/airboat_broken_engine.mdl"; 5];

/// Players this close to a grabbed pickup get notified about it.
pub const PICKUP_NOTIFY_RADIUS: f32 = 96.0;

/// Style credit for grabbing a pickup.
pub const STYLE_REWARD_STYLISH: i32 = 1;

/// Announcement shown to the taker of a grab.
pub const ANNOUNCE_STYLISH: &str = "Stylish!\n";

/// Spawn function for `da_powerup`. A kind outside the known range is fatal
/// to the entity, not the process.
pub fn sp_da_powerup(ctx: &mut GameContext, ent_idx: usize) {
    let kind = match PowerupKind::from_raw(ctx.edicts[ent_idx].style) {
        Some(kind) => kind,
        None => {
            gi_dprintf("Bad powerup type; removing...\n");
            g_free_edict(ctx, ent_idx);
            return;
        }
    };

    gi_modelindex(POWERUP_MODELS[kind as usize]);
    powerup_materialize(ent_idx, ctx);
}

/// Think callback: the cooldown expired, put the pickup back in the world
/// solid-as-trigger and visible.
pub fn powerup_materialize(self_idx: usize, ctx: &mut GameContext) {
    gi_setmodel(self_idx as i32, POWERUP_MODELS[ctx.edicts[self_idx].style as usize]);

    let ent = &mut ctx.edicts[self_idx];
    ent.svflags &= !SVF_NOCLIENT;
    ent.solid = Solid::Trigger;
    g_set_size(ent, &[-32.0, -32.0, -32.0], &[32.0, 32.0, 32.0]);

    ent.think_fn = None;
    ent.nextthink = 0.0;
    ent.touch_fn = Some(TOUCH_POWERUP);

    gi_linkentity(self_idx as i32);
}

/// Touch callback: grant the pickup's effect to a touching player, notify
/// everyone nearby, then go dark until the cooldown expires.
pub fn powerup_touch(self_idx: usize, other_idx: usize, ctx: &mut GameContext) {
    if ctx.edicts[other_idx].client.is_none() {
        return;
    }

    // Everyone nearby hears about the grab; the taker gets the style credit.
    let origin = ctx.edicts[self_idx].s.origin;
    for near_idx in g_entities_in_radius(ctx, &origin, PICKUP_NOTIFY_RADIUS, FL_CLIENT) {
        if near_idx != other_idx {
            // denied notice for bystanders stays off until product direction lands
        } else if let Some(ci) = ctx.edicts[near_idx].client {
            ctx.clients[ci].style_points += STYLE_REWARD_STYLISH;
            gi_centerprintf(near_idx as i32, ANNOUNCE_STYLISH);
        }
    }

    // Impart the pickup bonus
    match PowerupKind::from_raw(ctx.edicts[self_idx].style) {
        Some(PowerupKind::Health) => crate::p_client::player_take_health(ctx, other_idx, 100),
        Some(PowerupKind::Regen) => gi_dprintf("Regen\n"),
        Some(PowerupKind::Rambo) => gi_dprintf("Sambo mode\n"),
        Some(PowerupKind::Slowmo) => {
            if let Some(ci) = ctx.edicts[other_idx].client {
                ctx.clients[ci].slowmo_seconds += 5.0;
            }
        }
        Some(PowerupKind::Grenade) => {
            if let Some(ci) = ctx.edicts[other_idx].client {
                ctx.clients[ci].grenades += 1;
            }
        }
        None => {} // spawn validated the kind, can't get here
    }

    // Go inactive until the respawn timer expires
    let level_time = ctx.level.time;
    let ent = &mut ctx.edicts[self_idx];
    ent.svflags |= SVF_NOCLIENT;
    ent.solid = Solid::Not;
    ent.touch_fn = None;
    ent.think_fn = Some(THINK_POWERUP_MATERIALIZE);
    ent.nextthink = level_time + ent.delay;

    gi_linkentity(self_idx as i32);
}
