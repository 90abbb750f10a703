// g_main.rs — Game main entry point and frame logic

use crate::g_local::*;
use crate::game_import::*;

// ============================================================
// InitGame
// ============================================================

/// Called once when the game module is loaded. Registers cvars and
/// allocates the world entity plus one reserved edict per client slot.
pub fn init_game(ctx: &mut GameContext) {
    gi_dprintf("==== InitGame ====\n");

    gi_cvar("gamename", GAMEVERSION, CVAR_SERVERINFO | CVAR_LATCH);

    // latched vars
    ctx.maxclients = gi_cvar("maxclients", "4", CVAR_SERVERINFO | CVAR_LATCH);
    ctx.deathmatch = gi_cvar("deathmatch", "1", CVAR_LATCH);

    // animation tuning
    ctx.anim_snap_yaw = gi_cvar("anim_snap_yaw", "0", 0);
    ctx.anim_prone = gi_cvar("anim_prone", "1", 0);
    ctx.anim_sprint = gi_cvar("anim_sprint", "0", 0);

    // initialize all entities and clients for this game
    ctx.edicts.clear();
    ctx.edicts
        .resize(ctx.maxclients as usize + 1, Edict::default());
    ctx.clients.clear();
    ctx.clients
        .resize(ctx.maxclients as usize, GClient::default());

    ctx.num_edicts = ctx.maxclients as i32 + 1;
    ctx.max_edicts = MAX_EDICTS as i32;
}

// ============================================================
// ShutdownGame
// ============================================================

pub fn shutdown_game(_ctx: &mut GameContext) {
    gi_dprintf("==== ShutdownGame ====\n");
}

// ============================================================
// ClientEndServerFrames
// ============================================================

pub fn client_end_server_frames(ctx: &mut GameContext) {
    // run the animation state machines now that all movement
    // and damage has been added
    let max = ctx.maxclients as i32;
    for i in 0..max {
        let ent_idx = (1 + i) as usize;
        if ent_idx >= ctx.edicts.len() {
            continue;
        }
        if !ctx.edicts[ent_idx].inuse || ctx.edicts[ent_idx].client.is_none() {
            continue;
        }
        crate::p_client::client_end_server_frame(ctx, ent_idx);
    }
}

// ============================================================
// SV_RunThink
// ============================================================

/// Runs entity thinking. Returns false if the entity thought this frame.
pub fn sv_run_think(ctx: &mut GameContext, ent_idx: usize) -> bool {
    let thinktime = ctx.edicts[ent_idx].nextthink;
    if thinktime <= 0.0 {
        return true;
    }
    if thinktime > ctx.level.time + 0.001 {
        return true;
    }

    ctx.edicts[ent_idx].nextthink = 0.0;
    if ctx.edicts[ent_idx].think_fn.is_none() {
        gi_error("NULL ent->think");
        return true;
    }
    crate::dispatch::call_think(ent_idx, ctx);

    false
}

// ============================================================
// G_RunEntity
// ============================================================

/// Advances a non-client entity one frame. With no movers in the mod
/// this is just the think schedule.
pub fn g_run_entity(ctx: &mut GameContext, ent_idx: usize) {
    sv_run_think(ctx, ent_idx);
}

// ============================================================
// G_RunFrame
//
// Advances the world by 0.1 seconds.
// ============================================================

pub fn g_run_frame(ctx: &mut GameContext) {
    ctx.level.framenum += 1;
    ctx.level.time = ctx.level.framenum as f32 * FRAMETIME;

    //
    // treat each object in turn
    // even the world gets a chance to think
    //
    let num_edicts = ctx.num_edicts as usize;
    let maxclients = ctx.maxclients as i32;

    for i in 0..num_edicts {
        if i >= ctx.edicts.len() {
            break;
        }
        if !ctx.edicts[i].inuse {
            continue;
        }

        ctx.level.current_entity = i as i32;
        ctx.edicts[i].s.old_origin = ctx.edicts[i].s.origin;

        if i > 0 && (i as i32) <= maxclients {
            crate::p_client::client_begin_server_frame(ctx, i);
            continue;
        }

        g_run_entity(ctx, i);
    }

    // build the final animation state for all players
    client_end_server_frames(ctx);
}
