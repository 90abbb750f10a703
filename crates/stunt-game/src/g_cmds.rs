// g_cmds.rs — Client command processing

use crate::g_local::*;
use crate::g_powerup::{sp_da_powerup, PowerupKind};
use crate::g_utils::g_spawn;
use crate::game_import::*;

/// Spawn a test powerup 64 units in front of the player's view.
pub fn cmd_test_powerup_f(ctx: &mut GameContext, ent_idx: usize) {
    let client_idx = match ctx.edicts[ent_idx].client {
        Some(c) => c,
        None => return,
    };

    // project from the full view angles, pitch included
    let mut forward = [0.0f32; 3];
    angle_vectors(
        &ctx.clients[client_idx].v_angle,
        Some(&mut forward),
        None,
        None,
    );
    let org = vector_ma(&ctx.edicts[ent_idx].s.origin, 64.0, &forward);

    let pu = g_spawn(ctx);
    ctx.edicts[pu].classname = "da_powerup".to_string();
    ctx.edicts[pu].style = PowerupKind::Health as i32;
    ctx.edicts[pu].delay = 2.0;
    ctx.edicts[pu].s.origin = org;
    sp_da_powerup(ctx, pu);
}

/// Perform a voice command gesture. argv[1] carries the activity id.
pub fn cmd_voice_f(ctx: &mut GameContext, ent_idx: usize, argv: &[&str]) {
    let i: i32 = argv.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);

    if ctx.edicts[ent_idx].health <= 0 {
        return; // dead players don't gesture
    }

    crate::p_client::player_voice_gesture(ctx, ent_idx, i);
}

/// Main client command dispatcher.
pub fn client_command(ctx: &mut GameContext, ent_idx: usize, argv: &[&str], args: &str) {
    if ctx.edicts[ent_idx].client.is_none() {
        return; // not fully in game yet
    }

    let cmd = match argv.first() {
        Some(c) => *c,
        None => return,
    };

    if cmd.eq_ignore_ascii_case("test_powerup") {
        cmd_test_powerup_f(ctx, ent_idx);
    } else if cmd.eq_ignore_ascii_case("voice") {
        cmd_voice_f(ctx, ent_idx, argv);
    } else {
        gi_cprintf(
            ent_idx as i32,
            PRINT_HIGH,
            &format!("Unknown command \"{}\"\n", cmd),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stunt_common::animstate::Activity;

    fn init_test_gi() {
        crate::game_import::set_gi(Box::new(crate::game_import::StubGameImport));
    }

    fn make_ctx(num_clients: usize) -> GameContext {
        init_test_gi();
        let mut ctx = GameContext::default();
        ctx.maxclients = num_clients as f32;
        ctx.max_edicts = MAX_EDICTS as i32;
        ctx.deathmatch = 1.0;
        for _ in 0..=num_clients {
            ctx.edicts.push(Edict::default());
        }
        for _ in 0..num_clients {
            ctx.clients.push(GClient::default());
        }
        ctx.num_edicts = num_clients as i32 + 1;
        ctx
    }

    fn make_single_player_ctx() -> GameContext {
        let mut ctx = make_ctx(1);
        ctx.edicts[1].inuse = true;
        ctx.edicts[1].client = Some(0);
        ctx.edicts[1].flags |= FL_CLIENT;
        ctx.edicts[1].health = 100;
        ctx.edicts[1].max_health = 100;
        ctx.clients[0].pers.connected = true;
        ctx.clients[0].pers.netname = "TestPlayer".to_string();
        ctx.clients[0].model.has_data = true;
        ctx
    }

    fn find_powerup(ctx: &GameContext) -> Option<usize> {
        (0..ctx.num_edicts as usize).find(|&i| ctx.edicts[i].classname == "da_powerup")
    }

    #[test]
    fn test_test_powerup_spawns_in_front() {
        let mut ctx = make_single_player_ctx();
        ctx.edicts[1].s.origin = [10.0, 20.0, 30.0];
        ctx.clients[0].v_angle = [0.0, 90.0, 0.0];

        client_command(&mut ctx, 1, &["test_powerup"], "");

        let pu = find_powerup(&ctx).unwrap();
        let org = ctx.edicts[pu].s.origin;
        assert!((org[0] - 10.0).abs() < 0.001);
        assert!((org[1] - 84.0).abs() < 0.001);
        assert!((org[2] - 30.0).abs() < 0.001);
        assert_eq!(ctx.edicts[pu].style, PowerupKind::Health as i32);
        assert_eq!(ctx.edicts[pu].delay, 2.0);
        assert_eq!(ctx.edicts[pu].solid, Solid::Trigger);
        assert!(ctx.edicts[pu].touch_fn.is_some());
    }

    #[test]
    fn test_test_powerup_projects_pitch() {
        let mut ctx = make_single_player_ctx();
        ctx.edicts[1].s.origin = [0.0, 0.0, 30.0];
        ctx.clients[0].v_angle = [-90.0, 0.0, 0.0]; // looking straight up

        client_command(&mut ctx, 1, &["test_powerup"], "");

        let pu = find_powerup(&ctx).unwrap();
        let org = ctx.edicts[pu].s.origin;
        assert!((org[0] - 0.0).abs() < 0.001);
        assert!((org[1] - 0.0).abs() < 0.001);
        assert!((org[2] - 94.0).abs() < 0.001);
    }

    #[test]
    fn test_command_from_non_client_is_noop() {
        let mut ctx = make_ctx(1);
        ctx.edicts[1].inuse = true; // no client attached
        let before = ctx.num_edicts;
        client_command(&mut ctx, 1, &["test_powerup"], "");
        assert_eq!(ctx.num_edicts, before);
    }

    #[test]
    fn test_unknown_command_is_safe() {
        let mut ctx = make_single_player_ctx();
        let before = ctx.num_edicts;
        client_command(&mut ctx, 1, &["frobnicate"], "");
        assert_eq!(ctx.num_edicts, before);
    }

    #[test]
    fn test_empty_argv_is_noop() {
        let mut ctx = make_single_player_ctx();
        client_command(&mut ctx, 1, &[], "");
    }

    #[test]
    fn test_voice_command_starts_gesture() {
        let mut ctx = make_single_player_ctx();
        let arg = (Activity::Roll as i32).to_string();

        client_command(&mut ctx, 1, &["voice", &arg], "");

        assert_eq!(ctx.clients[0].gestures.slots[0].activity, Some(Activity::Roll));
        assert!(ctx.clients[0].gestures.slots[0].auto_kill);
    }

    #[test]
    fn test_voice_command_dead_player_is_noop() {
        let mut ctx = make_single_player_ctx();
        ctx.edicts[1].health = 0;
        let arg = (Activity::Roll as i32).to_string();

        client_command(&mut ctx, 1, &["voice", &arg], "");

        assert_eq!(ctx.clients[0].gestures.slots[0].activity, None);
    }
}
