// p_client.rs — Client connection and per-frame player logic

use crate::g_local::*;
use crate::g_utils::{g_set_size, g_touch_triggers};
use crate::game_import::*;
use stunt_common::animstate::{
    Activity, AnimInput, AnimStateConfig, GestureLayer, GestureSlot, ModelRuntime,
    PlayerAnimEvent, WaterLevel, WeaponEvents,
};

// ============================================================
// Animation plumbing
//
// The state machine in stunt-common talks to the model through
// traits; these impls back them with the server-side structs.
// ============================================================

/// Pose parameters the player rig exposes, in slot order.
const POSE_PARAM_NAMES: [&str; 4] = ["move_x", "move_y", "aim_pitch", "aim_yaw"];

impl ModelRuntime for PlayerModel {
    fn has_model_data(&self) -> bool {
        self.has_data
    }

    fn cycle(&self) -> f32 {
        self.cycle
    }

    fn restart_main_sequence(&mut self) {
        self.cycle = 0.0;
    }

    fn set_main_activity(&mut self, activity: Activity) {
        // switching clips restarts them; re-picking the same one doesn't
        if self.main_activity != Some(activity) {
            self.main_activity = Some(activity);
            self.cycle = 0.0;
        }
    }

    fn lookup_pose_parameter(&self, name: &str) -> Option<usize> {
        POSE_PARAM_NAMES.iter().position(|n| *n == name)
    }

    fn set_pose_parameter(&mut self, index: usize, value: f32) {
        if index < self.pose_values.len() {
            self.pose_values[index] = value;
        }
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.playback_rate = rate;
    }
}

impl GestureSlots {
    /// Ticks the overlay clips down and retires the expired ones.
    /// No auto-kill means the clip holds until something replaces it.
    pub fn advance(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.activity.is_none() || !slot.auto_kill {
                continue;
            }
            slot.frames_left -= 1;
            if slot.frames_left <= 0 {
                *slot = GestureSlotState::default();
            }
        }
    }

    pub fn slot_activity(&self, slot: GestureSlot) -> Option<Activity> {
        self.slots[slot as usize].activity
    }
}

impl GestureLayer for GestureSlots {
    fn restart_gesture(&mut self, slot: GestureSlot, activity: Activity, auto_kill: bool) {
        self.slots[slot as usize] = GestureSlotState {
            activity: Some(activity),
            frames_left: GESTURE_FRAMES,
            auto_kill,
        };
    }

    fn is_gesture_slot_active(&self, slot: GestureSlot) -> bool {
        self.slots[slot as usize].activity.is_some()
    }
}

impl WeaponEvents for HeldWeapon {
    fn activity_override(&self, activity: Activity, _eye_fixed: bool) -> Activity {
        self.override_activity.unwrap_or(activity)
    }

    fn replay_animation_event(&mut self, activity: Activity) {
        self.vm_activity = Some(activity);
    }
}

/// Animation tuning, snapshot from the cvar caches.
fn anim_config_from_cvars(ctx: &GameContext) -> AnimStateConfig {
    AnimStateConfig {
        use_prone: ctx.anim_prone != 0.0,
        use_sprint: ctx.anim_sprint != 0.0,
        ..AnimStateConfig::default()
    }
}

/// Builds the per-frame animation input for one player from the entity
/// and client state the rest of the game maintains.
fn anim_input_for(ctx: &GameContext, ent_idx: usize, client_idx: usize) -> AnimInput {
    let ent = &ctx.edicts[ent_idx];
    let client = &ctx.clients[client_idx];

    AnimInput {
        time: ctx.level.time,
        frametime: FRAMETIME,
        eye_yaw: client.v_angle[YAW],
        eye_pitch: client.v_angle[PITCH],
        velocity: ent.velocity,
        on_ground: ent.flags.contains(FL_ONGROUND),
        ducking: client.ducking,
        sliding: client.sliding,
        rolling: client.rolling,
        diving: client.diving,
        prone: client.prone,
        sprinting: client.sprinting,
        water_level: match ent.waterlevel {
            0 => WaterLevel::Dry,
            1 => WaterLevel::Feet,
            2 => WaterLevel::Waist,
            _ => WaterLevel::Eyes,
        },
        alive: ent.health > 0,
        local_player: client.local_player,
        snap_move_yaw: ctx.anim_snap_yaw != 0.0,
    }
}

// ============================================================
// Spawn points
// ============================================================

pub fn sp_info_player_start(ctx: &mut GameContext, self_idx: usize) {
    // a marker, never sent to clients
    ctx.edicts[self_idx].svflags |= SVF_NOCLIENT;
}

/// Picks the spot a connecting player appears at. Falls back to the
/// world origin when the map has no info_player_start.
pub fn select_spawn_point(ctx: &GameContext) -> (Vec3, Vec3) {
    for ent in ctx.edicts.iter().take(ctx.num_edicts as usize) {
        if !ent.inuse || ent.classname != "info_player_start" {
            continue;
        }
        return (ent.s.origin, ent.s.angles);
    }

    gi_dprintf("Couldn't find spawn point, using world origin\n");
    ([0.0; 3], [0.0; 3])
}

// ============================================================
// InitClientPersistant
// ============================================================

/// Resets everything that survives across deaths. The netname stays,
/// it belongs to the connection rather than the life.
pub fn init_client_persistant(ctx: &mut GameContext, client_idx: usize) {
    let netname = std::mem::take(&mut ctx.clients[client_idx].pers.netname);
    ctx.clients[client_idx].pers = ClientPersistant {
        netname,
        connected: true,
        health: 100,
        max_health: 100,
    };
}

// ============================================================
// PutClientInServer
// ============================================================

/// Called when a player connects and on every respawn. Moves the
/// entity to a spawn point and resets all per-life state.
pub fn put_client_in_server(ctx: &mut GameContext, ent_idx: usize) {
    let mins: Vec3 = [-16.0, -16.0, -24.0];
    let maxs: Vec3 = [16.0, 16.0, 32.0];

    // find a spawn point
    let (spawn_origin, spawn_angles) = select_spawn_point(ctx);

    let client_idx = ent_idx - 1;

    // clear everything but the persistant data
    init_client_persistant(ctx, client_idx);
    let saved = ctx.clients[client_idx].pers.clone();
    ctx.clients[client_idx] = GClient::default();
    ctx.clients[client_idx].pers = saved;

    ctx.clients[client_idx].anim = PlayerAnimState::new(anim_config_from_cvars(ctx));
    ctx.clients[client_idx].model.has_data = true;
    ctx.clients[client_idx].v_angle = [0.0, spawn_angles[YAW], 0.0];

    let health = ctx.clients[client_idx].pers.health;
    let max_health = ctx.clients[client_idx].pers.max_health;

    let ent = &mut ctx.edicts[ent_idx];
    ent.inuse = true;
    ent.client = Some(client_idx);
    ent.classname = "player".to_string();
    ent.solid = Solid::Bbox;
    ent.svflags &= !SVF_NOCLIENT;
    ent.flags = FL_CLIENT | FL_ONGROUND;
    ent.health = health;
    ent.max_health = max_health;
    ent.waterlevel = 0;
    ent.velocity = [0.0; 3];

    ent.s.origin = spawn_origin;
    ent.s.old_origin = spawn_origin;
    ent.s.angles = [0.0, spawn_angles[YAW], 0.0];

    g_set_size(ent, &mins, &maxs);

    gi_linkentity(ent_idx as i32);
}

// ============================================================
// ClientBeginServerFrame
// ============================================================

/// Runs at the start of each server frame for each player. Advances
/// the clocks the animation code reads later in the frame.
pub fn client_begin_server_frame(ctx: &mut GameContext, ent_idx: usize) {
    let client_idx = match ctx.edicts[ent_idx].client {
        Some(c) => c,
        None => return,
    };

    {
        let c = &mut ctx.clients[client_idx];

        // the main sequence clock; one-shot clips park at the end
        if c.model.has_data {
            c.model.cycle = (c.model.cycle + FRAMETIME * c.model.playback_rate).min(1.0);
        }

        // overlay layers run on their own clock
        c.gestures.advance();

        // slow motion burns off in real time
        if c.slowmo_seconds > 0.0 {
            c.slowmo_seconds = (c.slowmo_seconds - FRAMETIME).max(0.0);
        }
    }

    g_touch_triggers(ctx, ent_idx);
}

// ============================================================
// ClientEndServerFrame
//
// Called for each player at the end of the server frame,
// after all movement and damage has been added.
// ============================================================

pub fn client_end_server_frame(ctx: &mut GameContext, ent_idx: usize) {
    let client_idx = match ctx.edicts[ent_idx].client {
        Some(c) => c,
        None => return,
    };

    let input = anim_input_for(ctx, ent_idx, client_idx);

    let c = &mut ctx.clients[client_idx];
    c.anim
        .update(&input, &mut c.model, &mut c.gestures, c.weapon.as_ref());

    // set the body angles so the rest of the world sees where the feet
    // point; the eyes are carried separately by the aim pose parameters
    let feet_yaw = c.anim.current_feet_yaw();
    let ent = &mut ctx.edicts[ent_idx];
    ent.s.angles[PITCH] = 0.0;
    ent.s.angles[YAW] = feet_yaw;
    ent.s.angles[ROLL] = 0.0;
}

// ============================================================
// Player events
//
// The movement and combat code flips posture flags and fires
// animation events; these wrappers keep the two in one place.
// ============================================================

/// Routes a discrete animation event into the player's state machine.
pub fn fire_anim_event(ctx: &mut GameContext, ent_idx: usize, event: PlayerAnimEvent, data: i32) {
    let client_idx = match ctx.edicts[ent_idx].client {
        Some(c) => c,
        None => return,
    };

    let input = anim_input_for(ctx, ent_idx, client_idx);

    let c = &mut ctx.clients[client_idx];
    c.anim.do_animation_event(
        event,
        data,
        &input,
        &mut c.model,
        &mut c.gestures,
        c.weapon.as_mut(),
    );
}

pub fn player_begin_slide(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        ctx.clients[ci].sliding = true;
        fire_anim_event(ctx, ent_idx, PlayerAnimEvent::StandToSlide, 0);
    }
}

pub fn player_end_slide(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        // dropping the flag cancels the start clip on the next frame
        ctx.clients[ci].sliding = false;
    }
}

pub fn player_begin_roll(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        ctx.clients[ci].rolling = true;
        fire_anim_event(ctx, ent_idx, PlayerAnimEvent::StandToRoll, 0);
    }
}

pub fn player_end_roll(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        ctx.clients[ci].rolling = false;
    }
}

pub fn player_go_prone(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        let event = if ctx.clients[ci].ducking {
            PlayerAnimEvent::CrouchToProne
        } else {
            PlayerAnimEvent::StandToProne
        };
        ctx.clients[ci].prone = true;
        ctx.clients[ci].ducking = false;
        fire_anim_event(ctx, ent_idx, event, 0);
    }
}

/// Leaves prone into a crouch when the duck flag is held, otherwise
/// back to standing.
pub fn player_leave_prone(ctx: &mut GameContext, ent_idx: usize) {
    if let Some(ci) = ctx.edicts[ent_idx].client {
        let event = if ctx.clients[ci].ducking {
            PlayerAnimEvent::ProneToCrouch
        } else {
            PlayerAnimEvent::ProneToStand
        };
        ctx.clients[ci].prone = false;
        fire_anim_event(ctx, ent_idx, event, 0);
    }
}

pub fn player_jump(ctx: &mut GameContext, ent_idx: usize) {
    ctx.edicts[ent_idx].flags.remove(FL_ONGROUND);
    fire_anim_event(ctx, ent_idx, PlayerAnimEvent::Jump, 0);
}

/// The landing itself is detected by the state machine from the ground
/// flag, once the liftoff guard expires.
pub fn player_land(ctx: &mut GameContext, ent_idx: usize) {
    ctx.edicts[ent_idx].flags.insert(FL_ONGROUND);
}

pub fn player_attack(ctx: &mut GameContext, ent_idx: usize) {
    fire_anim_event(ctx, ent_idx, PlayerAnimEvent::AttackPrimary, 0);
}

pub fn player_reload(ctx: &mut GameContext, ent_idx: usize) {
    fire_anim_event(ctx, ent_idx, PlayerAnimEvent::Reload, 0);
}

/// `data` is the raw activity id of the gesture clip to play.
pub fn player_voice_gesture(ctx: &mut GameContext, ent_idx: usize, data: i32) {
    fire_anim_event(ctx, ent_idx, PlayerAnimEvent::VoiceCommandGesture, data);
}

pub fn player_die(ctx: &mut GameContext, ent_idx: usize) {
    ctx.edicts[ent_idx].health = 0;
    fire_anim_event(ctx, ent_idx, PlayerAnimEvent::Die, 0);
}

/// Heals the player, capped at max_health.
pub fn player_take_health(ctx: &mut GameContext, ent_idx: usize, amount: i32) {
    let ent = &mut ctx.edicts[ent_idx];
    ent.health = (ent.health + amount).min(ent.max_health);
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_gi() {
        // OnceLock silently ignores subsequent calls, safe for parallel tests
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

    fn add_spawn_spot(ctx: &mut GameContext, origin: Vec3, yaw: f32) -> usize {
        let idx = crate::g_utils::g_spawn(ctx);
        ctx.edicts[idx].classname = "info_player_start".to_string();
        ctx.edicts[idx].s.origin = origin;
        ctx.edicts[idx].s.angles = [0.0, yaw, 0.0];
        idx
    }

    fn run_player_frame(ctx: &mut GameContext, ent_idx: usize, time: f32) {
        ctx.level.time = time;
        client_begin_server_frame(ctx, ent_idx);
        client_end_server_frame(ctx, ent_idx);
    }

    #[test]
    fn test_put_client_in_server_uses_spawn_spot() {
        let mut ctx = make_ctx(2);
        add_spawn_spot(&mut ctx, [12.0, 34.0, 24.0], 90.0);

        put_client_in_server(&mut ctx, 1);

        let ent = &ctx.edicts[1];
        assert!(ent.inuse);
        assert_eq!(ent.client, Some(0));
        assert_eq!(ent.classname, "player");
        assert_eq!(ent.solid, Solid::Bbox);
        assert_eq!(ent.s.origin, [12.0, 34.0, 24.0]);
        assert_eq!(ent.s.angles[YAW], 90.0);
        assert_eq!(ent.health, 100);
        assert!(ent.flags.contains(FL_CLIENT));
        assert!(ent.flags.contains(FL_ONGROUND));
        assert_eq!(ent.mins, [-16.0, -16.0, -24.0]);
        assert_eq!(ent.maxs, [16.0, 16.0, 32.0]);

        let c = &ctx.clients[0];
        assert!(c.pers.connected);
        assert_eq!(c.pers.health, 100);
        assert!(c.model.has_data);
        assert_eq!(c.v_angle[YAW], 90.0);
    }

    #[test]
    fn test_put_client_in_server_keeps_netname() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        ctx.clients[0].pers.netname = "Stunter".to_string();

        put_client_in_server(&mut ctx, 1);

        assert_eq!(ctx.clients[0].pers.netname, "Stunter");
    }

    #[test]
    fn test_select_spawn_point_defaults_without_spot() {
        let ctx = make_ctx(1);
        let (origin, angles) = select_spawn_point(&ctx);
        assert_eq!(origin, [0.0, 0.0, 0.0]);
        assert_eq!(angles, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_idle_and_run_activities() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        run_player_frame(&mut ctx, 1, 0.1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::StandIdle)
        );

        ctx.edicts[1].velocity = [200.0, 0.0, 0.0];
        run_player_frame(&mut ctx, 1, 0.2);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::RunIdle)
        );
        // blend vector points straight ahead at 200/320 of run speed
        assert!((ctx.clients[0].model.pose_values[0] - 0.625).abs() < 1e-4);
        assert!(ctx.clients[0].model.pose_values[1].abs() < 1e-4);
    }

    #[test]
    fn test_feet_yaw_snaps_on_first_frame() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 135.0);
        put_client_in_server(&mut ctx, 1);

        run_player_frame(&mut ctx, 1, 0.1);

        // a stationary first frame adopts the eye yaw outright
        assert!((ctx.clients[0].anim.current_feet_yaw() - 135.0).abs() < 1e-4);
        assert!((ctx.edicts[1].s.angles[YAW] - 135.0).abs() < 1e-4);
    }

    #[test]
    fn test_aim_pitch_pose_parameter() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);
        ctx.clients[0].v_angle[PITCH] = -30.0; // looking up

        run_player_frame(&mut ctx, 1, 0.1);

        // the rig's pitch pose runs opposite the view pitch
        assert!((ctx.clients[0].model.pose_values[2] - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_slide_start_plays_once_then_loops() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 0.1;
        player_begin_slide(&mut ctx, 1);
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::SlideStart)
        );

        // start clip finished, the loop takes over
        ctx.clients[0].model.cycle = 0.995;
        ctx.level.time = 0.2;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::Slide)
        );

        player_end_slide(&mut ctx, 1);
        ctx.level.time = 0.3;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::StandIdle)
        );
    }

    #[test]
    fn test_roll_cancels_when_flag_drops() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 0.1;
        player_begin_roll(&mut ctx, 1);
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::Roll)
        );

        // flag drops mid-clip, the roll is abandoned immediately
        player_end_roll(&mut ctx, 1);
        ctx.level.time = 0.2;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::StandIdle)
        );
    }

    #[test]
    fn test_jump_waits_out_landing_guard() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 1.0;
        player_jump(&mut ctx, 1);
        assert!(!ctx.edicts[1].flags.contains(FL_ONGROUND));
        assert!(ctx.clients[0].anim.is_jumping());

        // the ground flag can lag a jump; the guard window ignores it
        player_land(&mut ctx, 1);

        ctx.level.time = 1.1;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::JumpStart)
        );
        assert!(ctx.clients[0]
            .gestures
            .slot_activity(GestureSlot::Jump)
            .is_none());

        // guard expired and grounded: land once, then fall through to idle
        ctx.level.time = 1.35;
        client_end_server_frame(&mut ctx, 1);
        assert!(!ctx.clients[0].anim.is_jumping());
        assert_eq!(
            ctx.clients[0].gestures.slot_activity(GestureSlot::Jump),
            Some(Activity::JumpLand)
        );
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::StandIdle)
        );

        // no second landing on later frames
        ctx.clients[0].gestures.slots[GestureSlot::Jump as usize] = GestureSlotState::default();
        ctx.level.time = 1.45;
        client_end_server_frame(&mut ctx, 1);
        assert!(ctx.clients[0]
            .gestures
            .slot_activity(GestureSlot::Jump)
            .is_none());
    }

    #[test]
    fn test_jump_floats_after_half_second() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 1.0;
        player_jump(&mut ctx, 1);

        ctx.level.time = 1.2;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::JumpStart)
        );

        ctx.level.time = 1.6;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::JumpFloat)
        );
    }

    #[test]
    fn test_attack_gesture_posture_and_ttl() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 0.1;
        player_attack(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0]
                .gestures
                .slot_activity(GestureSlot::AttackAndReload),
            Some(Activity::PrimaryAttack)
        );

        // burns off once the countdown runs out
        for _ in 0..GESTURE_FRAMES {
            ctx.clients[0].gestures.advance();
        }
        assert!(ctx.clients[0]
            .gestures
            .slot_activity(GestureSlot::AttackAndReload)
            .is_none());

        // crouched attacks pick the crouch clip
        ctx.clients[0].ducking = true;
        player_attack(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0]
                .gestures
                .slot_activity(GestureSlot::AttackAndReload),
            Some(Activity::PrimaryAttackCrouch)
        );
    }

    #[test]
    fn test_reload_gesture_follows_posture() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.clients[0].prone = true;
        player_reload(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0]
                .gestures
                .slot_activity(GestureSlot::AttackAndReload),
            Some(Activity::ReloadProne)
        );
    }

    #[test]
    fn test_voice_gesture_blocked_while_attacking() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        player_attack(&mut ctx, 1);
        player_voice_gesture(&mut ctx, 1, Activity::Roll as i32);

        // the attack clip keeps the slot
        assert_eq!(
            ctx.clients[0]
                .gestures
                .slot_activity(GestureSlot::AttackAndReload),
            Some(Activity::PrimaryAttack)
        );

        // an unknown id is logged and dropped
        ctx.clients[0].gestures.slots[GestureSlot::AttackAndReload as usize] =
            GestureSlotState::default();
        player_voice_gesture(&mut ctx, 1, 999);
        assert!(ctx.clients[0]
            .gestures
            .slot_activity(GestureSlot::AttackAndReload)
            .is_none());
    }

    #[test]
    fn test_prone_transition_plays_out() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 0.1;
        player_go_prone(&mut ctx, 1);
        assert!(ctx.clients[0].prone);
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::StandToProne)
        );

        // transition finished, the chest idle holds
        ctx.clients[0].model.cycle = 0.995;
        ctx.level.time = 0.2;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::ProneChestIdle)
        );

        player_leave_prone(&mut ctx, 1);
        assert!(!ctx.clients[0].prone);
        ctx.level.time = 0.3;
        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::ProneToStand)
        );
    }

    #[test]
    fn test_crouch_to_prone_clears_duck() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.clients[0].ducking = true;
        ctx.level.time = 0.1;
        player_go_prone(&mut ctx, 1);
        assert!(ctx.clients[0].prone);
        assert!(!ctx.clients[0].ducking);

        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::CrouchToProne)
        );
    }

    #[test]
    fn test_die_plays_death_and_keeps_animating() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.level.time = 0.5;
        player_die(&mut ctx, 1);
        assert_eq!(ctx.edicts[1].health, 0);
        assert!(ctx.clients[0].anim.is_dying());

        client_end_server_frame(&mut ctx, 1);
        assert_eq!(
            ctx.clients[0].anim.current_main_activity(),
            Some(Activity::DieSimple)
        );
    }

    #[test]
    fn test_take_health_caps_at_max() {
        let mut ctx = make_ctx(1);
        ctx.edicts[1].health = 40;
        ctx.edicts[1].max_health = 100;

        player_take_health(&mut ctx, 1, 100);
        assert_eq!(ctx.edicts[1].health, 100);

        player_take_health(&mut ctx, 1, 25);
        assert_eq!(ctx.edicts[1].health, 100);
    }

    #[test]
    fn test_local_player_playback_pinned() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.clients[0].local_player = true;
        ctx.clients[0].model.playback_rate = 0.25;

        run_player_frame(&mut ctx, 1, 0.1);
        assert_eq!(ctx.clients[0].model.playback_rate, 1.0);
    }

    #[test]
    fn test_begin_frame_advances_model_and_slowmo() {
        let mut ctx = make_ctx(1);
        add_spawn_spot(&mut ctx, [0.0; 3], 0.0);
        put_client_in_server(&mut ctx, 1);

        ctx.clients[0].slowmo_seconds = 0.15;
        client_begin_server_frame(&mut ctx, 1);
        assert!((ctx.clients[0].model.cycle - 0.1).abs() < 1e-6);
        assert!((ctx.clients[0].slowmo_seconds - 0.05).abs() < 1e-6);

        client_begin_server_frame(&mut ctx, 1);
        assert_eq!(ctx.clients[0].slowmo_seconds, 0.0);
    }
}
