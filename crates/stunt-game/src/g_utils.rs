// g_utils.rs — Game utility functions

use crate::g_local::{Edict, EntityFlags, GameContext, Solid, Vec3};
use crate::game_import::*;
use stunt_common::shared::{vector_length, vector_ma, vector_subtract};

/// Sets the entity's bounding box and refreshes its world-space bounds.
/// The engine recomputes absmin/absmax whenever an entity is linked; this
/// keeps them usable between links. Set the origin first.
pub fn g_set_size(ent: &mut Edict, mins: &Vec3, maxs: &Vec3) {
    ent.mins = *mins;
    ent.maxs = *maxs;
    ent.size = vector_subtract(maxs, mins);
    ent.absmin = vector_ma(&ent.s.origin, 1.0, mins);
    ent.absmax = vector_ma(&ent.s.origin, 1.0, maxs);
}

/// Raw edict initialization — no context needed.
pub fn init_edict_raw(e: &mut Edict, index: i32) {
    e.inuse = true;
    e.classname = "noclass".to_string();
    e.s.number = index;
}

/// Core spawn logic — operates on raw edict data, decoupled from any context type.
/// Searches for a free edict or allocates a new one. Returns the edict index.
pub fn spawn_edict_raw(
    edicts: &mut Vec<Edict>,
    maxclients: usize,
    num_edicts: &mut usize,
    max_edicts: usize,
    level_time: f32,
) -> usize {
    // Search for a free entity — avoid reusing recently freed ones
    for i in (maxclients + 1)..*num_edicts {
        if !edicts[i].inuse && (edicts[i].freetime < 2.0 || level_time - edicts[i].freetime > 0.5) {
            edicts[i] = Edict::default();
            init_edict_raw(&mut edicts[i], i as i32);
            return i;
        }
    }

    if *num_edicts >= max_edicts {
        gi_error("ED_Alloc: no free edicts");
    }

    let i = *num_edicts;
    *num_edicts += 1;

    // Ensure edicts vec is large enough
    while edicts.len() <= i {
        edicts.push(Edict::default());
    }

    edicts[i] = Edict::default();
    init_edict_raw(&mut edicts[i], i as i32);
    i
}

/// Core free edict logic — operates on raw edict data, decoupled from any context type.
pub fn free_edict_raw(
    edicts: &mut [Edict],
    ent_idx: usize,
    maxclients: usize,
    level_time: f32,
) {
    gi_unlinkentity(ent_idx as i32);

    if ent_idx <= maxclients {
        return;
    }

    if ent_idx < edicts.len() {
        edicts[ent_idx] = Edict::default();
        edicts[ent_idx].classname = "freed".to_string();
        edicts[ent_idx].freetime = level_time;
        edicts[ent_idx].inuse = false;
    }
}

/// Either finds a free edict, or allocates a new one. Returns the entity index.
///
/// Try to avoid reusing an entity that was recently freed, because it
/// can cause the client to think the entity morphed into something else
/// instead of being removed and recreated, which can cause interpolated
/// angles and bad trails.
pub fn g_spawn(ctx: &mut GameContext) -> usize {
    let mut num = ctx.num_edicts as usize;
    let result = spawn_edict_raw(
        &mut ctx.edicts,
        ctx.maxclients as usize,
        &mut num,
        ctx.max_edicts as usize,
        ctx.level.time,
    );
    ctx.num_edicts = num as i32;
    result
}

/// Marks the edict as free and clears it.
pub fn g_free_edict(ctx: &mut GameContext, ent_idx: usize) {
    free_edict_raw(
        &mut ctx.edicts,
        ent_idx,
        ctx.maxclients as usize,
        ctx.level.time,
    );
}

/// Returns the indices of every in-use entity with all of `flags` set whose
/// origin lies within `radius` units of `origin`.
pub fn g_entities_in_radius(
    ctx: &GameContext,
    origin: &Vec3,
    radius: f32,
    flags: EntityFlags,
) -> Vec<usize> {
    let mut found = Vec::new();
    for i in 0..ctx.num_edicts as usize {
        let ent = &ctx.edicts[i];
        if !ent.inuse || !ent.flags.contains(flags) {
            continue;
        }
        let to_ent = vector_subtract(&ent.s.origin, origin);
        if vector_length(&to_ent) <= radius {
            found.push(i);
        }
    }
    found
}

fn boxes_overlap(amin: &Vec3, amax: &Vec3, bmin: &Vec3, bmax: &Vec3) -> bool {
    for i in 0..3 {
        if amax[i] < bmin[i] || amin[i] > bmax[i] {
            return false;
        }
    }
    true
}

/// Touches all triggers that the entity is in contact with.
pub fn g_touch_triggers(ctx: &mut GameContext, ent_idx: usize) {
    // Dead things don't activate triggers
    {
        let ent = &ctx.edicts[ent_idx];
        if ent.client.is_some() && ent.health <= 0 {
            return;
        }
    }

    // Snapshot the box, touch callbacks may move things
    let absmin = ctx.edicts[ent_idx].absmin;
    let absmax = ctx.edicts[ent_idx].absmax;

    for hit_idx in 0..ctx.num_edicts as usize {
        if hit_idx == ent_idx {
            continue;
        }
        let hit = &ctx.edicts[hit_idx];
        if !hit.inuse || hit.solid != Solid::Trigger || hit.touch_fn.is_none() {
            continue;
        }
        if !boxes_overlap(&absmin, &absmax, &hit.absmin, &hit.absmax) {
            continue;
        }
        crate::dispatch::call_touch(hit_idx, ent_idx, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g_local::FL_CLIENT;

    fn init_test_gi() {
        // OnceLock silently ignores subsequent calls, safe for parallel tests
        crate::game_import::set_gi(Box::new(crate::game_import::StubGameImport));
    }

    fn world_plus(n: usize) -> Vec<Edict> {
        let mut edicts = Vec::new();
        for i in 0..=n {
            let mut e = Edict::default();
            e.inuse = true;
            e.s.number = i as i32;
            edicts.push(e);
        }
        edicts
    }

    #[test]
    fn test_spawn_edict_allocates_new() {
        init_test_gi();
        let mut edicts = world_plus(0);
        let mut num = 1;
        let idx = spawn_edict_raw(&mut edicts, 0, &mut num, 16, 0.0);
        assert_eq!(idx, 1);
        assert_eq!(num, 2);
        assert!(edicts[1].inuse);
        assert_eq!(edicts[1].classname, "noclass");
        assert_eq!(edicts[1].s.number, 1);
    }

    #[test]
    fn test_spawn_edict_skips_recently_freed() {
        init_test_gi();
        let mut edicts = world_plus(1);
        edicts[1].inuse = false;
        edicts[1].freetime = 9.8;
        let mut num = 2;
        // freed 0.2s ago, past the level-start window — must not be reused yet
        let idx = spawn_edict_raw(&mut edicts, 0, &mut num, 16, 10.0);
        assert_eq!(idx, 2);
        assert_eq!(num, 3);
    }

    #[test]
    fn test_spawn_edict_reuses_old_freed_slot() {
        init_test_gi();
        let mut edicts = world_plus(1);
        edicts[1].inuse = false;
        edicts[1].freetime = 5.0;
        let mut num = 2;
        let idx = spawn_edict_raw(&mut edicts, 0, &mut num, 16, 10.0);
        assert_eq!(idx, 1);
        assert_eq!(num, 2);
        assert!(edicts[1].inuse);
    }

    #[test]
    fn test_free_edict_resets_and_stamps() {
        init_test_gi();
        let mut edicts = world_plus(2);
        edicts[2].classname = "da_powerup".to_string();
        free_edict_raw(&mut edicts, 2, 1, 7.5);
        assert!(!edicts[2].inuse);
        assert_eq!(edicts[2].classname, "freed");
        assert_eq!(edicts[2].freetime, 7.5);
    }

    #[test]
    fn test_free_edict_never_frees_client_slots() {
        init_test_gi();
        let mut edicts = world_plus(2);
        edicts[1].classname = "player".to_string();
        free_edict_raw(&mut edicts, 1, 1, 7.5);
        assert!(edicts[1].inuse, "client slot must survive a free");
        assert_eq!(edicts[1].classname, "player");
    }

    #[test]
    fn test_entities_in_radius_filters_flags_and_distance() {
        let mut ctx = GameContext::default();
        ctx.edicts = world_plus(3);
        ctx.edicts[1].flags = FL_CLIENT;
        ctx.edicts[1].s.origin = [50.0, 0.0, 0.0];
        ctx.edicts[2].flags = FL_CLIENT;
        ctx.edicts[2].s.origin = [200.0, 0.0, 0.0];
        ctx.edicts[3].s.origin = [10.0, 0.0, 0.0]; // close but not a client
        ctx.num_edicts = 4;

        let found = g_entities_in_radius(&ctx, &[0.0, 0.0, 0.0], 96.0, FL_CLIENT);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_g_set_size_centers_on_origin() {
        let mut e = Edict::default();
        e.s.origin = [100.0, 0.0, 50.0];
        g_set_size(&mut e, &[-32.0, -32.0, -32.0], &[32.0, 32.0, 32.0]);
        assert_eq!(e.absmin, [68.0, -32.0, 18.0]);
        assert_eq!(e.absmax, [132.0, 32.0, 82.0]);
        assert_eq!(e.size, [64.0, 64.0, 64.0]);
    }

    #[test]
    fn test_boxes_overlap() {
        assert!(boxes_overlap(
            &[-16.0, -16.0, -24.0],
            &[16.0, 16.0, 32.0],
            &[-32.0, -32.0, -32.0],
            &[32.0, 32.0, 32.0],
        ));
        assert!(!boxes_overlap(
            &[100.0, 100.0, 0.0],
            &[132.0, 132.0, 72.0],
            &[-32.0, -32.0, -32.0],
            &[32.0, 32.0, 32.0],
        ));
        // touching faces still count
        assert!(boxes_overlap(
            &[32.0, 0.0, 0.0],
            &[64.0, 16.0, 16.0],
            &[0.0, 0.0, 0.0],
            &[32.0, 32.0, 32.0],
        ));
    }
}
