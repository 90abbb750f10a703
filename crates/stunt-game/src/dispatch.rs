// dispatch.rs — Callback dispatch system for entity callbacks
//
// Entity callbacks are stored as `Option<usize>` indices into static dispatch
// tables. This avoids the simultaneous mutable borrow problem that would arise
// from storing closures or references directly in Edict fields.

use crate::g_local::GameContext;

// ============================================================
// Type aliases for callback signatures
// ============================================================

pub type ThinkFn = fn(self_idx: usize, ctx: &mut GameContext);
pub type TouchFn = fn(self_idx: usize, other_idx: usize, ctx: &mut GameContext);

// ============================================================
// Named constants — Think callbacks
// ============================================================

pub const THINK_POWERUP_MATERIALIZE: usize = 0;

pub const THINK_TABLE_SIZE: usize = 1;

// ============================================================
// Named constants — Touch callbacks
// ============================================================

pub const TOUCH_POWERUP: usize = 0;

pub const TOUCH_TABLE_SIZE: usize = 1;

// ============================================================
// Placeholders
// ============================================================

fn think_placeholder(self_idx: usize, _ctx: &mut GameContext) {
    // Default fallback for unregistered dispatch table slots — logs a warning.
    crate::game_import::gi_dprintf(&format!(
        "dispatch: unimplemented think callback for edict {}",
        self_idx
    ));
}

fn touch_placeholder(self_idx: usize, _other_idx: usize, _ctx: &mut GameContext) {
    crate::game_import::gi_dprintf(&format!(
        "dispatch: unimplemented touch callback for edict {}",
        self_idx
    ));
}

// ============================================================
// Dispatch tables
// ============================================================

pub static THINK_TABLE: [ThinkFn; THINK_TABLE_SIZE] = {
    let mut table: [ThinkFn; THINK_TABLE_SIZE] = [think_placeholder; THINK_TABLE_SIZE];
    // g_powerup
    table[THINK_POWERUP_MATERIALIZE] = crate::g_powerup::powerup_materialize;
    table
};

pub static TOUCH_TABLE: [TouchFn; TOUCH_TABLE_SIZE] = {
    let mut table: [TouchFn; TOUCH_TABLE_SIZE] = [touch_placeholder; TOUCH_TABLE_SIZE];
    // g_powerup
    table[TOUCH_POWERUP] = crate::g_powerup::powerup_touch;
    table
};

// ============================================================
// Dispatch functions
// ============================================================

/// Dispatch a think callback.
pub fn dispatch_think(idx: usize, self_idx: usize, ctx: &mut GameContext) {
    THINK_TABLE[idx](self_idx, ctx);
}

/// Dispatch a touch callback.
pub fn dispatch_touch(idx: usize, self_idx: usize, other_idx: usize, ctx: &mut GameContext) {
    TOUCH_TABLE[idx](self_idx, other_idx, ctx);
}

// ============================================================
// Call helpers — check the edict's Option<usize> and dispatch
// ============================================================

/// Call the think_fn on an edict if set.
pub fn call_think(self_idx: usize, ctx: &mut GameContext) {
    if let Some(idx) = ctx.edicts[self_idx].think_fn {
        dispatch_think(idx, self_idx, ctx);
    }
}

/// Call the touch_fn on an edict if set.
pub fn call_touch(self_idx: usize, other_idx: usize, ctx: &mut GameContext) {
    if let Some(idx) = ctx.edicts[self_idx].touch_fn {
        dispatch_touch(idx, self_idx, other_idx, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g_local::Edict;

    #[test]
    fn test_think_table_covers_constants() {
        assert_eq!(THINK_TABLE.len(), THINK_TABLE_SIZE);
        assert!(THINK_POWERUP_MATERIALIZE < THINK_TABLE_SIZE);
    }

    #[test]
    fn test_touch_table_covers_constants() {
        assert_eq!(TOUCH_TABLE.len(), TOUCH_TABLE_SIZE);
        assert!(TOUCH_POWERUP < TOUCH_TABLE_SIZE);
    }

    #[test]
    fn test_call_think_without_callback_is_noop() {
        let mut ctx = GameContext::default();
        ctx.edicts.push(Edict::default());
        ctx.num_edicts = 1;
        // no think_fn set — must not dispatch
        call_think(0, &mut ctx);
        assert!(ctx.edicts[0].think_fn.is_none());
    }

    #[test]
    fn test_call_touch_without_callback_is_noop() {
        let mut ctx = GameContext::default();
        ctx.edicts.push(Edict::default());
        ctx.edicts.push(Edict::default());
        ctx.num_edicts = 2;
        call_touch(0, 1, &mut ctx);
        assert!(ctx.edicts[0].touch_fn.is_none());
    }
}
