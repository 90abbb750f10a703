//! Game import interface — functions provided by the engine to the game module.
//!
//! The engine hands the game module a table of callbacks when the module is
//! loaded. We mirror this with a global static that is set once at game init
//! time via `set_gi()`.

use std::sync::OnceLock;

/// Global game import interface, set once by the engine at load time.
static GI: OnceLock<Box<dyn GameImport + Send + Sync>> = OnceLock::new();

/// Set the global game import interface. Called once during game init.
pub fn set_gi(gi: Box<dyn GameImport + Send + Sync>) {
    let _ = GI.set(gi);
}

/// Get a reference to the global game import interface.
fn gi() -> &'static dyn GameImport {
    GI.get().expect("GameImport not initialized").as_ref()
}

// ---- Free functions mirroring `gi.xxx(...)` calls ----

pub fn gi_bprintf(printlevel: i32, msg: &str) { gi().bprintf(printlevel, msg); }
pub fn gi_dprintf(msg: &str) { gi().dprintf(msg); }
pub fn gi_cprintf(ent_idx: i32, printlevel: i32, msg: &str) { gi().cprintf(ent_idx, printlevel, msg); }
pub fn gi_centerprintf(ent_idx: i32, msg: &str) { gi().centerprintf(ent_idx, msg); }
pub fn gi_configstring(num: i32, string: &str) { gi().configstring(num, string); }
pub fn gi_error(msg: &str) { gi().error(msg); }
pub fn gi_modelindex(name: &str) -> i32 { gi().modelindex(name) }
pub fn gi_setmodel(ent_idx: i32, name: &str) { gi().setmodel(ent_idx, name); }
pub fn gi_linkentity(ent_idx: i32) { gi().linkentity(ent_idx); }
pub fn gi_unlinkentity(ent_idx: i32) { gi().unlinkentity(ent_idx); }
pub fn gi_cvar(var_name: &str, value: &str, flags: i32) -> f32 { gi().cvar(var_name, value, flags) }
pub fn gi_cvar_set(var_name: &str, value: &str) { gi().cvar_set(var_name, value); }

/// Game import interface — functions provided by the engine to the game module.
pub trait GameImport {
    // Printing
    fn bprintf(&self, printlevel: i32, msg: &str);
    fn dprintf(&self, msg: &str);
    fn cprintf(&self, ent_idx: i32, printlevel: i32, msg: &str);
    fn centerprintf(&self, ent_idx: i32, msg: &str);

    // Config
    fn configstring(&self, num: i32, string: &str);
    fn error(&self, msg: &str);

    // Indexing
    fn modelindex(&self, name: &str) -> i32;
    fn setmodel(&self, ent_idx: i32, name: &str);

    // Entity linking
    fn linkentity(&self, ent_idx: i32);
    fn unlinkentity(&self, ent_idx: i32);

    // Cvars
    fn cvar(&self, var_name: &str, value: &str, flags: i32) -> f32;
    fn cvar_set(&self, var_name: &str, value: &str);
}

/// Stub implementation of `GameImport` used by tests and offline tools.
/// Prints route to the `log` crate; methods that need server state
/// (configstring, modelindex, setmodel, linkentity, unlinkentity) are no-ops.
pub struct StubGameImport;

impl GameImport for StubGameImport {
    // ---- Printing: route to the log crate ----
    fn bprintf(&self, _printlevel: i32, msg: &str) {
        log::info!("{}", msg.trim_end());
    }
    fn dprintf(&self, msg: &str) {
        log::debug!("{}", msg.trim_end());
    }
    fn cprintf(&self, _ent_idx: i32, _printlevel: i32, msg: &str) {
        log::info!("{}", msg.trim_end());
    }
    fn centerprintf(&self, _ent_idx: i32, msg: &str) {
        log::info!("{}", msg.trim_end());
    }

    // ---- Config: stub (needs server state) ----
    fn configstring(&self, _num: i32, _string: &str) {
        // stub: needs server state
    }

    // ---- Error: fatal in the real engine, fatal here too ----
    fn error(&self, msg: &str) {
        panic!("{}", msg);
    }

    // ---- Indexing: stub (needs server state) ----
    fn modelindex(&self, _name: &str) -> i32 { 0 }
    fn setmodel(&self, _ent_idx: i32, _name: &str) {}

    // ---- Entity linking: stub (needs server world) ----
    fn linkentity(&self, _ent_idx: i32) {}
    fn unlinkentity(&self, _ent_idx: i32) {}

    // ---- Cvars: hand back the proposed default ----
    fn cvar(&self, _var_name: &str, value: &str, _flags: i32) -> f32 {
        value.parse().unwrap_or(0.0)
    }
    fn cvar_set(&self, _var_name: &str, _value: &str) {}
}
