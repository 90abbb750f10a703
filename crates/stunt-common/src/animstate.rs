// animstate.rs — per-player animation state machine
//
// Each connected player owns one PlayerAnimState. Once per server frame the
// game snapshots the player's movement state into an AnimInput and calls
// update(), which picks the main-sequence activity and recomputes the blend
// pose parameters. Discrete happenings (attacks, reloads, stance changes)
// arrive through do_animation_event() and mostly play on gesture layers over
// the main sequence.
//
// The model runtime, gesture slots, and held weapon are trait seams so the
// machine runs identically against the game's types and the test stubs here.

use crate::shared::{
    angle_normalize, snap_yaw_to, vector_length, vector_length_2d, Vec3,
};

/// Horizontal speed above which a player counts as moving.
pub const MOVING_MINIMUM_SPEED: f32 = 0.5;

/// Main-sequence cycle position treated as a finished transition clip.
pub const TRANSITION_DONE_CYCLE: f32 = 0.99;

/// Seconds after liftoff during which stale on-ground flags are ignored.
pub const JUMP_LAND_GUARD: f32 = 0.2;

/// Airborne time after which the jump switches to its float activity.
pub const JUMP_FLOAT_TIME: f32 = 0.5;

/// Degrees of eye/feet separation allowed before the feet get dragged.
pub const MAX_BODY_TWIST: f32 = 45.0;

/// Default feet turn rate, degrees per second.
pub const BODY_YAW_RATE: f32 = 720.0;

/// Full-speed run, world units per second.
pub const RUN_SPEED: f32 = 320.0;

/// Crouch-walk and crawl reference speed.
pub const WALK_SPEED: f32 = 75.0;

pub const GESTURE_SLOT_COUNT: usize = 2;

// ============================================================
// Vocabulary
// ============================================================

/// Player water contact depth, ordered shallow to deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WaterLevel {
    #[default]
    Dry,
    Feet,
    Waist,
    Eyes,
}

/// Skeletal activities the state machine can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Activity {
    StandIdle = 0,
    RunIdle,
    CrouchIdle,
    CrouchWalkIdle,
    ProneChestIdle,
    CrawlIdle,
    SlideStart,
    Slide,
    Roll,
    Sprint,
    Swim,
    DieSimple,
    JumpStart,
    JumpFloat,
    JumpLand,
    StandToProne,
    CrouchToProne,
    ProneToStand,
    ProneToCrouch,
    PrimaryAttack,
    PrimaryAttackCrouch,
    PrimaryAttackProne,
    PrimaryAttackSlide,
    PrimaryAttackRoll,
    PrimaryAttackDive,
    Reload,
    ReloadCrouch,
    ReloadProne,
    ReloadSlide,
    ReloadStandLoop,
    ReloadCrouchLoop,
    ReloadProneLoop,
    ReloadStandEnd,
    ReloadCrouchEnd,
    ReloadProneEnd,
    AttackStandPrefire,
    AttackCrouchPrefire,
    AttackStandPostfire,
    VmIdle,
    VmPrimaryAttack,
    VmReload,
}

impl Activity {
    /// Decodes a raw activity id carried by an event payload.
    pub fn from_raw(raw: i32) -> Option<Activity> {
        match raw {
            0 => Some(Activity::StandIdle),
            1 => Some(Activity::RunIdle),
            2 => Some(Activity::CrouchIdle),
            3 => Some(Activity::CrouchWalkIdle),
            4 => Some(Activity::ProneChestIdle),
            5 => Some(Activity::CrawlIdle),
            6 => Some(Activity::SlideStart),
            7 => Some(Activity::Slide),
            8 => Some(Activity::Roll),
            9 => Some(Activity::Sprint),
            10 => Some(Activity::Swim),
            11 => Some(Activity::DieSimple),
            12 => Some(Activity::JumpStart),
            13 => Some(Activity::JumpFloat),
            14 => Some(Activity::JumpLand),
            15 => Some(Activity::StandToProne),
            16 => Some(Activity::CrouchToProne),
            17 => Some(Activity::ProneToStand),
            18 => Some(Activity::ProneToCrouch),
            19 => Some(Activity::PrimaryAttack),
            20 => Some(Activity::PrimaryAttackCrouch),
            21 => Some(Activity::PrimaryAttackProne),
            22 => Some(Activity::PrimaryAttackSlide),
            23 => Some(Activity::PrimaryAttackRoll),
            24 => Some(Activity::PrimaryAttackDive),
            25 => Some(Activity::Reload),
            26 => Some(Activity::ReloadCrouch),
            27 => Some(Activity::ReloadProne),
            28 => Some(Activity::ReloadSlide),
            29 => Some(Activity::ReloadStandLoop),
            30 => Some(Activity::ReloadCrouchLoop),
            31 => Some(Activity::ReloadProneLoop),
            32 => Some(Activity::ReloadStandEnd),
            33 => Some(Activity::ReloadCrouchEnd),
            34 => Some(Activity::ReloadProneEnd),
            35 => Some(Activity::AttackStandPrefire),
            36 => Some(Activity::AttackCrouchPrefire),
            37 => Some(Activity::AttackStandPostfire),
            38 => Some(Activity::VmIdle),
            39 => Some(Activity::VmPrimaryAttack),
            40 => Some(Activity::VmReload),
            _ => None,
        }
    }
}

/// Discrete animation events the game feeds in as they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAnimEvent {
    AttackPrimary,
    AttackSecondary,
    AttackPre,
    AttackPost,
    Reload,
    ReloadLoop,
    ReloadEnd,
    Jump,
    Die,
    StandToProne,
    CrouchToProne,
    ProneToStand,
    ProneToCrouch,
    StandToSlide,
    StandToRoll,
    VoiceCommandGesture,
}

/// Gesture layers that play over the main sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSlot {
    AttackAndReload = 0,
    Jump,
}

// ============================================================
// Collaborator traits
// ============================================================

/// Model/animation runtime driven by the state machine. The game wraps its
/// player model in this; tests use a recording stub.
pub trait ModelRuntime {
    /// False while no studio model is bound. Updates are skipped entirely.
    fn has_model_data(&self) -> bool;
    /// Normalized main-sequence position, 0.0..=1.0.
    fn cycle(&self) -> f32;
    /// Rewinds the main sequence to cycle 0.
    fn restart_main_sequence(&mut self);
    fn set_main_activity(&mut self, activity: Activity);
    /// Resolves a pose parameter index by rig name.
    fn lookup_pose_parameter(&self, name: &str) -> Option<usize>;
    fn set_pose_parameter(&mut self, index: usize, value: f32);
    fn set_playback_rate(&mut self, rate: f32);
}

/// Overlay gesture slots, independent of the main locomotion sequence.
pub trait GestureLayer {
    /// Starts `activity` on `slot` from its first frame. `auto_kill` lets the
    /// layer retire the gesture when the clip finishes.
    fn restart_gesture(&mut self, slot: GestureSlot, activity: Activity, auto_kill: bool);
    fn is_gesture_slot_active(&self, slot: GestureSlot) -> bool;
}

/// Hooks on the player's held weapon.
pub trait WeaponEvents {
    /// Lets the weapon substitute an equivalent activity before it reaches
    /// the model, rifle idles for pistol idles and the like.
    fn activity_override(&self, activity: Activity, eye_fixed: bool) -> Activity;
    /// Replays a viewmodel activity so weapon-driven effects stay in sync
    /// for players other than the locally-predicted one.
    fn replay_animation_event(&mut self, activity: Activity);
}

// ============================================================
// Inputs and configuration
// ============================================================

/// Snapshot of the owning player's gameplay state for one frame. Plain data,
/// built fresh by the game each frame.
#[derive(Debug, Clone)]
pub struct AnimInput {
    pub time: f32,
    pub frametime: f32,
    pub eye_yaw: f32,
    pub eye_pitch: f32,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub ducking: bool,
    pub sliding: bool,
    pub rolling: bool,
    pub diving: bool,
    pub prone: bool,
    pub sprinting: bool,
    pub water_level: WaterLevel,
    pub alive: bool,
    pub local_player: bool,
    /// Quantize the movement blend direction to 45 degree steps.
    pub snap_move_yaw: bool,
}

impl Default for AnimInput {
    fn default() -> AnimInput {
        AnimInput {
            time: 0.0,
            frametime: 0.1,
            eye_yaw: 0.0,
            eye_pitch: 0.0,
            velocity: [0.0; 3],
            on_ground: true,
            ducking: false,
            sliding: false,
            rolling: false,
            diving: false,
            prone: false,
            sprinting: false,
            water_level: WaterLevel::Dry,
            alive: true,
            local_player: false,
            snap_move_yaw: false,
        }
    }
}

impl AnimInput {
    /// Horizontal speed, vertical velocity ignored.
    pub fn speed_2d(&self) -> f32 {
        vector_length_2d(&self.velocity)
    }
}

/// Tunables fixed when the state is created.
#[derive(Debug, Clone)]
pub struct AnimStateConfig {
    /// Degrees per second the feet may turn to chase the eyes.
    pub body_yaw_rate: f32,
    pub run_speed: f32,
    pub walk_speed: f32,
    /// Enables the prone handlers and prone transition events.
    pub use_prone: bool,
    /// Enables the sprint handler.
    pub use_sprint: bool,
}

impl Default for AnimStateConfig {
    fn default() -> AnimStateConfig {
        AnimStateConfig {
            body_yaw_rate: BODY_YAW_RATE,
            run_speed: RUN_SPEED,
            walk_speed: WALK_SPEED,
            use_prone: true,
            use_sprint: false,
        }
    }
}

// ============================================================
// One-shot transitions
// ============================================================

/// Bookkeeping for a one-shot transition clip, shared by the slide, roll,
/// and prone transitions.
///
/// The entry event and the first processed frame both restart the main
/// sequence, so the clip starts at cycle 0 no matter which side saw the
/// event first.
#[derive(Debug, Clone)]
struct OneShotTransition {
    active: bool,
    first_frame: bool,
    activity: Activity,
}

impl OneShotTransition {
    fn new(default_activity: Activity) -> OneShotTransition {
        OneShotTransition {
            active: false,
            first_frame: false,
            activity: default_activity,
        }
    }

    /// Arms the transition with the clip to play.
    fn begin(&mut self, activity: Activity) {
        self.active = true;
        self.first_frame = true;
        self.activity = activity;
    }

    fn reset(&mut self) {
        self.active = false;
        self.first_frame = false;
    }

    /// Runs one frame of the clip. A false `posture_held` cancels it
    /// outright; the prone transition passes true and always plays out.
    fn advance<M: ModelRuntime>(&mut self, posture_held: bool, model: &mut M) -> Option<Activity> {
        if !posture_held {
            self.active = false;
        }
        if !self.active {
            return None;
        }

        if self.first_frame {
            self.first_frame = false;
            model.restart_main_sequence();
        }

        if model.cycle() >= TRANSITION_DONE_CYCLE {
            self.active = false;
            None
        } else {
            Some(self.activity)
        }
    }
}

/// Pose parameter indices, resolved once per model.
#[derive(Debug, Clone, Copy)]
struct PoseParams {
    move_x: usize,
    move_y: usize,
    aim_pitch: usize,
    aim_yaw: usize,
}

// ============================================================
// PlayerAnimState
// ============================================================

#[derive(Debug, Clone)]
pub struct PlayerAnimState {
    config: AnimStateConfig,

    // normalized view angles, stored at the top of every update
    eye_yaw: f32,
    eye_pitch: f32,

    jumping: bool,
    first_jump_frame: bool,
    jump_start_time: f32,

    dying: bool,
    first_dying_frame: bool,
    first_swim_frame: bool,

    prone_transition: OneShotTransition,
    slide_transition: OneShotTransition,
    roll_transition: OneShotTransition,

    pose_params: Option<PoseParams>,
    estimate_yaw: f32,
    goal_feet_yaw: f32,
    current_feet_yaw: f32,
    feet_yaw_initialized: bool,

    current_main_activity: Option<Activity>,

    // last computed values, kept for debug overlays
    pub last_move_blend: [f32; 2],
    pub last_aim_pitch: f32,
    pub last_aim_yaw: f32,
}

impl Default for PlayerAnimState {
    fn default() -> PlayerAnimState {
        PlayerAnimState::new(AnimStateConfig::default())
    }
}

impl PlayerAnimState {
    pub fn new(config: AnimStateConfig) -> PlayerAnimState {
        PlayerAnimState {
            config,
            eye_yaw: 0.0,
            eye_pitch: 0.0,
            jumping: false,
            first_jump_frame: false,
            jump_start_time: 0.0,
            dying: false,
            first_dying_frame: true,
            first_swim_frame: true,
            prone_transition: OneShotTransition::new(Activity::StandToProne),
            slide_transition: OneShotTransition::new(Activity::SlideStart),
            roll_transition: OneShotTransition::new(Activity::Roll),
            pose_params: None,
            estimate_yaw: 0.0,
            goal_feet_yaw: 0.0,
            current_feet_yaw: 0.0,
            feet_yaw_initialized: false,
            current_main_activity: None,
            last_move_blend: [0.0; 2],
            last_aim_pitch: 0.0,
            last_aim_yaw: 0.0,
        }
    }

    pub fn config(&self) -> &AnimStateConfig {
        &self.config
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    /// Activity the model was last told to play.
    pub fn current_main_activity(&self) -> Option<Activity> {
        self.current_main_activity
    }

    /// Yaw the body is rendered at. The game writes this back to the entity
    /// so the body faces where the feet point, not where the eyes do.
    pub fn current_feet_yaw(&self) -> f32 {
        self.current_feet_yaw
    }

    /// Drops all transient animation bookkeeping. Runs whenever updates are
    /// suppressed, so a revived player starts from a clean slate.
    pub fn clear_animation_state(&mut self) {
        self.prone_transition.reset();
        self.slide_transition.reset();
        self.roll_transition.reset();

        self.jumping = false;
        self.first_jump_frame = false;
        self.dying = false;
        self.first_dying_frame = true;
        self.first_swim_frame = true;
        self.feet_yaw_initialized = false;
    }

    fn should_update(&self, input: &AnimInput) -> bool {
        // dead players keep animating while the death clip plays
        input.alive || self.dying
    }

    // ============================================================
    // Per-frame update
    // ============================================================

    /// Picks the main activity, pushes it to the model, and recomputes the
    /// blend pose parameters. Call once per server frame per player.
    pub fn update<M, G, W>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        gestures: &mut G,
        weapon: Option<&W>,
    ) where
        M: ModelRuntime,
        G: GestureLayer,
        W: WeaponEvents,
    {
        if !model.has_model_data() {
            return;
        }

        if !self.should_update(input) {
            self.clear_animation_state();
            return;
        }

        self.eye_yaw = angle_normalize(input.eye_yaw);
        self.eye_pitch = angle_normalize(input.eye_pitch);

        self.compute_main_sequence(input, model, gestures, weapon);

        if let Some(params) = self.setup_pose_parameters(model) {
            self.compute_pose_param_move_yaw(input, model, params);
            self.compute_pose_param_aim_pitch(model, params);
            self.compute_pose_param_aim_yaw(input, model, params);
        }

        // the locally-predicted player plays in lockstep with its commands
        if input.local_player {
            model.set_playback_rate(1.0);
        }
    }

    fn compute_main_sequence<M, G, W>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        gestures: &mut G,
        weapon: Option<&W>,
    ) where
        M: ModelRuntime,
        G: GestureLayer,
        W: WeaponEvents,
    {
        let ideal = self.calc_main_activity(input, model, gestures);
        let translated = match weapon {
            Some(w) => w.activity_override(ideal, false),
            None => ideal,
        };

        model.set_main_activity(translated);
        self.current_main_activity = Some(translated);
    }

    /// The activity decision chain. First handler that claims the frame
    /// wins; a one-shot clip finishing lets the rest of the chain run in the
    /// same frame.
    fn calc_main_activity<M, G>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        gestures: &mut G,
    ) -> Activity
    where
        M: ModelRuntime,
        G: GestureLayer,
    {
        if let Some(act) = self.handle_jumping(input, model, gestures) {
            return act;
        }
        if self.config.use_prone {
            if let Some(act) = self.prone_transition.advance(true, model) {
                return act;
            }
            if let Some(act) = self.handle_prone(input) {
                return act;
            }
        }
        if let Some(act) = self.roll_transition.advance(input.rolling, model) {
            return act;
        }
        if let Some(act) = self.slide_transition.advance(input.sliding, model) {
            return act;
        }
        if let Some(act) = self.handle_sliding(input) {
            return act;
        }
        if let Some(act) = self.handle_ducking(input) {
            return act;
        }
        if let Some(act) = self.handle_swimming(input, model) {
            return act;
        }
        if let Some(act) = self.handle_dying(model) {
            return act;
        }
        if self.config.use_sprint {
            if let Some(act) = self.handle_sprinting(input) {
                return act;
            }
        }

        self.handle_moving(input).unwrap_or(Activity::StandIdle)
    }

    // ============================================================
    // Activity handlers
    // ============================================================

    fn handle_jumping<M, G>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        gestures: &mut G,
    ) -> Option<Activity>
    where
        M: ModelRuntime,
        G: GestureLayer,
    {
        if !self.jumping {
            return None;
        }

        if self.first_jump_frame {
            self.first_jump_frame = false;
            model.restart_main_sequence();
        }

        if input.water_level >= WaterLevel::Waist {
            // hit water, swimming takes over
            self.jumping = false;
            model.restart_main_sequence();
        } else if input.time - self.jump_start_time > JUMP_LAND_GUARD {
            // don't trust on-ground for a moment after liftoff, the flag can
            // still be set when the jump message arrives
            if input.on_ground {
                self.jumping = false;
                model.restart_main_sequence();

                gestures.restart_gesture(GestureSlot::Jump, Activity::JumpLand, true);
            }
        }

        if !self.jumping {
            // let the rest of the chain pick this frame's activity
            return None;
        }

        if input.time - self.jump_start_time > JUMP_FLOAT_TIME {
            Some(Activity::JumpFloat)
        } else {
            Some(Activity::JumpStart)
        }
    }

    fn handle_prone(&mut self, input: &AnimInput) -> Option<Activity> {
        if !input.prone {
            return None;
        }

        if input.speed_2d() > MOVING_MINIMUM_SPEED {
            Some(Activity::CrawlIdle)
        } else {
            Some(Activity::ProneChestIdle)
        }
    }

    fn handle_sliding(&mut self, input: &AnimInput) -> Option<Activity> {
        if input.sliding {
            Some(Activity::Slide)
        } else {
            None
        }
    }

    fn handle_ducking(&mut self, input: &AnimInput) -> Option<Activity> {
        if !input.ducking {
            return None;
        }

        if input.speed_2d() < MOVING_MINIMUM_SPEED {
            Some(Activity::CrouchIdle)
        } else {
            Some(Activity::CrouchWalkIdle)
        }
    }

    fn handle_swimming<M: ModelRuntime>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
    ) -> Option<Activity> {
        if input.water_level >= WaterLevel::Waist {
            if self.first_swim_frame {
                self.first_swim_frame = false;
                model.restart_main_sequence();
            }
            Some(Activity::Swim)
        } else {
            if !self.first_swim_frame {
                self.first_swim_frame = true;
            }
            None
        }
    }

    fn handle_dying<M: ModelRuntime>(&mut self, model: &mut M) -> Option<Activity> {
        if self.dying {
            if self.first_dying_frame {
                self.first_dying_frame = false;
                model.restart_main_sequence();
            }
            Some(Activity::DieSimple)
        } else {
            if !self.first_dying_frame {
                self.first_dying_frame = true;
            }
            None
        }
    }

    fn handle_sprinting(&mut self, input: &AnimInput) -> Option<Activity> {
        if input.sprinting {
            Some(Activity::Sprint)
        } else {
            None
        }
    }

    fn handle_moving(&mut self, input: &AnimInput) -> Option<Activity> {
        if input.speed_2d() > MOVING_MINIMUM_SPEED {
            Some(Activity::RunIdle)
        } else {
            None
        }
    }

    // ============================================================
    // Pose parameters
    // ============================================================

    fn setup_pose_parameters<M: ModelRuntime>(&mut self, model: &M) -> Option<PoseParams> {
        if let Some(params) = self.pose_params {
            return Some(params);
        }

        let move_x = model.lookup_pose_parameter("move_x")?;
        let move_y = model.lookup_pose_parameter("move_y")?;
        let aim_pitch = model.lookup_pose_parameter("aim_pitch")?;
        let aim_yaw = model.lookup_pose_parameter("aim_yaw")?;

        let params = PoseParams {
            move_x,
            move_y,
            aim_pitch,
            aim_yaw,
        };
        self.pose_params = Some(params);
        Some(params)
    }

    /// Tracks the yaw the player is actually moving along. Stationary
    /// players ease the estimate toward the eyes instead of holding stale
    /// movement directions.
    fn estimate_yaw(&mut self, input: &AnimInput) {
        if input.frametime == 0.0 {
            return;
        }

        if input.velocity[0] == 0.0 && input.velocity[1] == 0.0 {
            let mut yaw_delta = angle_normalize(self.eye_yaw - self.estimate_yaw);

            if input.frametime < 0.25 {
                yaw_delta *= input.frametime * 4.0;
            } else {
                yaw_delta *= input.frametime;
            }

            self.estimate_yaw = angle_normalize(self.estimate_yaw + yaw_delta);
        } else {
            let yaw = input.velocity[1].atan2(input.velocity[0]).to_degrees();
            self.estimate_yaw = yaw.clamp(-180.0, 180.0);
        }
    }

    fn compute_pose_param_move_yaw<M: ModelRuntime>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        params: PoseParams,
    ) {
        self.estimate_yaw(input);

        // side to side turning, the view yaw against the movement yaw
        let angle = angle_normalize(self.eye_yaw);
        let mut yaw = angle_normalize(-(angle - self.estimate_yaw));

        let (rate, moving) = self.calc_movement_playback_rate(input);

        let mut blend = [0.0f32; 2];
        if moving {
            if input.snap_move_yaw {
                yaw = snap_yaw_to(yaw);
            }
            blend[0] = yaw.to_radians().cos() * rate;
            blend[1] = -yaw.to_radians().sin() * rate;
        }

        model.set_pose_parameter(params.move_x, blend[0]);
        // the rig's Y axis runs the other way
        model.set_pose_parameter(params.move_y, -blend[1]);

        self.last_move_blend = blend;
    }

    fn compute_pose_param_aim_pitch<M: ModelRuntime>(&mut self, model: &mut M, params: PoseParams) {
        let aim_pitch = self.eye_pitch;

        model.set_pose_parameter(params.aim_pitch, -aim_pitch);
        self.last_aim_pitch = aim_pitch;
    }

    fn compute_pose_param_aim_yaw<M: ModelRuntime>(
        &mut self,
        input: &AnimInput,
        model: &mut M,
        params: PoseParams,
    ) {
        let moving = vector_length(&input.velocity) > 1.0;

        if moving {
            // the feet match the eyes while moving, move yaw does the rest
            self.goal_feet_yaw = self.eye_yaw;
        } else if !self.feet_yaw_initialized {
            self.goal_feet_yaw = self.eye_yaw;
            self.current_feet_yaw = self.eye_yaw;
            self.feet_yaw_initialized = true;
        } else {
            // keep the feet within the body twist limit of the eyes
            let yaw_delta = angle_normalize(self.goal_feet_yaw - self.eye_yaw);
            if yaw_delta.abs() > MAX_BODY_TWIST {
                let side = if yaw_delta > 0.0 { -1.0 } else { 1.0 };
                self.goal_feet_yaw += MAX_BODY_TWIST * side;
            }
        }

        self.goal_feet_yaw = angle_normalize(self.goal_feet_yaw);
        if self.goal_feet_yaw != self.current_feet_yaw {
            self.current_feet_yaw = converge_yaw_angles(
                self.goal_feet_yaw,
                self.config.body_yaw_rate,
                input.frametime,
                self.current_feet_yaw,
            );
        }

        // torso aim is whatever the feet don't cover
        let aim_yaw = angle_normalize(self.eye_yaw - self.current_feet_yaw);

        model.set_pose_parameter(params.aim_yaw, -aim_yaw);
        self.last_aim_yaw = aim_yaw;
    }

    /// Movement playback ratio, 0.01..=1.0 of the reference ground speed.
    /// Doubles as the blend vector magnitude.
    fn calc_movement_playback_rate(&self, input: &AnimInput) -> (f32, bool) {
        let speed = input.speed_2d();
        if speed <= MOVING_MINIMUM_SPEED {
            return (1.0, false);
        }

        let ground_speed = self.current_max_ground_speed();
        let rate = if ground_speed < 0.001 {
            0.01
        } else {
            (speed / ground_speed).clamp(0.01, 1.0)
        };

        (rate, true)
    }

    /// Reference ground speed for the current main activity.
    fn current_max_ground_speed(&self) -> f32 {
        match self.current_main_activity {
            Some(Activity::CrouchWalkIdle) | Some(Activity::CrawlIdle) => self.config.walk_speed,
            _ => self.config.run_speed,
        }
    }

    // ============================================================
    // Events
    // ============================================================

    /// Handles a discrete animation event. `data` is an extra payload for
    /// events that carry one; voice-command gestures pass a raw activity id.
    pub fn do_animation_event<M, G, W>(
        &mut self,
        event: PlayerAnimEvent,
        data: i32,
        input: &AnimInput,
        model: &mut M,
        gestures: &mut G,
        weapon: Option<&mut W>,
    ) where
        M: ModelRuntime,
        G: GestureLayer,
        W: WeaponEvents,
    {
        let mut vm_activity = None;

        match event {
            PlayerAnimEvent::AttackPrimary | PlayerAnimEvent::AttackSecondary => {
                gestures.restart_gesture(
                    GestureSlot::AttackAndReload,
                    attack_activity_for_posture(input),
                    true,
                );
                vm_activity = Some(Activity::VmPrimaryAttack);
            }
            PlayerAnimEvent::VoiceCommandGesture => {
                if !gestures.is_gesture_slot_active(GestureSlot::AttackAndReload) {
                    match Activity::from_raw(data) {
                        Some(act) => {
                            gestures.restart_gesture(GestureSlot::AttackAndReload, act, true);
                        }
                        None => {
                            log::warn!("voice command gesture with unknown activity id {}", data);
                        }
                    }
                }
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::AttackPre => {
                let act = if input.ducking {
                    Activity::AttackCrouchPrefire
                } else {
                    Activity::AttackStandPrefire
                };
                // no auto-kill, the windup holds until the attack lands
                gestures.restart_gesture(GestureSlot::AttackAndReload, act, false);
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::AttackPost => {
                gestures.restart_gesture(
                    GestureSlot::AttackAndReload,
                    Activity::AttackStandPostfire,
                    true,
                );
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::Reload => {
                gestures.restart_gesture(
                    GestureSlot::AttackAndReload,
                    reload_activity_for_posture(input),
                    true,
                );
                vm_activity = Some(Activity::VmReload);
            }
            PlayerAnimEvent::ReloadLoop => {
                let act = if input.prone {
                    Activity::ReloadProneLoop
                } else if input.ducking {
                    Activity::ReloadCrouchLoop
                } else {
                    Activity::ReloadStandLoop
                };
                gestures.restart_gesture(GestureSlot::AttackAndReload, act, true);
            }
            PlayerAnimEvent::ReloadEnd => {
                let act = if input.prone {
                    Activity::ReloadProneEnd
                } else if input.ducking {
                    Activity::ReloadCrouchEnd
                } else {
                    Activity::ReloadStandEnd
                };
                gestures.restart_gesture(GestureSlot::AttackAndReload, act, true);
            }
            PlayerAnimEvent::StandToProne if self.config.use_prone => {
                self.prone_transition.begin(Activity::StandToProne);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::CrouchToProne if self.config.use_prone => {
                self.prone_transition.begin(Activity::CrouchToProne);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::ProneToStand if self.config.use_prone => {
                self.prone_transition.begin(Activity::ProneToStand);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::ProneToCrouch if self.config.use_prone => {
                self.prone_transition.begin(Activity::ProneToCrouch);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::StandToSlide => {
                self.slide_transition.begin(Activity::SlideStart);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            PlayerAnimEvent::StandToRoll => {
                self.roll_transition.begin(Activity::Roll);
                model.restart_main_sequence();
                vm_activity = Some(Activity::VmIdle);
            }
            _ => {
                self.base_animation_event(event, input, model);
            }
        }

        // mirror the event onto the weapon viewmodel for everyone but the
        // locally-predicted player, who already played it
        if let Some(act) = vm_activity {
            if !input.local_player {
                if let Some(w) = weapon {
                    w.replay_animation_event(act);
                }
            }
        }
    }

    /// Fallback arm of the event dispatch: jump and die arm their state
    /// machines, anything else is ignored.
    fn base_animation_event<M: ModelRuntime>(
        &mut self,
        event: PlayerAnimEvent,
        input: &AnimInput,
        model: &mut M,
    ) {
        match event {
            PlayerAnimEvent::Jump => {
                self.jumping = true;
                self.first_jump_frame = true;
                self.jump_start_time = input.time;
                model.restart_main_sequence();
            }
            PlayerAnimEvent::Die => {
                self.dying = true;
                model.restart_main_sequence();
            }
            _ => {}
        }
    }
}

/// Turns `current` toward `goal` at `yaw_rate` degrees per second, scaling
/// the step down inside the final 60 degrees so small corrections stay
/// smooth. Always does at least 1% of the turn.
fn converge_yaw_angles(goal: f32, yaw_rate: f32, frametime: f32, current: f32) -> f32 {
    const FADE_TURN_DEGREES: f32 = 60.0;

    let delta = goal - current;
    let delta_abs = delta.abs();
    let delta_norm = angle_normalize(delta);

    let scale = (delta_abs / FADE_TURN_DEGREES).clamp(0.01, 1.0);

    let step = yaw_rate * frametime * scale;
    let next = if delta_abs < step {
        goal
    } else {
        let side = if delta_norm < 0.0 { -1.0 } else { 1.0 };
        current + step * side
    };

    angle_normalize(next)
}

fn attack_activity_for_posture(input: &AnimInput) -> Activity {
    if input.prone {
        Activity::PrimaryAttackProne
    } else if input.sliding {
        Activity::PrimaryAttackSlide
    } else if input.rolling {
        Activity::PrimaryAttackRoll
    } else if input.diving {
        Activity::PrimaryAttackDive
    } else if input.ducking {
        Activity::PrimaryAttackCrouch
    } else {
        Activity::PrimaryAttack
    }
}

fn reload_activity_for_posture(input: &AnimInput) -> Activity {
    if input.prone {
        Activity::ReloadProne
    } else if input.sliding {
        Activity::ReloadSlide
    } else if input.ducking {
        Activity::ReloadCrouch
    } else {
        Activity::Reload
    }
}

// ============================================================
// Tests
// ============================================================
