/// Physics constants - gravity magnitudes are in "gravity units" (1.0 = GRAVITY_UNIT px/s²)
pub mod physics {
    /// Gravity magnitude at session start (and after restart)
    pub const BASE_GRAVITY_MAGNITUDE: f32 = 0.5;
    /// Upper bound for level-driven gravity
    pub const MAX_GRAVITY_MAGNITUDE: f32 = 1.5;
    /// Acceleration of one gravity unit in points per second squared
    pub const GRAVITY_UNIT: f32 = 1000.0;
    /// Restitution applied to the normal velocity component on boundary contact
    pub const ELASTICITY: f32 = 0.6;
    /// Fraction of tangential velocity removed on boundary contact
    pub const FRICTION: f32 = 0.2;
    /// Mass per reference shape area
    pub const DENSITY: f32 = 1.0;
    /// Portal attractor strength (negative pulls inward)
    pub const PORTAL_FIELD_STRENGTH: f32 = -0.5;
    /// Portal attractor falloff exponent: force ~ strength / d^falloff
    pub const PORTAL_FIELD_FALLOFF: f32 = 2.0;
    /// Beyond this distance the attractor contributes nothing
    pub const PORTAL_FIELD_RADIUS: f32 = 150.0;
    /// Inside this distance the attractor is not applied
    pub const PORTAL_MINIMUM_RADIUS: f32 = 50.0;
    /// Field force of unit strength at unit distance.
    /// Chosen so unit strength at the minimum radius equals one gravity unit.
    pub const FIELD_UNIT: f32 =
        GRAVITY_UNIT * PORTAL_MINIMUM_RADIUS * PORTAL_MINIMUM_RADIUS;
    /// Spawn velocity = (scene center - spawn position) * multiplier
    pub const VELOCITY_MULTIPLIER: f32 = 0.3;
    /// Physics tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Tick duration in microseconds
    pub const TICK_DURATION_US: u64 = 1_000_000 / TICK_RATE as u64;
    /// Cap on linear speed to keep integration stable after many bounces
    pub const MAX_VELOCITY: f32 = 2500.0;
    /// Cap on angular speed (radians/s)
    pub const MAX_ANGULAR_VELOCITY: f32 = 20.0;
}

/// Scene layout constants
pub mod ui {
    /// Portal visual diameter
    pub const PORTAL_SIZE: f32 = 100.0;
    /// Collision barrier inset relative to the portal frame (negative grows it)
    pub const PORTAL_BARRIER_INSET: f32 = -10.0;
    /// Collection zone side length
    pub const COLLECTION_ZONE_SIZE: f32 = 80.0;
    /// Distance of zones from the scene's left/right/bottom edges
    pub const COLLECTION_ZONE_MARGIN: f32 = 20.0;
    /// Y offset of the two top zones (leaves room for the HUD)
    pub const TOP_ZONE_Y: f32 = 100.0;
    /// Shape bounding footprint
    pub const SHAPE_SIZE: f32 = 40.0;
    /// Spawn distance outside the scene edge
    pub const SPAWN_OFFSET: f32 = 30.0;
    /// Horizontal inset for top/bottom edge spawns
    pub const SPAWN_EDGE_INSET_X: f32 = 50.0;
    /// Vertical inset for left/right edge spawns
    pub const SPAWN_EDGE_INSET_Y: f32 = 100.0;
    /// Margin around the scene outside which shapes are discarded
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;
    /// Default scene size (portrait phone, points)
    pub const DEFAULT_SCENE_WIDTH: f32 = 390.0;
    pub const DEFAULT_SCENE_HEIGHT: f32 = 844.0;
}

/// Timing constants (seconds)
pub mod timing {
    /// Spawn interval at session start
    pub const BASE_SPAWN_INTERVAL: f64 = 3.0;
    /// Spawn interval floor
    pub const MIN_SPAWN_INTERVAL: f64 = 1.0;
    /// Spawn interval reduction per level
    pub const SPAWN_SPEED_INCREASE: f64 = 0.2;
    /// Zone overlap poll period
    pub const COLLECTION_CHECK_INTERVAL: f64 = 0.1;
    /// Delay after spawn before the first overlap poll
    pub const COLLECTION_CHECK_DELAY: f64 = 0.5;
    /// Motion sensor sample period
    pub const MOTION_UPDATE_INTERVAL: f64 = 1.0 / 60.0;
    /// Delay between game over and the restart button appearing
    pub const RESTART_BUTTON_DELAY: f64 = 2.0;
}

/// Game balance constants
pub mod balance {
    /// Points per collected shape at level 1
    pub const BASE_POINTS_PER_SHAPE: u32 = 10;
    /// Score needed per level to advance
    pub const POINTS_PER_LEVEL: u32 = 100;
    /// Lives at session start
    pub const INITIAL_LIVES: u8 = 3;
    /// Tilt intensity above which the portal pulses
    pub const PORTAL_PULSE_THRESHOLD: f32 = 0.6;
    /// Gravity magnitude gained per level
    pub const GRAVITY_PER_LEVEL: f64 = 0.1;
}

/// Message durations for HUD feedback (seconds)
pub mod messages {
    pub const READY_DURATION: f32 = 2.0;
    pub const POINTS_DURATION: f32 = 1.0;
    pub const LEVEL_UP_DURATION: f32 = 2.0;
    pub const PORTAL_DAMAGED_DURATION: f32 = 1.5;
    pub const GAME_OVER_DURATION: f32 = 5.0;
}
