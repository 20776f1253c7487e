//! Motion sensor adapter
//!
//! Converts raw device gravity samples into a scene-space gravity angle and a
//! tilt intensity. The angle is published through [`SharedGravity`], which the
//! physics step reads every tick; the sensor task is its only writer.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game::constants::{balance, physics};

/// Raw gravity vector reported by the platform (device axes, unit g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravitySample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl GravitySample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Device lying flat, screen up
    pub const FLAT: GravitySample = GravitySample::new(0.0, 0.0, -1.0);
}

/// Result of processing one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltReading {
    /// Scene gravity angle in radians
    pub angle: f32,
    /// sqrt(x² + z²)
    pub intensity: f32,
    /// Intensity above `PORTAL_PULSE_THRESHOLD`; reported on every such sample
    pub strong: bool,
}

impl TiltReading {
    pub fn from_sample(sample: GravitySample) -> Self {
        let angle = sample.x.atan2(sample.y) - PI;
        let intensity = (sample.x * sample.x + sample.z * sample.z).sqrt();
        Self {
            angle,
            intensity,
            strong: intensity > balance::PORTAL_PULSE_THRESHOLD,
        }
    }
}

/// Sensor failure modes (never fatal to the session)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("Device motion is not available")]
    Unavailable,
}

/// Platform attitude provider
pub trait AttitudeSource: Send {
    fn is_available(&self) -> bool;

    /// Latest gravity sample, or None if nothing new is ready
    fn sample(&mut self) -> Option<GravitySample>;
}

/// Gravity direction and magnitude shared between the sensor and physics.
///
/// f32 values are stored as raw bits so reads and writes are single atomic
/// operations. Angle and magnitude are independent; a reader may observe a new
/// angle with the previous magnitude, which is harmless for one step.
#[derive(Debug)]
pub struct SharedGravity {
    angle: AtomicU32,
    magnitude: AtomicU32,
}

impl SharedGravity {
    pub fn new(angle: f32, magnitude: f32) -> Self {
        Self {
            angle: AtomicU32::new(angle.to_bits()),
            magnitude: AtomicU32::new(magnitude.to_bits()),
        }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        f32::from_bits(self.angle.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_angle(&self, angle: f32) {
        if angle.is_finite() {
            self.angle.store(angle.to_bits(), Ordering::Release);
        }
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        f32::from_bits(self.magnitude.load(Ordering::Acquire))
    }

    /// Clamped to the configured gravity range
    pub fn set_magnitude(&self, magnitude: f32) {
        let clamped = magnitude.clamp(
            physics::BASE_GRAVITY_MAGNITUDE,
            physics::MAX_GRAVITY_MAGNITUDE,
        );
        self.magnitude.store(clamped.to_bits(), Ordering::Release);
    }
}

impl Default for SharedGravity {
    /// Straight down at base magnitude
    fn default() -> Self {
        Self::new(FRAC_PI_2, physics::BASE_GRAVITY_MAGNITUDE)
    }
}

/// Adapter between an [`AttitudeSource`] and [`SharedGravity`]
pub struct MotionSensor {
    source: Box<dyn AttitudeSource>,
    gravity: std::sync::Arc<SharedGravity>,
    reported_unavailable: bool,
}

impl MotionSensor {
    pub fn new(source: Box<dyn AttitudeSource>, gravity: std::sync::Arc<SharedGravity>) -> Self {
        Self {
            source,
            gravity,
            reported_unavailable: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_available()
    }

    /// Sample the source once and publish the resulting gravity angle.
    ///
    /// An unavailable source leaves gravity untouched.
    pub fn poll(&mut self) -> Result<Option<TiltReading>, SensorError> {
        if !self.source.is_available() {
            if !self.reported_unavailable {
                warn!("Device motion unavailable, gravity stays at its current direction");
                self.reported_unavailable = true;
            }
            return Err(SensorError::Unavailable);
        }

        Ok(self.source.sample().map(|sample| self.process(sample)))
    }

    /// Convert a sample and write its angle into the shared gravity
    pub fn process(&self, sample: GravitySample) -> TiltReading {
        let reading = TiltReading::from_sample(sample);
        self.gravity.set_angle(reading.angle);
        if reading.strong {
            debug!("Strong tilt: intensity {:.2}", reading.intensity);
        }
        reading
    }
}

/// Source for platforms without motion hardware
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSensor;

impl AttitudeSource for NoSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn sample(&mut self) -> Option<GravitySample> {
        None
    }
}

/// Always reports the same sample
#[derive(Debug, Clone, Copy)]
pub struct FixedTilt(pub GravitySample);

impl AttitudeSource for FixedTilt {
    fn is_available(&self) -> bool {
        true
    }

    fn sample(&mut self) -> Option<GravitySample> {
        Some(self.0)
    }
}

/// Deterministic side-to-side rocking, used by the headless binary
#[derive(Debug, Clone)]
pub struct ScriptedTilt {
    phase: f32,
    /// Radians advanced per sample
    step: f32,
    /// Peak sideways tilt (unit g)
    amplitude: f32,
}

impl ScriptedTilt {
    pub fn new(period_seconds: f32, amplitude: f32) -> Self {
        let interval = crate::game::constants::timing::MOTION_UPDATE_INTERVAL as f32;
        let samples_per_period = (period_seconds / interval).max(1.0);
        Self {
            phase: 0.0,
            step: std::f32::consts::TAU / samples_per_period,
            amplitude: amplitude.clamp(0.0, 1.0),
        }
    }
}

impl AttitudeSource for ScriptedTilt {
    fn is_available(&self) -> bool {
        true
    }

    fn sample(&mut self) -> Option<GravitySample> {
        let x = self.amplitude * self.phase.sin();
        self.phase = (self.phase + self.step) % std::f32::consts::TAU;
        // Device held upright facing the player, rocked left and right
        let y = -(1.0 - x * x).max(0.0).sqrt();
        Some(GravitySample::new(x, y, 0.0))
    }
}
