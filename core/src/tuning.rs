//! Empirically tuned constants governing terrain contact and worm motion.

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Largest number of headings on either side of the facing direction a step may search.
pub const MAX_FAN_STEPS: f64 = 10_000.0;

/// Smallest radial step of the step search, in pixels.
pub const MIN_RADIAL_STEP_PIXELS: f64 = 0.01;

/// Largest number of fine descent steps per coarse step.
pub const MAX_FALL_REFINEMENT_STEPS: u32 = 1_000;

/// Aggregated tuning knobs for the motion engine and terrain contact tests.
///
/// The defaults reproduce the reference game balance. None of the values are
/// derived from first principles; treat mismatches as tuning questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Half-width of the fan of directions searched by a step, in radians.
    pub move_fan_half_angle: f64,
    /// Angular increment between two directions of the step fan, in radians.
    pub move_angular_step: f64,
    /// Radial increment of the step search, in multiples of the smaller pixel extent.
    pub move_radial_step_pixels: f64,
    /// Shortest displacement a step may produce.
    pub min_move_distance: f64,
    /// Hit points granted when a worm receives the turn.
    pub activation_hit_point_bonus: u32,
    /// Hit points lost per world unit fallen.
    pub fall_damage_per_unit: f64,
    /// Number of fine descent steps per coarse step when settling onto a floor.
    pub fall_refinement_steps: u32,
    /// Jump force contributed by every remaining action point.
    pub jump_force_per_action_point: f64,
    /// Duration in seconds during which the jump force acts.
    pub jump_thrust_duration: f64,
    /// Longest flight time traced before a jump is cut short, in seconds.
    pub max_jump_duration: f64,
    /// Gravitational acceleration in world units per second squared.
    pub gravity: f64,
    /// Relative radius growth per food ration eaten.
    pub food_growth: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_fan_half_angle: 0.7875,
            move_angular_step: 0.0175,
            move_radial_step_pixels: 10.0,
            min_move_distance: 0.1,
            activation_hit_point_bonus: 10,
            fall_damage_per_unit: 3.0,
            fall_refinement_steps: 10,
            jump_force_per_action_point: 5.0,
            jump_thrust_duration: 0.5,
            max_jump_duration: 60.0,
            gravity: 9.80665,
            food_growth: 0.10,
        }
    }
}

impl Tuning {
    /// Checks that every constant lies in the range the motion engine relies on.
    ///
    /// Search steps and durations must be positive, the fan must span at most
    /// [`MAX_FAN_STEPS`] headings per side, and damage, growth, force and
    /// gravity must not be negative.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        non_negative("move_fan_half_angle", self.move_fan_half_angle)?;
        positive("move_angular_step", self.move_angular_step)?;
        if self.move_fan_half_angle / self.move_angular_step > MAX_FAN_STEPS {
            return Err(invalid("move_angular_step", self.move_angular_step));
        }
        positive("move_radial_step_pixels", self.move_radial_step_pixels)?;
        if self.move_radial_step_pixels < MIN_RADIAL_STEP_PIXELS {
            return Err(invalid("move_radial_step_pixels", self.move_radial_step_pixels));
        }
        positive("min_move_distance", self.min_move_distance)?;
        non_negative("fall_damage_per_unit", self.fall_damage_per_unit)?;
        if !(1..=MAX_FALL_REFINEMENT_STEPS).contains(&self.fall_refinement_steps) {
            return Err(invalid("fall_refinement_steps", f64::from(self.fall_refinement_steps)));
        }
        non_negative("jump_force_per_action_point", self.jump_force_per_action_point)?;
        non_negative("jump_thrust_duration", self.jump_thrust_duration)?;
        positive("max_jump_duration", self.max_jump_duration)?;
        non_negative("gravity", self.gravity)?;
        non_negative("food_growth", self.food_growth)
    }
}

fn invalid(field: &'static str, value: f64) -> ConfigurationError {
    ConfigurationError::InvalidTuning { field, value }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value))
    }
}
