// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use core::f64::consts::PI;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Below this, summed absolute velocity and summed absolute displacement
/// count as motionless.
pub const REST_THRESHOLD: f64 = 0.001;

/// Advances a damped spring by one implicit-Euler step and returns the new
/// `(position, velocity)`. `damping` is the damping ratio (0 is undamped, 1
/// is critically damped) and `frequency` is the oscillation frequency in Hz.
/// The implicit step stays stable for any positive `dt`.
pub fn spring_step(
    current: f64,
    velocity: f64,
    target: f64,
    damping: f64,
    frequency: f64,
    dt: f64,
) -> (f64, f64) {
    let omega = 2.0 * PI * frequency;
    let f = 1.0 + 2.0 * dt * damping * omega;
    let hoo = dt * omega * omega;
    let hhoo = dt * hoo;
    let det_inv = 1.0 / (f + hhoo);
    let det_x = f * current + dt * velocity + hhoo * target;
    let det_v = velocity + hoo * (target - current);
    (det_x * det_inv, det_v * det_inv)
}

/// One axis of a spring.
#[derive(Clone, Debug, Builder, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct SpringAxis {
    /// Damping ratio.
    #[derivative(Default(value = "Normal::new_const(0.4)"))]
    damping: Normal,

    /// Oscillation frequency in Hz.
    #[derivative(Default(value = "6.0"))]
    frequency: f64,

    #[serde(skip)]
    #[builder(setter(skip))]
    e: SpringAxisEphemerals,
}
#[derive(Clone, Debug, Default)]
pub struct SpringAxisEphemerals {
    current: f64,
    target: f64,
    velocity: f64,
}
#[allow(missing_docs)]
impl SpringAxis {
    pub fn new_with(damping: Normal, frequency: f64) -> Self {
        Self {
            damping,
            frequency,
            e: Default::default(),
        }
    }

    pub fn damping(&self) -> Normal {
        self.damping
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn current(&self) -> f64 {
        self.e.current
    }

    pub fn target(&self) -> f64 {
        self.e.target
    }

    pub fn velocity(&self) -> f64 {
        self.e.velocity
    }

    /// Moves instantly, with no motion left over.
    pub fn teleport(&mut self, value: f64) {
        self.e.current = value;
        self.e.target = value;
        self.e.velocity = 0.0;
    }

    pub fn set_target(&mut self, target: f64) {
        self.e.target = target;
    }

    pub fn add_velocity(&mut self, impulse: f64) {
        self.e.velocity += impulse;
    }

    pub fn step(&mut self, dt: f64) {
        (self.e.current, self.e.velocity) = spring_step(
            self.e.current,
            self.e.velocity,
            self.e.target,
            self.damping.get(),
            self.frequency,
            dt,
        );
    }

    /// Snaps onto the target and drops all velocity.
    pub fn settle(&mut self) {
        self.e.current = self.e.target;
        self.e.velocity = 0.0;
    }

    /// Halts where it is: the current position becomes the target.
    pub fn halt(&mut self) {
        self.e.target = self.e.current;
        self.e.velocity = 0.0;
    }

    fn displacement(&self) -> f64 {
        (self.e.current - self.e.target).abs()
    }
}

/// A spring over all three axes of a [Vector].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpringCore {
    #[allow(missing_docs)]
    pub x: SpringAxis,
    #[allow(missing_docs)]
    pub y: SpringAxis,
    #[allow(missing_docs)]
    pub z: SpringAxis,
}
#[allow(missing_docs)]
impl SpringCore {
    /// The same damping and frequency on every axis.
    pub fn uniform(damping: Normal, frequency: f64) -> Self {
        let axis = SpringAxis::new_with(damping, frequency);
        Self {
            x: axis.clone(),
            y: axis.clone(),
            z: axis,
        }
    }

    fn axes(&self) -> [&SpringAxis; 3] {
        [&self.x, &self.y, &self.z]
    }

    fn axes_mut(&mut self) -> [&mut SpringAxis; 3] {
        [&mut self.x, &mut self.y, &mut self.z]
    }

    pub fn current(&self) -> Vector {
        Vector::new(self.x.current(), self.y.current(), self.z.current())
    }

    pub fn target(&self) -> Vector {
        Vector::new(self.x.target(), self.y.target(), self.z.target())
    }

    pub fn velocity(&self) -> Vector {
        Vector::new(self.x.velocity(), self.y.velocity(), self.z.velocity())
    }

    pub fn teleport(&mut self, value: Vector) {
        for (axis, v) in self.axes_mut().into_iter().zip(value.iter()) {
            axis.teleport(*v);
        }
    }

    pub fn move_to(&mut self, target: Vector) {
        for (axis, t) in self.axes_mut().into_iter().zip(target.iter()) {
            axis.set_target(*t);
        }
    }

    /// Shifts the target by `offset`, on top of any move already underway.
    pub fn move_to_additive(&mut self, offset: Vector) {
        self.move_to(self.target() + offset);
    }

    /// Kicks the spring without moving its target.
    pub fn bump(&mut self, impulse: Vector) {
        for (axis, v) in self.axes_mut().into_iter().zip(impulse.iter()) {
            axis.add_velocity(*v);
        }
    }

    /// Whether the summed velocity and summed displacement are both below
    /// [REST_THRESHOLD].
    pub fn is_at_rest(&self) -> bool {
        let axes = self.axes();
        let velocity: f64 = axes.iter().map(|a| a.velocity().abs()).sum();
        let displacement: f64 = axes.iter().map(|a| a.displacement()).sum();
        velocity < REST_THRESHOLD && displacement < REST_THRESHOLD
    }

    /// Advances by `dt` seconds. Returns whether the spring is still moving;
    /// when it comes to rest, it snaps exactly onto its target.
    pub fn step(&mut self, dt: f64) -> bool {
        if self.is_at_rest() {
            self.settle();
            return false;
        }
        for axis in self.axes_mut() {
            axis.step(dt);
        }
        if self.is_at_rest() {
            self.settle();
            false
        } else {
            true
        }
    }

    /// Snaps onto the target.
    pub fn settle(&mut self) {
        for axis in self.axes_mut() {
            axis.settle();
        }
    }

    /// Freezes in place.
    pub fn halt(&mut self) {
        for axis in self.axes_mut() {
            axis.halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use more_asserts::{assert_gt, assert_lt};

    #[test]
    fn target_is_a_fixed_point() {
        for (damping, frequency, dt) in [(0.4, 6.0, 1.0 / 60.0), (0.0, 100.0, 10.0)] {
            let (x, v) = spring_step(3.0, 0.0, 3.0, damping, frequency, dt);
            assert!(approx_eq!(f64, x, 3.0, epsilon = 1e-12));
            assert_eq!(v, 0.0, "no displacement means no acceleration");
        }
    }

    #[test]
    fn step_moves_toward_target() {
        let (x, v) = spring_step(0.0, 0.0, 1.0, 0.4, 6.0, 1.0 / 60.0);
        assert_gt!(x, 0.0);
        assert_lt!(x, 1.0);
        assert_gt!(v, 0.0);
    }

    #[test]
    fn bumped_spring_comes_to_rest_for_any_damping() {
        for damping in [0.05, 0.1, 0.25, 0.4, 0.7, 1.0] {
            let mut spring = SpringCore::uniform(Normal::new(damping), 6.0);
            spring.teleport(Vector::new(2.0, -1.0, 0.5));
            spring.bump(Vector::new(30.0, 0.0, -5.0));

            let mut steps = 0;
            while spring.step(1.0 / 60.0) {
                steps += 1;
                assert_lt!(steps, 100_000, "damping {damping} should terminate");
            }
            assert!(spring.is_at_rest());
            assert_eq!(
                spring.current(),
                Vector::new(2.0, -1.0, 0.5),
                "a bump should settle exactly back where it started"
            );
            assert_eq!(spring.velocity(), Vector::zeros());
        }
    }

    #[test]
    fn move_to_settles_exactly_on_target() {
        let mut spring = SpringCore::default();
        spring.move_to(Vector::new(10.0, 0.0, 0.0));
        assert!(!spring.is_at_rest());
        for _ in 0..10_000 {
            if !spring.step(1.0 / 60.0) {
                break;
            }
        }
        assert_eq!(spring.current(), Vector::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn additive_moves_accumulate() {
        let mut spring = SpringCore::default();
        spring.move_to_additive(Vector::new(1.0, 0.0, 0.0));
        spring.move_to_additive(Vector::new(1.0, 2.0, 0.0));
        assert_eq!(spring.target(), Vector::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn halt_freezes_in_place() {
        let mut spring = SpringCore::default();
        spring.move_to(Vector::new(5.0, 0.0, 0.0));
        spring.step(1.0 / 60.0);
        let here = spring.current();
        spring.halt();
        assert!(spring.is_at_rest());
        assert!(!spring.step(1.0 / 60.0));
        assert_eq!(spring.current(), here);
    }
}
