//! Closed-form and incremental kinematics. Nothing here touches colliders: each function
//! takes the current state by value and hands back the next one.

use crate::{body::Body, Fp, Vec2};

#[inline]
fn deg_to_rad(deg: Fp) -> Fp {
    deg * (std::f64::consts::PI as Fp / 180.0)
}

#[inline]
fn unit_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}

pub fn linear(pos: Vec2, direction: Vec2, speed: Fp, dt: Fp) -> Vec2 {
    //! Moves at `speed` along `direction`, which needn't be normalised. A zero direction
    //! stays put.
    pos + unit_or_zero(direction) * (speed * dt)
}

/// Position and velocity, advanced together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub pos: Vec2,
    pub vel: Vec2,
}

pub fn accelerated(state: Kinematics, accel: Vec2, max_speed: Fp, dt: Fp) -> Kinematics {
    //! Semi-implicit Euler step. When `max_speed > 0` each velocity component is clamped
    //! to `±max_speed` separately.
    let mut vel = state.vel + accel * dt;
    if max_speed > 0.0 {
        vel = vel.max(Vec2::splat(-max_speed)).min(Vec2::splat(max_speed));
    }
    Kinematics { pos: state.pos + vel * dt, vel }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

pub fn axis_accelerated(
    pos: Vec2,
    axis: Axis,
    speed: Fp,
    accel: Fp,
    max_speed: Fp,
    dt: Fp,
) -> (Vec2, Fp) {
    //! Accelerates along a single axis, always clamping to `±max_speed`.
    //! Returns the new position and speed.
    let speed = (speed + accel * dt).max(-max_speed).min(max_speed);
    let step = speed * dt;
    let pos = match axis {
        Axis::Horizontal => Vec2::new(pos.x + step, pos.y),
        Axis::Vertical => Vec2::new(pos.x, pos.y + step),
    };
    (pos, speed)
}

/// The frame a satellite circles around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub pos: Vec2,
    pub right: Vec2,
    pub up: Vec2,
}
impl Pivot {
    pub fn at(pos: Vec2) -> Pivot {
        Pivot { pos, right: Vec2::new(1.0, 0.0), up: Vec2::new(0.0, 1.0) }
    }
    /// Takes the body's current position and facing, so a mirrored body mirrors the orbit.
    pub fn of(body: &dyn Body) -> Pivot {
        Pivot { pos: body.position(), right: body.right(), up: body.up() }
    }
}

/// Angle (degrees) and angular speed (degrees per second) of a circling satellite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orbit {
    pub angle: Fp,
    pub angular_speed: Fp,
}
impl Orbit {
    pub fn uniform(self, pivot: &Pivot, radius: Fp, dt: Fp) -> (Vec2, Orbit) {
        self.accelerated(pivot, radius, 0.0, 0.0, dt)
    }

    pub fn accelerated(
        self,
        pivot: &Pivot,
        radius: Fp,
        accel: Fp,
        max_speed: Fp,
        dt: Fp,
    ) -> (Vec2, Orbit) {
        //! Returns the satellite's position and the advanced orbit. `max_speed <= 0` means
        //! unclamped. The angle wraps once it passes 360.
        let mut angular_speed = self.angular_speed + accel * dt;
        if max_speed > 0.0 {
            angular_speed = angular_speed.max(-max_speed).min(max_speed);
        }
        let mut angle = self.angle + angular_speed * dt;
        if angle >= 360.0 {
            angle -= 360.0;
        }

        let theta = deg_to_rad(angle);
        let pos = Vec2::new(
            pivot.pos.x + pivot.right.x * theta.cos() * radius,
            pivot.pos.y + pivot.up.y * theta.sin() * radius,
        );
        (pos, Orbit { angle, angular_speed })
    }
}

/// A body thrown from `origin` under constant `gravity` (applied along y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub origin: Vec2,
    pub velocity: Vec2,
    pub gravity: Fp,
    pub elapsed: Fp,
}
impl Projectile {
    pub fn launch(origin: Vec2, speed: Fp, angle_deg: Fp, gravity: Fp) -> Projectile {
        let theta = deg_to_rad(angle_deg);
        Projectile {
            origin,
            velocity: Vec2::new(theta.cos() * speed, theta.sin() * speed),
            gravity,
            elapsed: 0.0,
        }
    }

    pub fn position_at(&self, t: Fp) -> Vec2 {
        Vec2::new(
            self.origin.x + self.velocity.x * t,
            self.origin.y + self.velocity.y * t + self.gravity * t * t * 0.5,
        )
    }

    pub fn step(&mut self, dt: Fp) -> Vec2 {
        //! Advances the clock and returns the closed-form position, so steps never drift.
        self.elapsed += dt;
        self.position_at(self.elapsed)
    }
}
