use core::f32::consts::PI;

use libm::{atan2f, roundf};
use nalgebra::Vector2;

/// Tenths of a degree in one full turn
pub const FULL_TURN_TENTHS: u16 = 3600;

/// Compass heading as reported by the chip, in tenths of a degree (0-3599)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heading(u16);

impl Heading {
    pub const fn from_tenths(tenths: u16) -> Self {
        Self(tenths)
    }

    /// Heading of a horizontal field vector, measured from +X towards +Y.
    ///
    /// Meant for compensated X/Y magnetometer output; the result is rounded to
    /// the nearest tenth of a degree and wrapped into 0..3600.
    pub fn from_field(field: Vector2<f32>) -> Self {
        let degrees = atan2f(field.y, field.x) * 180.0 / PI;
        let tenths = (roundf(degrees * 10.0) as i32).rem_euclid(FULL_TURN_TENTHS as i32);
        Self(tenths as u16)
    }

    /// Raw value, tenths of a degree
    pub const fn tenths(self) -> u16 {
        self.0
    }

    pub fn degrees(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    pub fn radians(self) -> f32 {
        self.degrees() * PI / 180.0
    }
}

impl From<Heading> for u16 {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}
