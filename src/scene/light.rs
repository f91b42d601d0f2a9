use glam::Vec4;

/// Point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Linear RGBA, alpha is always 1.
    pub color: Vec4,
    radius: f32,
}

impl Light {
    #[must_use]
    pub fn point(color: Vec4, radius: f32) -> Self {
        let mut light = Self { color, radius: 0.0 };
        light.set_radius(radius);
        light
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radius is kept strictly positive.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(f32::EPSILON);
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::point(Vec4::ONE, 2.0)
    }
}
