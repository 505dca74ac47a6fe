use kurbo::Affine;

/// Affine pose of a clip: position, scale, rotation and opacity.
///
/// Opacity is clamped to `[0, 1]` on every write, including deserialization;
/// the other fields are unconstrained. The external view layer consumes this
/// via [`Transformation::to_affine`] plus [`Transformation::opacity`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Transformation {
    /// Horizontal position, in project pixels.
    pub x: f64,
    /// Vertical position, in project pixels.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    opacity: f64,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transformation {
    /// Current opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Set opacity, clamping into `[0, 1]`. NaN clamps to 0.
    pub fn set_opacity(&mut self, value: f64) {
        self.opacity = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    /// Compose the pose into a single affine: translate, then rotate, then
    /// scale (matching how the view layer stacks clip transforms).
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

impl<'de> serde::Deserialize<'de> for Transformation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Repr {
            x: f64,
            y: f64,
            scale_x: f64,
            scale_y: f64,
            rotation: f64,
            opacity: f64,
        }

        let r = Repr::deserialize(deserializer)?;
        let mut t = Self {
            x: r.x,
            y: r.y,
            scale_x: r.scale_x,
            scale_y: r.scale_y,
            rotation: r.rotation,
            opacity: 1.0,
        };
        t.set_opacity(r.opacity);
        Ok(t)
    }
}
