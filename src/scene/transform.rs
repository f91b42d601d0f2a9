use glam::{Mat4, Quat, Vec3};

/// Converts FBX Euler angles in degrees (X applied first, then Y, then Z)
/// into a quaternion.
#[must_use]
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    let r = Vec3::new(euler.x.to_radians(), euler.y.to_radians(), euler.z.to_radians());
    Quat::from_rotation_z(r.z) * Quat::from_rotation_y(r.y) * Quat::from_rotation_x(r.x)
}

/// Transform component
///
/// Holds the full FBX local transform decomposition. The local matrix is
///
/// ```text
/// T · Roff · Rp · Rpre · R · Rpost⁻¹ · Rp⁻¹ · Soff · Sp · S · Sp⁻¹
/// ```
///
/// which reduces to plain TRS when every offset and pivot is zero and the
/// pre/post rotations are identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub pre_rotation: Quat,
    pub post_rotation: Quat,
    pub rotation_offset: Vec3,
    pub rotation_pivot: Vec3,
    pub scaling_offset: Vec3,
    pub scaling_pivot: Vec3,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            pre_rotation: Quat::IDENTITY,
            post_rotation: Quat::IDENTITY,
            rotation_offset: Vec3::ZERO,
            rotation_pivot: Vec3::ZERO,
            scaling_offset: Vec3::ZERO,
            scaling_pivot: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::new()
        }
    }

    /// Sets the rotation from Euler degrees.
    pub fn set_rotation_euler_degrees(&mut self, euler: Vec3) {
        self.rotation = quat_from_euler_degrees(euler);
    }

    /// Composes the local matrix.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        let pivot = Mat4::from_translation(self.rotation_pivot);
        let scaling_pivot = Mat4::from_translation(self.scaling_pivot);

        Mat4::from_translation(self.position)
            * Mat4::from_translation(self.rotation_offset)
            * pivot
            * Mat4::from_quat(self.pre_rotation)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_quat(self.post_rotation.inverse())
            * pivot.inverse()
            * Mat4::from_translation(self.scaling_offset)
            * scaling_pivot
            * Mat4::from_scale(self.scale)
            * scaling_pivot.inverse()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
