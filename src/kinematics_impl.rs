use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::parameters::dh_kinematics::DhParameters;
use nalgebra::{Isometry3, Matrix3x6, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Distance from the flange to the tool center point of the default tool, meters along tool Z.
pub const DEFAULT_TCP_OFFSET: f64 = 0.200;

/// Homogeneous transform of one DH link: `Rz(theta) * Tz(d) * Tx(a) * Rx(alpha)`.
pub fn dh_transform(theta: f64, d: f64, a: f64, alpha: f64) -> Matrix4<f64> {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();
    Matrix4::new(
        ct, -st * ca, st * sa, a * ct,
        st, ct * ca, -ct * sa, a * st,
        0.0, sa, ca, d,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Serial chain described by DH parameters with a fixed tool attached to the last link.
#[derive(Debug, Clone)]
pub struct DhKinematics {
    parameters: DhParameters,

    /// Transform from the last DH frame to the tool center point.
    tool: Matrix4<f64>,
}

impl DhKinematics {
    /// Creates the chain with a tool that only extends along the Z axis of the flange.
    pub fn new(parameters: DhParameters, tcp_offset: f64) -> Self {
        let tool = Isometry3::translation(0.0, 0.0, tcp_offset);
        Self::new_with_tool(parameters, &tool)
    }

    /// Creates the chain with an arbitrary rigid tool transform.
    pub fn new_with_tool(parameters: DhParameters, tool: &Isometry3<f64>) -> Self {
        DhKinematics {
            parameters,
            tool: tool.to_homogeneous(),
        }
    }

    pub fn parameters(&self) -> &DhParameters {
        &self.parameters
    }

    /// Offset of the tool center point along the flange Z axis.
    pub fn tcp_offset(&self) -> f64 {
        self.tool[(2, 3)]
    }

    /// Frames of all six links (cumulative from the base) followed by the tool center point.
    pub fn forward_frames(&self, qs: &Joints) -> [Matrix4<f64>; 7] {
        let p = &self.parameters;
        let mut frames = [Matrix4::<f64>::identity(); 7];
        let mut t = Matrix4::<f64>::identity();
        for i in 0..6 {
            t *= dh_transform(qs[i], p.d[i], p.a[i], p.alpha[i]);
            frames[i] = t;
        }
        frames[6] = t * self.tool;
        frames
    }

    fn tcp_transform(&self, qs: &Joints) -> Matrix4<f64> {
        let p = &self.parameters;
        let mut t = Matrix4::<f64>::identity();
        for i in 0..6 {
            t *= dh_transform(qs[i], p.d[i], p.a[i], p.alpha[i]);
        }
        t * self.tool
    }
}

impl Default for DhKinematics {
    fn default() -> Self {
        DhKinematics::new(DhParameters::ur10(), DEFAULT_TCP_OFFSET)
    }
}

fn translation_of(m: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

impl Kinematics for DhKinematics {
    fn forward(&self, qs: &Joints) -> Pose {
        let t = self.tcp_transform(qs);
        let rotation = Rotation3::from_matrix_unchecked(t.fixed_view::<3, 3>(0, 0).into_owned());
        Pose::from_parts(Translation3::from(translation_of(&t)),
                         UnitQuaternion::from_rotation_matrix(&rotation))
    }

    fn tcp_position(&self, qs: &Joints) -> Vector3<f64> {
        translation_of(&self.tcp_transform(qs))
    }

    /// Geometric Jacobian of the tcp position: joint `i` turns about the Z axis of the
    /// frame before it, so its column is `z(i-1) x (p_tcp - o(i-1))`.
    fn position_jacobian(&self, qs: &Joints) -> Matrix3x6<f64> {
        let frames = self.forward_frames(qs);
        let tcp = translation_of(&frames[6]);
        let mut jacobian = Matrix3x6::zeros();
        for i in 0..6 {
            let (axis, origin) = if i == 0 {
                (Vector3::z(), Vector3::zeros())
            } else {
                let previous = &frames[i - 1];
                (previous.fixed_view::<3, 1>(0, 2).into_owned(), translation_of(previous))
            };
            jacobian.set_column(i, &axis.cross(&(tcp - origin)));
        }
        jacobian
    }
}
