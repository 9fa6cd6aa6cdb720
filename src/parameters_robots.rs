//! Hardcoded DH parameters for a few robots

pub mod dh_kinematics {
    use crate::parameters::dh_kinematics::DhParameters;
    use std::f64::consts::PI;

    /// Twists shared by the Universal Robots e-series and CB-series arms.
    const UR_ALPHA: [f64; 6] = [PI / 2.0, 0.0, 0.0, PI / 2.0, -PI / 2.0, 0.0];

    #[allow(dead_code)]
    impl DhParameters {
        /// Universal Robots UR10, the robot of the default workcell.
        pub fn ur10() -> Self {
            DhParameters {
                d: [0.1273, 0.0, 0.0, 0.1639, 0.1157, 0.0922],
                a: [0.0, -0.612, -0.5723, 0.0, 0.0, 0.0],
                alpha: UR_ALPHA,
            }
        }

        pub fn ur5() -> Self {
            DhParameters {
                d: [0.089159, 0.0, 0.0, 0.10915, 0.09465, 0.0823],
                a: [0.0, -0.425, -0.39225, 0.0, 0.0, 0.0],
                alpha: UR_ALPHA,
            }
        }

        pub fn ur3() -> Self {
            DhParameters {
                d: [0.1519, 0.0, 0.0, 0.11235, 0.08535, 0.0819],
                a: [0.0, -0.24365, -0.21325, 0.0, 0.0, 0.0],
                alpha: UR_ALPHA,
            }
        }

        /// Looks up one of the built-in robots by its lowercase name.
        pub fn by_name(name: &str) -> Option<Self> {
            match name.trim().to_lowercase().as_str() {
                "ur10" => Some(Self::ur10()),
                "ur5" => Some(Self::ur5()),
                "ur3" => Some(Self::ur3()),
                _ => None,
            }
        }
    }
}
