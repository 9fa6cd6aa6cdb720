//! Defines the Denavit-Hartenberg parameter data structure

pub mod dh_kinematics {
    use crate::utils::deg;

    /// Classic Denavit-Hartenberg parameters of a six joint serial arm.
    /// See [parameters_robots.rs](parameters_robots.rs) for concrete robot models.
    /// Joint `i` contributes `Rz(theta_i) * Tz(d[i]) * Tx(a[i]) * Rx(alpha[i])`.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DhParameters {
        /// Link offsets along the previous z axis, meters.
        pub d: [f64; 6],

        /// Link lengths along the rotated x axis, meters.
        pub a: [f64; 6],

        /// Link twists about the rotated x axis, radians.
        pub alpha: [f64; 6],
    }

    impl DhParameters {
        /// Convert to string yaml representation (quick viewing, etc).
        /// The output is accepted by the workcell configuration loader.
        pub fn to_yaml(&self) -> String {
            format!(
                "dh_parameters:\n  \
              d: [{}]\n  \
              a: [{}]\n  \
              alpha: [{}]\n",
                self.d.iter().map(|x| x.to_string())
                    .collect::<Vec<_>>().join(", "),
                self.a.iter().map(|x| x.to_string())
                    .collect::<Vec<_>>().join(", "),
                self.alpha.iter().map(|x| deg(x))
                    .collect::<Vec<_>>().join(", "),
            )
        }

        /// True if all parameters are finite numbers.
        pub fn is_finite(&self) -> bool {
            self.d.iter()
                .chain(self.a.iter())
                .chain(self.alpha.iter())
                .all(|v| v.is_finite())
        }
    }
}
