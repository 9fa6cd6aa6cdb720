//! Supports reading the workcell description from YAML file (optional)

use std::path::Path;

use regex::Regex;
use yaml_rust2::{Yaml, YamlLoader};

use crate::constraints::Constraints;
use crate::kinematics_impl::DEFAULT_TCP_OFFSET;
use crate::obstacle::ObstacleBox;
use crate::parameter_error::ParameterError;
use crate::parameters::dh_kinematics::DhParameters;
use crate::planning::optimizer::{PlannerConfig, DEFAULT_MIN_CLEARANCE, DEFAULT_STEPS_BETWEEN_WAYPOINTS};
use crate::utils::deg;

/// Planner configuration together with the waypoints (degrees) listed in the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct Workcell {
    pub config: PlannerConfig,
    pub waypoints: Vec<[f64; 6]>,
}

impl Workcell {
    /// Read the workcell from YAML file. YAML file like this is supported:
    /// ```yaml
    /// robot: ur10
    /// tcp_offset: 0.2
    /// steps_between_waypoints: 3
    /// joint_limits:
    ///   from: [deg(-180), deg(-180), deg(-180), deg(-180), deg(-180), deg(-180)]
    ///   to: [deg(180), deg(180), deg(180), deg(180), deg(180), deg(180)]
    /// min_clearance: 0.05
    /// obstacles:
    ///   - [-0.095, 0.115, -0.76, -0.70, 0.125, 0.325]
    /// waypoints:
    ///   - [0, 0, 0, 0, 0, 0]
    ///   - [90, 90, 90, 90, 90, 90]
    /// ```
    /// `dh_parameters` with `d`, `a` and `alpha` lists may be given instead of (or to override)
    /// the robot name. All keys are optional, missing ones take the defaults of
    /// [`PlannerConfig`]. Angles in `alpha` and `joint_limits` are radians unless written
    /// as `deg(angle)`. Waypoints are always degrees.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Err(ParameterError::ParseError("empty document".to_string())),
        };
        if doc.as_hash().is_none() {
            return Err(ParameterError::ParseError("top level must be a mapping".to_string()));
        }

        let defaults = PlannerConfig::default();

        let mut parameters = match &doc["robot"] {
            Yaml::BadValue => defaults.parameters,
            Yaml::String(name) => DhParameters::by_name(name)
                .ok_or_else(|| ParameterError::UnknownRobot(name.clone()))?,
            _ => return Err(ParameterError::ParseError("robot must be a name".to_string())),
        };

        let dh = &doc["dh_parameters"];
        if !dh.is_badvalue() {
            parameters = DhParameters {
                d: read_six(&dh["d"], "dh_parameters.d")?,
                a: read_six(&dh["a"], "dh_parameters.a")?,
                alpha: read_six(&dh["alpha"], "dh_parameters.alpha")?,
            };
        }
        if !parameters.is_finite() {
            return Err(ParameterError::ParameterPopulationError(
                "DH parameters must be finite".to_string()));
        }

        let tcp_offset = optional_number(&doc["tcp_offset"], "tcp_offset")?
            .unwrap_or(DEFAULT_TCP_OFFSET);

        let steps_between_waypoints = match &doc["steps_between_waypoints"] {
            Yaml::BadValue => DEFAULT_STEPS_BETWEEN_WAYPOINTS,
            Yaml::Integer(n) if *n > 0 => *n as usize,
            other => return Err(ParameterError::ParseError(format!(
                "steps_between_waypoints must be a positive integer, got {:?}", other))),
        };

        let limits_node = &doc["joint_limits"];
        let limits = if limits_node.is_badvalue() {
            defaults.limits
        } else {
            Constraints::new(
                read_six(&limits_node["from"], "joint_limits.from")?,
                read_six(&limits_node["to"], "joint_limits.to")?,
            )
        };

        let min_clearance = optional_number(&doc["min_clearance"], "min_clearance")?
            .unwrap_or(DEFAULT_MIN_CLEARANCE);

        let obstacles = match &doc["obstacles"] {
            Yaml::BadValue => defaults.obstacles,
            Yaml::Array(items) => items.iter().enumerate()
                .map(|(i, item)| read_six(item, &format!("obstacles[{}]", i))
                    .map(|extents| ObstacleBox::from_extents(&extents)))
                .collect::<Result<Vec<_>, _>>()?,
            Yaml::Null => vec![],
            _ => return Err(ParameterError::ParseError("obstacles must be a list".to_string())),
        };

        let waypoints = match &doc["waypoints"] {
            Yaml::BadValue | Yaml::Null => vec![],
            Yaml::Array(items) => items.iter().enumerate()
                .map(|(i, item)| read_six_degrees(item, &format!("waypoints[{}]", i)))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ParameterError::ParseError("waypoints must be a list".to_string())),
        };

        Ok(Workcell {
            config: PlannerConfig {
                parameters,
                tcp_offset,
                steps_between_waypoints,
                limits,
                obstacles,
                min_clearance,
            },
            waypoints,
        })
    }
}

impl PlannerConfig {
    /// Reads the planner configuration, ignoring waypoints the file may list.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        Ok(Workcell::from_yaml_file(path)?.config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        Ok(Workcell::from_yaml_str(contents)?.config)
    }

    /// Convert to string yaml representation, readable by [`PlannerConfig::from_yaml_str`].
    pub fn to_yaml(&self) -> String {
        let radians = |values: &[f64; 6]| values.iter().map(deg).collect::<Vec<_>>().join(", ");
        let mut yaml = self.parameters.to_yaml();
        yaml.push_str(&format!(
            "tcp_offset: {}\n\
            steps_between_waypoints: {}\n\
            joint_limits:\n  \
              from: [{}]\n  \
              to: [{}]\n\
            min_clearance: {}\n",
            self.tcp_offset,
            self.steps_between_waypoints,
            radians(&self.limits.from),
            radians(&self.limits.to),
            self.min_clearance,
        ));
        if self.obstacles.is_empty() {
            yaml.push_str("obstacles: []\n");
        } else {
            yaml.push_str("obstacles:\n");
            for obstacle in &self.obstacles {
                let extents = obstacle.extents().iter()
                    .map(|x| x.to_string()).collect::<Vec<_>>().join(", ");
                yaml.push_str(&format!("  - [{}]\n", extents));
            }
        }
        yaml
    }
}

fn optional_number(value: &Yaml, label: &str) -> Result<Option<f64>, ParameterError> {
    if value.is_badvalue() {
        return Ok(None);
    }
    parse_number(value, label).map(Some)
}

/// Reads a number that may be written as `deg(angle)`, converting degrees to radians.
fn parse_number(value: &Yaml, label: &str) -> Result<f64, ParameterError> {
    match value {
        Yaml::Integer(v) => Ok(*v as f64),
        Yaml::Real(_) => value.as_f64()
            .ok_or_else(|| ParameterError::ParseError(format!("{}: invalid number", label))),
        Yaml::String(text) => parse_angle(text)
            .ok_or_else(|| ParameterError::WrongAngle(format!("{}: {}", label, text))),
        Yaml::BadValue => Err(ParameterError::MissingField(label.to_string())),
        other => Err(ParameterError::ParseError(format!("{}: expected a number, got {:?}", label, other))),
    }
}

/// Parses `deg(angle)` into radians.
fn parse_angle(text: &str) -> Option<f64> {
    let re = Regex::new(r"^\s*deg\(\s*(-?\d+(\.\d+)?)\s*\)\s*$").ok()?;
    let captures = re.captures(text)?;
    let degrees: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(degrees.to_radians())
}

fn read_six(value: &Yaml, label: &str) -> Result<[f64; 6], ParameterError> {
    let items = match value {
        Yaml::Array(items) => items,
        Yaml::BadValue => return Err(ParameterError::MissingField(label.to_string())),
        _ => return Err(ParameterError::ParseError(format!("{} must be a list", label))),
    };
    if items.len() != 6 {
        return Err(ParameterError::InvalidLength { expected: 6, found: items.len() });
    }
    let mut out = [0.0; 6];
    for (i, item) in items.iter().enumerate() {
        out[i] = parse_number(item, label)?;
    }
    Ok(out)
}

/// Waypoints are degrees already, `deg(..)` is accepted and means the same.
fn read_six_degrees(value: &Yaml, label: &str) -> Result<[f64; 6], ParameterError> {
    let mut out = read_six(value, label)?;
    if let Yaml::Array(items) = value {
        for (i, item) in items.iter().enumerate() {
            if let Yaml::String(_) = item {
                out[i] = out[i].to_degrees();
            }
        }
    }
    Ok(out)
}
