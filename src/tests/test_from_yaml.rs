#[cfg(test)]
mod tests {
    use crate::obstacle::ObstacleBox;
    use crate::parameter_error::ParameterError;
    use crate::parameters::dh_kinematics::DhParameters;
    use crate::parameters_from_file::Workcell;
    use crate::planning::optimizer::PlannerConfig;
    use crate::tests::test_utils::assert_six_close;
    use std::f64::consts::PI;

    const READ_ERROR: &'static str = "Failed to load workcell from file";

    #[test]
    fn test_workcell_from_yaml() {
        let filename = "src/tests/data/workcell.yaml";
        let loaded = Workcell::from_yaml_file(filename).expect(READ_ERROR);
        let expected = PlannerConfig::default();

        assert_eq!(expected.parameters, loaded.config.parameters);
        assert_eq!(expected.tcp_offset, loaded.config.tcp_offset);
        assert_eq!(expected.steps_between_waypoints, loaded.config.steps_between_waypoints);
        assert_eq!(expected.min_clearance, loaded.config.min_clearance);
        assert_eq!(expected.obstacles, loaded.config.obstacles);
        assert_six_close(&expected.limits.from, &loaded.config.limits.from, 1e-12);
        assert_six_close(&expected.limits.to, &loaded.config.limits.to, 1e-12);
        assert_eq!(loaded.waypoints, vec![[0.0; 6], [90.0; 6]]);
    }

    #[test]
    fn test_explicit_dh_parameters() {
        let filename = "src/tests/data/explicit_dh.yaml";
        let loaded = Workcell::from_yaml_file(filename).expect(READ_ERROR);
        let config = &loaded.config;

        assert_eq!(config.parameters.d, DhParameters::ur5().d);
        assert_eq!(config.parameters.a, DhParameters::ur5().a);
        assert_six_close(&config.parameters.alpha, &DhParameters::ur5().alpha, 1e-12);
        assert_eq!(config.tcp_offset, 0.15);
        assert_eq!(config.steps_between_waypoints, 5);
        assert_eq!(config.min_clearance, 0.02);
        assert_eq!(config.limits.to[1], 0.0);
        assert!((config.limits.from[0] + 2.0 * PI).abs() < 1e-12);
        assert_eq!(config.obstacles.len(), 2);
        assert_eq!(config.obstacles[1], ObstacleBox::new(-0.5, -0.3, -0.2, 0.2, -0.1, 0.1));

        assert_eq!(loaded.waypoints.len(), 3);
        assert_six_close(&loaded.waypoints[1], &[45.0, -90.0, 45.0, -90.0, 0.0, 0.0], 1e-9);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = PlannerConfig {
            parameters: DhParameters::ur3(),
            tcp_offset: 0.125,
            steps_between_waypoints: 7,
            obstacles: vec![ObstacleBox::workcell_fixture(), ObstacleBox::new(1.0, 1.5, -0.25, 0.25, 0.0, 2.0)],
            min_clearance: 0.1,
            ..PlannerConfig::default()
        };
        let yaml = config.to_yaml();
        let loaded = PlannerConfig::from_yaml_str(&yaml).expect(READ_ERROR);

        assert_eq!(config.parameters.d, loaded.parameters.d);
        assert_eq!(config.parameters.a, loaded.parameters.a);
        assert_six_close(&config.parameters.alpha, &loaded.parameters.alpha, 1e-6);
        assert_six_close(&config.limits.from, &loaded.limits.from, 1e-6);
        assert_six_close(&config.limits.to, &loaded.limits.to, 1e-6);
        assert_eq!(config.tcp_offset, loaded.tcp_offset);
        assert_eq!(config.steps_between_waypoints, loaded.steps_between_waypoints);
        assert_eq!(config.min_clearance, loaded.min_clearance);
        assert_eq!(config.obstacles, loaded.obstacles);
    }

    #[test]
    fn test_empty_obstacle_list_round_trip() {
        let config = PlannerConfig { obstacles: vec![], ..PlannerConfig::default() };
        let loaded = PlannerConfig::from_yaml_str(&config.to_yaml()).expect(READ_ERROR);
        assert!(loaded.obstacles.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let result = Workcell::from_yaml_file("src/tests/data/does_not_exist.yaml");
        assert!(matches!(result, Err(ParameterError::IoError(_))));
    }

    #[test]
    fn test_missing_dh_field() {
        let yaml = "dh_parameters:\n  d: [0, 0, 0, 0, 0, 0]\n  a: [0, 0, 0, 0, 0, 0]\n";
        match PlannerConfig::from_yaml_str(yaml) {
            Err(ParameterError::MissingField(field)) => assert_eq!(field, "dh_parameters.alpha"),
            other => panic!("Expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_steps_rejected() {
        let result = PlannerConfig::from_yaml_str("steps_between_waypoints: 0\n");
        assert!(matches!(result, Err(ParameterError::ParseError(_))));
    }
}
