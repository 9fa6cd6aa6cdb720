use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::Level;

use rs_trajopt::parameters_from_file::Workcell;
use rs_trajopt::planning::optimizer::{PlannerConfig, TrajectoryOptimizer};

/// Plans a joint-space trajectory through the given waypoints and prints one line per sample.
#[derive(Parser)]
#[command(name = "rs-trajopt")]
#[command(about = "Joint-space trajectory optimizer for six-axis DH robots", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML workcell description (robot, limits, obstacles, waypoints)
    #[arg(long, short)]
    config: Option<String>,

    /// Waypoint as six comma separated joint angles in degrees, repeat for every waypoint.
    /// Replaces the waypoints of the configuration file.
    #[arg(long, short, allow_hyphen_values = true)]
    waypoint: Vec<String>,

    /// Samples from one waypoint to the next
    #[arg(long, short)]
    steps: Option<usize>,

    /// Log solver statistics
    #[arg(long, short)]
    verbose: bool,
}

fn parse_waypoint(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|value| value.trim().parse::<f64>()
            .with_context(|| format!("Invalid joint value '{}' in waypoint '{}'", value, text)))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let (mut config, file_waypoints) = match &cli.config {
        Some(path) => {
            let workcell = Workcell::from_yaml_file(path)
                .with_context(|| format!("Failed to read workcell from {}", path))?;
            let waypoints = workcell.waypoints.iter().map(|w| w.to_vec()).collect();
            (workcell.config, waypoints)
        }
        None => (PlannerConfig::default(), Vec::new()),
    };

    if let Some(steps) = cli.steps {
        config.steps_between_waypoints = steps;
    }

    let waypoints: Vec<Vec<f64>> = if cli.waypoint.is_empty() {
        file_waypoints
    } else {
        cli.waypoint.iter().map(|w| parse_waypoint(w)).collect::<Result<_>>()?
    };
    if waypoints.is_empty() {
        bail!("No waypoints given, use --waypoint or list them in the configuration file");
    }

    let optimizer = TrajectoryOptimizer::new(config);
    let trajectory = optimizer.plan_trajectory(&waypoints)?;
    trajectory.dump();
    Ok(())
}
