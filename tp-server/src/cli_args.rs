use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tp_core::configuration::PlannerConfiguration;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Serves trade route optimization over HTTP", long_about = None)]
pub struct Cli {
    /// JSON catalog of shops, loaded once at startup
    #[arg(long, env("TRADE_PLANNER_CATALOG"), default_value = "shops.json")]
    pub catalog_path: PathBuf,
    #[arg(long, env("TRADE_PLANNER_BIND_ADDRESS"), default_value = "0.0.0.0:5000")]
    pub bind_address: SocketAddr,
    /// directory whose index.html is served at /
    #[arg(long, env("TRADE_PLANNER_STATIC_DIR"))]
    pub static_dir: Option<PathBuf>,
    /// share of a shop's stock a single plan may trade
    #[arg(long, env("TRADE_PLANNER_MAX_PERCENT"), default_value_t = 1.0)]
    pub max_percent: f64,
    /// weight of the travel cost when ordering the stops
    #[arg(long, env("TRADE_PLANNER_TRAVEL_WEIGHT"), default_value_t = 0.001)]
    pub travel_weight: f64,
}

impl Cli {
    pub fn planner_configuration(&self) -> PlannerConfiguration {
        PlannerConfiguration {
            max_percent: self.max_percent,
            travel_weight: self.travel_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let cli = Cli::try_parse_from(["trade-planner"]).unwrap();
        assert_eq!(cli.bind_address.port(), 5000);
        assert_eq!(cli.planner_configuration(), PlannerConfiguration::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from(["trade-planner", "--max-percent", "0.2", "--static-dir", "public"]).unwrap();
        assert_eq!(cli.planner_configuration().max_percent, 0.2);
        assert_eq!(cli.static_dir, Some(PathBuf::from("public")));
    }
}
