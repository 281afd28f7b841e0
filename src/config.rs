use std::path::PathBuf;

use clap::Parser;

/// Default data file, looked up in the working directory.
pub const DEFAULT_DATA_FILE: &str = "Titanic.csv";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "titanic-dashboard", version, about = "Titanic passenger survival dashboard")]
pub struct Args {
    /// Passenger table to load (.csv, .json or .parquet).
    #[arg(short, long, env = "TITANIC_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    pub width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    pub height: f32,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub window_size: [f32; 2],
}

impl From<Args> for DashboardConfig {
    fn from(args: Args) -> Self {
        DashboardConfig {
            data_path: args.data,
            window_size: [args.width.max(600.0), args.height.max(400.0)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_arguments_win() {
        let args = Args::try_parse_from(["titanic-dashboard", "--data", "people.parquet", "--width", "1000"])
            .unwrap();
        let cfg = DashboardConfig::from(args);
        assert_eq!(cfg.data_path, PathBuf::from("people.parquet"));
        assert_eq!(cfg.window_size, [1000.0, 900.0]);
    }

    #[test]
    fn window_is_never_smaller_than_minimum() {
        let args = Args::try_parse_from(["titanic-dashboard", "-d", "x.csv", "--width", "10", "--height", "10"])
            .unwrap();
        assert_eq!(DashboardConfig::from(args).window_size, [600.0, 400.0]);
    }
}
