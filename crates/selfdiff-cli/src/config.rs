use crate::error::{CliError, Result};
use selfdiff::engine::config::{AnalysisConfig, AnalysisConfigBuilder, TrajectoryFormat};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Analysis a configuration file is meant for. Optional in the file; when present it must match
/// the subcommand.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Msd,
    Vac,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Msd => write!(f, "msd"),
            Method::Vac => write!(f, "vac"),
        }
    }
}

/// Contents of the TOML configuration file. Every key may also come from the command line.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    trajectory: Option<PathBuf>,
    #[serde(rename = "type")]
    format: Option<TrajectoryFormat>,
    method: Option<Method>,
    pbc: Option<bool>,
    start: Option<usize>,
    end: Option<usize>,
    mem: Option<usize>,
    mol: Option<usize>,
    at: Option<usize>,
    masses: Option<Vec<f64>>,
    msd_dist: Option<[f64; 3]>,
    dt: Option<f64>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub mem: Option<usize>,
    pub set_values: &'a [String],
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `overrides`, checks `method` against `expected`, and fills a core builder.
    ///
    /// `-S` values are applied first, then the dedicated `--start`, `--end` and `--mem` flags.
    pub fn merge_with_cli(
        mut self,
        overrides: &Overrides,
        expected: Option<Method>,
    ) -> Result<AnalysisConfigBuilder> {
        self.apply_set_values(overrides.set_values)?;
        if let Some(start) = overrides.start {
            self.start = Some(start);
        }
        if let Some(end) = overrides.end {
            self.end = Some(end);
        }
        if let Some(mem) = overrides.mem {
            self.mem = Some(mem);
        }

        if let (Some(found), Some(expected)) = (self.method, expected) {
            if found != expected {
                return Err(CliError::Config(format!(
                    "The configuration file declares method '{}' but the '{}' command was run.",
                    found, expected
                )));
            }
        }

        let mut builder = AnalysisConfigBuilder::new()
            .trajectory_path(require(self.trajectory, "trajectory")?)
            .format(self.format.unwrap_or_default())
            .pbc(self.pbc.unwrap_or(false))
            .start(self.start.unwrap_or(0))
            .end(require(self.end, "end")?)
            .resident_frames(self.mem.unwrap_or(0))
            .molecules(require(self.mol, "mol")?)
            .atoms_per_molecule(require(self.at, "at")?)
            .masses(require(self.masses, "masses")?)
            .timestep(require(self.dt, "dt")?);
        if let Some(dist) = self.msd_dist {
            builder = builder.bond_cutoff(dist);
        }
        Ok(builder)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "trajectory" => self.trajectory = Some(PathBuf::from(value)),
                "type" => self.format = Some(parse_enum(key, value)?),
                "method" => self.method = Some(parse_enum(key, value)?),
                "pbc" => self.pbc = Some(parse_value(key, value)?),
                "start" => self.start = Some(parse_value(key, value)?),
                "end" => self.end = Some(parse_value(key, value)?),
                "mem" => self.mem = Some(parse_value(key, value)?),
                "mol" => self.mol = Some(parse_value(key, value)?),
                "at" => self.at = Some(parse_value(key, value)?),
                "dt" => self.dt = Some(parse_value(key, value)?),
                "masses" => self.masses = Some(parse_list(key, value)?),
                "msd-dist" => {
                    let dist = parse_list(key, value)?;
                    let dist: [f64; 3] = dist.try_into().map_err(|_| {
                        CliError::Config(format!(
                            "'{}' expects exactly three comma-separated values, got '{}'",
                            key, value
                        ))
                    })?;
                    self.msd_dist = Some(dist);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builds the final configuration once the command has chosen its output paths.
pub fn finish(builder: AnalysisConfigBuilder) -> Result<AnalysisConfig> {
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "A value for '{}' is required either in the config file or via --set.",
            key
        ))
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}

fn parse_list(key: &str, value: &str) -> Result<Vec<f64>> {
    value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| parse_value(key, item.trim()))
        .collect()
}

/// Parses a lowercase enum value the same way the TOML file does.
fn parse_enum<T: for<'de> Deserialize<'de>>(key: &str, value: &str) -> Result<T> {
    #[derive(Deserialize)]
    struct Wrapper<T> {
        value: T,
    }
    toml::from_str::<Wrapper<T>>(&format!("value = {:?}", value))
        .map(|w| w.value)
        .map_err(|_| CliError::Config(format!("Invalid value for {}: '{}'", key, value)))
}
