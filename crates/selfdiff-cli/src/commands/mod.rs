pub mod msd;
pub mod unwrap;
pub mod vac;

use crate::cli::AnalysisArgs;
use crate::config::{FileConfig, Method, Overrides};
use crate::error::Result;
use selfdiff::engine::config::AnalysisConfigBuilder;
use tracing::info;

fn load_analysis(args: &AnalysisArgs, method: Method) -> Result<AnalysisConfigBuilder> {
    let file_config = FileConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let overrides = Overrides {
        start: args.start,
        end: args.end,
        mem: args.mem,
        set_values: &args.set_values,
    };
    let builder = file_config.merge_with_cli(&overrides, Some(method))?;
    Ok(builder.output_path(args.output.clone()))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Writes a single-molecule trajectory and a matching config file into `dir`.
    pub fn write_case(dir: &Path, columns: &str, values: &[[f64; 3]], extra: &str) -> PathBuf {
        let trajectory = dir.join("traj.lammpstrj");
        let mut text = String::new();
        for (step, [a, b, c]) in values.iter().enumerate() {
            text.push_str(&format!(
                "ITEM: TIMESTEP\n{step}\nITEM: NUMBER OF ATOMS\n2\nITEM: BOX BOUNDS pp pp pp\n\
                 0 10\n0 10\n0 10\nITEM: ATOMS id type {columns}\n\
                 1 1 {a} {b} {c}\n2 2 {a} {b} {c}\n"
            ));
        }
        fs::write(&trajectory, text).unwrap();

        let config = dir.join("selfdiff.toml");
        fs::write(
            &config,
            format!(
                "trajectory = {:?}\nend = {}\nmem = 1\nmol = 1\nat = 2\nmasses = [1.0, 3.0]\n\
                 msd-dist = [2.0, 2.0, 2.0]\ndt = 0.5\n{extra}",
                trajectory.to_string_lossy(),
                values.len()
            ),
        )
        .unwrap();
        config
    }
}
