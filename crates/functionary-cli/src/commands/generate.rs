use crate::logger;
use crate::GlobalOpts;
use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use functionary_ast::discovery::find_source_dirs;
use functionary_ast::{GenerationOutput, ManifestGenerator};
use functionary_config::GenerateOptions;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug, Clone)]
pub struct GenerateCommand {
    /// Package directories holding functions.js (default: current directory)
    #[arg(value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// Read generation options from a TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore JSDoc comments
    #[arg(long)]
    pub no_jsdoc: bool,

    /// Guess parameter types from their names
    #[arg(long)]
    pub guess_types: bool,

    /// Print the manifest instead of writing package.yaml
    #[arg(long, conflicts_with_all = ["output_dir", "in_place"])]
    pub stdout: bool,

    /// Directory package.yaml is written to (default: current directory)
    #[arg(short, long, value_name = "DIR", conflicts_with = "in_place")]
    pub output_dir: Option<PathBuf>,

    /// Write each package.yaml next to its functions.js
    #[arg(long)]
    pub in_place: bool,

    /// Find every directory holding functions.js below the given ones
    #[arg(short, long)]
    pub recursive: bool,
}

impl GenerateCommand {
    /// Options shared by every directory, before the directory is filled in
    fn base_options(&self) -> Result<GenerateOptions> {
        let mut options = match &self.config {
            Some(path) => GenerateOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => GenerateOptions::new("."),
        };

        if self.no_jsdoc {
            options = options.jsdoc(false);
        }
        if self.guess_types {
            options = options.guess_types(true);
        }
        if self.stdout {
            options = options.write_file(false);
        }
        if let Some(dir) = &self.output_dir {
            options = options.output_dir(dir);
        }

        Ok(options)
    }

    fn target_dirs(&self, base: &GenerateOptions) -> Vec<PathBuf> {
        let roots = if self.directories.is_empty() {
            vec![base.directory.clone()]
        } else {
            self.directories.clone()
        };

        if !self.recursive {
            return roots;
        }
        roots.iter().flat_map(|root| find_source_dirs(root)).collect()
    }
}

pub fn handle_generate(cmd: GenerateCommand, _opts: GlobalOpts) -> Result<()> {
    let base = cmd.base_options()?;
    let dirs = cmd.target_dirs(&base);

    if dirs.is_empty() {
        bail!("No directories containing functions.js found");
    }
    if base.write_file && dirs.len() > 1 && !cmd.in_place {
        bail!(
            "{} packages would all write the same package.yaml; use --in-place or --stdout",
            dirs.len()
        );
    }

    logger::info(&format!("Generating manifests for {} directories", dirs.len()));
    debug!("Base options: {:?}", base);

    let results: Vec<_> = dirs
        .par_iter()
        .map(|dir| {
            logger::step(&format!("Generating {}", dir.display()));
            let options = options_for(&base, dir, cmd.in_place);
            (dir, ManifestGenerator::new(options).generate())
        })
        .collect();

    let mut failures = 0;
    let mut rendered = 0;
    for (dir, result) in results {
        match result {
            Ok(GenerationOutput::Rendered(yaml)) => {
                if rendered > 0 {
                    println!("---");
                }
                print!("{}", yaml);
                rendered += 1;
            }
            Ok(GenerationOutput::Written(path)) => {
                logger::success(&format!(
                    "Wrote {}",
                    path.display().to_string().cyan()
                ));
            }
            Err(e) => {
                logger::error(&format!("{}: {}", dir.display(), e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} manifests failed", failures, dirs.len());
    }
    Ok(())
}

fn options_for(base: &GenerateOptions, dir: &Path, in_place: bool) -> GenerateOptions {
    let mut options = base.clone();
    options.directory = dir.to_path_buf();
    if in_place {
        options.output_dir = Some(dir.to_path_buf());
    }
    options
}

#[cfg(test)]
mod tests {
    use crate::commands::generate::*;

    fn parse(args: &[&str]) -> GenerateCommand {
        let mut argv = vec!["generate"];
        argv.extend_from_slice(args);
        GenerateCommand::parse_from(argv)
    }

    #[test]
    fn test_flags_map_to_options() {
        let cmd = parse(&["--no-jsdoc", "--guess-types", "--stdout", "pkg"]);
        let options = cmd.base_options().unwrap();
        assert!(!options.jsdoc);
        assert!(options.guess_types);
        assert!(!options.write_file);
        assert_eq!(cmd.target_dirs(&options), [PathBuf::from("pkg")]);
    }

    #[test]
    fn test_defaults_to_current_directory() {
        let cmd = parse(&[]);
        let options = cmd.base_options().unwrap();
        assert!(options.jsdoc);
        assert!(options.write_file);
        assert_eq!(cmd.target_dirs(&options), [PathBuf::from(".")]);
    }

    #[test]
    fn test_in_place_writes_next_to_source() {
        let base = GenerateOptions::new(".").output_dir("elsewhere");
        let options = options_for(&base, Path::new("pkg"), true);
        assert_eq!(options.directory, PathBuf::from("pkg"));
        assert_eq!(options.output_dir, Some(PathBuf::from("pkg")));

        let options = options_for(&base, Path::new("pkg"), false);
        assert_eq!(options.output_dir, Some(PathBuf::from("elsewhere")));
    }

    #[test]
    fn test_stdout_conflicts_with_output_dir() {
        let result = GenerateCommand::try_parse_from(["generate", "--stdout", "-o", "out"]);
        assert!(result.is_err());
    }
}
