use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use sitesym::{
    multiset::flatten_distribution,
    number_of_unique_permutations,
    sites::read_coordinates_from_file,
    symmetry_group::TableFormat,
    Configuration, ConfigurationSpace, CoordinateConfigSpace, EnumerationProgress, SymmetryGroup,
};

/// How often enumeration progress is logged, in screened candidates.
const PROGRESS_INTERVAL: usize = 100_000;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sitesym-cli",
    about = "Enumerate symmetry-inequivalent arrangements of labels on sites."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every accepted representative.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unique arrangements for fixed label counts.
    Enumerate {
        /// Symmetry table, one site mapping per line, optionally labelled.
        symmetry_file: PathBuf,
        /// Label and number of sites it occupies, e.g. `--site Li=2`.
        #[arg(long = "site", value_name = "LABEL=COUNT", value_parser = parse_site, required = true)]
        sites: Vec<(String, usize)>,
        /// Complete the symmetry table to a group before enumerating.
        #[arg(long)]
        closure: bool,
        /// Site coordinates; prints the occupied coordinates per label.
        #[arg(long, value_name = "FILE")]
        coordinates: Option<PathBuf>,
    },
    /// Unique assignments of colours with unrestricted counts.
    Colourings {
        symmetry_file: PathBuf,
        #[arg(long = "colour", value_name = "LABEL", required = true)]
        colours: Vec<String>,
        #[arg(long)]
        closure: bool,
    },
    /// Number of distinct arrangements, before symmetry reduction.
    Count {
        #[arg(long = "site", value_name = "LABEL=COUNT", value_parser = parse_site, required = true)]
        sites: Vec<(String, usize)>,
    },
    /// Write the group generated by a symmetry table.
    Close {
        symmetry_file: PathBuf,
        /// Output file (defaults to stdout).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_site(arg: &str) -> Result<(String, usize), String> {
    let (label, count) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=COUNT, found {arg:?}"))?;
    let count = count
        .trim()
        .parse()
        .map_err(|e| format!("invalid count in {arg:?}: {e}"))?;
    Ok((label.trim().to_owned(), count))
}

fn distribution(sites: Vec<(String, usize)>) -> Result<BTreeMap<String, usize>> {
    let mut distribution = BTreeMap::new();
    for (label, count) in sites {
        if distribution.insert(label.clone(), count).is_some() {
            bail!("label {label} is given more than once");
        }
    }
    Ok(distribution)
}

fn read_group(path: &Path, closure: bool) -> Result<SymmetryGroup> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let group = SymmetryGroup::read_from(BufReader::new(file), TableFormat::Auto)
        .with_context(|| format!("reading symmetry table {}", path.display()))?;
    info!(
        "read {} symmetry operations from {}",
        group.len(),
        path.display()
    );
    if closure {
        let closed = group.closure().context("closing the symmetry table")?;
        info!("closure has {} operations", closed.len());
        Ok(closed)
    } else {
        Ok(group)
    }
}

fn log_progress(progress: EnumerationProgress) {
    if progress.screened % PROGRESS_INTERVAL == 0 {
        match progress.total {
            Some(total) => info!(
                "screened {} of {total}, found {}",
                progress.screened, progress.found
            ),
            None => info!("screened {}, found {}", progress.screened, progress.found),
        }
    }
}

fn print_configurations<W: Write>(out: &mut W, unique: &[Configuration<String>]) -> io::Result<()> {
    for configuration in unique {
        writeln!(
            out,
            "{configuration}\t{}",
            configuration.count().unwrap_or_default()
        )?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Enumerate {
            symmetry_file,
            sites,
            closure,
            coordinates,
        } => {
            let group = read_group(&symmetry_file, closure)?;
            let distribution = distribution(sites)?;

            if let Some(path) = coordinates {
                let coordinates = read_coordinates_from_file(&path)
                    .with_context(|| format!("reading coordinates {}", path.display()))?;
                let space = CoordinateConfigSpace::new(coordinates, Some(group))?;
                let unique =
                    space.unique_configurations_with_progress(&distribution, log_progress)?;
                for (index, configuration) in unique.iter().enumerate() {
                    writeln!(
                        out,
                        "# configuration {} (degeneracy {})",
                        index + 1,
                        configuration.count().unwrap_or_default()
                    )?;
                    for (label, positions) in configuration.map_objects(space.coordinates()) {
                        for position in positions {
                            let row = position
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<_>>()
                                .join(" ");
                            writeln!(out, "{label} {row}")?;
                        }
                    }
                }
            } else {
                let dim = group
                    .dim()
                    .ok_or_else(|| anyhow!("symmetry table {} is empty", symmetry_file.display()))?;
                let space = ConfigurationSpace::new((1..=dim).collect::<Vec<_>>(), Some(group))?;
                let unique =
                    space.unique_configurations_with_progress(&distribution, log_progress)?;
                print_configurations(&mut out, &unique)?;
            }
        }
        Commands::Colourings {
            symmetry_file,
            colours,
            closure,
        } => {
            let group = read_group(&symmetry_file, closure)?;
            let dim = group
                .dim()
                .ok_or_else(|| anyhow!("symmetry table {} is empty", symmetry_file.display()))?;
            let space = ConfigurationSpace::new((1..=dim).collect::<Vec<_>>(), Some(group))?;
            let unique = space.unique_colourings_with_progress(&colours, log_progress)?;
            print_configurations(&mut out, &unique)?;
        }
        Commands::Count { sites } => {
            let multiset = flatten_distribution(&distribution(sites)?);
            let count = number_of_unique_permutations(&multiset)
                .ok_or_else(|| anyhow!("the number of arrangements does not fit in 128 bits"))?;
            writeln!(out, "{count}")?;
        }
        Commands::Close {
            symmetry_file,
            output,
        } => {
            let group = read_group(&symmetry_file, true)?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    group.write_vectors_to(BufWriter::new(file), true)?;
                }
                None => group.write_vectors_to(&mut out, true)?,
            }
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site() {
        assert_eq!(parse_site("Li=2"), Ok(("Li".to_owned(), 2)));
        assert_eq!(parse_site(" vac = 10"), Ok(("vac".to_owned(), 10)));
        assert!(parse_site("Li").is_err());
        assert!(parse_site("Li=-1").is_err());
    }

    #[test]
    fn repeated_labels_are_rejected() {
        let sites = vec![("Li".to_owned(), 1), ("Li".to_owned(), 2)];
        assert!(distribution(sites).is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "sitesym-cli",
            "enumerate",
            "square.txt",
            "--site",
            "1=2",
            "--site",
            "0=2",
            "--closure",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Enumerate { sites, closure, .. } => {
                assert!(closure);
                assert_eq!(sites.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
