use clap::{Parser, ValueEnum};
use csv2ucsf::grid::{DuplicatePolicy, DEFAULT_PRECISION};
use csv2ucsf::convert::DEFAULT_OWNER;
use csv2ucsf::{default_outfile, Conversion};
use pretty_env_logger;
use std::process::ExitCode;
use std::{error::Error, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    about = "Convert a 2D spectrum in CSV format to UCSF for analysis with Sparky",
    long_about = "Reads a text file with one `xppm yppm intensity` sample per line (as \
                  written by `pipe2txt.tcl -index PPM`), in any order, and writes it as a \
                  gridded Sparky UCSF file. The samples must cover a complete rectangular grid.",
    version = env!("CSV2UCSF_VERSION")
)]
struct Cli {
    /// Input CSV file in format: xppm yppm intensity
    infile: PathBuf,

    /// Output file name (default: <infile> with the extension replaced by .ucsf)
    #[clap(short, long)]
    outfile: Option<PathBuf>,

    /// What to do when the same (x, y) point appears more than once
    #[clap(long, default_value = "overwrite")]
    on_duplicate: DuplicateKind,

    /// Decimal places used to match coordinates between samples
    #[clap(long, default_value_t = DEFAULT_PRECISION)]
    precision: u32,

    /// Owner recorded in the file header (at most 9 bytes)
    #[clap(long, default_value = DEFAULT_OWNER)]
    owner: String,

    /// Comment recorded in the file header (at most 80 bytes)
    #[clap(long)]
    comment: Option<String>,

    /// Read the written file back and compare it with the input grid
    #[clap(long, action)]
    check: bool,
}

#[derive(ValueEnum, Clone, Debug, Default)]
enum DuplicateKind {
    /// Keep the sample that appears last
    #[default]
    Overwrite,
    /// Abort the conversion
    Error,
}

fn entrypoint() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let outfile = cli
        .outfile
        .clone()
        .unwrap_or_else(|| default_outfile(&cli.infile));
    let policy = match cli.on_duplicate {
        DuplicateKind::Overwrite => DuplicatePolicy::Overwrite,
        DuplicateKind::Error => DuplicatePolicy::Error,
    };

    println!("Reading {}...", cli.infile.display());
    let mut conversion = Conversion::default();
    conversion
        .infile(&cli.infile)
        .outfile(&outfile)
        .precision(&cli.precision)
        .duplicate_policy(&policy)
        .owner(&cli.owner)
        .verify(cli.check);
    if let Some(comment) = &cli.comment {
        conversion.comment(comment);
    }
    let summary = conversion.run()?;

    println!(
        "Read {} samples ({} bytes)",
        summary.samples, summary.input_bytes
    );
    if summary.duplicates > 0 {
        println!("Overwrote {} duplicate samples", summary.duplicates);
    }
    println!("X Size: {}", summary.x.size);
    println!("Y Size: {}", summary.y.size);
    println!("X Min.: {} ppm, X Max.: {} ppm", summary.x.min, summary.x.max);
    println!("Y Min.: {} ppm, Y Max.: {} ppm", summary.y.min, summary.y.max);
    println!(
        "Wrote UCSF file: {} ({} bytes)",
        summary.outfile.display(),
        summary.output_bytes
    );
    Ok(())
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["csv2ucsf", "spec.csv"]).unwrap();
        assert_eq!(cli.infile, PathBuf::from("spec.csv"));
        assert!(cli.outfile.is_none());
        assert!(matches!(cli.on_duplicate, DuplicateKind::Overwrite));
        assert_eq!(cli.precision, DEFAULT_PRECISION);
        assert_eq!(cli.owner, DEFAULT_OWNER);
        assert!(!cli.check);
    }

    #[test]
    fn test_owner_flag() {
        let cli = Cli::try_parse_from(["csv2ucsf", "spec.csv", "--owner", "veglia"]).unwrap();
        assert_eq!(cli.owner, "veglia");
    }

    #[test]
    fn test_outfile_flag() {
        for flag in ["-o", "--outfile"] {
            let cli = Cli::try_parse_from(["csv2ucsf", "spec.csv", flag, "out.ucsf"]).unwrap();
            assert_eq!(cli.outfile, Some(PathBuf::from("out.ucsf")));
        }
    }

    #[test]
    fn test_duplicate_flag() {
        let cli =
            Cli::try_parse_from(["csv2ucsf", "spec.csv", "--on-duplicate", "error"]).unwrap();
        assert!(matches!(cli.on_duplicate, DuplicateKind::Error));
    }
}
