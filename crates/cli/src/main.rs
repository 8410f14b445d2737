use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use gsamp_backend_cpu::CpuBackend;
use gsamp_core::{
    error::Error,
    grid::CoeffGrid,
    io::JobConfig,
    operator::Freq2Wave,
    samples::SampleSet,
    solver::SolveOutcome,
    wavelet::HaarFourier,
    weights::VoronoiWeights,
};
use num_complex::Complex64;

#[derive(Parser, Debug)]
#[command(
    name = "gsamp",
    about = "Reconstructs wavelet coefficients from Fourier-domain samples"
)]
struct Cli {
    /// Path to a TOML job configuration
    #[arg(short, long)]
    config: PathBuf,
    /// CSV of sample frequencies, one row per sample (one or two columns)
    #[arg(long)]
    samples: PathBuf,
    /// CSV of complex measurements, one "re,im" row per sample
    #[arg(long)]
    measurements: PathBuf,
    /// Path to CSV output (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Suppress progress logs (stderr)
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.quiet {
        eprintln!("[cli] loading config {}", cli.config.display());
    }
    let raw = fs::read_to_string(&cli.config)?;
    let config: JobConfig = toml::from_str(&raw)?;
    let spec = config
        .operator_spec()
        .ok_or_else(|| format!("unknown wavelet name {:?}", config.wavelet))?;
    if spec.wavelet.vanishing_moments() != 1 {
        return Err(format!(
            "wavelet {:?} needs an external scaling-function evaluator; this front end ships Haar only",
            config.wavelet
        )
        .into());
    }

    let samples = read_samples(&cli.samples)?;
    let measurements = read_measurements(&cli.measurements)?;
    if !cli.quiet {
        eprintln!(
            "[setup] {} samples ({}-D), scale {} (grid extent {})",
            samples.len(),
            samples.dimension(),
            spec.scale,
            1usize << spec.scale
        );
    }

    let metrics_recorder = config.metrics.build_recorder()?;
    let mut operator = Freq2Wave::new(
        &CpuBackend::new(),
        &samples,
        spec,
        &HaarFourier,
        &VoronoiWeights,
    )?;
    for warning in operator.warnings() {
        eprintln!("[setup] warning: {warning}");
    }
    if !cli.quiet {
        eprintln!(
            "[solve] {} unknowns, max_iter={} tol={:e} uniform={}",
            operator.num_coeffs(),
            config.solver.max_iter,
            config.solver.tol,
            operator.is_uniform()
        );
    }

    let outcome = match operator.solve_with_metrics(
        &measurements,
        &config.solver,
        metrics_recorder.as_ref(),
    ) {
        Ok(outcome) => {
            if !cli.quiet {
                eprintln!(
                    "[done] converged in {} iterations (relative residual {:.3e})",
                    outcome.iterations, outcome.relative_residual
                );
            }
            outcome
        }
        Err(Error::SolverNonConvergence {
            residual,
            iterations,
            estimate,
        }) => {
            eprintln!(
                "[solve] warning: no convergence after {iterations} iterations \
                 (relative residual {residual:.3e}); writing the best estimate"
            );
            SolveOutcome {
                coefficients: estimate,
                relative_residual: residual,
                iterations,
            }
        }
        Err(err) => return Err(err.into()),
    };

    emit_csv(operator.shape(), &outcome, cli.output.as_deref())?;
    if !cli.quiet {
        if let Some(path) = cli.output {
            eprintln!("wrote {} coefficients to {}", operator.num_coeffs(), path.display());
        } else {
            eprintln!("wrote {} coefficients to stdout", operator.num_coeffs());
        }
    }
    Ok(())
}

fn read_samples(path: &Path) -> Result<SampleSet, Box<dyn std::error::Error>> {
    let rows = parse_rows(path)?;
    let width = rows.first().map(|row| row.len()).unwrap_or(1);
    match width {
        1 => Ok(SampleSet::One(rows.into_iter().map(|row| row[0]).collect())),
        2 => Ok(SampleSet::Two(
            rows.into_iter().map(|row| [row[0], row[1]]).collect(),
        )),
        other => Err(format!("{}: expected 1 or 2 columns, found {other}", path.display()).into()),
    }
}

fn read_measurements(path: &Path) -> Result<Vec<Complex64>, Box<dyn std::error::Error>> {
    let rows = parse_rows(path)?;
    rows.into_iter()
        .map(|row| {
            if row.len() == 2 {
                Ok(Complex64::new(row[0], row[1]))
            } else {
                Err(format!("{}: measurements need re,im columns", path.display()).into())
            }
        })
        .collect()
}

fn parse_rows(path: &Path) -> Result<Vec<Vec<f64>>, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    let mut width = None;
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split(',')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|err| format!("{}:{}: {err}", path.display(), number + 1))?;
        if *width.get_or_insert(row.len()) != row.len() {
            return Err(format!(
                "{}:{}: inconsistent column count",
                path.display(),
                number + 1
            )
            .into());
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(format!("{}: no data rows", path.display()).into());
    }
    Ok(rows)
}

fn emit_csv(shape: CoeffGrid, outcome: &SolveOutcome, dest: Option<&Path>) -> io::Result<()> {
    let mut writer: Box<dyn Write> = match dest {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    match shape {
        CoeffGrid::One { .. } => {
            writeln!(writer, "index,re,im")?;
            for (index, value) in outcome.coefficients.iter().enumerate() {
                writeln!(writer, "{index},{:.12e},{:.12e}", value.re, value.im)?;
            }
        }
        CoeffGrid::Two { nx, .. } => {
            writeln!(writer, "ix,iy,re,im")?;
            for (index, value) in outcome.coefficients.iter().enumerate() {
                writeln!(
                    writer,
                    "{},{},{:.12e},{:.12e}",
                    index % nx,
                    index / nx,
                    value.re,
                    value.im
                )?;
            }
        }
    }
    writer.flush()
}
