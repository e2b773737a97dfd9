use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use quadsquish::ErrorMetric;

pub enum Assume {
    Yes,
    No,
}

pub fn error_metric(s: &str) -> Result<ErrorMetric, String> {
    s.parse::<ErrorMetric>().map_err(|e| e.to_string())
}

pub fn threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Threshold must be a number, got {s:?}"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("Threshold must not be negative, got {value}"));
    }

    Ok(value)
}

pub fn min_block(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Minimum block size must be an integer, got {s:?}"))?;

    if value < 1 {
        return Err("Minimum block size must be 1 or larger".to_string());
    }

    Ok(value)
}

/// Read one line from `input`, without its line ending. End of input is an
/// error, since nobody is left to answer.
fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed before an answer was given");
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask for a value on `output` until `parse` accepts a line from `input`.
fn prompt_from<T, F, R, W>(message: &str, parse: F, input: &mut R, output: &mut W) -> Result<T>
where
    F: Fn(&str) -> Result<T, String>,
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{message}: ")?;
        output.flush()?;

        let line = read_answer(input)?;
        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  !! {e}"),
        }
    }
}

/// Ask for a value on stdin until `parse` accepts it.
pub fn prompt<T, F>(message: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T, String>,
{
    prompt_from(message, parse, &mut io::stdin().lock(), &mut io::stdout())
}

pub fn prompt_metric() -> Result<ErrorMetric> {
    prompt(
        "Error metric (1=Variance, 2=MAD, 3=MaxDiff, 4=Entropy, 5=SSIM)",
        error_metric,
    )
}

pub fn prompt_threshold(metric: ErrorMetric) -> Result<f64> {
    let range = metric.suggested_threshold();
    prompt(
        &format!("Threshold (>= 0, {metric} scores {} to {})", range.start(), range.end()),
        threshold,
    )
}

pub fn prompt_min_block() -> Result<u64> {
    prompt("Minimum block size in pixels (>= 1)", min_block)
}

/// Give `path` a `.png` extension if it has none. Returns whether it was
/// changed.
pub fn default_extension(path: &mut PathBuf) -> bool {
    if path.extension().is_some() {
        return false;
    }

    path.set_extension("png");
    true
}

pub fn exists_decision<P: AsRef<Path>>(
    place: &str,
    action: &str,
    path: &P,
    assume: Option<Assume>,
) -> Result<bool> {
    match assume {
        Some(Assume::Yes) => return Ok(true),
        Some(Assume::No) => return Ok(false),
        None => (),
    }

    decide_from(place, action, path.as_ref(), &mut io::stdin().lock(), &mut io::stdout())
}

fn decide_from<R: BufRead, W: Write>(
    place: &str,
    action: &str,
    path: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    loop {
        write!(output, "{place} file {path:?} already exists. {action}? [y/N] ")?;
        output.flush()?;

        let opt = read_answer(input)?.trim().to_lowercase();

        if opt.is_empty() || opt == "n" {
            return Ok(false)
        } else if opt == "y" {
            return Ok(true)
        }
    }
}
