use std::fs;
use std::path::Path;

use ndarray::{Array2, Axis};
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::{data_lines, parse_header, parse_line, parse_rows, Delimiter};

/// Scatter points with optional symmetric errors.
///
/// Columns are x, y, y error, x error; the two error columns are optional
/// and anything after them is ignored.
#[derive(Debug, Clone)]
pub struct ErrorBars {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yerr: Option<Vec<f64>>,
    pub xerr: Option<Vec<f64>>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
}

fn is_numeric(line: &str) -> bool {
    parse_line(line, Delimiter::Comma).is_ok() || parse_line(line, Delimiter::Whitespace).is_ok()
}

/// `linenos` maps data rows back to file lines for error messages.
fn errors(
    data: &Array2<f64>,
    linenos: &[usize],
    col: usize,
    what: &str,
) -> Result<Option<Vec<f64>>> {
    if data.ncols() <= col {
        return Ok(None);
    }
    let e: Vec<f64> = data.index_axis(Axis(1), col).to_vec();
    // NaN fails the comparison too
    match e.iter().position(|&v| !(v >= 0.0)) {
        Some(i) => Err(Error::Parse(format!(
            "line {}: {} error {} is not a non-negative number",
            linenos[i], what, e[i]
        ))),
        None => Ok(Some(e)),
    }
}

impl ErrorBars {
    pub fn parse(text: &str) -> Result<ErrorBars> {
        let mut lines: Vec<_> = data_lines(text.lines(), 1).collect();
        let header = if lines.first().map_or(false, |&(_, l)| !is_numeric(l)) {
            Some(parse_header(lines.remove(0).1))
        } else {
            None
        };
        let (data, _) = parse_rows(&lines)?;
        let linenos: Vec<usize> = lines.iter().map(|&(n, _)| n).collect();
        if data.ncols() < 2 {
            return Err(Error::Parse(format!(
                "need at least x and y columns, found {}",
                data.ncols()
            )));
        }
        debug!("{} points, {} columns", data.nrows(), data.ncols());

        let (xlabel, ylabel) = match header {
            Some(mut h) if h.len() >= 2 => {
                let y = h.swap_remove(1);
                let x = h.swap_remove(0);
                (Some(x), Some(y))
            }
            _ => (None, None),
        };
        Ok(ErrorBars {
            x: data.index_axis(Axis(1), 0).to_vec(),
            y: data.index_axis(Axis(1), 1).to_vec(),
            yerr: errors(&data, &linenos, 2, "y")?,
            xerr: errors(&data, &linenos, 3, "x")?,
            xlabel,
            ylabel,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ErrorBars> {
        ErrorBars::parse(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// (low, high) of each point along x, errors included.
    pub fn x_spans(&self) -> Vec<(f64, f64)> {
        spans(&self.x, self.xerr.as_deref())
    }

    pub fn y_spans(&self) -> Vec<(f64, f64)> {
        spans(&self.y, self.yerr.as_deref())
    }
}

fn spans(v: &[f64], err: Option<&[f64]>) -> Vec<(f64, f64)> {
    match err {
        Some(e) => v.iter().zip(e).map(|(&v, &e)| (v - e, v + e)).collect(),
        None => v.iter().map(|&v| (v, v)).collect(),
    }
}
