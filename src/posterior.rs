use std::path::Path;

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::table::Table;

pub const LNLIKE_LABEL: &str = "log likelihood";

/// Number of bookkeeping columns trailing the parameters: lnlike, step, walker.
pub const NTRAILING: usize = 3;

/// Display label of a parameter name.
pub fn label(name: &str) -> String {
    name.replace('_', "")
}

/// Ensemble chain rebuilt from a flattened posterior table.
#[derive(Debug, Clone)]
pub struct Posterior {
    names: Vec<String>,
    lnlike_name: String,
    chain: Array3<f64>,
    lnlike: Array2<f64>,
    burn_in: usize,
}

/// A dense index can never reach the row count, so anything at or past it is
/// rejected before the cast.
fn to_index(v: f64, what: &str, row: usize, nrows: usize) -> Result<usize> {
    if !(v.is_finite() && v >= 0.0 && v.fract() == 0.0) {
        return Err(Error::Shape(format!(
            "row {}: {} index {} is not a non-negative integer",
            row, what, v
        )));
    }
    if v >= nrows as f64 {
        return Err(Error::Shape(format!(
            "row {}: {} index {} out of range for {} rows",
            row, what, v, nrows
        )));
    }
    Ok(v as usize)
}

impl Posterior {
    pub fn from_table(table: &Table) -> Result<Posterior> {
        let ncols = table.header.len();
        if ncols < NTRAILING {
            return Err(Error::Parse(format!(
                "header names {} columns, need at least lnlike, step and walker",
                ncols
            )));
        }
        if table.ncols() != ncols {
            return Err(Error::Parse(format!(
                "header names {} columns but rows have {}",
                ncols,
                table.ncols()
            )));
        }
        let ndims = ncols - NTRAILING;
        let data = &table.data;

        let mut steps = Vec::with_capacity(data.nrows());
        let mut walkers = Vec::with_capacity(data.nrows());
        for (i, row) in data.outer_iter().enumerate() {
            steps.push(to_index(row[ndims + 1], "step", i, data.nrows())?);
            walkers.push(to_index(row[ndims + 2], "walker", i, data.nrows())?);
        }
        let nwalkers = walkers.iter().max().map_or(0, |&w| w + 1);
        let nsteps = steps.iter().max().map_or(0, |&s| s + 1);
        if nwalkers.checked_mul(nsteps) != Some(data.nrows()) {
            return Err(Error::Shape(format!(
                "{} rows cannot be arranged as {} walkers x {} steps",
                data.nrows(),
                nwalkers,
                nsteps
            )));
        }

        let mut chain = Array3::<f64>::zeros((nwalkers, nsteps, ndims));
        let mut lnlike = Array2::<f64>::zeros((nwalkers, nsteps));
        let mut seen = vec![false; nwalkers * nsteps];
        for (i, row) in data.outer_iter().enumerate() {
            let (w, st) = (walkers[i], steps[i]);
            if seen[w * nsteps + st] {
                return Err(Error::Shape(format!(
                    "row {}: walker {} step {} appears twice",
                    i, w, st
                )));
            }
            seen[w * nsteps + st] = true;
            chain
                .slice_mut(s![w, st, ..])
                .assign(&row.slice(s![..ndims]));
            lnlike[[w, st]] = row[ndims];
        }

        info!(
            "{} walkers x {} steps x {} parameters",
            nwalkers, nsteps, ndims
        );
        Ok(Posterior {
            names: table.header[..ndims].to_vec(),
            lnlike_name: table.header[ndims].clone(),
            chain,
            lnlike,
            burn_in: 0,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Posterior> {
        Posterior::from_table(&Table::from_file(path)?)
    }

    pub fn nwalkers(&self) -> usize {
        self.chain.len_of(Axis(0))
    }

    pub fn nsteps(&self) -> usize {
        self.chain.len_of(Axis(1))
    }

    pub fn ndims(&self) -> usize {
        self.chain.len_of(Axis(2))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn labels(&self) -> Vec<String> {
        self.names.iter().map(|n| label(n)).collect()
    }

    pub fn chain(&self) -> ArrayView3<f64> {
        self.chain.view()
    }

    pub fn lnlike(&self) -> ArrayView2<f64> {
        self.lnlike.view()
    }

    /// Steps discarded so far.
    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    /// Drops the first `burn_in` steps of every walker.
    pub fn burn(self, burn_in: usize) -> Result<Posterior> {
        if burn_in == 0 {
            return Ok(self);
        }
        let nsteps = self.nsteps();
        if burn_in >= nsteps {
            return Err(Error::BurnIn { burn_in, nsteps });
        }
        debug!("discarding {} burn-in steps of {}", burn_in, nsteps);
        Ok(Posterior {
            chain: self.chain.slice(s![.., burn_in.., ..]).to_owned(),
            lnlike: self.lnlike.slice(s![.., burn_in..]).to_owned(),
            burn_in: self.burn_in + burn_in,
            ..self
        })
    }

    /// Column indices of the requested parameters, in request order. An empty
    /// request selects every parameter; the log-likelihood name is skipped.
    pub fn resolve(&self, display: &[String]) -> Result<Vec<usize>> {
        if display.is_empty() {
            return Ok((0..self.ndims()).collect());
        }
        let mut idx = Vec::with_capacity(display.len());
        for name in display {
            if *name == self.lnlike_name {
                continue;
            }
            match self.names.iter().position(|n| n == name) {
                Some(i) => idx.push(i),
                None => {
                    return Err(Error::UnknownParameter {
                        name: name.clone(),
                        available: self.names.join(", "),
                    })
                }
            }
        }
        Ok(idx)
    }

    /// Header names of the resolved selection, for naming outputs. Empty when
    /// nothing was requested; the log-likelihood name only stands in when it
    /// is all that was asked for.
    pub fn selected_names(&self, display: &[String]) -> Result<Vec<String>> {
        if display.is_empty() {
            return Ok(Vec::new());
        }
        let idx = self.resolve(display)?;
        if idx.is_empty() {
            return Ok(vec![self.lnlike_name.clone()]);
        }
        Ok(idx.iter().map(|&i| self.names[i].clone()).collect())
    }

    /// Log-likelihood followed by the requested parameters.
    pub fn series(&self, display: &[String]) -> Result<Series> {
        let idx = self.resolve(display)?;
        let (nwalkers, nsteps) = (self.nwalkers(), self.nsteps());
        let mut values = Array3::<f64>::zeros((nwalkers, nsteps, idx.len() + 1));
        values.slice_mut(s![.., .., 0]).assign(&self.lnlike);
        let mut labels = vec![LNLIKE_LABEL.to_string()];
        for (k, &j) in idx.iter().enumerate() {
            values
                .slice_mut(s![.., .., k + 1])
                .assign(&self.chain.slice(s![.., .., j]));
            labels.push(label(&self.names[j]));
        }
        info!("selected {}", labels[1..].join(", "));
        Ok(Series {
            labels,
            values,
            first_step: self.burn_in,
        })
    }
}

/// Labelled (walker, step, column) block ready for plotting.
#[derive(Debug, Clone)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Array3<f64>,
    pub first_step: usize,
}

impl Series {
    pub fn nwalkers(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    pub fn nsteps(&self) -> usize {
        self.values.len_of(Axis(1))
    }

    pub fn ncols(&self) -> usize {
        self.values.len_of(Axis(2))
    }

    /// (walker, step) values of one column.
    pub fn column(&self, k: usize) -> ArrayView2<f64> {
        self.values.index_axis(Axis(2), k)
    }

    /// One column pooled over walkers and steps.
    pub fn samples(&self, k: usize) -> Vec<f64> {
        self.column(k).iter().cloned().collect()
    }
}

/// Reads, reshapes, burns and selects in one go.
pub fn load<P: AsRef<Path>>(path: P, burn_in: usize, display: &[String]) -> Result<Series> {
    Posterior::from_file(path)?.burn(burn_in)?.series(display)
}
