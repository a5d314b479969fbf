use std::fmt::Display;
use std::path::Path;

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::errorbar::ErrorBars;
use crate::posterior::Series;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub bins: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            width: 1200,
            height: 900,
            bins: 30,
        }
    }
}

fn plot_err<E: Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Min and max of the finite values, widened to a unit interval when they
/// coincide.
pub fn bounds<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

pub fn pad((lo, hi): (f64, f64), frac: f64) -> (f64, f64) {
    let d = (hi - lo) * frac;
    (lo - d, hi + d)
}

fn bin_of(v: f64, (lo, hi): (f64, f64), bins: usize) -> Option<usize> {
    if bins == 0 || !v.is_finite() || v < lo || v > hi {
        return None;
    }
    let i = ((v - lo) / (hi - lo) * bins as f64) as usize;
    Some(i.min(bins - 1))
}

/// Counts per bin over `[lo, hi]`; the top edge belongs to the last bin.
/// Zero bins gives no counts.
pub fn histogram(samples: &[f64], range: (f64, f64), bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    for &v in samples {
        if let Some(i) = bin_of(v, range, bins) {
            counts[i] += 1;
        }
    }
    counts
}

/// Joint counts indexed `[x bin, y bin]`.
pub fn histogram2d(
    xs: &[f64],
    ys: &[f64],
    xrange: (f64, f64),
    yrange: (f64, f64),
    bins: usize,
) -> Array2<usize> {
    let mut counts = Array2::zeros((bins, bins));
    for (&x, &y) in xs.iter().zip(ys) {
        if let (Some(i), Some(j)) = (bin_of(x, xrange, bins), bin_of(y, yrange, bins)) {
            counts[[i, j]] += 1;
        }
    }
    counts
}

fn edge((lo, hi): (f64, f64), bins: usize, i: usize) -> f64 {
    lo + (hi - lo) * i as f64 / bins as f64
}

/// One panel per series column, every walker traced against step.
pub fn draw_walkers(path: &Path, series: &Series, cfg: &PlotConfig) -> Result<()> {
    let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let n = series.ncols();
    let x0 = series.first_step as f64;
    let x1 = x0 + (series.nsteps().max(2) - 1) as f64;
    let panels = root.split_evenly((n, 1));
    for (k, panel) in panels.iter().enumerate() {
        let col = series.column(k);
        let (lo, hi) = pad(bounds(col.iter().cloned()), 0.05);
        let last = k + 1 == n;
        let mut chart = ChartBuilder::on(panel)
            .margin(5)
            .x_label_area_size(if last { 35 } else { 20 })
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, lo..hi)
            .map_err(plot_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh().y_desc(series.labels[k].as_str());
        if last {
            mesh.x_desc("step");
        }
        mesh.draw().map_err(plot_err)?;

        for w in 0..series.nwalkers() {
            let style = Palette99::pick(w).mix(0.5).stroke_width(1);
            let trace = col
                .row(w)
                .iter()
                .enumerate()
                .map(|(i, &v)| (x0 + i as f64, v))
                .filter(|(_, v)| v.is_finite())
                .collect::<Vec<_>>();
            chart
                .draw_series(LineSeries::new(trace, style))
                .map_err(plot_err)?;
        }
    }
    root.present().map_err(plot_err)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn draw_marginal(
    area: &Area,
    samples: &[f64],
    range: (f64, f64),
    bins: usize,
    xlabel: Option<&str>,
) -> Result<()> {
    let counts = histogram(samples, range, bins);
    let top = counts.iter().cloned().max().unwrap_or(0).max(1) as f64 * 1.1;
    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(if xlabel.is_some() { 35 } else { 15 })
        .y_label_area_size(15)
        .build_cartesian_2d(range.0..range.1, 0.0..top)
        .map_err(plot_err)?;
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh().y_labels(0);
    if let Some(l) = xlabel {
        mesh.x_desc(l);
    }
    mesh.draw().map_err(plot_err)?;

    let fill = BLUE.mix(0.6).filled();
    chart
        .draw_series(counts.iter().enumerate().map(|(i, &c)| {
            Rectangle::new(
                [(edge(range, bins, i), 0.0), (edge(range, bins, i + 1), c as f64)],
                fill,
            )
        }))
        .map_err(plot_err)?;
    Ok(())
}

fn draw_joint(
    area: &Area,
    (xs, xrange): (&[f64], (f64, f64)),
    (ys, yrange): (&[f64], (f64, f64)),
    bins: usize,
    (xlabel, ylabel): (Option<&str>, Option<&str>),
) -> Result<()> {
    let counts = histogram2d(xs, ys, xrange, yrange, bins);
    let top = counts.iter().cloned().max().unwrap_or(0).max(1) as f64;
    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(if xlabel.is_some() { 35 } else { 15 })
        .y_label_area_size(if ylabel.is_some() { 60 } else { 15 })
        .build_cartesian_2d(xrange.0..xrange.1, yrange.0..yrange.1)
        .map_err(plot_err)?;
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    if let Some(l) = xlabel {
        mesh.x_desc(l);
    }
    if let Some(l) = ylabel {
        mesh.y_desc(l);
    }
    mesh.draw().map_err(plot_err)?;

    let cells = counts
        .indexed_iter()
        .filter(|(_, &c)| c > 0)
        .map(|((i, j), &c)| {
            Rectangle::new(
                [
                    (edge(xrange, bins, i), edge(yrange, bins, j)),
                    (edge(xrange, bins, i + 1), edge(yrange, bins, j + 1)),
                ],
                BLUE.mix(0.15 + 0.85 * c as f64 / top).filled(),
            )
        })
        .collect::<Vec<_>>();
    chart.draw_series(cells).map_err(plot_err)?;
    Ok(())
}

/// Lower-triangle grid of pairwise marginals, samples pooled over walkers.
pub fn draw_corner(path: &Path, series: &Series, cfg: &PlotConfig) -> Result<()> {
    let n = series.ncols();
    let samples: Vec<Vec<f64>> = (0..n).map(|k| series.samples(k)).collect();
    let ranges: Vec<(f64, f64)> = samples.iter().map(|s| bounds(s.iter().cloned())).collect();

    let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let cells = root.split_evenly((n, n));
    for i in 0..n {
        for j in 0..=i {
            let area = &cells[i * n + j];
            let xlabel = if i + 1 == n {
                Some(series.labels[j].as_str())
            } else {
                None
            };
            if i == j {
                draw_marginal(area, &samples[i], ranges[i], cfg.bins, xlabel)?;
            } else {
                let ylabel = if j == 0 {
                    Some(series.labels[i].as_str())
                } else {
                    None
                };
                draw_joint(
                    area,
                    (&samples[j], ranges[j]),
                    (&samples[i], ranges[i]),
                    cfg.bins,
                    (xlabel, ylabel),
                )?;
            }
        }
    }
    root.present().map_err(plot_err)?;
    info!("wrote {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct Labels {
    pub title: Option<String>,
    pub xlabel: String,
    pub ylabel: String,
}

pub fn draw_errorbars(path: &Path, points: &ErrorBars, labels: &Labels, cfg: &PlotConfig) -> Result<()> {
    let xspans = points.x_spans();
    let yspans = points.y_spans();
    let xrange = pad(bounds(xspans.iter().flat_map(|&(a, b)| vec![a, b])), 0.05);
    let yrange = pad(bounds(yspans.iter().flat_map(|&(a, b)| vec![a, b])), 0.05);

    let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(70);
    if let Some(title) = &labels.title {
        builder.caption(title, ("sans-serif", 24));
    }
    let mut chart = builder
        .build_cartesian_2d(xrange.0..xrange.1, yrange.0..yrange.1)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc(labels.xlabel.as_str())
        .y_desc(labels.ylabel.as_str())
        .draw()
        .map_err(plot_err)?;

    if points.yerr.is_some() {
        chart
            .draw_series(
                points
                    .x
                    .iter()
                    .zip(points.y.iter().zip(&yspans))
                    .map(|(&x, (&y, &(lo, hi)))| {
                        ErrorBar::new_vertical(x, lo, y, hi, BLACK.stroke_width(1), 6)
                    }),
            )
            .map_err(plot_err)?;
    }
    if points.xerr.is_some() {
        chart
            .draw_series(
                points
                    .y
                    .iter()
                    .zip(points.x.iter().zip(&xspans))
                    .map(|(&y, (&x, &(lo, hi)))| {
                        ErrorBar::new_horizontal(y, lo, x, hi, BLACK.stroke_width(1), 6)
                    }),
            )
            .map_err(plot_err)?;
    }
    chart
        .draw_series(
            points
                .x
                .iter()
                .zip(&points.y)
                .map(|(&x, &y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posterior::Posterior;
    use crate::table::Table;

    const CHAIN: &str = "m,b,lnlike,step,walker\n\
                         1.0,7.0,-1.0,0,0\n\
                         1.1,7.0,-1.1,1,0\n\
                         1.2,7.0,-1.2,2,0\n\
                         2.0,7.0,-2.0,0,1\n\
                         2.1,7.0,-2.1,1,1\n\
                         2.2,7.0,-2.2,2,1\n";

    fn posterior(text: &str) -> Posterior {
        Posterior::from_table(&Table::parse(text).unwrap()).unwrap()
    }

    fn assert_png(path: &Path) {
        let len = std::fs::metadata(path).unwrap().len();
        assert!(len > 0, "{} is empty", path.display());
    }

    fn small() -> PlotConfig {
        PlotConfig {
            width: 400,
            height: 300,
            bins: 5,
        }
    }

    #[test]
    fn test_draw_walkers() {
        let dir = tempfile::tempdir().unwrap();
        // column b is constant
        let burnt = posterior(CHAIN).burn(1).unwrap().series(&[]).unwrap();
        let path = dir.path().join("walkers.png");
        draw_walkers(&path, &burnt, &small()).unwrap();
        assert_png(&path);

        let single = posterior("m,lnlike,step,walker\n0.5,-1,0,0\n0.7,-2,0,1\n")
            .series(&[])
            .unwrap();
        assert_eq!(single.nsteps(), 1);
        let path = dir.path().join("single.png");
        draw_walkers(&path, &single, &small()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_draw_corner() {
        let dir = tempfile::tempdir().unwrap();
        let burnt = posterior(CHAIN).burn(1).unwrap().series(&[]).unwrap();
        let path = dir.path().join("corner.png");
        draw_corner(&path, &burnt, &small()).unwrap();
        assert_png(&path);

        let single = posterior("m,lnlike,step,walker\n0.5,-1,0,0\n")
            .series(&["m".to_string()])
            .unwrap();
        let path = dir.path().join("corner_m.png");
        draw_corner(&path, &single, &small()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_draw_errorbars() {
        let dir = tempfile::tempdir().unwrap();
        let points =
            ErrorBars::parse("t,flux,dy,dx\n0,1,0.1,0.2\n1,2,0.2,0.1\n2,2,0.3,0.0\n").unwrap();
        let labels = Labels {
            title: Some("flux".to_string()),
            xlabel: "t".to_string(),
            ylabel: "flux".to_string(),
        };
        let path = dir.path().join("points.png");
        draw_errorbars(&path, &points, &labels, &small()).unwrap();
        assert_png(&path);

        let bare = ErrorBars::parse("1 1\n1 1\n").unwrap();
        let path = dir.path().join("bare.png");
        draw_errorbars(&path, &bare, &Labels::default(), &small()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_zero_bins() {
        assert!(histogram(&[0.5], (0.0, 1.0), 0).is_empty());
        assert_eq!(histogram2d(&[0.5], &[0.5], (0.0, 1.0), (0.0, 1.0), 0).len(), 0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(bounds(vec![3.0, -1.0, f64::NAN, 2.0]), (-1.0, 3.0));
        assert_eq!(bounds(vec![2.0, 2.0]), (1.5, 2.5));
        assert_eq!(bounds(Vec::new()), (0.0, 1.0));
        assert_eq!(pad((0.0, 10.0), 0.1), (-1.0, 11.0));
    }

    #[test]
    fn test_histogram() {
        let s = vec![0.0, 0.1, 0.5, 0.99, 1.0, 2.0, f64::NAN];
        assert_eq!(histogram(&s, (0.0, 1.0), 4), vec![2, 0, 1, 2]);
    }

    #[test]
    fn test_histogram2d() {
        let xs = vec![0.0, 1.0, 1.0, 0.2];
        let ys = vec![0.0, 1.0, 0.9, 5.0];
        let h = histogram2d(&xs, &ys, (0.0, 1.0), (0.0, 1.0), 2);
        assert_eq!(h[[0, 0]], 1);
        assert_eq!(h[[1, 1]], 2);
        assert_eq!(h.sum(), 3);
    }

    #[test]
    fn test_default_config() {
        let cfg = PlotConfig::default();
        assert!(cfg.width > 0 && cfg.height > 0 && cfg.bins > 0);
    }
}
