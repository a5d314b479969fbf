use std::path::PathBuf;
use std::str::FromStr;

use clap::{Arg, ArgMatches};

use crate::error::{Error, Result};
use crate::render::PlotConfig;

pub fn file_arg() -> Arg<'static, 'static> {
    Arg::with_name("file")
        .short("f")
        .long("file")
        .takes_value(true)
        .value_name("file")
        .required(true)
        .help("input text file, first line is a comma separated header")
}

pub fn burn_arg() -> Arg<'static, 'static> {
    Arg::with_name("burn")
        .short("b")
        .long("burn")
        .takes_value(true)
        .value_name("steps")
        .default_value("0")
        .help("number of leading steps of every walker to discard")
}

pub fn display_arg() -> Arg<'static, 'static> {
    Arg::with_name("display")
        .short("d")
        .long("display")
        .takes_value(true)
        .value_name("names")
        .help("comma separated parameter names to plot, all by default")
}

pub fn output_arg() -> Arg<'static, 'static> {
    Arg::with_name("output")
        .short("o")
        .long("out")
        .takes_value(true)
        .value_name("outfile")
        .help("output png file, defaults to a name next to the input file")
}

pub fn size_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("width")
            .long("width")
            .takes_value(true)
            .value_name("px")
            .help("image width in pixels"),
        Arg::with_name("height")
            .long("height")
            .takes_value(true)
            .value_name("px")
            .help("image height in pixels"),
    ]
}

pub fn bins_arg() -> Arg<'static, 'static> {
    Arg::with_name("bins")
        .long("bins")
        .takes_value(true)
        .value_name("n")
        .help("number of histogram bins per axis")
}

pub fn verbose_arg() -> Arg<'static, 'static> {
    Arg::with_name("verbose")
        .short("v")
        .multiple(true)
        .help("more log output, repeat for debug")
}

/// Splits a comma separated list, dropping empty items.
pub fn parse_display(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
            Error::InvalidArgument(format!("--{} expects a non-negative integer, got '{}'", name, v))
        }),
    }
}

pub fn input_path(matches: &ArgMatches) -> Result<PathBuf> {
    matches
        .value_of("file")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidArgument("missing input file".to_string()))
}

pub fn plot_config(matches: &ArgMatches) -> Result<PlotConfig> {
    let mut cfg = PlotConfig::default();
    if let Some(w) = parse_value(matches, "width")? {
        cfg.width = w;
    }
    if let Some(h) = parse_value(matches, "height")? {
        cfg.height = h;
    }
    if let Some(b) = parse_value(matches, "bins")? {
        cfg.bins = b;
    }
    if cfg.width == 0 || cfg.height == 0 || cfg.bins == 0 {
        return Err(Error::InvalidArgument(
            "width, height and bins must be positive".to_string(),
        ));
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::App;

    fn app() -> App<'static, 'static> {
        App::new("test")
            .arg(file_arg())
            .arg(burn_arg())
            .arg(display_arg())
            .arg(output_arg())
            .args(&size_args())
            .arg(bins_arg())
            .arg(verbose_arg())
    }

    #[test]
    fn test_parse_display() {
        assert!(parse_display(None).is_empty());
        assert_eq!(parse_display(Some("m, b,,")), vec!["m", "b"]);
    }

    #[test]
    fn test_defaults() {
        let m = app().get_matches_from(vec!["test", "-f", "chain.txt"]);
        assert_eq!(input_path(&m).unwrap(), PathBuf::from("chain.txt"));
        assert_eq!(parse_value::<usize>(&m, "burn").unwrap(), Some(0));
        assert_eq!(m.occurrences_of("verbose"), 0);
        let cfg = plot_config(&m).unwrap();
        assert_eq!(cfg.bins, PlotConfig::default().bins);
    }

    #[test]
    fn test_values() {
        let m = app().get_matches_from(vec![
            "test", "-f", "c.txt", "-b", "10", "-d", "m,b", "--width", "640", "--bins", "12",
            "-vv",
        ]);
        assert_eq!(parse_value::<usize>(&m, "burn").unwrap(), Some(10));
        assert_eq!(parse_display(m.value_of("display")), vec!["m", "b"]);
        let cfg = plot_config(&m).unwrap();
        assert_eq!(cfg.width, 640);
        assert_eq!(cfg.bins, 12);
        assert_eq!(m.occurrences_of("verbose"), 2);
    }

    #[test]
    fn test_bad_values() {
        let m = app().get_matches_from(vec!["test", "-f", "c.txt", "-b", "ten"]);
        assert!(matches!(
            parse_value::<usize>(&m, "burn"),
            Err(Error::InvalidArgument(_))
        ));
        let m = app().get_matches_from(vec!["test", "-f", "c.txt", "--bins", "0"]);
        assert!(plot_config(&m).is_err());
    }
}
