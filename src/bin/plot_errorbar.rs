use std::path::PathBuf;

use chain_plot::errorbar::ErrorBars;
use chain_plot::render::{self, Labels};
use chain_plot::{cli, logging, output, Result};
use clap::{App, Arg, ArgMatches};
use tracing::{debug, info};

fn run(matches: &ArgMatches) -> Result<()> {
    let input = cli::input_path(matches)?;
    let cfg = cli::plot_config(matches)?;

    let out = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| output::stem_path(&input));
    output::ensure_absent(&out)?;

    info!("loading {}", input.display());
    let points = ErrorBars::from_file(&input)?;
    let labels = Labels {
        title: matches.value_of("title").map(String::from),
        xlabel: matches
            .value_of("xlabel")
            .map(String::from)
            .or_else(|| points.xlabel.clone())
            .unwrap_or_else(|| "x".to_string()),
        ylabel: matches
            .value_of("ylabel")
            .map(String::from)
            .or_else(|| points.ylabel.clone())
            .unwrap_or_else(|| "y".to_string()),
    };
    render::draw_errorbars(&out, &points, &labels, &cfg)
}

pub fn main() {
    let matches = App::new("plot_errorbar")
        .about("scatter plot with error bars, columns are x, y, yerr and xerr")
        .arg(cli::file_arg())
        .arg(cli::output_arg())
        .arg(
            Arg::with_name("title")
                .short("t")
                .long("title")
                .takes_value(true)
                .value_name("title")
                .help("plot title"),
        )
        .arg(
            Arg::with_name("xlabel")
                .long("xlabel")
                .takes_value(true)
                .value_name("label")
                .help("x axis label, the first header name by default"),
        )
        .arg(
            Arg::with_name("ylabel")
                .long("ylabel")
                .takes_value(true)
                .value_name("label")
                .help("y axis label, the second header name by default"),
        )
        .args(&cli::size_args())
        .arg(cli::verbose_arg())
        .get_matches();
    logging::init(matches.occurrences_of("verbose"));

    if let Err(e) = run(&matches) {
        debug!("{:?}", e);
        eprintln!("plot_errorbar: {}", e);
        std::process::exit(1);
    }
}
