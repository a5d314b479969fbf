use std::path::PathBuf;

use chain_plot::posterior::Posterior;
use chain_plot::{cli, logging, output, render, Result};
use clap::{App, ArgMatches};
use tracing::{debug, info};

fn run(matches: &ArgMatches) -> Result<()> {
    let input = cli::input_path(matches)?;
    let burn_in = cli::parse_value::<usize>(matches, "burn")?.unwrap_or(0);
    let display = cli::parse_display(matches.value_of("display"));
    let cfg = cli::plot_config(matches)?;

    info!("loading {}", input.display());
    let posterior = Posterior::from_file(&input)?;
    let selected = posterior.selected_names(&display)?;

    let out = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| output::default_path(&input, "corner", &selected));
    output::ensure_absent(&out)?;

    let series = posterior.burn(burn_in)?.series(&display)?;
    info!(
        "{} samples per parameter",
        series.nwalkers() * series.nsteps()
    );
    render::draw_corner(&out, &series, &cfg)
}

pub fn main() {
    let matches = App::new("plot_corner")
        .about("corner plot of the marginal posteriors in a flattened chain file")
        .arg(cli::file_arg())
        .arg(cli::burn_arg())
        .arg(cli::display_arg())
        .arg(cli::output_arg())
        .args(&cli::size_args())
        .arg(cli::bins_arg())
        .arg(cli::verbose_arg())
        .get_matches();
    logging::init(matches.occurrences_of("verbose"));

    if let Err(e) = run(&matches) {
        debug!("{:?}", e);
        eprintln!("plot_corner: {}", e);
        std::process::exit(1);
    }
}
