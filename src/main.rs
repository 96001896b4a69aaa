use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;
use std::process::ExitCode;

use lif_network::connectivity::Connectivity;
use lif_network::error::SNNError;
use lif_network::network::Network;
use lif_network::params::SimulationParams;
use lif_network::spike_log::{firing_rate, SpikeWriter};

#[derive(Parser, Debug)]
#[command(version, about = "Simulate a sparse random network of LIF neurons and log its spikes")]
struct Args {
    /// The parameter file: g, eta, number of neurons, start time (ms) and stop time (ms)
    #[arg(short, long, default_value = "param.in")]
    params: PathBuf,
    /// The spike log, one `<step> <neuron_id>` line per spike
    #[arg(short, long, default_value = "spikes.txt")]
    output: PathBuf,
    /// The seed used for connectivity and background noise (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Disable the Poisson background noise
    #[arg(long)]
    no_noise: bool,
    /// Reuse the connectivity saved by a previous run instead of sampling a new one
    #[arg(long)]
    load_topology: Option<PathBuf>,
    /// Save the connectivity to a JSON file
    #[arg(long)]
    save_topology: Option<PathBuf>,
    /// Log progress messages
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<(), SNNError> {
    let level = match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    let stderr = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {l} - {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| SNNError::IOError(e.to_string()))?;
    Ok(())
}

fn simulate(args: &Args) -> Result<(), SNNError> {
    let params = SimulationParams::load_from(&args.params)?;
    log::info!("{:?}", params);

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);

    let mut network = Network::build(
        !args.no_noise,
        params.g,
        params.eta,
        params.num_neurons,
        seed,
    )?;
    match &args.load_topology {
        Some(path) => network.create_network_with(Connectivity::load_from(path)?)?,
        None => network.create_network()?,
    }
    if let Some(path) = &args.save_topology {
        network.connectivity().save_to(path)?;
        log::info!("Connectivity saved to {}", path.display());
    }

    let mut writer = SpikeWriter::create(&args.output)?;
    network.run(params.start_step(), params.stop_step(), &mut writer)?;
    writer.flush()?;

    let rate = firing_rate(
        writer.num_spikes(),
        params.num_neurons,
        params.stop_step() - params.start_step(),
    );
    log::info!(
        "{} spikes written to {} (mean firing rate {:.2} Hz)",
        writer.num_spikes(),
        args.output.display(),
        rate
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match simulate(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
