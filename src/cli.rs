use std::path::PathBuf;

mod banks;
mod donors;
mod locations;
mod requests;
mod terminal;

use banks::Banks;
use bloodlink::{BloodType, Criteria};
use clap::ArgAction;
use donors::Donors;
use locations::Locations;
use requests::Requests;
use tracing::instrument;

/// Parse a blood type at the CLI boundary, accepting any case.
fn parse_blood_type(s: &str) -> Result<BloodType, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the data directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new data directory
    Init,

    /// List the states, districts or cities to choose from
    ///
    /// With no location given, lists states. With a state, lists its
    /// districts. With a state and district, lists their cities.
    Locations(Locations),

    /// Find donors by location and blood type
    Donors(Donors),

    /// Find blood banks by location and blood type, with stock levels
    Banks(Banks),

    /// Create, list, cancel and complete blood requests
    Requests(Requests),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => init(root)?,
            Self::Locations(command) => command.run(root)?,
            Self::Donors(command) => command.run(root)?,
            Self::Banks(command) => command.run(root)?,
            Self::Requests(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[instrument]
fn init(root: PathBuf) -> anyhow::Result<()> {
    let directory = bloodlink::Directory::init(root)?;
    let config = directory.config();

    println!(
        "Initialized data directory in {}",
        directory.root().display()
    );
    println!("  Created: .bloodlink/config.toml");
    println!("  Data:    {}", config.donors_file.display());
    println!("           {}", config.banks_file.display());
    println!("           {}", config.requests_file.display());
    Ok(())
}

/// Location and blood type filters shared by the listing commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Only records in this state
    #[arg(long)]
    state: Option<String>,

    /// Only records in this district (requires --state)
    #[arg(long, requires = "state")]
    district: Option<String>,

    /// Only records in this city (requires --district)
    #[arg(long, requires = "district")]
    city: Option<String>,

    /// Only records matching this blood type (e.g. O+, ab-)
    #[arg(long, value_parser = parse_blood_type)]
    blood_type: Option<BloodType>,
}

impl FilterArgs {
    /// Build criteria in picker order, so each level clears the ones below.
    fn criteria(&self) -> Criteria {
        let mut criteria = Criteria::new().with_blood_type(self.blood_type);
        if let Some(state) = &self.state {
            criteria.set_state(state.as_str());
        }
        if let Some(district) = &self.district {
            criteria.set_district(district.as_str());
        }
        if let Some(city) = &self.city {
            criteria.set_city(city.as_str());
        }
        criteria
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
