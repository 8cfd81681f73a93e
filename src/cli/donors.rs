use std::path::PathBuf;

use bloodlink::{Directory, Donor, LocationRecord};
use clap::Parser;
use tracing::instrument;

use super::{FilterArgs, OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Donors {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Donors {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?.load()?;
        let selection = directory.donor_selection(self.filter.criteria());
        let donors = selection.results();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &donors)?;
                println!();
            }
            OutputFormat::Table => output_table(&donors),
        }
        Ok(())
    }
}

fn output_table(donors: &[&Donor]) {
    if donors.is_empty() {
        println!("{}", "No donors match the selected filters.".dim());
        return;
    }

    println!(
        "{:<24} {:<5} {:<12} {:<11} LOCATION",
        "NAME", "TYPE", "LAST GIVEN", "PHONE"
    );
    for donor in donors {
        let location = donor.location();
        let last_donation = donor
            .last_donation
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        println!(
            "{:<24} {:<5} {:<12} {:<11} {}, {}, {}",
            donor.full_name,
            donor.blood_type,
            last_donation,
            donor.phone_number,
            location.city(),
            location.district(),
            location.state(),
        );
    }
    println!();
    println!("{} donor(s)", donors.len());
}
