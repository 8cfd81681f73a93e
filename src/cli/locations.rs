use std::path::PathBuf;

use bloodlink::{
    Directory, LocationRecord,
    domain::filter::{cities_available, districts_available, states_available},
};
use clap::{Parser, ValueEnum};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

/// Which reference dataset to read locations from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Donors,
    Banks,
}

#[derive(Debug, Parser)]
pub struct Locations {
    /// The dataset to list locations for
    #[arg(value_enum)]
    dataset: Dataset,

    /// List the districts of this state
    #[arg(long)]
    state: Option<String>,

    /// List the cities of this district (requires --state)
    #[arg(long, requires = "state")]
    district: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Locations {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?.load()?;

        let options = match self.dataset {
            Dataset::Donors => self.options(directory.donors()),
            Dataset::Banks => self.options(directory.banks()),
        };

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &options)?;
                println!();
            }
            OutputFormat::Table => {
                if options.is_empty() {
                    println!("{}", "No locations found.".dim());
                }
                for option in options {
                    println!("{option}");
                }
            }
        }
        Ok(())
    }

    fn options<'a, R: LocationRecord>(&self, records: &'a [R]) -> Vec<&'a str> {
        match (self.state.as_deref(), self.district.as_deref()) {
            (None, _) => states_available(records),
            (Some(state), None) => districts_available(records, Some(state)),
            (Some(state), Some(district)) => {
                cities_available(records, Some(state), Some(district))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bloodlink::{BloodType, Donor, Location};
    use test_case::test_case;

    use super::*;

    fn donor(id: &str, state: &str, district: &str, city: &str) -> Donor {
        Donor {
            id: id.to_string(),
            full_name: format!("Donor {id}"),
            blood_type: BloodType::OPositive,
            last_donation: None,
            phone_number: "9876543210".to_string(),
            location: Location::new(state, district, city).unwrap(),
        }
    }

    fn locations(state: Option<&str>, district: Option<&str>) -> Locations {
        Locations {
            dataset: Dataset::Donors,
            state: state.map(str::to_string),
            district: district.map(str::to_string),
            output: OutputFormat::Table,
        }
    }

    #[test_case(None, None, &["Karnataka", "Kerala"]; "states")]
    #[test_case(Some("Kerala"), None, &["Ernakulam", "Thrissur"]; "districts")]
    #[test_case(Some("Kerala"), Some("Ernakulam"), &["Aluva", "Kochi"]; "cities")]
    #[test_case(Some("Goa"), None, &[]; "unknown state")]
    fn lists_the_next_level(state: Option<&str>, district: Option<&str>, expected: &[&str]) {
        let donors = [
            donor("1", "Kerala", "Ernakulam", "Kochi"),
            donor("2", "Kerala", "Ernakulam", "Aluva"),
            donor("3", "Kerala", "Thrissur", "Thrissur"),
            donor("4", "Karnataka", "Mysuru", "Mysuru"),
        ];

        assert_eq!(locations(state, district).options(&donors), expected);
    }
}
