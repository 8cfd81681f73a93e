use std::path::PathBuf;

use bloodlink::{BloodBank, BloodType, Directory, LocationRecord, Tier};
use clap::Parser;
use serde::Serialize;
use tracing::instrument;

use super::{FilterArgs, OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Banks {
    #[command(flatten)]
    pub(super) filter: FilterArgs,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Banks {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?.load()?;
        let selection = directory.bank_selection(self.filter.criteria());
        let banks = selection.results();

        match self.output {
            OutputFormat::Json => {
                let views: Vec<BankView> = banks.iter().copied().map(BankView::from).collect();
                serde_json::to_writer_pretty(std::io::stdout(), &views)?;
                println!();
            }
            OutputFormat::Table => {
                if banks.is_empty() {
                    println!("{}", "No blood banks match the selected filters.".dim());
                }
                for bank in &banks {
                    output_bank(bank);
                }
            }
        }
        Ok(())
    }
}

/// A bank as printed in JSON output, with each stock level classified.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BankView<'a> {
    #[serde(flatten)]
    bank: &'a BloodBank,
    stock: Vec<StockLevel>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct StockLevel {
    blood_type: BloodType,
    units: u32,
    tier: Tier,
}

impl<'a> From<&'a BloodBank> for BankView<'a> {
    fn from(bank: &'a BloodBank) -> Self {
        let stock = bank
            .inventory
            .tiers()
            .map(|(blood_type, units, tier)| StockLevel {
                blood_type,
                units,
                tier,
            })
            .collect();
        Self { bank, stock }
    }
}

fn output_bank(bank: &BloodBank) {
    let location = bank.location();
    println!("{}", bank.name);
    println!(
        "  {}, {}, {}, {} {}",
        bank.address,
        location.city(),
        location.district(),
        location.state(),
        bank.pincode
    );
    println!("  Phone: {}  Hours: {}", bank.phone_number, bank.operating_hours);

    let stock: Vec<String> = bank
        .inventory
        .tiers()
        .map(|(blood_type, units, tier)| format!("{blood_type}:{units}").tier(tier))
        .collect();
    println!("  Stock: {}", stock.join("  "));

    let short: Vec<String> = bank
        .inventory
        .tiers()
        .filter(|(_, _, tier)| *tier != Tier::Sufficient)
        .map(|(blood_type, ..)| blood_type.to_string())
        .collect();
    if !short.is_empty() {
        println!("  {}", format!("Running low: {}", short.join(", ")).warning());
    }
    println!();
}
