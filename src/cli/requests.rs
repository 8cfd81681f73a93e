use std::path::PathBuf;

use anyhow::Context;
use bloodlink::{
    BloodRequest, Directory, RequestStore,
    domain::{MatchFeed, RequestDraft, Transition, Urgency, own_requests},
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Requests {
    /// The user acting on requests
    #[arg(long, env = "BLOODLINK_USER", global = true)]
    user: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: RequestCommand,
}

#[derive(Debug, Subcommand)]
enum RequestCommand {
    /// List active requests from other users, newest first
    Open,

    /// List your own requests in every status
    Mine,

    /// Post a new blood request
    Create(Create),

    /// Cancel one of your active requests
    Cancel {
        /// The request id
        id: String,
    },

    /// Mark one of your active requests as fulfilled
    Complete {
        /// The request id
        id: String,
    },
}

#[derive(Debug, Args)]
struct Create {
    /// Who the blood is for
    #[arg(long)]
    patient_name: String,

    /// Blood type needed (e.g. O+, ab-)
    #[arg(long)]
    blood_type: String,

    /// Units needed, in half-unit steps
    #[arg(long)]
    units: String,

    /// The date the blood is needed by (YYYY-MM-DD)
    #[arg(long)]
    needed_by: String,

    /// Hospital name
    #[arg(long)]
    hospital: String,

    /// Ten-digit contact number
    #[arg(long)]
    contact_number: String,

    /// How urgent the request is (normal, urgent, emergency)
    #[arg(long, default_value = "normal", value_parser = parse_urgency)]
    urgency: Urgency,

    /// Optional note for donors
    #[arg(long, default_value = "")]
    message: String,
}

impl From<Create> for RequestDraft {
    fn from(create: Create) -> Self {
        Self {
            patient_name: create.patient_name,
            blood_type: create.blood_type,
            units_needed: create.units,
            needed_by_date: create.needed_by,
            hospital: create.hospital,
            contact_number: create.contact_number,
            message: create.message,
            urgency: create.urgency,
        }
    }
}

fn parse_urgency(s: &str) -> Result<Urgency, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "normal" => Ok(Urgency::Normal),
        "urgent" => Ok(Urgency::Urgent),
        "emergency" => Ok(Urgency::Emergency),
        other => Err(format!("unknown urgency '{other}'")),
    }
}

impl Requests {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let user = self
            .user
            .filter(|user| !user.trim().is_empty())
            .context("no user given; pass --user or set BLOODLINK_USER")?;
        let directory = Directory::new(root)?;
        let mut store = directory.requests()?;

        match self.command {
            RequestCommand::Open => {
                // The CLI sees a single snapshot of the feed.
                let feed = MatchFeed::new(std::iter::once(store.snapshot()), user.as_str());
                let open: Vec<BloodRequest> = feed.flatten().collect();
                output_list(&open.iter().collect::<Vec<_>>(), self.output, &user)?;
            }
            RequestCommand::Mine => {
                let mine = own_requests(store.all(), &user);
                output_list(&mine, self.output, &user)?;
            }
            RequestCommand::Create(create) => {
                let created = create_request(&mut store, create, &user, Utc::now())?;
                output_one(&created, self.output, "Created")?;
            }
            RequestCommand::Cancel { id } => {
                let request = store.transition(&id, &user, Transition::Cancel)?;
                output_one(&request, self.output, "Cancelled")?;
            }
            RequestCommand::Complete { id } => {
                let request = store.transition(&id, &user, Transition::Complete)?;
                output_one(&request, self.output, "Completed")?;
            }
        }
        Ok(())
    }
}

/// Validate `create` against the day of `now` and store it as created at
/// `now`, so both use the same instant.
fn create_request(
    store: &mut impl RequestStore,
    create: Create,
    user: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<BloodRequest> {
    let request = RequestDraft::from(create)
        .validate(now.date_naive())
        .context("invalid blood request")?;
    Ok(store.create(request, user, now)?)
}

fn output_list(
    requests: &[&BloodRequest],
    output: OutputFormat,
    user: &str,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), requests)?;
            println!();
        }
        OutputFormat::Table => {
            if requests.is_empty() {
                println!("{}", "No blood requests found.".dim());
                return Ok(());
            }
            for request in requests {
                output_request(request, user);
            }
        }
    }
    Ok(())
}

fn output_one(request: &BloodRequest, output: OutputFormat, verb: &str) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), request)?;
            println!();
        }
        OutputFormat::Table => {
            println!("{} request {}", verb.success(), request.id);
        }
    }
    Ok(())
}

fn output_request(request: &BloodRequest, user: &str) {
    let urgency = match request.urgency {
        Urgency::Normal => request.urgency.to_string().dim(),
        Urgency::Urgent => request.urgency.to_string().warning(),
        Urgency::Emergency => request.urgency.to_string().danger(),
    };
    let owner = if request.is_owned_by(user) {
        format!(" [{}]", request.status)
    } else {
        String::new()
    };

    println!(
        "{}  {} x{} for {} at {}{}",
        request.id,
        request.blood_type,
        request.units_needed,
        request.patient_name,
        request.hospital,
        owner
    );
    println!(
        "  Needed by {}  Contact {}  Urgency {}",
        request.needed_by_date, request.contact_number, urgency
    );
    if let Some(message) = &request.message {
        println!("  {message}");
    }
}
