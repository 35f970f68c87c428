// event planner command line client

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use eventplan::client::{bounded_wait, get_api_timeout};
use eventplan::{render_text, Field, HttpPlanningService, Phase, RequestOrchestrator};

#[derive(Parser)]
#[command(
    name = "eventplan",
    version,
    about = "Submit an event to the planning service and print the resulting plan"
)]
struct Cli {
    #[arg(long, help = "Event topic")]
    topic: Option<String>,

    #[arg(long, help = "Event description")]
    description: Option<String>,

    #[arg(long, help = "City the event takes place in")]
    city: Option<String>,

    #[arg(long, help = "Tentative date (YYYY-MM-DD)")]
    date: Option<String>,

    #[arg(long, help = "Expected number of participants")]
    participants: Option<String>,

    #[arg(long, help = "Budget in dollars")]
    budget: Option<String>,

    #[arg(long, help = "Conference Hall, Hotel Ballroom, Convention Center, Outdoor Venue, Restaurant or Other")]
    venue_type: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "OpenAI API key")]
    openai_api_key: Option<String>,

    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true, help = "Serper API key")]
    serper_api_key: Option<String>,

    #[arg(long, help = "Planning service base URL [env: EVENT_PLANNER_API_URL]")]
    api_url: Option<String>,

    #[arg(long, help = "Seconds to wait for a plan, 0 waits forever [env: API_TIMEOUT_SECONDS]")]
    timeout_secs: Option<u64>,

    #[arg(long, help = "Only check that the planning service is up")]
    check: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

impl Cli {
    // flags the user actually passed, as form edits
    fn edits(&self) -> Vec<(Field, &str)> {
        [
            (Field::EventTopic, &self.topic),
            (Field::EventDescription, &self.description),
            (Field::EventCity, &self.city),
            (Field::TentativeDate, &self.date),
            (Field::ExpectedParticipants, &self.participants),
            (Field::Budget, &self.budget),
            (Field::VenueType, &self.venue_type),
            (Field::OpenaiApiKey, &self.openai_api_key),
            (Field::SerperApiKey, &self.serper_api_key),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|raw| (field, raw)))
        .collect()
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout is reserved for the plan itself
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let service = match &cli.api_url {
        Some(url) => HttpPlanningService::new(url.as_str()),
        None => HttpPlanningService::from_env(),
    }
    .context("Failed to set up planning service client")?;
    info!("Using planning service at {}", service.base_url());

    if cli.check {
        let health = service.health().await.context("Health check failed")?;
        if !health.is_healthy() {
            bail!("Planning service reports status {:?}", health.status);
        }
        println!("Planning service is {}", health.status);
        return Ok(());
    }

    let timeout = cli.timeout_secs.map_or_else(get_api_timeout, bounded_wait);
    let mut orchestrator = RequestOrchestrator::new(service).with_timeout(timeout);
    for (field, raw) in cli.edits() {
        orchestrator.update_field(field, raw);
    }

    if orchestrator.submit().is_none() {
        for notice in orchestrator.take_notices() {
            eprintln!("{}", notice);
        }
        bail!("Submission was not started");
    }
    eprintln!("AI agents are planning your event... This may take 1-2 minutes.");

    let interrupted = tokio::select! {
        _ = orchestrator.settle() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        warn!("Interrupted, cancelling submission");
        orchestrator.cancel();
    }

    match orchestrator.phase().clone() {
        Phase::Succeeded(_) => {
            print!("{}", render_text(&orchestrator.state().sections()));
            Ok(())
        }
        Phase::Failed(message) => bail!("Error: {}", message),
        Phase::Idle | Phase::Submitting(_) => bail!("Submission cancelled"),
    }
}
