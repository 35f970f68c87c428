// client side of the multi-agent event planner

pub mod client;
pub mod error;
pub mod interpreter;
pub mod markdown;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use client::{HttpPlanningService, PlanningService};
pub use error::{PlanningError, ValidationError};
pub use interpreter::{interpret, render_text, Section};
pub use models::{Configuration, Credentials, SubmissionResult, VenueDetails, VenueType};
pub use orchestrator::{transition, AppState, Event, Notice, Phase, RequestOrchestrator};
pub use store::{ConfigurationStore, Field, ValidationOutcome};
