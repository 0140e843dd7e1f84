// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod live;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use craftsbite::{
    DEFAULT_MONTHLY_WFH_ALLOWANCE, HeadcountAggregator, MutationService, WfhReporter,
};
use craftsbite_domain::{CutoffGate, DomainError, WeekendDays};
use craftsbite_live::{BroadcastHub, DEFAULT_SUBSCRIBER_BUFFER, ORG_INBOUND_CAPACITY, OrgBroadcastHub};
use craftsbite_persistence::Persistence;
use std::sync::Arc;
use tracing::info;

/// CraftsBite Server - meal participation and headcount service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(long, env = "CRAFTSBITE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, env = "CRAFTSBITE_PORT", default_value_t = 3000)]
    port: u16,

    /// Time of day (`HH:MM`) on the previous day after which choices lock
    #[arg(long, env = "MEAL_CUTOFF_TIME", default_value = "21:00")]
    cutoff_time: String,

    /// IANA timezone the cutoff is evaluated in
    #[arg(long, env = "MEAL_CUTOFF_TIMEZONE", default_value = "Asia/Dhaka")]
    cutoff_timezone: String,

    /// Comma-separated weekday names treated as the weekend
    #[arg(long, env = "MEAL_WEEKEND_DAYS", default_value = "saturday,sunday")]
    weekend_days: String,

    /// Work-from-home days each user may take per month
    #[arg(
        long,
        env = "MEAL_MONTHLY_WFH_ALLOWANCE",
        default_value_t = DEFAULT_MONTHLY_WFH_ALLOWANCE
    )]
    monthly_wfh_allowance: u32,

    /// Messages buffered per live subscriber before drops begin
    #[arg(long, default_value_t = DEFAULT_SUBSCRIBER_BUFFER)]
    subscriber_buffer: usize,

    /// JSON fixture loaded into the in-memory store at startup
    #[arg(long, env = "CRAFTSBITE_SEED")]
    seed: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The repository every engine component reads and writes.
    store: Arc<Persistence>,
    /// Per-date live headcount relay.
    hub: Arc<BroadcastHub>,
    /// Organization-wide live headcount relay.
    org_hub: Arc<OrgBroadcastHub>,
    /// The mutation cutoff rule.
    gate: CutoffGate,
    /// The configured weekend.
    weekend_days: WeekendDays,
    /// WFH days allowed per user per month.
    monthly_wfh_allowance: u32,
    /// Source of the current instant.
    clock: fn() -> DateTime<Utc>,
}

impl AppState {
    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Today's date in the cutoff timezone.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.gate.timezone()).date_naive()
    }

    fn tomorrow(&self) -> Result<NaiveDate, DomainError> {
        self.today()
            .succ_opt()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("tomorrow"),
            })
    }

    fn mutations(&self) -> MutationService<'_, Persistence> {
        MutationService::new(self.store.as_ref(), self.gate)
    }

    fn aggregator(&self) -> HeadcountAggregator<'_, Persistence> {
        HeadcountAggregator::new(self.store.as_ref(), self.weekend_days)
    }

    fn wfh_reporter(&self) -> WfhReporter<'_, Persistence> {
        WfhReporter::new(self.store.as_ref(), self.monthly_wfh_allowance)
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/headcount", get(handlers::handle_headcount_overview))
        .route("/headcount/{date}", get(handlers::handle_headcount))
        .route(
            "/headcount/{date}/meals/{meal_type}",
            get(handlers::handle_meal_detail),
        )
        .route("/announcement/{date}", get(handlers::handle_announcement))
        .route(
            "/participation/{user_id}/{date}",
            get(handlers::handle_get_participation),
        )
        .route("/participation", post(handlers::handle_set_participation))
        .route(
            "/participation/override",
            post(handlers::handle_override_participation),
        )
        .route(
            "/preferences/{user_id}",
            get(handlers::handle_get_preference).put(handlers::handle_set_preference),
        )
        .route(
            "/work_location/{user_id}/{date}",
            get(handlers::handle_get_work_location),
        )
        .route(
            "/work_location/{user_id}/monthly/{year_month}",
            get(handlers::handle_monthly_wfh_summary),
        )
        .route(
            "/work_location/reports/{year_month}",
            get(handlers::handle_team_monthly_report),
        )
        .route("/work_location", post(handlers::handle_set_work_location))
        .route(
            "/work_location/override",
            post(handlers::handle_override_work_location),
        )
        .route("/global_policies", post(handlers::handle_create_global_policy))
        .route(
            "/global_policies/{policy_id}",
            delete(handlers::handle_remove_global_policy),
        )
        .route("/bulk_opt_outs", post(handlers::handle_create_bulk_opt_out))
        .route(
            "/bulk_opt_outs/admin",
            post(handlers::handle_admin_bulk_opt_out),
        )
        .route(
            "/users/{user_id}/bulk_opt_outs",
            get(handlers::handle_list_bulk_opt_outs),
        )
        .route(
            "/bulk_opt_outs/{bulk_opt_out_id}",
            delete(handlers::handle_remove_bulk_opt_out),
        )
        .route(
            "/teams/participation/{date}",
            get(handlers::handle_all_teams_participation),
        )
        .route(
            "/teams/{lead_id}/participation/{date}",
            get(handlers::handle_team_participation),
        )
        .route("/history/{user_id}", get(handlers::handle_history))
        .route("/live/headcount", get(live::handle_live_org_headcount))
        .route("/live/headcount/{date}", get(live::handle_live_headcount))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CraftsBite Server");

    // Configuration errors abort startup
    let gate: CutoffGate = CutoffGate::new(&args.cutoff_time, &args.cutoff_timezone)?;
    let weekend_days: WeekendDays = WeekendDays::from_names(args.weekend_days.split(','))?;
    info!(
        cutoff_time = %gate.cutoff_time(),
        timezone = %gate.timezone(),
        weekend_days = %args.weekend_days,
        monthly_wfh_allowance = args.monthly_wfh_allowance,
        "Cutoff configured"
    );

    let store: Persistence = if let Some(seed_path) = &args.seed {
        info!("Loading seed from: {}", seed_path);
        Persistence::from_seed_file(seed_path)?
    } else {
        info!("Starting with an empty in-memory store");
        Persistence::new_in_memory()
    };

    let app_state: AppState = AppState {
        store: Arc::new(store),
        hub: Arc::new(BroadcastHub::new(args.subscriber_buffer)),
        org_hub: Arc::new(OrgBroadcastHub::spawn(
            ORG_INBOUND_CAPACITY,
            args.subscriber_buffer,
        )),
        gate,
        weekend_days,
        monthly_wfh_allowance: args.monthly_wfh_allowance,
        clock: Utc::now,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind and run
    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
