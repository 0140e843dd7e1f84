// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::AppState;
use crate::error::HttpError;
use crate::live::{publish_headcount, publish_headcount_range};
use axum::{
    Json,
    extract::{Path, Query, State as AxumState},
};
use chrono::NaiveDate;
use craftsbite::{
    AdminBulkOptOutRequest, AdminBulkOptOutResult, Announcement, BulkOptOutRequest, CoreError,
    DailySummary, DayParticipation, GlobalPolicyRequest, LocationChange, LocationDecision,
    MealDetail, MonthlyWfhSummary, ParticipationChange, ParticipationResolver, TeamMonthlyReport,
    TeamParticipation, UserRepository, WorkLocationResolver, render_announcement,
};
use craftsbite_audit::HistoryRecord;
use craftsbite_domain::{
    Actor, BulkOptOut, GlobalWorkLocationPolicy, MealPreference, MealType, ParticipationRecord,
    User, UserId, WorkLocation, WorkLocationStatus, YearMonth, parse_date,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// API request for a user's own meal choice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParticipationApiRequest {
    /// The user making the choice.
    pub user_id: String,
    /// The target date (`YYYY-MM-DD`).
    pub date: String,
    /// The meal, e.g. `lunch`.
    pub meal_type: String,
    /// Whether the user will eat the meal.
    pub is_participating: bool,
}

/// API request for a meal choice made on another user's behalf.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverrideParticipationApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The user whose choice changes.
    pub user_id: String,
    /// The target date (`YYYY-MM-DD`).
    pub date: String,
    /// The meal, e.g. `lunch`.
    pub meal_type: String,
    /// Whether the user will eat the meal.
    pub is_participating: bool,
    /// Why the override was made.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request for a user's own work location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkLocationApiRequest {
    /// The user.
    pub user_id: String,
    /// The target date (`YYYY-MM-DD`).
    pub date: String,
    /// `office` or `wfh`.
    pub location: String,
}

/// API request for a work location set on another user's behalf.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverrideWorkLocationApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The user whose location changes.
    pub user_id: String,
    /// The target date (`YYYY-MM-DD`).
    pub date: String,
    /// `office` or `wfh`.
    pub location: String,
    /// Why the change was made.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request for declaring a company-wide work location policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalPolicyApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// First covered date (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last covered date (`YYYY-MM-DD`).
    pub end_date: String,
    /// `office` or `wfh`.
    pub location: String,
    /// Why the policy was declared.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request for opting out of a meal over a date range.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkOptOutApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The user opting out.
    pub user_id: String,
    /// First covered date (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last covered date (`YYYY-MM-DD`).
    pub end_date: String,
    /// The meal, e.g. `lunch`.
    pub meal_type: String,
    /// Why the opt-out was made.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request for opting several users out of several meals.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminBulkOptOutApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The users to opt out.
    pub user_ids: Vec<String>,
    /// First covered date (`YYYY-MM-DD`).
    pub start_date: String,
    /// Last covered date (`YYYY-MM-DD`).
    pub end_date: String,
    /// The meals, e.g. `["lunch", "snacks"]`.
    pub meal_types: Vec<String>,
    /// Why the opt-out was made.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API request for changing a default meal preference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreferenceApiRequest {
    /// `opt_in` or `opt_out`.
    pub default_meal_preference: String,
}

/// A user's default meal preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceResponse {
    /// The user.
    pub user_id: UserId,
    /// The fallback used when nothing more specific applies.
    pub default_meal_preference: MealPreference,
}

impl From<User> for PreferenceResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            default_meal_preference: user.default_meal_preference,
        }
    }
}

/// Query identifying the acting user on removals.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    /// The actor ID performing this action.
    pub actor_id: String,
}

/// Headcounts for the current and the following day.
#[derive(Debug, Clone, Serialize)]
pub struct HeadcountOverviewResponse {
    /// Today in the cutoff timezone.
    pub today: DailySummary,
    /// The day after.
    pub tomorrow: DailySummary,
}

fn resolve_actor(app_state: &AppState, actor_id: &str) -> Result<Actor, HttpError> {
    Ok(app_state.mutations().actor(&UserId::new(actor_id))?)
}

/// Handler for GET `/headcount` endpoint.
pub async fn handle_headcount_overview(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<HeadcountOverviewResponse>, HttpError> {
    let today: NaiveDate = app_state.today();
    let tomorrow: NaiveDate = app_state.tomorrow()?;
    info!(%today, "Handling headcount overview request");

    let today_summary: DailySummary = app_state.aggregator().summarize(today)?;
    let tomorrow_summary: DailySummary = app_state.aggregator().summarize(tomorrow)?;

    Ok(Json(HeadcountOverviewResponse {
        today: today_summary,
        tomorrow: tomorrow_summary,
    }))
}

/// Handler for GET `/headcount/{date}` endpoint.
pub async fn handle_headcount(
    AxumState(app_state): AxumState<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailySummary>, HttpError> {
    info!(date = %date, "Handling headcount request");
    let date: NaiveDate = parse_date(&date)?;
    Ok(Json(app_state.aggregator().summarize(date)?))
}

/// Handler for GET `/headcount/{date}/meals/{meal_type}` endpoint.
pub async fn handle_meal_detail(
    AxumState(app_state): AxumState<AppState>,
    Path((date, meal_type)): Path<(String, String)>,
) -> Result<Json<MealDetail>, HttpError> {
    info!(date = %date, meal_type = %meal_type, "Handling meal detail request");
    let date: NaiveDate = parse_date(&date)?;
    let meal_type: MealType = meal_type.parse()?;
    Ok(Json(
        app_state.aggregator().detailed_headcount(date, meal_type)?,
    ))
}

/// Handler for GET `/announcement/{date}` endpoint.
///
/// Returns copy-paste ready text for the date's headcount.
pub async fn handle_announcement(
    AxumState(app_state): AxumState<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Announcement>, HttpError> {
    info!(date = %date, "Handling announcement request");
    let date: NaiveDate = parse_date(&date)?;
    let summary: DailySummary = app_state.aggregator().summarize(date)?;
    Ok(Json(render_announcement(&summary)))
}

/// Handler for GET `/participation/{user_id}/{date}` endpoint.
pub async fn handle_get_participation(
    AxumState(app_state): AxumState<AppState>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<DayParticipation>, HttpError> {
    info!(user_id = %user_id, date = %date, "Handling get_participation request");
    let date: NaiveDate = parse_date(&date)?;
    let resolver = ParticipationResolver::new(app_state.store.as_ref(), app_state.weekend_days);
    Ok(Json(resolver.resolve_day(&UserId::new(&user_id), date)?))
}

/// Handler for POST `/participation` endpoint.
pub async fn handle_set_participation(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ParticipationApiRequest>,
) -> Result<Json<ParticipationRecord>, HttpError> {
    info!(
        user_id = %req.user_id,
        date = %req.date,
        meal_type = %req.meal_type,
        is_participating = req.is_participating,
        "Handling set_participation request"
    );

    let change: ParticipationChange = ParticipationChange {
        user_id: UserId::new(&req.user_id),
        date: parse_date(&req.date)?,
        meal_type: req.meal_type.parse()?,
        is_participating: req.is_participating,
    };
    let record: ParticipationRecord = app_state
        .mutations()
        .set_participation(&change, app_state.now())?;

    publish_headcount(&app_state, change.date);
    Ok(Json(record))
}

/// Handler for POST `/participation/override` endpoint.
pub async fn handle_override_participation(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<OverrideParticipationApiRequest>,
) -> Result<Json<ParticipationRecord>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        user_id = %req.user_id,
        date = %req.date,
        meal_type = %req.meal_type,
        "Handling override_participation request"
    );

    let change: ParticipationChange = ParticipationChange {
        user_id: UserId::new(&req.user_id),
        date: parse_date(&req.date)?,
        meal_type: req.meal_type.parse()?,
        is_participating: req.is_participating,
    };
    let actor: Actor = resolve_actor(&app_state, &req.actor_id)?;
    let record: ParticipationRecord = app_state.mutations().override_participation(
        &actor,
        &change,
        req.reason,
        app_state.now(),
    )?;

    publish_headcount(&app_state, change.date);
    Ok(Json(record))
}

/// Handler for GET `/preferences/{user_id}` endpoint.
pub async fn handle_get_preference(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceResponse>, HttpError> {
    info!(user_id = %user_id, "Handling get_preference request");
    let user: User = app_state
        .store
        .find_user(&UserId::new(&user_id))
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
    Ok(Json(PreferenceResponse::from(user)))
}

/// Handler for PUT `/preferences/{user_id}` endpoint.
///
/// The default affects every open date, so live subscribers from today on are
/// refreshed.
pub async fn handle_set_preference(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<PreferenceApiRequest>,
) -> Result<Json<PreferenceResponse>, HttpError> {
    info!(
        user_id = %user_id,
        default_meal_preference = %req.default_meal_preference,
        "Handling set_preference request"
    );

    let preference: MealPreference = req.default_meal_preference.parse()?;
    let user: User = app_state.mutations().set_default_preference(
        &UserId::new(&user_id),
        preference,
        app_state.now(),
    )?;

    publish_headcount_range(&app_state, app_state.today(), NaiveDate::MAX);
    Ok(Json(PreferenceResponse::from(user)))
}

/// Handler for GET `/work_location/{user_id}/{date}` endpoint.
pub async fn handle_get_work_location(
    AxumState(app_state): AxumState<AppState>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<LocationDecision>, HttpError> {
    info!(user_id = %user_id, date = %date, "Handling get_work_location request");
    let date: NaiveDate = parse_date(&date)?;
    let decision: LocationDecision = WorkLocationResolver::new(app_state.store.as_ref())
        .resolve(&UserId::new(&user_id), date)?;
    Ok(Json(decision))
}

/// Handler for POST `/work_location` endpoint.
pub async fn handle_set_work_location(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<WorkLocationApiRequest>,
) -> Result<Json<WorkLocationStatus>, HttpError> {
    info!(
        user_id = %req.user_id,
        date = %req.date,
        location = %req.location,
        "Handling set_work_location request"
    );

    let date: NaiveDate = parse_date(&req.date)?;
    let location: WorkLocation = req.location.parse()?;
    let status: WorkLocationStatus = app_state.mutations().set_own_location(
        &UserId::new(&req.user_id),
        date,
        location,
        app_state.now(),
    )?;

    publish_headcount(&app_state, date);
    Ok(Json(status))
}

/// Handler for POST `/work_location/override` endpoint.
pub async fn handle_override_work_location(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<OverrideWorkLocationApiRequest>,
) -> Result<Json<WorkLocationStatus>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        user_id = %req.user_id,
        date = %req.date,
        location = %req.location,
        "Handling override_work_location request"
    );

    let change: LocationChange = LocationChange {
        user_id: UserId::new(&req.user_id),
        date: parse_date(&req.date)?,
        location: req.location.parse()?,
        reason: req.reason,
    };
    let actor: Actor = resolve_actor(&app_state, &req.actor_id)?;
    let status: WorkLocationStatus =
        app_state
            .mutations()
            .set_location_for(&actor, &change, app_state.now())?;

    publish_headcount(&app_state, change.date);
    Ok(Json(status))
}

/// Handler for GET `/work_location/{user_id}/monthly/{year_month}` endpoint.
pub async fn handle_monthly_wfh_summary(
    AxumState(app_state): AxumState<AppState>,
    Path((user_id, year_month)): Path<(String, String)>,
) -> Result<Json<MonthlyWfhSummary>, HttpError> {
    info!(
        user_id = %user_id,
        year_month = %year_month,
        "Handling monthly_wfh_summary request"
    );
    let month: YearMonth = year_month.parse()?;
    Ok(Json(
        app_state
            .wfh_reporter()
            .monthly_summary(&UserId::new(&user_id), month)?,
    ))
}

/// Handler for GET `/work_location/reports/{year_month}` endpoint.
pub async fn handle_team_monthly_report(
    AxumState(app_state): AxumState<AppState>,
    Path(year_month): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<TeamMonthlyReport>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        year_month = %year_month,
        "Handling team_monthly_report request"
    );
    let month: YearMonth = year_month.parse()?;
    let actor: Actor = resolve_actor(&app_state, &query.actor_id)?;
    Ok(Json(
        app_state.wfh_reporter().team_monthly_report(&actor, month)?,
    ))
}

/// Handler for POST `/global_policies` endpoint.
pub async fn handle_create_global_policy(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<GlobalPolicyApiRequest>,
) -> Result<Json<GlobalWorkLocationPolicy>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        start_date = %req.start_date,
        end_date = %req.end_date,
        location = %req.location,
        "Handling create_global_policy request"
    );

    let request: GlobalPolicyRequest = GlobalPolicyRequest {
        start_date: parse_date(&req.start_date)?,
        end_date: parse_date(&req.end_date)?,
        location: req.location.parse()?,
        reason: req.reason,
    };
    let actor: Actor = resolve_actor(&app_state, &req.actor_id)?;
    let policy: GlobalWorkLocationPolicy =
        app_state
            .mutations()
            .create_global_policy(&actor, request, app_state.now())?;

    publish_headcount_range(&app_state, policy.start_date, policy.end_date);
    Ok(Json(policy))
}

/// Handler for DELETE `/global_policies/{policy_id}` endpoint.
pub async fn handle_remove_global_policy(
    AxumState(app_state): AxumState<AppState>,
    Path(policy_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<GlobalWorkLocationPolicy>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        policy_id,
        "Handling remove_global_policy request"
    );

    let actor: Actor = resolve_actor(&app_state, &query.actor_id)?;
    let policy: GlobalWorkLocationPolicy =
        app_state
            .mutations()
            .remove_global_policy(&actor, policy_id, app_state.now())?;

    publish_headcount_range(&app_state, policy.start_date, policy.end_date);
    Ok(Json(policy))
}

/// Handler for POST `/bulk_opt_outs` endpoint.
pub async fn handle_create_bulk_opt_out(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<BulkOptOutApiRequest>,
) -> Result<Json<BulkOptOut>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        user_id = %req.user_id,
        start_date = %req.start_date,
        end_date = %req.end_date,
        meal_type = %req.meal_type,
        "Handling create_bulk_opt_out request"
    );

    let request: BulkOptOutRequest = BulkOptOutRequest {
        user_id: UserId::new(&req.user_id),
        start_date: parse_date(&req.start_date)?,
        end_date: parse_date(&req.end_date)?,
        meal_type: req.meal_type.parse()?,
        reason: req.reason,
    };
    let actor: Actor = resolve_actor(&app_state, &req.actor_id)?;
    let opt_out: BulkOptOut =
        app_state
            .mutations()
            .create_bulk_opt_out(&actor, request, app_state.now())?;

    publish_headcount_range(&app_state, opt_out.start_date, opt_out.end_date);
    Ok(Json(opt_out))
}

/// Handler for DELETE `/bulk_opt_outs/{bulk_opt_out_id}` endpoint.
pub async fn handle_remove_bulk_opt_out(
    AxumState(app_state): AxumState<AppState>,
    Path(bulk_opt_out_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<BulkOptOut>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        bulk_opt_out_id,
        "Handling remove_bulk_opt_out request"
    );

    let actor: Actor = resolve_actor(&app_state, &query.actor_id)?;
    let opt_out: BulkOptOut =
        app_state
            .mutations()
            .remove_bulk_opt_out(&actor, bulk_opt_out_id, app_state.now())?;

    publish_headcount_range(&app_state, opt_out.start_date, opt_out.end_date);
    Ok(Json(opt_out))
}

/// Handler for POST `/bulk_opt_outs/admin` endpoint.
///
/// Rejected users are reported in the body; when any are present nothing is
/// created.
pub async fn handle_admin_bulk_opt_out(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AdminBulkOptOutApiRequest>,
) -> Result<Json<AdminBulkOptOutResult>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        users = req.user_ids.len(),
        start_date = %req.start_date,
        end_date = %req.end_date,
        "Handling admin_bulk_opt_out request"
    );

    let request: AdminBulkOptOutRequest = AdminBulkOptOutRequest {
        user_ids: req.user_ids.iter().map(|id| UserId::new(id)).collect(),
        start_date: parse_date(&req.start_date)?,
        end_date: parse_date(&req.end_date)?,
        meal_types: req
            .meal_types
            .iter()
            .map(|meal_type| meal_type.parse::<MealType>())
            .collect::<Result<Vec<MealType>, _>>()?,
        reason: req.reason,
    };
    let (start_date, end_date): (NaiveDate, NaiveDate) = (request.start_date, request.end_date);
    let actor: Actor = resolve_actor(&app_state, &req.actor_id)?;
    let result: AdminBulkOptOutResult =
        app_state
            .mutations()
            .admin_bulk_opt_out(&actor, request, app_state.now())?;

    if !result.created.is_empty() {
        publish_headcount_range(&app_state, start_date, end_date);
    }
    Ok(Json(result))
}

/// Handler for GET `/users/{user_id}/bulk_opt_outs` endpoint.
pub async fn handle_list_bulk_opt_outs(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<BulkOptOut>>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        user_id = %user_id,
        "Handling list_bulk_opt_outs request"
    );
    let actor: Actor = resolve_actor(&app_state, &query.actor_id)?;
    Ok(Json(
        app_state
            .mutations()
            .list_bulk_opt_outs(&actor, &UserId::new(&user_id))?,
    ))
}

/// Handler for GET `/teams/participation/{date}` endpoint.
pub async fn handle_all_teams_participation(
    AxumState(app_state): AxumState<AppState>,
    Path(date): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<TeamParticipation>>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        date = %date,
        "Handling all_teams_participation request"
    );
    let date: NaiveDate = parse_date(&date)?;
    let actor: Actor = resolve_actor(&app_state, &query.actor_id)?;
    Ok(Json(
        app_state.aggregator().all_teams_participation(&actor, date)?,
    ))
}

/// Handler for GET `/teams/{lead_id}/participation/{date}` endpoint.
pub async fn handle_team_participation(
    AxumState(app_state): AxumState<AppState>,
    Path((lead_id, date)): Path<(String, String)>,
) -> Result<Json<Vec<TeamParticipation>>, HttpError> {
    info!(lead_id = %lead_id, date = %date, "Handling team_participation request");
    let date: NaiveDate = parse_date(&date)?;
    Ok(Json(
        app_state
            .aggregator()
            .team_participation(&UserId::new(&lead_id), date)?,
    ))
}

/// Handler for GET `/history/{user_id}` endpoint.
pub async fn handle_history(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<HistoryRecord>>, HttpError> {
    info!(user_id = %user_id, "Handling history request");
    let user_id: UserId = UserId::new(&user_id);
    if app_state
        .store
        .find_user(&user_id)
        .map_err(CoreError::from)?
        .is_none()
    {
        return Err(CoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        }
        .into());
    }
    Ok(Json(app_state.store.history_for_user(&user_id)?))
}
