use axum::{
    extract::{Extension, State},
    response::Html,
};

use crate::database::models::{Cheque, Contract, Entity, Property, Tenant};
use crate::database::Repository;
use crate::error::AppError;
use crate::filter::{FilterData, FilterWhere};
use crate::handlers::page;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::pages::{self, DashboardStats};

const RECENT_PROPERTIES: i64 = 5;

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let properties = Repository::<Property>::new(state.db.clone());
    let by_status = |status: &str| -> Result<FilterData, AppError> {
        Ok(FilterData::new(FilterWhere::new().eq("status", status)?))
    };

    let stats = DashboardStats {
        properties: properties.count(FilterData::default()).await?,
        vacant: properties.count(by_status("vacant")?).await?,
        occupied: properties.count(by_status("occupied")?).await?,
        tenants: Repository::<Tenant>::new(state.db.clone()).count(FilterData::default()).await?,
        contracts: Repository::<Contract>::new(state.db.clone()).count(FilterData::default()).await?,
        cheques: Repository::<Cheque>::new(state.db.clone()).count(FilterData::default()).await?,
    };

    let recent = properties
        .list(
            FilterData::default()
                .order(Property::DEFAULT_ORDER)
                .limit(RECENT_PROPERTIES),
        )
        .await?;

    page(&user, "Dashboard", &pages::dashboard(&stats, &recent)).await
}
