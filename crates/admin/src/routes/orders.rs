//! Order routes: admin fulfilment and the merchant's view of its sales.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use luxora_core::pagination::{Page, PageParams, Paginated};
use luxora_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::OrderFilter;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireMerchant};
use crate::models::{MerchantOrder, OrderDetail, OrderSummary};
use crate::state::AppState;

/// `GET /api/admin/orders` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> (OrderFilter, Page) {
        let page = Page::from_params(PageParams {
            page: self.page,
            per_page: self.per_page,
        });
        let filter = OrderFilter {
            status: self.status,
            query: self.q,
        };
        (filter, page)
    }
}

/// Status change body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

async fn detail(state: &AppState, id: OrderId) -> Result<OrderDetail> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Orders with filters, newest first.
///
/// GET /api/admin/orders
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paginated<OrderSummary>>> {
    let (filter, page) = query.into_parts();
    Ok(Json(OrderRepository::new(state.pool()).list(&filter, page).await?))
}

/// Order detail with items and timeline.
///
/// GET /api/admin/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(detail(&state, id).await?))
}

/// Move an order along its lifecycle. Cancelling restocks its items.
///
/// PUT /api/admin/orders/{id}/status
#[tracing::instrument(skip(state, admin, form), fields(admin_id = %admin.id, status = %form.status))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(form): Json<StatusRequest>,
) -> Result<Json<OrderDetail>> {
    let status = OrderRepository::new(state.pool())
        .update_status(id, form.status)
        .await?;
    state.stats().invalidate_all();

    let order_id = id.to_string();
    add_breadcrumb(
        "order",
        "status changed",
        Some(&[("order_id", order_id.as_str()), ("status", status.as_str())]),
    );
    tracing::info!(order_id = %id, %status, "order status changed");
    Ok(Json(detail(&state, id).await?))
}

/// Orders containing the store's items, with only those items.
///
/// GET /api/merchant/orders
pub async fn merchant_index(
    State(state): State<AppState>,
    RequireMerchant(_staff, merchant): RequireMerchant,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<MerchantOrder>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_merchant(merchant, Page::from_params(params))
        .await?;
    Ok(Json(orders))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_parses_known_statuses() {
        let form: StatusRequest = serde_json::from_str(r#"{"status":"SHIPPED"}"#).unwrap();
        assert_eq!(form.status, OrderStatus::Shipped);
        assert!(serde_json::from_str::<StatusRequest>(r#"{"status":"LOST"}"#).is_err());
    }

    #[test]
    fn test_list_query_parts() {
        let query = ListQuery {
            status: Some(OrderStatus::Pending),
            q: Some("LX-00".to_string()),
            page: Some(3),
            per_page: Some(10),
        };
        let (filter, page) = query.into_parts();
        assert_eq!(filter.status, Some(OrderStatus::Pending));
        assert_eq!(page.offset(), 20);
    }
}
