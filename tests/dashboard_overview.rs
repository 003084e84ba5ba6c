//! End-to-end dashboard overview test: four record sets fetched from the
//! mock backend and reduced into the rendered aggregates.

use std::sync::Arc;

use menumate_core::auth::{MemoryTokens, TokenStore};
use menumate_core::dashboard::Dashboard;
use menumate_core::ApiClient;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_get(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("Authorization", "acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_overview_reduces_all_four_record_sets() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("acc", "ref"));
    let client = ApiClient::new(server.uri(), tokens as Arc<dyn TokenStore>)
        .expect("client should build");
    client.set_access_token(Some("acc".to_string()));

    mount_get(
        &server,
        "/sales/records",
        json!([
            {
                "id": 1, "staffId": 4, "itemName": "Espresso",
                "quantity": 2, "amount": 7.0, "paymentMethod": "cash",
                "createdAt": "2026-08-01T09:30:00Z"
            },
            {
                "id": 2, "staffId": 5, "itemName": "Steak",
                "amount": 32.0, "paymentMethod": "card",
                "createdAt": "2026-08-02T19:00:00Z"
            }
        ]),
    )
    .await;
    mount_get(
        &server,
        "/staff/members",
        json!([
            { "id": 4, "name": "Ada", "role": "barista" },
            { "id": 5, "name": "Grace" }
        ]),
    )
    .await;
    mount_get(
        &server,
        "/payments/history",
        json!([
            { "id": 1, "amount": 29.0, "planName": "Pro", "paidAt": "2026-07-01T00:00:00Z" },
            { "id": 2, "amount": 29.0, "planName": "Pro", "paidAt": "2026-08-01T00:00:00Z" }
        ]),
    )
    .await;
    mount_get(
        &server,
        "/menu/items",
        json!([
            { "id": 1, "name": "Espresso", "price": 3.5 },
            { "id": 2, "name": "Steak", "price": 32.0 }
        ]),
    )
    .await;

    let overview = Dashboard::new(client)
        .fetch_overview()
        .await
        .expect("overview should build");

    assert_eq!(overview.order_count, 2);
    assert_eq!(overview.total_revenue, 39.0);
    assert_eq!(overview.menu_size, 2);

    assert_eq!(overview.staff_rankings[0].name, "Grace");
    assert_eq!(overview.staff_rankings[0].revenue, 32.0);
    assert_eq!(overview.staff_rankings[1].name, "Ada");
    assert_eq!(overview.staff_rankings[1].order_count, 1);

    assert_eq!(overview.top_items[0].item_name, "Steak");
    assert_eq!(overview.daily_revenue.len(), 2);
    assert_eq!(overview.payment_methods[0].method, "card");

    let latest = overview.latest_payment.expect("payments present");
    assert_eq!(latest.id, 2);
}
