use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::build_router;
use crate::testing::{test_state, token_for};
use crate::types::Role;

struct TestApp {
    router: Router,
    token: String,
    user_id: uuid::Uuid,
}

impl TestApp {
    fn new(role: Role) -> Self {
        Self::with_export_limit(role, 10)
    }

    fn with_export_limit(role: Role, limit: u32) -> Self {
        let state = test_state(limit);
        let (user_id, token) = token_for(&state, role);
        Self {
            router: build_router(state),
            token,
            user_id,
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
        self.call_as(Some(&self.token), method, uri, body).await
    }

    async fn call_as(
        &self,
        token: Option<&str>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, value)
    }

    async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, _, value) = self.call(Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{value}");
        value["data"].clone()
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new(Role::Viewer);
    let (status, _, body) = app.call_as(None, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["storage"], "memory");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new(Role::Viewer);

    let (status, _, body) = app.call_as(None, Method::GET, "/api/product", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "message": "Unauthorized"}));

    let (status, _, _) = app.call_as(Some("garbage"), Method::GET, "/api/order", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_crud_and_lookups() {
    let app = TestApp::new(Role::Staff);
    let product = app
        .create(
            "/api/product",
            json!({"sku": "BOLT-10", "name": "Bolt", "price": 0.5, "quantity": 4, "minStockLevel": 10, "category": "Hardware"}),
        )
        .await;
    let id = product["id"].as_str().unwrap().to_string();

    let (status, _, body) = app.call(Method::GET, "/api/product/sku/bolt-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (_, _, body) = app.call(Method::GET, "/api/product/category/hardware", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, _, body) = app.call(Method::GET, "/api/product/low-stock", None).await;
    assert_eq!(body["data"][0]["sku"], "BOLT-10");

    let (_, _, body) = app.call(Method::GET, "/api/product/alerts", None).await;
    assert_eq!(body["data"][0]["alertType"], "critical_stock");

    let (status, _, body) = app
        .call(Method::PUT, &format!("/api/product/{id}"), Some(json!({"quantity": 40})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 40);

    let (status, _, body) = app
        .call(Method::PUT, &format!("/api/product/{id}"), Some(json!({"category": null})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["category"].is_null());
    assert_eq!(body["data"]["quantity"], 40);

    let (_, _, body) = app.call(Method::GET, "/api/product/category/hardware", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, _, body) = app.call(Method::GET, "/api/product/low-stock", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _, body) = app.call(Method::DELETE, &format!("/api/product/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Product deleted successfully"}));

    let (status, _, body) = app.call(Method::GET, &format!("/api/product/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_product_validation_and_conflicts() {
    let app = TestApp::new(Role::Staff);

    let (status, _, body) = app
        .call(Method::POST, "/api/product", Some(json!({"sku": " ", "name": "Blank", "price": 1.0})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "SKU is required");

    app.create("/api/product", json!({"sku": "DUP-1", "name": "First", "price": 1.0}))
        .await;
    let (status, _, body) = app
        .call(Method::POST, "/api/product", Some(json!({"sku": "dup-1", "name": "Second", "price": 1.0})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_order_lifecycle() {
    let app = TestApp::new(Role::Staff);
    let order = app
        .create(
            "/api/order",
            json!({"subtotal": 100.0, "taxAmount": 7.0, "shippingCost": 5.0, "discountAmount": 12.0, "totalAmount": 1.0}),
        )
        .await;
    let id = order["id"].as_str().unwrap().to_string();

    assert_eq!(order["totalAmount"], 100.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["userId"], app.user_id.to_string());
    assert!(order["orderNumber"].as_str().unwrap().starts_with("ORD-"));

    let status_uri = format!("/api/order/{id}/status");
    let (status, _, body) = app
        .call(Method::PUT, &status_uri, Some(json!({"status": "shipped"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["shippedDate"].is_string());

    let (status, _, body) = app
        .call(Method::PUT, &status_uri, Some(json!({"status": "cancelled"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot change order status from shipped to cancelled");

    let (_, _, body) = app.call(Method::GET, "/api/order/status/shipped", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, _, body) = app
        .call(Method::GET, &format!("/api/order/user/{}", app.user_id), None)
        .await;
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (status, _, _) = app.call(Method::GET, "/api/order/status/lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_items_total_and_cascade() {
    let app = TestApp::new(Role::Staff);
    let order = app.create("/api/order", json!({"subtotal": 0.0})).await;
    let product = app
        .create("/api/product", json!({"sku": "NUT-1", "name": "Nut", "price": 0.1}))
        .await;
    let order_id = order["id"].as_str().unwrap();
    let product_id = product["id"].as_str().unwrap();

    for (quantity, unit_price) in [(2, 12.5), (3, 4.0)] {
        app.create(
            "/api/order-item",
            json!({"orderId": order_id, "productId": product_id, "quantity": quantity, "unitPrice": unit_price}),
        )
        .await;
    }

    let (status, _, body) = app
        .call(Method::GET, &format!("/api/order-item/order/{order_id}/total"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 37.0);
    assert_eq!(body["data"]["itemCount"], 2);

    let (status, _, _) = app
        .call(
            Method::POST,
            "/api/order-item",
            Some(json!({"orderId": uuid::Uuid::new_v4(), "productId": product_id, "quantity": 1, "unitPrice": 1.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app.call(Method::DELETE, &format!("/api/order/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, body) = app
        .call(Method::GET, &format!("/api/order-item/product/{product_id}"), None)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_supplier_list_carries_counts() {
    let app = TestApp::new(Role::Manager);
    let supplier = app
        .create("/api/supplier", json!({"name": "Acme", "paymentTerms": "Net 45", "rating": 4.5}))
        .await;
    assert_eq!(supplier["paymentTerms"], 45);
    assert_eq!(supplier["status"], "Active");

    let supplier_id = supplier["id"].as_str().unwrap();
    app.create("/api/order", json!({"supplierId": supplier_id, "subtotal": 60.0}))
        .await;

    let (_, _, body) = app.call(Method::GET, "/api/supplier", None).await;
    assert_eq!(body["data"][0]["name"], "Acme");
    assert_eq!(body["data"][0]["ordersCount"], 1);
    assert_eq!(body["data"][0]["totalValue"], 60.0);

    let (_, _, body) = app.call(Method::GET, "/api/supplier/status/pending-approval", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_warehouses_for_current_user() {
    let app = TestApp::new(Role::Manager);
    app.create("/api/warehouse", json!({"name": "Mine", "location": "North", "capacity": 100}))
        .await;
    app.create(
        "/api/warehouse",
        json!({"name": "Theirs", "location": "South", "capacity": 100, "managerId": uuid::Uuid::new_v4()}),
    )
    .await;

    let (_, _, body) = app.call(Method::GET, "/api/warehouse/user", None).await;
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["name"], "Mine");
}

#[tokio::test]
async fn test_reports_endpoint() {
    let app = TestApp::new(Role::Viewer);
    app.create("/api/order", json!({"subtotal": 100.0})).await;
    app.create("/api/order", json!({"subtotal": 50.0, "status": "completed"}))
        .await;

    let (status, _, body) = app.call(Method::GET, "/api/reports?timeRange=today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["totalOrders"], 2);
    assert_eq!(body["data"]["stats"]["totalRevenue"], 150.0);
    assert_eq!(body["data"]["stats"]["averageOrderValue"], 75.0);
    assert_eq!(body["data"]["stats"]["completedOrders"], 1);

    let (status, _, body) = app.call(Method::GET, "/api/reports?timeRange=custom", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Custom time range requires both startDate and endDate");

    let (status, _, body) = app
        .call(
            Method::GET,
            "/api/reports?timeRange=custom&startDate=2024-01-01&endDate=%2B262142-12-31",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Report dates must fall between the years 1 and 9999");
}

#[tokio::test]
async fn test_export_requires_admin_or_manager() {
    let staff = TestApp::new(Role::Staff);
    let (status, _, body) = staff.call(Method::GET, "/api/reports/export", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let manager = TestApp::new(Role::Manager);
    let (status, headers, body) = manager
        .call(Method::GET, "/api/reports/export?scope=orders&timeRange=year", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"orders-report-"), "{disposition}");
    assert!(body.is_array());
}

#[tokio::test]
async fn test_export_is_rate_limited_per_user() {
    let app = TestApp::with_export_limit(Role::Admin, 1);
    let (status, _, _) = app.call(Method::GET, "/api/reports/export", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = app.call(Method::GET, "/api/reports/export", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rejected_export_filters_do_not_use_quota() {
    let app = TestApp::with_export_limit(Role::Manager, 1);
    for _ in 0..3 {
        let (status, _, body) = app
            .call(Method::GET, "/api/reports/export?timeRange=custom&startDate=2024-02-01", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    let (status, _, _) = app.call(Method::GET, "/api/reports/export?scope=products", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_debug_auth_checks_cookie() {
    let app = TestApp::new(Role::Viewer);

    let request = Request::builder()
        .uri("/api/debug/auth")
        .header(header::COOKIE, format!("token={}", app.token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["role"], "viewer");

    let (_, _, body) = app.call_as(None, Method::GET, "/api/debug/auth", None).await;
    assert_eq!(body["data"]["hasCookie"], false);
}
