//! Axum router configuration for order endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{get_order, place_order, update_order_status};

/// Order routes, mounted at `/api/orders`.
///
/// # Routes
/// - `POST /` - Place an order (guest or signed-in)
/// - `GET /:id` - Get an order (owner or admin)
/// - `PATCH /:id/status` - Operator status update (admin role)
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(update_order_status))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::http::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::adapters::http::test_support::{body_json, TestApp};
    use crate::domain::foundation::UserId;
    use crate::domain::order::test_address;
    use crate::ports::OrderRepository;

    fn order_body(product_id: impl serde::Serialize, quantity: u32) -> Value {
        json!({
            "items": [{ "product_id": product_id, "quantity": quantity }],
            "shipping_address": test_address(),
        })
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn place_order_returns_201_with_checkout_url() {
        let app = TestApp::new();
        let product = app.add_product("House Blend", 1699, 5).await;

        let response = app
            .router()
            .oneshot(post_json("/api/orders", &order_body(product.id, 2)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Order created successfully");
        assert_eq!(body["data"]["order"]["total_amount"], 3398);
        assert!(body["data"]["checkout_url"]
            .as_str()
            .unwrap()
            .starts_with("https://checkout.stripe.com/"));
    }

    #[tokio::test]
    async fn insufficient_stock_is_400() {
        let app = TestApp::new();
        let product = app.add_product("House Blend", 1699, 1).await;

        let response = app
            .router()
            .oneshot(post_json("/api/orders", &order_body(product.id, 3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Insufficient stock for House Blend");
    }

    #[tokio::test]
    async fn gateway_outage_is_502() {
        let app = TestApp::new();
        let product = app.add_product("House Blend", 1699, 5).await;
        app.gateway.set_method_error(
            "create_checkout_session",
            crate::ports::PaymentError::network("connection refused"),
        );

        let response = app
            .router()
            .oneshot(post_json("/api/orders", &order_body(product.id, 1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    fn get_request(order_id: impl std::fmt::Display, user: Option<UserId>, role: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(format!("/api/orders/{}", order_id));
        if let Some(user) = user {
            builder = builder
                .header(USER_ID_HEADER, user.to_string())
                .header(USER_ROLE_HEADER, role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn get_unknown_order_is_404() {
        let app = TestApp::new();
        let response = app
            .router()
            .oneshot(get_request(uuid::Uuid::new_v4(), Some(UserId::new()), "admin"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_order_without_identity_is_401() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(get_request(order.id, None, "customer"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_someone_elses_order_is_403() {
        let app = TestApp::new();
        let order = app.seed_order_for(Some(UserId::new())).await;

        let response = app
            .router()
            .oneshot(get_request(order.id, Some(UserId::new()), "customer"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn guest_order_is_hidden_from_customers() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(get_request(order.id, Some(UserId::new()), "customer"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_gets_order_envelope() {
        let app = TestApp::new();
        let owner = UserId::new();
        let order = app.seed_order_for(Some(owner)).await;

        let response = app
            .router()
            .oneshot(get_request(order.id, Some(owner), "customer"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["order"]["order_number"], order.order_number.to_string());
    }

    #[tokio::test]
    async fn admin_gets_any_order() {
        let app = TestApp::new();
        let order = app.seed_order_for(Some(UserId::new())).await;

        let response = app
            .router()
            .oneshot(get_request(order.id, Some(UserId::new()), "admin"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    fn status_patch(order_id: impl std::fmt::Display, role: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PATCH")
            .uri(format!("/api/orders/{}/status", order_id))
            .header("content-type", "application/json")
            .header(USER_ID_HEADER, UserId::new().to_string());
        if let Some(role) = role {
            builder = builder.header(USER_ROLE_HEADER, role);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn status_update_requires_admin() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(status_patch(order.id, Some("customer"), json!({ "status": "paid" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_transition_is_409() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(status_patch(order.id, Some("admin"), json!({ "status": "shipped" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn admin_cannot_mark_pending_order_paid() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(status_patch(order.id, Some("admin"), json!({ "status": "paid" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let stored = app.orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status.as_str(), "pending");
    }

    #[tokio::test]
    async fn admin_can_cancel_pending_order() {
        let app = TestApp::new();
        let order = app.seed_pending_order().await;

        let response = app
            .router()
            .oneshot(status_patch(order.id, Some("admin"), json!({ "status": "cancelled" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = app.orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status.as_str(), "cancelled");
    }
}
