// storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::web::handlers::{order_handlers, payment_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/shipping", web::put().to(order_handlers::save_shipping_handler))
          .route("/{order_id}/status", web::put().to(order_handlers::change_status_handler))
          .route("/{order_id}/payment", web::post().to(order_handlers::initiate_payment_handler))
          .route("/{order_id}/cod-confirmation", web::put().to(order_handlers::confirm_cod_handler)),
      )
      .service(
        web::scope("/payments").route(
          "/notification",
          web::post().to(payment_handlers::payment_notification_handler),
        ),
      ),
  );
}
