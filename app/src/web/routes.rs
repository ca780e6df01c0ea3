// vitrine_storefront/src/web/routes.rs

use crate::web::handlers::{cart_handlers, draft_handlers, payment_handlers, watch_handlers, webhook_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      // The {source} path parameter identifies the notifying provider
      .service(web::scope("/webhooks").route("/{source}", web::post().to(webhook_handlers::payment_webhook_handler)))
      .service(
        web::scope("/payments")
          .route("/pix", web::post().to(payment_handlers::start_pix_handler))
          .route("/card", web::post().to(payment_handlers::submit_card_handler)),
      )
      .service(
        web::scope("/orders").service(
          web::resource("/{order_id}/watch")
            .route(web::post().to(watch_handlers::start_watch_handler))
            .route(web::get().to(watch_handlers::watch_status_handler))
            .route(web::delete().to(watch_handlers::stop_watch_handler)),
        ),
      )
      .service(
        web::resource("/cart")
          .route(web::get().to(cart_handlers::load_cart_handler))
          .route(web::put().to(cart_handlers::save_cart_handler))
          .route(web::delete().to(cart_handlers::clear_cart_handler)),
      )
      .service(
        web::scope("/drafts")
          .route("", web::get().to(draft_handlers::list_drafts_handler))
          .service(
            web::resource("/{product_id}")
              .route(web::get().to(draft_handlers::load_draft_handler))
              .route(web::put().to(draft_handlers::save_draft_handler))
              .route(web::delete().to(draft_handlers::delete_draft_handler)),
          ),
      ),
  );
}
