//! Public resolution path: link id → 307 redirect.
//!
//! Every resolution re-reads current state and charges the access counter by
//! exactly one. An unknown id is a distinct not-found outcome; there is no
//! fallback target.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, error};

use crate::errors::{RedirectoryError, Result};
use crate::storages::LinkStore;

pub struct RedirectService {}

impl RedirectService {
    /// Resolve an id to its target url, incrementing the record's access
    /// counter. A record deleted between the lookup and the increment fails
    /// the resolution; nothing is counted.
    pub async fn resolve(storage: &dyn LinkStore, id: &str) -> Result<String> {
        let record = storage.get(id).await.ok_or_else(|| {
            RedirectoryError::not_found(format!("link '{}' does not exist", id))
        })?;

        storage.increment_access(&record.id).await?;
        Ok(record.url)
    }

    pub async fn handle_redirect(
        path: web::Path<String>,
        storage: web::Data<Arc<dyn LinkStore>>,
    ) -> impl Responder {
        let id = path.into_inner();

        match Self::resolve(storage.get_ref().as_ref(), &id).await {
            Ok(target) => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", target))
                .finish(),
            Err(RedirectoryError::NotFound(_)) => {
                debug!("Redirect link not found: {}", id);
                HttpResponse::build(StatusCode::NOT_FOUND)
                    .insert_header(("Content-Type", "text/html; charset=utf-8"))
                    .insert_header(("Cache-Control", "public, max-age=60")) // 缓存404
                    .body("Not Found")
            }
            Err(e) => {
                error!("{}", e.format_colored());
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .insert_header(("Content-Type", "text/html; charset=utf-8"))
                    .body("Internal Server Error")
            }
        }
    }
}

pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/redirect/{id}",
        web::get().to(RedirectService::handle_redirect),
    );
}
