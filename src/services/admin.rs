//! Admin HTTP API: registry CRUD plus a live snapshot stream.
//!
//! The presentation layer drives the registry exclusively through these
//! endpoints and keeps its view current by consuming `/link/watch`, a
//! server-sent-events rendering of the store's change feed.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use bytes::Bytes;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::RedirectoryError;
use crate::services::LinkService;
use crate::storages::{LinkRecord, LinkStore, feed::order_snapshot};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostNewLink {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PutLinkTarget {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GetLinksQuery {
    pub q: Option<String>,
}

/// Wire form of a record, with the resolution path the presentation layer
/// turns into `<base>/redirect/<id>` links and QR payloads.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinkResponse {
    pub id: String,
    pub url: String,
    pub access_count: u64,
    pub created_at: String,
    pub resolution_path: String,
}

impl From<&LinkRecord> for LinkResponse {
    fn from(record: &LinkRecord) -> Self {
        LinkResponse {
            id: record.id.clone(),
            url: record.url.clone(),
            access_count: record.access_count,
            created_at: record.created_at.to_rfc3339(),
            resolution_path: LinkService::resolution_path(&record.id),
        }
    }
}

fn error_response(err: &RedirectoryError) -> HttpResponse {
    let body = ApiResponse {
        code: 1,
        data: err.message().to_string(),
    };

    match err {
        RedirectoryError::Validation(_) => HttpResponse::BadRequest().json(body),
        RedirectoryError::NotFound(_) => HttpResponse::NotFound().json(body),
        _ => {
            error!("{}", err.format_colored());
            HttpResponse::InternalServerError().json(body)
        }
    }
}

pub struct AdminService;

impl AdminService {
    pub async fn get_all_links(
        query: web::Query<GetLinksQuery>,
        storage: web::Data<Arc<dyn LinkStore>>,
    ) -> impl Responder {
        let snapshot = order_snapshot(storage.load_all().await.into_values().collect());

        let term = query.q.as_deref().unwrap_or("");
        let links: Vec<LinkResponse> = LinkService::search(&snapshot, term)
            .iter()
            .map(LinkResponse::from)
            .collect();

        info!("Admin API: returning {} links", links.len());
        HttpResponse::Ok().json(ApiResponse {
            code: 0,
            data: links,
        })
    }

    pub async fn post_link(
        payload: web::Json<PostNewLink>,
        service: web::Data<LinkService>,
    ) -> impl Responder {
        match service.create_link(&payload.url).await {
            Ok(record) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: LinkResponse::from(&record),
            }),
            Err(e) => error_response(&e),
        }
    }

    pub async fn put_link(
        path: web::Path<String>,
        payload: web::Json<PutLinkTarget>,
        service: web::Data<LinkService>,
    ) -> impl Responder {
        let id = path.into_inner();
        match service.edit_link(&id, &payload.url).await {
            Ok(()) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: format!("link '{}' updated", id),
            }),
            Err(e) => error_response(&e),
        }
    }

    pub async fn delete_link(
        path: web::Path<String>,
        service: web::Data<LinkService>,
    ) -> impl Responder {
        let id = path.into_inner();
        match service.delete_link(&id).await {
            Ok(()) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: format!("link '{}' deleted", id),
            }),
            Err(e) => error_response(&e),
        }
    }

    /// Server-sent events: one `data:` frame per change-feed emission, each
    /// carrying the complete current record set.
    pub async fn watch_links(storage: web::Data<Arc<dyn LinkStore>>) -> impl Responder {
        let subscription = storage.subscribe().await;

        let stream = subscription.map(|snapshot| {
            let links: Vec<LinkResponse> = snapshot.iter().map(LinkResponse::from).collect();
            let json = serde_json::to_string(&links).unwrap_or_else(|_| "[]".to_string());
            Ok::<Bytes, actix_web::Error>(Bytes::from(format!("data: {}\n\n", json)))
        });

        HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("Cache-Control", "no-cache"))
            .streaming(stream)
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/link", web::get().to(AdminService::get_all_links))
        .route("/link", web::post().to(AdminService::post_link))
        .route("/link/watch", web::get().to(AdminService::watch_links))
        .route("/link/{id}", web::put().to(AdminService::put_link))
        .route("/link/{id}", web::delete().to(AdminService::delete_link));
}
