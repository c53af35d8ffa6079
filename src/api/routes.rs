use actix_web::{get, web, HttpResponse, Result as WebResult};
use std::sync::Arc;

use crate::llm::ChatProvider;
use crate::session::SharedSession;

#[get("/models")]
pub async fn list_models(llm: web::Data<Arc<dyn ChatProvider>>) -> WebResult<HttpResponse> {
    match llm.list_models().await {
        Ok(models) => Ok(HttpResponse::Ok().json(models)),
        Err(e) => Ok(HttpResponse::BadGateway().body(e.to_string())),
    }
}

#[get("/history")]
pub async fn get_history(session: web::Data<SharedSession>) -> WebResult<HttpResponse> {
    let session = session.lock().unwrap();
    Ok(HttpResponse::Ok().json(session.turns()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(list_models).service(get_history));
}
