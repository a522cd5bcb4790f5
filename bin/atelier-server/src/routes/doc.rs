use utoipa::OpenApi;

use crate::routes::{assets, gallery, health, models, tasks};

#[derive(OpenApi)]
#[openapi(info(
    title = "atelier-server",
    description = "Asynchronous generation task lifecycle API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(tasks::TasksApi::openapi());
    root.merge(assets::AssetsApi::openapi());
    root.merge(gallery::GalleryApi::openapi());
    root.merge(models::ModelsApi::openapi());
    root
}
