use shared::{
    domain::OrganizationList,
    error::{ApiError, ErrorCode},
    protocol::{HelloResponse, ORGANIZATIONS_PATH},
};
use storage::Storage;
use tracing::error;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub fn organizations_route() -> &'static str {
    ORGANIZATIONS_PATH
}

pub fn hello_route() -> &'static str {
    "/hello"
}

pub fn hello() -> HelloResponse {
    HelloResponse::default()
}

pub async fn list_organization_names(ctx: &ApiContext) -> Result<OrganizationList, ApiError> {
    ctx.storage.list_organization_names().await.map_err(internal)
}

pub async fn check_health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage
        .health_check()
        .await
        .map_err(|e| ApiError::new(ErrorCode::Unavailable, e.to_string()))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "storage request failed");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn lists_names_in_stored_order() {
        let ctx = setup().await;
        for name in ["B", "A"] {
            ctx.storage.create_organization(name).await.expect("insert");
        }
        let names = list_organization_names(&ctx).await.expect("names");
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn empty_listing_is_ok() {
        let ctx = setup().await;
        assert!(list_organization_names(&ctx).await.expect("names").is_empty());
    }

    #[tokio::test]
    async fn closed_pool_reports_internal_and_unavailable() {
        let ctx = setup().await;
        ctx.storage.pool().close().await;

        let err = list_organization_names(&ctx).await.expect_err("closed pool");
        assert_eq!(err.code, ErrorCode::Internal);

        let err = check_health(&ctx).await.expect_err("closed pool");
        assert_eq!(err.code, ErrorCode::Unavailable);
    }

    #[test]
    fn hello_greets_the_world() {
        assert_eq!(hello().message, "Hello World");
    }
}
