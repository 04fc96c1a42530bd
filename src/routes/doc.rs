use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        ActionRequest, SuccessResponse,
        auth::{LoginRequest, LoginResponse},
    },
    models::{Item, Order, OrderStatus},
    routes::{health, invoke},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health_check, invoke::invoke),
    components(
        schemas(
            ActionRequest,
            SuccessResponse,
            LoginRequest,
            LoginResponse,
            Item,
            Order,
            OrderStatus,
            health::HealthData
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Actions", description = "INIT, LOGIN, ADD_ORDER, ORDER_LIST, COMPLETE_ORDER, REOPEN_ORDER, ITEM_LIST, ADD_ITEM, REMOVE_ITEM"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
