//! OpenAPI/Utoipa configuration.

use crate::api::{OAUTH_TAG, client::ACCESS_TOKEN, health::MISC_TAG};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "AccessTokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                ACCESS_TOKEN,
                "Token set by `/login`.",
            ))),
        );
        components.add_security_scheme(
            "AccessTokenQuery",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::with_description(
                ACCESS_TOKEN,
                "Token returned by `/login`, for clients that do not keep cookies.",
            ))),
        );
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Basic OAuth",
        version = "1.0.0",
        description = "Password grant login issuing bearer session tokens bound to the client's address and user-agent."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = OAUTH_TAG, description = "Login, logout and client helper")
    )
)]
pub struct ApiDoc;
