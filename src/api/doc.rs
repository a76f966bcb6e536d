use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const WEBHOOK_TAG: &str = "Webhook";
pub const HEALTH_TAG: &str = "Health";
pub const MENU_TAG: &str = "Menu";
pub const EVENTS_TAG: &str = "Events";
pub const ADMIN_TAG: &str = "Admin";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "bp-relay",
        description = "WhatsApp blood-pressure relay: webhook ingestion, caregiver fan-out and event reporting",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::EventOutcome,
            crate::models::BpRange,
        )
    ),
    tags(
        (name = WEBHOOK_TAG, description = "WhatsApp Cloud API webhook"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = MENU_TAG, description = "Manual menu delivery"),
        (name = EVENTS_TAG, description = "Recorded readings and statistics"),
        (name = ADMIN_TAG, description = "Event retention"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Static admin token from security.admin_token"))
                        .build(),
                ),
            )
        }
    }
}
