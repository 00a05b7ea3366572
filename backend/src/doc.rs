//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: residency, user, booking, favourite and health endpoints
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] plus the request/response bodies
//! - **Security**: optional bearer token issued by the identity provider
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    BookingSchema, ErrorCodeSchema, ErrorSchema, ResidencyDraftSchema, ResidencySchema, UserSchema,
};
use crate::inbound::http::users::{
    BookVisitRequest, EmailRequest, FavouriteToggleResponse, MessageResponse,
    ProfileUpdateRequest, RegisterResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token from the identity provider. Accepted but not verified.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rental marketplace API",
        description = "Listings, bookings, favourites and profiles for the rental marketplace."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security((), ("BearerToken" = [])),
    paths(
        crate::inbound::http::residencies::list_residencies,
        crate::inbound::http::residencies::get_residency,
        crate::inbound::http::residencies::create_residency,
        crate::inbound::http::users::register,
        crate::inbound::http::users::book_visit,
        crate::inbound::http::users::all_bookings,
        crate::inbound::http::users::remove_booking,
        crate::inbound::http::users::to_fav,
        crate::inbound::http::users::all_fav,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ResidencySchema,
        ResidencyDraftSchema,
        BookingSchema,
        UserSchema,
        ErrorSchema,
        ErrorCodeSchema,
        EmailRequest,
        BookVisitRequest,
        ProfileUpdateRequest,
        MessageResponse,
        RegisterResponse,
        FavouriteToggleResponse
    )),
    tags(
        (name = "residencies", description = "Property listings"),
        (name = "users", description = "Accounts and profiles"),
        (name = "bookings", description = "Scheduled visits"),
        (name = "favourites", description = "Saved residencies"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const RESIDENCY_SCHEMA_NAME: &str = "crate.domain.Residency";
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn residency_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(RESIDENCY_SCHEMA_NAME).expect("Residency schema");

        assert_object_schema_has_field(schema, "userEmail");
        assert_object_schema_has_field(schema, "facilities");
    }

    #[rstest]
    #[case("/api/residency")]
    #[case("/api/residency/{id}")]
    #[case("/api/residency/create")]
    #[case("/api/user/register")]
    #[case("/api/user/bookVisit/{id}")]
    #[case("/api/user/toFav/{rid}")]
    #[case("/api/user/profile/update")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
