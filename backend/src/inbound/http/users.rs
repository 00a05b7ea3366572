//! User, booking and favourite HTTP handlers.
//!
//! Every route is a POST carrying the caller's e-mail in the body:
//!
//! ```text
//! POST /api/user/register            {"email":"a@x.com"}
//! POST /api/user/bookVisit/{id}      {"email":"a@x.com","date":"2024-01-01"}
//! POST /api/user/allBookings         {"email":"a@x.com"}
//! POST /api/user/removeBooking/{id}  {"email":"a@x.com"}
//! POST /api/user/toFav/{rid}         {"email":"a@x.com"}
//! POST /api/user/allFav              {"email":"a@x.com"}
//! POST /api/user/profile/get         {"email":"a@x.com"}
//! POST /api/user/profile/update      {"email":"a@x.com","phone":"555"}
//! ```

use std::collections::BTreeSet;

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Booking, ProfileUpdate, ResidencyId, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{BookingSchema, ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_visit_date, parse_residency_id, require_email,
};

const RESIDENCY_PATH_ID: FieldName = FieldName::new("id");

/// Body carrying only the caller's e-mail.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct EmailRequest {
    /// Caller's e-mail address.
    #[serde(default)]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
}

/// Body for `bookVisit`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct BookVisitRequest {
    /// Caller's e-mail address.
    #[serde(default)]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    /// ISO-8601 date; defaults to today (UTC).
    #[serde(default)]
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
}

/// Body for `profile/update`. Absent or blank fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfileUpdateRequest {
    /// Address of the profile to edit.
    #[serde(default)]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable status.
    #[schema(example = "Booked successfully")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Registration outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Human-readable status.
    #[schema(example = "User created successfully")]
    pub message: String,
    /// The stored or newly created record.
    #[schema(value_type = UserSchema)]
    pub user: User,
}

/// Favourite toggle outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavouriteToggleResponse {
    /// Human-readable status.
    #[schema(example = "Added to fav")]
    pub message: String,
    /// `true` when the residency was added.
    pub added: bool,
    /// Favourites after the toggle.
    #[schema(value_type = Vec<String>)]
    pub favourites: BTreeSet<ResidencyId>,
}

/// Ensure a user record exists.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = EmailRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 200, description = "User already existed", body = RegisterResponse),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/user/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = require_email(payload.email.as_deref())?;
    let ensured = state.users.register(&email).await?;
    let response = if ensured.created {
        HttpResponse::Created().json(RegisterResponse {
            message: "User created successfully".to_owned(),
            user: ensured.user,
        })
    } else {
        HttpResponse::Ok().json(RegisterResponse {
            message: "User already exists".to_owned(),
            user: ensured.user,
        })
    };
    Ok(response)
}

/// Book a visit to a residency.
#[utoipa::path(
    post,
    path = "/api/user/bookVisit/{id}",
    params(("id" = String, Path, description = "Residency identifier (UUID)")),
    request_body = BookVisitRequest,
    responses(
        (status = 200, description = "Booked", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Already booked", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "bookVisit"
)]
#[post("/user/bookVisit/{id}")]
pub async fn book_visit(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<BookVisitRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = require_email(payload.email.as_deref())?;
    let residency_id = parse_residency_id(&path, RESIDENCY_PATH_ID)?;
    let date = parse_optional_visit_date(payload.date.as_deref())?;
    state.users.book_visit(&email, residency_id, date).await?;
    Ok(web::Json(MessageResponse::new("Booked successfully")))
}

/// List the caller's bookings.
#[utoipa::path(
    post,
    path = "/api/user/allBookings",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Bookings", body = [BookingSchema]),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[post("/user/allBookings")]
pub async fn all_bookings(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<Vec<Booking>>> {
    let email = require_email(payload.email.as_deref())?;
    Ok(web::Json(state.users_query.list_bookings(&email).await?))
}

/// Cancel a booking.
#[utoipa::path(
    post,
    path = "/api/user/removeBooking/{id}",
    params(("id" = String, Path, description = "Residency identifier (UUID)")),
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Cancelled", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not booked", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "cancelBooking"
)]
#[post("/user/removeBooking/{id}")]
pub async fn remove_booking(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = require_email(payload.email.as_deref())?;
    let residency_id = parse_residency_id(&path, RESIDENCY_PATH_ID)?;
    state.users.cancel_booking(&email, &residency_id).await?;
    Ok(web::Json(MessageResponse::new("Cancelled successfully")))
}

/// Add or remove a favourite.
#[utoipa::path(
    post,
    path = "/api/user/toFav/{rid}",
    params(("rid" = String, Path, description = "Residency identifier (UUID)")),
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Toggled", body = FavouriteToggleResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["favourites"],
    operation_id = "toggleFavourite"
)]
#[post("/user/toFav/{rid}")]
pub async fn to_fav(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<FavouriteToggleResponse>> {
    let email = require_email(payload.email.as_deref())?;
    let residency_id = parse_residency_id(&path, FieldName::new("rid"))?;
    let toggle = state.users.toggle_favourite(&email, &residency_id).await?;
    let message = if toggle.added {
        "Added to fav"
    } else {
        "Removed from fav"
    };
    Ok(web::Json(FavouriteToggleResponse {
        message: message.to_owned(),
        added: toggle.added,
        favourites: toggle.favourites,
    }))
}

/// List the caller's favourite residency ids.
#[utoipa::path(
    post,
    path = "/api/user/allFav",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Favourite residency ids", body = [String]),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["favourites"],
    operation_id = "listFavourites"
)]
#[post("/user/allFav")]
pub async fn all_fav(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<BTreeSet<ResidencyId>>> {
    let email = require_email(payload.email.as_deref())?;
    Ok(web::Json(state.users_query.list_favourites(&email).await?))
}

/// Load the caller's profile, creating the account on first access.
#[utoipa::path(
    post,
    path = "/api/user/profile/get",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Profile", body = UserSchema),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[post("/user/profile/get")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<User>> {
    let email = require_email(payload.email.as_deref())?;
    Ok(web::Json(state.users.get_profile(&email).await?))
}

/// Apply a partial profile update.
#[utoipa::path(
    post,
    path = "/api/user/profile/update",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserSchema),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[post("/user/profile/update")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<User>> {
    let ProfileUpdateRequest {
        email,
        name,
        gender,
        phone,
        image,
    } = payload.into_inner();
    let email = require_email(email.as_deref())?;
    let update = ProfileUpdate {
        name,
        gender,
        phone,
        image,
    };
    Ok(web::Json(state.users.update_profile(&email, update).await?))
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserCommand;
    use crate::domain::{EnsuredUser, Error, ErrorCode};
    use chrono::NaiveDate;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    const RESIDENCY: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .service(register)
                .service(book_visit)
                .service(all_bookings)
                .service(remove_booking)
                .service(to_fav)
                .service(all_fav)
                .service(get_profile)
                .service(update_profile),
        )
    }

    fn with_user_command(command: MockUserCommand) -> HttpState {
        let fixtures = HttpState::fixtures();
        HttpState {
            users: Arc::new(command),
            ..fixtures
        }
    }

    async fn post_json(state: HttpState, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(state)).await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let body: Value = actix_test::read_body_json(response).await;
        (status, body)
    }

    #[rstest]
    #[case("/api/user/register")]
    #[case("/api/user/allBookings")]
    #[case("/api/user/allFav")]
    #[case("/api/user/profile/get")]
    #[case("/api/user/profile/update")]
    #[actix_web::test]
    async fn missing_email_is_rejected(#[case] uri: &str) {
        let (status, body) = post_json(HttpState::fixtures(), uri, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("message"), Some(&json!("Email is required")));
        assert_eq!(
            body.pointer("/details/code"),
            Some(&json!("missing_field"))
        );
    }

    #[rstest]
    #[case(true, StatusCode::CREATED, "User created successfully")]
    #[case(false, StatusCode::OK, "User already exists")]
    #[actix_web::test]
    async fn register_status_reflects_creation(
        #[case] created: bool,
        #[case] expected_status: StatusCode,
        #[case] expected_message: &str,
    ) {
        let mut command = MockUserCommand::new();
        command.expect_register().times(1).return_once(move |email| {
            Ok(EnsuredUser {
                user: User::stub(email.clone()),
                created,
            })
        });

        let (status, body) = post_json(
            with_user_command(command),
            "/api/user/register",
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, expected_status);
        assert_eq!(body.get("message"), Some(&json!(expected_message)));
        assert_eq!(body.pointer("/user/name"), Some(&json!("a")));
    }

    #[actix_web::test]
    async fn booking_passes_parsed_date() {
        let mut command = MockUserCommand::new();
        command
            .expect_book_visit()
            .withf(|email, _, date| {
                email.to_string() == "a@x.com" && *date == NaiveDate::from_ymd_opt(2024, 1, 1)
            })
            .times(1)
            .return_once(|_, residency_id, date| {
                Ok(Booking {
                    residency_id,
                    date: date.unwrap_or_default(),
                })
            });

        let (status, body) = post_json(
            with_user_command(command),
            &format!("/api/user/bookVisit/{RESIDENCY}"),
            json!({"email": "a@x.com", "date": "2024-01-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Booked successfully"}));
    }

    #[actix_web::test]
    async fn duplicate_booking_is_conflict() {
        let mut command = MockUserCommand::new();
        command
            .expect_book_visit()
            .times(1)
            .return_once(|_, _, _| Err(Error::conflict("Already booked")));

        let (status, body) = post_json(
            with_user_command(command),
            &format!("/api/user/bookVisit/{RESIDENCY}"),
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.get("message"), Some(&json!("Already booked")));
    }

    #[rstest]
    #[case("/api/user/bookVisit/R1")]
    #[case("/api/user/removeBooking/R1")]
    #[case("/api/user/toFav/R1")]
    #[actix_web::test]
    async fn non_uuid_path_ids_are_bad_requests(#[case] uri: &str) {
        let (status, body) =
            post_json(HttpState::fixtures(), uri, json!({"email": "a@x.com"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/details/code"), Some(&json!("invalid_uuid")));
    }

    #[actix_web::test]
    async fn cancelling_unbooked_residency_is_not_found() {
        let (status, body) = post_json(
            HttpState::fixtures(),
            &format!("/api/user/removeBooking/{RESIDENCY}"),
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: Error = serde_json::from_value(body).expect("error body");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Not booked");
    }

    #[actix_web::test]
    async fn toggle_reports_message_and_set() {
        let (status, body) = post_json(
            HttpState::fixtures(),
            &format!("/api/user/toFav/{RESIDENCY}"),
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("message"), Some(&json!("Added to fav")));
        assert_eq!(body.get("added"), Some(&json!(true)));
        assert_eq!(body.get("favourites"), Some(&json!([RESIDENCY])));
    }

    #[actix_web::test]
    async fn profile_update_forwards_fields() {
        let (status, body) = post_json(
            HttpState::fixtures(),
            "/api/user/profile/update",
            json!({"email": "a@x.com", "phone": "555", "name": ""}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("phone"), Some(&json!("555")));
        assert_eq!(body.get("name"), Some(&json!("a")));
    }
}
