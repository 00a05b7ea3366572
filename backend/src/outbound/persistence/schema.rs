//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Registered users keyed by e-mail.
    users (email) {
        email -> Varchar,
        name -> Varchar,
        gender -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rental listings. A non-empty `(address, owner_email)` pair is unique.
    residencies (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Int4,
        address -> Varchar,
        city -> Varchar,
        country -> Varchar,
        image -> Text,
        facilities -> Array<Text>,
        owner_email -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per booking; the primary key enforces one booking per
    /// user and residency.
    booked_visits (user_email, residency_id) {
        user_email -> Varchar,
        residency_id -> Uuid,
        visit_date -> Date,
        booked_at -> Timestamptz,
    }
}

diesel::table! {
    /// Favourite membership; the primary key gives set semantics.
    favourite_residencies (user_email, residency_id) {
        user_email -> Varchar,
        residency_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(booked_visits -> users (user_email));
diesel::joinable!(favourite_residencies -> users (user_email));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    residencies,
    booked_visits,
    favourite_residencies,
);
