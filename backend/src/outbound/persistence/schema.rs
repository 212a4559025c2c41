//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Administrator and student accounts.
    ///
    /// Student profile columns are null for administrators.
    accounts (id) {
        id -> Uuid,
        /// Lowercase, unique across all roles.
        email -> Varchar,
        /// `admin` or `student`.
        role -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// `STU####`, unique when present.
        student_id -> Nullable<Varchar>,
        name -> Nullable<Varchar>,
        mobile -> Nullable<Varchar>,
        blood_group -> Nullable<Varchar>,
        standard -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        address -> Nullable<Text>,
        is_active -> Bool,
        last_login -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Admission applications.
    ///
    /// The searchable applicant columns are copied out of `details`, which
    /// holds the full sanitised form including document descriptors.
    admissions (id) {
        id -> Uuid,
        /// Lowercase applicant email; unique index `admissions_email_key`.
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        phone -> Varchar,
        /// `pending`, `accepted` or `rejected`.
        status -> Varchar,
        details -> Jsonb,
        submitted_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
        student_id -> Nullable<Varchar>,
        rejection_reason -> Nullable<Text>,
    }
}
