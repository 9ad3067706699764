//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the provisioned database schema exactly.
//! Diesel uses them for compile-time query validation and type-safe SQL
//! generation. `diesel print-schema` can regenerate them from a live
//! database.

diesel::table! {
    /// Registered user accounts, addressed by unique email.
    users (id) {
        id -> Int8,
        email -> Varchar,
        name -> Varchar,
        /// Argon2 PHC string; never leaves the persistence boundary.
        password_hash -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Book tags, owned by exactly one user.
    tags (id) {
        id -> Int8,
        name -> Varchar,
        user_id -> Int8,
    }
}

diesel::table! {
    /// Book authors, owned by exactly one user.
    authors (id) {
        id -> Int8,
        name -> Varchar,
        user_id -> Int8,
    }
}

diesel::table! {
    /// Books, owned by exactly one user.
    books (id) {
        id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        pages -> Int4,
        year -> Int4,
        /// Price in minor units (cents); two implied decimal places.
        price_cents -> Int8,
        link -> Nullable<Varchar>,
        cover_image -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Book–tag links; the composite key rules out duplicates.
    book_tags (book_id, tag_id) {
        book_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    /// Book–author links; the composite key rules out duplicates.
    book_authors (book_id, author_id) {
        book_id -> Int8,
        author_id -> Int8,
    }
}

diesel::joinable!(tags -> users (user_id));
diesel::joinable!(authors -> users (user_id));
diesel::joinable!(books -> users (user_id));
diesel::joinable!(book_tags -> books (book_id));
diesel::joinable!(book_tags -> tags (tag_id));
diesel::joinable!(book_authors -> books (book_id));
diesel::joinable!(book_authors -> authors (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, tags, authors, books, book_tags, book_authors);
