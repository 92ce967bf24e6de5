//! Diesel table definitions mirroring `migrations/`.

diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        telephone_number -> Text,
        email -> Text,
        role -> Text,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    dentists (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        experience_years -> Int4,
        expertise -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    bookings (id) {
        id -> Uuid,
        booking_date -> Timestamptz,
        user_id -> Uuid,
        dentist_id -> Uuid,
        cap_exempt -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(bookings -> dentists (dentist_id));
diesel::joinable!(bookings -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(bookings, dentists, users);
