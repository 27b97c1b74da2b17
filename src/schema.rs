// Diesel table definitions. Kept in sync with `schema.sql`.

diesel::table! {
    postings (id) {
        id -> Integer,
        title -> Text,
        company -> Text,
        location -> Text,
        job_type -> Text,
        date_posted -> Date,
        url -> Nullable<Text>,
        source -> Text,
        description -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    categorized_postings (id) {
        id -> Integer,
        title -> Text,
        company -> Text,
        location -> Text,
        job_type -> Text,
        date_posted -> Date,
        url -> Text,
        source -> Text,
        description -> Text,
        category -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    user_profiles (id) {
        id -> Integer,
        qualifications -> Text,
        skills -> Text,
        about -> Text,
        experience_years -> Integer,
    }
}

diesel::table! {
    matches (id) {
        id -> Integer,
        user_id -> Integer,
        posting_id -> Integer,
        rank -> Integer,
        score -> Nullable<Float>,
        created_at -> Timestamp,
    }
}

diesel::joinable!(matches -> categorized_postings (posting_id));
diesel::joinable!(matches -> user_profiles (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    postings,
    categorized_postings,
    user_profiles,
    matches,
);
