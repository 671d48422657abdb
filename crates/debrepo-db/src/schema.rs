diesel::table! {
    signing_services (id) {
        id -> Integer,
        name -> Text,
        public_key -> Text,
        pubkey_fingerprint -> Text,
        script -> Text,
    }
}

diesel::table! {
    repositories (id) {
        id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
        signing_service_id -> Nullable<Integer>,
        created -> Text,
    }
}

diesel::table! {
    release_service_overrides (id) {
        id -> Integer,
        repository_id -> Integer,
        release_distribution -> Text,
        signing_service_id -> Integer,
    }
}

diesel::table! {
    content (id) {
        id -> Integer,
        content_type -> Text,
        digest -> Text,
        relative_path -> Nullable<Text>,
        body -> Jsonb,
        created -> Text,
    }
}

diesel::table! {
    repository_versions (id) {
        id -> Integer,
        repository_id -> Integer,
        number -> Integer,
        complete -> Bool,
        created -> Text,
    }
}

diesel::table! {
    repository_content (id) {
        id -> Integer,
        repository_id -> Integer,
        content_id -> Integer,
        version_added -> Integer,
        version_removed -> Nullable<Integer>,
    }
}

diesel::joinable!(release_service_overrides -> signing_services (signing_service_id));
diesel::joinable!(repository_content -> content (content_id));

diesel::allow_tables_to_appear_in_same_query!(
    signing_services,
    repositories,
    release_service_overrides,
    content,
    repository_versions,
    repository_content,
);
