use std::env;
use std::path::Path;

// Default configuration constants
//
// EMAIL_DOMAIN must match the `usernameToEmail` helper in the auth client:
// accounts are keyed by `<lowercased username>@<domain>`. Changing one side
// without the other locks every generated account out.
pub const DEFAULT_EMAIL_DOMAIN: &str = "racetounicorn.app";
pub const DEFAULT_ADMIN_USERNAMES: [&str; 2] = ["YLES-001", "YLES-300"];
pub const DEFAULT_MANIFEST_PATH: &str = "scripts/users.json";
pub const DEFAULT_OUTPUT_PATH: &str = "supabase/migrations/002_bulk_create_users.sql";
pub const DEFAULT_CSV_PATH: &str = "scripts/credentials.csv";
pub const DEFAULT_ADMIN_CSV_PATH: &str = "scripts/credentials-admin.csv";

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_email_domain() -> String {
    env::var("EMAIL_DOMAIN").unwrap_or_else(|_| DEFAULT_EMAIL_DOMAIN.to_string())
}

pub fn get_manifest_path() -> String {
    env::var("MANIFEST_PATH").unwrap_or_else(|_| DEFAULT_MANIFEST_PATH.to_string())
}

pub fn get_output_path() -> String {
    env::var("OUTPUT_PATH").unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.to_string())
}

pub fn get_csv_path() -> String {
    env::var("CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string())
}

pub fn get_admin_csv_path() -> String {
    env::var("ADMIN_CSV_PATH").unwrap_or_else(|_| DEFAULT_ADMIN_CSV_PATH.to_string())
}

/// Admin allow-list, comma-separated in `ADMIN_USERNAMES`. Falls back to the
/// built-in pair when the variable is unset or blank.
pub fn get_admin_usernames() -> Vec<String> {
    let raw = env::var("ADMIN_USERNAMES").unwrap_or_default();
    let mut list = Vec::new();
    if !raw.trim().is_empty() {
        for name in raw.split(',') {
            let t = name.trim();
            if !t.is_empty() {
                list.push(t.to_string());
            }
        }
    }
    if list.is_empty() {
        list = DEFAULT_ADMIN_USERNAMES.iter().map(|s| s.to_string()).collect();
    }
    list
}
