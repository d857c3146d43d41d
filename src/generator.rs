//! Migration script rendering
//!
//! Takes a loaded manifest plus the email domain and admin allow-list and
//! renders the SQL script through an askama template. Values are interpolated
//! literally, with no escaping: the script format is byte-stable and the
//! consuming workflow expects exactly what the manifest contains. See the
//! `check` subcommand for the quote warning.

use std::path::{Path, PathBuf};

use askama::Template;

use crate::error::GeneratorError;
use crate::manifest::{self, Manifest};
use crate::roles::{derive_email, role_for, Role};

/// One fully-derived invocation row (email, role) ready for interpolation
pub struct SqlUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: &'static str,
}

#[derive(Template)]
#[template(path = "bulk_create_users.sql", escape = "none")]
struct MigrationTemplate<'a> {
    rows: &'a [SqlUser],
    user_count: usize,
    admin_list: String,
    player_count: usize,
}

/// Inputs for one generation run
pub struct GenerateOptions {
    pub manifest_path: PathBuf,
    pub output_path: PathBuf,
    pub email_domain: String,
    pub admin_usernames: Vec<String>,
}

/// What a successful run produced, for the console summary
#[derive(Debug)]
pub struct GenerateSummary {
    pub output_path: PathBuf,
    pub user_count: usize,
    pub admin_count: usize,
    pub player_count: usize,
}

/// Derive email and role for every manifest record, preserving input order.
pub fn plan_rows(manifest: &Manifest, email_domain: &str, admin_usernames: &[String]) -> Vec<SqlUser> {
    manifest
        .users
        .iter()
        .map(|u| SqlUser {
            username: u.username.clone(),
            password: u.password.clone(),
            email: derive_email(&u.username, email_domain),
            role: role_for(&u.username, admin_usernames).as_str(),
        })
        .collect()
}

/// Render the full migration script as a string. Deterministic: no timestamps
/// or random values, so identical inputs produce identical bytes.
pub fn render_script(manifest: &Manifest, email_domain: &str, admin_usernames: &[String]) -> String {
    let rows = plan_rows(manifest, email_domain, admin_usernames);
    let admin_count = rows.iter().filter(|r| r.role == Role::Admin.as_str()).count();
    MigrationTemplate {
        user_count: rows.len(),
        admin_list: admin_usernames.join(", "),
        player_count: rows.len() - admin_count,
        rows: &rows,
    }
    .render()
    .expect("SQL template rendering failed")
}

/// Count the rows whose username or password contains a single quote. Such
/// fields land in the SQL verbatim and break it; `check` warns about them but
/// `generate` stays permissive.
pub fn quoted_fields(rows: &[SqlUser]) -> usize {
    rows.iter()
        .filter(|r| r.username.contains('\'') || r.password.contains('\''))
        .count()
}

/// Load the manifest, render the script and write it to the output path,
/// overwriting any previous version.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateSummary, GeneratorError> {
    let manifest = manifest::load_manifest(&opts.manifest_path)?;
    tracing::info!(
        users = manifest.users.len(),
        manifest = %opts.manifest_path.display(),
        "Loaded user manifest"
    );

    let script = render_script(&manifest, &opts.email_domain, &opts.admin_usernames);
    write_script(&opts.output_path, &script)?;

    let admin_count = manifest
        .users
        .iter()
        .filter(|u| role_for(&u.username, &opts.admin_usernames) == Role::Admin)
        .count();
    Ok(GenerateSummary {
        output_path: opts.output_path.clone(),
        user_count: manifest.users.len(),
        admin_count,
        player_count: manifest.users.len() - admin_count,
    })
}

fn write_script(path: &Path, script: &str) -> Result<(), GeneratorError> {
    std::fs::write(path, script).map_err(|e| GeneratorError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Fixed final column of the full credentials CSV
const LOGIN_INSTRUCTIONS: &str = "Login with username (not email) at the app";

/// Inputs for one credentials export run
pub struct ExportOptions {
    pub manifest_path: PathBuf,
    pub csv_path: PathBuf,
    pub admin_csv_path: PathBuf,
    pub email_domain: String,
    pub admin_usernames: Vec<String>,
}

/// What a successful export produced, for the console summary
#[derive(Debug)]
pub struct ExportSummary {
    pub csv_path: PathBuf,
    pub admin_csv_path: PathBuf,
    pub user_count: usize,
    pub admin_count: usize,
}

fn title_role(role: &str) -> &'static str {
    if role == Role::Admin.as_str() {
        "Admin"
    } else {
        "Player"
    }
}

/// Render the full credentials CSV: one row per manifest record, in input
/// order, with the derived email and role. Fields are written verbatim, same
/// posture as the SQL script.
pub fn render_credentials_csv(rows: &[SqlUser]) -> String {
    let mut csv = String::from("Username,Email,Password,Role,Login Instructions\n");
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},\"{}\"\n",
            row.username,
            row.email,
            row.password,
            title_role(row.role),
            LOGIN_INSTRUCTIONS
        ));
    }
    csv
}

/// Render the admin-only credentials CSV.
pub fn render_admin_credentials_csv(rows: &[SqlUser]) -> String {
    let mut csv = String::from("Username,Email,Password,Role\n");
    for row in rows.iter().filter(|r| r.role == Role::Admin.as_str()) {
        csv.push_str(&format!(
            "{},{},{},Admin\n",
            row.username, row.email, row.password
        ));
    }
    csv
}

/// Load the manifest and write the two credentials CSVs (all users, admins
/// only), overwriting previous versions.
pub fn export(opts: &ExportOptions) -> Result<ExportSummary, GeneratorError> {
    let manifest = manifest::load_manifest(&opts.manifest_path)?;
    tracing::info!(
        users = manifest.users.len(),
        manifest = %opts.manifest_path.display(),
        "Loaded user manifest"
    );

    let rows = plan_rows(&manifest, &opts.email_domain, &opts.admin_usernames);
    write_script(&opts.csv_path, &render_credentials_csv(&rows))?;
    write_script(&opts.admin_csv_path, &render_admin_credentials_csv(&rows))?;

    let admin_count = rows.iter().filter(|r| r.role == Role::Admin.as_str()).count();
    Ok(ExportSummary {
        csv_path: opts.csv_path.clone(),
        admin_csv_path: opts.admin_csv_path.clone(),
        user_count: rows.len(),
        admin_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::UserRecord;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        Manifest {
            users: entries
                .iter()
                .map(|(u, p)| UserRecord {
                    username: u.to_string(),
                    password: p.to_string(),
                })
                .collect(),
        }
    }

    fn admins() -> Vec<String> {
        vec!["YLES-001".to_string(), "YLES-300".to_string()]
    }

    #[test]
    fn test_one_invocation_line_per_record_in_order() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2"), ("YLES-300", "p3")]);
        let script = render_script(&m, "example.app", &admins());

        let lines: Vec<&str> = script
            .lines()
            .filter(|l| l.contains("create_user_with_password('"))
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("'yles-001@example.app', 'p1', 'YLES-001', 'admin'"));
        assert!(lines[1].contains("'yles-002@example.app', 'p2', 'YLES-002', 'player'"));
        assert!(lines[2].contains("'yles-300@example.app', 'p3', 'YLES-300', 'admin'"));
    }

    #[test]
    fn test_preamble_and_postamble_present() {
        let m = manifest(&[("YLES-001", "p1")]);
        let script = render_script(&m, "example.app", &admins());

        assert!(script.starts_with("-- ====="));
        assert!(script.contains("CREATE EXTENSION IF NOT EXISTS pgcrypto;"));
        assert!(script.contains("CREATE OR REPLACE FUNCTION create_user_with_password("));
        assert!(script.contains("SELECT role, COUNT(*) as count"));
        assert!(script.contains(
            "DROP FUNCTION IF EXISTS create_user_with_password(TEXT, TEXT, TEXT, user_role);"
        ));
        // Function definition precedes invocations, cleanup follows them
        let def = script.find("CREATE OR REPLACE FUNCTION").unwrap();
        let call = script.find("v_user_id := create_user_with_password").unwrap();
        let drop = script.find("DROP FUNCTION").unwrap();
        assert!(def < call && call < drop);
    }

    #[test]
    fn test_counts_rendered_in_notices() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2"), ("YLES-300", "p3")]);
        let script = render_script(&m, "example.app", &admins());

        assert!(script.contains("Successfully created all 3 users!"));
        assert!(script.contains("Admins: YLES-001, YLES-300"));
        assert!(script.contains("Players: 1 accounts"));
    }

    #[test]
    fn test_quotes_pass_through_unescaped() {
        // Preserved behavior: fields are interpolated literally, even when
        // they would break the SQL. See DESIGN.md.
        let m = manifest(&[("YLES-001", "it's")]);
        let script = render_script(&m, "example.app", &admins());
        assert!(script.contains("'it's'"));
    }

    #[test]
    fn test_empty_manifest_renders_no_invocations() {
        let m = manifest(&[]);
        let script = render_script(&m, "example.app", &admins());
        assert!(!script.contains("v_user_id := create_user_with_password"));
        assert!(script.contains("Successfully created all 0 users!"));
    }

    #[test]
    fn test_quoted_fields_counts_usernames_and_passwords() {
        let m = manifest(&[("YLES-001", "it's"), ("YL'ES-002", "p2"), ("YLES-003", "p3")]);
        let rows = plan_rows(&m, "example.app", &admins());
        assert_eq!(quoted_fields(&rows), 2);
    }

    #[test]
    fn test_quoted_fields_zero_for_clean_manifest() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2")]);
        let rows = plan_rows(&m, "example.app", &admins());
        assert_eq!(quoted_fields(&rows), 0);
    }

    #[test]
    fn test_credentials_csv_header_and_rows() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2"), ("YLES-300", "p3")]);
        let rows = plan_rows(&m, "example.app", &admins());
        let csv = render_credentials_csv(&rows);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Username,Email,Password,Role,Login Instructions");
        assert_eq!(
            lines[1],
            "YLES-001,yles-001@example.app,p1,Admin,\"Login with username (not email) at the app\""
        );
        assert_eq!(
            lines[2],
            "YLES-002,yles-002@example.app,p2,Player,\"Login with username (not email) at the app\""
        );
        assert!(lines[3].starts_with("YLES-300,yles-300@example.app,p3,Admin,"));
    }

    #[test]
    fn test_admin_credentials_csv_only_admins() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2"), ("YLES-300", "p3")]);
        let rows = plan_rows(&m, "example.app", &admins());
        let csv = render_admin_credentials_csv(&rows);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Username,Email,Password,Role");
        assert_eq!(lines[1], "YLES-001,yles-001@example.app,p1,Admin");
        assert_eq!(lines[2], "YLES-300,yles-300@example.app,p3,Admin");
    }

    #[test]
    fn test_render_is_deterministic() {
        let m = manifest(&[("YLES-001", "p1"), ("YLES-002", "p2")]);
        let a = render_script(&m, "example.app", &admins());
        let b = render_script(&m, "example.app", &admins());
        assert_eq!(a, b);
    }
}
