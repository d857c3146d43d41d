use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use seedgen::config;
use seedgen::generator::{
    export, generate, plan_rows, quoted_fields, ExportOptions, GenerateOptions, GenerateSummary,
};
use seedgen::manifest::load_manifest;

#[derive(Parser)]
#[command(
    name = "seedgen",
    author,
    version,
    about = "Bulk auth-user SQL migration generator",
    long_about = r#"seedgen — turn a JSON user manifest into a SQL migration that bulk-creates
authentication accounts.

The generated script defines a temporary create_user_with_password function,
invokes it once per manifest entry (skipping emails that already exist),
emits verification queries and drops the function again. It is meant to be
pasted into the hosted SQL console by hand; seedgen never talks to a database.

Examples:
  1) Generate with the default paths:
      seedgen
  2) Generate from a specific manifest:
      seedgen generate --manifest players.json --output out.sql
  3) Inspect what would be generated:
      seedgen check --manifest players.json
  4) Export credential sheets for distribution:
      seedgen export --manifest players.json
"#,
    after_help = "Use `seedgen <subcommand> --help` for subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the SQL migration script
    #[command(
        about = "Render the migration script and write it to disk",
        long_about = "Read the user manifest, derive an email and role for every record and write the full SQL script, overwriting any previous version. Paths, the email domain and the admin allow-list fall back to environment variables and then to built-in defaults."
    )]
    Generate {
        /// Path to the user manifest (JSON)
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Path the SQL script is written to
        #[arg(long)]
        output: Option<PathBuf>,
        /// Email domain appended to lowercased usernames
        #[arg(long)]
        email_domain: Option<String>,
        /// Username granted the admin role (repeat for each admin)
        #[arg(long = "admin")]
        admins: Vec<String>,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Export credential CSVs for distribution to participants
    #[command(
        about = "Write credential CSVs (all users, admins only)",
        long_about = "Read the user manifest and write two CSV files: one with every account (username, derived email, password, role, login instructions) and an admin-only sheet. Intended for handing credentials to participants; keep the files secure and delete them after distribution."
    )]
    Export {
        /// Path to the user manifest (JSON)
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Path the full credentials CSV is written to
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Path the admin-only CSV is written to
        #[arg(long)]
        admin_csv: Option<PathBuf>,
        /// Email domain appended to lowercased usernames
        #[arg(long)]
        email_domain: Option<String>,
        /// Username granted the admin role (repeat for each admin)
        #[arg(long = "admin")]
        admins: Vec<String>,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Validate the manifest and preview derived accounts without writing
    #[command(
        about = "Validate the manifest and preview derived accounts",
        long_about = "Load the manifest and print the username, derived email and role of every record as a table, without writing anything. Warns about fields containing single quotes, which would break the generated SQL."
    )]
    Check {
        /// Path to the user manifest (JSON)
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Email domain appended to lowercased usernames
        #[arg(long)]
        email_domain: Option<String>,
        /// Username granted the admin role (repeat for each admin)
        #[arg(long = "admin")]
        admins: Vec<String>,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
}

fn resolve_options(
    manifest: Option<PathBuf>,
    output: Option<PathBuf>,
    email_domain: Option<String>,
    admins: Vec<String>,
    env_file: Option<&str>,
) -> GenerateOptions {
    config::load_env_file(env_file);
    GenerateOptions {
        manifest_path: manifest.unwrap_or_else(|| PathBuf::from(config::get_manifest_path())),
        output_path: output.unwrap_or_else(|| PathBuf::from(config::get_output_path())),
        email_domain: email_domain.unwrap_or_else(config::get_email_domain),
        admin_usernames: if admins.is_empty() {
            config::get_admin_usernames()
        } else {
            admins
        },
    }
}

fn run_generate(opts: GenerateOptions) {
    match generate(&opts) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            tracing::error!(%e, "Generation failed");
            eprintln!("{}: {}", yansi::Paint::new("Generation failed").red(), e);
            process::exit(1);
        }
    }
}

fn print_summary(summary: &GenerateSummary) {
    println!(
        "{} {}",
        yansi::Paint::new("SQL migration file generated:").green(),
        yansi::Paint::new(summary.output_path.display()).cyan()
    );
    println!(
        "Total users: {} ({} admin, {} player)",
        summary.user_count, summary.admin_count, summary.player_count
    );
    println!(
        "{}",
        yansi::Paint::new("Copy and run this file in the SQL console to create the accounts.")
            .yellow()
    );
}

fn run_export(opts: ExportOptions) {
    match export(&opts) {
        Ok(summary) => {
            println!(
                "{} {}",
                yansi::Paint::new("Credentials exported:").green(),
                yansi::Paint::new(summary.csv_path.display()).cyan()
            );
            println!(
                "{} {}",
                yansi::Paint::new("Admin credentials:").green(),
                yansi::Paint::new(summary.admin_csv_path.display()).cyan()
            );
            println!(
                "Total users: {} ({} admin)",
                summary.user_count, summary.admin_count
            );
            println!(
                "{}",
                yansi::Paint::new(
                    "Keep these files secure and delete them after distributing the credentials."
                )
                .yellow()
            );
        }
        Err(e) => {
            tracing::error!(%e, "Export failed");
            eprintln!("{}: {}", yansi::Paint::new("Export failed").red(), e);
            process::exit(1);
        }
    }
}

fn run_check(opts: GenerateOptions) {
    let manifest = match load_manifest(&opts.manifest_path) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(%e, "Manifest check failed");
            eprintln!("{}: {}", yansi::Paint::new("Manifest check failed").red(), e);
            process::exit(1);
        }
    };

    let rows = plan_rows(&manifest, &opts.email_domain, &opts.admin_usernames);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table.set_header(vec!["Username", "Email", "Role"]);
    for row in &rows {
        table.add_row(vec![&row.username, &row.email, &row.role.to_string()]);
    }
    println!("\n{table}\n");

    let quoted = quoted_fields(&rows);
    if quoted > 0 {
        tracing::warn!(quoted, "Manifest fields contain single quotes");
        println!(
            "{}",
            yansi::Paint::new(format!(
                "Warning: {} record(s) contain a single quote; the generated SQL interpolates fields literally and will not run as-is.",
                quoted
            ))
            .yellow()
        );
    }

    let admin_count = rows.iter().filter(|r| r.role == "admin").count();
    println!(
        "{} {} users ({} admin, {} player)",
        yansi::Paint::new("Manifest OK:").green(),
        rows.len(),
        admin_count,
        rows.len() - admin_count
    );
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // CLI parsing
    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    // Dispatch CLI commands. With no subcommand, generate using defaults —
    // the original operator workflow is a bare invocation.
    match cli.command {
        None => {
            let opts = resolve_options(None, None, None, Vec::new(), None);
            run_generate(opts);
        }
        Some(Commands::Generate {
            manifest,
            output,
            email_domain,
            admins,
            env_file,
        }) => {
            let opts = resolve_options(manifest, output, email_domain, admins, env_file.as_deref());
            run_generate(opts);
        }
        Some(Commands::Export {
            manifest,
            csv,
            admin_csv,
            email_domain,
            admins,
            env_file,
        }) => {
            config::load_env_file(env_file.as_deref());
            let opts = ExportOptions {
                manifest_path: manifest
                    .unwrap_or_else(|| PathBuf::from(config::get_manifest_path())),
                csv_path: csv.unwrap_or_else(|| PathBuf::from(config::get_csv_path())),
                admin_csv_path: admin_csv
                    .unwrap_or_else(|| PathBuf::from(config::get_admin_csv_path())),
                email_domain: email_domain.unwrap_or_else(config::get_email_domain),
                admin_usernames: if admins.is_empty() {
                    config::get_admin_usernames()
                } else {
                    admins
                },
            };
            run_export(opts);
        }
        Some(Commands::Check {
            manifest,
            email_domain,
            admins,
            env_file,
        }) => {
            let opts = resolve_options(manifest, None, email_domain, admins, env_file.as_deref());
            run_check(opts);
        }
    }
}
