// CLI module - command-line argument parsing and handlers
//
// Every command builds the controller it needs, drives it, and prints the
// matching view from `render`. Config subcommands run before logging is set
// up and never touch the network.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use unitrack::api::{ApiClient, ApplicationStatus, RegisterData, UniversityId};
use unitrack::config::{Config, VERSION};
use unitrack::controller::list::{ToggleOutcome, WithdrawOutcome};
use unitrack::controller::{
    DashboardController, FilterAction, FormController, ListController, Scope, ViewMode,
};
use unitrack::render;
use unitrack::session::Session;
use unitrack::storage::FileTokenStore;

/// unitrack - browse universities and track applications
#[derive(Parser)]
#[command(name = "unitrack")]
#[command(version = VERSION)]
#[command(about = "Browse universities and track your applications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirm: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Show the signed-in account
    Whoami,

    /// List universities
    List(ListArgs),

    /// Show one university in detail
    Show { id: UniversityId },

    /// Apply to a university
    Apply { id: UniversityId },

    /// Withdraw your application to a university
    Withdraw { id: UniversityId },

    /// Apply if not applied yet, otherwise withdraw
    Toggle { id: UniversityId },

    /// Your counters and recent applications
    Dashboard,

    /// List applications (yours, or everyone's with --all)
    Applications {
        /// Every user's applications (admin)
        #[arg(long)]
        all: bool,
        /// Only this status (with --all)
        #[arg(long)]
        status: Option<String>,
    },

    /// Change an application's status (admin)
    SetStatus {
        id: i64,
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Add a university (admin)
    Create {
        /// field=value, repeatable
        #[arg(long = "set", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },

    /// Edit a university (admin)
    Edit {
        id: UniversityId,
        /// field=value, repeatable
        #[arg(long = "set", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },

    /// Delete a university (admin)
    Delete { id: UniversityId },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long = "type")]
    university_type: Option<String>,
    /// Only universities offering scholarships
    #[arg(long)]
    scholarships: bool,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// grid or list
    #[arg(long, default_value = "grid")]
    view: String,
    /// Admins: show the public catalog instead of your own records
    #[arg(long)]
    public: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `config` without loading anything else. Returns true if handled.
pub fn handle_config_command(command: &Commands) -> Result<bool> {
    let Commands::Config { show, reset, path } = command else {
        return Ok(false);
    };

    if *path {
        let path = Config::config_path().context("Could not determine config path")?;
        println!("{}", path.display());
    } else if *show {
        handle_config_show()?;
    } else if *reset {
        handle_config_reset()?;
    } else {
        println!("Usage: unitrack config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
    }
    Ok(true)
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session-backed commands
// ─────────────────────────────────────────────────────────────────────────────

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn require_login(session: &Session<FileTokenStore>) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run `unitrack login --email <EMAIL>` first.");
    }
    Ok(())
}

fn require_admin(session: &Session<FileTokenStore>) -> Result<()> {
    require_login(session)?;
    if !session.is_admin() {
        bail!("This command needs an administrator account.");
    }
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Run any command other than `config`
pub async fn run(command: Commands, config: &Config) -> Result<()> {
    let api = ApiClient::new(&config.api_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let mut session = Session::new(api.clone(), FileTokenStore::new(&config.token_path));
    session.initialize().await;

    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let user = session.login(&email, &password).await?;
            println!("Logged in as {}", user.display_name());
        }

        Commands::Register {
            email,
            username,
            password,
            password_confirm,
            first_name,
            last_name,
        } => {
            let data = RegisterData {
                email,
                username,
                password,
                password_confirm,
                first_name,
                last_name,
            };
            match session.register(&data).await {
                Ok(user) => println!("Welcome, {}", user.display_name()),
                Err(failure) => {
                    for (field, message) in failure.fields.iter() {
                        eprintln!("  {}: {}", field, message);
                    }
                    return Err(failure.into());
                }
            }
        }

        Commands::Logout => {
            session.logout().await;
            println!("Logged out.");
        }

        Commands::Whoami => match session.user() {
            Some(user) => {
                let role = if user.is_staff { " (admin)" } else { "" };
                println!("{} <{}>{}", user.display_name(), user.email, role);
            }
            None => println!("Not logged in."),
        },

        Commands::List(args) => {
            let mut list = ListController::new(api, config.page_size);
            let view = ViewMode::parse(&args.view)
                .with_context(|| format!("Unknown view '{}' (grid or list)", args.view))?;
            list.set_view_mode(view);
            if session.is_admin() && !args.public {
                list.set_scope(Scope::Admin);
            }

            // Filters first (each resets the page), then the page itself
            if let Some(search) = args.search {
                list.update(FilterAction::SetSearch(search));
            }
            if let Some(country) = args.country {
                list.update(FilterAction::SetCountry(country));
            }
            if let Some(kind) = args.university_type {
                list.update(FilterAction::SetType(kind));
            }
            list.update(FilterAction::SetScholarshipsOnly(args.scholarships));
            list.update(FilterAction::SetPage(args.page));

            list.refresh(session.credentials()).await;
            print!("{}", render::list_view(&list, now()));
            if let Some(error) = list.error() {
                bail!("{}", error);
            }
            if let Some(error) = list.applications_error() {
                eprintln!("Warning: {}; applied markers may be missing.", error);
            }
        }

        Commands::Show { id } => {
            let mut list = ListController::new(api, config.page_size);
            if session.is_authenticated() {
                // Only the applied badge depends on this
                if let Err(e) = list.reload_applications(session.credentials()).await {
                    tracing::warn!("Showing university {} without application status: {}", id, e);
                }
            }
            let applied = list.has_applied(id);
            let university = list
                .open_detail(session.credentials(), id)
                .await
                .with_context(|| format!("Failed to load university {}", id))?;
            print!("{}", render::detail_view(university, applied, now()));
        }

        Commands::Apply { id } => {
            require_login(&session)?;
            let mut list = ListController::new(api, config.page_size);
            list.apply(session.credentials(), id).await?;
            println!("Applied to university {}.", id);
        }

        Commands::Withdraw { id } => {
            require_login(&session)?;
            let mut list = ListController::new(api, config.page_size);
            list.reload_applications(session.credentials())
                .await
                .context("Failed to load applications")?;
            match list.withdraw(session.credentials(), id).await? {
                WithdrawOutcome::Withdrawn => println!("Application withdrawn."),
                WithdrawOutcome::NotApplied => {
                    println!("You have not applied to university {}.", id)
                }
            }
        }

        Commands::Toggle { id } => {
            require_login(&session)?;
            let mut list = ListController::new(api, config.page_size);
            list.reload_applications(session.credentials())
                .await
                .context("Failed to load applications")?;
            match list.toggle_application(session.credentials(), id).await? {
                ToggleOutcome::Applied => println!("Applied to university {}.", id),
                ToggleOutcome::Withdrawn => println!("Application withdrawn."),
            }
        }

        Commands::Dashboard => {
            require_login(&session)?;
            let mut dashboard = DashboardController::new(api);
            let stats = dashboard.load(session.credentials()).await?.clone();
            if let Some(user) = session.user() {
                print!("{}", render::dashboard_view(user, &stats));
            }
        }

        Commands::Applications { all, status } => {
            require_login(&session)?;
            if all {
                require_admin(&session)?;
                let status = status.map(ApplicationStatus::from);
                let mut dashboard = DashboardController::new(api);
                let apps = dashboard
                    .load_applications(session.credentials(), status.as_ref())
                    .await?;
                print!("{}", render::applications_view(apps));
            } else {
                let mut list = ListController::new(api, config.page_size);
                list.reload_applications(session.credentials())
                    .await
                    .context("Failed to load applications")?;
                print!("{}", render::applications_view(list.applications()));
            }
        }

        Commands::SetStatus { id, status, notes } => {
            require_admin(&session)?;
            let mut dashboard = DashboardController::new(api);
            let updated = dashboard
                .set_status(session.credentials(), id, ApplicationStatus::from(status), notes)
                .await?;
            println!("Application {} is now {}.", updated.id, updated.status);
        }

        Commands::Create { fields } => {
            require_admin(&session)?;
            let form = FormController::create(api).with_navigate_delay(config.navigate_delay());
            submit_form(form, &session, &fields).await?;
        }

        Commands::Edit { id, fields } => {
            require_admin(&session)?;
            let mut form =
                FormController::edit(api, id).with_navigate_delay(config.navigate_delay());
            form.load(session.credentials())
                .await
                .with_context(|| format!("Failed to load university {}", id))?;
            submit_form(form, &session, &fields).await?;
        }

        Commands::Delete { id } => {
            require_admin(&session)?;
            api.delete_university(session.credentials(), id).await?;
            println!("University {} deleted.", id);
        }

        // Handled by `handle_config_command` before the session starts
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn submit_form(
    mut form: FormController,
    session: &Session<FileTokenStore>,
    fields: &[(String, String)],
) -> Result<()> {
    for (field, value) in fields {
        form.set(field, value).map_err(anyhow::Error::msg)?;
    }

    match form.submit(session.credentials()).await {
        Ok(outcome) => {
            println!("{}", outcome.message);
            // Let the confirmation sit before moving on to the record
            tokio::time::sleep(outcome.navigate_after).await;
            print!(
                "\n{}",
                render::detail_view(&outcome.university, false, now())
            );
            Ok(())
        }
        Err(e) => {
            for (field, message) in form.field_errors().iter() {
                eprintln!("  {}: {}", field, message);
            }
            let summary = form.error().unwrap_or("Failed to save university").to_string();
            Err(anyhow::Error::new(e).context(summary))
        }
    }
}
