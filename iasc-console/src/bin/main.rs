use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iasc_console::{
    load,
    services::{
        self,
        prefs::{Prefs, View},
    },
    AppConfig, Session,
};
use iasc_storage::{
    group,
    user::{self, Status},
};

#[derive(Debug, Parser)]
#[command(name = "iasc")]
#[command(author, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List users, optionally narrowed by a search term.
    Users {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one user together with the groups they belong to.
    User { id: String },
    CreateUser {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "employee")]
        user_type: String,
        #[arg(long)]
        login_name: String,
        #[arg(long, default_value = "active")]
        status: String,
        #[arg(long)]
        valid_from: Option<String>,
        #[arg(long)]
        valid_to: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    DeleteUsers { ids: Vec<String> },
    /// List groups, optionally narrowed by a search term.
    Groups {
        #[arg(long)]
        search: Option<String>,
    },
    CreateGroup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        display_name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    DeleteGroups { ids: Vec<String> },
    /// List the resolved members of one group.
    Members { group_id: String },
    /// Add users to a group.
    AddMembers {
        group_id: String,
        user_ids: Vec<String>,
    },
    /// Assign a user to groups.
    Assign {
        user_id: String,
        group_ids: Vec<String>,
    },
    /// Remove a user from a group.
    Unassign { user_id: String, group_id: String },
    /// Persist which listing the console opens with.
    View {
        #[arg(value_enum)]
        view: View,
    },
    /// Persist the selected user and group.
    Select {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
    #[command(short_flag = 'v')]
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config.config {
        Some(path) => load(path)?,
        None => cli.config.clone(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("{:#?}", &config);

    let mut prefs = Prefs::load(&config.prefs_path);
    match cli.command {
        Commands::Version => {
            println!("{}", iasc_console::version());
        }
        Commands::View { view } => {
            prefs.view = view;
            prefs.store(&config.prefs_path);
        }
        Commands::Select { user, group } => {
            prefs.selected_user = user;
            prefs.selected_group = group;
            prefs.store(&config.prefs_path);
        }
        command => {
            let app = Session::new(&config)
                .context("could not initialize the session")?;
            app.refresh()
                .await
                .context("could not load data from the backend")?;
            reconcile_prefs(&app, &mut prefs, &config)?;
            run(&app, command).await?;
        }
    }
    Ok(())
}

async fn run(app: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Users { search } => {
            let users = app.users().all()?;
            let term = search.unwrap_or_default();
            print_json(&services::search::users(&users, &term))?;
        }
        Commands::User { id } => {
            let Some(user) = app.users().get(&id)? else {
                bail!("no user with id {id}");
            };
            print_json(&user)?;
            info!("member of {} group(s)", app.user_groups(&id)?.len());
            print_json(&app.user_groups(&id)?)?;
        }
        Commands::CreateUser {
            first_name,
            last_name,
            email,
            user_type,
            login_name,
            status,
            valid_from,
            valid_to,
            company,
            country,
            city,
        } => {
            let content = user::Content {
                first_name,
                last_name,
                email,
                user_type,
                login_name,
                status: parse_status(&status)?,
                valid_from,
                valid_to,
                company,
                country,
                city,
            };
            let created = app.create_user(&content).await?;
            print_json(&created)?;
        }
        Commands::DeleteUsers { ids } => {
            app.delete_users(&ids).await?;
            info!("deleted {} user(s)", ids.len());
        }
        Commands::Groups { search } => {
            let groups = app.groups().all()?;
            let term = search.unwrap_or_default();
            print_json(&services::search::groups(&groups, &term))?;
        }
        Commands::CreateGroup {
            name,
            display_name,
            description,
        } => {
            let content = group::Content {
                name,
                display_name,
                description,
            };
            let created = app.create_group(&content).await?;
            print_json(&created)?;
        }
        Commands::DeleteGroups { ids } => {
            app.delete_groups(&ids).await?;
            info!("deleted {} group(s)", ids.len());
        }
        Commands::Members { group_id } => {
            let members =
                app.members().members(&group_id)?.unwrap_or_default();
            print_json(&members)?;
        }
        Commands::AddMembers { group_id, user_ids } => {
            app.add_users_to_group(&group_id, &user_ids).await?;
            print_json(
                &app.members().members(&group_id)?.unwrap_or_default(),
            )?;
        }
        Commands::Assign { user_id, group_ids } => {
            app.assign_groups(&user_id, &group_ids).await?;
            print_json(&app.user_groups(&user_id)?)?;
        }
        Commands::Unassign { user_id, group_id } => {
            app.unassign_group(&user_id, &group_id).await?;
            print_json(&app.user_groups(&user_id)?)?;
        }
        Commands::Version
        | Commands::View { .. }
        | Commands::Select { .. } => unreachable!(),
    }
    Ok(())
}

/// Persisted selections may point at records deleted by another
/// administrator; drop them once the fresh listings are in.
fn reconcile_prefs(
    app: &Session,
    prefs: &mut Prefs,
    config: &AppConfig,
) -> Result<()> {
    let mut changed = false;
    if let Some(id) = &prefs.selected_user {
        if app.users().get(id)?.is_none() {
            prefs.selected_user = None;
            changed = true;
        }
    }
    if let Some(id) = &prefs.selected_group {
        if app.groups().get(id)?.is_none() {
            prefs.selected_group = None;
            changed = true;
        }
    }
    if changed {
        prefs.store(&config.prefs_path);
    }
    Ok(())
}

fn parse_status(value: &str) -> Result<Status> {
    match value.to_lowercase().as_str() {
        "active" => Ok(Status::Active),
        "inactive" => Ok(Status::Inactive),
        other => bail!("unknown status {other}, use active or inactive"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .context("could not render output")?
    );
    Ok(())
}
