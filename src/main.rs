use std::io::Write as _;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobdeck::api::ApiClient;
use jobdeck::board::JobBoard;
use jobdeck::cli::{Cli, Commands, JobCommands, ProfileCommands};
use jobdeck::config;
use jobdeck::errors::ApiError;
use jobdeck::models::{Identity, Registration};
use jobdeck::profile::ProfileEditor;
use jobdeck::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jobdeck=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let session = Arc::new(SessionStore::restore(cfg.session_file.clone()));
    let api = Arc::new(ApiClient::new(&cfg, Arc::clone(&session))?);

    match args.command {
        Commands::Register {
            first_name,
            last_name,
            username,
            email,
            mobile,
            password,
        } => {
            let created = api
                .register(&Registration {
                    first_name,
                    last_name,
                    username,
                    email,
                    mobile,
                    password,
                })
                .await
                .map_err(friendly)?;
            println!("Account created for {}.", created.display_name());
            println!("Sign in with: jobdeck login --email <email> --password <password>");
        }

        Commands::Login { email, password } => {
            let resp = api.login(&email, &password).await.map_err(friendly)?;
            let identity = resp.user.unwrap_or_else(|| Identity {
                email: Some(email.clone()),
                ..Identity::default()
            });
            session.login(resp.access_token, identity.clone())?;
            println!("Signed in as {}.", identity.display_name());

            // Landing view after login is the task list.
            let board = JobBoard::new(Arc::clone(&api));
            board.load().await.map_err(friendly)?;
            print_jobs(&board);
        }

        Commands::Logout => {
            session.logout();
            println!("Signed out.");
        }

        Commands::Whoami => {
            if session.is_authenticated() {
                print_identity(&session.identity());
            } else {
                println!("Not signed in.");
            }
        }

        Commands::Job { command } => run_job_command(command, &session, &api).await?,

        Commands::Profile { command } => run_profile_command(command, &session, &api).await?,
    }

    Ok(())
}

async fn run_job_command(
    command: JobCommands,
    session: &Arc<SessionStore>,
    api: &Arc<ApiClient>,
) -> anyhow::Result<()> {
    let board = JobBoard::new(Arc::clone(api));
    let _watch = board.spawn_session_watch(session.subscribe());

    match command {
        JobCommands::List => {
            board.load().await.map_err(friendly)?;
            print_jobs(&board);
        }

        JobCommands::Summary => {
            board.load().await.map_err(friendly)?;
            let counts = board.status_counts();
            println!("TODO:        {}", counts.todo);
            println!("IN PROGRESS: {}", counts.in_progress);
            println!("DONE:        {}", counts.done);
            println!("total:       {}", counts.total());
        }

        JobCommands::Add { title, description } => {
            let job = board.create(&title, &description).await.map_err(friendly)?;
            println!("Added task {}: {}", job.id, job.title);
        }

        JobCommands::Edit {
            id,
            title,
            description,
        } => {
            board.load().await.map_err(friendly)?;
            let Some(mut draft) = board.begin_edit(id) else {
                anyhow::bail!("no task with id {id}");
            };
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            board.edit(id, draft).await.map_err(friendly)?;
            println!("Updated task {id}.");
        }

        JobCommands::Status { id, status } => {
            board.load().await.map_err(friendly)?;
            board.set_status(id, status).await.map_err(friendly)?;
            println!("Task {id} is now {status}.");
        }

        JobCommands::Rm { id, yes } => {
            // Deleting without explicit confirmation never reaches the server.
            if !yes && !confirm(&format!("Are you sure you want to delete task {id}?"))? {
                println!("Aborted.");
                return Ok(());
            }
            board.load().await.map_err(friendly)?;
            board.remove(id).await.map_err(friendly)?;
            println!("Deleted task {id}.");
        }
    }

    Ok(())
}

async fn run_profile_command(
    command: ProfileCommands,
    session: &Arc<SessionStore>,
    api: &Arc<ApiClient>,
) -> anyhow::Result<()> {
    let editor = ProfileEditor::new(Arc::clone(api), Arc::clone(session));

    match command {
        ProfileCommands::Show => {
            if !session.is_authenticated() {
                anyhow::bail!("not signed in — run `jobdeck login` first");
            }
            print_identity(&session.identity());
        }

        ProfileCommands::Update {
            first_name,
            last_name,
            username,
            email,
            mobile,
        } => {
            let mut draft = editor.begin_edit();
            if first_name.is_some() {
                draft.first_name = first_name;
            }
            if last_name.is_some() {
                draft.last_name = last_name;
            }
            if username.is_some() {
                draft.username = username;
            }
            if email.is_some() {
                draft.email = email;
            }
            if mobile.is_some() {
                draft.mobile = mobile;
            }
            editor.set_draft(draft);
            let confirmed = editor.save_profile().await.map_err(friendly)?;
            println!("Profile updated for {}.", confirmed.display_name());
        }

        ProfileCommands::Passwd { old, new } => {
            editor.set_password_draft(old, new);
            editor.change_password().await.map_err(friendly)?;
            println!("Password changed.");
        }
    }

    Ok(())
}

/// Translate auth failures into next-step guidance; the session store has
/// already been cleared by the time these surface.
fn friendly(e: ApiError) -> anyhow::Error {
    match e {
        ApiError::Unauthenticated => anyhow::anyhow!("not signed in — run `jobdeck login` first"),
        ApiError::SessionExpired => {
            anyhow::anyhow!("session expired — sign in again with `jobdeck login`")
        }
        other => other.into(),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn print_jobs(board: &JobBoard) {
    let jobs = board.jobs();
    if jobs.is_empty() {
        println!("No tasks yet.");
        return;
    }
    println!("{:<6} {:<12} {}", "ID", "STATUS", "TITLE");
    for job in jobs {
        println!("{:<6} {:<12} {}", job.id, job.status.to_string(), job.title);
        if let Some(desc) = &job.description {
            if !desc.is_empty() {
                println!("       {desc}");
            }
        }
    }
}

fn print_identity(identity: &Identity) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "—".into());
    println!("First name: {}", show(&identity.first_name));
    println!("Last name:  {}", show(&identity.last_name));
    println!("Username:   {}", show(&identity.username));
    println!("Email:      {}", show(&identity.email));
    println!("Mobile:     {}", show(&identity.mobile));
}
