use anyhow::Context;
use cardio_api::assistant::assistant_config_from_env_values;
use cardio_api::{
    home, reports, Assistant, ApiClient, HomeView, ListRefresh, RevisionsApi, UsersApi,
};
use cardio_core::chat::ChatHistory;
use cardio_core::config::core_config_from_env_values;
use cardio_core::filter::{filter_items, Filterable};
use cardio_core::models::{Client, User};
use cardio_core::prediction::{PatientAnswers, PredictRequest};
use cardio_core::validation::{validate_login, FormMode, UserForm};
use cardio_core::{
    age_to_bracket, clock_to_seconds, seconds_to_clock, seconds_to_clock_12h, sex_to_code,
    CardioError, ClockSeconds, FileStore, PatientStatus, Revision, RevisionDraft, Role,
    SessionStore,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cardio")]
#[command(about = "Cardiovascular risk tracking client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and cache the session locally
    Login {
        email: String,
        password: String,
    },
    /// Forget the cached session and all local data
    Logout,
    /// Show the cached session
    Whoami,
    /// Show the home view for the current role
    Home,
    /// Manage user accounts (admin)
    #[command(subcommand)]
    Users(UsersCommand),
    /// List roles
    Roles,
    /// List clients (medico)
    Clients {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List a client's risk results (medico)
    Results {
        client_id: i64,
        /// Include whether each result already has a revision
        #[arg(long)]
        with_revision_state: bool,
    },
    /// Manage revisions (medico)
    #[command(subcommand)]
    Revisions(RevisionsCommand),
    /// Show KPI tiers (admin)
    Kpi {
        /// Also show user, doctor and detected-patient counts
        #[arg(long)]
        counts: bool,
    },
    /// Show a client's health report (medico)
    Report { client_id: i64 },
    /// Request a risk prediction from a JSON answers file (medico)
    Predict {
        /// Path to a JSON file with the patient's answers
        answers: std::path::PathBuf,
    },
    /// Show your consultation history (paciente)
    History,
    /// Talk to the assistant
    #[command(subcommand)]
    Chat(ChatCommand),
    /// Category and clock conversions
    #[command(subcommand)]
    Convert(ConvertCommand),
}

#[derive(Subcommand)]
enum UsersCommand {
    /// List users
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Create a user
    Create {
        #[command(flatten)]
        user: UserArgs,
    },
    /// Update a user
    Update {
        id: i64,
        #[command(flatten)]
        user: UserArgs,
    },
    /// Delete a user
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum RevisionsCommand {
    /// List revisions
    List,
    /// Show the revision attached to a result
    Show { result_id: i64 },
    /// Review a result: save a new revision for it
    Create {
        result_id: i64,
        #[command(flatten)]
        revision: RevisionArgs,
    },
    /// Review a result: update its existing revision
    Update {
        id: i64,
        result_id: i64,
        #[command(flatten)]
        revision: RevisionArgs,
    },
    /// Delete a revision
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ChatCommand {
    /// Start a new chat
    New,
    /// List chats
    List,
    /// Show a chat's messages
    Show { id: u32 },
    /// Send a message to a chat (defaults to the newest)
    Send {
        message: String,
        #[arg(long)]
        chat: Option<u32>,
        /// Also generate an image for this prompt
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a chat
    Delete { id: u32 },
}

#[derive(Subcommand)]
enum ConvertCommand {
    /// Age in years to age category
    Age { age: i64 },
    /// Sex token ("M" or "F") to code
    Sex { token: String },
    /// HH:mm:ss to seconds since midnight
    Clock { value: String },
    /// Seconds since midnight to HH:mm:ss
    Seconds { seconds: u32 },
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive last name filter
    #[arg(long)]
    last_name: Option<String>,
    /// DNI filter
    #[arg(long)]
    dni: Option<String>,
}

#[derive(Args)]
struct UserArgs {
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    dni: String,
    #[arg(long)]
    age: Option<i64>,
    /// "M" or "F"
    #[arg(long)]
    sex: Option<String>,
    #[arg(long)]
    role_id: Option<i64>,
    #[arg(long)]
    password: Option<String>,
}

impl UserArgs {
    fn into_form(self) -> UserForm {
        UserForm {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            dni: self.dni,
            age: self.age,
            sex: self.sex,
            role_id: self.role_id,
            password: self.password,
        }
    }
}

#[derive(Args)]
struct RevisionArgs {
    /// Start time (HH:mm:ss)
    start: ClockSeconds,
    /// End time (HH:mm:ss)
    end: ClockSeconds,
    diagnosis: String,
    #[arg(long, default_value = "")]
    key_factors: String,
    /// LEVE, MEDIO or GRAVE
    #[arg(long, default_value = "LEVE")]
    status: PatientStatus,
}

impl RevisionArgs {
    fn into_draft(self, result_id: i64) -> RevisionDraft {
        let mut draft = RevisionDraft::for_result(result_id);
        draft.start_time = self.start;
        draft.end_time = self.end;
        draft.diagnosis = self.diagnosis;
        draft.key_factors = self.key_factors;
        draft.patient_status = self.status;
        draft
    }
}

struct App {
    sessions: SessionStore<FileStore>,
    client: ApiClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cardio=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = core_config_from_env_values(
        std::env::var("CARDIO_API_URL").ok(),
        std::env::var("CARDIO_STORAGE_DIR").ok(),
    )?;
    let mut app = App {
        sessions: SessionStore::open(FileStore::new(cfg.storage_file())),
        client: ApiClient::from_config(&cfg),
    };

    match cli.command {
        Some(command) => run(&mut app, command).await,
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}

async fn run(app: &mut App, command: Commands) -> anyhow::Result<()> {
    let ctx = app.sessions.context();

    match command {
        Commands::Login { email, password } => {
            let credentials = validate_login(&email, &password).map_err(describe)?;
            let session = app.client.login(&credentials).await?;
            app.sessions.login(session.clone())?;
            println!("Logged in as {} ({})", session.username, session.role);
        }
        Commands::Logout => {
            app.sessions.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match app.sessions.current() {
            Some(s) => println!("{} (id {}, {})", s.username, s.user_id, s.role),
            None => println!("Not logged in"),
        },
        Commands::Home => {
            let view = home::load(&ctx, &app.client).await?;
            println!("{}", view.title());
            match &view {
                HomeView::Users(users) => users.iter().for_each(print_user),
                HomeView::Clients(clients) => clients.iter().for_each(print_client),
                HomeView::History(entries) => {
                    for entry in entries {
                        println!("{}", serde_json::to_string(entry)?);
                    }
                }
            }
        }
        Commands::Users(command) => {
            ctx.require_role(&[Role::Admin])?;
            let mut users = ListRefresh::new(UsersApi::new(app.client.clone()));
            match command {
                UsersCommand::List { filter } => {
                    let all = users.refresh().await?;
                    for user in apply_filter(all, &filter) {
                        print_user(user);
                    }
                }
                UsersCommand::Create { user } => {
                    let payload = user.into_form().validate(FormMode::Create).map_err(describe)?;
                    let created = users.create(&payload).await?;
                    println!("Created user {}", created.id);
                }
                UsersCommand::Update { id, user } => {
                    let payload = user.into_form().validate(FormMode::Edit).map_err(describe)?;
                    users.update(id, &payload).await?;
                    println!("Updated user {id}");
                }
                UsersCommand::Delete { id } => {
                    users.delete(id).await?;
                    println!("Deleted user {id}");
                }
            }
        }
        Commands::Roles => {
            ctx.require()?;
            for role in app.client.list_roles().await? {
                println!("{}\t{}", role.id, role.name);
            }
        }
        Commands::Clients { filter } => {
            ctx.require_role(&[Role::Medico])?;
            let clients = app.client.list_clients().await?;
            for client in apply_filter(&clients, &filter) {
                print_client(client);
            }
        }
        Commands::Results {
            client_id,
            with_revision_state,
        } => {
            ctx.require_role(&[Role::Medico])?;
            if with_revision_state {
                for r in app.client.list_results_with_revision_state(client_id).await? {
                    let reviewed = if r.state_revision { "reviewed" } else { "pending" };
                    println!(
                        "{}\t{}\t{}%\t{}\t{}",
                        r.result.id,
                        r.result.date_registration.format("%Y-%m-%d"),
                        r.result.risk_percentage,
                        r.result.heart_disease_label(),
                        reviewed
                    );
                }
            } else {
                for r in app.client.list_results(client_id).await? {
                    println!(
                        "{}\t{}\t{}%\t{}",
                        r.id,
                        r.date_registration.format("%Y-%m-%d"),
                        r.risk_percentage,
                        r.heart_disease_label()
                    );
                }
            }
        }
        Commands::Revisions(command) => {
            ctx.require_role(&[Role::Medico])?;
            let mut revisions = ListRefresh::new(RevisionsApi::new(app.client.clone()));
            match command {
                RevisionsCommand::List => {
                    for revision in revisions.refresh().await? {
                        print_revision(revision);
                    }
                }
                RevisionsCommand::Show { result_id } => {
                    match app.client.revision_by_result(result_id).await? {
                        Some(revision) => print_revision(&revision),
                        None => println!("No revision for result {result_id}"),
                    }
                }
                RevisionsCommand::Create {
                    result_id,
                    revision,
                } => {
                    app.client
                        .save_revision(&revision.into_draft(result_id))
                        .await?;
                    println!("Saved revision for result {result_id}");
                }
                RevisionsCommand::Update {
                    id,
                    result_id,
                    revision,
                } => {
                    app.client
                        .update_saved_revision(id, &revision.into_draft(result_id))
                        .await?;
                    println!("Updated revision {id} for result {result_id}");
                }
                RevisionsCommand::Delete { id } => {
                    revisions.delete(id).await?;
                    println!("Deleted revision {id}");
                }
            }
        }
        Commands::Kpi { counts } => {
            ctx.require_role(&[Role::Admin])?;
            print!("{}", reports::fetch(&app.client, counts).await);
        }
        Commands::Report { client_id } => {
            ctx.require_role(&[Role::Medico])?;
            let report = app.client.client_report(client_id).await?;
            match report.history {
                Some(h) => {
                    for (i, date) in h.dates.iter().enumerate() {
                        let at = |v: &[f64]| v.get(i).map_or("-".to_string(), |x| x.to_string());
                        println!(
                            "{date}\tBMI {}\tmental {}\tphysical {}",
                            at(&h.bmi),
                            at(&h.mental_health_days),
                            at(&h.physical_health_days)
                        );
                    }
                }
                None => println!("No report history for client {client_id}"),
            }
        }
        Commands::Predict { answers } => {
            ctx.require_role(&[Role::Medico])?;
            let raw = std::fs::read_to_string(&answers)
                .with_context(|| format!("reading {}", answers.display()))?;
            let answers: PatientAnswers = serde_json::from_str(&raw)?;
            let request = PredictRequest::from_answers(&answers).map_err(describe)?;
            let response = app.client.predict(&request).await?;
            println!("Risk: {}%", response.riesgo);
            println!("Impact: {}", response.impacto);
            println!("Diagnosis: {}", response.diagnostico);
        }
        Commands::History => {
            let session = ctx.require_role(&[Role::Paciente])?;
            for entry in app.client.history(session.user_id).await? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Commands::Chat(command) => {
            ctx.require()?;
            chat(app, command).await?;
        }
        Commands::Convert(command) => match command {
            ConvertCommand::Age { age } => {
                let bracket = age_to_bracket(age)?;
                println!("{} ({})", bracket.ordinal(), bracket.label());
            }
            ConvertCommand::Sex { token } => {
                let sex = sex_to_code(&token)?;
                println!("{} ({})", sex.code(), sex.display_name());
            }
            ConvertCommand::Clock { value } => println!("{}", clock_to_seconds(&value)?),
            ConvertCommand::Seconds { seconds } => println!(
                "{} ({})",
                seconds_to_clock(seconds),
                seconds_to_clock_12h(seconds)
            ),
        },
    }

    Ok(())
}

async fn chat(app: &mut App, command: ChatCommand) -> anyhow::Result<()> {
    let mut chats = ChatHistory::load(app.sessions.store())?;

    match command {
        ChatCommand::New => {
            let chat = chats.create_chat(app.sessions.store_mut())?;
            println!("Created {} (id {})", chat.name, chat.id);
        }
        ChatCommand::List => {
            let current = chats.current().map(|c| c.id);
            for chat in chats.chats() {
                let marker = if Some(chat.id) == current { "*" } else { " " };
                println!("{marker} {}\t{}\t{} messages", chat.id, chat.name, chat.messages.len());
            }
        }
        ChatCommand::Show { id } => {
            chats.select(id)?;
            if let Some(chat) = chats.current() {
                for message in &chat.messages {
                    println!("{:?}: {}", message.speaker, message.text);
                }
            }
        }
        ChatCommand::Send {
            message,
            chat,
            image,
        } => {
            if let Some(id) = chat {
                chats.select(id)?;
            }
            let assistant = Assistant::from_config(&assistant_config_from_env_values(
                std::env::var("GEMINI_API_KEY").ok(),
                std::env::var("GEMINI_MODEL").ok(),
                std::env::var("HUGGINGFACE_TOKEN").ok(),
                std::env::var("CARDIO_IMAGE_API_URL").ok(),
            ))?;

            let history = match app.sessions.current() {
                Some(s) if s.role == Role::Paciente => {
                    app.client.history(s.user_id).await.unwrap_or_else(|e| {
                        tracing::error!("Error fetching history for prompt: {e}");
                        Vec::new()
                    })
                }
                _ => Vec::new(),
            };

            let reply = assistant
                .converse(
                    &mut chats,
                    app.sessions.store_mut(),
                    &message,
                    &history,
                    image.as_deref(),
                )
                .await?;
            match reply {
                Some(reply) => {
                    println!("{}", reply.text);
                    if let Some(uri) = reply.image {
                        println!("{uri}");
                    }
                }
                None => println!("Nothing sent: start a chat first and type a message"),
            }
        }
        ChatCommand::Delete { id } => {
            chats.delete_chat(app.sessions.store_mut(), id)?;
            println!("Deleted chat {id}");
        }
    }

    Ok(())
}

/// Expands a validation error into one line per field.
fn describe(err: CardioError) -> anyhow::Error {
    match err {
        CardioError::Validation(fields) => {
            let lines: Vec<String> = fields.iter().map(|f| format!("  {f}")).collect();
            anyhow::anyhow!("invalid input:\n{}", lines.join("\n"))
        }
        other => other.into(),
    }
}

fn apply_filter<'a, T: Filterable>(items: &'a [T], filter: &FilterArgs) -> Vec<&'a T> {
    filter_items(
        items,
        filter.last_name.as_deref().unwrap_or(""),
        filter.dni.as_deref().unwrap_or(""),
    )
}

fn print_user(user: &User) {
    println!(
        "{}\t{}\t{}\t{}",
        user.id,
        user.full_name(),
        user.email,
        user.dni.as_deref().unwrap_or("-")
    );
}

fn print_client(client: &Client) {
    println!(
        "{}\t{} {}\t{}",
        client.id,
        client.first_name,
        client.last_name,
        client.dni.as_deref().unwrap_or("-")
    );
}

fn print_revision(revision: &Revision) {
    println!(
        "{}\tresult {}\t{} - {}\t{}\t{}",
        revision.id,
        revision.results_id,
        revision.start_time.to_12h(),
        revision.end_time.to_12h(),
        revision.patient_status.as_str(),
        revision.diagnosis
    );
}
