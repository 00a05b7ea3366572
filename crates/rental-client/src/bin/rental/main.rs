//! `rental` command-line client.

mod cli;

use std::fmt::Display;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use rental_client::hooks::{BookingsHook, FavouritesHook, ResidenciesHook};
use rental_client::identity::{
    CredentialChain, DeviceCodePrompt, FileTokenStore, MemoryTokenStore, OAuthConfig,
    OAuthIdentityProvider, Session, TokenStore,
};
use rental_client::model::Residency;
use rental_client::presentation::{
    BasicsStep, FacilitiesStep, IdentityClaims, ImageStep, ListingWizard, LocationStep,
    ProfileForm, StepErrors,
};
use rental_client::{ClientError, CredentialSlot, CurrentUser, QueryState, RentalApiClient};

use cli::{Cli, Command, CreateArgs, GlobalOpts, ProfileCommand};

#[expect(clippy::print_stdout, reason = "CLI output")]
fn say(line: impl Display) {
    println!("{line}");
}

struct TerminalPrompt;

impl DeviceCodePrompt for TerminalPrompt {
    fn show(&self, verification_uri: &str, user_code: &str) {
        say(format_args!(
            "Open {verification_uri} and enter the code {user_code} to sign in."
        ));
    }
}

struct App {
    api: Arc<RentalApiClient>,
    user: CurrentUser,
    session: Option<Session>,
    json: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

fn build_session(
    global: &GlobalOpts,
    api: &Arc<RentalApiClient>,
    user: &CurrentUser,
) -> Result<Option<Session>, ClientError> {
    let (Some(domain), Some(client_id)) = (
        global.identity_domain.as_deref(),
        global.identity_client_id.as_deref(),
    ) else {
        return Ok(None);
    };
    let store: Arc<dyn TokenStore> = match global
        .credentials_dir
        .clone()
        .or_else(FileTokenStore::default_dir)
    {
        Some(dir) => Arc::new(FileTokenStore::new(dir)),
        None => {
            warn!("no credential directory available; credentials will not persist");
            Arc::new(MemoryTokenStore::new())
        }
    };
    let provider = OAuthIdentityProvider::new(
        reqwest::Client::new(),
        OAuthConfig::new(domain, client_id)?,
        Arc::clone(&store),
        Arc::new(TerminalPrompt),
    );
    let chain = CredentialChain::new(
        Arc::new(provider),
        store,
        api.credentials().clone(),
        global.identity_audience.clone(),
    );
    let session = Session::new(Arc::clone(api), chain, user.clone());
    session.restore();
    Ok(Some(session))
}

impl App {
    fn new(global: &GlobalOpts) -> Result<Self, ClientError> {
        let api = Arc::new(RentalApiClient::new(
            &global.api_url,
            CredentialSlot::default(),
        )?);
        let user = global
            .email
            .as_deref()
            .map(CurrentUser::signed_in)
            .unwrap_or_default();
        let session = build_session(global, &api, &user)?;
        Ok(Self {
            api,
            user,
            session,
            json: global.json,
        })
    }

    /// Credential acquisition ahead of a protected action; degraded outcomes
    /// are logged by the chain and the call proceeds.
    async fn protect(&self) {
        if let Some(session) = &self.session {
            session.ensure_credential().await;
        }
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(rendered) => say(rendered),
                Err(err) => error!(error = %err, "failed to render JSON"),
            }
        } else {
            say(text(value));
        }
    }

    async fn run(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::List { filter } => self.list(filter.as_deref().unwrap_or_default()).await,
            Command::Show { id } => {
                let residency = self.api.get_residency(id).await?;
                self.print(&residency, describe);
                Ok(())
            }
            Command::Create(args) => self.create(args).await,
            Command::Book { id, date } => {
                self.protect().await;
                let hook = BookingsHook::new(Arc::clone(&self.api), self.user.clone());
                say(hook.book(id, date).await?.message);
                Ok(())
            }
            Command::Cancel { id } => {
                self.protect().await;
                let hook = BookingsHook::new(Arc::clone(&self.api), self.user.clone());
                say(hook.cancel(id).await?.message);
                Ok(())
            }
            Command::Favourite { id } => {
                self.protect().await;
                let hook = FavouritesHook::new(Arc::clone(&self.api), self.user.clone());
                hook.mount().await;
                say(hook.toggle(id).await?.message);
                Ok(())
            }
            Command::Bookings => {
                self.protect().await;
                let hook = BookingsHook::new(Arc::clone(&self.api), self.user.clone());
                let bookings = settled(hook.mount().await, &self.user)?;
                self.print(&bookings, |items| {
                    items
                        .iter()
                        .map(|b| format!("{}  {}", b.date, b.residency_id))
                        .collect::<Vec<_>>()
                        .join("\n")
                });
                Ok(())
            }
            Command::Favourites => {
                self.protect().await;
                let hook = FavouritesHook::new(Arc::clone(&self.api), self.user.clone());
                let favourites = settled(hook.mount().await, &self.user)?;
                self.print(&favourites, |ids| {
                    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
                });
                Ok(())
            }
            Command::Profile { command } => self.profile(command).await,
            Command::Login => {
                let session = self.session.as_ref().ok_or_else(identity_missing)?;
                let email = session.login().await?;
                say(format_args!("Signed in as {email}"));
                Ok(())
            }
            Command::Logout => {
                let session = self.session.as_ref().ok_or_else(identity_missing)?;
                session.logout()?;
                say("Signed out");
                Ok(())
            }
        }
    }

    async fn list(&self, filter: &str) -> Result<(), ClientError> {
        let hook = ResidenciesHook::new(Arc::clone(&self.api));
        let state = hook.mount().await;
        if state.is_error && state.data.is_none() {
            return Err(ClientError::Validation("Error while fetching data".to_owned()));
        }
        let matches = hook.filtered(filter);
        self.print(&matches, |items| {
            items.iter().map(summary).collect::<Vec<_>>().join("\n")
        });
        Ok(())
    }

    async fn create(&self, args: CreateArgs) -> Result<(), ClientError> {
        self.protect().await;
        let owner = self.user.email().ok_or(ClientError::NotSignedIn)?;
        let mut wizard = ListingWizard::new(owner);
        wizard
            .submit_location(LocationStep {
                country: args.country,
                city: args.city,
                address: args.address,
            })
            .map_err(rejected)?;
        wizard
            .submit_image(ImageStep { url: args.image })
            .map_err(rejected)?;
        wizard
            .submit_basics(BasicsStep {
                title: args.title,
                description: args.description,
                price: args.price,
            })
            .map_err(rejected)?;
        let listing = wizard
            .submit_facilities(FacilitiesStep {
                facilities: args.facilities,
            })
            .map_err(rejected)?;

        let hook = ResidenciesHook::new(Arc::clone(&self.api));
        let created = hook.create(&listing).await?;
        self.print(&created, describe);
        Ok(())
    }

    async fn profile(&self, command: ProfileCommand) -> Result<(), ClientError> {
        self.protect().await;
        let email = self.user.email().ok_or(ClientError::NotSignedIn)?;
        let profile = match command {
            ProfileCommand::Get => match self.api.get_profile(&email).await {
                Ok(profile) => Some(profile),
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            },
            ProfileCommand::Update {
                name,
                gender,
                phone,
                image,
            } => {
                let form = ProfileForm {
                    name: name.unwrap_or_default(),
                    gender: gender.unwrap_or_default(),
                    phone: phone.unwrap_or_default(),
                    image: image.unwrap_or_default(),
                };
                let updated = self.api.update_profile(&email, &form.changes()).await?;
                say("Profile updated successfully!");
                Some(updated)
            }
        };

        let claims = match &self.session {
            Some(session) => session.claims().await.unwrap_or_default(),
            None => IdentityClaims::default(),
        };
        let form = ProfileForm::prefill(profile.as_ref(), &claims);
        if self.json {
            self.print(&profile, |_| String::new());
        } else {
            say(format_args!("email:  {email}"));
            say(format_args!("name:   {}", form.name));
            say(format_args!("gender: {}", form.gender));
            say(format_args!("phone:  {}", form.phone));
            say(format_args!("image:  {}", form.image));
        }
        Ok(())
    }
}

fn settled<T>(state: QueryState<T>, user: &CurrentUser) -> Result<T, ClientError> {
    if user.email().is_none() {
        return Err(ClientError::NotSignedIn);
    }
    match state {
        QueryState {
            data: Some(data), ..
        } => Ok(data),
        _ => Err(ClientError::Validation("Error while fetching data".to_owned())),
    }
}

fn rejected(errors: StepErrors) -> ClientError {
    let rendered = errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    ClientError::Validation(rendered)
}

fn identity_missing() -> ClientError {
    ClientError::Validation(
        "identity provider not configured; set RENTAL_IDENTITY_DOMAIN and RENTAL_IDENTITY_CLIENT_ID"
            .to_owned(),
    )
}

fn summary(residency: &Residency) -> String {
    format!(
        "{}  {} ({}, {}) - ${}",
        residency.id, residency.title, residency.city, residency.country, residency.price
    )
}

fn describe(residency: &Residency) -> String {
    format!(
        "{}\n{}\n{}, {}, {}\nprice: ${}\nfacilities: {}\nowner: {}",
        residency.title,
        residency.description,
        residency.address,
        residency.city,
        residency.country,
        residency.price,
        residency.facilities.join(", "),
        residency.user_email
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let app = match App::new(&cli.global) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "failed to start");
            return ExitCode::FAILURE;
        }
    };
    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}
