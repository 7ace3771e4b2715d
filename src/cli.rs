//! Command-line interface.
//!
//! Without a subcommand the interactive client starts. The other
//! subcommands run one request and print the result.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::api::session::{delete_token, store_token};
use crate::api::types::{
    CreatePropertyRequest, ExternalBookingRequest, LoginCredentials, Platform, Property,
    RecordMovementRequest, SignupRequest, UpdatePropertyRequest,
};
use crate::api::{MovementKind, StayHubClient};
use crate::format::{currency, date};

#[derive(Debug, Parser)]
#[command(name = "stayhub", version, about = "Manage StayHub rentals from the terminal")]
pub struct Cli {
    /// Read settings from this file instead of the default location.
    #[arg(long, global = true, env = "STAYHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "STAYHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and store the session token.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STAYHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List properties.
    Properties,
    /// Show one property.
    Property { id: String },
    /// Create a property.
    CreateProperty {
        #[arg(long)]
        name: String,
    },
    /// Rename a property.
    RenameProperty {
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a property.
    DeleteProperty { id: String },
    /// Record an expense for a property.
    RecordExpense(MovementArgs),
    /// Record a revenue for a property.
    RecordRevenue(MovementArgs),
    /// Link an external booking calendar to a property.
    ExternalBooking {
        #[arg(long)]
        property: String,
        #[arg(long, value_enum)]
        platform: PlatformArg,
        #[arg(long)]
        sync_url: String,
    },
    /// Show the check-in details of a stay.
    PublicStay { id: String },
    /// Cancel a stay.
    CancelStay { id: String },
    /// Start the interactive client.
    Tui,
}

#[derive(Debug, Clone, clap::Args, PartialEq)]
pub struct MovementArgs {
    /// Property id.
    #[arg(long)]
    pub property: String,
    /// Amount in reais, e.g. 150.50.
    #[arg(long)]
    pub amount: f64,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub description: Option<String>,
}

impl MovementArgs {
    fn into_request(self) -> RecordMovementRequest {
        RecordMovementRequest {
            amount: currency::to_cents(self.amount),
            description: self.description,
            category: self.category,
            property_id: self.property,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlatformArg {
    Airbnb,
    Booking,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Airbnb => Platform::Airbnb,
            PlatformArg::Booking => Platform::Booking,
        }
    }
}

fn read_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password is required");
    }
    Ok(password)
}

fn print_property(property: &Property) {
    println!(
        "{}  {}  (created {})",
        property.id,
        property.name,
        date::format_date(&property.created_at)
    );
}

/// Run a non-interactive command and print its result to stdout.
///
/// `login` and `signup` store the returned token in the keyring. `logout`
/// removes it.
///
/// # Errors
///
/// Returns the API or keyring error of the command, with the server
/// message where there is one. `Command::Tui` is rejected because `main`
/// starts the interactive client itself.
pub async fn run(command: Command, mut client: StayHubClient) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials {
                email,
                password: read_password(password)?,
            };
            let auth = client.sign_in(&credentials).await?;
            store_token(&auth.token)?;
            info!(user_id = %auth.user.id, "Signed in");
            println!("Signed in as {} <{}>", auth.user.name, auth.user.email);
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            let request = SignupRequest {
                name,
                email,
                password: read_password(password)?,
            };
            let auth = client.sign_up(&request).await?;
            store_token(&auth.token)?;
            println!("Account created for {}", auth.user.email);
        }
        Command::Logout => {
            delete_token()?;
            client.set_session(None);
            println!("Signed out");
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{} <{}>", user.name, user.email);
        }
        Command::Properties => {
            let properties = client.list_properties().await?;
            if properties.is_empty() {
                println!("No properties yet.");
            }
            for property in &properties {
                print_property(property);
            }
        }
        Command::Property { id } => print_property(&client.get_property(&id).await?),
        Command::CreateProperty { name } => {
            let property = client
                .create_property(&CreatePropertyRequest { name })
                .await?;
            print_property(&property);
        }
        Command::RenameProperty { id, name } => {
            let request = UpdatePropertyRequest { name: Some(name) };
            print_property(&client.update_property(&id, &request).await?);
        }
        Command::DeleteProperty { id } => {
            client.delete_property(&id).await?;
            println!("Property {} deleted", id);
        }
        Command::RecordExpense(args) => {
            let amount = currency::format_brl(currency::to_cents(args.amount));
            client
                .record_movement(MovementKind::Expense, args.into_request())
                .await?;
            println!("Expense of {} recorded", amount);
        }
        Command::RecordRevenue(args) => {
            let amount = currency::format_brl(currency::to_cents(args.amount));
            client
                .record_movement(MovementKind::Revenue, args.into_request())
                .await?;
            println!("Revenue of {} recorded", amount);
        }
        Command::ExternalBooking {
            property,
            platform,
            sync_url,
        } => {
            let request = ExternalBookingRequest {
                platform_name: platform.into(),
                sync_url,
            };
            let response = client.create_external_booking(&property, request).await?;
            println!("{}", response.message);
        }
        Command::PublicStay { id } => {
            let stay = client.public_stay(&id).await?;
            println!("Guest:         {}", stay.tenant.name);
            println!("Check-in:      {}", date::format_date_time(&stay.check_in));
            println!("Check-out:     {}", date::format_date_time(&stay.check_out));
            println!("Entrance code: {}", stay.entrance_code);
        }
        Command::CancelStay { id } => {
            client.cancel_stay(&id).await?;
            println!("Stay {} cancelled", id);
        }
        Command::Tui => bail!("the interactive client is started by main"),
    }
    Ok(())
}
