use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use sipkl::cli::{create_admin, create_department, fix_formats, setup_accounts};
use sipkl::state::open_store;
use sipkl_config::StoreConfig;
use sipkl_sheets::SharedStore;

#[derive(Parser)]
#[command(name = "sipkl-cli")]
#[command(about = "SIPKL CLI - Workbook setup and maintenance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the accounts sheet and the default admin accounts
    SetupAccounts,
    /// Create an admin account, prompting for anything not given
    CreateAdmin {
        /// Login identifier
        #[arg(short = 'i', long)]
        identifier: Option<String>,

        /// Department code, or "-" for the super admin
        #[arg(short = 'd', long)]
        department: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Create an empty profile sheet for a department
    CreateDepartment {
        /// Department code, used as the sheet name
        code: String,
    },
    /// Re-normalize names and addresses in every department sheet
    FixFormats {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let store = match open_store(&StoreConfig::from_env()).await {
        Ok(store) => store,
        Err(e) => fail("Failed to open the workbook", e),
    };

    let cli = Cli::parse();

    match cli.command {
        Commands::SetupAccounts => handle_setup_accounts(&store).await,
        Commands::CreateAdmin {
            identifier,
            department,
            name,
            password,
        } => handle_create_admin(&store, identifier, department, name, password).await,
        Commands::CreateDepartment { code } => handle_create_department(&store, &code).await,
        Commands::FixFormats { yes } => handle_fix_formats(&store, yes).await,
    }
}

async fn handle_setup_accounts(store: &SharedStore) {
    match setup_accounts(store.as_ref()).await {
        Ok(report) => {
            println!("\n✅ Accounts sheet ready");
            for identifier in &report.created {
                println!("   created: {}", identifier);
            }
            for identifier in &report.skipped {
                println!("   skipped (already exists): {}", identifier);
            }
            if !report.created.is_empty() {
                println!("   Default password: {}", sipkl_core::password::DEFAULT_PASSWORD);
            }
        }
        Err(e) => fail("Error setting up accounts", e.message()),
    }
}

async fn handle_create_admin(
    store: &SharedStore,
    identifier: Option<String>,
    department: Option<String>,
    name: Option<String>,
    password: Option<String>,
) {
    let identifier = identifier.unwrap_or_else(|| prompt("Identifier", None));
    let department = department.unwrap_or_else(|| prompt("Department", Some("-")));
    let name = name.unwrap_or_else(|| prompt("Display name", None));
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e)),
    };

    match create_admin(store.as_ref(), &identifier, &department, &name, &password).await {
        Ok(true) => {
            println!("\n✅ Admin account created");
            println!("   Identifier: {}", identifier);
            println!("   Department: {}", department);
        }
        Ok(false) => fail("Error creating admin", format!("'{}' already exists", identifier)),
        Err(e) => fail("Error creating admin", e.message()),
    }
}

async fn handle_create_department(store: &SharedStore, code: &str) {
    match create_department(store.as_ref(), code).await {
        Ok(()) => println!("\n✅ Department '{}' created", code.trim()),
        Err(e) => fail("Error creating department", e.message()),
    }
}

async fn handle_fix_formats(store: &SharedStore, yes: bool) {
    if !yes {
        let proceed = Confirm::new()
            .with_prompt("Rewrite names and addresses in every department sheet?")
            .default(false)
            .interact()
            .unwrap_or_else(|e| fail("Failed to read answer", e));
        if !proceed {
            println!("Aborted");
            return;
        }
    }

    match fix_formats(store.as_ref()).await {
        Ok(count) => println!("\n✅ {} cells rewritten", count),
        Err(e) => fail("Error fixing formats", e.message()),
    }
}

fn prompt(label: &str, default: Option<&str>) -> String {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    input
        .interact_text()
        .unwrap_or_else(|e| fail(&format!("Failed to read {}", label.to_lowercase()), e))
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    std::process::exit(1);
}
