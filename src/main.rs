use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
mod auth;
use pwvault::{
    DecryptedEntry, EntryDetails, GeneratorConfig, NewEntry, Storage, Vault, default_storage,
    generate_password,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, clap::Args)]
struct GeneratorArgs {
    /// Password length (8-128)
    #[arg(long, short, default_value_t = 16)]
    length: usize,

    /// Leave out A-Z
    #[arg(long)]
    no_uppercase: bool,

    /// Leave out a-z
    #[arg(long)]
    no_lowercase: bool,

    /// Leave out 0-9
    #[arg(long)]
    no_numbers: bool,

    /// Leave out symbols
    #[arg(long)]
    no_symbols: bool,

    /// Characters that must not appear
    #[arg(long, value_name = "CHARS", default_value = "")]
    exclude: String,

    /// Allow the same character twice in a row
    #[arg(long)]
    allow_repeating: bool,
}

impl GeneratorArgs {
    fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            length: self.length,
            uppercase: !self.no_uppercase,
            lowercase: !self.no_lowercase,
            numbers: !self.no_numbers,
            symbols: !self.no_symbols,
            exclude: self.exclude.clone(),
            no_repeating: !self.allow_repeating,
        }
    }
}

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwvault")]
#[command(
    version,
    about = "Offline password vault: generate, encrypt and store credentials."
)]
struct Cli {
    /// Path to the vault file
    #[arg(long, global = true, value_name = "PATH", env = "PWVAULT_PATH")]
    store: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Creates a new vault
    Init,

    /// Generates a random password
    #[command(visible_alias = "gen")]
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Encrypts and stores a password, replacing an entry of the same name
    #[command(arg_required_else_help = true)]
    Save {
        name: String,

        #[arg(long, short)]
        username: Option<String>,

        /// Password to store; prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Comma separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Generate the password instead of prompting for it
        #[arg(long, short, conflicts_with = "password")]
        generate: bool,

        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Shows an entry including its password
    #[command(visible_alias = "find", arg_required_else_help = true)]
    Get {
        name: String,

        /// Copy the password to the clipboard instead of printing it
        ///
        /// On Linux the command stays running until another application
        /// takes over the clipboard; press Ctrl-C to give it up earlier.
        #[arg(long, short)]
        copy: bool,
    },

    /// Lists all entries without their passwords
    List,

    /// Finds entries whose name, username or URL contains the query
    #[command(arg_required_else_help = true)]
    Search { query: String },

    /// Deletes an entry
    #[command(visible_alias = "del", arg_required_else_help = true)]
    Delete {
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Shows information about the vault
    Stats,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pwvault={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Init => {
            let storage = resolve_storage(args.store)?;
            let password = auth::read_new_master_password()?;
            let vault = Vault::init_with_storage(password, storage)?;
            println!("vault initialized at {}", vault.storage().path().display());
        }
        Commands::Generate { generator } => {
            let password = generate_password(&generator.to_config())?;
            println!("{}", password.as_str());
        }
        Commands::Save {
            name,
            username,
            password,
            url,
            notes,
            tags,
            generate,
            generator,
        } => {
            let storage = resolve_storage(args.store)?;
            let mut vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;

            let (password, generated) = match password {
                Some(p) => (zeroize::Zeroizing::new(p), false),
                None if generate => (generate_password(&generator.to_config())?, true),
                None => (auth::read_entry_password()?, false),
            };

            let replacing = vault.contains(&name);
            vault.save_entry(NewEntry {
                name: name.clone(),
                details: EntryDetails {
                    username: username.unwrap_or_default(),
                    url: url.unwrap_or_default(),
                    notes: notes.unwrap_or_default(),
                },
                password,
                tags: tags
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            })?;
            vault.save()?;

            if generated {
                println!("generated password for '{name}'");
            }
            if replacing {
                println!("password '{name}' updated");
            } else {
                println!("password '{name}' saved");
            }
        }
        Commands::Get { name, copy } => {
            let storage = resolve_storage(args.store)?;
            let vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;
            let entry = vault.get(&name)?;

            print_entry(&entry, !copy);
            if copy {
                copy_to_clipboard(&entry.password)?;
            }
        }
        Commands::List => {
            let storage = resolve_storage(args.store)?;
            let vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;
            let entries = vault.list();

            if entries.is_empty() {
                println!("No passwords found.");
                return Ok(());
            }

            println!("Found {} passwords:\n", entries.len());
            print_summaries(&entries);
        }
        Commands::Search { query } => {
            let storage = resolve_storage(args.store)?;
            let vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;
            let entries = vault.search(&query);

            if entries.is_empty() {
                println!("No passwords found matching '{query}'.");
                return Ok(());
            }

            println!("Found {} passwords matching '{query}':\n", entries.len());
            print_summaries(&entries);
        }
        Commands::Delete { name, yes } => {
            let storage = resolve_storage(args.store)?;
            let mut vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;

            if !yes && !auth::confirm(&format!("Delete password '{name}'?"))? {
                println!("deletion cancelled");
                return Ok(());
            }

            vault.delete(&name)?;
            vault.save()?;
            println!("password '{name}' deleted");
        }
        Commands::Stats => {
            let storage = resolve_storage(args.store)?;
            let vault = Vault::open_with_storage(auth::read_master_password()?, storage)?;
            let stats = vault.stats()?;

            println!("Vault: {}", vault.storage().path().display());
            println!("Total passwords: {}", stats.total_entries);
            println!("Vault size: {} bytes", stats.file_size);
            println!("Created: {}", stats.created.format(TIME_FORMAT));
            println!("Last modified: {}", stats.modified.format(TIME_FORMAT));
        }
    }

    Ok(())
}

/// X11 and Wayland clipboards are served by the owning process, so on Linux
/// this blocks until another application replaces the contents.
fn copy_to_clipboard(password: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;

    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;

        println!("password copied to clipboard, waiting until it is replaced");
        clipboard
            .set()
            .wait()
            .text(password)
            .context("failed to copy password to clipboard")?;
    }

    #[cfg(not(target_os = "linux"))]
    {
        clipboard
            .set_text(password)
            .context("failed to copy password to clipboard")?;
        println!("password copied to clipboard");
    }

    Ok(())
}

fn print_entry(entry: &DecryptedEntry, show_password: bool) {
    println!("Name: {}", entry.name);
    if !entry.details.username.is_empty() {
        println!("Username: {}", entry.details.username);
    }
    if show_password {
        println!("Password: {}", entry.password.as_str());
    }
    if !entry.details.url.is_empty() {
        println!("URL: {}", entry.details.url);
    }
    if !entry.details.notes.is_empty() {
        println!("Notes: {}", entry.details.notes);
    }
    if !entry.tags.is_empty() {
        println!("Tags: {}", entry.tags.join(", "));
    }
    println!("Created: {}", entry.created.format(TIME_FORMAT));
    println!("Updated: {}", entry.updated.format(TIME_FORMAT));
}

fn print_summaries(entries: &[DecryptedEntry]) {
    for e in entries {
        println!("Name: {}", e.name);
        if !e.details.username.is_empty() {
            println!("Username: {}", e.details.username);
        }
        if !e.details.url.is_empty() {
            println!("URL: {}", e.details.url);
        }
        if !e.tags.is_empty() {
            println!("Tags: {}", e.tags.join(", "));
        }
        println!("Updated: {}", e.updated.format(TIME_FORMAT));
        println!("---");
    }
}
