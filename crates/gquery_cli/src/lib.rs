//! Command-line interface for gquery.
//!
//! # Usage
//!
//! ```bash
//! # Print canonical text
//! gquery print queries/*.graphql
//!
//! # Add __typename everywhere, or check that it is already there
//! gquery typename feed.graphql
//! gquery typename feed.graphql --check
//!
//! # List the types in a saved response
//! gquery types response.json
//!
//! # Send one operation
//! gquery fetch feed.graphql --endpoint http://localhost:4000/graphql --typename
//! ```
//!
//! Logs go to stderr. `RUST_LOG` wins over `--verbose`/`--quiet` when set.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use gquery_core::{
    add_typename, collect_types_from_response, is_typename_complete, parse_document, stringify,
};
use gquery_sdk::{ClientConfig, Credentials, GqueryClient, HttpTransport, JsonMap, Operation};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gquery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show progress and debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "gquery=debug"
        } else if self.quiet {
            "gquery=warn"
        } else {
            "gquery=info"
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CredentialsArg {
    /// Always send credentials
    Include,
    /// Never send credentials
    Omit,
    /// Send credentials to the same origin only
    SameOrigin,
}

impl From<CredentialsArg> for Credentials {
    fn from(arg: CredentialsArg) -> Self {
        match arg {
            CredentialsArg::Include => Credentials::Include,
            CredentialsArg::Omit => Credentials::Omit,
            CredentialsArg::SameOrigin => Credentials::SameOrigin,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the canonical text of GraphQL documents
    Print {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Add __typename to every selection set first
        #[arg(long)]
        typename: bool,
    },

    /// Add __typename to every selection set of a document
    Typename {
        file: PathBuf,

        /// Only check; exit 1 when a selection set lacks __typename
        #[arg(long)]
        check: bool,
    },

    /// List the distinct __typename values of a JSON response
    Types { file: PathBuf },

    /// Send one operation and print the outcome as JSON
    Fetch {
        file: PathBuf,

        /// GraphQL endpoint
        #[arg(short, long)]
        endpoint: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Operation to run when the document holds several
        #[arg(long)]
        operation_name: Option<String>,

        /// Credentials policy
        #[arg(long, value_enum, default_value = "include")]
        credentials: CredentialsArg,

        /// Extra header, as `Name: value`
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Add __typename to every selection set before sending
        #[arg(long)]
        typename: bool,
    },

    /// Show version information
    Version,
}

pub async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Print { files, typename } => print_files(&files, typename, cli.verbose),
        Commands::Typename { file, check } => typename_file(&file, check, cli.quiet),
        Commands::Types { file } => list_types(&file),
        Commands::Fetch {
            file,
            endpoint,
            variables,
            operation_name,
            credentials,
            headers,
            timeout_ms,
            typename,
        } => {
            let mut config = ClientConfig::new(endpoint).credentials(credentials.into());
            for header in &headers {
                let (name, value) = parse_header(header)?;
                config = config.header(name, value);
            }
            if let Some(ms) = timeout_ms {
                config = config.timeout(Duration::from_millis(ms));
            }
            let request = FetchRequest {
                file: &file,
                variables: variables.as_deref(),
                operation_name,
                typename,
            };
            fetch_file(config, request, cli.verbose).await
        }
        Commands::Version => {
            println!("gquery {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

/// Canonical text of `source`, optionally with `__typename` injected.
pub fn canonical_text(source: &str, typename: bool) -> Result<String, gquery_core::DocumentError> {
    let document = parse_document(source)?;
    if typename {
        Ok(stringify(&add_typename(&document)))
    } else {
        Ok(stringify(&document))
    }
}

/// Splits a `Name: value` header argument.
pub fn parse_header(header: &str) -> Result<(&str, &str), String> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(format!("Invalid header (expected `Name: value`): {}", header)),
    }
}

fn print_files(
    files: &[PathBuf],
    typename: bool,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut has_errors = false;

    for file in files {
        if verbose {
            eprintln!("{} {}", "Reading".blue(), file.display());
        }

        let source = std::fs::read_to_string(file)?;
        match canonical_text(&source, typename) {
            Ok(text) => println!("{}", text),
            Err(error) => {
                has_errors = true;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                eprintln!("  {} {}", "-->".blue(), error);
            }
        }
    }

    Ok(if has_errors { 1 } else { 0 })
}

fn typename_file(file: &Path, check: bool, quiet: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(file)?;
    let document = parse_document(&source)?;

    if !check {
        print!("{}", add_typename(&document));
        return Ok(0);
    }

    if is_typename_complete(&document) {
        if !quiet {
            println!("{} {}", "OK".green(), file.display());
        }
        Ok(0)
    } else {
        eprintln!(
            "{} {} has selection sets without __typename",
            "Missing".yellow(),
            file.display()
        );
        Ok(1)
    }
}

fn list_types(file: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(file)?;
    let response: serde_json::Value = serde_json::from_str(&source)?;

    for name in collect_types_from_response(&response) {
        println!("{}", name);
    }
    Ok(0)
}

struct FetchRequest<'a> {
    file: &'a Path,
    variables: Option<&'a str>,
    operation_name: Option<String>,
    typename: bool,
}

async fn fetch_file(
    config: ClientConfig,
    request: FetchRequest<'_>,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(request.file)?;
    let mut operation = Operation::new(source);
    if request.typename {
        operation = operation.with_typename()?;
    }
    if let Some(variables) = request.variables {
        operation = operation.with_variables(serde_json::from_str(variables)?);
    }
    if let Some(name) = request.operation_name {
        operation = operation.with_operation_name(name);
    }

    if verbose {
        eprintln!("{} {}", "Sending".blue(), config.path);
    }
    let client = GqueryClient::with_config(config)?;
    let outcome = client
        .fetch::<JsonMap, _>(&[operation], &HttpTransport::new())
        .await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(if outcome.is_failure() { 1 } else { 0 })
}
