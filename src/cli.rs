//! Command line front end: argument parsing, operation matching and output.

use crate::anvl::Record;
use crate::client::{Config, DEFAULT_SERVER};
use crate::ezid::EzidClient;
use crate::minter::{mint_batch, MintIndex};
use crate::response::Response;
use crate::session::Auth;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Usage text printed after a command line error
pub const USAGE: &str = "\
Usage: ezid [OPTIONS] credentials operation...

    credentials
        username:password
        sessionid (as returned by previous login)
        - (none)

    operation
        m[int] shoulder [label value label value ...]
        c[reate] identifier [label value label value ...]
        v[iew] identifier
        u[pdate] identifier label value [label value ...]
        d[elete] identifier
        login
        logout
";

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ezid", version, about = "Client for the EZID identifier service", override_usage = "ezid [OPTIONS] <CREDENTIALS> <OPERATION> [ARGS]...")]
pub struct Cli {
    /// EZID server base URL
    #[arg(long, env = "EZID_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Request timeout in seconds
    #[arg(long, env = "EZID_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Proxy URL for all requests
    #[arg(long, env = "EZID_PROXY")]
    pub proxy: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of identifiers to mint
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Append minted identifiers to this index file
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// username:password, a session id, or - for none
    pub credentials: String,

    /// Operation name or unambiguous prefix
    pub operation: String,

    /// Identifier or shoulder, then label/value pairs
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// How a successful result is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw response text
    Text,
    /// Parsed response as JSON
    Json,
}

/// Malformed command line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// No operation starts with the given name
    #[error("unknown operation: {0:?}")]
    UnknownOperation(String),

    /// More than one operation starts with the given prefix
    #[error("ambiguous operation {prefix:?}: matches {}", .candidates.join(", "))]
    AmbiguousOperation {
        prefix: String,
        candidates: Vec<&'static str>,
    },

    /// The operation takes a different number of arguments
    #[error("wrong number of arguments for {operation}: {given}")]
    WrongArity {
        operation: &'static str,
        given: usize,
    },

    /// `update` was given an identifier but no pairs
    #[error("update needs at least one label value pair")]
    MissingMetadata,

    /// `--count` or `--index` given to an operation other than mint
    #[error("--count and --index only apply to mint")]
    MintOptionsOnly,

    /// `--count 0` would mint nothing
    #[error("--count must be at least 1")]
    ZeroCount,
}

/// Number of arguments an operation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityRule {
    /// Exactly this many arguments
    Exact(usize),
    /// Identifier followed by label/value pairs
    OddCount,
}

impl ArityRule {
    /// Whether `count` arguments satisfy the rule
    pub fn accepts(self, count: usize) -> bool {
        match self {
            ArityRule::Exact(n) => count == n,
            ArityRule::OddCount => count % 2 == 1,
        }
    }
}

/// Operations the command line can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Mint,
    Create,
    View,
    Update,
    Delete,
    Login,
    Logout,
}

impl Operation {
    /// Every operation, in usage-text order
    pub const ALL: [Operation; 7] = [
        Operation::Mint,
        Operation::Create,
        Operation::View,
        Operation::Update,
        Operation::Delete,
        Operation::Login,
        Operation::Logout,
    ];

    /// Full name as typed on the command line
    pub fn name(self) -> &'static str {
        match self {
            Operation::Mint => "mint",
            Operation::Create => "create",
            Operation::View => "view",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Login => "login",
            Operation::Logout => "logout",
        }
    }

    /// Arguments expected after the operation name
    pub fn arity(self) -> ArityRule {
        match self {
            Operation::Mint | Operation::Create | Operation::Update => ArityRule::OddCount,
            Operation::View | Operation::Delete => ArityRule::Exact(1),
            Operation::Login | Operation::Logout => ArityRule::Exact(0),
        }
    }

    /// Resolve an operation from a unique prefix of its name
    pub fn from_prefix(prefix: &str) -> std::result::Result<Self, UsageError> {
        let matches: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(|op| op.name().starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [op] => Ok(*op),
            [] => Err(UsageError::UnknownOperation(prefix.to_string())),
            many => Err(UsageError::AmbiguousOperation {
                prefix: prefix.to_string(),
                candidates: many.iter().map(|op| op.name()).collect(),
            }),
        }
    }
}

/// Interpret the credentials argument
pub fn parse_credentials(arg: &str) -> Auth {
    if let Some((username, password)) = arg.split_once(':') {
        Auth::credentials(username, password)
    } else if arg == "-" {
        Auth::None
    } else {
        Auth::SessionId(arg.to_string())
    }
}

/// A validated command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// How to authenticate
    pub auth: Auth,
    pub operation: Operation,
    /// Identifier, or shoulder for mint
    pub identifier: Option<String>,
    /// Label/value pairs following the identifier
    pub record: Record,
}

impl Invocation {
    /// Resolve the operation, check its arity and split out the pairs
    pub fn parse(
        credentials: &str,
        operation: &str,
        args: &[String],
    ) -> std::result::Result<Self, UsageError> {
        let operation = Operation::from_prefix(operation)?;
        if !operation.arity().accepts(args.len()) {
            return Err(UsageError::WrongArity {
                operation: operation.name(),
                given: args.len(),
            });
        }

        let (identifier, pairs) = match args.split_first() {
            Some((first, rest)) => (Some(first.clone()), rest),
            None => (None, &[][..]),
        };

        let record: Record = pairs
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        if operation == Operation::Update && record.is_empty() {
            return Err(UsageError::MissingMetadata);
        }

        Ok(Invocation {
            auth: parse_credentials(credentials),
            operation,
            identifier,
            record,
        })
    }
}

impl Cli {
    /// Validate positional arguments and options
    pub fn invocation(&self) -> std::result::Result<Invocation, UsageError> {
        let invocation = Invocation::parse(&self.credentials, &self.operation, &self.args)?;
        if self.count == 0 {
            return Err(UsageError::ZeroCount);
        }
        if invocation.operation != Operation::Mint && (self.count != 1 || self.index.is_some()) {
            return Err(UsageError::MintOptionsOnly);
        }
        Ok(invocation)
    }

    /// Build the client configuration from options
    pub fn config(&self) -> crate::Result<Config> {
        let mut config = Config::new(&self.server)?;
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ref proxy) = self.proxy {
            config = config.with_proxy(proxy)?;
        }
        Ok(config)
    }
}

/// What an operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Raw response text
    Text(String),
    /// Minted identifiers
    Identifiers(Vec<String>),
    /// Session id from login
    SessionId(String),
}

impl Output {
    /// Format the output for stdout
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match (self, format) {
            (Output::Text(text), OutputFormat::Text) => Ok(text.trim_end().to_string()),
            (Output::Identifiers(ids), OutputFormat::Text) => Ok(ids.join("\n")),
            (Output::SessionId(id), OutputFormat::Text) => Ok(id.clone()),
            (Output::Text(text), OutputFormat::Json) => {
                let response = Response::parse(text).context("failed to parse response")?;
                Ok(serde_json::to_string_pretty(&response)?)
            }
            (Output::Identifiers(ids), OutputFormat::Json) => {
                Ok(serde_json::to_string_pretty(&serde_json::json!({ "identifiers": ids }))?)
            }
            (Output::SessionId(id), OutputFormat::Json) => {
                Ok(serde_json::to_string_pretty(&serde_json::json!({ "session_id": id }))?)
            }
        }
    }
}

/// Run a validated invocation against the service
pub fn run(cli: &Cli, invocation: Invocation) -> Result<Output> {
    let config = cli.config()?;
    let mut client = EzidClient::with_config(config, invocation.auth)?;

    let target = invocation.identifier.as_deref().unwrap_or_default();
    let record = Some(&invocation.record).filter(|r| !r.is_empty());

    let output = match invocation.operation {
        Operation::Login => Output::SessionId(client.login()?),
        Operation::Logout => Output::Text(client.logout()?),
        Operation::View => Output::Text(client.view(target)?),
        Operation::Create => Output::Text(client.create(target, record)?),
        Operation::Update => Output::Text(client.update(target, &invocation.record)?),
        Operation::Delete => Output::Text(client.delete(target)?),
        Operation::Mint => {
            let index = cli.index.as_ref().map(MintIndex::new);
            let minted = mint_batch(&mut client, target, cli.count, record, index.as_ref())
                .with_context(|| format!("minting from {}", target))?;
            Output::Identifiers(minted)
        }
    };
    Ok(output)
}
