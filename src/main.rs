mod backend;
mod err;
mod generate;
mod interrupt;
mod listing;
mod method;
mod params;
mod prompt;
mod registry;
mod symbol;
mod totp;

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::process;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use generate::{Charset, Mode, DEFAULT_SEPARATOR};
use interrupt::Interrupt;
use params::{ParamValue, Params};
use registry::Registry;
use totp::{SecretFormat, Totp};

const DEFAULT_METHOD: &str = "scrypt";

/// Make password hashes, random passwords and TOTP codes.
#[derive(Debug, Parser)]
#[command(version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    hash: HashArgs,
}

#[derive(Debug, Args)]
struct Verbosity {
    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    verbose: u8,

    /// No log output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash a password (default)
    Hash(HashArgs),
    /// Generate a random password or passphrase
    Gen(GenArgs),
    /// Create or load a TOTP secret and print codes
    Totp(TotpArgs),
}

#[derive(Debug, Args)]
struct HashArgs {
    /// Hash method (use --list-methods to see available)
    #[arg(value_name = "METHOD")]
    method: Option<String>,

    /// Method parameter (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = params::param_type)]
    params: Vec<(String, ParamValue)>,

    /// Write the plaintext password to stdout
    #[arg(short, long)]
    show_plaintext: bool,

    /// Do not ask for the password twice
    #[arg(long)]
    no_verify: bool,

    #[command(flatten)]
    action: AltAction,
}

/// Options that print some information and exit.
#[derive(Debug, Args)]
#[group(multiple = false)]
struct AltAction {
    /// List supported methods and exit
    #[arg(long)]
    list_methods: bool,

    /// List supported parameters and exit
    #[arg(long)]
    list_params: bool,

    /// List all methods and exit
    #[arg(long)]
    list_all: bool,

    /// Show parameters for METHOD and exit
    #[arg(long, value_name = "METHOD")]
    show_params: Option<String>,

    /// Show documentation for METHOD and exit
    #[arg(long, value_name = "METHOD")]
    show_docstring: Option<String>,
}

#[derive(Debug, Args)]
struct GenArgs {
    #[command(flatten)]
    mode: GenMode,

    /// Entropy in bits, or weak, fair, strong, secure
    #[arg(short, long, value_parser = generate::parse_entropy)]
    entropy: Option<u32>,

    /// Minimum number of characters or words
    #[arg(short, long)]
    length: Option<usize>,

    /// Word separator (--phrase only)
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    sep: String,

    /// Character set (--random only)
    #[arg(long, value_enum, default_value_t)]
    charset: Charset,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct GenMode {
    /// Random characters (default)
    #[arg(long)]
    random: bool,

    /// Random words
    #[arg(long)]
    phrase: bool,
}

#[derive(Debug, Args)]
struct TotpArgs {
    /// Create a new secret, LABEL is required for uri output
    #[arg(long, value_name = "LABEL", num_args = 0..=1, default_missing_value = "")]
    new: Option<String>,

    #[command(flatten)]
    format: FormatArg,

    /// Keep printing codes as they expire
    #[arg(long)]
    live: bool,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct FormatArg {
    /// Secret is an otpauth:// uri
    #[arg(long)]
    uri: bool,

    /// Secret is base32
    #[arg(long)]
    base32: bool,

    /// Secret is hex
    #[arg(long)]
    hex: bool,
}

impl FormatArg {
    fn get(&self) -> Option<SecretFormat> {
        if self.uri {
            Some(SecretFormat::Uri)
        } else if self.base32 {
            Some(SecretFormat::Base32)
        } else if self.hex {
            Some(SecretFormat::Hex)
        } else {
            None
        }
    }
}

fn main() {
    if let Err(e) = w_main() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn w_main() -> Result<()> {
    let registry = Registry::new();
    let cli = parse_args(&registry, env::args_os()).unwrap_or_else(|e| e.exit());

    init_tracing(&cli.verbosity);

    let interrupt = Interrupt::install()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut msg = io::stderr();

    match cli.command {
        Some(Command::Hash(args)) => {
            hash_command(&registry, args, &mut out, &mut msg, prompt::tty_prompt)
        }
        Some(Command::Gen(args)) => gen_command(args, &mut out, &mut msg),
        Some(Command::Totp(args)) => totp_command(args, io::stdin().lock(), &mut out, &interrupt),
        None => hash_command(&registry, cli.hash, &mut out, &mut msg, prompt::tty_prompt),
    }
}

/// Parse arguments, restricting method names to the supported methods.
fn parse_args<I, T>(registry: &Registry, args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let names = registry.supported_names();
    let default_method = if names.contains(&DEFAULT_METHOD) {
        DEFAULT_METHOD
    } else {
        names.first().copied().unwrap_or(DEFAULT_METHOD)
    };

    let restrict = |cmd: clap::Command| {
        cmd.mut_arg("method", |a| {
            a.value_parser(PossibleValuesParser::new(names.clone()))
                .default_value(default_method)
        })
        .mut_arg("show_params", |a| {
            a.value_parser(PossibleValuesParser::new(names.clone()))
        })
        .mut_arg("show_docstring", |a| {
            a.value_parser(PossibleValuesParser::new(names.clone()))
        })
    };

    let cmd = restrict(Cli::command()).mut_subcommand("hash", restrict);
    let matches = cmd.try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

fn init_tracing(verbosity: &Verbosity) {
    let level = if verbosity.quiet {
        "off"
    } else {
        match verbosity.verbose {
            0 => "error",
            1 => "warn",
            2 => "info",
            _ => "debug",
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn hash_command<W, E, P>(
    registry: &Registry,
    args: HashArgs,
    out: &mut W,
    msg: &mut E,
    prompt: P,
) -> Result<()>
where
    W: Write,
    E: Write,
    P: FnMut(&str) -> io::Result<String>,
{
    let action = &args.action;
    if action.list_methods {
        tracing::debug!("listing all supported methods");
        return Ok(listing::list_methods(out, registry)?);
    }
    if action.list_params {
        tracing::debug!("listing all known params");
        return Ok(listing::list_params(out, registry)?);
    }
    if action.list_all {
        tracing::debug!("listing all known methods");
        return Ok(listing::list_all(out, registry)?);
    }
    if let Some(name) = &action.show_params {
        return Ok(listing::show_params(out, registry.lookup(name)?)?);
    }
    if let Some(name) = &action.show_docstring {
        return Ok(listing::show_docstring(out, registry.lookup(name)?)?);
    }

    let name = args.method.as_deref().unwrap_or(DEFAULT_METHOD);
    let method = registry.lookup(name)?;
    let params: Params = args.params.into_iter().collect();
    tracing::debug!("generate using {} ({})", method.name(), method.description());

    if method.requires_user() && !params.contains("user") {
        return Err(err::Error::MissingUser(method.name().to_owned()).into());
    }

    let password = if method.requires_password() {
        prompt::read_password(prompt, msg, !args.no_verify, false)?
    } else {
        String::new()
    };

    let cryptstring = method.hash(&password, &params)?;
    if args.show_plaintext {
        writeln!(out, "{}", password)?;
    }
    writeln!(out, "{}", cryptstring)?;
    Ok(())
}

fn gen_command<W: Write, E: Write>(args: GenArgs, out: &mut W, msg: &mut E) -> Result<()> {
    let mode = if args.mode.phrase {
        Mode::Phrase {
            separator: args.sep,
        }
    } else {
        Mode::Random {
            charset: args.charset,
        }
    };

    let password = generate::generate(&mode, args.entropy, args.length, msg)?;
    writeln!(out, "{}", password)?;
    Ok(())
}

fn totp_command<R, W>(args: TotpArgs, input: R, out: &mut W, interrupt: &Interrupt) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let totp = match &args.new {
        Some(label) => {
            let format = args.format.get().unwrap_or(SecretFormat::Uri);
            let (totp, encoded) = Totp::create(Some(label.as_str()), format)?;
            writeln!(out, "{}", encoded)?;
            totp
        }
        None => Totp::load(&totp::read_secret(input)?, args.format.get())?,
    };

    if args.live {
        interrupt.defer();
    }
    totp::emit(&totp, args.live, interrupt.cancel_flag(), out)?;
    Ok(())
}
