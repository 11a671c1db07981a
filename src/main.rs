use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gym_billing::auth::{self, FixedCredentials};
use gym_billing::console::Console;
use gym_billing::gym::Gym;
use gym_billing::io::store::{CLASSES_FILE, FlatFileStore, MEMBERS_FILE};
use gym_billing::model::FeeSchedule;
use gym_billing::render::{self, OutputFormat};
use gym_billing::report::ReportKind;
use gym_billing::{GymError, Result, menu};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;

    let store = cli.store();
    let (mut gym, warnings) = Gym::open(store)?;
    let fees = FeeSchedule::default();

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            let mut console = Console::new(stdin.lock(), io::stdout());
            auth::login(&mut console, &FixedCredentials::default(), auth::MAX_ATTEMPTS)?;
            for warning in &warnings {
                console.say(format_args!("Warning: {warning}"))?;
            }
            menu::run(&mut console, &mut gym, &fees, &mut rand::thread_rng())
        }
        Command::Report(args) => {
            let stdin = io::stdin();
            let mut console = Console::new(stdin.lock(), io::stderr());
            auth::login(&mut console, &FixedCredentials::default(), auth::MAX_ATTEMPTS)?;
            for warning in &warnings {
                console.say(format_args!("Warning: {warning}"))?;
            }

            let mut stdout = io::stdout().lock();
            render::print_report(&mut stdout, &gym, &fees, args.kind.into(), args.format.into())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).map_err(|err| GymError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| GymError::Logging(err.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Member, class and billing records for a small gym."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding the member and class tables.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Member/instructor table, overriding `<data-dir>/members.txt`.
    #[arg(long)]
    members: Option<PathBuf>,

    /// Class table, overriding `<data-dir>/classes.txt`.
    #[arg(long)]
    classes: Option<PathBuf>,

    /// Log filter directive written to stderr, e.g. `info` or `gym_billing=debug`.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn store(&self) -> FlatFileStore {
        FlatFileStore::new(
            self.members
                .clone()
                .unwrap_or_else(|| self.data_dir.join(MEMBERS_FILE)),
            self.classes
                .clone()
                .unwrap_or_else(|| self.data_dir.join(CLASSES_FILE)),
        )
    }
}

#[derive(Subcommand)]
enum Command {
    /// Log in and open the interactive menu (the default).
    Menu,
    /// Log in and print a single report to stdout.
    Report(ReportArgs),
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Report to print.
    #[arg(value_enum)]
    kind: ReportChoice,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatChoice::Text)]
    format: FormatChoice,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReportChoice {
    Members,
    Schedule,
    Memberships,
    Classes,
    Clients,
}

impl From<ReportChoice> for ReportKind {
    fn from(choice: ReportChoice) -> Self {
        match choice {
            ReportChoice::Members => ReportKind::Members,
            ReportChoice::Schedule => ReportKind::Schedule,
            ReportChoice::Memberships => ReportKind::Memberships,
            ReportChoice::Classes => ReportKind::Classes,
            ReportChoice::Clients => ReportKind::Clients,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatChoice {
    Text,
    Json,
}

impl From<FormatChoice> for OutputFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Text => OutputFormat::Text,
            FormatChoice::Json => OutputFormat::Json,
        }
    }
}
