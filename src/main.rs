mod app;
mod bookings;
mod calendar;
mod dayoff;
mod grid;
mod help;
mod jumpto;
mod selection;
mod store;
mod theme;
use crate::app::App;
use crate::grid::CalendarMonth;
use crate::store::VendorStore;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
const LOG_FILTER_VAR: &str = "VENDORCAL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        data: PathBuf,
        month: Option<CalendarMonth>,
        reason: Option<String>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut data = None;
        let mut month = None;
        let mut reason = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('r') | Arg::Long("reason") => {
                    reason = Some(parser.value()?.string()?);
                }
                Arg::Short('l') | Arg::Long("log-file") => {
                    log_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Value(value) if data.is_none() => data = Some(PathBuf::from(value)),
                Arg::Value(value) if month.is_none() => month = Some(value.parse()?),
                _ => return Err(arg.unexpected()),
            }
        }
        let Some(data) = data else {
            return Err("missing DATA argument".into());
        };
        Ok(Command::Run {
            data,
            month,
            reason,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                data,
                month,
                reason,
                log_file,
            } => {
                // Determine the local offset before anything else can start
                // a thread
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                if let Some(path) = log_file {
                    init_logging(&path)?;
                }
                let store = VendorStore::open(&data)?;
                let mut app = App::new(store, today).reason(reason);
                if let Some(month) = month {
                    app = app.start_month(month);
                }
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: vendorcal [OPTIONS] <DATA.json> [YYYY-MM]");
                println!();
                println!("Terminal availability calendar for marketplace vendors");
                println!();
                println!("Options:");
                println!("  -r, --reason <TEXT>     Reason recorded with dates blocked this session");
                println!("  -l, --log-file <PATH>   Append logs to the given file (filter with");
                println!("                          ${LOG_FILTER_VAR}, default \"info\")");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
