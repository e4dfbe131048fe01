use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};

use crate::backend::reconcile::{self, Outcome};
use crate::backend::{BackendClient, LogPage, SyncRequest};
use crate::config::Config;
use crate::event_handler::EventHandler;
use crate::form::{
    ConfirmPrompt, Effect, Field, FormEvent, FormSession, NoticeKind, OrderBy, OrderField,
    Severity, SortDirection, Submission,
};

/// Logsieve - log filter console
#[derive(Parser, Debug)]
#[command(name = "lsv")]
#[command(version)]
#[command(about = "Build, save and run log filters against a log store")]
#[command(long_about = "Logsieve (lsv) talks to a log store daemon over its Unix socket.

It builds search conditions from flags, runs them through the same
validation the filter form applies, and then lists or purges matching
log entries, or saves the conditions as a named, reusable filter.

Quick start:
  1. Run 'lsv --init' to generate a config file
  2. Edit .logsieve.toml to point at the log store socket
  3. Run 'lsv list --severity error --last 3600'")]
pub struct Cli {
    /// Path to config file (defaults to .logsieve.toml)
    #[arg(short, long, default_value = ".logsieve.toml")]
    pub config: String,

    /// Initialize a new .logsieve.toml config file
    #[arg(long)]
    pub init: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Search-condition flags shared by list, purge, save and update
#[derive(Args, Debug, Clone, Default)]
pub struct CriteriaArgs {
    /// Only entries from the last N seconds (exclusive with --from/--to)
    #[arg(long)]
    pub last: Option<String>,
    /// Window start date (YYYY-MM-DD, MM-DD-YYYY or DD-MM-YYYY)
    #[arg(long)]
    pub from: Option<String>,
    /// Window start time of day (HH:MM or HH:MM:SS)
    #[arg(long)]
    pub from_time: Option<String>,
    /// Window end date
    #[arg(long)]
    pub to: Option<String>,
    /// Window end time of day
    #[arg(long)]
    pub to_time: Option<String>,
    /// Severity level to match, repeatable (emergency, alert, critical,
    /// error, warning, notice, info, debug); none means any
    #[arg(long)]
    pub severity: Vec<String>,
    /// Message type tag to match, repeatable; none means any
    #[arg(long = "type")]
    pub types: Vec<String>,
    /// Numeric user id (exclusive with --role)
    #[arg(long)]
    pub uid: Option<String>,
    /// Role name (exclusive with --uid)
    #[arg(long)]
    pub role: Option<String>,
    /// Hostname the entry was logged from
    #[arg(long)]
    pub hostname: Option<String>,
    /// Location URL
    #[arg(long)]
    pub location: Option<String>,
    /// Referrer URL, or the literal 'none'
    #[arg(long)]
    pub referer: Option<String>,
    /// Ordering as field:direction, repeatable in priority order
    /// (fields: time, severity, type, user, hostname)
    #[arg(long)]
    pub order: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List matching log entries
    List {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Run against this saved filter instead of ad hoc conditions
        #[arg(long)]
        filter: Option<String>,
        /// Number of entries to skip
        #[arg(long, default_value = "0")]
        offset: u64,
    },
    /// Delete matching log entries (asks for confirmation)
    Purge {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Run against this saved filter instead of ad hoc conditions
        #[arg(long)]
        filter: Option<String>,
        /// Cap on rows to delete; omitting it deletes every match
        #[arg(long)]
        max: Option<u64>,
    },
    /// Save the given conditions as a new named filter
    Save {
        /// Filter name (converted to machine form)
        name: String,
        /// Description stored with the filter
        #[arg(long)]
        description: Option<String>,
        /// Base the new filter on this saved filter
        #[arg(long)]
        based_on: Option<String>,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Update a saved filter in place
    Update {
        /// Name of the filter to update
        name: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Rename the filter (machine form applies)
        #[arg(long)]
        rename: Option<String>,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Delete a saved filter (asks for confirmation)
    DeleteFilter {
        /// Name of the filter to delete
        name: String,
    },
}

/// What a driven event sequence ultimately asks the surface to do.
#[derive(Debug)]
enum Step {
    Done,
    Request(SyncRequest),
    Submit(Submission),
}

/// Feeds form events into a session and resolves the effects the way a
/// terminal surface does: info notices print, warnings abort, blocking
/// confirmations prompt on the terminal.
struct Driver {
    session: FormSession,
    assume_yes: bool,
}

impl Driver {
    fn new(session: FormSession, assume_yes: bool) -> Self {
        Self {
            session,
            assume_yes,
        }
    }

    fn feed(&mut self, event: FormEvent) -> anyhow::Result<Step> {
        let effect = EventHandler::new(&mut self.session).handle(event);
        self.resolve(effect)
    }

    fn resolve(&mut self, effect: Effect) -> anyhow::Result<Step> {
        match effect {
            Effect::None => Ok(Step::Done),
            Effect::Notice(notice) => match notice.kind {
                NoticeKind::Info => {
                    eprintln!("{}", notice.message);
                    Ok(Step::Done)
                }
                NoticeKind::Warning | NoticeKind::Error => Err(anyhow!(notice.message)),
            },
            Effect::Confirm(prompt) => {
                let accepted = self.ask(&prompt)?;
                let effect =
                    EventHandler::new(&mut self.session).handle(FormEvent::Confirm { accepted });
                if !accepted {
                    self.resolve(effect)?;
                    bail!("cancelled");
                }
                self.resolve(effect)
            }
            Effect::Submit(submission) => Ok(Step::Submit(submission)),
            Effect::Dispatch(request) => Ok(Step::Request(request)),
        }
    }

    fn ask(&self, prompt: &ConfirmPrompt) -> anyhow::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        eprint!("{} [y/N] ", prompt.message());
        std::io::stderr().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        let answer = line.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Feed every present criteria flag through the validation layer.
fn apply_criteria(driver: &mut Driver, args: &CriteriaArgs) -> anyhow::Result<()> {
    let fields = [
        (Field::TimeRange, &args.last),
        (Field::FromDate, &args.from),
        (Field::FromTime, &args.from_time),
        (Field::ToDate, &args.to),
        (Field::ToTime, &args.to_time),
        (Field::Uid, &args.uid),
        (Field::Role, &args.role),
        (Field::Hostname, &args.hostname),
        (Field::Location, &args.location),
        (Field::Referer, &args.referer),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            driver.feed(FormEvent::Field {
                field,
                value: value.clone(),
            })?;
        }
    }
    for name in &args.severity {
        let level = Severity::parse(name)
            .ok_or_else(|| anyhow!("unknown severity '{name}' (emergency through debug)"))?;
        driver.feed(FormEvent::Severity {
            level,
            checked: true,
        })?;
    }
    for tag in &args.types {
        driver.feed(FormEvent::Type {
            tag: tag.clone(),
            checked: true,
        })?;
    }
    for (slot, pair) in args.order.iter().enumerate() {
        let entry = parse_order(pair)?;
        driver.feed(FormEvent::OrderBy {
            slot,
            entry: Some(entry),
        })?;
    }
    Ok(())
}

fn parse_order(pair: &str) -> anyhow::Result<OrderBy> {
    let (field, direction) = pair.split_once(':').unwrap_or((pair, "asc"));
    let field = OrderField::parse(field).ok_or_else(|| {
        anyhow!("unknown order field '{field}' (time, severity, type, user, hostname)")
    })?;
    let direction = match direction.to_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => bail!("order direction must be asc or desc, not '{other}'"),
    };
    Ok(OrderBy { field, direction })
}

fn session_for(config: &Config, filter: Option<&str>) -> anyhow::Result<FormSession> {
    let known = config.known_filters();
    match filter {
        Some(name) => {
            if !known.contains(name) {
                bail!(
                    "unknown filter '{name}'; filters in the config: {}",
                    if config.filters.is_empty() {
                        "(none)".to_string()
                    } else {
                        config.filters.join(", ")
                    }
                );
            }
            Ok(FormSession::with_stored(
                name,
                config.token.clone(),
                config.page_size,
                config.can_edit_filters,
                known,
            ))
        }
        None => Ok(FormSession::new(
            config.token.clone(),
            config.page_size,
            config.can_edit_filters,
            known,
        )),
    }
}

/// Run one CLI subcommand against the configured log store.
pub async fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let Some(command) = cli.command.clone() else {
        bail!("no command given; try 'lsv list' or 'lsv --help'");
    };

    match command {
        Commands::List {
            criteria,
            filter,
            offset,
        } => {
            let mut driver = Driver::new(session_for(config, filter.as_deref())?, cli.yes);
            apply_criteria(&mut driver, &criteria)?;
            let step = driver.feed(FormEvent::List { offset })?;
            execute(config, &mut driver.session, step).await
        }
        Commands::Purge {
            criteria,
            filter,
            max,
        } => {
            let mut driver = Driver::new(session_for(config, filter.as_deref())?, cli.yes);
            apply_criteria(&mut driver, &criteria)?;
            let step = driver.feed(FormEvent::Purge {
                max: max.or(config.purge_cap),
            })?;
            execute(config, &mut driver.session, step).await
        }
        Commands::Save {
            name,
            description,
            based_on,
            criteria,
        } => {
            let mut driver = Driver::new(session_for(config, based_on.as_deref())?, cli.yes);
            driver.feed(FormEvent::Create)?;
            apply_criteria(&mut driver, &criteria)?;
            driver.feed(FormEvent::Field {
                field: Field::Name,
                value: name,
            })?;
            driver.session.description = description;
            let step = driver.feed(FormEvent::Save)?;
            execute(config, &mut driver.session, step).await
        }
        Commands::Update {
            name,
            description,
            rename,
            criteria,
        } => {
            if !config.can_edit_filters {
                bail!("editing filters requires can_edit_filters = true in the config");
            }
            let mut driver = Driver::new(session_for(config, Some(&name))?, cli.yes);
            driver.feed(FormEvent::Edit)?;
            apply_criteria(&mut driver, &criteria)?;
            if let Some(renamed) = rename {
                driver.feed(FormEvent::Field {
                    field: Field::Name,
                    value: renamed,
                })?;
            }
            if description.is_some() {
                driver.session.description = description;
            }
            let step = driver.feed(FormEvent::Save)?;
            execute(config, &mut driver.session, step).await
        }
        Commands::DeleteFilter { name } => {
            let mut driver = Driver::new(session_for(config, Some(&name))?, cli.yes);
            let step = driver.feed(FormEvent::Delete)?;
            execute(config, &mut driver.session, step).await
        }
    }
}

async fn execute(config: &Config, session: &mut FormSession, step: Step) -> anyhow::Result<()> {
    match step {
        Step::Done => Ok(()),
        Step::Submit(submission) => {
            let mut client = connect(config).await?;
            client
                .submit_page(&submission)
                .await
                .with_context(|| "failed to submit to the log store")?;
            println!("Submitted; the change takes effect on the next load.");
            Ok(())
        }
        Step::Request(request) => {
            let mut client = connect(config).await?;
            let outcome = match client.call(&request).await {
                Ok(response) => reconcile::apply(session, &response),
                Err(err) => reconcile::transport_failure(session, &err),
            };
            report(outcome)
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<BackendClient> {
    BackendClient::connect(&config.socket).await.with_context(|| {
        format!(
            "Could not connect to the log store at {:?}. Is the daemon running?",
            config.socket
        )
    })
}

fn report(outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Applied(message) => {
            println!("{message}");
            Ok(())
        }
        Outcome::Page(page) => {
            print_page(&page);
            Ok(())
        }
        Outcome::Rejected(message) | Outcome::ReloadRequired(message) => Err(anyhow!(message)),
        Outcome::Discarded => Err(anyhow!(
            "the response was stale and was discarded; run the command again"
        )),
    }
}

fn print_page(page: &LogPage) {
    println!(
        "{} of {} matching entries (offset {})",
        page.entries.len(),
        page.total,
        page.offset
    );
    for entry in &page.entries {
        let when = chrono::DateTime::from_timestamp(entry.timestamp, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());
        let severity = Severity::from_wire(entry.severity)
            .map(|s| s.label())
            .unwrap_or("?");
        println!(
            "{:>8}  {}  {:<9}  {:<12}  {}",
            entry.id, when, severity, entry.entry_type, entry.message
        );
    }
}

/// Initialize a new config file with commented starter values.
pub fn init_config(config_path: &str) -> anyhow::Result<()> {
    if Path::new(config_path).exists() {
        println!("Config file '{}' already exists.", config_path);
        return Ok(());
    }

    let config = Config::default();
    config
        .save(config_path)
        .with_context(|| format!("Failed to write config to '{}'", config_path))?;

    // Append commented-out optional settings
    use std::fs::OpenOptions;
    let mut file = OpenOptions::new()
        .append(true)
        .open(config_path)
        .with_context(|| format!("Failed to append to '{}'", config_path))?;
    writeln!(file, "\n# Default row cap for purges (uncapped if unset)")?;
    writeln!(file, "# purge_cap = 1000")?;
    writeln!(file, "\n# Allow editing stored filters in place")?;
    writeln!(file, "# can_edit_filters = true")?;

    println!("Created {config_path}.");
    println!("\nNext steps:");
    println!("  1. Point 'socket' at the log store daemon");
    println!("  2. Run 'lsv list' to fetch the newest entries");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OpKind;
    use crate::form::Mode;

    fn test_config() -> Config {
        Config {
            token: "tok".to_string(),
            filters: vec!["errors_today".to_string()],
            can_edit_filters: true,
            ..Config::default()
        }
    }

    #[test]
    fn parse_order_defaults_to_ascending() {
        let entry = parse_order("severity").unwrap();
        assert_eq!(entry.field, OrderField::Severity);
        assert_eq!(entry.direction, SortDirection::Asc);

        let entry = parse_order("time:desc").unwrap();
        assert_eq!(entry.direction, SortDirection::Desc);

        assert!(parse_order("wid:asc").is_err());
        assert!(parse_order("time:sideways").is_err());
    }

    #[test]
    fn session_for_rejects_unknown_filters() {
        let config = test_config();
        assert!(session_for(&config, Some("nope")).is_err());
        let session = session_for(&config, Some("errors_today")).unwrap();
        assert_eq!(session.mode.mode, Mode::Stored);
    }

    #[test]
    fn criteria_flags_flow_through_validation() {
        let config = test_config();
        let mut driver = Driver::new(session_for(&config, None).unwrap(), true);
        let args = CriteriaArgs {
            severity: vec!["error".to_string()],
            uid: Some("42".to_string()),
            ..CriteriaArgs::default()
        };
        apply_criteria(&mut driver, &args).unwrap();
        assert_eq!(driver.session.mode.mode, Mode::Adhoc);
        assert!(!driver.session.criteria.severity.is_any());
    }

    #[test]
    fn invalid_flag_values_abort() {
        let config = test_config();
        let mut driver = Driver::new(session_for(&config, None).unwrap(), true);
        let args = CriteriaArgs {
            uid: Some("0".to_string()),
            ..CriteriaArgs::default()
        };
        assert!(apply_criteria(&mut driver, &args).is_err());
    }

    #[test]
    fn purge_with_yes_builds_a_delete_request() {
        let config = test_config();
        let mut driver = Driver::new(session_for(&config, None).unwrap(), true);
        let args = CriteriaArgs {
            severity: vec!["debug".to_string()],
            ..CriteriaArgs::default()
        };
        apply_criteria(&mut driver, &args).unwrap();
        match driver.feed(FormEvent::Purge { max: Some(100) }).unwrap() {
            Step::Request(request) => {
                assert_eq!(request.op, OpKind::DeleteLogs);
                assert_eq!(request.args["max"], 100);
            }
            other => panic!("expected a request, got {other:?}"),
        }
    }
}
