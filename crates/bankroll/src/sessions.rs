use std::collections::BTreeSet;
use std::io::IsTerminal;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};

use bankroll_logging::{LogEvent, Logger};
use bankroll_sessions::{
    bankroll_series, total_duration, BankrollPoint, DateRange, FilterCriteria, FilterField,
    KeyValueStore, KindFilter, SessionDraft, SessionKind, SessionRecord, SessionUpdate,
    SessionsState, Stats, StorageError, GAME_PRESETS, LOCATION_PRESETS, STAKES_PRESETS,
};

/// Picker entry that switches to free-text input.
const OTHER_CHOICE: &str = "Other...";

/// Number of bankroll points shown by `stats`.
const SERIES_TAIL: usize = 10;

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// Record a new session
    Add(AddArgs),

    /// List sessions, most recent first
    List(ListArgs),

    /// Show detailed session info
    Show {
        /// Session ID (launches interactive picker if omitted)
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a recorded session
    Update(UpdateArgs),

    /// Delete a session
    Delete {
        /// Session ID (launches interactive picker if omitted)
        id: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every session
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show aggregate statistics over all sessions
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the distinct values recorded for a field
    Options {
        #[arg(value_enum)]
        field: FieldChoice,
    },
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Session type (prompted if omitted)
    #[arg(long, value_enum)]
    kind: Option<KindChoice>,

    /// Where the session was played (prompted if omitted)
    #[arg(long)]
    location: Option<String>,

    /// Game variant (prompted if omitted)
    #[arg(long)]
    game: Option<String>,

    /// Stakes, e.g. 1/2 (prompted if omitted)
    #[arg(long)]
    stakes: Option<String>,

    /// Start time, RFC 3339 or YYYY-MM-DDTHH:MM in UTC (default: now)
    #[arg(long)]
    start: Option<String>,

    /// End time, same formats as --start (default: start + 5h)
    #[arg(long)]
    end: Option<String>,

    /// Amount bought in for
    #[arg(long, default_value_t = 0.0)]
    buy_in: f64,

    /// Amount cashed out
    #[arg(long, default_value_t = 0.0)]
    cash_out: f64,

    /// Total rebuys
    #[arg(long, default_value_t = 0.0)]
    rebuys: f64,

    /// Table expenses such as tips and rake (not part of profit)
    #[arg(long, default_value_t = 0.0)]
    expenses: f64,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,

    /// Tag the session (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Never prompt; missing fields are left empty
    #[arg(long)]
    no_input: bool,

    /// Print the stored session as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by session type
    #[arg(long, value_enum, default_value = "all")]
    kind: KindFilterChoice,

    /// Filter by location (repeatable, any match)
    #[arg(long = "location")]
    locations: Vec<String>,

    /// Filter by game variant (repeatable, any match)
    #[arg(long = "game")]
    games: Vec<String>,

    /// Filter by stakes (repeatable, any match)
    #[arg(long = "stakes")]
    stakes: Vec<String>,

    /// Filter by tag (repeatable, any match)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Show sessions starting on or after this date (YYYY-MM-DD)
    #[arg(long)]
    after: Option<String>,

    /// Show sessions starting on or before this date (YYYY-MM-DD)
    #[arg(long)]
    before: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Session ID (launches interactive picker if omitted)
    id: Option<String>,

    #[arg(long, value_enum)]
    kind: Option<KindChoice>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    game: Option<String>,

    #[arg(long)]
    stakes: Option<String>,

    /// New start time, RFC 3339 or YYYY-MM-DDTHH:MM in UTC
    #[arg(long)]
    start: Option<String>,

    /// New end time, RFC 3339 or YYYY-MM-DDTHH:MM in UTC
    #[arg(long)]
    end: Option<String>,

    #[arg(long)]
    buy_in: Option<f64>,

    #[arg(long)]
    cash_out: Option<f64>,

    #[arg(long)]
    rebuys: Option<f64>,

    #[arg(long)]
    expenses: Option<f64>,

    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,

    /// Remove the notes
    #[arg(long)]
    clear_notes: bool,

    /// Replace the tags (repeatable)
    #[arg(long = "tag", conflicts_with = "clear_tags")]
    tags: Vec<String>,

    /// Remove every tag
    #[arg(long)]
    clear_tags: bool,

    /// Print the updated session as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindChoice {
    Cash,
    Tournament,
}

impl From<KindChoice> for SessionKind {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::Cash => SessionKind::CashGame,
            KindChoice::Tournament => SessionKind::Tournament,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum KindFilterChoice {
    #[default]
    All,
    Cash,
    Tournament,
}

impl From<KindFilterChoice> for KindFilter {
    fn from(choice: KindFilterChoice) -> Self {
        match choice {
            KindFilterChoice::All => KindFilter::All,
            KindFilterChoice::Cash => KindFilter::CashGame,
            KindFilterChoice::Tournament => KindFilter::Tournament,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldChoice {
    Location,
    Game,
    Stakes,
    Tags,
}

impl From<FieldChoice> for FilterField {
    fn from(choice: FieldChoice) -> Self {
        match choice {
            FieldChoice::Location => FilterField::Location,
            FieldChoice::Game => FilterField::GameVariant,
            FieldChoice::Stakes => FilterField::Stakes,
            FieldChoice::Tags => FilterField::Tags,
        }
    }
}

/// Output settings shared by every command.
pub struct CommandContext {
    pub currency: String,
    pub logger: Logger,
}

pub fn handle_sessions_command<B: KeyValueStore>(
    action: SessionsAction,
    state: &mut SessionsState<B>,
    ctx: &CommandContext,
) -> Result<()> {
    match action {
        SessionsAction::Add(args) => add_session(args, state, ctx)?,
        SessionsAction::List(args) => {
            let json = args.json;
            state.apply_filters(build_criteria(&args)?);
            let sessions = state.filtered_sessions();

            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("{}", "No sessions found.".dimmed());
            } else {
                print_sessions_table(&sessions, &ctx.currency);
                let active = state.filters().active_count();
                if active > 0 {
                    println!();
                    println!(
                        "{}",
                        format!(
                            "{} of {} sessions ({} filter{} active)",
                            sessions.len(),
                            state.all_sessions().len(),
                            active,
                            if active == 1 { "" } else { "s" }
                        )
                        .dimmed()
                    );
                }
            }
        }
        SessionsAction::Show { id, json } => {
            let id = resolve_session_id(state, id)?;
            let session = report(ctx, "load", state.store().get(&id))?
                .ok_or_else(|| anyhow::anyhow!("Session not found: {}", id))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                print_session_detail(&session, &ctx.currency);
            }
        }
        SessionsAction::Update(args) => {
            let update = build_update(&args)?;
            let id = resolve_session_id(state, args.id)?;
            let record = report(ctx, "update", state.update_session(&id, &update))?;

            ctx.logger.log(&LogEvent::SessionUpdated {
                id: record.id.clone(),
                profit: record.profit,
            });
            if args.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
        SessionsAction::Delete { id, yes } => {
            let id = resolve_session_id(state, id)?;
            if !confirm(&format!("Delete session {}?", id), yes)? {
                println!("{}", "Aborted.".dimmed());
                return Ok(());
            }
            let existed = report(ctx, "delete", state.delete_session(&id))?;
            ctx.logger.log(&LogEvent::SessionDeleted { id, existed });
        }
        SessionsAction::Clear { yes } => {
            let count = state.all_sessions().len();
            if !confirm(&format!("Delete all {} sessions?", count), yes)? {
                println!("{}", "Aborted.".dimmed());
                return Ok(());
            }
            report(ctx, "clear", state.clear_all())?;
            ctx.logger.log(&LogEvent::SessionsCleared);
        }
        SessionsAction::Stats { json } => {
            let stats = state.stats();
            let series = bankroll_series(state.all_sessions());
            let played = total_duration(state.all_sessions());

            if json {
                let value = serde_json::json!({
                    "stats": stats,
                    "totalMinutes": played.num_minutes(),
                    "bankroll": series,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_stats(&stats, &series, played, &ctx.currency);
            }
        }
        SessionsAction::Options { field } => {
            let values = state.available_values(field.into());
            if values.is_empty() {
                println!("{}", "No values recorded yet.".dimmed());
            }
            for value in values {
                println!("{}", value);
            }
        }
    }

    Ok(())
}

fn add_session<B: KeyValueStore>(
    args: AddArgs,
    state: &mut SessionsState<B>,
    ctx: &CommandContext,
) -> Result<()> {
    let interactive = !args.no_input && std::io::stdin().is_terminal();

    let start = args
        .start
        .as_deref()
        .map(|s| parse_datetime(s, "--start"))
        .transpose()?
        .unwrap_or_else(Utc::now);
    let mut draft = SessionDraft::starting_at(start);
    if let Some(ref end) = args.end {
        draft.end_time = parse_datetime(end, "--end")?;
    }

    draft.kind = match args.kind {
        Some(kind) => kind.into(),
        None if interactive => pick_kind()?,
        None => SessionKind::Unset,
    };
    draft.location = resolve_field(
        args.location,
        "Location",
        LOCATION_PRESETS,
        state.available_values(FilterField::Location),
        interactive,
    )?;
    draft.game_variant = resolve_field(
        args.game,
        "Game",
        GAME_PRESETS,
        state.available_values(FilterField::GameVariant),
        interactive,
    )?;
    draft.stakes = resolve_field(
        args.stakes,
        "Stakes",
        STAKES_PRESETS,
        state.available_values(FilterField::Stakes),
        interactive,
    )?;

    draft.buy_in = args.buy_in;
    draft.cash_out = args.cash_out;
    draft.rebuys = args.rebuys;
    draft.table_expenses = args.expenses;
    draft.notes = args.notes.filter(|n| !n.trim().is_empty());
    for tag in &args.tags {
        draft.add_tag(tag);
    }

    draft.validate()?;

    let record = report(ctx, "save", state.add_session(draft))?;
    ctx.logger.log(&LogEvent::SessionSaved {
        id: record.id.clone(),
        location: record.location.clone(),
        stakes: record.stakes.clone(),
        duration: record.duration_label.clone(),
        profit: record.profit,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

/// Log a failed store operation before handing the error to the caller.
fn report<T>(ctx: &CommandContext, operation: &str, result: Result<T, StorageError>) -> Result<T> {
    result.map_err(|e| {
        ctx.logger.log(&LogEvent::OperationFailed {
            operation: operation.to_string(),
            error: e.to_string(),
        });
        e.into()
    })
}

fn build_criteria(args: &ListArgs) -> Result<FilterCriteria> {
    let start = args
        .after
        .as_deref()
        .map(|s| parse_day_start(s, "--after"))
        .transpose()?;

    let end = args
        .before
        .as_deref()
        .map(|s| parse_day_start(s, "--before"))
        .transpose()?
        .map(|d| d + Duration::days(1) - Duration::milliseconds(1));

    let date_range = if start.is_some() || end.is_some() {
        Some(DateRange { start, end })
    } else {
        None
    };

    Ok(FilterCriteria {
        kind: args.kind.into(),
        locations: args.locations.iter().cloned().collect(),
        game_variants: args.games.iter().cloned().collect(),
        stakes: args.stakes.iter().cloned().collect(),
        tags: args.tags.iter().cloned().collect(),
        date_range,
    })
}

fn build_update(args: &UpdateArgs) -> Result<SessionUpdate> {
    let mut update = SessionUpdate::new();

    if let Some(kind) = args.kind {
        update = update.kind(kind.into());
    }
    if let Some(ref location) = args.location {
        update = update.location(location.as_str());
    }
    if let Some(ref game) = args.game {
        update = update.game_variant(game.as_str());
    }
    if let Some(ref stakes) = args.stakes {
        update = update.stakes(stakes.as_str());
    }
    if let Some(ref start) = args.start {
        update = update.start_time(parse_datetime(start, "--start")?);
    }
    if let Some(ref end) = args.end {
        update = update.end_time(parse_datetime(end, "--end")?);
    }
    if let Some(amount) = args.buy_in {
        update = update.buy_in(amount);
    }
    if let Some(amount) = args.cash_out {
        update = update.cash_out(amount);
    }
    if let Some(amount) = args.rebuys {
        update = update.rebuys(amount);
    }
    if let Some(amount) = args.expenses {
        update = update.table_expenses(amount);
    }
    if let Some(ref notes) = args.notes {
        update = update.notes(notes.as_str());
    }
    if args.clear_notes {
        update = update.clear_notes();
    }
    if args.clear_tags {
        update = update.tags(Vec::<String>::new());
    } else if !args.tags.is_empty() {
        update = update.tags(args.tags.iter().cloned());
    }

    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field to change.");
    }
    Ok(update)
}

fn parse_day_start(value: &str, flag: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
        .map_err(|e| anyhow::anyhow!("Invalid {} date: {}", flag, e))
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM` taken as UTC.
fn parse_datetime(value: &str, flag: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    anyhow::bail!(
        "Invalid {} time '{}': expected RFC 3339 or YYYY-MM-DDTHH:MM",
        flag,
        value
    )
}

fn resolve_field(
    value: Option<String>,
    prompt: &str,
    presets: &[&str],
    known: BTreeSet<String>,
    interactive: bool,
) -> Result<String> {
    match value {
        Some(value) => Ok(value.trim().to_string()),
        None if interactive => pick_value(prompt, presets, known),
        None => Ok(String::new()),
    }
}

/// Presets first, then previously recorded values not already offered.
fn choice_items(presets: &[&str], known: BTreeSet<String>) -> Vec<String> {
    let mut items: Vec<String> = presets.iter().map(|p| p.to_string()).collect();
    for value in known {
        if !items.contains(&value) {
            items.push(value);
        }
    }
    items
}

fn pick_value(prompt: &str, presets: &[&str], known: BTreeSet<String>) -> Result<String> {
    let mut items = choice_items(presets, known);
    items.push(OTHER_CHOICE.to_string());

    let selection = dialoguer::FuzzySelect::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    if selection + 1 == items.len() {
        let value: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()?;
        return Ok(value.trim().to_string());
    }

    Ok(items.swap_remove(selection))
}

fn pick_kind() -> Result<SessionKind> {
    let kinds = [SessionKind::CashGame, SessionKind::Tournament];
    let items: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();

    let selection = dialoguer::Select::new()
        .with_prompt("Session type")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(kinds[selection])
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Refusing to continue without confirmation. Pass --yes.");
    }

    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn resolve_session_id<B: KeyValueStore>(
    state: &SessionsState<B>,
    id: Option<String>,
) -> Result<String> {
    if let Some(id) = id {
        return Ok(id);
    }

    let sessions = state.all_sessions();
    if sessions.is_empty() {
        anyhow::bail!("No sessions found.");
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Session ID required when not running interactively.");
    }

    let items: Vec<String> = sessions
        .iter()
        .map(|s| {
            format!(
                "{} {} | {:10} | {} {} | {}",
                s.date,
                s.time,
                s.kind.to_string(),
                truncate(&s.location, 20),
                s.stakes,
                signed_money(s.profit, "")
            )
        })
        .collect();

    let selection = dialoguer::FuzzySelect::new()
        .with_prompt("Select a session")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(sessions[selection].id.clone())
}

fn print_sessions_table(sessions: &[SessionRecord], currency: &str) {
    println!(
        "{:<10} {:<5} {:<10} {:<16} {:<18} {:<7} {:<9} {:>11} {}",
        "DATE".dimmed(),
        "TIME".dimmed(),
        "TYPE".dimmed(),
        "LOCATION".dimmed(),
        "GAME".dimmed(),
        "STAKES".dimmed(),
        "DURATION".dimmed(),
        "PROFIT".dimmed(),
        "TAGS".dimmed(),
    );

    for s in sessions {
        let profit = format!("{:>11}", signed_money(s.profit, currency));
        println!(
            "{:<10} {:<5} {:<10} {:<16} {:<18} {:<7} {:<9} {} {}",
            s.date,
            s.time,
            s.kind.to_string(),
            truncate(&s.location, 16),
            truncate(&s.game_variant, 18),
            s.stakes,
            s.duration_label,
            profit_colored(profit, s.profit),
            s.tags.join(", ").dimmed()
        );
    }
}

fn print_session_detail(session: &SessionRecord, currency: &str) {
    println!("{}", "=== Session Detail ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), session.id);
    println!(
        "{}  {}",
        "Started:".dimmed(),
        session.start_time.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "{}  {}",
        "Ended:".dimmed(),
        session.end_time.format("%Y-%m-%d %H:%M UTC")
    );
    println!("{}  {}", "Duration:".dimmed(), session.duration_label);
    println!("{}  {}", "Type:".dimmed(), session.kind);
    println!("{}  {}", "Location:".dimmed(), session.location);
    println!("{}  {}", "Game:".dimmed(), session.game_variant);
    println!("{}  {}", "Stakes:".dimmed(), session.stakes);
    println!();
    println!("{}  {}", "Buy-in:".dimmed(), money(session.buy_in, currency));
    println!("{}  {}", "Rebuys:".dimmed(), money(session.rebuys, currency));
    println!("{}  {}", "Cash-out:".dimmed(), money(session.cash_out, currency));
    println!(
        "{}  {}",
        "Expenses:".dimmed(),
        money(session.table_expenses, currency)
    );
    println!(
        "{}  {}",
        "Profit:".dimmed(),
        profit_colored(signed_money(session.profit, currency), session.profit)
    );

    if !session.tags.is_empty() {
        println!();
        println!("{}  {}", "Tags:".dimmed(), session.tags.join(", "));
    }
    if let Some(ref notes) = session.notes {
        println!();
        println!("{}", "Notes:".dimmed());
        println!("  {}", notes);
    }
}

fn print_stats(stats: &Stats, series: &[BankrollPoint], played: Duration, currency: &str) {
    println!("{}", "=== Bankroll Statistics ===".bright_blue().bold());
    println!(
        "{}  {}",
        "Total Profit:".dimmed(),
        profit_colored(signed_money(stats.total_profit, currency), stats.total_profit)
    );
    println!("{}  {}", "Sessions:".dimmed(), stats.total_sessions);
    println!("{}  {:.2}%", "Win Rate:".dimmed(), stats.win_rate);
    println!(
        "{}  {}",
        "Avg Profit:".dimmed(),
        profit_colored(signed_money(stats.average_profit, currency), stats.average_profit)
    );
    println!("{}  {}", "Time Played:".dimmed(), format_hours(played));

    let minutes = played.num_minutes();
    if minutes > 0 {
        let hourly = stats.total_profit / (minutes as f64 / 60.0);
        println!(
            "{}  {}/h",
            "Hourly:".dimmed(),
            profit_colored(signed_money(hourly, currency), hourly)
        );
    }

    if !series.is_empty() {
        println!();
        println!("{}", "Bankroll:".dimmed());
        let skip = series.len().saturating_sub(SERIES_TAIL);
        for point in &series[skip..] {
            println!(
                "  {}  {:>11}  {}",
                point.start_time.format("%Y-%m-%d"),
                signed_money(point.profit, currency),
                profit_colored(
                    signed_money(point.cumulative_profit, currency),
                    point.cumulative_profit
                )
            );
        }
        if skip > 0 {
            println!(
                "{}",
                format!("  (last {} of {} sessions)", SERIES_TAIL, series.len()).dimmed()
            );
        }
    }
}

fn money(amount: f64, currency: &str) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency, -amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

fn signed_money(amount: f64, currency: &str) -> String {
    if amount > 0.0 {
        format!("+{}", money(amount, currency))
    } else {
        money(amount, currency)
    }
}

fn profit_colored(text: String, amount: f64) -> ColoredString {
    if amount > 0.0 {
        text.bright_green()
    } else if amount < 0.0 {
        text.bright_red()
    } else {
        text.normal()
    }
}

fn format_hours(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    format!("{}h {}m", minutes.div_euclid(60), minutes.rem_euclid(60))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // ============================================================
    // Parsing
    // ============================================================

    #[test]
    fn test_parse_datetime_formats() {
        let expected = utc(2024, 1, 1, 18, 0);

        assert_eq!(parse_datetime("2024-01-01T18:00:00Z", "--start").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-01-01T20:00:00+02:00", "--start").unwrap(),
            expected
        );
        assert_eq!(parse_datetime("2024-01-01T18:00", "--start").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01 18:00", "--start").unwrap(), expected);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let err = parse_datetime("yesterday", "--end").unwrap_err();
        assert!(err.to_string().contains("--end"));
    }

    // ============================================================
    // Filters
    // ============================================================

    #[test]
    fn test_build_criteria_defaults_to_empty() {
        let criteria = build_criteria(&ListArgs::default()).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_build_criteria_collects_flags() {
        let args = ListArgs {
            kind: KindFilterChoice::Cash,
            locations: vec!["Casino".to_string(), "Casino".to_string()],
            tags: vec!["bluff".to_string()],
            ..Default::default()
        };

        let criteria = build_criteria(&args).unwrap();

        assert_eq!(criteria.kind, KindFilter::CashGame);
        assert_eq!(criteria.locations.len(), 1);
        assert!(criteria.tags.contains("bluff"));
        assert_eq!(criteria.active_count(), 3);
    }

    #[test]
    fn test_build_criteria_date_bounds_are_inclusive_days() {
        let args = ListArgs {
            after: Some("2024-01-02".to_string()),
            before: Some("2024-01-03".to_string()),
            ..Default::default()
        };

        let range = build_criteria(&args).unwrap().date_range.unwrap();

        assert!(range.contains(utc(2024, 1, 2, 0, 0)));
        assert!(range.contains(utc(2024, 1, 3, 23, 59)));
        assert!(!range.contains(utc(2024, 1, 4, 0, 0)));
        assert!(!range.contains(utc(2024, 1, 1, 23, 59)));
    }

    #[test]
    fn test_build_criteria_open_ended_range() {
        let args = ListArgs {
            after: Some("2024-01-02".to_string()),
            ..Default::default()
        };

        let range = build_criteria(&args).unwrap().date_range.unwrap();

        assert_eq!(range.end, None);
        assert!(range.contains(utc(2030, 1, 1, 0, 0)));
    }

    #[test]
    fn test_build_criteria_bad_date() {
        let args = ListArgs {
            before: Some("01/02/2024".to_string()),
            ..Default::default()
        };
        assert!(build_criteria(&args).is_err());
    }

    // ============================================================
    // Updates
    // ============================================================

    #[test]
    fn test_build_update_requires_a_field() {
        assert!(build_update(&UpdateArgs::default()).is_err());
    }

    #[test]
    fn test_build_update_maps_flags() {
        let args = UpdateArgs {
            kind: Some(KindChoice::Tournament),
            cash_out: Some(300.0),
            clear_notes: true,
            tags: vec!["deep".to_string()],
            ..Default::default()
        };

        let update = build_update(&args).unwrap();

        assert_eq!(update.kind, Some(SessionKind::Tournament));
        assert_eq!(update.cash_out, Some(300.0));
        assert_eq!(update.notes, Some(None));
        assert_eq!(update.tags, Some(vec!["deep".to_string()]));
        assert_eq!(update.buy_in, None);
    }

    #[test]
    fn test_build_update_clear_tags() {
        let args = UpdateArgs {
            clear_tags: true,
            ..Default::default()
        };

        let update = build_update(&args).unwrap();

        assert_eq!(update.tags, Some(Vec::new()));
    }

    // ============================================================
    // Formatting
    // ============================================================

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(50.0, "$"), "$50.00");
        assert_eq!(money(-12.5, "$"), "-$12.50");
        assert_eq!(signed_money(50.0, "€"), "+€50.00");
        assert_eq!(signed_money(0.0, "$"), "$0.00");
        assert_eq!(signed_money(-0.5, ""), "-0.50");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(Duration::minutes(25 * 60 + 5)), "25h 5m");
        assert_eq!(format_hours(Duration::zero()), "0h 0m");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Casino", 16), "Casino");
        assert_eq!(truncate("Bellagio Poker Room", 10), "Bellagi...");
        assert_eq!(truncate("ÉÉÉÉÉÉ", 5), "ÉÉ...");
    }

    #[test]
    fn test_choice_items_presets_first() {
        let known: BTreeSet<String> = ["Aria", "Casino"].iter().map(|s| s.to_string()).collect();

        let items = choice_items(LOCATION_PRESETS, known);

        assert_eq!(items, vec!["Home Game", "Casino", "Online", "Aria"]);
    }
}
