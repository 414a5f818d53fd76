//! CLI binary for browsing a ledger snapshot stored as JSON.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use ledger_engine::aggregate::{self, CategorySpend};
use ledger_engine::models::{EntryKind, Wallet};
use ledger_engine::query::{self, FilterToken};
use ledger_engine::snapshot::Snapshot;
use ledger_engine::views::{self, CategoryCard, Dashboard, TransactionRow};
use ledger_engine::window::TimeWindow;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Number of categories shown on the summary screen.
const SUMMARY_TOP: usize = 3;

/// Number of recent transactions shown on the summary screen.
const SUMMARY_RECENT: usize = 5;

/// Ledger CLI: balances, spending and category rankings from a JSON
/// snapshot.
#[derive(Debug, Parser)]
#[command(name = "ledger", version, about)]
struct Cli {
    /// Ledger JSON file holding `wallets`, `categories` and `transactions`.
    #[arg(long, env = "LEDGER_FILE", value_name = "PATH")]
    file: PathBuf,
    /// Time zone for calendar boundaries (IANA name such as
    /// `Asia/Ho_Chi_Minh`, or `UTC`).
    #[arg(long, env = "LEDGER_TZ", value_name = "ZONE", value_parser = parse_tz)]
    tz: Tz,
    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Net worth, today's spending and this week's top categories.
    Summary,
    /// List all wallets.
    Wallets,
    /// List all categories with their hierarchy.
    Categories,
    /// List transactions, most recent first.
    Transactions(TransactionArgs),
    /// Total expense between two dates.
    Spending(RangeArgs),
    /// Rank root categories by expense.
    Top(TopArgs),
}

/// Arguments for the `transactions` subcommand.
#[derive(Debug, Args)]
struct TransactionArgs {
    /// One of `all`, `today`, `income` or `expense`.
    #[arg(long, default_value = "all")]
    filter: String,
}

/// Arguments for the `spending` subcommand.
#[derive(Debug, Args)]
struct RangeArgs {
    /// Start date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: NaiveDate,
    /// End date (exclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: NaiveDate,
}

/// Arguments for the `top` subcommand.
#[derive(Debug, Args)]
struct TopArgs {
    /// Maximum number of categories to show.
    #[arg(short, default_value_t = SUMMARY_TOP)]
    n: usize,
    /// Start date (inclusive, YYYY-MM-DD). Defaults to the current week.
    #[arg(long, requires = "to", value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// End date (exclusive, YYYY-MM-DD). Requires --from.
    #[arg(long, requires = "from", value_parser = parse_date)]
    to: Option<NaiveDate>,
}

/// Everything a subcommand needs to answer a query.
#[derive(Debug)]
struct Context {
    /// The validated ledger.
    snapshot: Snapshot,
    /// Caller's time zone.
    tz: Tz,
    /// The instant treated as "now" for the whole invocation.
    now: DateTime<Utc>,
    /// Emit JSON instead of tables.
    json: bool,
}

/// JSON shape of the `spending` subcommand.
#[derive(Debug, Serialize)]
struct SpendingReport {
    /// Inclusive start date.
    from: NaiveDate,
    /// Exclusive end date.
    to: NaiveDate,
    /// Summed expense.
    amount: i64,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses an IANA time zone name for clap.
fn parse_tz(s: &str) -> Result<Tz, String> {
    s.trim()
        .parse::<Tz>()
        .map_err(|err| format!("unknown time zone `{s}`: {err}"))
}

/// Formats an amount with `.` as thousands separator.
fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped: Vec<char> = Vec::with_capacity(digits.len() * 2);
    for (position, digit) in digits.chars().rev().enumerate() {
        if position > 0 && position % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let body: String = grouped.into_iter().rev().collect();
    if amount < 0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Formats a signed amount with an explicit `+` for positive values.
fn format_signed(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_amount(amount))
    } else {
        format_amount(amount)
    }
}

/// Reads and validates the ledger file, printing an error on failure.
fn load_snapshot(path: &Path) -> io::Result<Option<Snapshot>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to read {}: {err}",
                "error:".red().bold(),
                path.display()
            )?;
            return Ok(None);
        }
    };

    match Snapshot::from_json(&raw) {
        Ok(snapshot) => {
            tracing::debug!(path = %path.display(), "loaded ledger");
            Ok(Some(snapshot))
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} invalid ledger {}: {err}",
                "error:".red().bold(),
                path.display()
            )?;
            Ok(None)
        }
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(snapshot) = load_snapshot(&cli.file)? else {
        return Ok(ExitCode::FAILURE);
    };

    let ctx = Context {
        snapshot,
        tz: cli.tz,
        now: Utc::now(),
        json: cli.json,
    };
    dispatch(&ctx, &cli.command)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(ctx: &Context, command: &Command) -> io::Result<ExitCode> {
    match *command {
        Command::Summary => cmd_summary(ctx),
        Command::Wallets => cmd_wallets(ctx),
        Command::Categories => cmd_categories(ctx),
        Command::Transactions(ref args) => cmd_transactions(ctx, args),
        Command::Spending(ref args) => cmd_spending(ctx, args),
        Command::Top(ref args) => cmd_top(ctx, args),
    }
}

/// Executes the `summary` subcommand.
fn cmd_summary(ctx: &Context) -> io::Result<ExitCode> {
    let board = views::dashboard(&ctx.snapshot, ctx.now, &ctx.tz, SUMMARY_TOP, SUMMARY_RECENT);
    if ctx.json {
        print_json(&board)?;
    } else {
        print_dashboard(&board, &ctx.tz)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `wallets` subcommand.
fn cmd_wallets(ctx: &Context) -> io::Result<ExitCode> {
    let wallets = ctx.snapshot.wallets();
    if ctx.json {
        print_json(wallets)?;
    } else {
        print_wallets_table(wallets, &ctx.tz)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `categories` subcommand.
fn cmd_categories(ctx: &Context) -> io::Result<ExitCode> {
    let cards = views::category_cards(&ctx.snapshot);
    if ctx.json {
        print_json(&cards)?;
    } else {
        print_categories_table(&cards)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `transactions` subcommand.
fn cmd_transactions(ctx: &Context, args: &TransactionArgs) -> io::Result<ExitCode> {
    match query::filter_transactions(&ctx.snapshot, &args.filter, ctx.now, &ctx.tz) {
        Ok(txs) => {
            let rows = views::transaction_rows(&ctx.snapshot, &txs);
            if ctx.json {
                print_json(&rows)?;
            } else {
                print_transactions_table(&rows, &ctx.tz)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let tokens: Vec<&str> = FilterToken::ALL.iter().map(|token| token.as_str()).collect();
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{} {err}", "error:".red().bold())?;
            writeln!(stderr, "  {} use one of {}", "hint:".cyan(), tokens.join(", "))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `spending` subcommand.
fn cmd_spending(ctx: &Context, args: &RangeArgs) -> io::Result<ExitCode> {
    let amount = aggregate::spending_in_window(&ctx.snapshot, args.from, args.to, &ctx.tz);
    if ctx.json {
        print_json(&SpendingReport {
            from: args.from,
            to: args.to,
            amount,
        })?;
    } else {
        writeln!(
            io::stdout().lock(),
            "{} {} {}",
            "Spending".green().bold(),
            format_args!("({} to {})", args.from, args.to).dimmed(),
            format_amount(amount).red()
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `top` subcommand.
fn cmd_top(ctx: &Context, args: &TopArgs) -> io::Result<ExitCode> {
    let (window, label) = match args.from.zip(args.to) {
        Some((from, to)) => (
            TimeWindow::from_dates(from, to, &ctx.tz),
            format!("{from} to {to}"),
        ),
        None => (TimeWindow::week_of(ctx.now, &ctx.tz), "this week".to_owned()),
    };
    let ranked = aggregate::top_categories_by_spend(&ctx.snapshot, args.n, &window);
    if ctx.json {
        print_json(&ranked)?;
    } else {
        print_top_table(&ranked, &label)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints any serializable value as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

/// Colours an amount cell by entry kind.
fn amount_cell(amount: i64, kind: EntryKind) -> Cell {
    let cell = Cell::new(format_signed(amount));
    match kind {
        EntryKind::Income => cell.fg(Color::Green),
        EntryKind::Expense => cell.fg(Color::Red),
    }
}

/// Prints the summary screen.
fn print_dashboard(board: &Dashboard<'_>, tz: &Tz) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Summary".green().bold())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "Total balance:".bold(),
        format_amount(board.total_balance)
    )?;
    writeln!(
        out,
        "  {} {}",
        "Spent today:".bold(),
        format_amount(board.spending_today).red()
    )?;
    writeln!(
        out,
        "  {} {} / {}",
        "This week:".bold(),
        format_signed(board.income_this_week).green(),
        format_amount(-board.spending_this_week).red()
    )?;
    writeln!(out)?;
    drop(out);

    print_top_table(&board.top_categories, "this week")?;
    print_transactions_table(&board.recent, tz)
}

/// Prints wallets in a table.
fn print_wallets_table(wallets: &[Wallet], tz: &Tz) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if wallets.is_empty() {
        writeln!(out, "{}", "No wallets found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
        Cell::new("Updated").fg(Color::Cyan),
    ]);

    for wallet in wallets {
        _ = table.add_row(vec![
            Cell::new(&wallet.name),
            Cell::new(wallet.kind),
            Cell::new(format_amount(wallet.balance)),
            Cell::new(wallet.updated_at.with_timezone(tz).format("%Y-%m-%d %H:%M")),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Wallets".green().bold(),
        format_args!("({})", wallets.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints category cards in a table.
fn print_categories_table(cards: &[CategoryCard<'_>]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if cards.is_empty() {
        writeln!(out, "{}", "No categories found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Icon").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Parent").fg(Color::Cyan),
        Cell::new("Children").fg(Color::Cyan),
    ]);

    for card in cards {
        let kind_cell = match card.kind() {
            EntryKind::Income => Cell::new(card.kind()).fg(Color::Green),
            EntryKind::Expense => Cell::new(card.kind()).fg(Color::Red),
        };
        _ = table.add_row(vec![
            Cell::new(&card.category.icon),
            Cell::new(&card.category.name),
            kind_cell,
            Cell::new(card.parent_name.unwrap_or("\u{2014}")),
            Cell::new(card.children),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Categories".green().bold(),
        format_args!("({})", cards.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints transaction rows in a table.
fn print_transactions_table(rows: &[TransactionRow<'_>], tz: &Tz) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Wallet").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
    ]);

    for row in rows {
        let tx = row.transaction;
        let category = row.sub_category_name.map_or_else(
            || format!("{} {}", row.icon, row.category_name),
            |sub| format!("{} {} / {sub}", row.icon, row.category_name),
        );
        _ = table.add_row(vec![
            Cell::new(tx.date.with_timezone(tz).format("%Y-%m-%d %H:%M")),
            Cell::new(category),
            Cell::new(row.wallet_name),
            amount_cell(row.signed_amount, tx.kind),
            Cell::new(&tx.description),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", rows.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints ranked category spend in a table.
fn print_top_table(ranked: &[CategorySpend<'_>], label: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if ranked.is_empty() {
        writeln!(out, "{}", format_args!("No spending {label}.").dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Spent").fg(Color::Cyan),
    ]);

    for (rank, entry) in (1_usize..).zip(ranked) {
        _ = table.add_row(vec![
            Cell::new(rank),
            Cell::new(format!("{} {}", entry.category.icon, entry.category.name)),
            Cell::new(format_amount(entry.amount)).fg(Color::Red),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Top categories".green().bold(),
        format_args!("({label})").dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // If stderr itself failed there is nowhere left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
