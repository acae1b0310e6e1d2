mod prompt;
// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use hotel_reservations::{
    AccountStore, CsvFileBackend, Reservation, ReservationBackend, ReservationManager,
    ReservationStore, ReservationUpdate, RoomCategory, StoreConfig,
};
use prompt::Console;
use std::io::{BufRead, Write};

/// Input ran out; the session ends quietly
#[derive(Debug, thiserror::Error)]
#[error("end of input")]
struct EndOfInput;

enum Session {
    Guest,
    User(String),
    Admin(String),
    Exit,
}

fn main() -> Result<()> {
    let config = StoreConfig::load();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let mut accounts = AccountStore::open(&config.accounts_path)?;
    accounts
        .ensure_admin(&config.admin_username, &config.admin_password)
        .context("Failed to create admin account")?;

    let store = ReservationStore::open(CsvFileBackend::new(&config.reservations_path))?;
    if !store.skipped().is_empty() {
        eprintln!(
            "⚠️  Skipped {} malformed line(s) in {}",
            store.skipped().len(),
            config.reservations_path.display()
        );
    }
    let mut manager = ReservationManager::new(store);

    let mut console = Console::stdio();

    match run_session(&mut console, &mut accounts, &mut manager) {
        Err(e) if e.is::<EndOfInput>() => Ok(()),
        other => other,
    }
}

fn run_session<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    accounts: &mut AccountStore,
    manager: &mut ReservationManager<B>,
) -> Result<()> {
    let mut session = Session::Guest;

    loop {
        session = match session {
            Session::Guest => guest_menu(console, accounts)?,
            Session::User(username) => user_menu(console, manager, username)?,
            Session::Admin(username) => admin_menu(console, manager, username)?,
            Session::Exit => {
                console.line("Goodbye!")?;
                return Ok(());
            }
        };
    }
}

// ============================================================================
// INPUT HELPERS
// ============================================================================

fn ask<R: BufRead, W: Write>(console: &mut Console<R, W>, prompt: &str) -> Result<String> {
    Ok(console.read_line(prompt)?.ok_or(EndOfInput)?)
}

fn ask_number<R: BufRead, W: Write>(console: &mut Console<R, W>, prompt: &str) -> Result<i64> {
    Ok(console.read_number(prompt)?.ok_or(EndOfInput)?)
}

fn ask_password<R: BufRead, W: Write>(console: &mut Console<R, W>, prompt: &str) -> Result<String> {
    Ok(console.read_masked(prompt)?.ok_or(EndOfInput)?)
}

/// Negative answers become 0, which is never a valid selection
fn ask_selection<R: BufRead, W: Write>(console: &mut Console<R, W>, prompt: &str) -> Result<usize> {
    let n = ask_number(console, prompt)?;
    Ok(usize::try_from(n).unwrap_or(0))
}

// ============================================================================
// GUEST
// ============================================================================

fn guest_menu<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    accounts: &mut AccountStore,
) -> Result<Session> {
    console.header("Hotel Reservation System")?;
    console.menu_option(1, "Login")?;
    console.menu_option(2, "Register")?;
    console.menu_option(3, "Exit")?;

    match ask_number(console, "\nChoose an option: ")? {
        1 => login(console, accounts),
        2 => {
            register(console, accounts)?;
            Ok(Session::Guest)
        }
        3 => Ok(Session::Exit),
        _ => {
            console.line("Invalid option.")?;
            console.pause()?;
            Ok(Session::Guest)
        }
    }
}

fn login<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    accounts: &AccountStore,
) -> Result<Session> {
    console.header("Login")?;
    let username = ask(console, "Username: ")?;
    let password = ask_password(console, "Password: ")?;

    match accounts.authenticate(&username, &password) {
        Ok(account) if account.is_admin => Ok(Session::Admin(account.username)),
        Ok(account) => Ok(Session::User(account.username)),
        Err(e) => {
            console.line(&e.to_string())?;
            console.pause()?;
            Ok(Session::Guest)
        }
    }
}

fn register<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    accounts: &mut AccountStore,
) -> Result<()> {
    console.header("Register")?;
    let username = ask(console, "Choose a username: ")?;
    let password = ask_password(console, "Choose a password: ")?;
    let confirm = ask_password(console, "Confirm password: ")?;

    if password != confirm {
        console.line("Passwords do not match.")?;
    } else {
        match accounts.register(&username, &password) {
            Ok(account) => console.line(&format!("Account {} created. You can now log in.", account.username))?,
            Err(e) => console.line(&e.to_string())?,
        }
    }

    console.pause()?;
    Ok(())
}

// ============================================================================
// USER
// ============================================================================

fn user_menu<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &mut ReservationManager<B>,
    username: String,
) -> Result<Session> {
    console.header(&format!("Welcome, {}", username))?;
    console.menu_option(1, "Book a room")?;
    console.menu_option(2, "View my reservations")?;
    console.menu_option(3, "Update a reservation")?;
    console.menu_option(4, "Cancel a reservation")?;
    console.menu_option(5, "Logout")?;

    match ask_number(console, "\nChoose an option: ")? {
        1 => book(console, manager, &username)?,
        2 => view_mine(console, manager, &username)?,
        3 => update(console, manager, &username)?,
        4 => cancel(console, manager, &username)?,
        5 => return Ok(Session::Guest),
        _ => console.line("Invalid option.")?,
    }

    console.pause()?;
    Ok(Session::User(username))
}

fn book<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &mut ReservationManager<B>,
    username: &str,
) -> Result<()> {
    console.header("Book a Room")?;
    for (i, category) in RoomCategory::ALL.iter().enumerate() {
        console.menu_option(
            i + 1,
            &format!(
                "{:<9} {:>8.2}/night  {}",
                category.as_str(),
                category.base_rate(),
                category.description()
            ),
        )?;
    }
    console.println("\nPeak season (March, April, May, December) adds 20%.")?;

    let choice = ask(console, "\nSelect room type (1-3 or name): ")?;
    let nights = ask_number(console, "Number of nights: ")?;
    let month = ask(console, "Month of stay (e.g. January): ")?;

    match manager.book(username, &choice, nights, &month) {
        Ok(r) => console.line(&format!(
            "Booked {} room for {} night(s) in {}. Total: {:.2}",
            r.category, r.nights, r.month, r.total_price
        ))?,
        Err(e) => console.line(&e.to_string())?,
    }
    Ok(())
}

fn view_mine<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &ReservationManager<B>,
    username: &str,
) -> Result<()> {
    console.header("My Reservations")?;
    print_mine(console, &manager.list_mine(username))
}

/// Numbered listing; the numbers are the display indices update/cancel take
fn print_mine<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    mine: &[Reservation],
) -> Result<()> {
    if mine.is_empty() {
        console.line("You have no reservations.")?;
        return Ok(());
    }

    console.println(&format!(
        "{:<4}{:<10}{:>7}  {:<11}{:>12}",
        "#", "Room", "Nights", "Month", "Price"
    ))?;
    for (i, r) in mine.iter().enumerate() {
        console.println(&format!(
            "{:<4}{:<10}{:>7}  {:<11}{:>12.2}",
            i + 1,
            r.category.as_str(),
            r.nights,
            r.month,
            r.total_price
        ))?;
    }
    Ok(())
}

fn update<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &mut ReservationManager<B>,
    username: &str,
) -> Result<()> {
    console.header("Update Reservation")?;
    let mine = manager.list_mine(username);
    print_mine(console, &mine)?;
    if mine.is_empty() {
        return Ok(());
    }

    let index = ask_selection(console, "\nSelect reservation to update: ")?;
    let nights = ask_number(console, "New number of nights (0 to keep current): ")?;
    let month = ask(console, "New month (blank to keep current): ")?;

    match manager.update(username, index, ReservationUpdate::from_prompt(nights, &month)) {
        Ok(r) => console.line(&format!(
            "Updated: {} night(s) in {}. New total: {:.2}",
            r.nights, r.month, r.total_price
        ))?,
        Err(e) => console.line(&e.to_string())?,
    }
    Ok(())
}

fn cancel<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &mut ReservationManager<B>,
    username: &str,
) -> Result<()> {
    console.header("Cancel Reservation")?;
    let mine = manager.list_mine(username);
    print_mine(console, &mine)?;
    if mine.is_empty() {
        return Ok(());
    }

    let index = ask_selection(console, "\nSelect reservation to cancel: ")?;
    let confirm = ask(console, "This cannot be undone. Cancel it? (y/n): ")?;
    if !confirm.trim().eq_ignore_ascii_case("y") {
        console.line("Nothing was cancelled.")?;
        return Ok(());
    }

    match manager.cancel(username, index) {
        Ok(r) => console.line(&format!("Cancelled {} room in {}.", r.category, r.month))?,
        Err(e) => console.line(&e.to_string())?,
    }
    Ok(())
}

// ============================================================================
// ADMIN
// ============================================================================

fn admin_menu<R: BufRead, W: Write, B: ReservationBackend>(
    console: &mut Console<R, W>,
    manager: &ReservationManager<B>,
    username: String,
) -> Result<Session> {
    console.header(&format!("Admin Panel ({})", username))?;
    console.menu_option(1, "View all reservations")?;
    console.menu_option(2, "Revenue summary")?;
    console.menu_option(3, "Logout")?;

    match ask_number(console, "\nChoose an option: ")? {
        1 => view_all(console, manager.all_reservations())?,
        2 => {
            console.header("Revenue Summary")?;
            let summary = manager.admin_summary();
            console.println(&format!("Total reservations: {}", summary.count))?;
            console.println(&format!("Total revenue:      {:.2}", summary.total_revenue))?;
        }
        3 => return Ok(Session::Guest),
        _ => console.line("Invalid option.")?,
    }

    console.pause()?;
    Ok(Session::Admin(username))
}

#[cfg(feature = "tui")]
fn view_all<R: BufRead, W: Write>(console: &mut Console<R, W>, all: &[Reservation]) -> Result<()> {
    if console.is_interactive() && !all.is_empty() {
        let mut app = ui::App::new(all.to_vec());
        return ui::run_ui(&mut app);
    }
    print_all(console, all)
}

#[cfg(not(feature = "tui"))]
fn view_all<R: BufRead, W: Write>(console: &mut Console<R, W>, all: &[Reservation]) -> Result<()> {
    print_all(console, all)
}

fn print_all<R: BufRead, W: Write>(console: &mut Console<R, W>, all: &[Reservation]) -> Result<()> {
    console.header("All Reservations")?;
    if all.is_empty() {
        console.line("No reservations yet.")?;
        return Ok(());
    }

    console.println(&format!(
        "{:<16}{:<10}{:>7}  {:<11}{:>12}",
        "Guest", "Room", "Nights", "Month", "Price"
    ))?;
    for r in all {
        console.println(&format!(
            "{:<16}{:<10}{:>7}  {:<11}{:>12.2}",
            r.owner,
            r.category.as_str(),
            r.nights,
            r.month,
            r.total_price
        ))?;
    }
    Ok(())
}
