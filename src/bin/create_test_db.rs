use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use spendwise::{
    Amount, BudgetGoalFields, Category, Email, PasswordHash, SQLiteTransactionStore,
    TransactionFields, TransactionStore, TransactionType, ValidatedPassword, create_user,
    initialize_db, set_budget_goal,
};

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "test";

/// A utility for creating a test database for the SpendWise server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {DEMO_EMAIL} with password '{DEMO_PASSWORD}'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Email::new(DEMO_EMAIL)?, password_hash, None, &conn)?;

    println!("Creating budget goals...");

    for (category, cents) in [
        (Category::Food, 40_000),
        (Category::Transport, 15_000),
        (Category::Entertainment, 10_000),
        (Category::Rent, 180_000),
    ] {
        set_budget_goal(
            user.id,
            BudgetGoalFields {
                category,
                goal: Amount::from_cents(cents),
            },
            &conn,
        )?;
    }

    println!("Creating transactions...");

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let now = OffsetDateTime::now_utc();
    let today = now.date();

    for fields in demo_transactions(today) {
        store.create(user.id, fields, now)?;
    }

    println!("Success!");

    Ok(())
}

fn demo_transactions(today: Date) -> Vec<TransactionFields> {
    let entry = |transaction_type, cents, category, description: &str, days_ago| {
        TransactionFields {
            transaction_type,
            amount: Amount::from_cents(cents),
            category,
            description: description.to_owned(),
            date: today - Duration::days(days_ago),
        }
    };

    vec![
        entry(TransactionType::Income, 500_000, Category::Salary, "Monthly salary", 28),
        entry(TransactionType::Expense, 180_000, Category::Rent, "Rent", 27),
        entry(TransactionType::Expense, 12_345, Category::Food, "Groceries", 20),
        entry(TransactionType::Expense, 4_500, Category::Transport, "Bus pass", 18),
        entry(TransactionType::Expense, 8_999, Category::Utilities, "Electricity", 15),
        entry(TransactionType::Income, 25_000, Category::Investments, "Dividends", 12),
        entry(TransactionType::Expense, 3_250, Category::Entertainment, "Cinema", 9),
        entry(TransactionType::Expense, 15_075, Category::Shopping, "New shoes", 6),
        entry(TransactionType::Expense, 9_850, Category::Food, "Dinner out", 3),
        entry(TransactionType::Expense, 350, Category::Food, "Coffee", 0),
    ]
}
