//! A terminal client for inspecting the remote record tables.

use std::env;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use pocketledger::{
    Repository,
    http::{HttpRecordStore, StoreConfig},
    models::{Budget, Category, SavingsGoal, Transaction, category::KIND_COLUMN},
};

/// Terminal client for the pocketledger record store.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the hosted record store.
    #[arg(long)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all budgets.
    Budgets,
    /// List categories, optionally only those of one kind.
    Categories {
        /// Only show categories of this kind, e.g. "income" or "expense".
        #[arg(long)]
        kind: Option<String>,
    },
    /// List all savings goals.
    Goals,
    /// List all transactions, newest first.
    Transactions,
    /// Delete one record.
    Delete {
        /// The table to delete from.
        #[arg(value_enum)]
        table: Table,

        /// The identifier of the record to delete.
        id: i64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Table {
    Budgets,
    Categories,
    Goals,
    Transactions,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let project_id =
        env::var("PROJECT_ID").expect("The environment variable 'PROJECT_ID' must be set");
    let public_key =
        env::var("PUBLIC_KEY").expect("The environment variable 'PUBLIC_KEY' must be set");

    let store = HttpRecordStore::new(StoreConfig {
        base_url: args.base_url,
        project_id,
        public_key,
    })
    .expect("Could not create the record store client");

    match args.command {
        Command::Budgets => {
            let repository: Repository<Budget, _> = Repository::new(store);
            let budgets = repository
                .try_list()
                .await
                .expect("Could not fetch budgets");

            for budget in budgets {
                println!(
                    "#{} {} {}: spent {:.2} of {:.2} (alert at {:.0}% via {})",
                    budget.id,
                    budget.month,
                    budget.category,
                    budget.spent,
                    budget.monthly_limit,
                    budget.alert_threshold,
                    budget.alert_methods.join(", "),
                );
            }
        }
        Command::Categories { kind } => {
            let repository: Repository<Category, _> = Repository::new(store);
            let categories = match kind {
                Some(kind) => repository.try_list_where(KIND_COLUMN, kind).await,
                None => repository.try_list().await,
            }
            .expect("Could not fetch categories");

            for category in categories {
                println!(
                    "#{} {} ({}) icon={} color={}",
                    category.id, category.name, category.kind, category.icon, category.color,
                );
            }
        }
        Command::Goals => {
            let repository: Repository<SavingsGoal, _> = Repository::new(store);
            let goals = repository
                .try_list()
                .await
                .expect("Could not fetch savings goals");

            for goal in goals {
                println!(
                    "#{} {}: {:.2} of {:.2} by {}",
                    goal.id, goal.name, goal.current_amount, goal.target_amount, goal.deadline,
                );
            }
        }
        Command::Transactions => {
            let repository: Repository<Transaction, _> = Repository::new(store);
            let transactions = repository
                .try_list()
                .await
                .expect("Could not fetch transactions");

            for transaction in transactions {
                println!(
                    "#{} {} {} {:.2} ({}) {}",
                    transaction.id,
                    transaction.date,
                    transaction.kind,
                    transaction.amount,
                    transaction.category,
                    transaction.description,
                );
            }
        }
        Command::Delete { table, id } => {
            let deleted = match table {
                Table::Budgets => Repository::<Budget, _>::new(store).try_delete(id).await,
                Table::Categories => Repository::<Category, _>::new(store).try_delete(id).await,
                Table::Goals => Repository::<SavingsGoal, _>::new(store).try_delete(id).await,
                Table::Transactions => {
                    Repository::<Transaction, _>::new(store).try_delete(id).await
                }
            };

            match deleted {
                Ok(()) => println!("Deleted record {id}."),
                Err(error) => eprintln!("Could not delete record {id}: {error}"),
            }
        }
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter))
        .init();
}
