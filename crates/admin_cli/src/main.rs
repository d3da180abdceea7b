use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{CategoryNew, Engine, Money, Role, SYSTEM_ACTOR, UserNew};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "simpleshop_admin")]
#[command(about = "Admin utilities for the shop back office (schema, bootstrap data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./simpleshop.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations.
    Migrate,
    User(User),
    Category(Category),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: Option<String>,
    /// USER or ADMIN.
    #[arg(long, default_value = "USER", value_parser = parse_role)]
    role: Role,
    /// Opening balance, e.g. `12.50`.
    #[arg(long, value_parser = parse_money)]
    balance: Option<Money>,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    order: Option<i64>,
    #[arg(long)]
    description: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Migrate => {
            println!("database is up to date");
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;

            let mut cmd = UserNew::new(args.username).role(args.role);
            if let Some(full_name) = args.full_name {
                cmd = cmd.full_name(full_name);
            }
            if let Some(balance) = args.balance {
                cmd = cmd.balance(balance);
            }

            let user = engine.create_user(cmd, SYSTEM_ACTOR).await?;
            println!(
                "created user: {} ({}, id {})",
                user.username,
                user.role.as_str(),
                user.id
            );
        }
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db).build().await?;

            let mut cmd = CategoryNew::new(args.name);
            if let Some(order) = args.order {
                cmd = cmd.order(order);
            }
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }

            let category = engine.create_category(cmd, SYSTEM_ACTOR).await?;
            println!("created category: {} (id {})", category.name, category.id);
        }
    }

    Ok(())
}
