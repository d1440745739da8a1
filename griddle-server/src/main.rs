use clap::{Parser, Subcommand};
use griddle::{AnalyticsConfig, MigrateOptions, Migrator};
use griddle_http::serve;

#[derive(Parser)]
#[command(name = "griddle")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, env = "GRIDDLE_BIND_ADDR", default_value = "127.0.0.1:8200")]
    bind_addr: String,
}

#[derive(Subcommand)]
enum Command {
    /// Bring both backends' schema up to date
    MigrateDatabase {
        /// Database state will be brought to the state after that migration
        #[arg(long, default_value_t = 9999)]
        upto: u32,
        /// Exit with a non-zero status if unapplied migrations exist
        #[arg(long)]
        check: bool,
        /// Show the migration actions that would be performed
        #[arg(long)]
        plan: bool,
        /// With --plan or --check: also print SQL for each step
        #[arg(long)]
        print_sql: bool,
    },
}

async fn run_migrate(opts: MigrateOptions) -> Result<i32, Box<dyn std::error::Error>> {
    let config = AnalyticsConfig::from_env();
    let context = std::sync::Arc::new(griddle::store::connect(&config).await?);
    let migrator = Migrator::new(context, &config);

    let report = migrator.migrate(&opts).await?;
    for step in &report.planned {
        println!("[{}] step {}: {}", step.backend, step.version, step.name);
        if let Some(sql) = &step.sql {
            println!("{}", sql);
        }
    }
    if report.planned.is_empty() {
        println!("migrations up to date");
    }
    Ok(report.status.code())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::MigrateDatabase {
            upto,
            check,
            plan,
            print_sql,
        }) => {
            let code = run_migrate(MigrateOptions {
                upto,
                check,
                plan,
                print_sql,
            })
            .await?;
            std::process::exit(code);
        }
        None => serve(&cli.bind_addr).await,
    }
}
