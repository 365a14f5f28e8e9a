use clap::{Parser, Subcommand};

mod db;
mod rates;

#[derive(Debug, Parser)]
#[command(name = "aurum-app", about = "Aurum operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rates(rates::RatesCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Rates(command) => rates::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
