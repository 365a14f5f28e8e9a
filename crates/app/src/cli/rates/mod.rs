use clap::{Args, Subcommand};

mod set;
mod show;

#[derive(Debug, Args)]
pub(crate) struct RatesCommand {
    #[command(subcommand)]
    command: RatesSubcommand,
}

#[derive(Debug, Subcommand)]
enum RatesSubcommand {
    /// Print the merged rate table with the origin of each rate
    Show(show::ShowRatesArgs),

    /// Set the stored per-gram rate for a metal
    Set(set::SetRateArgs),
}

pub(crate) async fn run(command: RatesCommand) -> Result<(), String> {
    match command.command {
        RatesSubcommand::Show(args) => show::run(args).await,
        RatesSubcommand::Set(args) => set::run(args).await,
    }
}
