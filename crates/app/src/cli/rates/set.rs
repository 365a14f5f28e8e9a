use aurum::metals::Metal;
use aurum_app::{
    access::UserUuid,
    database::{self, Db},
    domain::rates::{PgRatesRepository, RatesRepository},
};
use clap::Args;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct SetRateArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Metal name: gold, silver, platinum or palladium
    #[arg(long)]
    metal: Metal,

    /// Price of one gram of the pure metal
    #[arg(long)]
    price: Decimal,

    /// Operator recorded against the change
    #[arg(long)]
    updated_by: Uuid,
}

pub(crate) async fn run(args: SetRateArgs) -> Result<(), String> {
    if args.price <= Decimal::ZERO {
        return Err("price must be greater than zero".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let stored = PgRatesRepository::new(Db::new(pool))
        .upsert_stored_rate(args.metal, args.price, UserUuid::from_uuid(args.updated_by))
        .await
        .map_err(|error| format!("failed to store rate: {error}"))?;

    println!("metal: {}", stored.metal);
    println!("price_per_gram: {}", stored.price_per_gram);
    println!("updated_at: {}", stored.updated_at);

    Ok(())
}
