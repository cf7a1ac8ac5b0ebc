use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

const DEFAULT_DB_URL: &str = "sqlite:./gruzzolo.db?mode=rwc";

fn usage() -> ! {
    eprintln!("usage: migration [up|down|fresh|status] [database-url]");
    eprintln!("defaults: up, $DATABASE_URL or {DEFAULT_DB_URL}");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, url_arg) = match args.as_slice() {
        [] => ("up".to_string(), None),
        [command] => (command.clone(), None),
        [command, url] => (command.clone(), Some(url.clone())),
        _ => usage(),
    };

    let db_url = url_arg
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, None).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "status" => Migrator::status(&db).await?,
        _ => usage(),
    }

    Ok(())
}
