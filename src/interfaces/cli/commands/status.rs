//! Stats and ping commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::ShorteningService;

pub async fn show_stats(service: &ShorteningService) -> Result<(), CliError> {
    let stats = service.get_stats().await?;

    println!("{}", "Storage Stats".bold().green());
    println!(
        "  {}:   {}",
        "Backend".cyan(),
        service.storage().backend_name()
    );
    println!("  {}:      {}", "URLs".cyan(), stats.total_urls);
    println!("  {}:     {}", "Users".cyan(), stats.total_users);
    Ok(())
}

pub async fn ping_storage(service: &ShorteningService) -> Result<(), CliError> {
    service.ping().await?;
    println!(
        "{} {} storage is reachable",
        "✓".bold().green(),
        service.storage().backend_name()
    );
    Ok(())
}
