//! Single-link commands: add, get, list

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{Shortened, ShorteningService};

pub async fn add_link(service: &ShorteningService, url: &str, owner: &str) -> Result<(), CliError> {
    match service.add(url, owner).await? {
        Shortened::Created(code) => println!(
            "{} Added short link: {} -> {}",
            "✓".bold().green(),
            code.cyan(),
            url.blue().underline()
        ),
        Shortened::Existing(code) => println!(
            "{} Already shortened: {} -> {}",
            "ℹ".bold().blue(),
            code.cyan(),
            url.blue().underline()
        ),
    }
    Ok(())
}

pub async fn get_link(service: &ShorteningService, code: &str) -> Result<(), CliError> {
    let url = service.get(code).await?;
    println!("{}", url);
    Ok(())
}

pub async fn list_links(service: &ShorteningService, owner: &str) -> Result<(), CliError> {
    let links = match service.get_all(owner).await {
        Ok(links) => links,
        Err(e) if e.is_not_found() => {
            println!("{} No short links for {}", "ℹ".bold().blue(), owner.cyan());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut codes: Vec<&String> = links.keys().collect();
    codes.sort();

    println!("{}", "Short link list:".bold().green());
    println!();
    let mut active = 0usize;
    for code in codes {
        let stored = &links[code];
        if stored.deleted {
            println!(
                "  {} -> {} {}",
                code.dimmed(),
                stored.original_url.dimmed(),
                "(deleted)".dimmed().red()
            );
        } else {
            active += 1;
            println!(
                "  {} -> {}",
                code.cyan(),
                stored.original_url.blue().underline()
            );
        }
    }
    println!();
    println!(
        "{} Total {} short links ({} active)",
        "ℹ".bold().blue(),
        links.len().to_string().green(),
        active
    );
    Ok(())
}
