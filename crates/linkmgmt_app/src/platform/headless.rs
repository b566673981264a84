//! Non-interactive commands: `list`, `scrape` and `register`.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use linkmgmt_core::{validate_url, Link};
use linkmgmt_engine::{
    ApiError, JobEvent, LinkApi, ReqwestLinkApi, ReqwestScraper, ScrapeOrchestrator,
    ScrapeResponse, UserRecord,
};
use linkmgmt_logging::{lm_info, lm_warn};

use super::config::Config;
use super::effects::map_record;

const URL_WIDTH: usize = 50;
const TEXT_PREVIEW: usize = 500;

pub async fn list_links(api: &dyn LinkApi) -> anyhow::Result<()> {
    let links: Vec<Link> = api
        .list_links()
        .await
        .context("failed to list links")?
        .into_iter()
        .map(map_record)
        .collect();
    print!("{}", format_table(&links));
    Ok(())
}

/// Renders links as a plain aligned table followed by a total.
pub fn format_table(links: &[Link]) -> String {
    if links.is_empty() {
        return "No links found.\n".to_string();
    }

    let rows: Vec<[String; 4]> = links
        .iter()
        .map(|link| {
            [
                short_id(&link.id),
                truncate(&link.url, URL_WIDTH),
                link.display_title().to_string(),
                link.created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    let header = ["ID", "URL", "Title", "Created"].map(str::to_string);
    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("\nYour Links\n\n");
    let rule = widths.map(|width| "─".repeat(width));
    for row in std::iter::once(&header)
        .chain(std::iter::once(&rule))
        .chain(&rows)
    {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, width))
            .collect();
        let _ = writeln!(out, "{}", cells.join("   ").trim_end());
    }
    let _ = writeln!(out, "\nTotal: {} link(s)", links.len());
    out
}

/// Runs one scrape through the orchestrator, printing progress to stderr
/// and the extracted content to stdout.
pub async fn scrape_url(
    scraper: &ReqwestScraper,
    orchestrator: &ScrapeOrchestrator,
    raw_url: &str,
    timeout: Duration,
) -> anyhow::Result<()> {
    let url = validate_url(raw_url)?;

    eprint!("Checking scraper service... ");
    if let Err(err) = scraper.check_health().await {
        eprintln!("✗");
        bail!("scraper service unavailable: {err}\n\nPlease check if the service is running");
    }
    eprintln!("✓");

    let mut job = orchestrator.start(1, url, timeout);
    while let Some(event) = job.bridge.next().await {
        match event {
            JobEvent::Progress { stage, message, .. } => eprintln!("  [{stage}] {message}"),
            JobEvent::Finished {
                elapsed, result, ..
            } => {
                let page = result.context("scraping failed")?;
                lm_info!("Scrape finished in {elapsed:?}");
                print!("{}", format_scrape_result(&page));
                return Ok(());
            }
        }
    }
    bail!("scrape job ended without a result")
}

/// Creates an account for `email` and stores the returned API key in the config file.
pub async fn register_user(
    api: &ReqwestLinkApi,
    config: &mut Config,
    config_path: &Path,
    email: &str,
) -> anyhow::Result<()> {
    let email = email.trim();
    if email.is_empty() {
        bail!("email is required");
    }
    let user = api
        .create_user(email)
        .await
        .map_err(explain_registration_error)?;
    lm_info!("Registered user {}", user.id);
    config
        .remember_api_key(config_path, &user.api_key)
        .context("failed to save API key")?;
    print!("{}", format_registration(&user));
    Ok(())
}

/// Turns a failed registration into an error with a hint for missing migrations.
pub fn explain_registration_error(err: ApiError) -> anyhow::Error {
    if let ApiError::Status { message, .. } = &err {
        if message.contains("does not exist") {
            lm_warn!("Registration failed, users table missing: {message}");
            return anyhow::anyhow!(
                "database table 'users' does not exist. Please run migrations first.\n\n\
                 To run migrations:\n  From project root (Docker):  make migrate"
            );
        }
    }
    anyhow::Error::new(err).context("failed to register user")
}

pub fn format_registration(user: &UserRecord) -> String {
    let mut out = String::from("✓ User registered successfully!\n");
    let _ = writeln!(out, "  Email: {}", user.email);
    let _ = writeln!(out, "  User ID: {}", user.id);
    out.push_str("  API key saved to config automatically\n");
    out.push_str("\n⚠️  Save this API key securely (it won't be shown again):\n");
    let _ = writeln!(out, "  {}", user.api_key);
    out
}

pub fn format_scrape_result(page: &ScrapeResponse) -> String {
    let mut out = String::from("\n✓ Scraping successful!\n\n");
    let _ = writeln!(out, "URL: {}", page.url);
    if page.title.trim().is_empty() {
        out.push_str("Title: (no title)\n");
    } else {
        let _ = writeln!(out, "Title: {}", page.title);
    }
    if page.text.trim().is_empty() {
        out.push_str("Text: (no text content)\n");
    } else {
        let _ = writeln!(out, "Text: {}", truncate(&page.text, TEXT_PREVIEW));
        let length = page.text.chars().count();
        if length > TEXT_PREVIEW {
            let _ = writeln!(out, "\n(Text truncated, full length: {length} characters)");
        }
    }
    out
}

fn short_id(id: &str) -> String {
    if id.chars().count() <= 8 {
        return id.to_string();
    }
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let head: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    format!("{cell}{}", " ".repeat(fill))
}
