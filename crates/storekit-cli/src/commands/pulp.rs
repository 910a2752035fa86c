//! Pulp repository commands

use console::style;
use serde_json::Value;

use storekit_core::PulpProfile;
use storekit_pulp::{PulpClient, PulpConfig, RepositoryDetails};

use super::{PulpArgs, require};
use crate::error::{CliError, Result};

/// Build a client from flags layered over the profile
pub fn connect(args: &PulpArgs, profile: Option<&PulpProfile>) -> Result<PulpClient> {
    let endpoint = require(
        args.endpoint.as_deref(),
        profile.map(|p| p.endpoint.as_str()),
        "endpoint",
    )?;
    let username = require(
        args.username.as_deref(),
        profile.map(|p| p.username.as_str()),
        "username",
    )?;
    let password = match (&args.password, profile) {
        (Some(password), _) => password.clone(),
        (None, Some(profile)) => profile.resolve_password()?,
        (None, None) => {
            return Err(CliError::config_with_help(
                "No password configured",
                "Pass --password, set STOREKIT_PULP_PASSWORD, or add passwordEnv to the profile",
            ));
        }
    };
    let transport = args
        .transport
        .apply(profile.map(|p| p.transport.clone()).unwrap_or_default());

    let config = PulpConfig::new(endpoint, username, password).with_transport(transport);
    Ok(PulpClient::new(config)?)
}

/// Parse `KEY=VALUE` notes
fn parse_notes(notes: &[String]) -> Result<Vec<(String, String)>> {
    notes
        .iter()
        .map(|note| {
            note.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| CliError::Validation {
                    message: format!("Invalid note '{}'", note),
                    help: Some("Notes take the form KEY=VALUE".to_string()),
                })
        })
        .collect()
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_repository(repo: &RepositoryDetails) {
    println!("{}", style(&repo.id).cyan().bold());
    if let Some(name) = &repo.display_name {
        println!("  Name:        {}", name);
    }
    if let Some(description) = &repo.description {
        println!("  Description: {}", description);
    }
    if let Some(repo_type) = repo.repo_type() {
        println!("  Type:        {}", repo_type);
    }
    println!("  Units:       {}", repo.total_units());
    for (unit_type, count) in &repo.content_unit_counts {
        println!("    {:<24} {}", unit_type, count);
    }
    for distributor in &repo.distributors {
        println!(
            "  Distributor: {} ({})",
            distributor.id.as_deref().unwrap_or("-"),
            distributor.distributor_type_id.as_deref().unwrap_or("-")
        );
    }
    for importer in &repo.importers {
        println!(
            "  Importer:    {} ({})",
            importer.id.as_deref().unwrap_or("-"),
            importer.importer_type_id.as_deref().unwrap_or("-")
        );
    }
}

pub async fn login(client: &PulpClient) -> Result<()> {
    client.login().await?;
    println!(
        "{} Logged in to {} as {}",
        style("✓").green().bold(),
        client.config().endpoint,
        client.config().username
    );
    if let Some(cert) = client.session_certificate() {
        println!("{}", cert.certificate.trim());
    }
    Ok(())
}

pub async fn list_repositories(client: &PulpClient, json: bool) -> Result<()> {
    let repos = client.list_repositories().await?;
    if json {
        return print_json(&repos);
    }

    if repos.is_empty() {
        println!("No repositories.");
        return Ok(());
    }

    println!("{:<30} {:<16} {:>8}  {}", "ID", "TYPE", "UNITS", "NAME");
    println!("{}", "-".repeat(80));
    for repo in &repos {
        println!(
            "{:<30} {:<16} {:>8}  {}",
            repo.id,
            repo.repo_type().unwrap_or("-"),
            repo.total_units(),
            repo.display_name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn show_repository(client: &PulpClient, id: &str, json: bool) -> Result<()> {
    let repo = client.get_repository(id).await?;
    if json {
        return print_json(&repo);
    }
    print_repository(&repo);
    Ok(())
}

pub async fn create_repository(
    client: &PulpClient,
    id: &str,
    display_name: Option<&str>,
    description: Option<&str>,
    notes: &[String],
    json: bool,
) -> Result<()> {
    let mut details = RepositoryDetails::new(id);
    if let Some(name) = display_name {
        details = details.with_display_name(name);
    }
    if let Some(description) = description {
        details = details.with_description(description);
    }
    for (key, value) in parse_notes(notes)? {
        details.notes.insert(key, Value::String(value));
    }

    let created = client.create_repository(&details).await?;
    if json {
        return print_json(&created);
    }
    println!(
        "{} Created repository {}",
        style("✓").green().bold(),
        created.id
    );
    Ok(())
}

pub async fn list_uploads(client: &PulpClient) -> Result<()> {
    let uploads = client.list_upload_requests().await?;
    if uploads.upload_ids.is_empty() {
        println!("No open upload requests.");
        return Ok(());
    }
    for id in &uploads.upload_ids {
        println!("{}", id);
    }
    Ok(())
}

pub async fn create_upload(client: &PulpClient) -> Result<()> {
    let upload = client.create_upload_request().await?;
    println!("{}", upload.upload_id);
    Ok(())
}

pub async fn delete_upload(client: &PulpClient, upload_id: &str) -> Result<()> {
    client.delete_upload_request(upload_id).await?;
    println!(
        "{} Deleted upload request {}",
        style("✓").green().bold(),
        upload_id
    );
    Ok(())
}
