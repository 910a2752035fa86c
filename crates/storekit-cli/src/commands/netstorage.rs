//! Storage group commands

use console::style;
use futures::TryStreamExt;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::io::AsyncWriteExt;

use storekit_core::{NetStorageProfile, resolve_secret};
use storekit_netstorage::{
    EntryKind, NetStorageClient, NetStorageConfig, StorageEntry, StorageListing, UploadOptions,
};

use super::{NsArgs, require};
use crate::error::{CliError, Result};

/// Build a client from flags layered over the profile
pub fn connect(args: &NsArgs, profile: Option<&NetStorageProfile>) -> Result<NetStorageClient> {
    let host = require(args.host.as_deref(), profile.map(|p| p.host.as_str()), "host")?;
    let folder = require(
        args.folder.as_deref(),
        profile.map(|p| p.folder.as_str()),
        "folder",
    )?;
    let key_name = require(
        args.key_name.as_deref(),
        profile.map(|p| p.key_name.as_str()),
        "key_name",
    )?;

    let secret = match (&args.secret, profile) {
        (Some(secret), _) => secret.clone(),
        (None, Some(profile)) => profile.resolve_secret()?,
        (None, None) => resolve_secret(None, None, "secret")?,
    };

    let prefix = args
        .prefix
        .clone()
        .or_else(|| profile.map(|p| p.prefix.clone()))
        .unwrap_or_default();
    let transport = args
        .transport
        .apply(profile.map(|p| p.transport.clone()).unwrap_or_default());
    let insecure_http = args.insecure_http || profile.is_some_and(|p| p.insecure_http);

    let config = NetStorageConfig::new(host, folder, key_name, secret)
        .with_prefix(prefix)
        .with_insecure_http(insecure_http)
        .with_transport(transport);
    Ok(NetStorageClient::new(config)?)
}

fn kind_label(kind: &EntryKind) -> &str {
    match kind {
        EntryKind::File => "file",
        EntryKind::Dir => "dir",
        EntryKind::Symlink => "symlink",
        EntryKind::Other(other) => other,
    }
}

fn format_mtime(mtime: Option<i64>) -> String {
    mtime
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_entry(entry: &StorageEntry) {
    let name = match (&entry.kind, &entry.target) {
        (EntryKind::Symlink, Some(target)) => format!("{} -> {}", entry.name, target),
        (EntryKind::Dir, _) => format!("{}/", entry.name),
        _ => entry.name.clone(),
    };
    let size = entry
        .size
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{:<8} {:>12} {:<20} {}",
        kind_label(&entry.kind),
        size,
        format_mtime(entry.mtime),
        name
    );
}

fn print_listing(listing: &StorageListing) {
    if listing.entries.is_empty() {
        println!("{} is empty", listing.directory);
        return;
    }

    println!("{:<8} {:>12} {:<20} {}", "TYPE", "SIZE", "MODIFIED", "NAME");
    println!("{}", "-".repeat(70));
    for entry in &listing.entries {
        print_entry(entry);
    }
}

fn done(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub async fn dir(client: &NetStorageClient, path: &str) -> Result<()> {
    let listing = client.dir(path).await?;
    println!("{}", style(&listing.directory).cyan().bold());
    print_listing(&listing);
    Ok(())
}

pub async fn du(client: &NetStorageClient, path: &str) -> Result<()> {
    let listing = client.du(path).await?;
    let usage = listing
        .usage
        .ok_or_else(|| CliError::internal("du response carried no usage record"))?;

    println!("{}", style(&listing.directory).cyan().bold());
    println!("  files: {}", usage.files);
    println!("  bytes: {}", usage.bytes);
    Ok(())
}

pub async fn stat(client: &NetStorageClient, path: &str) -> Result<()> {
    let listing = client.stat(path).await?;
    for entry in &listing.entries {
        print_entry(entry);
        if let Some(md5) = &entry.md5 {
            println!("  {} {}", style("md5:").dim(), md5);
        }
    }
    Ok(())
}

pub async fn mkdir(client: &NetStorageClient, path: &str) -> Result<()> {
    client.mkdir(path).await?;
    done(format!("Created directory {}", path));
    Ok(())
}

pub async fn rmdir(client: &NetStorageClient, path: &str) -> Result<()> {
    client.rmdir(path).await?;
    done(format!("Removed directory {}", path));
    Ok(())
}

pub async fn delete(client: &NetStorageClient, path: &str) -> Result<()> {
    client.delete(path).await?;
    done(format!("Deleted {}", path));
    Ok(())
}

pub async fn quick_delete(client: &NetStorageClient, path: &str, confirm: &str) -> Result<()> {
    client.quick_delete(path, confirm).await?;
    done(format!("Deleting tree {} in the background", path));
    Ok(())
}

pub async fn rename(client: &NetStorageClient, path: &str, destination: &str) -> Result<()> {
    client.rename(path, destination).await?;
    done(format!("Renamed {} to {}", path, destination));
    Ok(())
}

pub async fn symlink(client: &NetStorageClient, path: &str, target: &str) -> Result<()> {
    client.symlink(path, target).await?;
    done(format!("Linked {} -> {}", path, target));
    Ok(())
}

pub async fn mtime(client: &NetStorageClient, path: &str, mtime: i64) -> Result<()> {
    client.set_mtime(path, mtime).await?;
    done(format!("Set mtime of {} to {}", path, format_mtime(Some(mtime))));
    Ok(())
}

pub async fn upload(
    client: &NetStorageClient,
    file: &Path,
    path: &str,
    mtime: Option<i64>,
    checksums: bool,
    index_zip: bool,
) -> Result<()> {
    let data = tokio::fs::read(file).await.map_err(|e| CliError::Io {
        message: format!("{}: {}", file.display(), e),
    })?;

    let mut options = UploadOptions::default();
    if checksums {
        options = options.with_checksums(&data);
    }
    if let Some(mtime) = mtime.or_else(|| local_mtime(file)) {
        options = options.with_mtime(mtime);
    }
    if index_zip {
        options = options.with_index_zip();
    }

    let size = data.len();
    client.upload(path, data, options).await?;
    done(format!("Uploaded {} ({} bytes) to {}", file.display(), size, path));
    Ok(())
}

fn local_mtime(file: &Path) -> Option<i64> {
    let modified = std::fs::metadata(file).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}

pub async fn download(client: &NetStorageClient, path: &str, output: Option<&Path>) -> Result<()> {
    let mut stream = client.download(path).await?;

    let mut written = 0usize;
    match output {
        Some(output) => {
            let mut file = tokio::fs::File::create(output).await?;
            while let Some(chunk) = stream.try_next().await? {
                file.write_all(&chunk).await?;
                written += chunk.len();
            }
            file.flush().await?;
            eprintln!(
                "{} Downloaded {} ({} bytes) to {}",
                style("✓").green().bold(),
                path,
                written,
                output.display()
            );
        }
        None => {
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = stream.try_next().await? {
                stdout.write_all(&chunk).await?;
            }
            stdout.flush().await?;
        }
    }
    Ok(())
}
