// UI layer: a simple interactive menu built on `dialoguer`. Each entry
// prompts for its input, runs one client call behind a spinner and prints
// the result. Errors are printed and the loop carries on.

use crate::api::{CatboxClient, UploadOutcome};
use crate::config::Settings;
use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu(mut api: CatboxClient) -> Result<()> {
    loop {
        let items = vec![
            "Upload file",
            "Upload from URL",
            "Delete files",
            "Set userhash",
            "Exit",
        ];
        let selection = Select::new()
            .with_prompt(account_label(&api))
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => handle_upload_file(&api)?,
            1 => handle_upload_url(&api)?,
            2 => {
                // Fail early instead of prompting for names we can't delete.
                if api.userhash().map_or(true, str::is_empty) {
                    println!("You should set a userhash first to delete files.");
                    continue;
                }
                handle_delete(&api)?;
            }
            3 => {
                let userhash = prompt_userhash()?;
                api = api.with_userhash(userhash.clone());
                if Confirm::new()
                    .with_prompt("Remember this userhash?")
                    .default(true)
                    .interact()?
                {
                    persist_userhash(userhash);
                }
            }
            4 => break,
            _ => {}
        }
    }
    Ok(())
}

fn account_label(api: &CatboxClient) -> String {
    match api.userhash() {
        Some(hash) if !hash.is_empty() => "catbox (signed in)".to_string(),
        _ => "catbox (anonymous)".to_string(),
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn report_upload(result: crate::Result<String>) {
    match result.map(|body| UploadOutcome::from_body(&body)) {
        Ok(UploadOutcome::Hosted(url)) => println!("Uploaded: {}", url),
        Ok(UploadOutcome::Rejected(text)) => println!("Catbox refused the upload: {}", text),
        Err(e) => println!("Upload failed: {}", e),
    }
}

fn handle_upload_file(api: &CatboxClient) -> Result<()> {
    let path: String = Input::new().with_prompt("File path").interact_text()?;
    let path = PathBuf::from(path.trim());

    let pb = spinner("Uploading...")?;
    let result = api.upload_file(&path);
    pb.finish_and_clear();

    report_upload(result);
    Ok(())
}

fn handle_upload_url(api: &CatboxClient) -> Result<()> {
    let url: String = Input::new().with_prompt("URL").interact_text()?;

    let pb = spinner("Asking catbox to fetch the file...")?;
    let result = api.upload_url(url.trim());
    pb.finish_and_clear();

    report_upload(result);
    Ok(())
}

fn handle_delete(api: &CatboxClient) -> Result<()> {
    let raw: String = Input::new()
        .with_prompt("File names (separated by spaces)")
        .interact_text()?;
    let files = parse_file_list(&raw);
    if files.is_empty() {
        println!("Nothing to delete.");
        return Ok(());
    }

    let prompt = format!("Delete {} file(s)?", files.len());
    if !Confirm::new().with_prompt(prompt).interact()? {
        return Ok(());
    }

    let pb = spinner("Deleting...")?;
    let result = api.delete_files(files.as_slice());
    pb.finish_and_clear();

    match result {
        Ok(_) => println!("Deleted {}", files.join(", ")),
        Err(e) => println!("Delete failed: {}", e),
    }
    Ok(())
}

/// Accepts bare names (`abc123.png`) or full file URLs
/// (`https://files.catbox.moe/abc123.png`).
fn parse_file_list(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|item| item.rsplit('/').next().unwrap_or(item).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn persist_userhash(userhash: Option<String>) {
    let path = Settings::default_path();
    match persist_userhash_to(&path, userhash) {
        Ok(()) => println!("Saved to {}", path.display()),
        Err(e) => println!("Could not save userhash: {}", e),
    }
}

/// Store the userhash in the settings file at `path`. Only what is already
/// on disk is rewritten, so env overrides never end up persisted.
fn persist_userhash_to(path: &Path, userhash: Option<String>) -> crate::Result<()> {
    let mut stored = Settings::load_from(path)?;
    stored.userhash = userhash;
    stored.save_to(path)
}

/// Ask for a userhash; an empty answer switches back to anonymous.
fn prompt_userhash() -> Result<Option<String>> {
    let hash: String = Password::new()
        .with_prompt("Userhash (leave empty for anonymous)")
        .allow_empty_password(true)
        .interact()?;
    let hash = hash.trim();
    Ok((!hash.is_empty()).then(|| hash.to_string()))
}
