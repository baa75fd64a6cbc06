//! # Browse Subcommand
//!
//! The student view. Needs no login: pick all four levels, list the notes of
//! the chosen subject and optionally save their files.
//!
//! With `--download-dir`, every attached file is fetched and written as
//! `{title}_{clean name}`. PDFs are only listed with their URL for viewing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use kithab_core::Note;
use kithab_filter::HierarchyFilter;

use crate::context::AppContext;
use crate::select::{require_complete, SelectionArgs};

/// Arguments for `kithab browse`.
#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Save non-PDF attachments into this directory.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
}

/// Run `kithab browse`.
pub async fn run_browse(args: &BrowseArgs, ctx: &AppContext) -> Result<u8> {
    let snapshot = ctx.client().meta().snapshot().await?;
    let mut filter = HierarchyFilter::new(snapshot);
    args.selection.apply(&mut filter)?;
    let selection = require_complete(&filter)?;

    let notes = ctx.client().notes().by_subject(&selection.subject).await?;
    if ctx.json() {
        ctx.print_json(&notes)?;
    } else {
        print_notes(&notes);
    }

    if let Some(dir) = &args.download_dir {
        download_all(ctx, &notes, dir).await?;
    }
    Ok(0)
}

/// One block per note with its files.
pub fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No results found.");
        return;
    }
    for note in notes {
        let subject = note.subject.as_ref().map(|s| s.display()).unwrap_or("-");
        println!("{} [{}]", note.title, note.id);
        println!("  Subject: {subject}");
        if let Some(created) = &note.created_at {
            println!("  Uploaded: {}", created.date_string());
        }
        if let Some(uploader) = &note.uploaded_by {
            println!("  By: {}", uploader.label());
        }
        for file in &note.uploaded_files {
            let action = if file.is_pdf() { "view" } else { "download" };
            let url = file.file_url.as_deref().unwrap_or("(no url)");
            println!("  - {} ({action}): {url}", file.original_name);
        }
        if note.uploaded_files.is_empty() {
            if let Some(url) = &note.file_url {
                println!("  - {url}");
            }
        }
    }
}

async fn download_all(ctx: &AppContext, notes: &[Note], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let mut saved = 0usize;
    for note in notes {
        for file in note.uploaded_files.iter().filter(|f| !f.is_pdf()) {
            let Some(url) = file.file_url.as_deref() else {
                continue;
            };
            let bytes = ctx
                .client()
                .notes()
                .fetch_file(url)
                .await
                .with_context(|| format!("failed to fetch {}", file.original_name))?;
            let target = dir.join(note.download_name(file));
            std::fs::write(&target, bytes)
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(path = %target.display(), "saved");
            saved += 1;
        }
    }
    println!("Saved {saved} file(s) to {}", dir.display());
    Ok(())
}
