//! # Faculty Subcommands
//!
//! - `upload` — file a note under a full selection.
//! - `uploads list` — own uploads, newest first, narrowed by any selection
//!   flags given (an unset level matches everything).
//! - `uploads delete` — remove one of them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use kithab_client::{NoteFile, FILE_TOO_LARGE, MAX_UPLOAD_BYTES};
use kithab_core::{Note, NoteId, Role};
use kithab_filter::HierarchyFilter;

use crate::browse::print_notes;
use crate::context::AppContext;
use crate::select::{note_target, require_complete, SelectionArgs};

/// Arguments for `kithab upload`.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload.
    pub file: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// MIME type. Guessed from the extension when omitted.
    #[arg(long)]
    pub content_type: Option<String>,
}

/// Arguments for `kithab uploads`.
#[derive(Args, Debug)]
pub struct UploadsArgs {
    #[command(subcommand)]
    pub command: UploadsCommand,
}

/// `kithab uploads` subcommands.
#[derive(Subcommand, Debug)]
pub enum UploadsCommand {
    /// List own uploads.
    List(SelectionArgs),

    /// Delete one of your notes.
    Delete {
        /// Note id.
        #[arg(long)]
        id: String,
    },
}

/// Run `kithab upload`.
pub async fn run_upload(args: &UploadArgs, ctx: &AppContext) -> Result<u8> {
    let (client, _account) = ctx.require(Role::Faculty)?;

    let snapshot = ctx.check(client.meta().snapshot().await)?;
    let mut filter = HierarchyFilter::new(snapshot);
    args.selection.apply(&mut filter)?;
    let target = note_target(require_complete(&filter)?);

    // Checked before reading the whole file into memory.
    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        anyhow::bail!(FILE_TOO_LARGE);
    }
    let file = NoteFile {
        name: file_name(&args.file)?,
        content_type: args
            .content_type
            .clone()
            .unwrap_or_else(|| guess_content_type(&args.file).to_string()),
        bytes: std::fs::read(&args.file)
            .with_context(|| format!("failed to read {}", args.file.display()))?,
    };
    let name = file.name.clone();

    let receipt = ctx.check(client.notes().upload_note(&target, file).await)?;
    println!("OK: \"{name}\" uploaded successfully!");
    if ctx.json() {
        ctx.print_json(&receipt.recent)?;
    } else {
        println!("Recent uploads:");
        for note in &receipt.recent {
            let when = note.created_at.as_ref().map(|t| t.date_string()).unwrap_or_default();
            println!("  {when:<10} {}", note.title);
        }
    }
    Ok(0)
}

/// Run `kithab uploads`.
pub async fn run_uploads(args: &UploadsArgs, ctx: &AppContext) -> Result<u8> {
    let (client, _account) = ctx.require(Role::Faculty)?;
    match &args.command {
        UploadsCommand::List(selection) => {
            let (notes, snapshot) = tokio::try_join!(
                async { ctx.check(client.notes().my_uploads().await) },
                async { ctx.check(client.meta().snapshot().await) },
            )?;
            let mut filter = HierarchyFilter::new(snapshot);
            selection.apply(&mut filter)?;
            let shown: Vec<Note> = filter.filter_notes(&notes).into_iter().cloned().collect();
            if ctx.json() {
                ctx.print_json(&shown)?;
            } else if shown.is_empty() {
                println!("No uploads found.");
            } else {
                print_notes(&shown);
            }
            Ok(0)
        }
        UploadsCommand::Delete { id } => {
            let id = NoteId::new(id.as_str())?;
            ctx.check(client.notes().delete(&id).await)?;
            println!("OK: deleted note {id}");
            Ok(0)
        }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

/// MIME type from a file extension.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
