//! # Admin Subcommands
//!
//! All of these require an admin login.
//!
//! - `admin notes list|url|delete` — notes under a full selection.
//! - `admin faculty list|add|edit|delete|uploads` — faculty accounts.
//! - `admin meta list|add-*|delete-*` — regulations, branches, subjects.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use kithab_client::{KithabClient, NewBranch, NewRegulation, NewSubject};
use kithab_core::{
    search_by_name, BranchId, Faculty, FacultyForm, FacultyId, FieldErrors, MetadataSnapshot,
    NoteId, RegulationId, Role, Semester, SubjectId,
};
use kithab_filter::HierarchyFilter;

use crate::browse::print_notes;
use crate::context::AppContext;
use crate::select::{note_target, require_complete, SelectionArgs};

/// Arguments for `kithab admin`.
#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// `kithab admin` areas.
#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Notes manager.
    #[command(subcommand)]
    Notes(NotesCommand),

    /// Faculty manager.
    #[command(subcommand)]
    Faculty(FacultyCommand),

    /// Regulations, branches and subjects.
    #[command(subcommand)]
    Meta(MetaCommand),
}

/// `kithab admin notes`.
#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// Notes under a full selection, with uploader details.
    List(SelectionArgs),

    /// Resolve a note's file URL.
    Url {
        /// Note id.
        #[arg(long)]
        id: String,
    },

    /// Delete a note.
    Delete {
        /// Note id.
        #[arg(long)]
        id: String,
    },
}

/// Fields of the faculty form.
#[derive(Args, Debug, Default, Clone)]
pub struct FacultyFields {
    /// Employee id.
    #[arg(long)]
    pub employee_id: Option<String>,
    /// Full name.
    #[arg(long)]
    pub name: Option<String>,
    /// Email address.
    #[arg(long)]
    pub email: Option<String>,
    /// Job title.
    #[arg(long)]
    pub designation: Option<String>,
    /// Password (at least 6 characters).
    #[arg(long)]
    pub password: Option<String>,
    /// Password again.
    #[arg(long)]
    pub confirm_password: Option<String>,
}

impl FacultyFields {
    /// Overlay the given fields on `form`.
    fn fill(&self, mut form: FacultyForm) -> FacultyForm {
        let set = |slot: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        };
        set(&mut form.employee_id, &self.employee_id);
        set(&mut form.name, &self.name);
        set(&mut form.email, &self.email);
        set(&mut form.designation, &self.designation);
        set(&mut form.password, &self.password);
        set(&mut form.confirm_password, &self.confirm_password);
        form
    }
}

/// `kithab admin faculty`.
#[derive(Subcommand, Debug)]
pub enum FacultyCommand {
    /// List faculty, optionally searching by name.
    List {
        /// Case-insensitive name search.
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a faculty member.
    Add(FacultyFields),

    /// Edit a faculty member. Omitted fields keep their value; the password
    /// changes only when given.
    Edit {
        /// Faculty id.
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: FacultyFields,
    },

    /// Delete a faculty member.
    Delete {
        /// Faculty id.
        #[arg(long)]
        id: String,
    },

    /// A faculty member's uploads.
    Uploads {
        /// Faculty id.
        #[arg(long)]
        id: String,
    },
}

/// `kithab admin meta`.
#[derive(Subcommand, Debug)]
pub enum MetaCommand {
    /// Print the regulation / branch / subject tree.
    List,

    /// Add a regulation.
    AddRegulation {
        /// Name.
        #[arg(long)]
        name: String,
        /// Number of semesters.
        #[arg(long)]
        semesters: u8,
    },

    /// Add a branch under a regulation.
    AddBranch {
        /// Name.
        #[arg(long)]
        name: String,
        /// Regulation id.
        #[arg(long)]
        regulation: String,
    },

    /// Add a subject under a branch.
    AddSubject {
        /// Name.
        #[arg(long)]
        name: String,
        /// Course code.
        #[arg(long)]
        code: String,
        /// Branch id.
        #[arg(long)]
        branch: String,
        /// Semester number.
        #[arg(long)]
        semester: u8,
    },

    /// Delete a regulation.
    DeleteRegulation {
        /// Regulation id.
        #[arg(long)]
        id: String,
    },

    /// Delete a branch.
    DeleteBranch {
        /// Branch id.
        #[arg(long)]
        id: String,
    },

    /// Delete a subject.
    DeleteSubject {
        /// Subject id.
        #[arg(long)]
        id: String,
    },
}

/// Run `kithab admin`.
pub async fn run_admin(args: &AdminArgs, ctx: &AppContext) -> Result<u8> {
    let (client, _account) = ctx.require(Role::Admin)?;
    match &args.command {
        AdminCommand::Notes(cmd) => run_notes(cmd, &client, ctx).await,
        AdminCommand::Faculty(cmd) => run_faculty(cmd, &client, ctx).await,
        AdminCommand::Meta(cmd) => run_meta(cmd, &client, ctx).await,
    }
}

// ─── Notes ───────────────────────────────────────────────────────────

async fn run_notes(cmd: &NotesCommand, client: &KithabClient, ctx: &AppContext) -> Result<u8> {
    match cmd {
        NotesCommand::List(selection) => {
            let snapshot = ctx.check(client.meta().snapshot().await)?;
            let mut filter = HierarchyFilter::new(snapshot);
            selection.apply(&mut filter)?;
            let target = note_target(require_complete(&filter)?);
            let notes = ctx.check(client.admin().notes(&target).await)?;
            if ctx.json() {
                return ctx.print_json(&notes).map(|()| 0);
            }
            print_notes(&notes);
            for note in &notes {
                if let Some(uploader) = &note.uploaded_by {
                    println!("Uploader of {}:", note.id);
                    println!("  Name: {}", uploader.name.as_deref().unwrap_or("-"));
                    println!("  Email: {}", uploader.email.as_deref().unwrap_or("-"));
                    println!("  Employee ID: {}", uploader.employee_id.as_deref().unwrap_or("-"));
                    println!("  Designation: {}", uploader.designation.as_deref().unwrap_or("-"));
                    println!("  Uploaded notes: {}", uploader.uploaded_notes);
                }
            }
            Ok(0)
        }
        NotesCommand::Url { id } => {
            let id = NoteId::new(id.as_str())?;
            match ctx.check(client.admin().note_file_url(&id).await)? {
                Some(url) => {
                    println!("{url}");
                    Ok(0)
                }
                None => bail!("File not available"),
            }
        }
        NotesCommand::Delete { id } => {
            let id = NoteId::new(id.as_str())?;
            ctx.check(client.admin().delete_note(&id).await)?;
            println!("OK: deleted note {id}");
            Ok(0)
        }
    }
}

// ─── Faculty ─────────────────────────────────────────────────────────

async fn run_faculty(cmd: &FacultyCommand, client: &KithabClient, ctx: &AppContext) -> Result<u8> {
    match cmd {
        FacultyCommand::List { search } => {
            let all = ctx.check(client.admin().faculty().await)?;
            let shown: Vec<&Faculty> = match search {
                Some(query) => search_by_name(&all, query),
                None => all.iter().collect(),
            };
            if ctx.json() {
                return ctx.print_json(&shown).map(|()| 0);
            }
            if shown.is_empty() {
                println!("No faculty found.");
            }
            for f in shown {
                println!(
                    "{:<26} {:<10} {} <{}>, {} ({} uploads)",
                    f.id,
                    f.employee_id,
                    f.name,
                    f.email,
                    f.designation,
                    f.uploaded_notes.len()
                );
            }
            Ok(0)
        }
        FacultyCommand::Add(fields) => {
            let all = ctx.check(client.admin().faculty().await)?;
            let new = fields
                .fill(FacultyForm::default())
                .into_new_faculty(&all)
                .map_err(invalid_form)?;
            ctx.check(client.admin().create_faculty(&new).await)?;
            println!("OK: added {} ({})", new.name, new.employee_id);
            Ok(0)
        }
        FacultyCommand::Edit { id, fields } => {
            let id = FacultyId::new(id.as_str())?;
            let all = ctx.check(client.admin().faculty().await)?;
            let Some(current) = all.iter().find(|f| f.id == id) else {
                bail!("no faculty with id {id}");
            };
            let update = fields
                .fill(FacultyForm::from_faculty(current))
                .into_update(&id, &all)
                .map_err(invalid_form)?;
            ctx.check(client.admin().update_faculty(&id, &update).await)?;
            println!("OK: updated {}", update.name);
            Ok(0)
        }
        FacultyCommand::Delete { id } => {
            let id = FacultyId::new(id.as_str())?;
            ctx.check(client.admin().delete_faculty(&id).await)?;
            println!("OK: deleted faculty {id}");
            Ok(0)
        }
        FacultyCommand::Uploads { id } => {
            let id = FacultyId::new(id.as_str())?;
            let notes = ctx.check(client.admin().faculty_uploads(&id).await)?;
            if ctx.json() {
                return ctx.print_json(&notes).map(|()| 0);
            }
            if notes.is_empty() {
                println!("No uploads");
            } else {
                print_notes(&notes);
            }
            Ok(0)
        }
    }
}

fn invalid_form(errors: FieldErrors) -> anyhow::Error {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
    anyhow::anyhow!("faculty form is invalid: {errors}")
}

// ─── Metadata ────────────────────────────────────────────────────────

async fn run_meta(cmd: &MetaCommand, client: &KithabClient, ctx: &AppContext) -> Result<u8> {
    let meta = client.meta();
    match cmd {
        MetaCommand::List => {
            let snapshot = ctx.check(meta.admin_snapshot().await)?;
            print_tree(&snapshot);
        }
        MetaCommand::AddRegulation { name, semesters } => {
            if Semester::new(*semesters).is_none() {
                bail!("a regulation needs at least one semester");
            }
            let body = NewRegulation {
                name: name.trim().to_string(),
                number_of_semesters: *semesters,
            };
            ctx.check(meta.create_regulation(&body).await)?;
            println!("OK: added regulation {}", body.name);
        }
        MetaCommand::AddBranch { name, regulation } => {
            let body = NewBranch {
                name: name.trim().to_string(),
                regulation: RegulationId::new(regulation.as_str())?,
            };
            ctx.check(meta.create_branch(&body).await)?;
            println!("OK: added branch {}", body.name);
        }
        MetaCommand::AddSubject {
            name,
            code,
            branch,
            semester,
        } => {
            let Some(semester) = Semester::new(*semester) else {
                bail!("semester must be at least 1");
            };
            let body = NewSubject {
                name: name.trim().to_string(),
                code: code.trim().to_string(),
                branch: BranchId::new(branch.as_str())?,
                semester,
            };
            ctx.check(meta.create_subject(&body).await)?;
            println!("OK: added subject {} ({})", body.name, body.code);
        }
        MetaCommand::DeleteRegulation { id } => {
            let id = RegulationId::new(id.as_str())?;
            ctx.check(meta.delete_regulation(&id).await)?;
            println!("OK: deleted regulation {id}");
        }
        MetaCommand::DeleteBranch { id } => {
            let id = BranchId::new(id.as_str())?;
            ctx.check(meta.delete_branch(&id).await)?;
            println!("OK: deleted branch {id}");
        }
        MetaCommand::DeleteSubject { id } => {
            let id = SubjectId::new(id.as_str())?;
            ctx.check(meta.delete_subject(&id).await)?;
            println!("OK: deleted subject {id}");
        }
    }
    Ok(0)
}

fn print_tree(snapshot: &MetadataSnapshot) {
    if snapshot.is_empty() {
        println!("No metadata.");
        return;
    }
    for reg in snapshot.regulations() {
        println!("{} [{}] ({} semesters)", reg.name, reg.id, reg.number_of_semesters);
        for branch in snapshot
            .branches()
            .iter()
            .filter(|b| b.regulation_id.as_ref() == Some(&reg.id))
        {
            println!("  {} [{}]", branch.name, branch.id);
            for subject in snapshot
                .subjects()
                .iter()
                .filter(|s| s.branch_id.as_ref() == Some(&branch.id))
            {
                let sem = subject
                    .semester
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "?".into());
                println!("    sem {sem}: {} [{}]", subject.label(), subject.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_keeps_unset_fields() {
        let base = FacultyForm {
            employee_id: "E100".into(),
            name: "Dr. Rao".into(),
            email: "rao@example.edu".into(),
            designation: "Professor".into(),
            ..FacultyForm::default()
        };
        let fields = FacultyFields {
            designation: Some("Dean".into()),
            ..FacultyFields::default()
        };
        let form = fields.fill(base);
        assert_eq!(form.designation, "Dean");
        assert_eq!(form.name, "Dr. Rao");
        assert!(form.password.is_empty());
    }
}
