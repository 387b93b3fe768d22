//! Note commands for CLI.

use clap::Subcommand;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum NoteAction {
    /// Write a new note
    Add {
        content: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List notes, newest first
    List {
        /// Only notes with this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Replace a note's text
    Edit { id: String, content: String },
    /// Delete a note
    Delete { id: String },
    /// Add a tag to a note
    Tag { id: String, tag: String },
    /// Remove a tag from a note
    Untag { id: String, tag: String },
    /// List every tag in use
    Tags,
}

pub fn run(action: NoteAction) -> CmdResult {
    let mut ws = Workspace::open()?;
    let now = ws.now;
    let notes = &mut ws.state.notes;

    match action {
        NoteAction::Add { content, tags } => {
            let tags: Vec<String> = tags
                .map(|t| t.split(',').map(str::to_string).collect())
                .unwrap_or_default();
            let id = notes.add(&content, &tags, now);
            ws.save()?;
            println!("Note created: {}", id.short());
        }
        NoteAction::List { tag } => {
            let shown: Vec<_> = match tag {
                Some(tag) => notes.filter_by_tag(&tag).collect(),
                None => notes.iter().collect(),
            };
            print_json(&shown)?;
        }
        NoteAction::Edit { id, content } => {
            let id = notes.resolve(&id)?;
            notes.edit(id, &content, now).ok_or("note vanished")?;
            ws.save()?;
            println!("Note updated: {}", id.short());
        }
        NoteAction::Delete { id } => {
            let id = notes.resolve(&id)?;
            notes.delete(id);
            ws.save()?;
            println!("Note deleted: {}", id.short());
        }
        NoteAction::Tag { id, tag } => {
            let id = notes.resolve(&id)?;
            let added = notes.add_tag(id, &tag, now).unwrap_or(false);
            ws.save()?;
            println!("{}", if added { "ok" } else { "unchanged" });
        }
        NoteAction::Untag { id, tag } => {
            let id = notes.resolve(&id)?;
            let removed = notes.remove_tag(id, &tag, now).unwrap_or(false);
            ws.save()?;
            println!("{}", if removed { "ok" } else { "unchanged" });
        }
        NoteAction::Tags => {
            print_json(&notes.all_tags())?;
        }
    }
    Ok(())
}
