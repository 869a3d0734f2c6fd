use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quill_types::{Address, Identity};

#[derive(Parser)]
#[command(name = "quill", about = "Quill: a signed note registry", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Snapshot file holding registry state.
    #[arg(long, global = true, default_value = "quill-state.bin")]
    pub state: PathBuf,

    /// TOML program configuration.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Newest,
    Liked,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a signing key
    Keygen(KeygenArgs),
    /// Print the identity of a key
    Whoami(KeyArgs),
    /// Publish a note
    Create(CreateArgs),
    /// Delete one of your notes
    Delete(NoteTargetArgs),
    /// Like a public note
    Like(NoteTargetArgs),
    /// Save a note
    Save(NoteTargetArgs),
    /// Show a note
    Show(ShowArgs),
    /// List notes
    List(ListArgs),
    /// Show whether a key liked or saved a note
    Status(NoteTargetArgs),
    /// Compute record addresses without touching state
    Address(AddressArgs),
}

#[derive(Args)]
pub struct KeygenArgs {
    #[arg(long)]
    pub out: PathBuf,
    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    #[arg(long)]
    pub key: PathBuf,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub key: PathBuf,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub content: String,
    #[arg(long)]
    pub private: bool,
}

#[derive(Args)]
pub struct NoteTargetArgs {
    #[arg(long)]
    pub key: PathBuf,
    #[arg(long)]
    pub note: Address,
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub note: Address,
}

#[derive(Args)]
pub struct ListArgs {
    /// Include this key's own private notes.
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// Include every private note.
    #[arg(long)]
    pub all: bool,
    #[arg(long, default_value = "newest")]
    pub sort: SortOrder,
}

#[derive(Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub kind: AddressKind,
}

#[derive(Subcommand)]
pub enum AddressKind {
    /// Address of a note
    Note {
        #[arg(long)]
        creator: Identity,
        #[arg(long)]
        title: String,
    },
    /// Address of a like mark
    Like {
        #[arg(long)]
        user: Identity,
        #[arg(long)]
        note: Address,
    },
    /// Address of a save mark
    Save {
        #[arg(long)]
        user: Identity,
        #[arg(long)]
        note: Address,
    },
}
