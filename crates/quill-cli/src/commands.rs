use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::DateTime;
use colored::Colorize;
use quill_crypto::SigningKey;
use quill_program::{NoteProgram, Outcome, ProgramConfig, SystemClock};
use quill_sdk::{sort_notes, Note, NoteClient, NoteSort, SdkError};
use quill_store::InMemoryAccountStore;
use quill_types::{Address, UnixTimestamp};
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::keyfile::{read_key, write_key};

type Program = NoteProgram<InMemoryAccountStore, SystemClock>;

/// Registry state loaded from the snapshot file for one command.
struct Session {
    program: Arc<Program>,
    config: ProgramConfig,
}

impl Session {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => ProgramConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ProgramConfig::default(),
        };
        let store = InMemoryAccountStore::load_from(&cli.state)
            .with_context(|| format!("loading state {}", cli.state.display()))?;
        debug!(state = %cli.state.display(), accounts = store.len()?, "state loaded");
        let program = Arc::new(NoteProgram::new(store, SystemClock, &config));
        Ok(Self { program, config })
    }

    fn client(&self, key: SigningKey) -> NoteClient<InMemoryAccountStore, SystemClock> {
        NoteClient::new(Arc::clone(&self.program), key)
    }

    fn persist(&self, path: &Path) -> anyhow::Result<()> {
        self.program
            .store()
            .save_to(path)
            .with_context(|| format!("saving state {}", path.display()))
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match &cli.command {
        Command::Keygen(args) => cmd_keygen(args, format),
        Command::Whoami(args) => cmd_whoami(args, format),
        Command::Address(args) => cmd_address(&cli, args, format),
        Command::Create(args) => cmd_create(&cli, args, format),
        Command::Delete(args) => cmd_delete(&cli, args, format),
        Command::Like(args) => cmd_like(&cli, args, format),
        Command::Save(args) => cmd_save(&cli, args, format),
        Command::Show(args) => cmd_show(&cli, args, format),
        Command::List(args) => cmd_list(&cli, args, format),
        Command::Status(args) => cmd_status(&cli, args, format),
    }
}

fn cmd_keygen(args: &KeygenArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = SigningKey::generate();
    write_key(&args.out, &key, args.force)?;
    match format {
        OutputFormat::Json => print_json(&json!({ "identity": key.identity(), "file": args.out })),
        OutputFormat::Text => {
            println!("{} Generated key {}", "✓".green().bold(), args.out.display().to_string().bold());
            println!("  Identity: {}", key.identity().to_hex().cyan());
            Ok(())
        }
    }
}

fn cmd_whoami(args: &KeyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let identity = read_key(&args.key)?.identity();
    match format {
        OutputFormat::Json => print_json(&json!({ "identity": identity })),
        OutputFormat::Text => {
            println!("{}", identity.to_hex().cyan());
            Ok(())
        }
    }
}

fn cmd_address(cli: &Cli, args: &AddressArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ProgramConfig::load(path)?,
        None => ProgramConfig::default(),
    };
    let deriver = quill_crypto::AddressDeriver::for_namespace(&config.namespace);
    let address = match &args.kind {
        AddressKind::Note { creator, title } => deriver.note_address(creator, title.trim())?,
        AddressKind::Like { user, note } => deriver.like_address(user, note)?,
        AddressKind::Save { user, note } => deriver.save_address(user, note)?,
    };
    match format {
        OutputFormat::Json => print_json(&json!({ "address": address })),
        OutputFormat::Text => {
            println!("{}", address.to_hex().yellow());
            Ok(())
        }
    }
}

fn cmd_create(cli: &Cli, args: &CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let client = session.client(read_key(&args.key)?);
    let outcome = client
        .create_note(&args.title, &args.content, args.private)
        .map_err(rejected)?;
    session.persist(&cli.state)?;
    report(&outcome, format)
}

fn cmd_delete(cli: &Cli, args: &NoteTargetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let outcome = session
        .client(read_key(&args.key)?)
        .delete_note(&args.note)
        .map_err(rejected)?;
    session.persist(&cli.state)?;
    report(&outcome, format)
}

fn cmd_like(cli: &Cli, args: &NoteTargetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let outcome = session
        .client(read_key(&args.key)?)
        .like(&args.note)
        .map_err(rejected)?;
    session.persist(&cli.state)?;
    report(&outcome, format)
}

fn cmd_save(cli: &Cli, args: &NoteTargetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let outcome = session
        .client(read_key(&args.key)?)
        .save(&args.note)
        .map_err(rejected)?;
    session.persist(&cli.state)?;
    report(&outcome, format)
}

fn cmd_show(cli: &Cli, args: &ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let note = session
        .program
        .note(&args.note)
        .map_err(|e| rejected(e.into()))?;
    match format {
        OutputFormat::Json => print_json(&json!({ "address": args.note, "note": note })),
        OutputFormat::Text => {
            print_note(&args.note, &note, true);
            Ok(())
        }
    }
}

fn cmd_list(cli: &Cli, args: &ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let sort = match args.sort {
        SortOrder::Newest => NoteSort::Newest,
        SortOrder::Liked => NoteSort::MostLiked,
    };
    let notes = match (&args.key, args.all) {
        (_, true) => {
            let mut notes = session.program.notes()?;
            sort_notes(&mut notes, sort);
            notes
        }
        (Some(key), false) => session.client(read_key(key)?).public_notes(sort).map_err(rejected)?,
        (None, false) => {
            let mut notes: Vec<_> = session
                .program
                .notes()?
                .into_iter()
                .filter(|(_, note)| !note.is_private)
                .collect();
            sort_notes(&mut notes, sort);
            notes
        }
    };

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = notes
                .iter()
                .map(|(address, note)| json!({ "address": address, "note": note }))
                .collect();
            print_json(&serde_json::Value::Array(items))
        }
        OutputFormat::Text => {
            if notes.is_empty() {
                println!("No notes.");
            }
            for (address, note) in &notes {
                print_note(address, note, false);
            }
            Ok(())
        }
    }
}

fn cmd_status(cli: &Cli, args: &NoteTargetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::open(cli)?;
    let client = session.client(read_key(&args.key)?);
    let like = client.like_status(&args.note).map_err(rejected)?;
    let save = client.save_status(&args.note).map_err(rejected)?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "note": args.note,
            "user": client.identity(),
            "like": like,
            "save": save,
            "namespace": session.config.namespace,
        })),
        OutputFormat::Text => {
            println!("Note {} as {}", args.note.short_hex().yellow(), client.identity().short_id().cyan());
            let liked = if like.is_some() { "yes".green() } else { "no".dimmed() };
            println!("  Liked: {liked}");
            match save {
                Some(mark) => println!("  Saved: {} ({})", "yes".green(), timestamp(mark.saved_at)),
                None => println!("  Saved: {}", "no".dimmed()),
            }
            Ok(())
        }
    }
}

// ---- Output helpers ----

fn rejected(err: SdkError) -> anyhow::Error {
    match err.code() {
        Some(code) => anyhow::anyhow!("{} (code {code})", err.user_message()),
        None => anyhow::anyhow!("{}", err.user_message()),
    }
}

fn report(outcome: &Outcome, format: OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        return print_json(outcome);
    }
    let tick = "✓".green().bold();
    match outcome {
        Outcome::Created { note } => {
            println!("{tick} Note created");
            println!("  Address: {}", note.to_hex().yellow());
        }
        Outcome::Deleted {
            note,
            recipient,
            reclaimed_bytes,
        } => {
            println!("{tick} Note {} deleted", note.short_hex().yellow());
            println!("  Reclaimed {reclaimed_bytes} bytes to {}", recipient.short_id().cyan());
        }
        Outcome::Liked { note, like_count, .. } => {
            println!("{tick} Liked {} ({like_count} likes)", note.short_hex().yellow());
        }
        Outcome::Saved { note, saved_at, .. } => {
            println!("{tick} Saved {} at {}", note.short_hex().yellow(), timestamp(*saved_at));
        }
    }
    Ok(())
}

fn print_note(address: &Address, note: &Note, with_content: bool) {
    let visibility = if note.is_private {
        "private".red()
    } else {
        "public".green()
    };
    println!(
        "{}  {}  [{}]  {} likes",
        address.short_hex().yellow(),
        note.title.bold(),
        visibility,
        note.like_count
    );
    println!(
        "  by {} at {}",
        note.creator.short_id().cyan(),
        timestamp(note.created_at).dimmed()
    );
    if with_content {
        println!("\n{}", note.content);
    }
}

fn timestamp(secs: UnixTimestamp) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    struct Env {
        dir: tempfile::TempDir,
    }

    impl Env {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self, name: &str) -> String {
            self.dir.path().join(name).display().to_string()
        }

        fn run(&self, args: &[&str]) -> anyhow::Result<()> {
            let state = self.path("state.bin");
            let mut argv = vec!["quill", "--state", state.as_str()];
            argv.extend_from_slice(args);
            run_command(Cli::try_parse_from(argv)?)
        }

        fn program(&self) -> Program {
            let store = InMemoryAccountStore::load_from(self.dir.path().join("state.bin").as_path()).unwrap();
            NoteProgram::new(store, SystemClock, &ProgramConfig::default())
        }
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(timestamp(0), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn create_like_delete_through_the_snapshot() {
        let env = Env::new();
        let (alice, bob) = (env.path("alice.key"), env.path("bob.key"));
        env.run(&["keygen", "--out", &alice]).unwrap();
        env.run(&["keygen", "--out", &bob]).unwrap();

        env.run(&["create", "--key", &alice, "--title", "Hello", "--content", "World"]).unwrap();
        let alice_id = read_key(Path::new(&alice)).unwrap().identity();
        let note = env.program().deriver().note_address(&alice_id, "Hello").unwrap();
        let note_hex = note.to_hex();

        env.run(&["like", "--key", &bob, "--note", &note_hex]).unwrap();
        assert_eq!(env.program().note(&note).unwrap().like_count, 1);

        let again = env.run(&["like", "--key", &bob, "--note", &note_hex]).unwrap_err();
        assert!(again.to_string().contains("already liked"));

        let not_owner = env.run(&["delete", "--key", &bob, "--note", &note_hex]).unwrap_err();
        assert!(not_owner.to_string().contains("code 2001"));

        env.run(&["delete", "--key", &alice, "--note", &note_hex]).unwrap();
        assert!(env.program().notes().unwrap().is_empty());
    }

    #[test]
    fn failed_mutation_leaves_snapshot_untouched() {
        let env = Env::new();
        let alice = env.path("alice.key");
        env.run(&["keygen", "--out", &alice]).unwrap();
        let err = env
            .run(&["create", "--key", &alice, "--title", "T", "--content", "  "])
            .unwrap_err();
        assert!(err.to_string().contains("code 6003"));
        assert!(!env.dir.path().join("state.bin").exists());
    }

    #[test]
    fn reads_work_on_missing_state() {
        let env = Env::new();
        env.run(&["list"]).unwrap();
        env.run(&["--format", "json", "list", "--all"]).unwrap();
    }
}
