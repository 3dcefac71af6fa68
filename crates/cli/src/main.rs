use aliven_core::config::{export_config_from_lookup, path_from_env_value};
use aliven_core::constants::DEFAULT_DATA_DIR;
use aliven_core::content::{default_prompt_pack, find_path, find_prompt_pack, paths};
use aliven_core::rhythm::{build_rhythm, preview_payload};
use aliven_core::{
    DraftHandoff, DraftName, DraftStore, ExportRequest, FileSlot, PdfExporter, PracticePath,
    PromptPack, SavedDraft, SlotDraftStore, WeekNumber, WeekOverrides,
};
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "aliven")]
#[command(about = "Aliven path builder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Which rhythm to work on: a path, optionally a saved draft, plus per-week edits.
#[derive(Args, Debug, Default)]
struct RhythmArgs {
    /// Path id (see `aliven paths`); defaults to the draft's path when --draft is given
    #[arg(long)]
    path: Option<String>,
    /// Start from the edits of a saved draft
    #[arg(long)]
    draft: Option<String>,
    /// Edited journal prompt as WEEK=TEXT (repeatable)
    #[arg(long = "prompt", value_name = "WEEK=TEXT", value_parser = parse_week_text)]
    prompts: Vec<(WeekNumber, String)>,
    /// Edited practices as WEEK=TEXT (repeatable)
    #[arg(long = "practices", value_name = "WEEK=TEXT", value_parser = parse_week_text)]
    practices: Vec<(WeekNumber, String)>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the practice paths
    Paths,
    /// Show the four-week rhythm for a path
    Preview {
        #[command(flatten)]
        rhythm: RhythmArgs,
    },
    /// Manage saved drafts
    Drafts {
        #[command(subcommand)]
        command: DraftCommands,
    },
    /// Export a rhythm to PDF
    Export {
        #[command(flatten)]
        rhythm: RhythmArgs,
        /// Download name to use instead of the path name
        #[arg(long)]
        filename: Option<String>,
        /// Output file (defaults to the normalized download name)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write the export HTML instead of printing it with a browser
        #[arg(long)]
        html_only: bool,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// List saved drafts, most recently updated first
    List,
    /// Save the current edits as a named draft
    Save {
        /// Draft name
        name: String,
        #[command(flatten)]
        rhythm: RhythmArgs,
    },
    /// Print a saved draft's stored record as JSON
    Show {
        /// Draft id
        id: String,
    },
    /// Delete a saved draft
    Delete {
        /// Draft id
        id: String,
    },
    /// Delete every saved draft
    Clear,
    /// Print a builder link that reopens a saved draft
    Link {
        /// Draft id
        id: String,
        /// Builder URL the handoff parameters are added to
        #[arg(long, default_value = DEFAULT_LINK_BASE)]
        base: String,
    },
}

/// The REST route that rebuilds a rhythm from handoff parameters.
const DEFAULT_LINK_BASE: &str = "http://localhost:3000/rhythm";

/// Parses `WEEK=TEXT`, e.g. `2=What am I noticing?`.
fn parse_week_text(raw: &str) -> Result<(WeekNumber, String), String> {
    let (week, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected WEEK=TEXT, got {raw:?}"))?;
    let week: i64 = week
        .trim()
        .parse()
        .map_err(|_| format!("week must be a number, got {:?}", week.trim()))?;
    let week = WeekNumber::new(week).map_err(|e| e.to_string())?;
    Ok((week, text.to_string()))
}

struct Selection {
    path: &'static PracticePath,
    pack: &'static PromptPack,
    overrides: WeekOverrides,
}

/// Resolves the path, pack and edits named by `args`. Command-line edits apply on top of the
/// draft's.
fn resolve_selection(args: &RhythmArgs, store: &dyn DraftStore) -> anyhow::Result<Selection> {
    let draft = match &args.draft {
        Some(id) => Some(store.get(id).ok_or_else(|| anyhow!("no saved draft with id {id}"))?),
        None => None,
    };

    let path_id = args
        .path
        .as_deref()
        .or(draft.as_ref().map(|d| d.path_id.as_str()))
        .ok_or_else(|| anyhow!("--path is required (see `aliven paths`)"))?;
    let path = find_path(path_id).ok_or_else(|| anyhow!("unknown path: {path_id}"))?;

    let pack = match &draft {
        Some(d) => find_prompt_pack(&d.pack_id).unwrap_or_else(|| {
            tracing::warn!("draft uses unknown prompt pack {}, using default", d.pack_id);
            default_prompt_pack()
        }),
        None => default_prompt_pack(),
    };

    let mut overrides = draft.map(|d| d.overrides()).unwrap_or_default();
    for (week, text) in &args.prompts {
        overrides.set_prompt(*week, text.clone());
    }
    for (week, text) in &args.practices {
        overrides.set_practices(*week, text.clone());
    }

    Ok(Selection {
        path,
        pack,
        overrides,
    })
}

fn html_output_name(pdf_name: &str) -> String {
    let stem = pdf_name.strip_suffix(".pdf").unwrap_or(pdf_name);
    format!("{stem}.html")
}

fn draft_store() -> SlotDraftStore<FileSlot> {
    let data_dir = path_from_env_value(std::env::var("ALIVEN_DATA_DIR").ok(), DEFAULT_DATA_DIR);
    SlotDraftStore::new(FileSlot::in_data_dir(&data_dir))
}

fn find_draft(store: &dyn DraftStore, id: &str) -> anyhow::Result<SavedDraft> {
    store
        .get(id)
        .ok_or_else(|| anyhow!("no saved draft with id {id}"))
}

fn draft_link(draft: &SavedDraft, base: &str) -> anyhow::Result<Url> {
    let base = Url::parse(base).with_context(|| format!("invalid base URL {base}"))?;
    Ok(DraftHandoff::from_draft(draft).link(&base))
}

fn draft_json(draft: &SavedDraft) -> anyhow::Result<String> {
    serde_json::to_string_pretty(draft).context("failed to serialize draft")
}

fn print_preview(selection: &Selection) {
    let path = selection.path;
    println!("{} ({}), pack: {}", path.name, path.id, selection.pack.label);
    println!("{}", path.description);
    for entry in build_rhythm(path, selection.pack, &selection.overrides) {
        let edited = selection.overrides.prompts.contains_key(&entry.week)
            || selection.overrides.practices.contains_key(&entry.week);
        println!();
        println!("Week {}{}", entry.week, if edited { " (edited)" } else { "" });
        println!("  Practices: {}", entry.practices);
        println!("  Prompt:    {}", entry.prompt);
    }
}

fn run_drafts(command: DraftCommands, store: &dyn DraftStore) -> anyhow::Result<()> {
    match command {
        DraftCommands::List => {
            let drafts = store.list();
            if drafts.is_empty() {
                println!("No saved drafts.");
            }
            for d in drafts {
                println!(
                    "ID: {}, Name: {}, Path: {}, Updated: {}, Edits: {}",
                    d.id,
                    d.name,
                    d.path_id,
                    d.updated_at.format("%Y-%m-%d %H:%M"),
                    d.draft_prompts.len() + d.draft_practices.len()
                );
            }
        }
        DraftCommands::Save { name, rhythm } => {
            let name = DraftName::new(&name)?;
            let selection = resolve_selection(&rhythm, store)?;
            let draft = SavedDraft::new(
                name,
                selection.pack,
                selection.path,
                &selection.overrides,
                Utc::now(),
            );
            let id = draft.id.clone();
            store.save(draft);
            println!("Saved draft with ID: {}", id);
        }
        DraftCommands::Show { id } => {
            println!("{}", draft_json(&find_draft(store, &id)?)?);
        }
        DraftCommands::Delete { id } => {
            if store.get(&id).is_none() {
                bail!("no saved draft with id {id}");
            }
            store.delete(&id);
            println!("Deleted draft {}", id);
        }
        DraftCommands::Clear => {
            store.clear();
            println!("Cleared all saved drafts.");
        }
        DraftCommands::Link { id, base } => {
            println!("{}", draft_link(&find_draft(store, &id)?, &base)?);
        }
    }
    Ok(())
}

async fn run_export(
    selection: Selection,
    filename: Option<String>,
    output: Option<PathBuf>,
    html_only: bool,
) -> anyhow::Result<()> {
    let config = export_config_from_lookup(|name| std::env::var(name).ok())?;
    let exporter = PdfExporter::from_config(&config, aliven_browser::provider_for(&config));

    let weeks = build_rhythm(selection.path, selection.pack, &selection.overrides);
    let mut payload = preview_payload(selection.path, &weeks, Utc::now());
    payload.filename = filename;
    let request = ExportRequest::normalize(payload, Utc::now());

    let (target, bytes) = if html_only {
        let target = output.unwrap_or_else(|| PathBuf::from(html_output_name(&request.filename)));
        (target, exporter.resolve_html(&request).into_bytes())
    } else {
        let doc = exporter.export_request(request).await?;
        let target = output.unwrap_or_else(|| PathBuf::from(&doc.filename));
        (target, doc.bytes)
    };

    write_output(&target, &bytes)?;
    println!("Wrote {} ({} bytes)", target.display(), bytes.len());
    Ok(())
}

fn write_output(target: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(target, bytes).with_context(|| format!("failed to write {}", target.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aliven=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Paths) => {
            for path in paths() {
                println!(
                    "ID: {}, Name: {}, Pillars: {} + {}",
                    path.id,
                    path.name,
                    path.main_pillar,
                    path.supports.join(" / ")
                );
            }
        }
        Some(Commands::Preview { rhythm }) => {
            let selection = resolve_selection(&rhythm, &draft_store())?;
            print_preview(&selection);
        }
        Some(Commands::Drafts { command }) => run_drafts(command, &draft_store())?,
        Some(Commands::Export {
            rhythm,
            filename,
            output,
            html_only,
        }) => {
            let selection = resolve_selection(&rhythm, &draft_store())?;
            run_export(selection, filename, output, html_only).await?;
        }
        None => {
            println!("Use 'aliven --help' for commands");
        }
    }

    Ok(())
}
