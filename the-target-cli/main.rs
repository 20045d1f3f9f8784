//! Command line front end for the target engine.
//!
//! Resolves a JSON target descriptor against a file and prints what it
//! refers to, removes it, or lists the scopes of a given type.

use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use anyhow::{
  Context,
  Result,
  bail,
};
use clap::{
  Args,
  Parser,
  Subcommand,
};
use serde_json::{
  Value,
  json,
};
use the_target::{
  actions,
  config::EngineConfig,
  context::EngineContext,
  descriptor::PartialTargetDescriptor,
  document::{
    InMemoryTextDocument,
    TextDocument,
  },
  editor::{
    InMemoryTextEditor,
    TextEditor,
  },
  pipeline::TargetPipeline,
  position::Position,
  range::Selection,
  scope_ranges::{
    ScopeRangeProvider,
    TargetRanges,
  },
  scope_type::ScopeType,
  target::Target,
};

#[derive(Debug, Parser)]
#[command(name = "the-target")]
#[command(about = "Resolve target descriptors against a file")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print the targets a descriptor resolves to
  Resolve(TargetArgs),
  /// Remove the targets a descriptor resolves to and print the result
  Remove(TargetArgs),
  /// Print every scope of a type in the file
  Scopes(ScopeArgs),
}

#[derive(Debug, Args)]
struct FileArgs {
  /// File to read
  #[arg(long)]
  file: PathBuf,

  /// Language id; guessed from the file extension when absent
  #[arg(long)]
  language: Option<String>,

  /// TOML engine configuration
  #[arg(long)]
  config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TargetArgs {
  #[command(flatten)]
  file: FileArgs,

  /// Cursor position as LINE:COL, both zero based
  #[arg(long, default_value = "0:0", value_parser = parse_position)]
  cursor: Position,

  /// Target descriptor as JSON
  descriptor: String,
}

#[derive(Debug, Args)]
struct ScopeArgs {
  #[command(flatten)]
  file: FileArgs,

  /// Print iteration ranges with the scopes nested in each
  #[arg(long)]
  iteration: bool,

  /// Scope type as JSON, e.g. '{"type": "token"}'
  scope_type: String,
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();
  match cli.command {
    Command::Resolve(args) => resolve(args),
    Command::Remove(args) => remove(args),
    Command::Scopes(args) => scopes(args),
  }
}

fn resolve(args: TargetArgs) -> Result<()> {
  let (context, editor) = open(&args.file, args.cursor)?;
  let targets = resolve_targets(&context, &editor, &args.descriptor)?;
  let document = editor.document();
  let output: Vec<Value> = targets
    .iter()
    .map(|target| {
      json!({
        "text": target.content_text(document),
        "ranges": TargetRanges::new(document, target),
      })
    })
    .collect();
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

fn remove(args: TargetArgs) -> Result<()> {
  let (mut context, mut editor) = open(&args.file, args.cursor)?;
  let targets = resolve_targets(&context, &editor, &args.descriptor)?;
  actions::remove(&mut context, &mut editor, &targets).context("failed to remove targets")?;
  print!("{}", editor.document().text());
  Ok(())
}

fn scopes(args: ScopeArgs) -> Result<()> {
  let config = load_config(args.file.config.as_deref())?;
  let language = language_id(&args.file);
  let document = read_document(&args.file.file, &language)?;
  let scope_type: ScopeType =
    serde_json::from_str(&args.scope_type).context("invalid scope type")?;

  let provider = ScopeRangeProvider::new(&config, &language);
  let output = if args.iteration {
    serde_json::to_string_pretty(&provider.iteration_scope_ranges(
      &document,
      document.range(),
      &scope_type,
      true,
    )?)?
  } else {
    serde_json::to_string_pretty(&provider.scope_ranges(&document, document.range(), &scope_type)?)?
  };
  println!("{output}");
  Ok(())
}

fn open(args: &FileArgs, cursor: Position) -> Result<(EngineContext, InMemoryTextEditor)> {
  let config = load_config(args.config.as_deref())?;
  let document = read_document(&args.file, &language_id(args))?;
  let cursor = document.validate_position(cursor);
  let editor = InMemoryTextEditor::new("cli", document).with_selections(vec![Selection::point(cursor)]);

  let mut context = EngineContext::new(config);
  context.allocate_hats(&editor).context("failed to allocate hats")?;
  Ok((context, editor))
}

fn resolve_targets(
  context: &EngineContext,
  editor: &InMemoryTextEditor,
  descriptor: &str,
) -> Result<Vec<Target>> {
  let descriptor: PartialTargetDescriptor =
    serde_json::from_str(descriptor).context("invalid target descriptor")?;
  let targets = TargetPipeline::new(context, editor)
    .resolve(&[descriptor])
    .context("failed to resolve target")?;
  Ok(targets.into_iter().flatten().collect())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
  match path {
    Some(path) => EngineConfig::load(path)
      .with_context(|| format!("failed to load config from {}", path.display())),
    None => Ok(EngineConfig::default()),
  }
}

fn read_document(path: &Path, language: &str) -> Result<InMemoryTextDocument> {
  let text =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  Ok(InMemoryTextDocument::new(
    format!("file://{}", path.display()),
    language,
    &text,
  ))
}

fn language_id(args: &FileArgs) -> String {
  if let Some(language) = &args.language {
    return language.clone();
  }
  let extension = args
    .file
    .extension()
    .and_then(|extension| extension.to_str())
    .unwrap_or_default();
  match extension {
    "rs" => "rust",
    "py" => "python",
    "js" | "mjs" | "cjs" => "javascript",
    "ts" => "typescript",
    "tsx" => "typescriptreact",
    "c" | "h" => "c",
    "cc" | "cpp" | "hpp" => "cpp",
    "go" => "go",
    "java" => "java",
    "rb" => "ruby",
    "lua" => "lua",
    "sh" | "bash" => "shellscript",
    "css" => "css",
    "scss" => "scss",
    "toml" => "toml",
    "json" => "json",
    "md" => "markdown",
    _ => "plaintext",
  }
  .to_string()
}

fn parse_position(value: &str) -> Result<Position> {
  let Some((line, character)) = value.split_once(':') else {
    bail!("expected LINE:COL, got {value:?}");
  };
  Ok(Position::new(
    line.trim().parse().context("bad line")?,
    character.trim().parse().context("bad column")?,
  ))
}
