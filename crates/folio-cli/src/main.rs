//! `folio` command-line interface
//!
//! Commands:
//! - `sections`: list a document's sections
//! - `generate`: generate content for one section
//! - `preview`: write sandboxed previews for every section

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use folio_document::ContentKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{GenerateArgs, ListFormat, PreviewArgs};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "folio=info,folio_core=info,folio_document=info,\
                              folio_stream=info,folio_synth=info,folio_preview=info";

fn cli() -> Command {
    let file = Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Markdown document");
    let kind = Arg::new("kind")
        .long("kind")
        .default_value("diagram")
        .value_parser(value_parser!(ContentKind))
        .help("Content kind: diagram or animation");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML config file");

    Command::new("folio")
        .version(folio_core::VERSION)
        .about("Split markdown into sections and generate sandboxed interactive previews")
        .subcommand_required(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("sections")
                .about("List the sections of a document")
                .arg(file.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("markdown")
                        .long("markdown")
                        .action(ArgAction::SetTrue)
                        .help("Output as re-rendered markdown"),
                )
                .group(ArgGroup::new("format").args(["json", "markdown"])),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate content for one section")
                .arg(file.clone())
                .arg(
                    Arg::new("section")
                        .long("section")
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("Section index as listed by `folio sections`"),
                )
                .arg(kind.clone())
                .arg(config.clone())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write a sandboxed preview to this directory instead of printing"),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Write heuristic previews for every section")
                .arg(file)
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory"),
                )
                .arg(kind)
                .arg(config),
        )
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn required<T: Clone + Send + Sync + 'static>(
    args: &clap::ArgMatches,
    id: &str,
) -> anyhow::Result<T> {
    args.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing argument: {id}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match matches.subcommand() {
        Some(("sections", args)) => {
            let format = if args.get_flag("json") {
                ListFormat::Json
            } else if args.get_flag("markdown") {
                ListFormat::Markdown
            } else {
                ListFormat::Table
            };
            let file: PathBuf = required(args, "file")?;
            print!("{}", commands::sections(&file, format).await?);
        }
        Some(("generate", args)) => {
            let generate = GenerateArgs {
                file: required(args, "file")?,
                section: required(args, "section")?,
                kind: required(args, "kind")?,
                config: args.get_one::<PathBuf>("config").cloned(),
                out: args.get_one::<PathBuf>("out").cloned(),
            };
            println!("{}", commands::generate(&generate).await?);
        }
        Some(("preview", args)) => {
            let preview = PreviewArgs {
                file: required(args, "file")?,
                out: required(args, "out")?,
                kind: required(args, "kind")?,
                config: args.get_one::<PathBuf>("config").cloned(),
            };
            let index = commands::preview(&preview).await?;
            println!("{}", index.display());
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_generate() {
        let matches = cli()
            .try_get_matches_from([
                "folio",
                "generate",
                "doc.md",
                "--section",
                "2",
                "--kind",
                "animation",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(*args.get_one::<usize>("section").unwrap(), 2);
        assert_eq!(*args.get_one::<ContentKind>("kind").unwrap(), ContentKind::Animation);
        assert!(args.get_one::<PathBuf>("out").is_none());
    }

    #[test]
    fn sections_formats_are_exclusive() {
        assert!(cli()
            .try_get_matches_from(["folio", "sections", "doc.md", "--json", "--markdown"])
            .is_err());
    }

    #[test]
    fn preview_requires_out() {
        assert!(cli().try_get_matches_from(["folio", "preview", "doc.md"]).is_err());
    }
}
