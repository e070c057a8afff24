//! `folio` command line: replay block sequencing and preview gallery layout

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use folio_core::prelude::*;
use folio_core::report::{self, LayoutRequest, SequenceScript};
use serde::Serialize;
use std::fmt::Display;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("folio")
        .version(folio_core::VERSION)
        .about("Article block sequencing and gallery layout")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("sequence")
                .about("Replay block operations on an in-memory article")
                .arg(
                    Arg::new("blocks")
                        .long("blocks")
                        .default_value("3")
                        .value_parser(value_parser!(usize))
                        .help("Number of text blocks to append first"),
                )
                .arg(
                    Arg::new("insert-after")
                        .long("insert-after")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(i64))
                        .help("Insert a block after this order (repeatable)"),
                )
                .arg(
                    Arg::new("insert-kind")
                        .long("insert-kind")
                        .default_value("text")
                        .value_parser(|s: &str| s.parse::<BlockKind>())
                        .help(kind_help()),
                )
                .arg(
                    Arg::new("delete")
                        .long("delete")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(i64))
                        .help("Delete the block at this order (repeatable)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("layout")
                .about("Compute masonry row spans for a gallery")
                .arg(
                    Arg::new("ratios")
                        .long("ratios")
                        .required(true)
                        .value_delimiter(',')
                        .value_parser(value_parser!(f32))
                        .help("Image width/height ratios, comma separated"),
                )
                .arg(
                    Arg::new("viewport")
                        .long("viewport")
                        .default_value("1024")
                        .value_parser(value_parser!(f32))
                        .help("Viewport width in px"),
                )
                .arg(
                    Arg::new("container")
                        .long("container")
                        .default_value("900")
                        .value_parser(value_parser!(f32))
                        .help("Gallery container width in px"),
                )
                .arg(
                    Arg::new("fail")
                        .long("fail")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(usize))
                        .help("Index of an image that fails to load (repeatable)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        );

    let matches = cli.get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => FolioConfig::load(path).with_context(|| format!("loading {path}"))?,
        None => FolioConfig::default(),
    };

    match matches.subcommand() {
        Some(("sequence", args)) => {
            let report = report::run_sequence(&config, &sequence_script(args)).await?;
            print_report(&report, &report.blocks, args.get_flag("json"))
        }
        Some(("layout", args)) => {
            let report = report::run_layout(&config.masonry, &layout_request(args)?);
            print_report(&report, &report, args.get_flag("json"))
        }
        _ => bail!("no subcommand given, try --help"),
    }
}

fn kind_help() -> String {
    let names: Vec<&str> = BlockKind::ALL.iter().map(|kind| kind.as_str()).collect();
    format!("Kind of inserted blocks: {}", names.join(", "))
}

fn orders(args: &ArgMatches, id: &str) -> Vec<OrderKey> {
    args.get_many::<i64>(id)
        .into_iter()
        .flatten()
        .map(|order| OrderKey::new(*order))
        .collect()
}

fn sequence_script(args: &ArgMatches) -> SequenceScript {
    SequenceScript {
        blocks: args.get_one::<usize>("blocks").copied().unwrap_or(0),
        insert_kind: args
            .get_one::<BlockKind>("insert-kind")
            .copied()
            .unwrap_or(BlockKind::Text),
        insert_after: orders(args, "insert-after"),
        delete: orders(args, "delete"),
    }
}

fn layout_request(args: &ArgMatches) -> anyhow::Result<LayoutRequest> {
    let ratios: Vec<f32> = args
        .get_many::<f32>("ratios")
        .context("--ratios is required")?
        .copied()
        .collect();
    let mut request = LayoutRequest::new(ratios).with_size(
        args.get_one::<f32>("viewport").copied().unwrap_or(1024.0),
        args.get_one::<f32>("container").copied().unwrap_or(900.0),
    );
    for index in args.get_many::<usize>("fail").into_iter().flatten() {
        request = request.with_failed(*index);
    }
    Ok(request)
}

fn print_report(text: &impl Display, json: &impl Serialize, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(json)?);
    } else {
        print!("{text}");
    }
    Ok(())
}
