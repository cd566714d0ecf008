// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use photoscore::{
    compose_request, plan_request, score, GenreRegistry, RequestFile, ScoreWriter,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn print_usage() {
    println!("photoscore - procedural composition from image mood");
    println!();
    println!("Usage: photoscore [-v] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  plan <request>              Print the song plan for a request file");
    println!("  compose <request> <out.mid> Write the multi-track MIDI file");
    println!("  stems <request> <out_dir>   Write one MIDI file per role");
    println!("  genres                      List the genre catalog");
    println!("  --help                      Show this help message");
    println!();
    println!("Request files are YAML, or TOML when named *.toml.");
    println!("  -v                          Debug logging");
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn load_request(path: &str) -> Result<RequestFile> {
    RequestFile::load(path).with_context(|| format!("Could not load request {}", path))
}

fn plan(request_path: &str) -> Result<()> {
    let request = load_request(request_path)?;
    let plan = plan_request(&request, GenreRegistry::shared())?;
    print!("{}", plan);
    Ok(())
}

fn compose(request_path: &str, output: &str) -> Result<()> {
    let request = load_request(request_path)?;
    let composition = compose_request(&request, GenreRegistry::shared())?;
    ScoreWriter::from_composition(&composition).export(output)?;
    println!(
        "Wrote {} ({} tracks, {} notes)",
        output,
        composition.tracks.len(),
        composition.note_count()
    );
    Ok(())
}

fn stems(request_path: &str, dir: &str) -> Result<()> {
    let request = load_request(request_path)?;
    let composition = compose_request(&request, GenreRegistry::shared())?;
    let stems = score::write_stems(&composition, Path::new(dir))?;
    for (role, path) in &stems {
        println!("{:<8} {}", role, path.display());
    }
    Ok(())
}

fn list_genres() {
    for template in GenreRegistry::shared().iter() {
        let sections: Vec<String> = template
            .sections
            .iter()
            .map(|s| format!("{}{}", s.kind, if s.drop_trigger { "*" } else { "" }))
            .collect();
        println!(
            "{:<10} {:>3}-{:<3} bpm  {:>2} bars  {} [{}]",
            template.id,
            template.min_tempo,
            template.max_tempo,
            template.total_bars(),
            template.style.groove,
            sections.join(" ")
        );
    }
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.first().is_some_and(|a| a == "-v" || a == "--verbose");
    if verbose {
        args.remove(0);
    }

    if args.is_empty() {
        println!("photoscore - procedural composition from image mood");
        println!("Run with --help for usage information");
        return Ok(());
    }

    init_logging(verbose)?;

    match (args[0].as_str(), &args[1..]) {
        ("plan", [request]) => plan(request)?,
        ("compose", [request, output]) => compose(request, output)?,
        ("stems", [request, dir]) => stems(request, dir)?,
        ("genres", []) => list_genres(),
        ("--help" | "-h", _) => print_usage(),
        (command @ ("plan" | "compose" | "stems" | "genres"), _) => {
            print_usage();
            bail!("wrong number of arguments for {}", command);
        }
        (other, _) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
