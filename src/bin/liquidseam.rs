// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use liquidseam::{CarveConfig, EnergyBackend, ExpansionMode, SeamCarver};
use log::info;
use std::process;
use std::str::FromStr;

fn parse<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format_err!("invalid value '{}' for --{}", v, name)),
    }
}

fn run() -> Result<(), Error> {
    let matches = App::new("liquidseam")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware resizing by seam carving and seam insertion")
        .arg(
            Arg::with_name("input")
                .help("The image to resize")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the result; the format follows the extension")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .takes_value(true)
                .help("Target width (default: unchanged)"),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .takes_value(true)
                .help("Target height (default: unchanged)"),
        )
        .arg(
            Arg::with_name("batch")
                .long("batch")
                .takes_value(true)
                .help("Removals served by one luminance acquisition"),
        )
        .arg(
            Arg::with_name("backend")
                .long("backend")
                .takes_value(true)
                .possible_values(&["auto", "direct", "accelerated"])
                .help("Luminance provider"),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .takes_value(true)
                .help("Threads for the accelerated provider (0: one per CPU)"),
        )
        .arg(
            Arg::with_name("weight")
                .long("weight")
                .takes_value(true)
                .help("Weight of a pixel's own luminance in its seam cost"),
        )
        .arg(
            Arg::with_name("exact")
                .long("exact")
                .help("Insert seams at their original coordinates when expanding"),
        )
        .get_matches();

    let mut config = CarveConfig::new();
    if let Some(batch) = parse(&matches, "batch")? {
        config = config.with_batch(batch);
    }
    if let Some(backend) = parse::<EnergyBackend>(&matches, "backend")? {
        config = config.with_backend(backend);
    }
    if let Some(threads) = parse(&matches, "threads")? {
        config = config.with_threads(threads);
    }
    if let Some(weight) = parse(&matches, "weight")? {
        config = config.with_importance_weight(weight);
    }
    if matches.is_present("exact") {
        config = config.with_expansion(ExpansionMode::Exact);
    }

    // Both are required, clap has already made sure they are there.
    let input = matches.value_of("input").unwrap_or_default();
    let output = matches.value_of("output").unwrap_or_default();

    let image = image::open(input)?.to_rgba8();
    let (width, height) = image.dimensions();
    let width = parse(&matches, "width")?.unwrap_or(width);
    let height = parse(&matches, "height")?.unwrap_or(height);

    let mut carver = SeamCarver::new(config);
    let resized = carver.resize(image, width, height)?;
    resized.save(output)?;
    info!("wrote {}x{} to {}", width, height, output);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("liquidseam: {}", e);
        process::exit(1);
    }
}
