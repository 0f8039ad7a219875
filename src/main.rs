use clap::{Arg, ArgAction, Command as ClapCommand};
use log::error;
use std::process;

use patchkit::commands::{CommandFactory, PatchkitCommandFactory};
use patchkit::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("PatchKit")
        .version("0.1")
        .about("Slice, georeference and index map sheet patches")
        .arg(
            Arg::new("input")
                .help("Directory holding the parent rasters")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .help("Regex filter for parent file names")
                .value_name("REGEX")
                .required(false),
        )
        .arg(
            Arg::new("patches")
                .long("patches")
                .help("Directory holding existing patch files to index")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("metadata")
                .long("metadata")
                .help("Delimited metadata table to merge onto parents")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("metadata-level")
                .long("metadata-level")
                .help("Tree level the metadata rows describe (parent or child)")
                .value_name("LEVEL")
                .default_value("parent")
                .required(false),
        )
        .arg(
            Arg::new("delimiter")
                .long("delimiter")
                .help("Column delimiter for table files")
                .value_name("CHAR")
                .default_value("|")
                .required(false),
        )
        .arg(
            Arg::new("export-dir")
                .long("export-dir")
                .help("Directory to write parents.csv and patches.csv into")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("slice")
                .short('s')
                .long("slice")
                .help("Slice parents into patches")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("slice-size")
                .long("slice-size")
                .help("Patch size in pixels or meters, per --method")
                .value_name("SIZE")
                .default_value("100")
                .required(false),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .help("Slice sizing method (pixel or meters)")
                .value_name("METHOD")
                .default_value("pixel")
                .required(false),
        )
        .arg(
            Arg::new("square-cuts")
                .long("square-cuts")
                .help("Force every patch to the full slice size")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("resize")
                .long("resize")
                .help("Scale factor for written patch rasters")
                .value_name("FACTOR")
                .required(false),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Output format for patch files")
                .value_name("EXT")
                .default_value("png")
                .required(false),
        )
        .arg(
            Arg::new("rewrite")
                .long("rewrite")
                .help("Rewrite patch files that already exist")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory receiving patch files")
                .value_name("DIR")
                .default_value("sliced_images")
                .required(false),
        )
        .arg(
            Arg::new("range")
                .long("range")
                .help("Parent position range to slice, as 'start,end' (-1 = open end)")
                .value_name("RANGE")
                .required(false),
        )
        .arg(
            Arg::new("georef")
                .short('g')
                .long("georef")
                .help("Add geographic info from raster headers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("distance-method")
                .long("distance-method")
                .help("Distance formula (geodesic or great-circle)")
                .value_name("METHOD")
                .default_value("great-circle")
                .required(false),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Compute pixel statistics for indexed patches")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parent-id")
                .long("parent-id")
                .help("Restrict statistics to one parent's patches")
                .value_name("ID")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Mirror log output to this file")
                .value_name("FILE")
                .required(false),
        )
        .get_matches();

    if let Err(e) = Logger::init(matches.get_one::<String>("log-file").map(String::as_str)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let factory = PatchkitCommandFactory::new();
    let command = match factory.create_command(&matches) {
        Ok(command) => command,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = command.execute() {
        error!("{}", e);
        process::exit(1);
    }
}
