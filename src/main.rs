use anyhow::Result;
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use pagefeed::build::build_feed;
use pagefeed::config::Config;
use pagefeed::generate::Outcome;
use pagefeed::meta::meta_tag;
use std::path::PathBuf;

fn project_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("project")
        .long("project")
        .short("p")
        .takes_value(true)
        .value_name("DIR")
        .help("Directory containing (or below) pagefeed.yaml")
}

fn config(matches: &ArgMatches) -> Result<Config> {
    let dir = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    Config::from_directory(&dir)
}

fn build(matches: &ArgMatches) -> Result<()> {
    let config = config(matches)?;
    let output = match matches.value_of("output") {
        Some(output) => PathBuf::from(output),
        None => config.project_root.join("_site"),
    };
    let (outcomes, written) = build_feed(&config, &output)?;
    for (feed, outcome) in config.feeds.iter().zip(outcomes) {
        if outcome == Outcome::Skipped {
            println!(
                "{} exists in {}; not generating that feed",
                feed.path,
                config.project_root.display()
            );
        }
    }
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn meta(matches: &ArgMatches) -> Result<()> {
    let config = config(matches)?;
    println!("{}", meta_tag(&config.site)?);
    Ok(())
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let matches = App::new("pagefeed")
        .version(crate_version!())
        .about("Builds archived, cache-stable Atom feeds for a static site")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Increases logging verbosity"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Generates the feed pages")
                .arg(project_arg())
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("Output directory (defaults to _site in the project)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("meta")
                .about("Prints the feed's <link> tag")
                .arg(project_arg()),
        )
        .get_matches();

    // `-v` is global, so it may land on either side of the subcommand
    let verbosity = matches.occurrences_of("verbose")
        + matches
            .subcommand()
            .1
            .map_or(0, |sub| sub.occurrences_of("verbose"));
    init_logging(verbosity);

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("meta", Some(matches)) => meta(matches),
        _ => Ok(()),
    }
}
