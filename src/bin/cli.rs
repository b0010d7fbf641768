use clap::{App, Arg, ArgMatches};
use nbtee::{install_handlers, parse_size, InputSpec, OverflowPolicy, Reactor, Result, TeeConfig};
use std::{path::PathBuf, process};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = App::new("nbtee")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copy input to STDOUT and to any number of Unix socket and FIFO readers without blocking")
        .arg(
            Arg::with_name("no_stdout")
                .short("n")
                .long("no-stdout")
                .help("Do not copy input to STDOUT"),
        )
        .arg(
            Arg::with_name("unlink_before")
                .short("b")
                .long("unlink-before")
                .help("Unlink existing sockets at the target paths before binding"),
        )
        .arg(
            Arg::with_name("unlink_after")
                .short("u")
                .long("unlink-after")
                .help("Unlink all sockets and FIFOs on exit"),
        )
        .arg(
            Arg::with_name("max_queue")
                .short("m")
                .long("max-queue")
                .value_name("BYTES")
                .help("Maximum bytes queued per reader; k, M and G suffixes accepted")
                .default_value("64k")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no_overflow")
                .short("d")
                .long("no-overflow")
                .help("Disconnect readers that would otherwise lose data"),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .value_name("FILE")
                .help("Read from FILE instead of STDIN")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("input_reopen")
                .short("I")
                .long("input-reopen")
                .value_name("FILE")
                .help("Read from FILE, reopening it at end of input")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("targets")
                .value_name("TARGET")
                .help("Socket paths to listen on, or existing FIFOs to write to")
                .multiple(true),
        )
        .get_matches();

    process::exit(run(&matches));
}

fn run(matches: &ArgMatches) -> i32 {
    let config = match build_config(matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return e.exit_code();
        }
    };

    let shutdown = match install_handlers() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            log::error!("{}", e);
            return e.exit_code();
        }
    };

    let mut reactor = match Reactor::new(config, shutdown) {
        Ok(reactor) => reactor,
        Err(e) => {
            log::error!("{}", e);
            return e.exit_code();
        }
    };

    let code = match reactor.run() {
        Ok(termination) => {
            log::debug!("finished: {:?}", termination);
            termination.exit_code()
        }
        Err(e) => {
            log::error!("{}", e);
            e.exit_code()
        }
    };

    reactor.cleanup();
    code
}

fn build_config(matches: &ArgMatches) -> Result<TeeConfig> {
    let max_queue = parse_size(matches.value_of("max_queue").unwrap_or("64k"))?;

    let input = match (matches.value_of("input_reopen"), matches.value_of("input")) {
        (Some(path), _) => InputSpec::Path {
            path: PathBuf::from(path),
            reopen: true,
        },
        (None, Some(path)) => InputSpec::Path {
            path: PathBuf::from(path),
            reopen: false,
        },
        (None, None) => InputSpec::Stdin,
    };

    let policy = if matches.is_present("no_overflow") {
        OverflowPolicy::Disconnect
    } else {
        OverflowPolicy::Drop
    };

    let mut config = TeeConfig::new()
        .with_mirror_stdout(!matches.is_present("no_stdout"))
        .with_unlink_before(matches.is_present("unlink_before"))
        .with_unlink_after(matches.is_present("unlink_after"))
        .with_max_queue(max_queue)
        .with_overflow_policy(policy)
        .with_input(input);

    for target in matches.values_of("targets").into_iter().flatten() {
        config = config.with_target(target);
    }

    config.validate()?;
    Ok(config)
}
