use std::{process, time::Duration};

use anyhow::{Context, Result};
use clap::{arg, crate_authors, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use pad::PadStr;
use tcpmon::{
    config::{self, IpFamily, ProbeConfig},
    logger, CheckResult, ConfigError, Job, JobReport,
};

struct ParsedArgs {
    debug: bool,
    json: bool,
    config: ProbeConfig,
}

fn parse_args(matches: ArgMatches) -> Result<ParsedArgs, ConfigError> {
    let debug = matches.get_flag("debug");
    let json = matches.get_flag("json");

    let ports = matches
        .get_many::<String>("port")
        .into_iter()
        .flatten()
        .map(|rp| config::parse_port(rp))
        .collect::<Result<Vec<_>, _>>()?;

    let hosts = matches
        .get_many::<String>("hosts")
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let ip_family = match (matches.get_flag("ipv4"), matches.get_flag("ipv6")) {
        (true, false) => IpFamily::Ipv4,
        (false, true) => IpFamily::Ipv6,
        _ => IpFamily::Any,
    };

    let mut config = ProbeConfig::new(hosts, ports).with_ip_family(ip_family);
    if let Some(&secs) = matches.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(ParsedArgs {
        debug,
        json,
        config,
    })
}

fn describe(result: &CheckResult) -> String {
    match (&result.error, &result.dial) {
        (Some(err), _) => err.message.clone(),
        (None, Some(dial)) => format!("{:.3}ms", dial.duration.as_secs_f64() * 1000.0),
        (None, None) => String::new(),
    }
}

fn print_table(report: &JobReport) {
    let mut out = format!("Check Duration: {:.4}s\n\n", report.elapsed.as_secs_f32());
    out.push_str(&format!(
        "{}{}{}Detail\n",
        "Monitor".pad_to_width(32),
        "Status".pad_to_width(8),
        "IP".pad_to_width(18),
    ));

    report.results.iter().for_each(|r| {
        let ip = r.resolved_ip.map(|ip| ip.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{}{}{}{}\n",
            r.target.id.pad_to_width(32),
            r.status.to_string().pad_to_width(8),
            ip.pad_to_width(18),
            describe(r),
        ));
    });

    print!("{}", out);
}

fn print_events(report: &JobReport) -> Result<()> {
    for result in &report.results {
        println!(
            "{}",
            serde_json::to_string(result).context("failed to encode event")?
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let arg_matches = Command::new(crate_name!())
        .about(
            "Checks that TCP ports accept connections.\n\
            Every host is checked against every port.",
        )
        .version(crate_version!())
        .arg_required_else_help(true)
        .author(crate_authors!())
        .args([
            // Miscellaneous arguments.
            arg!(-d --debug "Turns on debugging information").action(ArgAction::SetTrue),
            arg!(-j --json "Prints one JSON event per target").action(ArgAction::SetTrue),
            arg!(-t --timeout <SECS> "Bound for each of the resolve and dial phases")
                .value_parser(clap::value_parser!(u64)),
        ])
        .args([
            // Target selection.
            Arg::new("ipv4")
                .short('4')
                .long("ipv4")
                .help("Only use IPv4 addresses")
                .action(ArgAction::SetTrue),
            Arg::new("ipv6")
                .short('6')
                .long("ipv6")
                .help("Only use IPv6 addresses")
                .action(ArgAction::SetTrue)
                .conflicts_with("ipv4"),
            arg!(-p --port <PORT> "One or more ports separated by a comma")
                .value_delimiter(',')
                .required(true),
            arg!(<hosts> ... "Addresses or hostnames to check"),
        ])
        .get_matches();

    // Extract arguments.
    let parsed = parse_args(arg_matches)?;

    // Set debug if desired.
    if parsed.debug {
        logger::init();
    }

    // Validate and expand targets.
    let job = Job::new(parsed.config)?;

    // Check all targets.
    let report = job.run();

    // Show result.
    if parsed.json {
        print_events(&report)?;
    } else {
        print_table(&report);
    }

    if !report.all_up() {
        process::exit(1);
    }

    Ok(())
}
