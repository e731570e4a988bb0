use clap::{Arg, ArgAction, Command};
fn verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Debug mode")
}

fn threads() -> Arg {
    Arg::new("threads")
        .short('t')
        .long("threads")
        .default_value("1")
        .help("number of threads")
}

fn subcommand_import() -> Command {
    Command::new("import")
        .version("0.1")
        .author("ban-m")
        .about("Extract prophage calls from a tool's table. Write a call table to the STDOUT.")
        .arg(verbose())
        .arg(
            Arg::new("tool")
                .short('t')
                .long("tool")
                .required(true)
                .value_parser(["geNomad", "VIBRANT", "VirSorter2"])
                .ignore_case(true)
                .help("The tool which made the table."),
        )
        .arg(
            Arg::new("column")
                .short('c')
                .long("column")
                .required(true)
                .action(ArgAction::Append)
                .value_name("COLUMN")
                .help("Identifier column (e.g., seqname, scaffold). The first one found is used."),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .required(true)
                .value_name("TABLE")
                .help("Tab-separated table with a header."),
        )
}

fn subcommand_consensus() -> Command {
    Command::new("consensus")
        .version("0.1")
        .author("ban-m")
        .about("Cluster the calls and resolve consensus coordinates.")
        .arg(verbose())
        .arg(threads())
        .arg(
            Arg::new("calls")
                .short('c')
                .long("calls")
                .required(true)
                .action(ArgAction::Append)
                .value_name("CALLS")
                .help("Call table(s). Columns: tool, contig, start, end, raw_id."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .required(true)
                .value_name("PREFIX")
                .help("Write PREFIX.consensus.tsv and PREFIX.id_map.tsv."),
        )
        .arg(
            Arg::new("overlap_threshold")
                .long("overlap_threshold")
                .default_value("0.5")
                .help("Minimum reciprocal overlap to merge a call into a cluster."),
        )
        .arg(
            Arg::new("max_distance")
                .long("max_distance")
                .default_value("1000")
                .help("Maximum gap (bp) to merge a call into a cluster."),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .default_value("200")
                .help("Maximum difference (bp) between agreeing coordinates."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .value_name("PATH")
                .help("Dump the clusters, the consensus, and the identifier map as JSON."),
        )
}

fn subcommand_homogenize() -> Command {
    Command::new("homogenize")
        .version("0.1")
        .author("ban-m")
        .about("Rewrite an identifier column into consensus identifiers.")
        .arg(verbose())
        .arg(
            Arg::new("map")
                .short('m')
                .long("map")
                .required(true)
                .value_name("ID_MAP")
                .help("Identifier map (raw_id, consensus_id)."),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .required(true)
                .value_name("TABLE"),
        )
        .arg(
            Arg::new("column")
                .short('c')
                .long("column")
                .required(true)
                .action(ArgAction::Append)
                .value_name("COLUMN")
                .help("The column of the identifiers. The first one found is used."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .required(true)
                .value_name("PATH"),
        )
}

fn subcommand_pipeline() -> Command {
    Command::new("pipeline")
        .version("0.1")
        .author("ban-m")
        .about("Run pipeline based on the given TOML file.")
        .arg(verbose().help("Debug mode. Overrides `verbose` in the profile."))
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .required(true)
                .help("TOML configuration file. See procon.toml for an example."),
        )
}

pub fn procon_parser() -> Command {
    Command::new("procon")
        .version("0.1")
        .author("ban-m")
        .about("Reconcile prophage coordinates predicted by several tools")
        .arg_required_else_help(true)
        .subcommand(subcommand_import())
        .subcommand(subcommand_consensus())
        .subcommand(subcommand_homogenize())
        .subcommand(subcommand_pipeline())
}
