use clap::Parser;

/// This is a quota-balancing survey sampling program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON run configuration: data source, sampling parameters and the
    /// benchmark target table. For more information about the file format, read the documentation.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path or empty) If specified, overrides the data source path from the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the run summary will be written in JSON format to
    /// the given location. Setting this option overrides the path that may be specified with the
    /// --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected summary of a run in JSON format. If
    /// provided, qsample will check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. Defaults to the first
    /// worksheet of the workbook.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// If specified, overrides the stratify column from the configuration.
    #[clap(long, value_parser)]
    pub stratify: Option<String>,

    /// If specified, overrides the total number of samples from the configuration.
    #[clap(short, long, value_parser)]
    pub samples: Option<usize>,

    /// If specified, overrides the random seed from the configuration.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// If passed as an argument, only tallies the group occurrences of the configured attributes
    /// and writes them out. No sampling is performed.
    #[clap(long, takes_value = false)]
    pub count_only: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn stratify_override_is_parsed() {
        let args = Args::try_parse_from([
            "qsample",
            "--config",
            "run.json",
            "--stratify",
            "Ethnicity",
            "--samples",
            "200",
        ])
        .unwrap();
        assert_eq!(args.stratify, Some("Ethnicity".to_string()));
        assert_eq!(args.samples, Some(200));
    }

    #[test]
    fn overrides_default_to_the_configuration() {
        let args = Args::try_parse_from(["qsample", "--config", "run.json"]).unwrap();
        assert_eq!(args.stratify, None);
        assert_eq!(args.samples, None);
        assert_eq!(args.seed, None);
    }
}
