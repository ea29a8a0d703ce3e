use clap::{ArgAction, Parser, ValueEnum};
use fsr_core::MatchOrder;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fsr")]
#[command(version)]
#[command(about = "Generate a new project from a reference folder by replacing words")]
#[command(long_about = "Duplicates a reference folder into a new project, replacing each word from a replacement pairs file \
    in file and directory names as well as file contents. The pairs file holds one 'WordToReplace,NewWord' pair per line.")]
#[command(after_help = "Example:\n  fsr -s \"Documents/My Project/Hello World\" -f \"Documents/My Project/keyfile.txt\"")]
pub struct Cli {
    #[arg(short, long, value_name = "DIR", help = "Path to the reference folder")]
    pub source: PathBuf,

    #[arg(short = 'f', long = "pairs", value_name = "FILE", help = "Path to the replacement pairs file")]
    pub pairs_file: PathBuf,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Where to place the generated project (defaults to the reference folder path with '(generated)' appended)"
    )]
    pub destination: Option<PathBuf>,

    #[arg(
        long,
        visible_alias = "code_mode",
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set,
        help = "Also replace the UPPERCASE, lowercase and camelCase forms of each word"
    )]
    pub code_mode: bool,

    #[arg(long, value_enum, default_value_t = Order::LongestFirst, help = "Which pair wins when search terms overlap")]
    pub order: Order,

    #[arg(long, help = "Keep file and directory names as they are")]
    pub skip_names: bool,

    #[arg(long, help = "Copy file contents without replacing words")]
    pub skip_contents: bool,

    #[arg(long, help = "Perform a dry run without writing anything")]
    pub dry_run: bool,

    #[arg(short, long, help = "Interactive mode - prompt for each change")]
    pub interactive: bool,

    #[arg(short, long, help = "Log every generated file")]
    pub verbose: bool,

    #[arg(short, long, conflicts_with = "verbose", help = "Only log errors")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Longer search terms are tried first
    LongestFirst,
    /// Pairs are tried in the order they appear in the pairs file
    Declared,
}

impl From<Order> for MatchOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::LongestFirst => MatchOrder::LongestFirst,
            Order::Declared => MatchOrder::Declared,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
