use clap::{ArgAction, Parser};
use columncrypt::cli::{banner, format_summary, run, RunOptions};
use columncrypt::logging::init_logging;
use columncrypt::options::parse_delimiter;
use columncrypt::{OaepHash, Operation};
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("COLUMNCRYPT_VERSION");
const BUILD: &str = env!("COLUMNCRYPT_BUILD");
const PROFILE: &str = env!("COLUMNCRYPT_PROFILE");
const GIT_HASH: &str = env!("COLUMNCRYPT_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "columncrypt")]
#[command(author, version = get_version(), about = "Hash and encrypt (or decrypt) columns of a delimited file", long_about = None)]
struct Cli {
    /// Input file
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Field delimiter of the input file
    #[arg(short = 'd', long, default_value = ":", value_parser = parse_delim)]
    delimiter: u8,

    /// Field delimiter of the output file
    #[arg(long, default_value = ":", value_parser = parse_delim)]
    output_delimiter: u8,

    /// Column to process (zero-based); repeatable, several values allowed
    #[arg(short = 'c', long = "column", required = true, num_args = 1.., action = ArgAction::Append)]
    columns: Vec<usize>,

    /// Public key (encrypt) or private key (decrypt), PEM or DER
    #[arg(short = 'k', long)]
    key: PathBuf,

    /// encrypt: hash and encrypt; decrypt: recover plaintext
    #[arg(short = 'o', long, default_value = "encrypt", value_parser = parse_operation)]
    operation: Operation,

    /// Header row (1-based); 0 means the file has no header
    #[arg(long, default_value_t = 0)]
    header: usize,

    /// Output file [default: <file>.encrypted or <file>.decrypted]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Digest used by OAEP padding
    #[arg(long, default_value = "sha1", value_parser = parse_oaep_hash)]
    oaep_hash: OaepHash,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_delim(s: &str) -> Result<u8, String> {
    parse_delimiter(s).map_err(|e| format!("{}", e))
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_oaep_hash(s: &str) -> Result<OaepHash, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = RunOptions {
        input: cli.file,
        output: cli.output,
        delimiter: cli.delimiter,
        output_delimiter: cli.output_delimiter,
        columns: cli.columns,
        key: cli.key,
        operation: cli.operation,
        header: (cli.header > 0).then_some(cli.header),
        oaep_hash: cli.oaep_hash,
    };

    println!("{}", banner(options.operation));

    match run(&options) {
        Ok(summary) => {
            print!("{}", format_summary(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
