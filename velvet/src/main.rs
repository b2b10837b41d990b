use std::{
    fmt::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use velvet_lang::{
    common::{file_provider::FsFileProvider, CodeId, Config},
    error::{CompileError, Result},
    parser::{lex, lexer::token_text},
    CompileConfig,
};

/// The velvet front-end
#[derive(Parser)]
#[command(name = "velvet")]
#[command(version)]
#[command(about = "Lexes, expands and parses velvet files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of the raw file
    Lex(FileArgs),

    /// Print the ast of the macro expanded file
    Parse(FileArgs),

    /// Print the ir as json
    Ir(FileArgs),

    /// Print the inline blocks as json
    Inline(FileArgs),
}

impl Command {
    fn args(&self) -> &FileArgs {
        match self {
            Command::Lex(args) | Command::Parse(args) | Command::Ir(args) | Command::Inline(args) => {
                args
            }
        }
    }
}

#[derive(Args)]
struct FileArgs {
    /// The velvet file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Fail on types that have no entry in the type table
    #[arg(long)]
    strict_types: bool,

    /// Do not resolve import statements
    #[arg(long)]
    no_imports: bool,
}

impl FileArgs {
    fn config(&self) -> Config {
        Config {
            strict_types: self.strict_types,
            load_imports: !self.no_imports,
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn run(config: &mut CompileConfig, command: &Command, code: CodeId) -> Result<String> {
    let output = match command {
        Command::Lex(_) => {
            let source = &config.compile_context.get_input_file(code).source;
            let tokens = lex(source).map_err(|error| CompileError::ParseError { code, error })?;
            let mut output = String::new();
            for token in tokens {
                let _ = writeln!(output, "{token} {}", token_text(source, &token));
            }
            output
        }
        Command::Parse(_) => {
            let module = config.parse_file(code)?;
            #[allow(clippy::use_debug)]
            let output = format!("{:#?}", module.ast);
            output
        }
        Command::Ir(_) => {
            let document = config.compile(code)?;
            document
                .to_json()
                .unwrap_or_else(|error| unreachable!("The ir is always valid json: {error}"))
        }
        Command::Inline(_) => {
            let module = config.parse_file(code)?;
            let document = config.compute_ir(&module)?;
            serde_json::to_string_pretty(&document.inline)
                .unwrap_or_else(|error| unreachable!("Inline blocks are always valid json: {error}"))
        }
    };
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let args = cli.command.args();
    let root = args.file.parent().map(Path::to_path_buf).unwrap_or_default();
    let Some(file_name) = args.file.file_name() else {
        eprintln!("`{}` is not a file", args.file.display());
        return ExitCode::FAILURE;
    };

    let mut config = CompileConfig::new(Box::new(FsFileProvider::new(root)));
    config.compile_context.config = args.config();
    let Some(code) = config.add_file(file_name) else {
        eprintln!("Could not read file `{}`", args.file.display());
        return ExitCode::FAILURE;
    };

    match run(&mut config, &cli.command, code) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", error.format(&config.compile_context.input_files));
            ExitCode::FAILURE
        }
    }
}
