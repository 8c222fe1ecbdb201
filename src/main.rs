use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::{Parser, Subcommand};
use content_paths::{CodecProperties, PathCodec, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Compress and expand content path lists")]
struct Args {
    /// Optional .properties file with the codec settings
    #[arg(long, global = true)]
    properties: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a file holding one content path per line
    Encode {
        /// Source file of paths
        paths_file: PathBuf,
        /// Destination of the payload
        out_file: PathBuf,
    },
    /// Print the paths stored in a payload
    Decode {
        /// Payload file
        payload_file: PathBuf,
        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
    },
    /// Print the sizes of a payload as JSON
    Inspect {
        /// Payload file
        payload_file: PathBuf,
    },
    /// Print the effective codec properties
    Properties,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let props = match &args.properties {
        Some(path) => CodecProperties::load(path)?,
        None => CodecProperties::default(),
    };
    let codec = PathCodec::new(props);

    match args.command {
        Command::Encode { paths_file, out_file } => {
            let source = fs::read_to_string(&paths_file)?;
            let paths: Vec<&str> = source.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

            let comp_time = Instant::now();
            let payload = codec.encode(&paths)?;
            let comp_time = comp_time.elapsed().as_nanos();

            fs::write(&out_file, &payload)?;
            info!("encoded {} paths into {} bytes in {}ns", paths.len(), payload.len(), comp_time);
        }
        Command::Decode { payload_file, json } => {
            let payload = fs::read(&payload_file)?;

            let decomp_time = Instant::now();
            let paths = codec.decode(&payload)?;
            let decomp_time = decomp_time.elapsed().as_nanos();
            info!("decoded {} paths in {}ns", paths.len(), decomp_time);

            if json {
                println!("{}", to_json(&paths, false)?);
            } else {
                for path in paths {
                    println!("{}", path);
                }
            }
        }
        Command::Inspect { payload_file } => {
            let payload = fs::read(&payload_file)?;
            println!("{}", to_json(&codec.inspect(&payload)?, true)?);
        }
        Command::Properties => {
            print!("{}", String::from(codec.properties()));
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };

    json.map_err(|e| std::io::Error::from(e).into())
}
