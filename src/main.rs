use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vox_summarizer::audio::{self, AudioFormat, WavHeader};
use vox_summarizer::config::{self, AppConfig};
use vox_summarizer::summary;

#[derive(Parser)]
#[command(name = "vox-summarizer")]
#[command(about = "Summarize page text and turn the spoken summary into WAV audio")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "VOX_SUMMARIZER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap a raw little-endian PCM file in a WAV container
    Encode {
        /// Raw PCM input ("-" for stdin)
        input: String,
        /// WAV output file
        output: PathBuf,
        /// Channel count (default from config)
        #[arg(long)]
        channels: Option<u16>,
        /// Sample rate in Hz (default from config)
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Bits per sample (default from config)
        #[arg(long)]
        bits: Option<u16>,
    },

    /// Show the header fields of a WAV file
    Inspect {
        /// WAV file
        file: PathBuf,
    },

    /// Convert a base64 TTS payload into WAV
    Payload {
        /// Payload file ("-" for stdin)
        input: String,
        /// Write the WAV here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a data:audio/wav;base64 URI instead
        #[arg(long)]
        data_uri: bool,
    },

    /// Summarize page text with the configured providers
    Summarize {
        /// Page text file ("-" for stdin)
        input: String,
        /// Also speak the summary and write the WAV here
        #[arg(short, long)]
        audio: Option<PathBuf>,
        /// Print {"summary", "audioDataUri"} as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate example configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Encode {
            input,
            output,
            channels,
            sample_rate,
            bits,
        } => {
            let config = setup(config_path, cli.debug)?;
            encode_file(&config, &input, &output, channels, sample_rate, bits)?
        }
        Commands::Inspect { file } => {
            setup(config_path, cli.debug)?;
            inspect(&file)?
        }
        Commands::Payload {
            input,
            output,
            data_uri,
        } => {
            let config = setup(config_path, cli.debug)?;
            convert_payload(&config, &input, output.as_deref(), data_uri)?
        }
        Commands::Summarize { input, audio, json } => {
            let config = setup(config_path, cli.debug)?;
            run_summarize(&config, &input, audio.as_deref(), json).await?
        }
        Commands::InitConfig => {
            init_logging(cli.debug, "info");
            init_config(config_path)?
        }
    }

    Ok(())
}

/// Load configuration and start logging at its level
fn setup(config_path: Option<&Path>, debug: bool) -> anyhow::Result<AppConfig> {
    let config = config::load_config(config_path)?;
    init_logging(debug, &config.logging.level);
    Ok(config)
}

/// Log to stderr; stdout carries command output
fn init_logging(debug: bool, level: &str) {
    let filter = if debug {
        EnvFilter::new("vox_summarizer=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("vox_summarizer={},warn", level)))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if input == "-" {
        std::io::stdin().read_to_end(&mut bytes)?;
    } else {
        bytes = std::fs::read(input).with_context(|| format!("reading {}", input))?;
    }
    Ok(bytes)
}

fn read_text(input: &str) -> anyhow::Result<String> {
    String::from_utf8(read_input(input)?).with_context(|| format!("{} is not UTF-8 text", input))
}

fn encode_file(
    config: &AppConfig,
    input: &str,
    output: &Path,
    channels: Option<u16>,
    sample_rate: Option<u32>,
    bits: Option<u16>,
) -> anyhow::Result<()> {
    let format = AudioFormat::new(
        channels.unwrap_or(config.audio.channels),
        sample_rate.unwrap_or(config.audio.sample_rate),
        bits.unwrap_or(config.audio.bits_per_sample),
    )?;

    let pcm = read_input(input)?;
    if !format.is_frame_aligned(pcm.len()) {
        warn!(
            "{} bytes is not a whole number of {}-byte frames",
            pcm.len(),
            format.block_align()
        );
    }

    let wav = audio::encode(&pcm, format)?;
    std::fs::write(output, &wav).with_context(|| format!("writing {:?}", output))?;

    info!("Wrote {} bytes ({}) to {:?}", wav.len(), format, output);
    Ok(())
}

fn inspect(file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {:?}", file))?;
    let header = WavHeader::parse(&bytes)?;
    let format = header.format;
    let data_len = header.data_len as usize;

    println!("Channels:        {}", format.channel_count);
    println!("Sample rate:     {} Hz", format.sample_rate_hz);
    println!("Bits per sample: {}", format.bits_per_sample);
    println!("Byte rate:       {}", header.byte_rate);
    println!("Block align:     {}", header.block_align);
    println!("Data length:     {} bytes", data_len);
    println!("Frames:          {}", format.frame_count(data_len));
    println!("Duration:        {:.3}s", format.duration(data_len).as_secs_f64());

    if header.byte_rate != format.byte_rate() || header.block_align != format.block_align() {
        warn!("Byte rate or block align disagree with the sample format");
    }
    if audio::HEADER_LEN + data_len != bytes.len() {
        warn!(
            "File is {} bytes, header declares {}",
            bytes.len(),
            audio::HEADER_LEN + data_len
        );
    }

    Ok(())
}

fn convert_payload(
    config: &AppConfig,
    input: &str,
    output: Option<&Path>,
    data_uri: bool,
) -> anyhow::Result<()> {
    let payload = read_text(input)?;
    let format = config.audio_format()?;

    let pcm = audio::extract_pcm(&payload)?;
    let wav = audio::encode(&pcm, format)?;

    if let Some(path) = output {
        std::fs::write(path, &wav).with_context(|| format!("writing {:?}", path))?;
        info!("Wrote {} bytes ({}) to {:?}", wav.len(), format, path);
    }

    if data_uri || output.is_none() {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", audio::to_data_uri(&wav))?;
    }

    Ok(())
}

async fn run_summarize(
    config: &AppConfig,
    input: &str,
    audio_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let text = read_text(input)?;

    if audio_path.is_none() && !json {
        let pipeline = summary::Pipeline::new(
            summary::create_summarizer(config)?,
            config.general.max_content_chars,
        );
        println!("{}", pipeline.summarize(&text).await?);
        return Ok(());
    }

    let pipeline = summary::create_pipeline(config)?;
    let result = pipeline.generate_audio_summary(&text).await?;

    if let Some(path) = audio_path {
        let wav = audio::from_data_uri(&result.audio_data_uri)?;
        std::fs::write(path, &wav).with_context(|| format!("writing {:?}", path))?;
        info!("Wrote spoken summary to {:?}", path);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary);
    }

    Ok(())
}

fn init_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config::config_path);

    if config_path.exists() {
        eprintln!("Configuration file already exists at {:?}", config_path);
        std::process::exit(1);
    }

    config::save_config(&AppConfig::default(), &config_path)?;

    println!("Configuration file created at {:?}", config_path);
    println!("\nNext steps:");
    println!("1. Set [providers.summarizer] command to a program that reads page text on stdin");
    println!("   and prints a summary.");
    println!("2. Set [providers.tts] command to a program that reads text on stdin and prints");
    println!("   base64 PCM matching the [audio] section.");

    Ok(())
}
