//! `dva`: ejecuta los nodos de audio desde la línea de comandos.
//!
//! La configuración sale de `--config <toml>` y de las variables `DVA_*`.

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dva_cli::{init_tracing, outputs_to_json};
use dva_library::{DEFAULT_PATTERNS, list_input_files};
use dva_nodes::{Plugin, PluginConfig, Value};
use dva_probe::audio::AudioRef;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "dva", about = "Audio duration and metadata nodes")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the load report (nodes, dependencies, categories)
    Welcome,
    /// Describe every registered node as JSON
    Nodes,
    /// List audio files in the input directory
    List,
    /// Load a file from the input directory
    Load {
        /// File name relative to the input directory
        file: String,
    },
    /// Compute the duration of an audio file
    Duration {
        /// Path or name of a file in the host directories
        audio: String,
        /// accurate, fast or auto
        #[arg(long, default_value = "auto")]
        mode: String,
        /// Decimal places, 0 to 6
        #[arg(long, default_value_t = 3)]
        precision: i64,
        /// Drop silent windows from the duration
        #[arg(long)]
        exclude_silence: bool,
        /// Silence threshold in dBFS
        #[arg(long, default_value_t = -60.0, allow_negative_numbers = true)]
        threshold: f64,
    },
    /// Extract metadata from an audio file
    Metadata {
        /// Path or name of a file in the host directories
        audio: String,
        #[arg(long)]
        no_format: bool,
        #[arg(long)]
        no_technical: bool,
        /// Include tags
        #[arg(long)]
        tags: bool,
    },
    /// Process every matching file in a directory
    Batch {
        directory: PathBuf,
        /// Comma separated shell patterns
        #[arg(long, default_value = DEFAULT_PATTERNS)]
        pattern: String,
        /// duration, metadata or both
        #[arg(long, default_value = "both")]
        operation: String,
        /// Only the top level of the directory
        #[arg(long)]
        flat: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn run_node(plugin: &Plugin, id: &str, inputs: Vec<(&str, Value)>) -> anyhow::Result<()> {
    let node = plugin.registry().get(id).with_context(|| format!("Node '{id}' not registered"))?;
    let inputs: BTreeMap<String, Value> = inputs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();

    let values = plugin.invoke(id, inputs)?;
    print_json(&outputs_to_json(node.outputs(), &values))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = PluginConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // el informe solo se imprime con `welcome`
    config.welcome = false;
    let plugin = Plugin::load(config).context("Failed to load the plugin")?;

    match cli.command {
        Commands::Welcome => println!("{}", plugin.welcome()),
        Commands::Nodes => print_json(&plugin.registry().info())?,
        Commands::List => {
            let files = plugin.probe().dirs().map(list_input_files).unwrap_or_default();
            print_json(&files)?;
        }
        Commands::Load { file } => {
            run_node(&plugin, "DVA_Load_Audio_File", vec![("audio_file", file.into())])?;
        }
        Commands::Duration {
            audio,
            mode,
            precision,
            exclude_silence,
            threshold,
        } => {
            run_node(
                &plugin,
                "DVA_Audio_Duration_Calculator",
                vec![
                    ("audio", AudioRef::from(audio.as_str()).into()),
                    ("calculation_mode", mode.into()),
                    ("time_precision", precision.into()),
                    ("include_silence", (!exclude_silence).into()),
                    ("silence_threshold_db", threshold.into()),
                ],
            )?;
        }
        Commands::Metadata {
            audio,
            no_format,
            no_technical,
            tags,
        } => {
            run_node(
                &plugin,
                "DVA_Audio_Metadata_Extractor",
                vec![
                    ("audio", AudioRef::from(audio.as_str()).into()),
                    ("extract_format", (!no_format).into()),
                    ("extract_technical", (!no_technical).into()),
                    ("extract_tags", tags.into()),
                ],
            )?;
        }
        Commands::Batch {
            directory,
            pattern,
            operation,
            flat,
        } => {
            run_node(
                &plugin,
                "DVA_Audio_Batch_Processor",
                vec![
                    ("directory_path", directory.to_string_lossy().into_owned().into()),
                    ("file_pattern", pattern.into()),
                    ("operation", operation.into()),
                    ("recursive", (!flat).into()),
                ],
            )?;
        }
        Commands::Config => {}
    }

    Ok(())
}
