use clap::{Parser, Subcommand};
use imgver::imaging::{ImageBackend, RustBackend, SOURCE_VERSION_NAME, VersionConfig, plan};
use imgver::pipeline::{self, UploadedFile, VersionSet};
use imgver::{config, output, storage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Shared flags for commands that work on a stored image set.
#[derive(clap::Args, Clone)]
struct SetArgs {
    /// Directory holding the stored source and its versions
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Base file name (without extension) of the stored source
    #[arg(long)]
    base_name: String,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgver")]
#[command(about = "Store uploaded images and derive named, resized versions")]
#[command(long_about = "\
Store uploaded images and derive named, resized versions

Each upload is stored once as the bounded 'source' version (1920x1200 unless
the profile says otherwise). Every other version is rendered from that copy:

  uploads/
  ├── avatar42.jpg                             # source
  ├── avatar42-thumb-100x100-crp-cen-nenl.jpg  # [versions.thumb]
  └── avatar42-icon-32x32-crp-cen-nenl.png     # [versions.icon], convert_to = \"png\"

File names encode the settings that produced them. A new upload for the same
base name deletes every file the previous one left behind, and 'restore'
regenerates a single missing version on demand.

Set RUST_LOG=debug to see every render, copy and skip.

Run 'imgver gen-config' to generate a documented version profile.")]
#[command(version = version_string())]
struct Cli {
    /// Version profile (TOML with [versions.<name>] tables)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store an image and render every configured version
    Resize {
        /// Image to store; it is copied first, the original is left in place
        input: PathBuf,
        /// Content type to declare (default: sniffed from the file)
        #[arg(long)]
        content_type: Option<String>,
        /// Destination directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Base file name (default: input file stem)
        #[arg(long)]
        base_name: Option<String>,
    },
    /// Regenerate one missing version file from the stored source
    Restore {
        /// File name of the version, with or without extension
        file_name: String,
        #[command(flatten)]
        set: SetArgs,
    },
    /// Rotate an image clockwise
    Rotate {
        path: PathBuf,
        /// Angle in degrees (negative = counter-clockwise)
        #[arg(allow_negative_numbers = true)]
        degrees: i32,
        /// Write here instead of rotating in place
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the public URL of every version
    Urls {
        /// URL prefix, e.g. https://cdn.example.com/avatars/
        #[arg(long, default_value = "/")]
        base_url: String,
        #[command(flatten)]
        set: SetArgs,
    },
    /// Print the filesystem path of every version
    Paths {
        #[command(flatten)]
        set: SetArgs,
    },
    /// Show how an image would be sized for every version, without writing
    Plan { input: PathBuf },
    /// Print a stock version profile with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let versions = match &cli.config {
        Some(path) => config::load(path)?,
        None => VersionSet::new(),
    };
    let backend = RustBackend::new();

    match cli.command {
        Command::Resize {
            input,
            content_type,
            dir,
            base_name,
        } => {
            let base_name = match base_name {
                Some(name) => name,
                None => file_stem(&input)?,
            };
            let upload = UploadedFile::stage(&input, content_type)?;
            let result = pipeline::resize(&backend, &upload, &dir, &base_name, &versions);
            storage::remove_quietly(&upload.temp_path);
            let generated = result?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&generated)?);
            } else {
                output::print_version_map(&output::resize_header(&base_name, generated.len()), &generated);
            }
        }
        Command::Restore { file_name, set } => {
            let restored = pipeline::restore_version(&backend, &file_name, &set.base_name, &set.dir, &versions)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&restored)?);
            } else {
                println!("{}", output::format_restore(&file_name, restored.as_deref()));
            }
            if restored.is_none() {
                std::process::exit(1);
            }
        }
        Command::Rotate {
            path,
            degrees,
            output: new_path,
        } => {
            let rotated = match backend.identify(&path) {
                Ok(info) => pipeline::rotate(&backend, &path, info.format, degrees, new_path.as_deref())?,
                Err(_) if !path.is_file() => false,
                Err(e) => return Err(e.into()),
            };
            if cli.json {
                println!("{}", serde_json::json!({ "rotated": rotated }));
            } else {
                println!("{}", output::format_rotate(&path, degrees, rotated));
            }
        }
        Command::Urls { base_url, set } => {
            let urls = pipeline::versions_urls(&set.dir, &base_url, &set.base_name, &versions);
            print_map(cli.json, "URLs", &urls)?;
        }
        Command::Paths { set } => {
            let paths = pipeline::versions_paths(&set.dir, &set.base_name, &versions);
            print_map(cli.json, "Paths", &paths)?;
        }
        Command::Plan { input } => {
            let info = backend.identify(&input)?;
            let mut plans = BTreeMap::new();
            if !versions.contains_key(SOURCE_VERSION_NAME) {
                plans.insert(SOURCE_VERSION_NAME.to_string(), VersionConfig::source_default());
            }
            plans.extend(versions);
            let mut json = BTreeMap::new();
            for (name, version) in &plans {
                let size_plan = plan(info.dimensions, info.format, version)?;
                if cli.json {
                    json.insert(name.clone(), size_plan);
                } else {
                    output::print_plan(name, &size_plan, version);
                }
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn print_map(json: bool, header: &str, entries: &BTreeMap<String, String>) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        output::print_version_map(header, entries);
    }
    Ok(())
}

fn file_stem(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("cannot derive a base name from {}", path.display()).into())
}
