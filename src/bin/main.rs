use std::path::PathBuf;

use tagwm::errors::MainError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "config.lua";
const TEMPLATE: &str = include_str!("../../templates/config.lua");

enum Args {
    Exit,
    Run { config: Option<PathBuf> },
    Error(MainError),
}

fn main() -> Result<(), MainError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagwm=info")),
        )
        .init();

    let config_path = match process_args() {
        Args::Exit => return Ok(()),
        Args::Run { config } => config,
        Args::Error(e) => return Err(e),
    };

    let config = load_config(config_path)?;

    let mut window_manager =
        tagwm::window_manager::WindowManager::new(config).map_err(MainError::CouldNotStartWm)?;
    window_manager.run().map_err(MainError::WmError)?;

    Ok(())
}

fn load_config(custom_path: Option<PathBuf>) -> Result<tagwm::Config, MainError> {
    let path = match custom_path {
        Some(path) => path,
        None => get_config_path()?.join(CONFIG_FILE),
    };

    if !path.exists() {
        info!("no config at {}, using defaults", path.display());
        return Ok(tagwm::Config::default());
    }

    let source = std::fs::read_to_string(&path).map_err(MainError::FailedReadConfig)?;
    let mut config = match tagwm::config::parse_lua_config(&source, path.parent()) {
        Ok(config) => config,
        Err(error) => {
            warn!("{}: {error}; falling back to the built-in config", path.display());
            tagwm::config::parse_lua_config(TEMPLATE, None)
                .map_err(MainError::FailedReadConfigTemplate)?
        }
    };
    config.path = Some(path);
    Ok(config)
}

fn get_config_path() -> Result<PathBuf, MainError> {
    dirs::config_dir()
        .map(|dir| dir.join("tagwm"))
        .ok_or(MainError::NoConfigDir)
}

fn print_help() {
    println!("tagwm - a dynamic tiling window manager\n");
    println!("USAGE:");
    println!("    tagwm [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --config <PATH>     Use a custom config file");
    println!("    -v, --version       Print version information");
    println!("    --help              Print this help message\n");
    println!("CONFIG:");
    println!("    Location: ~/.config/tagwm/config.lua");
    println!("    Startup script: ~/.config/tagwm/startup.sh");
}

fn process_args() -> Args {
    let mut args = std::env::args();
    if args.next().is_none() {
        return Args::Error(MainError::NoProgramName);
    }
    let Some(switch) = args.next() else {
        return Args::Run { config: None };
    };
    let path = args.next();
    if args.next().is_some() {
        return Args::Error(MainError::InvalidArguments);
    }

    match switch.as_str() {
        "-v" | "--version" if path.is_none() => {
            println!("tagwm-{}", env!("CARGO_PKG_VERSION"));
            Args::Exit
        }
        "--help" if path.is_none() => {
            print_help();
            Args::Exit
        }
        "--config" => match check_custom_config(path) {
            Ok(config) => Args::Run {
                config: Some(config),
            },
            Err(e) => Args::Error(e),
        },
        _ => Args::Error(MainError::InvalidArguments),
    }
}

fn check_custom_config(path: Option<String>) -> Result<PathBuf, MainError> {
    let path = path.ok_or(MainError::NoConfigPath)?;
    match std::fs::exists(&path) {
        Ok(true) => Ok(PathBuf::from(path)),
        Ok(false) => Err(MainError::BadConfigPath),
        Err(e) => Err(MainError::FailedCheckExist(e)),
    }
}
