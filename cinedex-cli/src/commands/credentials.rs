use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinedex_tmdb::{CredentialSource, Credentials, config_path, credential_source, save_to_file};

/// Show where the API token comes from.
pub(crate) fn run_credentials_show() {
    let source = credential_source();
    log::info!("API token: {}", source);

    if let Some(path) = config_path() {
        log::info!("Config file: {}", path.display());
    }

    if source == CredentialSource::Missing {
        log::info!("");
        log::info!("No token configured. Either:");
        log::info!("  - set the TMDB_API_TOKEN environment variable, or");
        log::info!("  - run 'cinedex credentials set <token>'");
    }
}

/// Save an API token to the config file.
pub(crate) fn run_credentials_set(token: String) {
    let token = token.trim().to_string();
    if token.is_empty() {
        log::error!("Token is empty");
        std::process::exit(1);
    }

    match save_to_file(&Credentials { api_token: token }) {
        Ok(path) => {
            log::info!(
                "{} Token saved to {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                path.display(),
            );
        }
        Err(e) => {
            log::error!(
                "{} Failed to save token: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            std::process::exit(1);
        }
    }
}
