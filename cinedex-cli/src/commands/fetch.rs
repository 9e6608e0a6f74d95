use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::commands::enrich::connect_tmdb;
use crate::io;

/// Run the fetch command: download popular movie documents page by page,
/// then the genre table.
pub(crate) fn run_fetch(
    pages: Option<u32>,
    output: PathBuf,
    genres_output: PathBuf,
    language: String,
    timeout: u64,
) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        let client = match connect_tmdb(timeout, false).await {
            Some(c) => c,
            None => std::process::exit(1),
        };

        // The first page tells us how many there are.
        let first = match client.popular_movies(1, &language).await {
            Ok(page) => page,
            Err(e) => {
                log::error!(
                    "{} Failed to fetch page 1: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    e,
                );
                std::process::exit(1);
            }
        };

        let mut total_pages = first.total_pages.max(1);
        if let Some(max) = pages {
            total_pages = total_pages.min(max.max(1));
        }

        let mut documents = first.results;

        let pb = ProgressBar::new(total_pages as u64);
        pb.set_style(
            ProgressStyle::with_template("  [{bar:30.cyan/blue}] page {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb.inc(1);

        for page in 2..=total_pages {
            match client.popular_movies(page, &language).await {
                Ok(p) => documents.extend(p.results),
                Err(e) => {
                    // Keep what we have; a partial discovery file is usable.
                    pb.println(format!(
                        "  {} Failed to fetch page {}: {}",
                        "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                        page,
                        e,
                    ));
                    break;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        if let Err(e) = io::write_json(&output, &documents) {
            log::error!("Failed to write {}: {}", output.display(), e);
            std::process::exit(1);
        }
        log::info!(
            "{} {} movie documents written to {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            documents.len(),
            output.display(),
        );

        match client.genres(&language).await {
            Ok(list) => match io::write_json(&genres_output, &list.genres) {
                Ok(()) => {
                    log::info!(
                        "{} {} genres written to {}",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                        list.genres.len(),
                        genres_output.display(),
                    );
                }
                Err(e) => {
                    log::warn!("Failed to write {}: {}", genres_output.display(), e);
                }
            },
            Err(e) => {
                log::warn!("Failed to fetch genre table: {}", e);
            }
        }
    });
}
