use std::fs;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinedex_enrich::Cache;

/// Enrichment kinds with an on-disk cache.
const CACHE_KINDS: &[&str] = &["cast", "providers"];

/// Resolve the cache directory: CLI override, else the platform cache dir.
pub(crate) fn resolve_cache_dir(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cinedex")
}

/// List cache files with entry counts and sizes.
pub(crate) fn run_cache_list(cache_dir: Option<PathBuf>) {
    let dir = resolve_cache_dir(cache_dir);

    let mut found = false;
    let mut total_size = 0u64;
    for kind in CACHE_KINDS {
        let path = dir.join(format!("{}_cache.json", kind));
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        found = true;
        total_size += meta.len();

        // Payload shape doesn't matter for counting; load entries as raw JSON.
        let cache: Cache<serde_json::Value> = Cache::load(path.clone());
        let modified = meta
            .modified()
            .ok()
            .map(|t| {
                chrono::DateTime::<chrono::Local>::from(t)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string());

        log::info!(
            "  {} [{}]",
            kind.if_supports_color(Stdout, |t| t.bold()),
            path.display(),
        );
        log::info!(
            "    Entries: {}, Size: {}, Modified: {}",
            cache.len(),
            format_bytes(meta.len()),
            modified,
        );
    }

    if !found {
        log::info!(
            "{}",
            "No cache files.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        log::info!("Run 'cinedex enrich' to create them.");
        return;
    }
    log::info!("");
    log::info!("Total: {}", format_bytes(total_size));
}

/// Delete all cache files.
pub(crate) fn run_cache_clear(cache_dir: Option<PathBuf>) {
    let dir = resolve_cache_dir(cache_dir);

    let mut freed = 0u64;
    let mut removed = 0usize;
    for kind in CACHE_KINDS {
        let path = dir.join(format!("{}_cache.json", kind));
        if let Ok(meta) = fs::metadata(&path) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    freed += meta.len();
                    removed += 1;
                }
                Err(e) => {
                    log::warn!(
                        "{} Could not remove {}: {}",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        path.display(),
                        e,
                    );
                }
            }
        }
    }

    log::info!(
        "{} Cache cleared ({} files, {} freed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        removed,
        format_bytes(freed),
    );
}

/// Human-readable byte count.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_sensible_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
