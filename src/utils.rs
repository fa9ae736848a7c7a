use std::path::{Path, PathBuf};

/// Strips surrounding whitespace and quote characters from a user-supplied
/// path. Shells and file managers like to hand over paths wrapped in quotes.
pub fn sanitize_path(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// True when the path carries the bot-definition extension, case-insensitive.
pub fn is_bot_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ibot"))
}

/// Forces a `.csv` extension onto the given path, replacing whatever is
/// there.
pub fn ensure_csv_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
        path.to_path_buf()
    } else {
        path.with_extension("csv")
    }
}

/// Default report location: `<stem>_analysis.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bot".to_string());
    input.with_file_name(format!("{stem}_analysis.csv"))
}
