use std::{fs, path::Path};

use anyhow::Context;

pub fn load_queries(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read queries file {}", path.display()))?;

    Ok(parse_queries(&contents))
}

pub fn parse_queries(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
