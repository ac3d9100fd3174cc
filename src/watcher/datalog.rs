//! The accumulation artifact: a single-column CSV of f64 samples shared
//! between the matrix work units (writers) and the trainer (reader).

use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use ouro_core::Result;

/// Append one value per row.
pub async fn append(path: &Path, values: &[f64]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    let mut buf = String::with_capacity(values.len() * 8);
    for value in values {
        buf.push_str(&format!("{value}\n"));
    }
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Load every numeric row. Non-numeric rows are skipped with a warning;
/// a missing or empty file is `None`, which callers treat as "not yet".
pub async fn load(path: &Path) -> Option<Vec<f64>> {
    let text = tokio::fs::read_to_string(path).await.ok()?;
    let mut data = Vec::new();
    for line in text.lines() {
        let cell = line.trim();
        if cell.is_empty() {
            continue;
        }
        match cell.parse::<f64>() {
            Ok(value) => data.push(value),
            Err(_) => warn!("skipping non-numeric row {cell:?} in {}", path.display()),
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        append(&path, &[1.0, 2.5, 3.0]).await.unwrap();
        append(&path, &[4.0]).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), vec![1.0, 2.5, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn non_numeric_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        tokio::fs::write(&path, "1.0\nnot a number\n\n2.0\n")
            .await
            .unwrap();
        assert_eq!(load(&path).await.unwrap(), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn missing_or_empty_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.csv")).await.is_none());

        let path = dir.path().join("empty.csv");
        tokio::fs::write(&path, "").await.unwrap();
        assert!(load(&path).await.is_none());
    }
}
