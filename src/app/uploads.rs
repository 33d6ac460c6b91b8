use std::path::{Path, PathBuf};

use anyhow::Context;

/// Receipts accepted on payments, keyed by multipart content type. The value
/// is what gets persisted in `payments.receipt_type`.
pub fn receipt_type_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "image/jpeg" => Some("jpeg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Rejects names that could escape the upload directory.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let name = name.trim();

    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || (name.starts_with('.') && name.len() <= 2)
    {
        return None;
    }

    Some(name)
}

/// `invoice.pdf` becomes `invoice-1735689600000.pdf`; the millisecond suffix
/// keeps repeat uploads of the same name from colliding.
pub fn timestamped(name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{millis}.{ext}"),
        _ => format!("{name}-{millis}"),
    }
}

pub fn payment_dir(base: &Path, payment_id: i32) -> PathBuf {
    base.join("payments").join(payment_id.to_string())
}

pub fn asset_dir(base: &Path, asset_id: i32) -> PathBuf {
    base.join("assets").join(asset_id.to_string())
}

pub async fn store(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("cannot create upload directory `{}`", dir.display()))?;

    let path = dir.join(filename);

    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("cannot write upload `{}`", path.display()))?;

    Ok(path)
}

/// Best-effort removal of a stored file; also drops the per-record directory
/// when the file was the last one in it.
pub async fn remove(path: &Path) {
    if tokio::fs::remove_file(path).await.is_ok() {
        if let Some(parent) = path.parent() {
            // Fails while the directory still has other files; that is fine.
            let _ = tokio::fs::remove_dir(parent).await;
        }
    }
}
