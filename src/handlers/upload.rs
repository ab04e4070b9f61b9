use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::AppError;
use crate::pages;
use crate::state::AppState;

const MISSING_FILE: &str = "Choose a file to upload";
const INVALID_NAME: &str = "That file name cannot be stored";

// Leaves room for a `_N` suffix under the usual 255 byte file name limit
const MAX_NAME_BYTES: usize = 240;

pub async fn upload_form_handler() -> Html<String> {
    pages::upload_form(None)
}

// Streams the `file` field to disk, bailing out as soon as it passes the size limit
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let Some(name) = field.file_name().and_then(sanitize_file_name) else {
            return Ok(missing_file());
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if (data.len() + chunk.len()) as u64 > state.max_upload_bytes {
                tracing::warn!(file = %name, limit = state.max_upload_bytes, "upload too large");
                return Ok((StatusCode::PAYLOAD_TOO_LARGE, pages::file_size_error()).into_response());
            }
            data.extend_from_slice(&chunk);
        }

        // empty files are treated like no file at all
        if data.is_empty() {
            return Ok(missing_file());
        }

        let path = match store(&state.upload_dir, &name, &data).await {
            Ok(path) => path,
            Err(AppError::Io(e)) if e.kind() == ErrorKind::InvalidInput => {
                tracing::warn!(file = %name, error = %e, "rejected file name");
                return Ok(
                    (StatusCode::BAD_REQUEST, pages::upload_form(Some(INVALID_NAME))).into_response()
                );
            }
            Err(e) => return Err(e),
        };
        tracing::info!(path = %path.display(), bytes = data.len(), "saved file");

        let saved_as = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(name);
        return Ok(pages::upload_form(Some(&format!("Saved as {saved_as}"))).into_response());
    }

    Ok(missing_file())
}

fn missing_file() -> Response {
    (StatusCode::BAD_REQUEST, pages::upload_form(Some(MISSING_FILE))).into_response()
}

// Keeps only the last path component of a client supplied name, cut to
// MAX_NAME_BYTES on a char boundary
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if matches!(name, "" | "." | "..") || name.contains('\0') {
        return None;
    }

    let mut end = name.len().min(MAX_NAME_BYTES);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    Some(name[..end].to_string())
}

fn candidate(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    }
}

// Writes `data` under `dir`, picking `stem_N.ext` if the name is taken
async fn store(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).await?;

    let mut n = 0;
    loop {
        let path = dir.join(candidate(name, n));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(mut file) => {
                file.write_all(data).await?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
