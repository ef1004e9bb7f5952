use std::io::{self, Write};
use std::path::Path;

use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::domain::UploadedFile;

/// A request upload spooled to disk. The file is removed when this value drops,
/// whichever way the request ends.
#[derive(Debug)]
pub struct TempUpload {
    upload: UploadedFile,
    _file: NamedTempFile,
}

impl TempUpload {
    pub async fn spool(
        dir: &Path,
        name: String,
        media_type: Option<String>,
        data: Bytes,
    ) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let dir = dir.to_path_buf();
        let file = tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(&dir)?;
            file.write_all(&data)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(io::Error::other)??;

        let upload = UploadedFile {
            name,
            media_type,
            path: file.path().to_path_buf(),
        };

        Ok(Self {
            upload,
            _file: file,
        })
    }

    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }

    pub fn path(&self) -> &Path {
        &self.upload.path
    }
}
