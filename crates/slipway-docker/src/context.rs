use crate::error::{DockerError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// Dockerfile はコンテキスト内のファイルとして含まれている前提です。
    /// コンテキスト外の Dockerfile はサポートしません。
    pub fn create_context(context_dir: &Path) -> Result<Vec<u8>> {
        if !context_dir.is_dir() {
            return Err(DockerError::ContextNotFound(context_dir.to_path_buf()));
        }

        tracing::debug!("Creating build context from: {}", context_dir.display());

        // tarアーカイブの作成
        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            // コンテキストディレクトリを再帰的に追加
            tar.append_dir_all(".", context_dir)?;
            tar.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        // コンテキストサイズの警告
        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_create_context() {
        let temp_dir = tempdir().unwrap();

        // テスト用のファイル構造を作成
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine\nRUN echo test").unwrap();
        fs::write(temp_dir.path().join("app.py"), "print('hi')").unwrap();

        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("file3.txt"), "content3").unwrap();

        let result = ContextBuilder::create_context(temp_dir.path());
        assert!(result.is_ok());

        let archive = result.unwrap();
        assert!(!archive.is_empty());

        // tarアーカイブとして展開できるか確認
        let extract_dir = tempdir().unwrap();
        let mut archive_reader = std::io::Cursor::new(archive);
        let decoder = flate2::read::GzDecoder::new(&mut archive_reader);
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        // 中身が揃っているか確認
        assert!(extract_dir.path().join("Dockerfile").exists());
        assert!(extract_dir.path().join("app.py").exists());
        assert!(extract_dir.path().join("subdir/file3.txt").exists());
    }

    #[test]
    fn test_create_context_empty_dir() {
        let temp_dir = tempdir().unwrap();
        let result = ContextBuilder::create_context(temp_dir.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_context_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("no-such-dir");

        let result = ContextBuilder::create_context(&missing);
        assert!(matches!(result, Err(DockerError::ContextNotFound(_))));
    }
}
