//! JSON-file persistence for single-node deployments.
//!
//! One file per document: `{data_dir}/{collection}/{id}.json`. Blobs live
//! under `{data_dir}/blobs/` as a payload file plus a small JSON sidecar
//! carrying the original filename. Ids are sanitized to a conservative
//! character set before touching the filesystem.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::ports::{BlobError, BlobStore, DocumentStore, StoreError};
use std::path::PathBuf;
use uuid::Uuid;

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Document store writing one JSON file per aggregate.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root
            .join(sanitize(collection))
            .join(format!("{}.json", sanitize(id)))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn save(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let path = self.doc_path(collection, id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(&document).map_err(|e| StoreError::Serialize {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let path = self.doc_path(collection, id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Backend(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let dir = self.root.join(sanitize(collection));
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };
        let mut out = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            match tokio::fs::read(&path).await {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(doc) => out.push((id, doc)),
                    // Hand the unreadable document up; hydration logs and skips.
                    Err(_) => out.push((id, Value::Null)),
                },
                Err(e) => return Err(StoreError::Backend(e.to_string())),
            }
        }
        Ok(out)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.doc_path(collection, id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}

/// Blob store writing payload + filename sidecar per blob.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn payload_path(&self, blob_id: &str) -> PathBuf {
        self.root.join(format!("{}.bin", sanitize(blob_id)))
    }

    fn meta_path(&self, blob_id: &str) -> PathBuf {
        self.root.join(format!("{}.meta.json", sanitize(blob_id)))
    }

    async fn ensure_root(&self) -> Result<(), BlobError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        self.ensure_root().await?;
        let blob_id = Uuid::new_v4().to_string();
        tokio::fs::write(self.payload_path(&blob_id), bytes)
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;
        let meta = serde_json::json!({ "filename": filename });
        tokio::fs::write(self.meta_path(&blob_id), meta.to_string())
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;
        Ok(blob_id)
    }

    async fn get(&self, blob_id: &str) -> Result<(String, Vec<u8>), BlobError> {
        let bytes = match tokio::fs::read(self.payload_path(blob_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound(blob_id.to_string()))
            }
            Err(e) => return Err(BlobError::Backend(e.to_string())),
        };
        let filename = match tokio::fs::read(self.meta_path(blob_id)).await {
            Ok(meta_bytes) => serde_json::from_slice::<Value>(&meta_bytes)
                .ok()
                .and_then(|m| m["filename"].as_str().map(str::to_string))
                .unwrap_or_else(|| blob_id.to_string()),
            Err(_) => blob_id.to_string(),
        };
        Ok((filename, bytes))
    }

    async fn delete(&self, blob_id: &str) -> Result<(), BlobError> {
        for path in [self.payload_path(blob_id), self.meta_path(blob_id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(BlobError::Backend(e.to_string())),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .save("cases", "20260807-AB:1", serde_json::json!({"x": 1}))
            .await
            .unwrap();
        assert_eq!(
            store.load("cases", "20260807-AB:1").await.unwrap().unwrap()["x"],
            1
        );
        let all = store.find_all("cases").await.unwrap();
        assert_eq!(all.len(), 1);

        store.delete("cases", "20260807-AB:1").await.unwrap();
        assert!(store.load("cases", "20260807-AB:1").await.unwrap().is_none());
        // Deleting twice is not an error.
        store.delete("cases", "20260807-AB:1").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_all_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.find_all("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blob_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FileBlobStore::new(dir.path().join("blobs"));

        let id = blobs.put("evidence.png", vec![1, 2, 3]).await.unwrap();
        let (filename, bytes) = blobs.get(&id).await.unwrap();
        assert_eq!(filename, "evidence.png");
        assert_eq!(bytes, vec![1, 2, 3]);

        blobs.delete(&id).await.unwrap();
        assert!(matches!(blobs.get(&id).await, Err(BlobError::NotFound(_))));
    }
}
