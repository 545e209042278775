//! EEPROM image persisted to a file.
//!
//! The whole image is kept in memory and rewritten on every write. A write
//! goes to a sibling `*.tmp` file that is then renamed over the image, so a
//! crash leaves either the old or the new image on disk, never a mix.

use crate::error::{StorageError, StorageResult};
use doorlock_core::constants::EEPROM_ERASED_BYTE;
use doorlock_hardware::{NonVolatileMemory, Result, traits::check_range};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed [`NonVolatileMemory`].
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    cells: Vec<u8>,
}

impl FileEeprom {
    /// Open the image at `path`, creating an erased one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if an existing image has a
    /// different size, and `StorageError::Io` if it cannot be read or created.
    pub async fn open(path: impl Into<PathBuf>, size: usize) -> StorageResult<Self> {
        let path = path.into();

        let cells = match tokio::fs::read(&path).await {
            Ok(cells) if cells.len() == size => {
                debug!(path = %path.display(), size, "EEPROM image loaded");
                cells
            }
            Ok(cells) => {
                return Err(StorageError::Configuration(format!(
                    "EEPROM image {} is {} bytes, expected {size}",
                    path.display(),
                    cells.len()
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let cells = vec![EEPROM_ERASED_BYTE; size];
                persist(&path, &cells).await?;
                info!(path = %path.display(), size, "Created erased EEPROM image");
                cells
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, cells })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `data` at `address` to a copy of the image and commit it.
    async fn commit(&mut self, address: u16, data: &[u8]) -> Result<()> {
        check_range(address, data.len(), self.cells.len())?;

        let start = usize::from(address);
        let mut image = self.cells.clone();
        image[start..start + data.len()].copy_from_slice(data);

        persist(&self.path, &image).await?;
        self.cells = image;
        Ok(())
    }
}

impl NonVolatileMemory for FileEeprom {
    fn size(&self) -> usize {
        self.cells.len()
    }

    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        check_range(address, 1, self.cells.len())?;
        Ok(self.cells[usize::from(address)])
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        self.commit(address, &[value]).await
    }

    async fn write_bytes(&mut self, address: u16, data: &[u8]) -> Result<()> {
        self.commit(address, data).await
    }

    async fn read_bytes(&mut self, address: u16, len: usize) -> Result<Vec<u8>> {
        check_range(address, len, self.cells.len())?;
        let start = usize::from(address);
        Ok(self.cells[start..start + len].to_vec())
    }
}

/// Write `image` next to `path`, then rename it into place.
async fn persist(path: &Path, image: &[u8]) -> std::io::Result<()> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, image).await?;
    tokio::fs::rename(&tmp, path).await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_erased_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut eeprom = FileEeprom::open(&path, 256).await.unwrap();

        assert_eq!(eeprom.size(), 256);
        assert_eq!(eeprom.read_byte(0).await.unwrap(), 0xFF);
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF; 256]);
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut eeprom = FileEeprom::open(&path, 2048).await.unwrap();
        eeprom.write_bytes(0x0200, b"24680").await.unwrap();
        eeprom.write_byte(0x0000, 0x42).await.unwrap();
        drop(eeprom);

        let mut reopened = FileEeprom::open(&path, 2048).await.unwrap();
        assert_eq!(reopened.read_bytes(0x0200, 5).await.unwrap(), b"24680");
        assert_eq!(reopened.read_byte(0x0000).await.unwrap(), 0x42);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut eeprom = FileEeprom::open(&path, 64).await.unwrap();
        eeprom.write_bytes(0, b"12345").await.unwrap();

        assert!(!temp_path(&path).exists());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_size_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, vec![0u8; 100]).unwrap();

        let result = FileEeprom::open(&path, 2048).await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_write_leaves_image_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");

        let mut eeprom = FileEeprom::open(&path, 16).await.unwrap();
        assert!(eeprom.write_bytes(14, b"12345").await.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF; 16]);
    }
}
