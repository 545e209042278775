//! Credential persistence for the guard node.
//!
//! The guard keeps exactly one credential: five ASCII digits at a fixed
//! offset of its EEPROM. [`CredentialStore`] reads and writes that region
//! through any [`NonVolatileMemory`](doorlock_hardware::NonVolatileMemory);
//! [`FileEeprom`] is a memory whose image survives restarts.
//!
//! # Examples
//!
//! ```
//! use doorlock_core::Credential;
//! use doorlock_hardware::mock::MemoryEeprom;
//! use doorlock_storage::CredentialStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_storage::StorageResult<()> {
//! let mut store = CredentialStore::new(MemoryEeprom::default());
//! assert!(!store.is_provisioned().await?);
//!
//! let credential: Credential = "12345".parse().unwrap();
//! store.save(&credential).await?;
//! assert_eq!(store.load().await?, credential);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_eeprom;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use file_eeprom::FileEeprom;
pub use store::CredentialStore;
