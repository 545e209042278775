//! The credential region of the guard's EEPROM.

use crate::error::{StorageError, StorageResult};
use doorlock_core::{
    Credential, StorageConfig,
    constants::{PASSWORD_BASE_ADDRESS, PASSWORD_LENGTH},
};
use doorlock_hardware::{NonVolatileMemory, traits::check_range};
use tracing::{debug, info};

/// Reads and writes the stored credential.
///
/// The credential occupies [`PASSWORD_LENGTH`] bytes starting at the base
/// address. `save` commits all of them in a single block write, so the
/// region never holds half of an old and half of a new credential.
#[derive(Debug)]
pub struct CredentialStore<M> {
    memory: M,
    base_address: u16,
}

impl<M: NonVolatileMemory> CredentialStore<M> {
    /// Store at the default base address (`0x0200`).
    pub fn new(memory: M) -> Self {
        Self {
            memory,
            base_address: PASSWORD_BASE_ADDRESS,
        }
    }

    /// Store at the address configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the region does not fit in
    /// the memory.
    pub fn with_config(memory: M, config: &StorageConfig) -> StorageResult<Self> {
        Self::with_base_address(memory, config.password_base_address)
    }

    /// Store at an explicit base address.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the region does not fit in
    /// the memory.
    pub fn with_base_address(memory: M, base_address: u16) -> StorageResult<Self> {
        check_range(base_address, PASSWORD_LENGTH, memory.size()).map_err(|e| {
            StorageError::Configuration(format!("credential region does not fit: {e}"))
        })?;
        Ok(Self {
            memory,
            base_address,
        })
    }

    pub fn base_address(&self) -> u16 {
        self.base_address
    }

    /// Persist `credential`, replacing the previous one.
    pub async fn save(&mut self, credential: &Credential) -> StorageResult<()> {
        self.memory
            .write_bytes(self.base_address, credential.as_bytes())
            .await?;
        info!(address = self.base_address, "Credential saved");
        Ok(())
    }

    /// Read the stored credential back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the region does not hold five ASCII
    /// digits, e.g. a blank (`0xFF`) EEPROM.
    pub async fn load(&mut self) -> StorageResult<Credential> {
        let bytes = self
            .memory
            .read_bytes(self.base_address, PASSWORD_LENGTH)
            .await?;

        let credential = Credential::new(&bytes).map_err(|e| StorageError::Corrupt {
            address: self.base_address,
            message: e.to_string(),
        })?;
        debug!(address = self.base_address, "Credential loaded");
        Ok(credential)
    }

    /// Whether the region currently holds a valid credential.
    pub async fn is_provisioned(&mut self) -> StorageResult<bool> {
        match self.load().await {
            Ok(_) => Ok(true),
            Err(StorageError::Corrupt { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn into_inner(self) -> M {
        self.memory
    }
}
