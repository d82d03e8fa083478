use crate::core::errors::Result;
use crate::core::models::engine_io::{
    DeleteOutcome, DeleteTarget, EncryptRequest, GenerateOutcome, ImportOutcome, KeyGenParams,
    OpOutcome, RawKey, SignRequest,
};
use crate::core::models::key_record::KeyScope;
use crate::core::models::verification::Verification;

/// Port for the OpenPGP engine.
///
/// Implementations live in `adapters` (e.g. `GpgEngine`). An `Err` from any
/// method means the engine could not be reached or spoke nonsense; an
/// engine-reported failure comes back inside the outcome record instead.
pub trait Engine: Send + Sync {
    /// List every key in the public or secret keyring.
    fn list_keys(&self, scope: KeyScope) -> Result<Vec<RawKey>>;

    fn generate(&self, params: &KeyGenParams) -> Result<GenerateOutcome>;

    fn import(&self, material: &[u8]) -> Result<ImportOutcome>;

    /// Armored key material in the payload; `ok == false` when nothing was exported.
    fn export(&self, identifier: &str, scope: KeyScope, passphrase: Option<&str>)
    -> Result<OpOutcome>;

    fn encrypt(&self, data: &[u8], request: &EncryptRequest) -> Result<OpOutcome>;

    fn decrypt(&self, data: &[u8], passphrase: Option<&str>) -> Result<OpOutcome>;

    fn sign(&self, data: &[u8], request: &SignRequest) -> Result<OpOutcome>;

    fn verify(&self, signed: &[u8]) -> Result<Verification>;

    fn delete(
        &self,
        identifiers: &[String],
        target: DeleteTarget,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome>;

    /// Engine version string.
    fn version(&self) -> Result<String>;

    /// Human-readable name of this engine (e.g. "gpg").
    fn name(&self) -> &str;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn list_keys(&self, scope: KeyScope) -> Result<Vec<RawKey>> {
        (**self).list_keys(scope)
    }

    fn generate(&self, params: &KeyGenParams) -> Result<GenerateOutcome> {
        (**self).generate(params)
    }

    fn import(&self, material: &[u8]) -> Result<ImportOutcome> {
        (**self).import(material)
    }

    fn export(
        &self,
        identifier: &str,
        scope: KeyScope,
        passphrase: Option<&str>,
    ) -> Result<OpOutcome> {
        (**self).export(identifier, scope, passphrase)
    }

    fn encrypt(&self, data: &[u8], request: &EncryptRequest) -> Result<OpOutcome> {
        (**self).encrypt(data, request)
    }

    fn decrypt(&self, data: &[u8], passphrase: Option<&str>) -> Result<OpOutcome> {
        (**self).decrypt(data, passphrase)
    }

    fn sign(&self, data: &[u8], request: &SignRequest) -> Result<OpOutcome> {
        (**self).sign(data, request)
    }

    fn verify(&self, signed: &[u8]) -> Result<Verification> {
        (**self).verify(signed)
    }

    fn delete(
        &self,
        identifiers: &[String],
        target: DeleteTarget,
        passphrase: Option<&str>,
    ) -> Result<DeleteOutcome> {
        (**self).delete(identifiers, target, passphrase)
    }

    fn version(&self) -> Result<String> {
        (**self).version()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
