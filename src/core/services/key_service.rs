use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::errors::{PgpError, Result};
use crate::core::models::engine_io::{DeleteOutcome, DeleteTarget, KeyGenParams};
use crate::core::models::key_record::{KeyRecord, KeyScope, KeyringSnapshot, ResolutionQuery};
use crate::core::models::lifecycle::LifecycleResult;
use crate::core::services::{projection, resolver};
use crate::core::traits::engine::Engine;

const DELETE_DID_NOT_TAKE_EFFECT: &str = "deletion did not take effect";

/// Key lifecycle and lookup on top of an `Engine`.
///
/// Every call re-reads the keyring; no snapshot outlives the call
/// that took it.
pub struct KeyService<E: Engine> {
    pub engine: E,
}

/// What Precheck decided the Mutate step should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub identifier: String,
    pub secret_requested: bool,
    pub had_secret: bool,
    /// Engine calls to issue, in order.
    pub calls: Vec<(Vec<String>, DeleteTarget)>,
}

impl<E: Engine> KeyService<E> {
    /// Take a fresh listing of one keyring.
    pub fn snapshot(&self, scope: KeyScope) -> Result<KeyringSnapshot> {
        let secret = self.engine.list_keys(KeyScope::Secret)?;
        let snap = match scope {
            KeyScope::Secret => projection::snapshot(scope, secret.clone(), &secret),
            KeyScope::Public => {
                projection::snapshot(scope, self.engine.list_keys(KeyScope::Public)?, &secret)
            }
        };
        debug!(%scope, keys = snap.len(), "Took keyring snapshot");
        Ok(snap)
    }

    /// Resolve a query against a fresh snapshot of its keyring.
    pub fn resolve(&self, query: &ResolutionQuery) -> Result<Vec<KeyRecord>> {
        let snap = self.snapshot(query.scope)?;
        Ok(resolver::resolve(&query.identifier, &snap)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Look up exactly one public key.
    pub fn key_info(&self, identifier: &str) -> Result<KeyRecord> {
        let snap = self.snapshot(KeyScope::Public)?;
        resolver::resolve_unique(identifier, &snap).cloned()
    }

    /// Fingerprint of the one secret key `identifier` names.
    pub fn signing_key(&self, identifier: &str) -> Result<String> {
        let snap = self.snapshot(KeyScope::Secret)?;
        let key = resolver::resolve_unique(identifier, &snap)?;
        Ok(key.fingerprint.clone())
    }

    /// Generate a key pair and return its fingerprint once it shows up
    /// in the keyring.
    pub fn generate(&self, params: &KeyGenParams) -> Result<String> {
        info!(
            email = %params.name_email,
            key_type = %params.key_type,
            key_length = params.key_length,
            "Generating key pair"
        );
        let outcome = self.engine.generate(params)?;

        let fingerprint = match outcome.fingerprint {
            Some(fpr) if !fpr.is_empty() => fpr,
            _ => {
                return Err(PgpError::engine(
                    "Key generation",
                    format!(
                        "no key was created for {}: {}",
                        params.name_email, outcome.status
                    ),
                ));
            }
        };

        let snap = self.snapshot(KeyScope::Public)?;
        let present = resolver::resolve(&fingerprint, &snap)
            .iter()
            .any(|k| k.fingerprint == fingerprint);
        if !present {
            return Err(PgpError::LifecycleVerificationFailed {
                operation: "Key generation".into(),
                reason: format!(
                    "engine reported key {fingerprint} but it is not in the keyring"
                ),
            });
        }

        info!(%fingerprint, email = %params.name_email, "Generated key pair");
        Ok(fingerprint)
    }

    /// Import armored or binary key material; returns the reported fingerprints.
    pub fn import(&self, material: &[u8]) -> Result<Vec<String>> {
        let outcome = self.engine.import(material)?;
        if outcome.count == 0 {
            return Err(PgpError::engine(
                "Key import",
                format!("no keys were imported: {}", outcome.status),
            ));
        }

        let fingerprints: Vec<String> = outcome
            .fingerprints
            .into_iter()
            .filter(|fpr| !fpr.trim().is_empty())
            .collect();
        info!(count = fingerprints.len(), ?fingerprints, "Imported keys");
        Ok(fingerprints)
    }

    /// Read a key file and import its contents.
    pub fn import_file(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(PgpError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let material = std::fs::read(path)?;
        self.import(&material)
    }

    /// Export armored key material. The identifier goes to the engine as-is.
    pub fn export(
        &self,
        identifier: &str,
        scope: KeyScope,
        passphrase: Option<&str>,
    ) -> Result<String> {
        let operation = match scope {
            KeyScope::Public => "Public key export",
            KeyScope::Secret => "Private key export",
        };
        let armored = self
            .engine
            .export(identifier, scope, passphrase)?
            .into_payload(operation)?;
        Ok(String::from_utf8_lossy(&armored).into_owned())
    }

    /// Delete a key and confirm against the keyring that it is gone.
    ///
    /// Returns `Ok` with `verified == false` when the keyring still holds
    /// the key; use [`LifecycleResult::into_verified`] to make that an error.
    pub fn delete(
        &self,
        identifier: &str,
        secret: bool,
        passphrase: Option<&str>,
    ) -> Result<LifecycleResult> {
        let plan = self.delete_precheck(identifier, secret)?;
        let outcome = self.delete_mutate(&plan, passphrase)?;
        self.delete_verify(&plan, outcome)
    }

    /// Precheck: find out whether secret material exists and which
    /// fingerprints the engine must be handed.
    pub fn delete_precheck(&self, identifier: &str, secret: bool) -> Result<DeletePlan> {
        let secret_snap = self.snapshot(KeyScope::Secret)?;
        let secret_matches = fingerprints(&resolver::resolve(identifier, &secret_snap));
        let had_secret = !secret_matches.is_empty();

        let or_identifier = |fprs: Vec<String>| {
            if fprs.is_empty() {
                vec![identifier.to_string()]
            } else {
                fprs
            }
        };

        let calls = if secret {
            vec![(or_identifier(secret_matches), DeleteTarget::Secret)]
        } else {
            let public_snap = self.snapshot(KeyScope::Public)?;
            let public_only: Vec<String> = resolver::resolve(identifier, &public_snap)
                .iter()
                .map(|k| k.fingerprint.clone())
                .filter(|fpr| !secret_matches.contains(fpr))
                .collect();

            let mut calls = Vec::new();
            if had_secret {
                calls.push((secret_matches, DeleteTarget::SecretAndPublic));
            }
            if !public_only.is_empty() || calls.is_empty() {
                calls.push((or_identifier(public_only), DeleteTarget::Public));
            }
            calls
        };

        debug!(identifier, secret, had_secret, ?calls, "Delete precheck");
        Ok(DeletePlan {
            identifier: identifier.to_string(),
            secret_requested: secret,
            had_secret,
            calls,
        })
    }

    /// Mutate: issue the planned engine deletes. The first reported
    /// problem wins the status text.
    pub fn delete_mutate(&self, plan: &DeletePlan, passphrase: Option<&str>) -> Result<DeleteOutcome> {
        let mut ok = true;
        let mut status = String::new();

        for (names, target) in &plan.calls {
            let outcome = self.engine.delete(names, *target, passphrase)?;
            debug!(?names, ?target, ok = outcome.ok, status = %outcome.status, "Engine delete");
            if !outcome.ok && ok {
                ok = false;
                status = outcome.status;
            } else if ok && status.is_empty() {
                status = outcome.status;
            }
        }

        Ok(DeleteOutcome { ok, status })
    }

    /// Verify: re-list both keyrings and check the postcondition.
    pub fn delete_verify(&self, plan: &DeletePlan, outcome: DeleteOutcome) -> Result<LifecycleResult> {
        let public_snap = self.snapshot(KeyScope::Public)?;
        let secret_snap = self.snapshot(KeyScope::Secret)?;
        let public_left = resolver::resolve(&plan.identifier, &public_snap).len();
        let secret_left = resolver::resolve(&plan.identifier, &secret_snap).len();

        let (verified, scope, left) = if plan.secret_requested {
            (secret_left == 0, KeyScope::Secret, secret_left)
        } else if public_left > 0 {
            (false, KeyScope::Public, public_left)
        } else if plan.had_secret && secret_left > 0 {
            (false, KeyScope::Secret, secret_left)
        } else {
            (true, KeyScope::Public, 0)
        };

        let reason = if verified {
            if outcome.status.is_empty() {
                "ok".to_string()
            } else {
                outcome.status.clone()
            }
        } else if outcome.ok {
            format!(
                "engine reported success but {left} key(s) matching '{}' remain in the {scope} keyring",
                plan.identifier
            )
        } else if !outcome.status.trim().is_empty() {
            outcome.status.clone()
        } else {
            DELETE_DID_NOT_TAKE_EFFECT.to_string()
        };

        let operation = if plan.secret_requested {
            "Secret key deletion"
        } else {
            "Key deletion"
        };
        let result = LifecycleResult {
            operation: operation.to_string(),
            succeeded: outcome.ok,
            verified,
            reason,
        };

        if result.is_inconsistent() {
            warn!(identifier = %plan.identifier, reason = %result.reason, "Engine and keyring disagree after delete");
        } else if verified {
            info!(identifier = %plan.identifier, secret = plan.secret_requested, "Deleted key");
        } else {
            warn!(identifier = %plan.identifier, reason = %result.reason, "Key deletion failed");
        }
        Ok(result)
    }
}

fn fingerprints(keys: &[&KeyRecord]) -> Vec<String> {
    keys.iter().map(|k| k.fingerprint.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::engine_io::ImportOutcome;
    use crate::core::test_support::{DeleteBehavior, FakeEngine};

    const ALICE: &str = "AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111";
    const BOB: &str = "BBBB2222BBBB2222BBBB2222BBBB2222BBBB2222";

    fn service(engine: FakeEngine) -> KeyService<FakeEngine> {
        KeyService { engine }
    }

    fn params(email: &str) -> KeyGenParams {
        KeyGenParams {
            key_type: "RSA".into(),
            key_length: 2048,
            name_real: "Test User".into(),
            name_email: email.into(),
            expire_date: "0".into(),
            passphrase: Some("testpassword".into()),
        }
    }

    #[test]
    fn delete_pair_removes_both_halves() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );

        let result = svc.delete("alice@example.com", false, Some("pw")).unwrap();

        assert!(result.verified);
        assert!(result.succeeded);
        let s = svc.engine.state.lock().unwrap();
        assert!(s.public.is_empty());
        assert!(s.secret.is_empty());
        assert_eq!(s.deletes, vec![(vec![ALICE.to_string()], DeleteTarget::SecretAndPublic)]);
    }

    #[test]
    fn delete_public_only_key_uses_public_delete() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest).with_public(BOB, "Bob <bob@example.com>"));

        let result = svc.delete(BOB, false, None).unwrap();

        assert!(result.verified);
        let s = svc.engine.state.lock().unwrap();
        assert_eq!(s.deletes, vec![(vec![BOB.to_string()], DeleteTarget::Public)]);
    }

    #[test]
    fn delete_secret_only_leaves_public_key() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );

        let result = svc.delete(ALICE, true, Some("pw")).unwrap();

        assert!(result.verified);
        assert_eq!(result.operation, "Secret key deletion");
        let s = svc.engine.state.lock().unwrap();
        assert!(s.secret.is_empty());
        assert_eq!(s.public.len(), 1);
    }

    #[test]
    fn delete_mixed_matches_issues_both_calls() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest)
                .with_pair(ALICE, "Alice <alice@example.com>", "pw")
                .with_public(BOB, "Bob <bob@example.com>"),
        );

        let result = svc.delete("example.com", false, None).unwrap();

        assert!(result.verified);
        let s = svc.engine.state.lock().unwrap();
        assert_eq!(
            s.deletes,
            vec![
                (vec![ALICE.to_string()], DeleteTarget::SecretAndPublic),
                (vec![BOB.to_string()], DeleteTarget::Public),
            ]
        );
    }

    #[test]
    fn engine_ok_but_key_remains_is_not_verified() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::LiesOk).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );

        let result = svc.delete("alice@example.com", false, None).unwrap();

        assert!(result.succeeded);
        assert!(!result.verified);
        assert!(result.is_inconsistent());
        assert!(result.reason.contains("engine reported success"));
        assert!(matches!(
            result.into_verified(),
            Err(PgpError::LifecycleVerificationFailed { .. })
        ));
    }

    #[test]
    fn engine_complaint_with_key_gone_still_verifies() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::RemovesButComplains)
                .with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );

        let result = svc.delete(ALICE, false, None).unwrap();

        assert!(!result.succeeded);
        assert!(result.verified);
    }

    #[test]
    fn refused_delete_surfaces_engine_status() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Refuses).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );

        let err = svc
            .delete(ALICE, true, None)
            .unwrap()
            .into_verified()
            .unwrap_err();

        match err {
            PgpError::LifecycleVerificationFailed { reason, .. } => {
                assert_eq!(reason, "Must delete secret key first")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_key_passes_identifier_through() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest));

        let plan = svc.delete_precheck("ghost@example.com", false).unwrap();

        assert!(!plan.had_secret);
        assert_eq!(
            plan.calls,
            vec![(vec!["ghost@example.com".to_string()], DeleteTarget::Public)]
        );
    }

    #[test]
    fn generate_returns_resolvable_fingerprint() {
        let engine = FakeEngine::new(DeleteBehavior::Honest);
        engine.state.lock().unwrap().generated_fingerprint = Some(ALICE.into());
        let svc = service(engine);

        let fpr = svc.generate(&params("alice@example.com")).unwrap();

        assert_eq!(fpr, ALICE);
        assert_eq!(svc.key_info("alice@example.com").unwrap().fingerprint, ALICE);
    }

    #[test]
    fn generate_without_key_material_fails() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest));

        let err = svc.generate(&params("alice@example.com")).unwrap_err();

        assert!(matches!(err, PgpError::EngineOperationFailed { .. }));
        assert!(err.to_string().contains("alice@example.com"));
    }

    #[test]
    fn generate_reported_but_missing_fails_verification() {
        let engine = FakeEngine::new(DeleteBehavior::Honest);
        {
            let mut s = engine.state.lock().unwrap();
            s.generated_fingerprint = Some(ALICE.into());
            s.generate_without_key = true;
        }
        let svc = service(engine);

        let err = svc.generate(&params("alice@example.com")).unwrap_err();

        assert!(matches!(err, PgpError::LifecycleVerificationFailed { .. }));
    }

    #[test]
    fn import_filters_empty_fingerprints() {
        let engine = FakeEngine::new(DeleteBehavior::Honest);
        engine.state.lock().unwrap().next_import = Some(ImportOutcome {
            count: 1,
            fingerprints: vec![ALICE.into(), String::new()],
            status: "ok".into(),
        });
        let svc = service(engine);

        assert_eq!(svc.import(b"key").unwrap(), vec![ALICE.to_string()]);
    }

    #[test]
    fn import_of_nothing_fails() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest));
        let err = svc.import(b"not a key").unwrap_err();
        assert!(matches!(err, PgpError::EngineOperationFailed { .. }));
    }

    #[test]
    fn import_missing_file_fails() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest));
        let err = svc
            .import_file(Path::new("/definitely/not/here.asc"))
            .unwrap_err();
        assert!(matches!(err, PgpError::FileNotFound { .. }));
    }

    #[test]
    fn export_of_unknown_key_fails() {
        let svc = service(FakeEngine::new(DeleteBehavior::Honest));
        let err = svc.export("nobody", KeyScope::Public, None).unwrap_err();
        assert!(err.to_string().contains("Public key export failed"));
    }

    #[test]
    fn export_with_wrong_passphrase_keeps_engine_status() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );
        let err = svc
            .export(ALICE, KeyScope::Secret, Some("wrong"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Private key export failed: bad passphrase");
    }

    #[test]
    fn export_secret_returns_armor() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest).with_pair(ALICE, "Alice <alice@example.com>", "pw"),
        );
        let armored = svc.export("alice@example.com", KeyScope::Secret, Some("pw")).unwrap();
        assert!(armored.contains("BEGIN PGP PRIVATE KEY BLOCK"));
    }

    #[test]
    fn key_info_reports_ambiguity() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest)
                .with_pair(ALICE, "Alice <alice@example.com>", "pw")
                .with_public(BOB, "Bob <bob@example.com>"),
        );
        assert!(matches!(
            svc.key_info("example.com"),
            Err(PgpError::ResolutionAmbiguous { .. })
        ));
        assert!(matches!(
            svc.key_info("carol"),
            Err(PgpError::ResolutionNotFound { .. })
        ));
    }

    #[test]
    fn public_snapshot_marks_secret_availability() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest)
                .with_pair(ALICE, "Alice <alice@example.com>", "pw")
                .with_public(BOB, "Bob <bob@example.com>"),
        );
        let snap = svc.snapshot(KeyScope::Public).unwrap();
        assert!(snap.keys[0].has_secret);
        assert!(!snap.keys[1].has_secret);
    }

    #[test]
    fn resolve_respects_query_scope() {
        let svc = service(
            FakeEngine::new(DeleteBehavior::Honest)
                .with_pair(ALICE, "Alice <alice@example.com>", "pw")
                .with_public(BOB, "Bob <bob@example.com>"),
        );
        let public = svc.resolve(&ResolutionQuery::public("example.com")).unwrap();
        assert_eq!(public.len(), 2);

        let secret = svc.resolve(&ResolutionQuery::secret("example.com")).unwrap();
        assert_eq!(secret.len(), 1);
        assert_eq!(secret[0].fingerprint, ALICE);

        assert!(svc.resolve(&ResolutionQuery::public("")).unwrap().is_empty());
    }
}
