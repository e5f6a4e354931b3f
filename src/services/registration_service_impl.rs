//! `SeaORM` implementation of the `RegistrationService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::{InsertOutcome, NewUserRecord, Store};
use crate::services::password;
use crate::services::registration_service::{
    NewUser, RegisteredUser, RegistrationError, RegistrationService,
};

pub struct SeaOrmRegistrationService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmRegistrationService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl RegistrationService for SeaOrmRegistrationService {
    async fn register(&self, user: NewUser) -> Result<RegisteredUser, RegistrationError> {
        let NewUser {
            name,
            address,
            contact_details,
            email,
            password,
        } = user;

        // Pre-check only; the unique index on insert settles races
        let existing = self
            .store
            .find_user_by_email(&email)
            .await
            .map_err(|e| RegistrationError::Database(format!("{e:#}")))?;

        if existing.is_some() {
            debug!("Registration rejected by lookup: email taken");
            return Err(RegistrationError::UserExists);
        }

        let password_hash = password::hash_password_blocking(password, self.security.clone())
            .await
            .map_err(|e| RegistrationError::Hashing(format!("{e:#}")))?;

        let outcome = self
            .store
            .insert_user(NewUserRecord {
                name,
                address,
                contact_details,
                email,
                password_hash,
            })
            .await
            .map_err(|e| RegistrationError::Database(format!("{e:#}")))?;

        match outcome {
            InsertOutcome::Inserted(user) => {
                info!(user_id = user.id, "User registered");
                Ok(RegisteredUser {
                    id: user.id,
                    email: user.email,
                    created_at: user.created_at,
                })
            }
            InsertOutcome::DuplicateEmail => {
                // Lost a race with a concurrent registration for the same email
                debug!("Registration rejected by unique index: email taken");
                Err(RegistrationError::UserExists)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::password::{fast_params, verify_password};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn service() -> (SeaOrmRegistrationService, Store) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        (
            SeaOrmRegistrationService::new(store.clone(), fast_params()),
            store,
        )
    }

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            address: "1 Main St".to_string(),
            contact_details: "555-0100".to_string(),
            email: "ann@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let (service, store) = service().await;

        let registered = service.register(ann()).await.unwrap();
        assert_eq!(registered.email, "ann@example.com");

        let (user, hash) = store
            .get_user_with_password("ann@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.address, "1 Main St");
        assert_eq!(user.contact_details, "555-0100");
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, store) = service().await;

        service.register(ann()).await.unwrap();
        let err = service.register(ann()).await.unwrap_err();

        assert!(matches!(err, RegistrationError::UserExists));
        assert_eq!(store.count_users_with_email("ann@example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_distinct_users_get_distinct_salts() {
        let (service, store) = service().await;

        service.register(ann()).await.unwrap();
        let mut bob = ann();
        bob.email = "bob@example.com".to_string();
        service.register(bob).await.unwrap();

        let (_, ann_hash) = store
            .get_user_with_password("ann@example.com")
            .await
            .unwrap()
            .unwrap();
        let (_, bob_hash) = store
            .get_user_with_password("bob@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_ne!(ann_hash, bob_hash);
        assert!(verify_password("secret1", &ann_hash).unwrap());
        assert!(verify_password("secret1", &bob_hash).unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_never_fail_with_database_error() {
        let (service, store) = service().await;
        let service = Arc::new(service);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.register(ann()).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(RegistrationError::UserExists) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.count_users_with_email("ann@example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_hash_params_surface_as_hashing_error() {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let broken = SecurityConfig {
            argon2_time_cost: 0,
            ..fast_params()
        };
        let service = SeaOrmRegistrationService::new(store.clone(), broken);

        let err = service.register(ann()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Hashing(_)));
        assert_eq!(store.count_users_with_email("ann@example.com").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logs_carry_user_id_but_not_email() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("driving_app=debug")
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (service, _store) = service().await;
        service.register(ann()).await.unwrap();
        service.register(ann()).await.unwrap_err();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("User registered"));
        assert!(output.contains("user_id=1"));
        assert!(output.contains("email taken"));
        assert!(!output.contains("ann@example.com"));
    }
}
