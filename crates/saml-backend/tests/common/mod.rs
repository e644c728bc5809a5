//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use saml_backend::{Saml2Backend, SessionInfo};
use saml_core::{AttributeMap, AttributeMapping, Saml2Settings};
use saml_model::{FieldDef, FieldKind, ModelDescriptor, ModelRegistry, UserRecord};
use saml_storage::{InMemoryUserStore, UserStore};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const TEST_USER_MODEL: &str = "testprofiles.TestUser";
pub const STANDALONE_USER_MODEL: &str = "testprofiles.StandaloneUserModel";

/// Captures formatted log lines emitted while the guard is alive.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a thread-local subscriber writing into this capture.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_env_filter(EnvFilter::new("saml2=debug"))
            .with_ansi(false)
            .without_time()
            .with_target(true)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Checks for a line at `level` containing `message`.
    pub fn contains(&self, level: &str, message: &str) -> bool {
        self.output()
            .lines()
            .any(|line| line.contains(level) && line.contains(message))
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.buf))
    }
}

#[derive(Debug)]
pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The profile model most tests run against.
pub fn test_user_model() -> ModelDescriptor {
    ModelDescriptor::builder("testprofiles", "TestUser")
        .username_field("username")
        .field("username", FieldKind::Text)
        .field("email", FieldKind::Text)
        .field("first_name", FieldKind::Text)
        .field("last_name", FieldKind::Text)
        .field("age", FieldKind::Text)
        .field_def(FieldDef::new("is_active", FieldKind::Boolean).with_default(true))
        .field("is_staff", FieldKind::Boolean)
        .hook("process_first_name", |user: &mut UserRecord, values: &[String]| {
            if let Some(first) = values.first() {
                user.set("first_name", first.as_str());
            }
        })
        .build()
}

/// A model that does not declare a natural identifier field.
pub fn standalone_user_model() -> ModelDescriptor {
    ModelDescriptor::builder("testprofiles", "StandaloneUserModel")
        .field("username", FieldKind::Text)
        .build()
}

/// Registry, store and settings shared by a test.
#[derive(Debug)]
pub struct TestEnv {
    pub registry: Arc<ModelRegistry>,
    pub store: Arc<InMemoryUserStore>,
    pub settings: Saml2Settings,
}

impl TestEnv {
    /// Settings point at the profile model; `john` is not created yet.
    pub fn new() -> Self {
        let registry = ModelRegistry::with_defaults();
        registry.register(test_user_model());
        registry.register(standalone_user_model());

        let settings = Saml2Settings {
            saml_user_model: Some(TEST_USER_MODEL.to_string()),
            ..Saml2Settings::default()
        };

        Self {
            registry: Arc::new(registry),
            store: Arc::new(InMemoryUserStore::new()),
            settings,
        }
    }

    /// Creates the environment with `john` already stored.
    pub async fn with_john() -> (Self, UserRecord) {
        let env = Self::new();
        let john = env.create_user("john").await;
        (env, john)
    }

    pub fn backend(&self) -> Saml2Backend {
        Saml2Backend::new(Arc::clone(&self.registry), self.store.clone())
    }

    pub async fn create_user(&self, username: &str) -> UserRecord {
        let model = self
            .registry
            .get_model(TEST_USER_MODEL)
            .expect("test model registered");
        let mut user = UserRecord::new(model).with("username", username);
        self.store.insert(&mut user).await.expect("insert test user");
        user
    }

    pub fn stored(&self, user: &UserRecord) -> UserRecord {
        self.store
            .get(user.id().expect("persisted user"))
            .expect("user in store")
    }
}

/// `{uid, mail, cn, sn}` mapped onto the standard profile fields.
pub fn profile_mapping() -> AttributeMapping {
    AttributeMapping::new()
        .with("uid", ["username"])
        .with("mail", ["email"])
        .with("cn", ["first_name"])
        .with("sn", ["last_name"])
}

/// Builds an attribute map from literal pairs.
pub fn attributes(pairs: &[(&str, &[&str])]) -> AttributeMap {
    pairs
        .iter()
        .map(|(name, values)| {
            (
                (*name).to_string(),
                values.iter().map(|v| (*v).to_string()).collect(),
            )
        })
        .collect()
}

/// John Doe's assertion.
pub fn john_attributes() -> AttributeMap {
    attributes(&[
        ("uid", &["john"]),
        ("mail", &["john@example.com"]),
        ("cn", &["John"]),
        ("sn", &["Doe"]),
    ])
}

pub fn session(ava: AttributeMap) -> SessionInfo {
    SessionInfo::new(ava).with_issuer("https://idp.example.com/metadata")
}
