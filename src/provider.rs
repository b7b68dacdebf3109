//! Fake-data provider registry.
//!
//! Maps dotted provider names (`faker.email`, `faker.iso8601`, ...) to
//! zero-argument value generators. The registry is built once at process
//! start and is immutable afterwards, so concurrent lookups from request
//! tasks need no synchronization.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Error returned when a schema references a provider that was never
/// registered.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    Unknown(String),
}

type Generator = Box<dyn Fn() -> Value + Send + Sync>;

/// Registry of named fake-value generators.
pub struct ProviderRegistry {
    generators: HashMap<String, Generator>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the `faker.*` namespace.
    pub fn with_builtin_fakers() -> Self {
        let mut registry = Self::new();

        registry.register("faker.first_name", || json!(random_first_name()));
        registry.register("faker.last_name", || json!(random_last_name()));
        registry.register("faker.name", || {
            json!(format!("{} {}", random_first_name(), random_last_name()))
        });
        registry.register("faker.user_name", || {
            let mut rng = rand::thread_rng();
            json!(format!(
                "{}{}",
                random_first_name().to_lowercase(),
                rng.gen_range(1..1000)
            ))
        });
        registry.register("faker.email", || {
            let mut rng = rand::thread_rng();
            let domain = ["example.com", "example.org", "mail.test"]
                .choose(&mut rng)
                .unwrap();
            json!(format!(
                "{}.{}@{}",
                random_first_name().to_lowercase(),
                random_last_name().to_lowercase(),
                domain
            ))
        });
        registry.register("faker.phone_number", || {
            let mut rng = rand::thread_rng();
            json!(format!(
                "+1-{:03}-{:03}-{:04}",
                rng.gen_range(200..1000),
                rng.gen_range(200..1000),
                rng.gen_range(0..10000)
            ))
        });
        registry.register("faker.iso8601", || {
            json!(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        });
        registry.register("faker.uuid4", || json!(random_uuid4()));
        registry.register("faker.city", || {
            let mut rng = rand::thread_rng();
            json!(*CITIES.choose(&mut rng).unwrap())
        });
        registry.register("faker.street_address", || {
            let mut rng = rand::thread_rng();
            json!(format!(
                "{} {} {}",
                rng.gen_range(1..9999),
                random_last_name(),
                ["St", "Ave", "Blvd", "Ln"].choose(&mut rng).unwrap()
            ))
        });
        registry.register("faker.word", || {
            let mut rng = rand::thread_rng();
            json!(*WORDS.choose(&mut rng).unwrap())
        });
        registry.register("faker.sentence", || {
            let mut rng = rand::thread_rng();
            let count = rng.gen_range(4..9);
            let words: Vec<&str> = (0..count)
                .map(|_| *WORDS.choose(&mut rng).unwrap())
                .collect();
            let mut sentence = words.join(" ");
            if let Some(first) = sentence.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            sentence.push('.');
            json!(sentence)
        });
        registry.register("faker.pyint", || {
            let mut rng = rand::thread_rng();
            json!(rng.gen_range(0..10000))
        });
        registry.register("faker.pyfloat", || {
            let mut rng = rand::thread_rng();
            // Two-decimal values read better in mock payloads
            json!((rng.gen_range(0.0..10000.0_f64) * 100.0).round() / 100.0)
        });
        registry.register("faker.boolean", || {
            let mut rng = rand::thread_rng();
            json!(rng.gen::<bool>())
        });

        registry
    }

    /// Register a generator under a dotted name. Later registrations for
    /// the same name replace earlier ones.
    pub fn register<F>(&mut self, name: &str, generator: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.generators.insert(name.to_string(), Box::new(generator));
    }

    /// Generate a value from the named provider.
    pub fn generate(&self, name: &str) -> Result<Value, ProviderError> {
        self.generators
            .get(name)
            .map(|generator| generator())
            .ok_or_else(|| ProviderError::Unknown(name.to_string()))
    }

    /// Whether a provider name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered provider names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtin_fakers()
    }
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Carmen", "Diego", "Elena", "Felix", "Greta", "Hugo",
    "Ingrid", "Jonas", "Kira", "Liam", "Maya", "Noah", "Olga", "Pavel",
    "Quinn", "Rosa", "Stefan", "Tara", "Umar", "Vera", "Wesley", "Yara",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Becker", "Castillo", "Dvorak", "Eriksen", "Fontaine",
    "Garcia", "Huang", "Ivanov", "Jensen", "Kowalski", "Lindqvist",
    "Moreau", "Nakamura", "Okafor", "Petrov", "Quintero", "Rossi",
    "Schneider", "Takahashi", "Ueda", "Vargas", "Weber", "Zhang",
];

const CITIES: &[&str] = &[
    "Amsterdam", "Bogota", "Cairo", "Dublin", "Edinburgh", "Fukuoka",
    "Geneva", "Helsinki", "Istanbul", "Jakarta", "Kyoto", "Lisbon",
    "Montreal", "Nairobi", "Oslo", "Porto", "Quito", "Riga", "Seoul",
    "Tallinn", "Utrecht", "Valencia", "Warsaw", "Zagreb",
];

const WORDS: &[&str] = &[
    "ability", "balance", "cabinet", "density", "elephant", "fortune",
    "gravity", "harbor", "insight", "journey", "keyboard", "lantern",
    "monument", "notebook", "orchard", "pattern", "quality", "ribbon",
    "signal", "texture", "uniform", "village", "whisper", "zenith",
];

fn random_first_name() -> &'static str {
    let mut rng = rand::thread_rng();
    FIRST_NAMES.choose(&mut rng).unwrap()
}

fn random_last_name() -> &'static str {
    let mut rng = rand::thread_rng();
    LAST_NAMES.choose(&mut rng).unwrap()
}

/// Random version-4 UUID string.
fn random_uuid4() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        rng.gen::<u32>(),
        rng.gen::<u16>(),
        rng.gen::<u16>() & 0x0fff,
        (rng.gen::<u16>() & 0x3fff) | 0x8000,
        rng.gen::<u64>() & 0xffffffffffff,
    )
}
