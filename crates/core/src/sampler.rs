//! Stratified topic sampling.
//!
//! Topics are grouped into weighted categories in a JSON file. A sample of
//! `N` topics takes `floor(N · weight)` topics from every category. The random
//! source is passed in explicitly, so a seed fully determines the sample.
//!
//! ```json
//! {
//!   "sampling": {
//!     "random_seed": 42,
//!     "total_sample_size": 50,
//!     "categories": {
//!       "science": { "weight": 0.5, "topics": ["Photosynthesis", "Black hole"] },
//!       "history": { "weight": 0.5, "topics": ["Roman Empire"] }
//!     }
//!   }
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EncyclodiffError, Result};

/// Name of the category that [`TopicSampler::add_custom_topic`] appends to.
pub const CUSTOM_CATEGORY: &str = "custom";

const CONFIG_FILE_NAME: &str = "sampling.json";

fn default_seed() -> u64 {
    42
}

fn default_total_sample_size() -> usize {
    50
}

/// Top-level sampling configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub sampling: SamplingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingSettings {
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    #[serde(default = "default_total_sample_size")]
    pub total_sample_size: usize,
    #[serde(default)]
    pub categories: Categories,
}

/// One weighted group of topics.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingCategory {
    pub name: String,
    /// Share of the total sample drawn from this category.
    pub weight: f64,
    pub topics: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct CategoryBody {
    weight: f64,
    #[serde(default)]
    topics: Vec<String>,
}

/// Categories in the order they appear in the configuration file.
///
/// Serialized as a JSON object keyed by category name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categories(Vec<SamplingCategory>);

impl Categories {
    pub fn iter(&self) -> impl Iterator<Item = &SamplingCategory> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&SamplingCategory> {
        self.0.iter().find(|c| c.name == name)
    }

    fn get_or_insert(&mut self, name: &str, weight: f64) -> &mut SamplingCategory {
        let index = match self.0.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.0.push(SamplingCategory { name: name.to_string(), weight, topics: Vec::new() });
                self.0.len() - 1
            }
        };
        &mut self.0[index]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(
                &category.name,
                &CategoryBody { weight: category.weight, topics: category.topics.clone() },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to { weight, topics }")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Categories, A::Error> {
                let mut categories = Categories::default();
                while let Some((name, body)) = access.next_entry::<String, CategoryBody>()? {
                    let category = categories.get_or_insert(&name, body.weight);
                    category.weight = body.weight;
                    category.topics = body.topics;
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

impl SamplingConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EncyclodiffError::FileNotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        let config: SamplingConfig = serde_json::from_str(&raw)
            .map_err(|e| EncyclodiffError::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;

        tracing::debug!(path = %path.display(), categories = config.sampling.categories.len(), "loaded sampling config");
        Ok(config)
    }

    /// First existing file among `./config/sampling.json` and
    /// `<user config dir>/encyclodiff/sampling.json`.
    pub fn default_path() -> Option<PathBuf> {
        let local = Path::new("config").join(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir().map(|dir| dir.join("encyclodiff").join(CONFIG_FILE_NAME)).filter(|path| path.exists())
    }

    fn validate(&self) -> Result<()> {
        for category in self.sampling.categories.iter() {
            if !category.weight.is_finite() || category.weight < 0.0 {
                return Err(EncyclodiffError::ConfigError(format!(
                    "category '{}' has invalid weight {}",
                    category.name, category.weight
                )));
            }
        }
        Ok(())
    }
}

/// Topics drawn from one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySample {
    pub category: String,
    pub topics: Vec<String>,
}

/// Draws stratified topic samples with an explicitly owned RNG.
pub struct TopicSampler<R = Xoshiro256PlusPlus> {
    config: SamplingConfig,
    rng: R,
}

impl TopicSampler<Xoshiro256PlusPlus> {
    /// A sampler seeded from the configuration's `random_seed`.
    pub fn seeded(config: SamplingConfig) -> Self {
        let rng = Xoshiro256PlusPlus::seed_from_u64(config.sampling.random_seed);
        Self::new(config, rng)
    }
}

impl<R: Rng> TopicSampler<R> {
    pub fn new(config: SamplingConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn categories(&self) -> impl Iterator<Item = &SamplingCategory> {
        self.config.sampling.categories.iter()
    }

    /// Samples `floor(total · weight)` topics per category, in file order.
    ///
    /// `None` uses the configured `total_sample_size`. A category with fewer
    /// topics than its share contributes all of them plus random repeats.
    pub fn sample_topics(&mut self, total: Option<usize>) -> Vec<CategorySample> {
        let total = total.unwrap_or(self.config.sampling.total_sample_size);
        let mut samples = Vec::with_capacity(self.config.sampling.categories.len());

        for category in self.config.sampling.categories.iter() {
            let wanted = (total as f64 * category.weight).floor() as usize;
            let topics = draw(&mut self.rng, &category.topics, wanted);
            samples.push(CategorySample { category: category.name.clone(), topics });
        }

        samples
    }

    /// `(category, topic)` pairs of a fresh sample.
    pub fn all_topics_flat(&mut self, total: Option<usize>) -> Vec<(String, String)> {
        self.sample_topics(total)
            .into_iter()
            .flat_map(|sample| {
                let category = sample.category;
                sample.topics.into_iter().map(move |topic| (category.clone(), topic))
            })
            .collect()
    }

    /// Every configured topic of a category; empty for unknown categories.
    pub fn topics_for_category(&self, name: &str) -> &[String] {
        self.config.sampling.categories.get(name).map(|c| c.topics.as_slice()).unwrap_or(&[])
    }

    /// Adds a topic to the zero-weight `custom` category unless already present.
    pub fn add_custom_topic(&mut self, topic: &str) {
        let custom = self.config.sampling.categories.get_or_insert(CUSTOM_CATEGORY, 0.0);
        if !custom.topics.iter().any(|t| t == topic) {
            custom.topics.push(topic.to_string());
        }
    }

    /// Renders a fresh sample as a reproducibility plan.
    pub fn render_sample_plan(&mut self, total: Option<usize>) -> String {
        let samples = self.sample_topics(total);
        let sampled_total: usize = samples.iter().map(|s| s.topics.len()).sum();

        let mut plan = String::from("# Grokipedia vs Wikipedia Sampling Plan\n\n");
        plan.push_str(&format!("Random Seed: {}\n", self.config.sampling.random_seed));
        plan.push_str(&format!("Total Sample Size: {sampled_total}\n\n"));

        for sample in &samples {
            plan.push_str(&format!("\n## {}\n", title_case(&sample.category)));
            plan.push_str(&format!("Count: {}\n\n", sample.topics.len()));
            for (i, topic) in sample.topics.iter().enumerate() {
                plan.push_str(&format!("{}. {topic}\n", i + 1));
            }
        }

        plan
    }

    /// Writes [`render_sample_plan`](Self::render_sample_plan) to `path`.
    pub fn export_sample_plan(&mut self, path: impl AsRef<Path>, total: Option<usize>) -> Result<()> {
        let plan = self.render_sample_plan(total);
        fs::write(path.as_ref(), plan)?;
        Ok(())
    }
}

fn draw<R: Rng>(rng: &mut R, topics: &[String], wanted: usize) -> Vec<String> {
    if topics.is_empty() || wanted == 0 {
        return Vec::new();
    }

    if topics.len() >= wanted {
        let mut pool = topics.to_vec();
        let (chosen, _) = pool.partial_shuffle(rng, wanted);
        return chosen.to_vec();
    }

    let mut sampled = topics.to_vec();
    sampled.extend((0..wanted - topics.len()).filter_map(|_| topics.choose(rng).cloned()));
    sampled
}

/// `pop_culture` → `Pop Culture`.
fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
