//! `pipegraph.toml`: API access and render defaults.
//!
//! The loaded [`Config`] is a plain value handed to whatever needs it; there
//! is no process-wide configuration.

use std::{collections::HashMap, env, fs, path::Path};

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::{
    error::{GraphError, Result},
    output::OutputFormat,
    render::{RankDir, RenderOptions},
};

pub const DEFAULT_CONFIG_FILE: &str = "pipegraph.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:6060";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api: Option<ApiSection>,
    render: Option<RenderSection>,
    output: Option<OutputSection>,
    #[serde(default)]
    variables: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    auth_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSection {
    width: Option<f64>,
    height: Option<f64>,
    rankdir: Option<RankDir>,
    padding: Option<f64>,
    icon: Option<String>,
    zoom: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSection {
    format: Option<OutputFormat>,
}

/// Where pipeline data comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Target host for requests.
    pub base_url: String,
    /// Sent as a bearer credential when set.
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub render: RenderOptions,
    pub format: Option<OutputFormat>,
}

/// Loads a config file. A missing file at the default location yields the
/// defaults; any other missing file is an error.
pub fn load_config(config_path: &str) -> Result<Config> {
    if config_path == DEFAULT_CONFIG_FILE && !Path::new(config_path).exists() {
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(config_path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let file: ConfigFile = toml::from_str(contents)?;
    process_config(file)
}

fn process_config(file: ConfigFile) -> Result<Config> {
    let mut variables = file.variables;
    add_builtin_variables(&mut variables);
    let substitute = Substitution::new(&variables)?;

    let api_section = file.api.unwrap_or_default();
    let api = ApiConfig {
        base_url: api_section
            .base_url
            .map(|url| substitute.apply(&url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        auth_token: api_section
            .auth_token
            .map(|token| substitute.apply(&token))
            .filter(|token| !token.is_empty()),
    };

    let render_section = file.render.unwrap_or_default();
    let mut render = RenderOptions::default();
    if let Some(width) = render_section.width {
        render.fallback_size.width = positive("render.width", width)?;
    }
    if let Some(height) = render_section.height {
        render.fallback_size.height = positive("render.height", height)?;
    }
    if let Some(padding) = render_section.padding {
        render.padding = padding.max(0.0);
    }
    if let Some(zoom) = render_section.zoom {
        render.initial_zoom = Some(positive("render.zoom", zoom)?);
    }
    render.rankdir = render_section.rankdir;
    render.icon = render_section.icon.map(|icon| substitute.apply(&icon));

    Ok(Config {
        api,
        render,
        format: file.output.and_then(|o| o.format),
    })
}

fn positive(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GraphError::Config(format!("'{}' must be positive, got {}", key, value)))
    }
}

fn add_builtin_variables(variables: &mut HashMap<String, String>) {
    for (key, value) in env::vars() {
        variables.insert(format!("ENV_{}", key), value);
    }

    if let Ok(pwd) = env::current_dir() {
        variables.insert("PWD".to_string(), pwd.to_string_lossy().to_string());
    }
}

/// `${NAME}` and `$NAME` expansion. Unknown names are left untouched.
struct Substitution<'a> {
    variables: &'a HashMap<String, String>,
    braced: Regex,
    simple: Regex,
}

impl<'a> Substitution<'a> {
    fn new(variables: &'a HashMap<String, String>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| GraphError::Config(e.to_string()))
        };

        Ok(Self {
            variables,
            braced: compile(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?,
            simple: compile(r"\$([A-Za-z_][A-Za-z0-9_]*)\b")?,
        })
    }

    fn apply(&self, text: &str) -> String {
        let result = self
            .braced
            .replace_all(text, |caps: &Captures| self.lookup(caps));
        self.simple
            .replace_all(&result, |caps: &Captures| self.lookup(caps))
            .to_string()
    }

    fn lookup(&self, caps: &Captures) -> String {
        self.variables
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    }
}
