//! `(namespace, command)` → factory table.
//!
//! The base vocabulary lives under the empty namespace. Domain vocabularies
//! register their own namespace; see [`super::appdynamics`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::{appdynamics, BuildError};
use crate::command::{
    BlockUrl, CommandRef, DelayUrl, Hide, InsertHtml, InsertPosition, OverwriteHtml, RecolorImage,
    ReplaceImage, ReplaceLink, ReplaceNeighbor, ReplaceUrl, SearchAndReplace, Style,
};
use crate::match_rule::MatchRule;

/// Default ancestor distance for commands that walk up from a text node.
const DEFAULT_NTH_PARENT: usize = 1;

/// Arguments handed to a factory.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub command: &'a str,
    pub parameters: &'a [String],
    /// Right-hand side of the line, variables already substituted.
    pub value: &'a str,
    /// Page rules of the owning configuration.
    pub rules: &'a MatchRule,
}

impl<'a> Call<'a> {
    /// Parameter `index`, empty when absent.
    pub fn param(&self, index: usize) -> &'a str {
        self.parameters.get(index).map(String::as_str).unwrap_or("")
    }

    /// Parameter `index` that must be present and non-empty.
    pub fn required(&self, index: usize, what: &str) -> Result<&'a str, BuildError> {
        match self.param(index) {
            "" => Err(self.invalid(format!("missing {}", what))),
            p => Ok(p),
        }
    }

    /// Numeric parameter `index`, `default` when absent or empty.
    pub fn number(&self, index: usize, default: usize) -> Result<usize, BuildError> {
        match self.param(index).trim() {
            "" => Ok(default),
            p => p
                .parse()
                .map_err(|_| self.invalid(format!("`{}` is not a number", p))),
        }
    }

    pub fn invalid(&self, message: String) -> BuildError {
        BuildError::InvalidParameter {
            command: self.command.to_string(),
            message,
        }
    }
}

pub type Factory = fn(&Call<'_>) -> Result<CommandRef, BuildError>;

/// Lookup table from `(namespace, command)` to a factory.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<(String, String), Factory>,
}

impl Registry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The base vocabulary plus the bundled namespaces.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        register_base(&mut registry);
        appdynamics::register(&mut registry);
        registry
    }

    /// Shared instance of [`Registry::new`].
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn register(&mut self, namespace: &str, command: &str, factory: Factory) -> &mut Self {
        self.factories
            .insert((namespace.to_string(), command.to_string()), factory);
        self
    }

    pub fn get(&self, namespace: &str, command: &str) -> Option<Factory> {
        self.factories
            .get(&(namespace.to_string(), command.to_string()))
            .copied()
    }

    /// Registered namespaces, excluding the base one.
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.factories
            .keys()
            .map(|(ns, _)| ns.as_str())
            .filter(|ns| !ns.is_empty())
            .collect()
    }

    /// Command names registered under `namespace`, sorted.
    pub fn commands(&self, namespace: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .factories
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.factories.len())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

fn register_base(registry: &mut Registry) {
    registry
        .register("", "replace", replace)
        .register("", "replaceNeighbor", replace_neighbor)
        .register("", "insertBefore", insert_before)
        .register("", "insertAfter", insert_after)
        .register("", "style", style)
        .register("", "hide", hide)
        .register("", "replaceImage", replace_image)
        .register("", "recolorImage", recolor_image)
        .register("", "recolourImage", recolor_image)
        .register("", "replaceLink", replace_link)
        .register("", "blockUrl", block_url)
        .register("", "delayUrl", delay_url)
        .register("", "replaceUrl", replace_url)
        .register("", "redirectUrl", replace_url)
        .register("", "overwriteHTML", overwrite_html)
        .register("", "overwrite", overwrite_html)
        .register("", "overwritePage", overwrite_page);
}

fn replace(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let search = call.required(0, "search text")?;
    Ok(Arc::new(
        SearchAndReplace::literal(search, call.value).with_filters(call.param(1), call.param(2)),
    ))
}

fn replace_neighbor(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(ReplaceNeighbor::new(
        call.required(0, "search text")?,
        call.value,
        call.number(1, DEFAULT_NTH_PARENT)?,
        call.param(2),
        call.param(3),
    )))
}

fn insert(call: &Call<'_>, position: InsertPosition) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(InsertHtml::new(
        position,
        call.required(0, "search text")?,
        call.value,
        call.number(1, DEFAULT_NTH_PARENT)?,
        call.param(2),
    )))
}

fn insert_before(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    insert(call, InsertPosition::AfterBegin)
}

fn insert_after(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    insert(call, InsertPosition::BeforeEnd)
}

fn style(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(Style::new(
        call.required(0, "search text")?,
        call.required(1, "style property")?,
        call.number(2, DEFAULT_NTH_PARENT)?,
        call.value,
    )))
}

fn hide(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(Hide::new(
        call.required(0, "search text")?,
        call.number(1, DEFAULT_NTH_PARENT)?,
        call.param(2),
        call.param(3),
        call.param(4),
    )))
}

fn replace_image(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(ReplaceImage::new(call.required(0, "image")?, call.value)))
}

fn recolor_image(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let command = RecolorImage::new(call.required(0, "image")?, call.value)
        .ok_or_else(|| call.invalid(format!("`{}` is not a hex colour", call.value)))?;
    Ok(Arc::new(command))
}

fn replace_link(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(ReplaceLink::new(call.required(0, "link")?, call.value)))
}

fn block_url(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(BlockUrl::new(
        call.required(0, "url")?,
        call.param(1),
        call.rules.clone(),
    )))
}

fn delay_url(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let milliseconds = call
        .value
        .trim()
        .parse()
        .map_err(|_| call.invalid(format!("delay `{}` is not a number", call.value)))?;
    Ok(Arc::new(DelayUrl::new(
        call.required(0, "url")?,
        milliseconds,
        call.param(1),
        call.rules.clone(),
    )))
}

fn replace_url(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(ReplaceUrl::new(
        call.required(0, "url")?,
        call.value,
        call.param(1),
        call.rules.clone(),
    )))
}

fn overwrite_html(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(Arc::new(OverwriteHtml::new(call.param(0), call.param(1), call.value)))
}

/// Replace the whole page with a full-size frame of `value`.
fn overwrite_page(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let html = format!(
        "<head><title>{}</title><style>html {{height:100%;}}</style></head>\
         <body style=\"margin:0;padding:0;width:100%;height:100%;overflow:hidden;\">\
         <iframe src=\"{}\" style=\"width:100%;height:100%\"></body>",
        call.param(1),
        call.value
    );
    Ok(Arc::new(OverwriteHtml::new(call.param(0), "", &html)))
}
