//! Configuration orchestrator.
//!
//! Compilation runs in two explicit passes over the parsed document:
//! 1. extraction: options, variable declarations and imports
//! 2. compilation: every remaining leaf is substituted and built into a
//!    command, with imported configurations inlined at their `+name` line
//!
//! Options and variable declarations are memoized for the lifetime of the
//! configuration. The compiled command list is memoized too, but depends on
//! the override values and is dropped by [`Configuration::update_values`].

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use mnky_ini::{parse, unescape, ParseWarning, ParsedDocument, Node, TemplateOptions, Value};
use mnky_tree::{NodeId, NodeKind, Tree, UndoRecord, DEFAULT_PROPERTY};
use serde::Serialize;

use crate::builder::CommandBuilder;
use crate::command::{CommandRef, UrlAction, UrlRequest, GROUP_AJAX, GROUP_ALL};
use crate::options::Options;
use crate::repository::Repository;
use crate::variable::{self, BoundVariable, Variable};

/// Tags never touched, unless whitelisted.
pub const DEFAULT_BLACKLIST: [&str; 2] = ["style", "script"];

/// Variable overrides by name.
pub type Values = BTreeMap<String, String>;

/// Errors that abort compilation of a whole configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CompileError {
    #[error("There is no configuration called \"{name}\"")]
    MissingImport { name: String },

    #[error("Import cycle: {}", .chain.join(" -> "))]
    CompositionCycle { chain: Vec<String> },
}

/// One configuration document plus everything derived from it.
#[derive(Debug)]
pub struct Configuration<'r> {
    name: String,
    content: String,
    document: ParsedDocument,
    warnings: Vec<ParseWarning>,
    repository: Option<&'r Repository>,
    values: Values,
    enabled: bool,

    options: OnceLock<Options>,
    /// Variables declared in this document only.
    declared: OnceLock<Vec<Variable>>,
    /// Declared variables including those of imports.
    variables: OnceLock<Result<Vec<Variable>, CompileError>>,
    commands: OnceLock<Result<Vec<CommandRef>, CompileError>>,
}

impl Configuration<'static> {
    /// Parse `content` without template interpolation.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_template(name, content, &TemplateOptions::disabled())
    }

    pub fn with_template(
        name: impl Into<String>,
        content: impl Into<String>,
        template: &TemplateOptions,
    ) -> Self {
        let content = content.into();
        let output = parse(&content, template);
        Self {
            name: name.into(),
            content,
            document: output.document,
            warnings: output.warnings,
            repository: None,
            values: Values::new(),
            enabled: false,
            options: OnceLock::new(),
            declared: OnceLock::new(),
            variables: OnceLock::new(),
            commands: OnceLock::new(),
        }
    }
}

impl<'r> Configuration<'r> {
    /// Resolve imports against `repository`.
    pub fn with_repository<'a>(self, repository: &'a Repository) -> Configuration<'a> {
        Configuration {
            name: self.name,
            content: self.content,
            document: self.document,
            warnings: self.warnings,
            repository: Some(repository),
            values: self.values,
            enabled: self.enabled,
            options: self.options,
            declared: self.declared,
            variables: OnceLock::new(),
            commands: OnceLock::new(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn options(&self) -> &Options {
        self.options
            .get_or_init(|| Options::from_document(&self.document))
    }

    /// Names of `+name` imports at any depth, in document order.
    pub fn imports(&self) -> Vec<String> {
        self.document
            .leaves()
            .into_iter()
            .filter_map(|(key, _, _)| import_name(key))
            .collect()
    }

    /// Variables declared by this document, without imports.
    pub fn declared_variables(&self) -> &[Variable] {
        self.declared.get_or_init(|| {
            self.document
                .leaves()
                .into_iter()
                .filter_map(|(key, value, _)| {
                    let name = key.strip_prefix('$').filter(|n| !n.is_empty())?;
                    let raw = value.as_text().map(unescape).unwrap_or_default();
                    Some(Variable::parse(name, &raw))
                })
                .collect()
        })
    }

    /// All variables, including those of imports, bound to the current
    /// override values and sorted longest name first.
    pub fn variables(&self) -> Result<Vec<BoundVariable>, CompileError> {
        let declared = self
            .variables
            .get_or_init(|| {
                let mut out = Vec::new();
                let mut seen = HashSet::new();
                self.collect_variables(self.repository, &mut Vec::new(), &mut seen, &mut out)?;
                Ok(out)
            })
            .clone()?;
        Ok(bind(&declared, &self.values))
    }

    pub fn is_template(&self) -> bool {
        self.options().is_template()
    }

    pub fn is_disabled(&self) -> bool {
        self.options().is_template() || self.options().is_deprecated()
    }

    /// Whether any include or exclude rule is declared.
    pub fn is_restricted(&self) -> bool {
        !self.options().include().is_empty() || !self.options().exclude().is_empty()
    }

    pub fn is_available_for_url(&self, url: &str) -> bool {
        self.is_restricted() && !self.is_disabled() && self.options().match_rule().test(url)
    }

    pub fn is_enabled_for_url(&self, url: &str) -> bool {
        self.enabled && self.is_available_for_url(url)
    }

    /// Text nodes are checked by their parent's tag, elements by their own.
    pub fn is_tag_blacklisted(&self, tree: &dyn Tree, node: NodeId) -> bool {
        let element = match tree.kind(node) {
            NodeKind::Text => tree.parent(node),
            NodeKind::Element => Some(node),
            _ => None,
        };
        let Some(element) = element else {
            return false;
        };
        let tag = tree.node_name(element);
        let options = self.options();

        if options.whitelist().iter().any(|w| w.eq_ignore_ascii_case(&tag)) {
            return false;
        }
        DEFAULT_BLACKLIST.iter().any(|b| b.eq_ignore_ascii_case(&tag))
            || options.blacklist().iter().any(|b| b.eq_ignore_ascii_case(&tag))
    }

    /// Merge override values. Only the compiled commands are invalidated.
    pub fn update_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in values {
            self.values.insert(name.into(), value.into());
        }
        self.commands = OnceLock::new();
    }

    /// The compiled command list.
    pub fn commands(&self) -> Result<&[CommandRef], CompileError> {
        match self.commands.get_or_init(|| {
            let mut stack = Vec::new();
            let commands = self.compile(self.repository, &self.values, &mut stack);
            if let Ok(list) = &commands {
                tracing::debug!(configuration = %self.name, commands = list.len(), "compiled configuration");
            }
            commands
        }) {
            Ok(commands) => Ok(commands.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Run every command of `group` against `node`, collecting undo records
    /// in command order.
    pub fn apply(
        &self,
        tree: &mut dyn Tree,
        node: NodeId,
        key: &str,
        group: &str,
    ) -> Result<Vec<UndoRecord>, CompileError> {
        if self.is_tag_blacklisted(tree, node) {
            return Ok(Vec::new());
        }
        let undo: Vec<UndoRecord> = self
            .commands()?
            .iter()
            .filter(|c| c.is_applicable_for_group(group))
            .flat_map(|c| c.apply(tree, node, key))
            .collect();
        if !undo.is_empty() {
            tracing::trace!(configuration = %self.name, node = node.0, changes = undo.len(), "applied");
        }
        Ok(undo)
    }

    /// [`Configuration::apply`] with the `value` property and all groups.
    pub fn apply_default(&self, tree: &mut dyn Tree, node: NodeId) -> Result<Vec<UndoRecord>, CompileError> {
        self.apply(tree, node, DEFAULT_PROPERTY, GROUP_ALL)
    }

    /// Apply to every node of the tree, in document order.
    pub fn apply_tree(&self, tree: &mut dyn Tree, key: &str, group: &str) -> Result<Vec<UndoRecord>, CompileError> {
        let mut nodes = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(tree.children(node).into_iter().rev());
        }

        let mut undo = Vec::new();
        for node in nodes {
            undo.extend(self.apply(tree, node, key, group)?);
        }
        tracing::debug!(configuration = %self.name, changes = undo.len(), "applied to tree");
        Ok(undo)
    }

    /// What to do with an outbound request: the first URL command that
    /// matches decides.
    pub fn intercept(&self, request: &UrlRequest<'_>) -> Result<Option<UrlAction>, CompileError> {
        Ok(self
            .commands()?
            .iter()
            .filter(|c| c.is_applicable_for_group(GROUP_AJAX))
            .find_map(|c| c.intercept(request)))
    }

    /// Compile with explicit repository, values and resolution stack.
    fn compile(
        &self,
        repository: Option<&Repository>,
        values: &Values,
        stack: &mut Vec<String>,
    ) -> Result<Vec<CommandRef>, CompileError> {
        // Extraction pass
        let mut declared = Vec::new();
        self.collect_variables(repository, &mut Vec::new(), &mut HashSet::new(), &mut declared)?;
        let variables = bind(&declared, values);

        // Compilation pass
        let mut commands = Vec::new();
        self.compile_into(repository, &variables, stack, &mut commands)?;
        Ok(commands)
    }

    /// Imports are compiled with the importer's bound variables, the same
    /// list [`Configuration::variables`] reports.
    fn compile_into(
        &self,
        repository: Option<&Repository>,
        variables: &[BoundVariable],
        stack: &mut Vec<String>,
        commands: &mut Vec<CommandRef>,
    ) -> Result<(), CompileError> {
        enter(stack, &self.name)?;
        let options = self.options();
        let builder = CommandBuilder::new(options.namespaces().to_vec(), options.match_rule());
        let context = CompileContext {
            repository,
            variables,
            builder: &builder,
        };
        self.compile_section(&self.document, &context, stack, commands)?;
        stack.pop();
        Ok(())
    }

    fn compile_section(
        &self,
        document: &ParsedDocument,
        context: &CompileContext<'_>,
        stack: &mut Vec<String>,
        commands: &mut Vec<CommandRef>,
    ) -> Result<(), CompileError> {
        for entry in document.entries() {
            let value = match &entry.node {
                Node::Section(section) => {
                    self.compile_section(section, context, stack, commands)?;
                    continue;
                }
                Node::Leaf(value) => value,
            };
            let key = entry.key.as_str();

            if key.len() > 1 && (key.starts_with('$') || key.starts_with('@')) {
                continue;
            }

            if let Some(name) = import_name(key) {
                let import = resolve(context.repository, &name)?;
                tracing::debug!(configuration = %self.name, import = %name, "inlining import");
                import.compile_into(context.repository, context.variables, stack, commands)?;
                continue;
            }

            // Bare flags are only meaningful as parameterless commands
            let text = match value {
                Value::Text(text) => text.as_str(),
                Value::Flag if key.starts_with('!') => "",
                Value::Flag => continue,
            };
            let text = variable::substitute(context.variables, text);
            commands.push(context.builder.build(key, &text));
        }
        Ok(())
    }

    fn collect_variables(
        &self,
        repository: Option<&Repository>,
        stack: &mut Vec<String>,
        seen: &mut HashSet<String>,
        out: &mut Vec<Variable>,
    ) -> Result<(), CompileError> {
        enter(stack, &self.name)?;
        for variable in self.declared_variables() {
            if seen.insert(variable.name.clone()) {
                out.push(variable.clone());
            }
        }
        for name in self.imports() {
            resolve(repository, &name)?.collect_variables(repository, stack, seen, out)?;
        }
        stack.pop();
        Ok(())
    }
}

struct CompileContext<'a> {
    repository: Option<&'a Repository>,
    variables: &'a [BoundVariable],
    builder: &'a CommandBuilder<'static>,
}

/// `+name` → `name`.
fn import_name(key: &str) -> Option<String> {
    key.strip_prefix('+')
        .map(|name| unescape(name.trim()))
        .filter(|name| !name.is_empty())
}

fn resolve<'a>(repository: Option<&'a Repository>, name: &str) -> Result<&'a Configuration<'static>, CompileError> {
    repository
        .and_then(|r| r.find_by_name(name).ok())
        .ok_or_else(|| CompileError::MissingImport {
            name: name.to_string(),
        })
}

/// Push `name`, failing if it is already being resolved.
fn enter(stack: &mut Vec<String>, name: &str) -> Result<(), CompileError> {
    if !name.is_empty() && stack.iter().any(|n| n == name) {
        let mut chain = stack.clone();
        chain.push(name.to_string());
        return Err(CompileError::CompositionCycle { chain });
    }
    stack.push(name.to_string());
    Ok(())
}

/// Bind a snapshot of `values`, longest name first.
fn bind(declared: &[Variable], values: &Values) -> Vec<BoundVariable> {
    let mut bound: Vec<BoundVariable> = declared
        .iter()
        .map(|v| v.bind(values.get(&v.name).map(String::as_str)))
        .collect();
    variable::sort_for_substitution(&mut bound);
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use mnky_tree::MemoryTree;

    const EXAMPLE: &str = "@include=example.com\n$name=Foo\nHello=Hi $name\n";

    fn text_tree(text: &str) -> (MemoryTree, NodeId) {
        let mut tree = MemoryTree::new("https://example.com/");
        let body = tree.append_element(tree.root(), "body", &[]);
        let node = tree.append_text(body, text);
        (tree, node)
    }

    #[test]
    fn test_end_to_end() {
        let mut config = Configuration::new("example", EXAMPLE).with_enabled(true);
        assert!(config.is_available_for_url("example.com"));
        assert!(config.is_enabled_for_url("https://example.com/"));

        config.update_values([("name", "Bar")]);
        let (mut tree, node) = text_tree("Hello");
        let undo = config.apply_default(&mut tree, node).unwrap();
        assert_eq!(tree.get(node, "value").as_deref(), Some("Hi Bar"));
        assert_eq!(undo.len(), 1);

        assert!(undo[0].undo(&mut tree));
        assert_eq!(tree.get(node, "value").as_deref(), Some("Hello"));
    }

    #[test]
    fn test_default_value_without_override() {
        let config = Configuration::new("example", EXAMPLE);
        let (mut tree, node) = text_tree("Hello");
        config.apply_default(&mut tree, node).unwrap();
        assert_eq!(tree.get(node, "value").as_deref(), Some("Hi Foo"));
    }

    #[test]
    fn test_update_values_recompiles() {
        let mut config = Configuration::new("example", EXAMPLE);
        assert_eq!(config.commands().unwrap().len(), 1);
        config.update_values([("name", "Baz")]);
        let (mut tree, node) = text_tree("Hello");
        config.apply_default(&mut tree, node).unwrap();
        assert_eq!(tree.get(node, "value").as_deref(), Some("Hi Baz"));
    }

    #[test]
    fn test_availability() {
        let unrestricted = Configuration::new("a", "x = y");
        assert!(!unrestricted.is_restricted());
        assert!(!unrestricted.is_available_for_url("https://example.com"));

        let template = Configuration::new("b", "@template\n@include=example.com");
        assert!(template.is_template());
        assert!(template.is_disabled());
        assert!(!template.is_available_for_url("https://example.com"));

        let deprecated = Configuration::new("c", "@deprecated\n@include=example.com");
        assert!(deprecated.is_disabled());

        let not_enabled = Configuration::new("d", "@include=example.com");
        assert!(not_enabled.is_available_for_url("https://example.com"));
        assert!(!not_enabled.is_enabled_for_url("https://example.com"));
    }

    #[test]
    fn test_script_parent_is_blacklisted() {
        let config = Configuration::new("a", "var = let");
        let mut tree = MemoryTree::new("https://example.com/");
        let script = tree.append_element(tree.root(), "script", &[]);
        let node = tree.append_text(script, "var x = 1");
        assert!(config.is_tag_blacklisted(&tree, node));
        assert!(config.apply_default(&mut tree, node).unwrap().is_empty());
        assert_eq!(tree.get(node, "value").as_deref(), Some("var x = 1"));
    }

    #[test]
    fn test_blacklist_and_whitelist() {
        let config = Configuration::new("a", "@blacklist=PRE\n@whitelist=style");
        let mut tree = MemoryTree::new("https://example.com/");
        let root = tree.root();
        let pre = tree.append_element(root, "pre", &[]);
        let style = tree.append_element(root, "style", &[]);
        let div = tree.append_element(root, "div", &[]);
        assert!(config.is_tag_blacklisted(&tree, pre));
        assert!(!config.is_tag_blacklisted(&tree, style));
        assert!(!config.is_tag_blacklisted(&tree, div));
        assert!(!config.is_tag_blacklisted(&tree, root));
    }

    #[test]
    fn test_duplicate_keys_both_compile() {
        let config = Configuration::new("a", "a = b\na = c");
        assert_eq!(config.commands().unwrap().len(), 2);
    }

    #[test]
    fn test_flags_and_declarations_skipped() {
        let config = Configuration::new("a", "@include=x\n$v=1\nflag\n[s]\nnested = yes");
        let commands = config.commands().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].kind(), CommandKind::SearchAndReplace);
    }

    #[test]
    fn test_command_without_value_compiles() {
        let config = Configuration::new("a", "@include=x\n!hide(Secret)\n");
        let kinds: Vec<CommandKind> = config.commands().unwrap().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![CommandKind::Hide]);
    }

    #[test]
    fn test_unknown_command_does_not_abort() {
        let config = Configuration::new("a", "!nope() = x\nHello = Bye");
        let kinds: Vec<CommandKind> = config.commands().unwrap().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![CommandKind::Unknown, CommandKind::SearchAndReplace]);
    }

    #[test]
    fn test_missing_import_without_repository() {
        let config = Configuration::new("a", "+other\nx = y");
        assert_eq!(
            config.commands().err(),
            Some(CompileError::MissingImport { name: "other".into() })
        );
        assert!(config.variables().is_err());
    }

    #[test]
    fn test_group_filter() {
        let config = Configuration::new("a", "!blockUrl(ads.js) = \nHello = Bye");
        let (mut tree, node) = text_tree("Hello");
        assert!(config.apply(&mut tree, node, "value", GROUP_AJAX).unwrap().is_empty());
        assert_eq!(config.apply(&mut tree, node, "value", "text").unwrap().len(), 1);
    }

    #[test]
    fn test_intercept() {
        let config = Configuration::new("a", "!delayUrl(/api/*) = 300");
        let request = UrlRequest {
            url: "/api/orders",
            resource_type: "xmlhttprequest",
            page_url: "https://shop.test/",
        };
        assert_eq!(
            config.intercept(&request).unwrap(),
            Some(UrlAction::Delay { milliseconds: 300 })
        );
    }

    #[test]
    fn test_imports_in_order() {
        let config = Configuration::new("a", "+one\n[s]\n+two\nx=y");
        assert_eq!(config.imports(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_variables_sorted() {
        let config = Configuration::new("a", "$a=1\n$ab=2\npattern = ab");
        let names: Vec<String> = config.variables().unwrap().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["ab".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_apply_tree() {
        let config = Configuration::new("a", "Hello = Hi\n!replaceImage(logo.png) = acme.png");
        let mut tree = MemoryTree::new("https://example.com/");
        let root = tree.root();
        let p = tree.append_element(root, "p", &[]);
        let text = tree.append_text(p, "Hello");
        let img = tree.append_element(root, "img", &[("src", "logo.png")]);
        let undo = config.apply_tree(&mut tree, "value", GROUP_ALL).unwrap();
        assert_eq!(undo.len(), 2);
        assert_eq!(tree.get(text, "value").as_deref(), Some("Hi"));
        assert_eq!(tree.get(img, "src").as_deref(), Some("acme.png"));
    }
}
