//! Namespace-aware XPath queries over gateway documents
//!
//! Documents are parsed by one of two backends ([`XmlBackend::QuickXml`] or
//! [`XmlBackend::XmlTree`]) into the same [`XmlNode`] tree, so every query
//! behaves identically whichever parser read the bytes.
//!
//! The supported XPath subset is what the gateway responses need: absolute
//! (`/a:b`), descendant (`//a:b`) and relative (`./a:b`, `a:b`) location
//! paths made of prefixed names, unprefixed names and `*`, joined with `/` or
//! `//`. Prefixes are resolved against a namespace table, by default
//! [`NAMESPACES`](crate::envelope::NAMESPACES).

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::cell::Cell;
use xmltree::{Element, XMLNode};

use crate::envelope::NAMESPACES;
use crate::error::SoapError;

/// Element of a parsed document
///
/// `text` holds the element's own character data; child elements keep theirs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub namespace: Option<String>,
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Character data of this element and all of its descendants
    pub fn descendant_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// XML parser used to read a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlBackend {
    #[default]
    QuickXml,
    XmlTree,
}

impl XmlBackend {
    pub const ALL: [XmlBackend; 2] = [XmlBackend::QuickXml, XmlBackend::XmlTree];

    pub fn name(&self) -> &'static str {
        match self {
            XmlBackend::QuickXml => "quick-xml",
            XmlBackend::XmlTree => "xmltree",
        }
    }

    /// Parses a document and returns its root element
    pub fn parse(&self, xml: &str) -> Result<XmlNode, SoapError> {
        let xml = xml.trim_start();
        if xml.is_empty() {
            return Err(SoapError::EmptyDocument);
        }
        match self {
            XmlBackend::QuickXml => parse_with_quick_xml(xml),
            XmlBackend::XmlTree => parse_with_xmltree(xml),
        }
    }
}

fn parse_with_xmltree(xml: &str) -> Result<XmlNode, SoapError> {
    let root = Element::parse(xml.as_bytes())?;
    Ok(convert_element(&root))
}

fn convert_element(elem: &Element) -> XmlNode {
    let namespace = elem.namespace.clone().filter(|ns| !ns.is_empty());
    let mut node = XmlNode::new(namespace, elem.name.clone());
    for child in &elem.children {
        match child {
            XMLNode::Element(e) => node.children.push(convert_element(e)),
            XMLNode::Text(t) | XMLNode::CData(t) => node.text.push_str(t),
            _ => {}
        }
    }
    node
}

fn parse_with_quick_xml(xml: &str) -> Result<XmlNode, SoapError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(XmlNode::new(namespace_of(ns)?, name));
            }
            (ns, Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let node = XmlNode::new(namespace_of(ns)?, name);
                attach(&mut stack, &mut root, node)?;
            }
            (_, Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| SoapError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            (_, Event::Text(e)) => {
                let text = e.decode().map_err(quick_xml::Error::Encoding)?;
                push_text(&mut stack, &text)?;
            }
            (_, Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e))?;
            }
            (_, Event::GeneralRef(e)) => {
                let entity = e.decode().map_err(quick_xml::Error::Encoding)?;
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| SoapError::malformed(format!("unknown entity &{};", entity)))?;
                push_text(&mut stack, &resolved)?;
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SoapError::malformed("unclosed element at end of document"));
    }
    root.ok_or(SoapError::EmptyDocument)
}

/// Appends character data to the open element
///
/// Outside the root element only whitespace is allowed.
fn push_text(stack: &mut [XmlNode], text: &str) -> Result<(), SoapError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(SoapError::malformed("text outside the root element")),
    }
    Ok(())
}

fn namespace_of(result: ResolveResult<'_>) -> Result<Option<String>, SoapError> {
    match result {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SoapError::malformed(format!(
            "undeclared namespace prefix `{}`",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn attach(
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), SoapError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(SoapError::malformed("more than one root element")),
    }
    Ok(())
}

fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let resolved = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(resolved.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum NameTest {
    Any,
    Name {
        namespace: Option<&'static str>,
        local: String,
    },
}

impl NameTest {
    fn matches(&self, node: &XmlNode) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name { namespace, local } => {
                node.name == *local && node.namespace.as_deref() == *namespace
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NameTest,
}

/// A compiled location path
#[derive(Debug, Clone, PartialEq)]
struct XPath {
    absolute: bool,
    steps: Vec<Step>,
}

impl XPath {
    fn compile(
        expression: &str,
        namespaces: &[(&'static str, &'static str)],
    ) -> Result<Self, SoapError> {
        let invalid = || SoapError::InvalidXPath(expression.to_string());
        let expr = expression.trim();
        if expr.is_empty() {
            return Err(invalid());
        }

        let (absolute, body) = if let Some(body) = expr.strip_prefix('/') {
            (true, body)
        } else if expr == "." {
            (false, "")
        } else if let Some(body) = expr.strip_prefix("./") {
            (false, body)
        } else {
            (false, expr)
        };

        let mut steps = Vec::new();
        let mut axis = Axis::Child;
        if !body.is_empty() {
            for segment in body.split('/') {
                if segment.is_empty() {
                    if axis == Axis::Descendant {
                        return Err(invalid());
                    }
                    axis = Axis::Descendant;
                    continue;
                }
                if segment == "." && axis == Axis::Child {
                    continue;
                }
                let test = Self::name_test(segment, expression, namespaces)?;
                steps.push(Step { axis, test });
                axis = Axis::Child;
            }
            if axis == Axis::Descendant {
                return Err(invalid());
            }
        }

        if absolute && steps.is_empty() {
            return Err(invalid());
        }
        Ok(XPath { absolute, steps })
    }

    fn name_test(
        segment: &str,
        expression: &str,
        namespaces: &[(&'static str, &'static str)],
    ) -> Result<NameTest, SoapError> {
        if segment == "*" {
            return Ok(NameTest::Any);
        }

        let (prefix, local) = match segment.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, segment),
        };

        let valid_name = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        };
        if !valid_name(local) || prefix.is_some_and(|p| !valid_name(p)) {
            return Err(SoapError::InvalidXPath(expression.to_string()));
        }

        let namespace = match prefix {
            Some(prefix) => Some(
                namespaces
                    .iter()
                    .find(|(p, _)| *p == prefix)
                    .map(|(_, uri)| *uri)
                    .ok_or_else(|| SoapError::UnknownPrefix {
                        prefix: prefix.to_string(),
                        expression: expression.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(NameTest::Name {
            namespace,
            local: local.to_string(),
        })
    }

    fn apply<'a>(&self, start: Vec<&'a XmlNode>) -> Vec<&'a XmlNode> {
        let mut current = start;
        for step in &self.steps {
            let mut next: Vec<&'a XmlNode> = Vec::new();
            for node in &current {
                match step.axis {
                    Axis::Child => {
                        for child in &node.children {
                            if step.test.matches(child) {
                                push_unique(&mut next, child);
                            }
                        }
                    }
                    Axis::Descendant => collect_descendants(node, &step.test, &mut next),
                }
            }
            current = next;
        }
        current
    }
}

fn push_unique<'a>(nodes: &mut Vec<&'a XmlNode>, node: &'a XmlNode) {
    if !nodes.iter().any(|n| std::ptr::eq(*n, node)) {
        nodes.push(node);
    }
}

fn collect_descendants<'a>(node: &'a XmlNode, test: &NameTest, out: &mut Vec<&'a XmlNode>) {
    for child in &node.children {
        if test.matches(child) {
            push_unique(out, child);
        }
        collect_descendants(child, test, out);
    }
}

/// Parsed response document
///
/// Every evaluated expression is counted (see [`XmlQuerier::query_count`]).
#[derive(Debug)]
pub struct XmlQuerier {
    backend: XmlBackend,
    // synthetic document node whose only child is the root element
    document: XmlNode,
    namespaces: &'static [(&'static str, &'static str)],
    queries: Cell<usize>,
}

impl XmlQuerier {
    pub fn parse(xml: &str, backend: XmlBackend) -> Result<Self, SoapError> {
        let root = backend.parse(xml)?;
        let mut document = XmlNode::default();
        document.children.push(root);
        Ok(Self {
            backend,
            document,
            namespaces: NAMESPACES,
            queries: Cell::new(0),
        })
    }

    /// Replaces the prefix table used to resolve expressions
    pub fn with_namespaces(mut self, namespaces: &'static [(&'static str, &'static str)]) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn backend(&self) -> XmlBackend {
        self.backend
    }

    pub fn root(&self) -> &XmlNode {
        &self.document.children[0]
    }

    /// Number of expressions evaluated so far
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Evaluates `expression` against the document
    pub fn xpath(&self, expression: &str) -> Result<NodeSet<'_>, SoapError> {
        self.select(vec![&self.document], expression)
    }

    /// Trimmed text of the nodes matching `expression` ("" when none match)
    pub fn text(&self, expression: &str) -> Result<String, SoapError> {
        Ok(self.xpath(expression)?.text())
    }

    fn select<'a>(
        &'a self,
        context: Vec<&'a XmlNode>,
        expression: &str,
    ) -> Result<NodeSet<'a>, SoapError> {
        self.queries.set(self.queries.get() + 1);
        let path = XPath::compile(expression, self.namespaces)?;
        let start = if path.absolute {
            vec![&self.document]
        } else {
            context
        };
        Ok(NodeSet {
            querier: self,
            nodes: path.apply(start),
        })
    }
}

/// Result of an XPath evaluation, usable as context for relative queries
#[derive(Debug, Clone)]
pub struct NodeSet<'a> {
    querier: &'a XmlQuerier,
    nodes: Vec<&'a XmlNode>,
}

impl<'a> NodeSet<'a> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[&'a XmlNode] {
        &self.nodes
    }

    pub fn first(&self) -> Option<&'a XmlNode> {
        self.nodes.first().copied()
    }

    /// Concatenated, trimmed text of every node in the set
    pub fn text(&self) -> String {
        let text: String = self.nodes.iter().map(|n| n.descendant_text()).collect();
        text.trim().to_string()
    }

    /// Evaluates `expression` relative to the nodes of this set
    pub fn xpath(&self, expression: &str) -> Result<NodeSet<'a>, SoapError> {
        self.querier.select(self.nodes.clone(), expression)
    }

    /// Trimmed text of the nodes matching `expression` relative to this set
    pub fn text_at(&self, expression: &str) -> Result<String, SoapError> {
        Ok(self.xpath(expression)?.text())
    }
}
